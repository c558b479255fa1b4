//! Shared editor context: playback and selection state.
//!
//! Handed explicitly to every component that needs it instead of living in
//! a global store. Clones share the same state. Writers take the lock only
//! for the duration of one accessor call.

use std::sync::{Arc, RwLock};

/// Playback state shared between the editor, the player and the widget.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_time_ms: i64,
    /// Story whose timeline currently owns the playhead.
    pub playback_story_id: Option<String>,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    selected_clip: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct EditorContext {
    inner: Arc<RwLock<SharedState>>,
}

impl EditorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of playback state.
    pub fn playback(&self) -> PlaybackState {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).playback.clone()
    }

    /// Mutate playback state in place.
    pub fn update_playback<R>(&self, f: impl FnOnce(&mut PlaybackState) -> R) -> R {
        let mut state = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(&mut state.playback)
    }

    /// Playhead for `story_id`; 0 when another story owns playback.
    pub fn playhead_for(&self, story_id: &str) -> i64 {
        let state = self.inner.read().unwrap_or_else(|e| e.into_inner());
        match state.playback.playback_story_id.as_deref() {
            Some(active) if active == story_id => state.playback.current_time_ms,
            _ => 0,
        }
    }

    pub fn selected_clip(&self) -> Option<String> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).selected_clip.clone()
    }

    pub fn select(&self, clip_id: impl Into<String>) {
        self.inner.write().unwrap_or_else(|e| e.into_inner()).selected_clip = Some(clip_id.into());
    }

    pub fn clear_selection(&self) {
        self.inner.write().unwrap_or_else(|e| e.into_inner()).selected_clip = None;
    }
}
