//! Playback coordinator for story timelines.
//!
//! **Architecture**: Player does NOT own the clip replica or the playhead.
//! Playhead and play state live in the shared [`EditorContext`]; clips are
//! passed in when playback (re)starts. Actual audio output is delegated to an
//! [`AudioRenderer`] collaborator.
//!
//! # Timing Model
//!
//! Wall-clock anchored: on play/seek the player records `(Instant, ms)` and
//! every `tick()` derives the playhead from elapsed time. No accumulated
//! rounding drift. Playback stops at the end of the last clip.
//!
//! # Follow Mode
//!
//! [`follow_playhead`] keeps the playhead in the right half of the viewport:
//! once it passes the midpoint the view scrolls right, never left.

use log::{debug, info};
use std::time::Instant;

use super::context::EditorContext;
use crate::entities::{Clip, content_end_ms, playback_order};

/// One clip as the audio renderer needs it.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledClip {
    pub clip_id: String,
    pub generation_id: String,
    /// Where the audible part starts on the timeline.
    pub timeline_start_ms: i64,
    /// Offset into the source audio (the head trim).
    pub source_offset_ms: i64,
    pub duration_ms: i64,
}

impl ScheduledClip {
    pub fn timeline_end_ms(&self) -> i64 {
        self.timeline_start_ms + self.duration_ms
    }
}

/// Clips in playback order plus the overall end.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackSchedule {
    pub entries: Vec<ScheduledClip>,
    pub end_ms: i64,
}

impl PlaybackSchedule {
    pub fn from_clips(clips: &[Clip]) -> Self {
        let entries = playback_order(clips)
            .into_iter()
            .map(|c| ScheduledClip {
                clip_id: c.id.clone(),
                generation_id: c.generation_id.clone(),
                timeline_start_ms: c.start_time_ms,
                source_offset_ms: c.trim_start_ms,
                duration_ms: c.effective_duration_ms(),
            })
            .collect();
        Self { entries, end_ms: content_end_ms(clips) }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clips audible at `time_ms`.
    pub fn active_at(&self, time_ms: i64) -> impl Iterator<Item = &ScheduledClip> {
        self.entries
            .iter()
            .filter(move |e| time_ms >= e.timeline_start_ms && time_ms < e.timeline_end_ms())
    }
}

/// Audio output collaborator (waveform playback lives outside this crate).
pub trait AudioRenderer: Send {
    /// Start (or restart) rendering `schedule` from `from_ms`.
    fn start(&mut self, schedule: &PlaybackSchedule, from_ms: i64);
    fn pause(&mut self);
    fn stop(&mut self);
}

/// Renderer that produces no sound.
#[derive(Debug, Default)]
pub struct NullRenderer;

impl AudioRenderer for NullRenderer {
    fn start(&mut self, _schedule: &PlaybackSchedule, _from_ms: i64) {}
    fn pause(&mut self) {}
    fn stop(&mut self) {}
}

pub struct Player {
    ctx: EditorContext,
    renderer: Box<dyn AudioRenderer>,
    schedule: PlaybackSchedule,
    /// Wall-clock anchor of the current run: (instant, playhead at that instant).
    anchor: Option<(Instant, i64)>,
}

impl Player {
    pub fn new(ctx: EditorContext, renderer: Box<dyn AudioRenderer>) -> Self {
        Self {
            ctx,
            renderer,
            schedule: PlaybackSchedule::default(),
            anchor: None,
        }
    }

    pub fn context(&self) -> &EditorContext {
        &self.ctx
    }

    pub fn schedule(&self) -> &PlaybackSchedule {
        &self.schedule
    }

    pub fn is_playing(&self) -> bool {
        self.ctx.playback().is_playing
    }

    /// Play `clips` of `story_id` from the current position.
    pub fn play(&mut self, story_id: &str, clips: &[Clip], now: Instant) {
        let schedule = PlaybackSchedule::from_clips(clips);
        if schedule.is_empty() {
            debug!("play ignored: story {} has no clips", story_id);
            return;
        }
        let from_ms = self.ctx.update_playback(|p| {
            if p.playback_story_id.as_deref() != Some(story_id) {
                p.current_time_ms = 0;
                p.playback_story_id = Some(story_id.to_string());
            }
            if p.current_time_ms >= schedule.end_ms {
                p.current_time_ms = 0;
            }
            p.is_playing = true;
            p.current_time_ms
        });
        info!("play story {} from {}ms ({} clips)", story_id, from_ms, schedule.entries.len());
        self.renderer.start(&schedule, from_ms);
        self.schedule = schedule;
        self.anchor = Some((now, from_ms));
    }

    /// Halt, keeping the position.
    pub fn pause(&mut self, now: Instant) {
        if !self.is_playing() {
            return;
        }
        self.tick(now);
        self.ctx.update_playback(|p| p.is_playing = false);
        self.anchor = None;
        self.renderer.pause();
        debug!("paused at {}ms", self.ctx.playback().current_time_ms);
    }

    /// Halt and rewind to zero.
    pub fn stop(&mut self) {
        self.ctx.update_playback(|p| {
            p.is_playing = false;
            p.current_time_ms = 0;
        });
        self.anchor = None;
        self.renderer.stop();
        debug!("stopped");
    }

    pub fn toggle(&mut self, story_id: &str, clips: &[Clip], now: Instant) {
        let playback = self.ctx.playback();
        if playback.is_playing && playback.playback_story_id.as_deref() == Some(story_id) {
            self.pause(now);
        } else {
            self.play(story_id, clips, now);
        }
    }

    /// Move the playhead of `story_id` to `ms`.
    pub fn seek(&mut self, story_id: &str, ms: i64, now: Instant) {
        let ms = ms.max(0);
        let playing = self.ctx.update_playback(|p| {
            if p.playback_story_id.as_deref() != Some(story_id) {
                p.playback_story_id = Some(story_id.to_string());
                p.is_playing = false;
            }
            p.current_time_ms = ms;
            p.is_playing
        });
        debug!("seek to {}ms", ms);
        if playing {
            self.anchor = Some((now, ms));
            self.renderer.start(&self.schedule, ms);
        }
    }

    /// Replace the schedule after the replica changed; keeps playing if it was.
    pub fn refresh(&mut self, story_id: &str, clips: &[Clip], now: Instant) {
        let playback = self.ctx.playback();
        if !playback.is_playing || playback.playback_story_id.as_deref() != Some(story_id) {
            return;
        }
        self.tick(now);
        self.schedule = PlaybackSchedule::from_clips(clips);
        let from_ms = self.ctx.playback().current_time_ms;
        self.anchor = Some((now, from_ms));
        self.renderer.start(&self.schedule, from_ms);
    }

    /// Advance the playhead. Returns true while still playing.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some((started, from_ms)) = self.anchor else {
            return false;
        };
        let elapsed_ms = now.saturating_duration_since(started).as_millis() as i64;
        let end_ms = self.schedule.end_ms;
        let position = from_ms + elapsed_ms;
        if position >= end_ms {
            self.ctx.update_playback(|p| {
                p.current_time_ms = end_ms;
                p.is_playing = false;
            });
            self.anchor = None;
            self.renderer.stop();
            info!("playback reached end at {}ms", end_ms);
            return false;
        }
        self.ctx.update_playback(|p| p.current_time_ms = position);
        true
    }
}

/// New horizontal scroll offset that keeps the playhead in the right half
/// of the viewport. Only ever scrolls right.
pub fn follow_playhead(
    scroll_left: f64,
    viewport_width: f64,
    content_width: f64,
    playhead_px: f64,
) -> f64 {
    let midpoint = scroll_left + viewport_width / 2.0;
    if playhead_px <= midpoint {
        return scroll_left;
    }
    let max_scroll = (content_width - viewport_width).max(0.0);
    (playhead_px - viewport_width / 2.0).min(max_scroll).max(scroll_left)
}
