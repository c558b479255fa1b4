//! Pointer gesture state machine for the timeline.
//!
//! Exactly one gesture is active at a time. A gesture can only start from
//! `Idle`; `release()` and `cancel()` always return to `Idle`.
//!
//! ```text
//!            begin_drag            release / cancel
//!   Idle ─────────────────▶ Dragging ─────────────────▶ Idle
//!     │      begin_trim
//!     ├───────────────────▶ Trimming ─────────────────▶ Idle
//!     │  begin_panel_resize
//!     └───────────────────▶ ResizingPanel ────────────▶ Idle
//! ```
//!
//! While a gesture is active the provisional values live here only; the
//! layout engine reads them for feedback. Nothing is sent to the backend
//! until `release()` hands back a [`Commit`].

use log::{debug, trace};

use super::coords::{Point, TimeScale};
use crate::entities::{Clip, MIN_CLIP_MS};
use crate::error::EditError;

/// Height of one lane in pixels.
pub const TRACK_HEIGHT: f64 = 48.0;
pub const MIN_PANEL_HEIGHT: f64 = 120.0;
pub const MAX_PANEL_HEIGHT: f64 = 500.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrimSide {
    Start,
    End,
}

/// Live state of a clip move.
#[derive(Clone, Debug, PartialEq)]
pub struct DragGesture {
    pub clip_id: String,
    /// Pointer position relative to the clip's top-left corner at press time.
    pub grab_offset: Point,
    pub origin_start_ms: i64,
    pub origin_track: i32,
    /// Live top-left corner of the clip bar.
    pub left_px: f64,
    pub top_px: f64,
    pub start_time_ms: i64,
    pub track: i32,
}

/// Live state of a trim-handle drag.
#[derive(Clone, Debug, PartialEq)]
pub struct TrimGesture {
    pub clip_id: String,
    pub side: TrimSide,
    pub pointer_start_x: f64,
    pub duration_ms: i64,
    pub initial_trim_start_ms: i64,
    pub initial_trim_end_ms: i64,
    pub trim_start_ms: i64,
    pub trim_end_ms: i64,
}

/// Live state of the editor panel resize grip.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelResize {
    pub start_y: f64,
    pub start_height: f64,
    pub height: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging(DragGesture),
    Trimming(TrimGesture),
    ResizingPanel(PanelResize),
}

/// Result of a finished gesture that changed something.
#[derive(Clone, Debug, PartialEq)]
pub enum Commit {
    Move { clip_id: String, start_time_ms: i64, track: i32 },
    Trim { clip_id: String, trim_start_ms: i64, trim_end_ms: i64 },
    /// Local only, never sent to the backend.
    PanelHeight(f64),
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    /// Seeking is refused while a clip gesture is active.
    pub fn blocks_seek(&self) -> bool {
        matches!(self, Interaction::Dragging(_) | Interaction::Trimming(_))
    }

    /// Clip involved in the active gesture, if any.
    pub fn active_clip_id(&self) -> Option<&str> {
        match self {
            Interaction::Dragging(d) => Some(&d.clip_id),
            Interaction::Trimming(t) => Some(&t.clip_id),
            _ => None,
        }
    }

    fn ensure_idle(&self) -> Result<(), EditError> {
        if self.is_idle() { Ok(()) } else { Err(EditError::GestureInProgress) }
    }

    /// Press on a clip body. `clip_origin` is the clip's current top-left corner.
    pub fn begin_drag(&mut self, clip: &Clip, clip_origin: Point, pointer: Point) -> Result<(), EditError> {
        self.ensure_idle()?;
        debug!("drag start: clip={} at {}ms track {}", clip.id, clip.start_time_ms, clip.track);
        *self = Interaction::Dragging(DragGesture {
            clip_id: clip.id.clone(),
            grab_offset: Point::new(pointer.x - clip_origin.x, pointer.y - clip_origin.y),
            origin_start_ms: clip.start_time_ms,
            origin_track: clip.track,
            left_px: clip_origin.x,
            top_px: clip_origin.y,
            start_time_ms: clip.start_time_ms,
            track: clip.track,
        });
        Ok(())
    }

    /// Press on a trim handle.
    pub fn begin_trim(&mut self, clip: &Clip, side: TrimSide, pointer_x: f64) -> Result<(), EditError> {
        self.ensure_idle()?;
        debug!(
            "trim start: clip={} side={:?} trims=({}, {})",
            clip.id, side, clip.trim_start_ms, clip.trim_end_ms
        );
        *self = Interaction::Trimming(TrimGesture {
            clip_id: clip.id.clone(),
            side,
            pointer_start_x: pointer_x,
            duration_ms: clip.duration_ms(),
            initial_trim_start_ms: clip.trim_start_ms,
            initial_trim_end_ms: clip.trim_end_ms,
            trim_start_ms: clip.trim_start_ms,
            trim_end_ms: clip.trim_end_ms,
        });
        Ok(())
    }

    /// Press on the panel resize grip.
    pub fn begin_panel_resize(&mut self, start_y: f64, start_height: f64) -> Result<(), EditError> {
        self.ensure_idle()?;
        *self = Interaction::ResizingPanel(PanelResize {
            start_y,
            start_height,
            height: start_height.clamp(MIN_PANEL_HEIGHT, MAX_PANEL_HEIGHT),
        });
        Ok(())
    }

    /// Pointer moved. `pointer` is in timeline content space, except for
    /// panel resizing which only looks at `y` in window space.
    pub fn update(&mut self, pointer: Point, scale: &TimeScale, tracks: &[i32]) {
        match self {
            Interaction::Idle => {}
            Interaction::Dragging(drag) => {
                drag.left_px = (pointer.x - drag.grab_offset.x).max(0.0);
                let max_top = (tracks.len().saturating_sub(1)) as f64 * TRACK_HEIGHT;
                drag.top_px = (pointer.y - drag.grab_offset.y).clamp(0.0, max_top);
                drag.start_time_ms = scale.px_to_ms_rounded(drag.left_px).max(0);
                // Lane under the bar's vertical centre, so the drawn lane and
                // the committed lane agree whatever the grab point.
                if let Some(track) = track_at_y(drag.top_px + TRACK_HEIGHT / 2.0, tracks) {
                    drag.track = track;
                }
                trace!("drag move: {}ms track {}", drag.start_time_ms, drag.track);
            }
            Interaction::Trimming(trim) => {
                let delta_ms = scale.px_to_ms_rounded(pointer.x - trim.pointer_start_x);
                let max_total = (trim.duration_ms - MIN_CLIP_MS).max(0);
                match trim.side {
                    TrimSide::Start => {
                        let upper = (max_total - trim.initial_trim_end_ms).max(0);
                        trim.trim_start_ms = (trim.initial_trim_start_ms + delta_ms).clamp(0, upper);
                    }
                    TrimSide::End => {
                        let upper = (max_total - trim.initial_trim_start_ms).max(0);
                        trim.trim_end_ms = (trim.initial_trim_end_ms - delta_ms).clamp(0, upper);
                    }
                }
                trace!("trim move: ({}, {})", trim.trim_start_ms, trim.trim_end_ms);
            }
            Interaction::ResizingPanel(resize) => {
                // Moving up grows the panel.
                resize.height = (resize.start_height + (resize.start_y - pointer.y))
                    .clamp(MIN_PANEL_HEIGHT, MAX_PANEL_HEIGHT);
            }
        }
    }

    /// Pointer released: apply the final position and return to `Idle`.
    pub fn release(&mut self, pointer: Point, scale: &TimeScale, tracks: &[i32]) -> Option<Commit> {
        self.update(pointer, scale, tracks);
        let finished = std::mem::take(self);
        match finished {
            Interaction::Idle => None,
            Interaction::Dragging(drag) => {
                if drag.start_time_ms == drag.origin_start_ms && drag.track == drag.origin_track {
                    debug!("drag released in place: clip={}", drag.clip_id);
                    return None;
                }
                Some(Commit::Move {
                    clip_id: drag.clip_id,
                    start_time_ms: drag.start_time_ms,
                    track: drag.track,
                })
            }
            Interaction::Trimming(trim) => {
                if trim.trim_start_ms == trim.initial_trim_start_ms
                    && trim.trim_end_ms == trim.initial_trim_end_ms
                {
                    debug!("trim released unchanged: clip={}", trim.clip_id);
                    return None;
                }
                Some(Commit::Trim {
                    clip_id: trim.clip_id,
                    trim_start_ms: trim.trim_start_ms,
                    trim_end_ms: trim.trim_end_ms,
                })
            }
            Interaction::ResizingPanel(resize) => Some(Commit::PanelHeight(resize.height)),
        }
    }

    /// Listener dropped mid-gesture: discard without committing.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            debug!("gesture cancelled");
        }
        *self = Interaction::Idle;
    }
}

/// Lane under content-space `y`, clamped to the existing lanes.
pub fn track_at_y(y: f64, tracks: &[i32]) -> Option<i32> {
    if tracks.is_empty() {
        return None;
    }
    let row = (y / TRACK_HEIGHT).floor().max(0.0) as usize;
    Some(tracks[row.min(tracks.len() - 1)])
}
