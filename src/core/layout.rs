//! Clip layout engine: clip replica + gesture state -> pixel rectangles.
//!
//! Pure functions, recomputed on every frame. The active gesture overrides
//! the committed values of the clip it touches:
//! - dragging: live left/top of the bar
//! - trimming: provisional trims drive the width
//!
//! Used by: `TimelineEditor::layouts()` and the timeline widget for
//! painting and hit-testing.

use super::coords::{Point, TimeScale};
use super::interaction::{Interaction, TRACK_HEIGHT};
use crate::entities::{Clip, total_duration_ms, track_index};

/// Vertical inset of a clip bar inside its lane.
pub const CLIP_PADDING: f64 = 4.0;
/// Grab distance for trim handles, in pixels.
pub const TRIM_HANDLE_PX: f64 = 6.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }
}

/// On-screen placement of one clip.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipLayout {
    pub clip_id: String,
    pub rect: Rect,
    pub track_index: usize,
    pub dragging: bool,
    pub trimming: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitZone {
    TrimStart,
    TrimEnd,
    Body,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClipHit {
    pub clip_id: String,
    pub zone: HitZone,
}

/// Lay out every clip whose lane is in `tracks`.
///
/// `tracks` is expected to come from `track_set(clips)`, which contains every
/// lane a clip uses; clips on other lanes are skipped.
pub fn layout_clips(
    clips: &[Clip],
    tracks: &[i32],
    scale: &TimeScale,
    interaction: &Interaction,
) -> Vec<ClipLayout> {
    clips
        .iter()
        .filter_map(|clip| layout_clip(clip, tracks, scale, interaction))
        .collect()
}

fn layout_clip(
    clip: &Clip,
    tracks: &[i32],
    scale: &TimeScale,
    interaction: &Interaction,
) -> Option<ClipLayout> {
    let track_index = track_index(tracks, clip.track)?;
    let mut left = scale.ms_to_px(clip.start_time_ms as f64);
    let mut top = track_index as f64 * TRACK_HEIGHT;
    let mut effective_ms = clip.effective_duration_ms();
    let mut dragging = false;
    let mut trimming = false;

    match interaction {
        Interaction::Dragging(drag) if drag.clip_id == clip.id => {
            left = drag.left_px;
            top = drag.top_px;
            dragging = true;
        }
        Interaction::Trimming(trim) if trim.clip_id == clip.id => {
            effective_ms = clip.effective_with_trims(trim.trim_start_ms, trim.trim_end_ms);
            trimming = true;
        }
        _ => {}
    }

    Some(ClipLayout {
        clip_id: clip.id.clone(),
        rect: Rect {
            left,
            top: top + CLIP_PADDING,
            width: scale.ms_to_px(effective_ms.max(0) as f64),
            height: TRACK_HEIGHT - CLIP_PADDING * 2.0,
        },
        track_index,
        dragging,
        trimming,
    })
}

/// Content size of the whole timeline: (width, height) in pixels.
pub fn timeline_extent(clips: &[Clip], tracks: &[i32], scale: &TimeScale) -> (f64, f64) {
    (
        scale.ms_to_px(total_duration_ms(clips) as f64),
        tracks.len() as f64 * TRACK_HEIGHT,
    )
}

/// Find the clip under `point`. Later layouts are drawn on top and win.
///
/// Handles never take more than a quarter of the bar each, so narrow clips
/// keep a grabbable body.
pub fn hit_test(layouts: &[ClipLayout], point: Point, handle_px: f64) -> Option<ClipHit> {
    layouts.iter().rev().find_map(|layout| {
        let rect = layout.rect;
        let handle_px = handle_px.min(rect.width / 4.0);
        if point.y < rect.top || point.y > rect.bottom() {
            return None;
        }
        if point.x < rect.left - handle_px || point.x > rect.right() + handle_px {
            return None;
        }
        let zone = if (point.x - rect.left).abs() <= handle_px {
            HitZone::TrimStart
        } else if (point.x - rect.right()).abs() <= handle_px {
            HitZone::TrimEnd
        } else if rect.contains(point) {
            HitZone::Body
        } else {
            return None;
        };
        Some(ClipHit { clip_id: layout.clip_id.clone(), zone })
    })
}
