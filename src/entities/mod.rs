//! Entities module - backend-owned story data and values derived from it.
//!
//! `Clip` mirrors one backend story item; `timeline` derives extents,
//! lanes and playback order from a clip replica.

pub mod clip;
pub mod timeline;

pub use clip::{Clip, MIN_CLIP_MS};
pub use timeline::{
    DEFAULT_TRACKS, MIN_TIMELINE_MS, content_end_ms, playback_order, total_duration_ms,
    track_index, track_set,
};
