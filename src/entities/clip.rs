//! Story clip - one placed voice segment on the timeline.
//!
//! # Ownership
//!
//! Clips are owned by the story backend. The editor only holds a read replica
//! refreshed after every successful mutation; nothing here mutates a clip in
//! place outside of tests.
//!
//! # Coordinate System
//!
//! - `start_time_ms` - where the audible part starts on the story timeline
//! - `duration` - untrimmed source length in SECONDS (backend convention)
//! - `trim_start_ms/trim_end_ms` - milliseconds cut from head/tail of the source
//!
//! Computed values:
//! - `duration_ms()` = `round(duration * 1000)`
//! - `effective_duration_ms()` = `duration_ms - trim_start_ms - trim_end_ms`
//! - `end_time_ms()` = `start_time_ms + effective_duration_ms()`
//!
//! At least [`MIN_CLIP_MS`] of audio must stay audible after trimming.

use serde::{Deserialize, Serialize};

/// Minimum audible length of a clip after trimming.
pub const MIN_CLIP_MS: i64 = 100;

/// Single story item as mirrored from the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: String,
    #[serde(default)]
    pub story_id: String,
    pub generation_id: String,
    #[serde(default)]
    pub profile_name: String,
    #[serde(default)]
    pub text: String,
    /// Lane index, may be negative; higher lanes render on top.
    #[serde(default)]
    pub track: i32,
    pub start_time_ms: i64,
    /// Untrimmed source length in seconds.
    pub duration: f64,
    #[serde(default)]
    pub trim_start_ms: i64,
    #[serde(default)]
    pub trim_end_ms: i64,
}

impl Clip {
    /// Untrimmed source length in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        (self.duration * 1000.0).round() as i64
    }

    /// Audible length after both trims.
    pub fn effective_duration_ms(&self) -> i64 {
        self.effective_with_trims(self.trim_start_ms, self.trim_end_ms)
    }

    /// Audible length for a provisional pair of trims (used while trimming).
    pub fn effective_with_trims(&self, trim_start_ms: i64, trim_end_ms: i64) -> i64 {
        self.duration_ms() - trim_start_ms - trim_end_ms
    }

    pub fn end_time_ms(&self) -> i64 {
        self.start_time_ms + self.effective_duration_ms()
    }

    /// Largest allowed `trim_start_ms + trim_end_ms`.
    pub fn max_trim_total_ms(&self) -> i64 {
        (self.duration_ms() - MIN_CLIP_MS).max(0)
    }

    /// True if `time_ms` lies strictly inside the audible range.
    pub fn contains_time(&self, time_ms: i64) -> bool {
        time_ms > self.start_time_ms && time_ms < self.end_time_ms()
    }

    /// Check the trim invariant and non-negative placement.
    pub fn is_well_formed(&self) -> bool {
        self.start_time_ms >= 0
            && self.trim_start_ms >= 0
            && self.trim_end_ms >= 0
            && self.trim_start_ms + self.trim_end_ms <= self.max_trim_total_ms()
    }
}

#[cfg(test)]
pub(crate) fn test_clip(id: &str, track: i32, start_time_ms: i64, duration: f64) -> Clip {
    Clip {
        id: id.to_string(),
        story_id: "story".to_string(),
        generation_id: format!("gen-{id}"),
        profile_name: "Narrator".to_string(),
        text: String::new(),
        track,
        start_time_ms,
        duration,
        trim_start_ms: 0,
        trim_end_ms: 0,
    }
}
