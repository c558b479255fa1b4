//! Derived story timeline values: extents, lane set and playback order.
//!
//! Nothing here is persisted. Every value is recomputed from the current
//! clip replica whenever it is needed.

use super::clip::Clip;

/// Timeline never renders shorter than this.
pub const MIN_TIMELINE_MS: i64 = 10_000;

/// Lanes that always exist, even when empty.
pub const DEFAULT_TRACKS: [i32; 3] = [1, 0, -1];

/// Latest audible end over all clips (0 for an empty story).
pub fn content_end_ms(clips: &[Clip]) -> i64 {
    clips.iter().map(Clip::end_time_ms).max().unwrap_or(0).max(0)
}

/// Rendered timeline length, floored at [`MIN_TIMELINE_MS`].
pub fn total_duration_ms(clips: &[Clip]) -> i64 {
    content_end_ms(clips).max(MIN_TIMELINE_MS)
}

/// Default lanes plus every lane referenced by a clip, sorted descending
/// (higher lanes are drawn first, i.e. on top).
pub fn track_set(clips: &[Clip]) -> Vec<i32> {
    let mut tracks: Vec<i32> = DEFAULT_TRACKS
        .iter()
        .copied()
        .chain(clips.iter().map(|c| c.track))
        .collect();
    tracks.sort_unstable_by(|a, b| b.cmp(a));
    tracks.dedup();
    tracks
}

/// Row of `track` inside a sorted lane list.
pub fn track_index(tracks: &[i32], track: i32) -> Option<usize> {
    tracks.iter().position(|t| *t == track)
}

/// Clips in the order playback reaches them.
pub fn playback_order(clips: &[Clip]) -> Vec<&Clip> {
    let mut ordered: Vec<&Clip> = clips.iter().collect();
    ordered.sort_by(|a, b| {
        a.start_time_ms
            .cmp(&b.start_time_ms)
            .then_with(|| b.track.cmp(&a.track))
    });
    ordered
}
