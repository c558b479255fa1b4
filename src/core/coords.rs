//! Time <-> pixel mapping for the story timeline.
//!
//! Conventions:
//! - Timeline content space: x = 0 is story time 0, +Y is down.
//! - Times are milliseconds, pixels are f64 (cast to f32 only when painting).
//!
//! `ms_to_px` and `px_to_ms` are inverses up to float rounding.

use serde::{Deserialize, Serialize};

pub const MIN_PIXELS_PER_SECOND: f64 = 10.0;
pub const MAX_PIXELS_PER_SECOND: f64 = 200.0;
pub const DEFAULT_PIXELS_PER_SECOND: f64 = 50.0;
/// Multiplicative zoom factor per step.
pub const ZOOM_STEP: f64 = 1.5;

/// Point in timeline content space (pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Horizontal zoom of the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    pixels_per_second: f64,
}

impl Default for TimeScale {
    fn default() -> Self {
        Self { pixels_per_second: DEFAULT_PIXELS_PER_SECOND }
    }
}

impl TimeScale {
    pub fn new(pixels_per_second: f64) -> Self {
        let mut scale = Self::default();
        scale.set_pixels_per_second(pixels_per_second);
        scale
    }

    pub fn pixels_per_second(&self) -> f64 {
        self.pixels_per_second
    }

    /// Set zoom, clamped to the legal range. Non-finite input falls back to the default.
    pub fn set_pixels_per_second(&mut self, pps: f64) {
        self.pixels_per_second = if pps.is_finite() {
            pps.clamp(MIN_PIXELS_PER_SECOND, MAX_PIXELS_PER_SECOND)
        } else {
            DEFAULT_PIXELS_PER_SECOND
        };
    }

    pub fn zoom_in(&mut self) {
        self.set_pixels_per_second(self.pixels_per_second * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_pixels_per_second(self.pixels_per_second / ZOOM_STEP);
    }

    pub fn ms_to_px(&self, ms: f64) -> f64 {
        (ms / 1000.0) * self.pixels_per_second
    }

    pub fn px_to_ms(&self, px: f64) -> f64 {
        (px / self.pixels_per_second) * 1000.0
    }

    /// Pixel x converted to a whole millisecond.
    pub fn px_to_ms_rounded(&self, px: f64) -> i64 {
        self.px_to_ms(px).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_across_zoom_range() {
        let mut zooms = Vec::new();
        let mut pps = MIN_PIXELS_PER_SECOND;
        while pps < MAX_PIXELS_PER_SECOND {
            zooms.push(pps);
            pps += 7.5;
        }
        zooms.push(MAX_PIXELS_PER_SECOND);
        for pps in zooms {
            let scale = TimeScale::new(pps);
            assert_eq!(scale.pixels_per_second(), pps);
            for ms in [0.0, 1.0, 99.5, 1234.0, 60_000.0, 3_600_000.0, 86_400_000.0] {
                let back = scale.px_to_ms(scale.ms_to_px(ms));
                assert!((back - ms).abs() <= 1e-6 * ms.max(1.0), "pps={pps} ms={ms} back={back}");
            }
        }
    }

    #[test]
    fn test_default_mapping() {
        let scale = TimeScale::default();
        assert_eq!(scale.ms_to_px(1000.0), 50.0);
        assert_eq!(scale.px_to_ms(250.0), 5000.0);
    }

    #[test]
    fn test_zoom_in_clamps_on_fourth_step() {
        let mut scale = TimeScale::default();
        scale.zoom_in();
        scale.zoom_in();
        scale.zoom_in();
        assert!((scale.pixels_per_second() - 168.75).abs() < 1e-9);
        scale.zoom_in();
        assert_eq!(scale.pixels_per_second(), MAX_PIXELS_PER_SECOND);
    }

    #[test]
    fn test_zoom_out_clamps() {
        let mut scale = TimeScale::default();
        for _ in 0..10 {
            scale.zoom_out();
        }
        assert_eq!(scale.pixels_per_second(), MIN_PIXELS_PER_SECOND);
    }

    #[test]
    fn test_set_rejects_out_of_range() {
        assert_eq!(TimeScale::new(5000.0).pixels_per_second(), MAX_PIXELS_PER_SECOND);
        assert_eq!(TimeScale::new(f64::NAN).pixels_per_second(), DEFAULT_PIXELS_PER_SECOND);
    }
}
