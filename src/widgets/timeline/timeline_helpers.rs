//! Timeline UI helpers: coordinate conversion, ruler and colors.
use eframe::egui::{self, Color32, Pos2, Rect, Sense, Ui, Vec2};

use crate::core::{Point, TimeScale};

pub(super) const RULER_HEIGHT: f32 = 20.0;
pub(super) const GRIP_HEIGHT: f32 = 6.0;

/// Screen position inside the lanes rect -> timeline content space.
pub(super) fn screen_to_content(pos: Pos2, lanes_rect: Rect, scroll_left: f64) -> Point {
    Point::new(
        (pos.x - lanes_rect.min.x) as f64 + scroll_left,
        (pos.y - lanes_rect.min.y) as f64,
    )
}

pub(super) fn content_x_to_screen(x: f64, rect_min_x: f32, scroll_left: f64) -> f32 {
    rect_min_x + (x - scroll_left) as f32
}

/// Ruler tick spacing in ms: at least ~60 px between labels.
pub(super) fn ruler_step_ms(scale: &TimeScale) -> i64 {
    const STEPS: [i64; 7] = [250, 500, 1_000, 2_000, 5_000, 10_000, 30_000];
    STEPS
        .iter()
        .copied()
        .find(|step| scale.ms_to_px(*step as f64) >= 60.0)
        .unwrap_or(60_000)
}

/// `m:ss.t` for the ruler and time readout.
pub(super) fn format_time(ms: i64) -> String {
    let ms = ms.max(0);
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let tenths = (ms % 1_000) / 100;
    format!("{}:{:02}.{}", minutes, seconds, tenths)
}

/// Draw the time ruler. Returns the content-space x of a click or drag.
pub(super) fn draw_time_ruler(
    ui: &mut Ui,
    scale: &TimeScale,
    scroll_left: f64,
    total_ms: i64,
    playhead_px: f64,
) -> Option<f64> {
    let (rect, response) = ui.allocate_exact_size(
        Vec2::new(ui.available_width(), RULER_HEIGHT),
        Sense::click_and_drag(),
    );

    if ui.is_rect_visible(rect) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(25));

        let step = ruler_step_ms(scale);
        let first_visible = scale.px_to_ms(scroll_left).max(0.0) as i64;
        let last_visible = scale.px_to_ms(scroll_left + rect.width() as f64) as i64;
        let mut t = (first_visible / step) * step;
        while t <= last_visible.min(total_ms) {
            let x = content_x_to_screen(scale.ms_to_px(t as f64), rect.min.x, scroll_left);
            painter.line_segment(
                [Pos2::new(x, rect.max.y - 5.0), Pos2::new(x, rect.max.y)],
                (1.0, Color32::from_gray(100)),
            );
            painter.text(
                Pos2::new(x + 2.0, rect.min.y + 2.0),
                egui::Align2::LEFT_TOP,
                format_time(t),
                egui::FontId::monospace(9.0),
                Color32::from_gray(150),
            );
            t += step;
        }

        let playhead_x = content_x_to_screen(playhead_px, rect.min.x, scroll_left);
        if rect.x_range().contains(playhead_x) {
            painter.line_segment(
                [Pos2::new(playhead_x, rect.min.y), Pos2::new(playhead_x, rect.max.y)],
                (2.0, Color32::from_rgb(255, 220, 100)),
            );
        }
    }

    if response.clicked() || response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            return Some((pos.x - rect.min.x) as f64 + scroll_left);
        }
    }
    None
}

/// Stable bar color per voice profile.
pub(super) fn profile_color(profile_name: &str) -> Color32 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    profile_name.hash(&mut hasher);
    let hue = (hasher.finish() % 360) as f32;
    hsv_to_rgb(hue, 0.55, 0.6)
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Color32 {
    let c = v * s;
    let h_prime = h / 60.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h_prime as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Color32::from_rgb(
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}
