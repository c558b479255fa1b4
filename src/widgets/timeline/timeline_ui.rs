//! Timeline UI: toolbar, ruler, lanes, clip bars, playhead and toasts.
//!
//! All state lives in `TimelineEditor`; this module only converts egui
//! pointer/keyboard input into editor calls and paints `editor.layouts()`.
//! Content space is pixels from time 0 / lane 0; the lanes rect maps to it
//! through `editor.scroll_left()`.

use eframe::egui::{self, Color32, Pos2, Rect, Sense, Stroke, Ui, Vec2};
use log::debug;
use std::time::Instant;
use uuid::Uuid;

use super::timeline_helpers::{
    GRIP_HEIGHT, content_x_to_screen, draw_time_ruler, format_time, profile_color, screen_to_content,
};
use crate::core::interaction::TRACK_HEIGHT;
use crate::core::layout::TRIM_HANDLE_PX;
use crate::core::{EditorCommand, HitZone, Interaction, Point, TimelineEditor};

/// Render the whole timeline panel.
pub fn render_timeline(ui: &mut Ui, editor: &mut TimelineEditor, now: Instant) {
    render_resize_grip(ui, editor);
    render_toolbar(ui, editor, now);

    let total_ms = editor.total_ms();
    let playhead_px = editor.playhead_px();
    if let Some(x) = draw_time_ruler(ui, editor.scale(), editor.scroll_left(), total_ms, playhead_px) {
        if let Err(e) = editor.seek_to_x(x, now) {
            debug!("ruler seek ignored: {}", e);
        }
    }

    ui.add_space(2.0);

    let mut lanes_rect = None;
    egui::ScrollArea::vertical()
        .id_salt("storyline_lanes_scroll")
        .max_height(ui.available_height())
        .show(ui, |ui| {
            lanes_rect = Some(render_lanes(ui, editor, now));
        });

    if let Some(rect) = lanes_rect {
        route_active_gesture(ui, editor, rect);
    }
}

/// Transport, zoom and time readout.
pub fn render_toolbar(ui: &mut Ui, editor: &mut TimelineEditor, now: Instant) {
    let mut command = None;
    ui.horizontal(|ui| {
        let play_icon = if editor.is_playing() { "⏸" } else { "▶" };
        if ui.button(play_icon).on_hover_text("Play/Pause (Space)").clicked() {
            command = Some(EditorCommand::TogglePlayPause);
        }
        if ui.button("■").on_hover_text("Stop").clicked() {
            command = Some(EditorCommand::Stop);
        }

        ui.separator();

        if ui.button("−").on_hover_text("Zoom out").clicked() {
            command = Some(EditorCommand::ZoomOut);
        }
        ui.label(format!("{:.0} px/s", editor.scale().pixels_per_second()));
        if ui.button("+").on_hover_text("Zoom in").clicked() {
            command = Some(EditorCommand::ZoomIn);
        }

        ui.separator();

        ui.monospace(format!(
            "{} / {}",
            format_time(editor.playhead_ms()),
            format_time(editor.total_ms())
        ));

        if let Some(selected) = editor.selected_clip() {
            ui.separator();
            if ui.button("Split").on_hover_text("Split at playhead (S)").clicked() {
                command = Some(EditorCommand::SplitAtPlayhead);
            }
            if ui.button("Duplicate").clicked() {
                command = Some(EditorCommand::DuplicateSelected);
            }
            if ui.button("Delete").clicked() {
                command = Some(EditorCommand::DeleteSelected);
            }
            let label = editor
                .clip(&selected)
                .map(|clip| clip.profile_name.clone())
                .unwrap_or(selected);
            ui.weak(label);
        }

        if !editor.is_loaded() || editor.requests_in_flight() > 0 {
            ui.spinner();
        }
    });

    if let Some(command) = command {
        let _ = editor.execute(command, now);
    }
}

fn render_resize_grip(ui: &mut Ui, editor: &mut TimelineEditor) {
    let (rect, response) =
        ui.allocate_exact_size(Vec2::new(ui.available_width(), GRIP_HEIGHT), Sense::drag());
    let active = matches!(editor.interaction(), Interaction::ResizingPanel(_));
    let color = if active || response.hovered() {
        Color32::from_gray(120)
    } else {
        Color32::from_gray(60)
    };
    ui.painter().rect_filled(rect.shrink2(Vec2::new(rect.width() * 0.45, 2.0)), 2.0, color);

    if response.hovered() || active {
        ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeVertical);
    }
    if response.drag_started() {
        if let Some(pos) = response.interact_pointer_pos() {
            if let Err(e) = editor.begin_panel_resize(pos.y as f64) {
                debug!("panel resize refused: {}", e);
            }
        }
    }
}

/// Lanes, clips and playhead. Returns the lanes rect in screen space.
fn render_lanes(ui: &mut Ui, editor: &mut TimelineEditor, now: Instant) -> Rect {
    let (_, content_height) = editor.extent();
    let (response, painter) = ui.allocate_painter(
        Vec2::new(ui.available_width(), content_height as f32),
        Sense::click_and_drag(),
    );
    let rect = response.rect;
    editor.set_viewport_width(rect.width() as f64);

    // Horizontal wheel pans the timeline.
    if response.hovered() {
        let scroll_delta = ui.ctx().input(|i| i.smooth_scroll_delta);
        if scroll_delta.x.abs() > 0.0 {
            editor.set_scroll_left(editor.scroll_left() - scroll_delta.x as f64);
        }
    }

    let scroll_left = editor.scroll_left();

    for (row, track) in editor.tracks().iter().enumerate() {
        let top = rect.min.y + row as f32 * TRACK_HEIGHT as f32;
        let lane = Rect::from_min_size(Pos2::new(rect.min.x, top), Vec2::new(rect.width(), TRACK_HEIGHT as f32));
        let shade = if row % 2 == 0 { 32 } else { 28 };
        painter.rect_filled(lane, 0.0, Color32::from_gray(shade));
        painter.text(
            Pos2::new(rect.min.x + 4.0, top + 2.0),
            egui::Align2::LEFT_TOP,
            format!("{track}"),
            egui::FontId::monospace(9.0),
            Color32::from_gray(90),
        );
    }

    let selected = editor.selected_clip();
    for layout in editor.layouts() {
        let Some(clip) = editor.clip(&layout.clip_id) else {
            continue;
        };
        let left = content_x_to_screen(layout.rect.left, rect.min.x, scroll_left);
        let bar = Rect::from_min_size(
            Pos2::new(left, rect.min.y + layout.rect.top as f32),
            Vec2::new(layout.rect.width as f32, layout.rect.height as f32),
        );
        if !bar.intersects(rect) {
            continue;
        }

        let mut fill = profile_color(&clip.profile_name);
        if layout.dragging {
            fill = fill.gamma_multiply(0.7);
        }
        painter.rect_filled(bar, 4.0, fill);

        let is_selected = selected.as_deref() == Some(clip.id.as_str());
        let stroke = if is_selected {
            Stroke::new(2.0, Color32::WHITE)
        } else {
            Stroke::new(1.0, Color32::from_gray(20))
        };
        painter.rect_stroke(bar, 4.0, stroke, egui::epaint::StrokeKind::Middle);

        if is_selected || layout.trimming {
            let handle_color = Color32::from_rgba_unmultiplied(255, 255, 255, 160);
            let handle = Vec2::new(TRIM_HANDLE_PX as f32 / 2.0, bar.height());
            painter.rect_filled(Rect::from_min_size(bar.min, handle), 2.0, handle_color);
            painter.rect_filled(
                Rect::from_min_size(Pos2::new(bar.max.x - handle.x, bar.min.y), handle),
                2.0,
                handle_color,
            );
        }

        let text_painter = painter.with_clip_rect(bar.shrink(4.0).intersect(rect));
        text_painter.text(
            bar.min + Vec2::new(6.0, 4.0),
            egui::Align2::LEFT_TOP,
            &clip.profile_name,
            egui::FontId::proportional(11.0),
            Color32::WHITE,
        );
        text_painter.text(
            bar.min + Vec2::new(6.0, 20.0),
            egui::Align2::LEFT_TOP,
            &clip.text,
            egui::FontId::proportional(10.0),
            Color32::from_gray(220),
        );
    }

    let playhead_x = content_x_to_screen(editor.playhead_px(), rect.min.x, scroll_left);
    if rect.x_range().contains(playhead_x) {
        painter.line_segment(
            [Pos2::new(playhead_x, rect.min.y), Pos2::new(playhead_x, rect.max.y)],
            (2.0, Color32::from_rgb(255, 220, 100)),
        );
    }

    // Cursor feedback and press.
    if let Some(pos) = response.hover_pos() {
        if editor.interaction().is_idle() {
            let point = screen_to_content(pos, rect, scroll_left);
            match editor.hit_at(point).map(|hit| hit.zone) {
                Some(HitZone::TrimStart | HitZone::TrimEnd) => {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal)
                }
                Some(HitZone::Body) => ui.ctx().set_cursor_icon(egui::CursorIcon::Grab),
                None => {}
            }
            if ui.input(|i| i.pointer.primary_pressed()) {
                if let Err(e) = editor.pointer_down(point, now) {
                    debug!("press ignored: {}", e);
                }
            }
        }
    }

    rect
}

/// Feed pointer motion into the active gesture, even outside the lanes.
fn route_active_gesture(ui: &Ui, editor: &mut TimelineEditor, lanes_rect: Rect) {
    if editor.interaction().is_idle() {
        return;
    }
    let (pos, down, released) = ui.input(|i| {
        (i.pointer.latest_pos(), i.pointer.primary_down(), i.pointer.primary_released())
    });
    let Some(pos) = pos else {
        editor.pointer_cancel();
        return;
    };
    let point = match editor.interaction() {
        Interaction::ResizingPanel(_) => Point::new(pos.x as f64, pos.y as f64),
        Interaction::Dragging(_) => {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
            screen_to_content(pos, lanes_rect, editor.scroll_left())
        }
        _ => {
            ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
            screen_to_content(pos, lanes_rect, editor.scroll_left())
        }
    };
    if released || !down {
        editor.pointer_up(point);
    } else {
        editor.pointer_move(point);
    }
}

/// Dismissible toasts in the bottom-right corner.
pub fn render_toasts(ctx: &egui::Context, editor: &mut TimelineEditor) {
    let mut dismissed: Vec<Uuid> = Vec::new();
    egui::Area::new(egui::Id::new("storyline_toasts"))
        .anchor(egui::Align2::RIGHT_BOTTOM, Vec2::new(-12.0, -12.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            for toast in editor.notifications() {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(320.0);
                    ui.horizontal(|ui| {
                        ui.strong(&toast.title);
                        if ui.small_button("✕").clicked() {
                            dismissed.push(toast.id);
                        }
                    });
                    ui.label(&toast.message);
                });
            }
        });
    for id in dismissed {
        editor.dismiss_notification(id);
    }
}

/// Route key presses to the editor unless a text field has focus.
pub fn handle_keyboard(ctx: &egui::Context, editor: &mut TimelineEditor, now: Instant) {
    let text_focused = ctx.wants_keyboard_input();
    let events = ctx.input(|i| i.events.clone());
    for event in events {
        if let egui::Event::Key { key, pressed: true, repeat: false, modifiers, .. } = event {
            let key_str = format!("{:?}", key);
            if let Some(command) = editor.handle_key(&key_str, modifiers.command, text_focused, now) {
                debug!("{} -> {:?}", key_str, command);
            }
        }
    }
}
