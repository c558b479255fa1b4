//! Timeline widget - multi-track clip lanes for one story
//!
//! Horizontal lanes with clip bars, trim handles and a playhead, driven by
//! `core::TimelineEditor`.

mod timeline_helpers;
mod timeline_ui;

pub use timeline_ui::{handle_keyboard, render_timeline, render_toasts, render_toolbar};
