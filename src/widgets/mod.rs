//! UI Widgets - egui front-end over the headless editor core

pub mod timeline;
