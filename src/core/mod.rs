//! Core editor modules - coordinates, layout, gestures, playback
//!
//! These modules form the timeline engine, independent of UI.

pub mod context;
pub mod coords;
pub mod editor;
pub mod interaction;
pub mod keymap;
pub mod layout;
pub mod notify;
pub mod player;

// Re-exports for convenience
pub use context::{EditorContext, PlaybackState};
pub use coords::{Point, TimeScale};
pub use editor::TimelineEditor;
pub use interaction::{Commit, Interaction, TrimSide};
pub use keymap::{EditorCommand, KeyMap};
pub use layout::{ClipHit, ClipLayout, HitZone, Rect};
pub use notify::{Notification, Notifications};
pub use player::{AudioRenderer, NullRenderer, Player};
