//! storyline - multi-track timeline editor for voice story clips
//!
//! Re-exports all modules for use by the binary target.

// Core editor (coordinates, layout, gestures, playback)
pub mod core;

// Backend access (REST client, dispatcher)
pub mod backend;

// App modules
pub mod cli;
pub mod config;
pub mod entities;
pub mod error;
pub mod widgets;

// Re-export commonly used types
pub use backend::{DispatchMode, HttpBackend, MutationDispatcher, StoryBackend};
pub use crate::core::{EditorCommand, EditorContext, Player, TimelineEditor};
pub use entities::Clip;
pub use error::{BackendError, EditError};
