//! Story backend contract.
//!
//! # Purpose
//!
//! The backend owns every story item. The editor only reads clips and asks
//! for mutations through [`StoryBackend`]; the authoritative state always
//! comes back through `fetch_clips`.
//!
//! # Key types
//!
//! - [`StoryBackend`] - blocking request interface, implemented by `HttpBackend`
//! - [`Mutation`] - one committed edit (move, trim, split, duplicate, delete)
//! - `MoveBody`, `TrimBody`, `SplitBody` - JSON request bodies
//!
//! # Used by
//!
//! - `backend/dispatcher.rs` - runs mutations on background threads
//! - `core/editor.rs` - builds mutations from finished gestures and commands

use serde::{Deserialize, Serialize};

use crate::entities::Clip;
use crate::error::BackendError;

/// Blocking story API. Calls may take arbitrarily long; callers run them
/// off the UI thread.
pub trait StoryBackend: Send + Sync {
    /// All clips of a story, in backend order.
    fn fetch_clips(&self, story_id: &str) -> Result<Vec<Clip>, BackendError>;
    fn move_clip(&self, story_id: &str, item_id: &str, body: &MoveBody) -> Result<Clip, BackendError>;
    fn trim_clip(&self, story_id: &str, item_id: &str, body: &TrimBody) -> Result<Clip, BackendError>;
    /// Returns the two clips replacing the original.
    fn split_clip(&self, story_id: &str, item_id: &str, body: &SplitBody) -> Result<Vec<Clip>, BackendError>;
    fn duplicate_clip(&self, story_id: &str, item_id: &str) -> Result<Clip, BackendError>;
    fn remove_clip(&self, story_id: &str, item_id: &str) -> Result<(), BackendError>;
    /// URL of the rendered audio for a generation (consumed by waveform views).
    fn audio_url(&self, generation_id: &str) -> String;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveBody {
    pub start_time_ms: i64,
    pub track: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimBody {
    pub trim_start_ms: i64,
    pub trim_end_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitBody {
    pub split_time_ms: i64,
}

/// Story detail as returned by `GET /stories/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryDetail {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<Clip>,
}

/// One committed edit, sent to the backend as a single request.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Move { story_id: String, item_id: String, body: MoveBody },
    Trim { story_id: String, item_id: String, body: TrimBody },
    Split { story_id: String, item_id: String, body: SplitBody },
    Duplicate { story_id: String, item_id: String },
    Delete { story_id: String, item_id: String },
}

impl Mutation {
    /// Human-readable operation name, used in notifications.
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Move { .. } => "Move",
            Mutation::Trim { .. } => "Trim",
            Mutation::Split { .. } => "Split",
            Mutation::Duplicate { .. } => "Duplicate",
            Mutation::Delete { .. } => "Delete",
        }
    }

    pub fn story_id(&self) -> &str {
        match self {
            Mutation::Move { story_id, .. }
            | Mutation::Trim { story_id, .. }
            | Mutation::Split { story_id, .. }
            | Mutation::Duplicate { story_id, .. }
            | Mutation::Delete { story_id, .. } => story_id,
        }
    }

    pub fn item_id(&self) -> &str {
        match self {
            Mutation::Move { item_id, .. }
            | Mutation::Trim { item_id, .. }
            | Mutation::Split { item_id, .. }
            | Mutation::Duplicate { item_id, .. }
            | Mutation::Delete { item_id, .. } => item_id,
        }
    }

    /// Run against `backend`. The returned clips are ignored; the editor
    /// refetches instead.
    pub fn apply(&self, backend: &dyn StoryBackend) -> Result<(), BackendError> {
        match self {
            Mutation::Move { story_id, item_id, body } => backend.move_clip(story_id, item_id, body).map(drop),
            Mutation::Trim { story_id, item_id, body } => backend.trim_clip(story_id, item_id, body).map(drop),
            Mutation::Split { story_id, item_id, body } => backend.split_clip(story_id, item_id, body).map(drop),
            Mutation::Duplicate { story_id, item_id } => backend.duplicate_clip(story_id, item_id).map(drop),
            Mutation::Delete { story_id, item_id } => backend.remove_clip(story_id, item_id),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::recording::RecordingBackend;
    use super::*;
    use crate::entities::clip::test_clip;

    #[test]
    fn test_mutation_names_and_ids() {
        let m = Mutation::Split {
            story_id: "s".into(),
            item_id: "i".into(),
            body: SplitBody { split_time_ms: 10 },
        };
        assert_eq!(m.name(), "Split");
        assert_eq!(m.story_id(), "s");
        assert_eq!(m.item_id(), "i");
    }

    #[test]
    fn test_apply_routes_to_backend() {
        let backend = RecordingBackend::with_clips(vec![test_clip("a", 0, 0, 2.0)]);
        let m = Mutation::Move {
            story_id: "s".into(),
            item_id: "a".into(),
            body: MoveBody { start_time_ms: 700, track: 1 },
        };
        m.apply(&backend).unwrap();
        assert_eq!(backend.recorded(), vec![m]);
        assert_eq!(backend.fetch_clips("s").unwrap()[0].start_time_ms, 700);
    }

    #[test]
    fn test_body_json_shape() {
        let json = serde_json::to_value(MoveBody { start_time_ms: 5000, track: -1 }).unwrap();
        assert_eq!(json, serde_json::json!({ "start_time_ms": 5000, "track": -1 }));
        let detail: StoryDetail = serde_json::from_str(r#"{"id":"s","name":"Tale"}"#).unwrap();
        assert!(detail.items.is_empty());
    }
}
