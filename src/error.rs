//! Error types for local gesture validation and remote story requests.
//!
//! Two categories:
//! - [`EditError`] - rejected locally, before any request is sent
//! - [`BackendError`] - transport or backend-side failure of a request
//!
//! Neither is fatal to the editor; both end up as notifications.

use thiserror::Error;

/// Invalid gesture or command, rejected without contacting the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("another gesture is already in progress")]
    GestureInProgress,
    #[error("no clip selected")]
    NoSelection,
    #[error("clip {0} is not on this timeline")]
    UnknownClip(String),
    #[error("playhead must be inside the clip (offset {split_time_ms} ms, clip length {effective_ms} ms)")]
    InvalidSplit { split_time_ms: i64, effective_ms: i64 },
    #[error("cannot seek while a clip is being dragged or trimmed")]
    SeekDuringGesture,
}

/// Failure talking to the story backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// Longest response body kept in a [`BackendError::Status`] message.
pub const MAX_ERROR_BODY: usize = 512;

impl BackendError {
    /// Build a status error, truncating large bodies.
    pub fn status(status: u16, body: String) -> Self {
        let body = if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}...(truncated)", &body[..cut])
        } else {
            body
        };
        BackendError::Status { status, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_body_truncated() {
        let err = BackendError::status(500, "x".repeat(2000));
        let msg = err.to_string();
        assert!(msg.starts_with("HTTP 500: "));
        assert!(msg.ends_with("...(truncated)"));
        assert!(msg.len() < 600);
    }

    #[test]
    fn test_invalid_split_message() {
        let err = EditError::InvalidSplit { split_time_ms: -1000, effective_ms: 5000 };
        assert!(err.to_string().contains("-1000"));
    }
}
