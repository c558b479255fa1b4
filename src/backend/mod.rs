//! Story backend access: request contract, REST client and the
//! fire-and-forget dispatcher that runs requests off the UI thread.

pub mod api;
pub mod dispatcher;
pub mod http;

pub use api::{Mutation, MoveBody, SplitBody, StoryBackend, StoryDetail, TrimBody};
pub use dispatcher::{DispatchEvent, DispatchMode, MutationDispatcher};
pub use http::HttpBackend;
