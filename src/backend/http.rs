//! REST client for the story backend.
//!
//! # Endpoints
//!
//! ```text
//! GET    {base}/stories/{story}                          -> StoryDetail
//! PUT    {base}/stories/{story}/items/{item}/move        {start_time_ms, track}
//! PUT    {base}/stories/{story}/items/{item}/trim        {trim_start_ms, trim_end_ms}
//! POST   {base}/stories/{story}/items/{item}/split       {split_time_ms} -> [Clip]
//! POST   {base}/stories/{story}/items/{item}/duplicate   -> Clip
//! DELETE {base}/stories/{story}/items/{item}
//! GET    {base}/audio/{generation}                       (audio asset)
//! ```
//!
//! Blocking `reqwest` client with no request timeout: a slow backend only
//! delays the refetch. Ids are pushed as path segments, so they are escaped.

use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::api::{MoveBody, SplitBody, StoryBackend, StoryDetail, TrimBody};
use crate::entities::Clip;
use crate::error::BackendError;

pub struct HttpBackend {
    base: Url,
    client: Client,
}

impl HttpBackend {
    /// Client for `base_url` (e.g. `http://127.0.0.1:17493`).
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let base = Url::parse(base_url)
            .map_err(|e| BackendError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder().timeout(None).build()?;
        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn item_endpoint(&self, story_id: &str, item_id: &str, action: Option<&str>) -> Url {
        match action {
            Some(action) => self.endpoint(&["stories", story_id, "items", item_id, action]),
            None => self.endpoint(&["stories", story_id, "items", item_id]),
        }
    }

    /// Send and read the whole body; non-2xx becomes [`BackendError::Status`].
    fn send(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        debug!("backend responded {} ({} bytes)", status, body.len());
        if !status.is_success() {
            return Err(BackendError::status(status.as_u16(), body));
        }
        Ok(body)
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let body = self.send(request)?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl StoryBackend for HttpBackend {
    fn fetch_clips(&self, story_id: &str) -> Result<Vec<Clip>, BackendError> {
        let url = self.endpoint(&["stories", story_id]);
        debug!("GET {}", url);
        let detail: StoryDetail = self.send_json(self.client.get(url))?;
        Ok(detail.items)
    }

    fn move_clip(&self, story_id: &str, item_id: &str, body: &MoveBody) -> Result<Clip, BackendError> {
        let url = self.item_endpoint(story_id, item_id, Some("move"));
        debug!("PUT {} {:?}", url, body);
        self.send_json(self.client.put(url).json(body))
    }

    fn trim_clip(&self, story_id: &str, item_id: &str, body: &TrimBody) -> Result<Clip, BackendError> {
        let url = self.item_endpoint(story_id, item_id, Some("trim"));
        debug!("PUT {} {:?}", url, body);
        self.send_json(self.client.put(url).json(body))
    }

    fn split_clip(&self, story_id: &str, item_id: &str, body: &SplitBody) -> Result<Vec<Clip>, BackendError> {
        let url = self.item_endpoint(story_id, item_id, Some("split"));
        debug!("POST {} {:?}", url, body);
        self.send_json(self.client.post(url).json(body))
    }

    fn duplicate_clip(&self, story_id: &str, item_id: &str) -> Result<Clip, BackendError> {
        let url = self.item_endpoint(story_id, item_id, Some("duplicate"));
        debug!("POST {}", url);
        self.send_json(self.client.post(url))
    }

    fn remove_clip(&self, story_id: &str, item_id: &str) -> Result<(), BackendError> {
        let url = self.item_endpoint(story_id, item_id, None);
        debug!("DELETE {}", url);
        self.send(self.client.delete(url)).map(drop)
    }

    fn audio_url(&self, generation_id: &str) -> String {
        self.endpoint(&["audio", generation_id]).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rouille::{Request, Response};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    fn item_json(id: &str, start: i64, track: i32) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "story_id": "s1",
            "generation_id": format!("g-{id}"),
            "profile_name": "Narrator",
            "start_time_ms": start,
            "track": track,
            "duration": 2.0,
            "trim_start_ms": 0,
            "trim_end_ms": 0
        })
    }

    fn handle(request: &Request, log: &Log) -> Response {
        let mut body = String::new();
        if let Some(mut data) = request.data() {
            use std::io::Read;
            let _ = data.read_to_string(&mut body);
        }
        log.lock().unwrap().push(format!("{} {} {}", request.method(), request.raw_url(), body));

        let path = request.url();
        match (request.method(), path.as_str()) {
            ("GET", "/stories/s1") => Response::json(&serde_json::json!({
                "id": "s1",
                "name": "Tale",
                "items": [item_json("a", 0, 0), item_json("b", 1200, -1)]
            })),
            ("PUT", "/stories/s1/items/a/move") => Response::json(&item_json("a", 5000, -1)),
            ("PUT", "/stories/s1/items/a/trim") => Response::json(&item_json("a", 0, 0)),
            ("POST", "/stories/s1/items/a/split") => {
                Response::json(&serde_json::json!([item_json("a", 0, 0), item_json("a2", 800, 0)]))
            }
            ("POST", "/stories/s1/items/a/duplicate") => Response::json(&item_json("a3", 2000, 0)),
            ("DELETE", "/stories/s1/items/a") => Response::empty_204(),
            ("PUT", "/stories/s1/items/broken/move") => {
                Response::text("item is locked").with_status_code(409)
            }
            ("GET", "/stories/garbage") => Response::text("not json"),
            _ => Response::empty_404(),
        }
    }

    fn serve() -> (HttpBackend, Log, std::sync::mpsc::Sender<()>) {
        let log: Log = Arc::default();
        let server_log = Arc::clone(&log);
        let server = rouille::Server::new("127.0.0.1:0", move |request| handle(request, &server_log))
            .expect("bind test server");
        let addr = server.server_addr();
        let (_handle, stop) = server.stoppable();
        let backend = HttpBackend::new(&format!("http://{addr}")).unwrap();
        (backend, log, stop)
    }

    #[test]
    fn test_fetch_clips() {
        let (backend, _log, stop) = serve();
        let clips = backend.fetch_clips("s1").unwrap();
        assert_eq!(clips.len(), 2);
        assert_eq!(clips[1].track, -1);
        assert_eq!(clips[1].start_time_ms, 1200);
        let _ = stop.send(());
    }

    #[test]
    fn test_mutation_requests() {
        let (backend, log, stop) = serve();
        let moved = backend
            .move_clip("s1", "a", &MoveBody { start_time_ms: 5000, track: -1 })
            .unwrap();
        assert_eq!(moved.start_time_ms, 5000);
        backend.trim_clip("s1", "a", &TrimBody { trim_start_ms: 100, trim_end_ms: 200 }).unwrap();
        assert_eq!(backend.split_clip("s1", "a", &SplitBody { split_time_ms: 800 }).unwrap().len(), 2);
        assert_eq!(backend.duplicate_clip("s1", "a").unwrap().id, "a3");
        backend.remove_clip("s1", "a").unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 5);
        assert!(log[0].starts_with("PUT /stories/s1/items/a/move"));
        assert!(log[0].contains("\"start_time_ms\":5000"));
        assert!(log[0].contains("\"track\":-1"));
        assert!(log[1].contains("\"trim_end_ms\":200"));
        assert!(log[2].contains("\"split_time_ms\":800"));
        assert!(log[3].starts_with("POST /stories/s1/items/a/duplicate"));
        assert!(log[4].starts_with("DELETE /stories/s1/items/a"));
        let _ = stop.send(());
    }

    #[test]
    fn test_error_status_and_decode() {
        let (backend, _log, stop) = serve();
        let err = backend
            .move_clip("s1", "broken", &MoveBody { start_time_ms: 0, track: 0 })
            .unwrap_err();
        match err {
            BackendError::Status { status, body } => {
                assert_eq!(status, 409);
                assert_eq!(body, "item is locked");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(backend.fetch_clips("garbage"), Err(BackendError::Decode(_))));
        let _ = stop.send(());
    }

    #[test]
    fn test_urls() {
        let backend = HttpBackend::new("http://localhost:17493/api/").unwrap();
        assert_eq!(backend.audio_url("gen 1"), "http://localhost:17493/api/audio/gen%201");
        assert_eq!(
            backend.item_endpoint("s", "i/2", Some("trim")).as_str(),
            "http://localhost:17493/api/stories/s/items/i%2F2/trim"
        );
        assert!(matches!(HttpBackend::new("not a url"), Err(BackendError::InvalidUrl(_))));
        assert!(matches!(HttpBackend::new("mailto:x@y"), Err(BackendError::InvalidUrl(_))));
    }
}
