//! Mutation dispatcher: committed edits -> backend requests -> outcomes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐  dispatch(Mutation)   ┌────────────────────────┐
//! │  UI thread           │ ────────────────────▶ │ storyline-<op> thread  │
//! │  (TimelineEditor)    │                       │ backend.<op>()         │
//! │                      │ ◀──── Outcome ─────── │                        │
//! │  poll() once/frame   │  crossbeam channel    └────────────────────────┘
//! └──────────────────────┘
//! ```
//!
//! Fire-and-forget: one short-lived thread per request, no retry, no
//! cancellation, no local timeout. Requests may complete in any order.
//! Each successful mutation triggers a refetch; refetches carry a sequence
//! number and results older than the last applied one are dropped, so the
//! replica always converges to the newest server answer.

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use super::api::{Mutation, StoryBackend};
use crate::entities::Clip;
use crate::error::BackendError;

/// Where requests run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchMode {
    /// One background thread per request (normal operation).
    Background,
    /// Run on the caller's thread; outcomes are still delivered via `poll()`.
    Inline,
}

/// Raw completion sent back by a request thread.
#[derive(Debug)]
enum Outcome {
    Mutated { mutation: Mutation, result: Result<(), BackendError> },
    Fetched { seq: u64, story_id: String, result: Result<Vec<Clip>, BackendError> },
}

/// What the editor should do after a poll.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEvent {
    /// A mutation was accepted by the backend.
    Applied { operation: &'static str, item_id: String },
    /// Authoritative clip list for a story.
    ClipsReplaced { story_id: String, clips: Vec<Clip> },
    /// Request failed; show a notification.
    Failed { title: String, message: String },
}

pub struct MutationDispatcher {
    backend: Arc<dyn StoryBackend>,
    mode: DispatchMode,
    tx: Sender<Outcome>,
    rx: Receiver<Outcome>,
    in_flight: Arc<AtomicUsize>,
    next_fetch_seq: u64,
    applied_fetch_seq: u64,
}

impl MutationDispatcher {
    pub fn new(backend: Arc<dyn StoryBackend>, mode: DispatchMode) -> Self {
        let (tx, rx) = unbounded();
        Self {
            backend,
            mode,
            tx,
            rx,
            in_flight: Arc::new(AtomicUsize::new(0)),
            next_fetch_seq: 0,
            applied_fetch_seq: 0,
        }
    }

    pub fn backend(&self) -> &Arc<dyn StoryBackend> {
        &self.backend
    }

    /// Requests sent but not yet drained by `poll()`.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Send one mutation. Returns immediately in background mode.
    pub fn dispatch(&self, mutation: Mutation) {
        info!("dispatch {} for item {}", mutation.name(), mutation.item_id());
        let backend = Arc::clone(&self.backend);
        let name = format!("storyline-{}", mutation.name().to_lowercase());
        self.run(name, move |tx| {
            let result = mutation.apply(backend.as_ref());
            let _ = tx.send(Outcome::Mutated { mutation, result });
        });
    }

    /// Re-read the clip list of `story_id`. Returns the request's sequence number.
    pub fn request_refetch(&mut self, story_id: &str) -> u64 {
        self.next_fetch_seq += 1;
        let seq = self.next_fetch_seq;
        debug!("refetch #{} for story {}", seq, story_id);
        let backend = Arc::clone(&self.backend);
        let story_id = story_id.to_string();
        self.run("storyline-fetch".to_string(), move |tx| {
            let result = backend.fetch_clips(&story_id);
            let _ = tx.send(Outcome::Fetched { seq, story_id, result });
        });
        seq
    }

    fn run(&self, name: String, job: impl FnOnce(&Sender<Outcome>) + Send + 'static) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            DispatchMode::Inline => job(&self.tx),
            DispatchMode::Background => {
                let tx = self.tx.clone();
                // The job is moved into the closure; keep a slot to run it
                // on this thread if the spawn itself fails.
                let slot = Arc::new(std::sync::Mutex::new(Some(job)));
                let thread_slot = Arc::clone(&slot);
                let spawned = thread::Builder::new().name(name.clone()).spawn(move || {
                    let job = thread_slot.lock().unwrap_or_else(|e| e.into_inner()).take();
                    if let Some(job) = job {
                        job(&tx);
                    }
                });
                if let Err(e) = spawned {
                    error!("failed to spawn {}: {}, running inline", name, e);
                    let job = slot.lock().unwrap_or_else(|e| e.into_inner()).take();
                    if let Some(job) = job {
                        job(&self.tx);
                    }
                }
            }
        }
    }

    /// Drain completed requests without blocking.
    pub fn poll(&mut self) -> Vec<DispatchEvent> {
        let mut events = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.handle(outcome, &mut events);
        }
        events
    }

    /// Like `poll()`, but waits up to `timeout` for the first outcome.
    #[cfg(test)]
    fn poll_timeout(&mut self, timeout: std::time::Duration) -> Vec<DispatchEvent> {
        let mut events = Vec::new();
        if let Ok(outcome) = self.rx.recv_timeout(timeout) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.handle(outcome, &mut events);
        }
        events.extend(self.poll());
        events
    }

    fn handle(&mut self, outcome: Outcome, events: &mut Vec<DispatchEvent>) {
        match outcome {
            Outcome::Mutated { mutation, result: Ok(()) } => {
                info!("{} of item {} accepted", mutation.name(), mutation.item_id());
                self.request_refetch(mutation.story_id());
                events.push(DispatchEvent::Applied {
                    operation: mutation.name(),
                    item_id: mutation.item_id().to_string(),
                });
            }
            Outcome::Mutated { mutation, result: Err(e) } => {
                error!("{} of item {} failed: {}", mutation.name(), mutation.item_id(), e);
                events.push(DispatchEvent::Failed {
                    title: format!("{} failed", mutation.name()),
                    message: e.to_string(),
                });
            }
            Outcome::Fetched { seq, story_id, result: Ok(clips) } => {
                if seq <= self.applied_fetch_seq {
                    debug!("dropping stale refetch #{} (applied #{})", seq, self.applied_fetch_seq);
                    return;
                }
                self.applied_fetch_seq = seq;
                debug!("refetch #{} applied: {} clips", seq, clips.len());
                events.push(DispatchEvent::ClipsReplaced { story_id, clips });
            }
            Outcome::Fetched { seq, result: Err(e), .. } => {
                error!("refetch #{} failed: {}", seq, e);
                events.push(DispatchEvent::Failed {
                    title: "Refresh failed".to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
}
