//! Non-blocking toast notifications.
//!
//! Failures never interrupt the editor: they are queued here, painted as
//! toasts and dropped after a timeout or when dismissed.

use log::warn;
use std::time::{Duration, Instant};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub created: Instant,
}

#[derive(Debug)]
pub struct Notifications {
    items: Vec<Notification>,
    lifetime: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl Notifications {
    pub fn new(lifetime: Duration) -> Self {
        Self { items: Vec::new(), lifetime }
    }

    pub fn push(&mut self, title: impl Into<String>, message: impl Into<String>, now: Instant) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            title: title.into(),
            message: message.into(),
            created: now,
        };
        warn!("{}: {}", notification.title, notification.message);
        let id = notification.id;
        self.items.push(notification);
        id
    }

    pub fn dismiss(&mut self, id: Uuid) {
        self.items.retain(|n| n.id != id);
    }

    /// Drop toasts older than the configured lifetime.
    pub fn expire(&mut self, now: Instant) {
        let lifetime = self.lifetime;
        self.items.retain(|n| now.saturating_duration_since(n.created) < lifetime);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_dismiss_expire() {
        let t0 = Instant::now();
        let mut toasts = Notifications::new(Duration::from_secs(5));
        let first = toasts.push("Move failed", "HTTP 500", t0);
        toasts.push("Trim failed", "timeout", t0 + Duration::from_secs(3));
        assert_eq!(toasts.len(), 2);

        toasts.expire(t0 + Duration::from_secs(6));
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts.iter().next().unwrap().title, "Trim failed");

        toasts.dismiss(first);
        assert_eq!(toasts.len(), 1);
        let second = toasts.iter().next().unwrap().id;
        toasts.dismiss(second);
        assert!(toasts.is_empty());
    }
}
