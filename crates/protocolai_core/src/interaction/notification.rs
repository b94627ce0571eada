//! Self-expiring toast queue.
//!
//! Pure FIFO: no deduplication, no priority, and a toast's lifetime is fixed
//! when it is pushed.

use crate::id;
use std::time::{Duration, Instant};

/// Origin of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Raised when a content change is sent for sync.
    Sync,
    /// Raised by agent invocation results and failures.
    Agent,
}

/// Severity used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Input for a new toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub level: NotificationLevel,
    /// Secondary text such as a payload preview.
    pub detail: Option<String>,
}

impl NotificationDraft {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
            level: NotificationLevel::Info,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_level(mut self, level: NotificationLevel) -> Self {
        self.level = level;
        self
    }
}

/// One active toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub level: NotificationLevel,
    pub detail: Option<String>,
    /// Removal deadline; fixed at push time.
    pub expires_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Ordered set of active toasts with independent expiry.
#[derive(Debug)]
pub struct NotificationQueue {
    items: Vec<Notification>,
    ttl: Duration,
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            ttl,
        }
    }

    /// Pushes a plain toast and returns its id.
    pub fn push(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
        now: Instant,
    ) -> String {
        self.push_draft(NotificationDraft::new(title, message, kind), now)
    }

    /// Pushes a toast built from `draft` and returns its id.
    pub fn push_draft(&mut self, draft: NotificationDraft, now: Instant) -> String {
        let id = id::short_id();
        self.items.push(Notification {
            id: id.clone(),
            title: draft.title,
            message: draft.message,
            kind: draft.kind,
            level: draft.level,
            detail: draft.detail,
            expires_at: now + self.ttl,
        });
        id
    }

    /// Drops every toast whose deadline has passed; returns how many.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.is_expired(now));
        before - self.items.len()
    }

    /// Removes one toast early. Returns whether it was present.
    pub fn dismiss(&mut self, notification_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != notification_id);
        before != self.items.len()
    }

    /// Active toasts in insertion order.
    pub fn active(&self) -> &[Notification] {
        &self.items
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
    use super::{NotificationKind, NotificationQueue};
    use std::time::{Duration, Instant};

    const TTL: Duration = Duration::from_millis(5000);

    #[test]
    fn toast_lives_exactly_its_ttl() {
        let mut queue = NotificationQueue::new(TTL);
        let t0 = Instant::now();
        let id = queue.push("Saved", "ok", NotificationKind::Sync, t0);

        assert_eq!(queue.active()[0].id, id);
        assert_eq!(queue.prune(t0 + Duration::from_millis(4999)), 0);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.prune(t0 + TTL), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn toasts_keep_insertion_order_and_expire_independently() {
        let mut queue = NotificationQueue::new(TTL);
        let t0 = Instant::now();
        queue.push("first", "", NotificationKind::Sync, t0);
        queue.push("second", "", NotificationKind::Agent, t0 + Duration::from_millis(2000));
        queue.push("second", "", NotificationKind::Agent, t0 + Duration::from_millis(2000));

        let titles: Vec<&str> = queue.active().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "second"]);

        queue.prune(t0 + TTL);
        assert_eq!(queue.len(), 2);
        queue.prune(t0 + Duration::from_millis(7000));
        assert!(queue.is_empty());
    }

    #[test]
    fn dismiss_removes_only_the_target() {
        let mut queue = NotificationQueue::new(TTL);
        let t0 = Instant::now();
        let first = queue.push("a", "", NotificationKind::Sync, t0);
        queue.push("b", "", NotificationKind::Sync, t0);

        assert!(queue.dismiss(&first));
        assert!(!queue.dismiss(&first));
        assert_eq!(queue.active()[0].title, "b");
    }
}
