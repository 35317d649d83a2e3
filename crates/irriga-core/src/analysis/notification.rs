//! Transient, auto-dismissing messages.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A message visible for `ttl` after it was shown.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Unique per analyzer; dismissal timers match on it.
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub ttl: Duration,
    pub shown_at: Instant,
}

impl Notification {
    pub fn new(id: u64, kind: NotificationKind, message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            id,
            kind,
            message: message.into(),
            ttl,
            shown_at: Instant::now(),
        }
    }
}
