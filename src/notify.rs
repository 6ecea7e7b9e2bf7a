//! Transient user notifications (toasts)

use crate::error::SwapboardError;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a toast stays on screen
pub const DEFAULT_TTL: Duration = Duration::from_secs(4);

/// Most toasts kept at once; older ones are dropped first
const MAX_QUEUED: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    pub fn label(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "ok",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub created: Instant,
}

pub struct Notifications {
    queue: VecDeque<Notification>,
    ttl: Duration,
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            ttl,
        }
    }

    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        self.push_at(level, message, Instant::now());
    }

    pub fn push_at(&mut self, level: Level, message: impl Into<String>, now: Instant) {
        if self.queue.len() == MAX_QUEUED {
            self.queue.pop_front();
        }
        self.queue.push_back(Notification {
            level,
            message: message.into(),
            created: now,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Level::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message);
    }

    /// Surface an error using its user-facing message
    pub fn report_error(&mut self, error: &SwapboardError) {
        self.error(error.user_message());
    }

    /// Drop everything older than the time to live
    pub fn prune_at(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.queue
            .retain(|n| now.saturating_duration_since(n.created) < ttl);
    }

    pub fn prune(&mut self) {
        self.prune_at(Instant::now());
    }

    /// Newest live notification
    pub fn current(&self) -> Option<&Notification> {
        self.queue.back()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_is_current() {
        let mut toasts = Notifications::default();
        toasts.info("loading");
        toasts.success("done");
        assert_eq!(toasts.current().unwrap().message, "done");
        assert_eq!(toasts.current().unwrap().level, Level::Success);
    }

    #[test]
    fn expired_toasts_are_pruned() {
        let mut toasts = Notifications::new(Duration::from_secs(4));
        let start = Instant::now();
        toasts.push_at(Level::Info, "old", start);
        toasts.push_at(Level::Info, "new", start + Duration::from_secs(3));

        toasts.prune_at(start + Duration::from_secs(5));
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts.current().unwrap().message, "new");

        toasts.prune_at(start + Duration::from_secs(8));
        assert!(toasts.is_empty());
    }

    #[test]
    fn queue_is_bounded() {
        let mut toasts = Notifications::default();
        for i in 0..20 {
            toasts.info(format!("n{}", i));
        }
        assert_eq!(toasts.len(), MAX_QUEUED);
        assert_eq!(toasts.current().unwrap().message, "n19");
    }

    #[test]
    fn errors_use_user_message() {
        let mut toasts = Notifications::default();
        toasts.report_error(&SwapboardError::Timeout);
        let toast = toasts.current().unwrap();
        assert_eq!(toast.level, Level::Error);
        assert_eq!(toast.message, "The request timed out. Please try again.");
    }
}
