//! Transient notices shown alongside the game.

use std::time::{Duration, Instant};

/// Default lifetime of a notice.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// A message that disappears when dismissed or when it expires,
/// whichever comes first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    message: String,
    expires_at: Instant,
}

impl Notice {
    /// Creates a notice that expires `ttl` after `now`.
    pub fn new(message: impl Into<String>, now: Instant, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            expires_at: now + ttl,
        }
    }

    /// The message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// When the notice clears itself.
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Whether the notice has expired at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
