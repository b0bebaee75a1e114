//! Per-user rate limiting for new subscriptions.

use crate::model::UserId;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Outcome of [`CooldownGuard::check_and_arm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    /// The guard was armed; the caller may proceed.
    Allowed,
    /// The previous arm is still within the window. Nothing was changed.
    Blocked { remaining: Duration },
}

impl CooldownDecision {
    pub fn is_blocked(&self) -> bool {
        matches!(self, CooldownDecision::Blocked { .. })
    }
}

/// Minimum spacing between admitted "start tracking" commands, per user.
///
/// Check and arm happen under one lock acquisition, so two concurrent starts
/// from the same user cannot both pass. The lock is never held across an
/// `.await`.
#[derive(Debug, Default)]
pub struct CooldownGuard {
    last_armed: Mutex<HashMap<UserId, Instant>>,
}

impl CooldownGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_and_arm(&self, user: &UserId, window: Duration) -> CooldownDecision {
        let now = Instant::now();
        let mut last_armed = self.last_armed.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(&armed) = last_armed.get(user) {
            let elapsed = now.saturating_duration_since(armed);
            if elapsed < window {
                let remaining = window - elapsed;
                debug!(%user, ?remaining, "Cooldown active");
                return CooldownDecision::Blocked { remaining };
            }
        }

        // Entries past the window carry no information.
        last_armed.retain(|_, armed| now.saturating_duration_since(*armed) < window);
        last_armed.insert(user.clone(), now);
        CooldownDecision::Allowed
    }
}
