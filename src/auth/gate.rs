use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, warn};

use super::clock::Clock;
use super::session::SessionStore;

/// Outcome of a single gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    Valid { expires_at_ms: i64 },
    Missing,
    /// Expired (or unreadable) and cleared by this evaluation.
    Expired,
}

impl GateStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, GateStatus::Valid { .. })
    }
}

/// Validity predicate over the session store.
///
/// Evaluation is synchronous and local: one store read, an integer
/// comparison, and a `clear` when the session is past its expiry.
#[derive(Clone)]
pub struct AuthGate {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
}

impl AuthGate {
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn is_session_valid(&self) -> bool {
        self.status().is_valid()
    }

    pub fn status(&self) -> GateStatus {
        let session = match self.store.read() {
            Ok(Some(session)) => session,
            Ok(None) => return GateStatus::Missing,
            Err(e) => {
                warn!(error = %e, "Unreadable session, treating as expired");
                self.clear_expired();
                return GateStatus::Expired;
            }
        };

        let now = self.clock.now_ms();
        if session.is_expired_at(now) {
            debug!(expired_at = session.expires_at_ms, now, "Session expired");
            self.clear_expired();
            return GateStatus::Expired;
        }

        GateStatus::Valid {
            expires_at_ms: session.expires_at_ms,
        }
    }

    /// Time left on a valid session.
    pub fn remaining(&self) -> Option<Duration> {
        match self.status() {
            GateStatus::Valid { expires_at_ms } => {
                Some(Duration::milliseconds(expires_at_ms - self.clock.now_ms()))
            }
            _ => None,
        }
    }

    fn clear_expired(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear expired session");
        }
    }
}
