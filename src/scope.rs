//! Disposal-aware scope for network calls made on behalf of a view.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Lifetime of a view. Work started through [`ViewScope::run`] is dropped at
/// its next await point once the scope is disposed, so it cannot update
/// state afterwards. Dropping the scope disposes it.
#[derive(Debug, Default)]
pub struct ViewScope {
    token: CancellationToken,
    in_flight: Arc<AtomicUsize>,
}

/// Read-only view of whether a scope has work running.
#[derive(Debug, Clone)]
pub struct ScopeActivity {
    in_flight: Arc<AtomicUsize>,
}

impl ScopeActivity {
    pub fn is_idle(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) == 0
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(count)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cloneable handle for disposing the scope from elsewhere, e.g. a
    /// signal handler.
    pub fn handle(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Tracks work started through [`ViewScope::run`], for callers that
    /// need to know whether disposing the scope will unwind anything.
    pub fn activity(&self) -> ScopeActivity {
        ScopeActivity {
            in_flight: self.in_flight.clone(),
        }
    }

    pub fn dispose(&self) {
        self.token.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run `fut` unless the scope is disposed first. `None` means the work
    /// was abandoned.
    pub async fn run<F>(&self, fut: F) -> Option<F::Output>
    where
        F: Future,
    {
        if self.is_disposed() {
            return None;
        }
        let _in_flight = InFlight::enter(&self.in_flight);
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                debug!("View disposed, abandoning request");
                None
            }
            out = fut => Some(out),
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
