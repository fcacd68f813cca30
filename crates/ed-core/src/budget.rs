//! Query budgets: wall-clock deadlines and cooperative cancellation.
//!
//! Neither the ring search nor Dijkstra needs a budget to be correct; a
//! budget only bounds worst-case latency.  Long-running loops poll
//! [`Budget::is_exhausted`] at coarse intervals and bail out with an
//! `Interrupted` error of their own crate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared cancellation flag.  Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Optional deadline plus optional cancellation token.
#[derive(Clone, Debug, Default)]
pub struct Budget {
    deadline: Option<Instant>,
    token:    Option<CancelToken>,
}

impl Budget {
    /// A budget that never runs out.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A budget that runs out `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { deadline: Some(Instant::now() + timeout), token: None }
    }

    /// Attach a cancellation token.  Replaces any previously attached token.
    pub fn with_token(mut self, token: CancelToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `true` once the deadline has passed or the token was cancelled.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        if self.token.as_ref().is_some_and(CancelToken::is_cancelled) {
            return true;
        }
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
