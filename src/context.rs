use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::Error;

/// Cancellation and deadline input of synchronous client calls
///
/// Cancelling a context (or letting its deadline pass) only stops the caller from waiting. The
/// request that was already dispatched stays in flight and its callbacks still fire.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// Creates a context which is never cancelled unless [`cancel`](Context::cancel) is called
    pub fn background() -> Self {
        Default::default()
    }

    /// Creates a context which expires after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Creates a context which expires at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Creates a child context which is cancelled along with `self`
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancels this context and all its children
    pub fn cancel(&self) {
        self.token.cancel()
    }

    /// Deadline of this context, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the cancellation error if this context is already done
    pub fn err(&self) -> Option<Error> {
        if self.token.is_cancelled() {
            return Some(Error::Cancelled);
        }

        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Some(Error::DeadlineExceeded),
            _ => None,
        }
    }

    /// Completes when this context is cancelled or expires, returning the matching error
    pub async fn done(&self) -> Error {
        match self.deadline {
            None => {
                self.token.cancelled().await;
                Error::Cancelled
            }
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => Error::Cancelled,
                    _ = sleep_until(deadline) => Error::DeadlineExceeded,
                }
            }
        }
    }
}
