//! Per-operation cancellation context
//!
//! An `OpContext` carries the caller's cancellation signal and an optional
//! deadline into a repository call. Backends either check it once at entry
//! or race their work against it with [`OpContext::run`].

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct OpContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl OpContext {
    /// A context that is never cancelled unless [`OpContext::cancel`] is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline_at(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self::new().deadline_at(deadline)
    }

    /// Share an existing token, e.g. one owned by the request or the server.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Set or tighten the deadline. A later deadline never extends an earlier one.
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once the token has fired or the deadline has passed.
    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Fail fast with `Error::Cancelled` if the context is already done.
    pub fn check(&self, operation: &str) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled(format!("{operation}: cancelled by caller")));
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(Error::Cancelled(format!("{operation}: deadline exceeded")));
        }
        Ok(())
    }

    /// Drive `future` under a `budget` of its own, composed with this context.
    ///
    /// Whichever fires first (the token, the context deadline or the budget)
    /// drops the future and yields `Error::Cancelled`.
    pub async fn run<T, F>(&self, operation: &str, budget: Duration, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check(operation)?;

        let budget_deadline = Instant::now() + budget;
        let deadline = match self.deadline {
            Some(d) => d.min(budget_deadline),
            None => budget_deadline,
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                Err(Error::Cancelled(format!("{operation}: cancelled by caller")))
            }
            _ = tokio::time::sleep_until(deadline) => {
                Err(Error::Cancelled(format!("{operation}: deadline exceeded")))
            }
            result = future => result,
        }
    }
}
