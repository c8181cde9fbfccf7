//! Application state

use std::sync::Arc;
use std::time::Duration;

use tasks_core::task::TaskRepository;
use tasks_core::OpContext;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Shared application state
///
/// Generic over the repository so one router serves either backend.
pub struct AppState<R> {
    inner: Arc<AppStateInner<R>>,
}

struct AppStateInner<R> {
    repository: Arc<R>,
    page_size: u32,
    request_timeout: Duration,
    shutdown: CancellationToken,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: TaskRepository> AppState<R> {
    pub fn new(repository: Arc<R>, page_size: u32, request_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                repository,
                page_size,
                request_timeout,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Get reference to the task repository
    pub fn repository(&self) -> &R {
        &self.inner.repository
    }

    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    /// Cancelled when the server stops; aborts in-flight repository work
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }

    /// Fresh context for one request's repository work
    pub fn op_context(&self) -> OpContext {
        OpContext::with_token(self.inner.shutdown.child_token())
            .deadline_at(Instant::now() + self.inner.request_timeout)
    }
}
