//! Mock queue implementation for testing.

use crate::transport::base::{EventQueue, TransportError};
use crate::transport::memory::InMemoryQueue;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// An in-memory queue whose polls can be made to fail.
#[derive(Debug, Clone)]
pub struct MockQueue {
    inner: InMemoryQueue,
    failing_polls: Arc<AtomicUsize>,
    always_fail: bool,
}

impl MockQueue {
    pub fn new(inner: InMemoryQueue) -> Self {
        Self {
            inner,
            failing_polls: Arc::new(AtomicUsize::new(0)),
            always_fail: false,
        }
    }

    /// Every poll fails.
    pub fn unavailable() -> Self {
        Self {
            inner: InMemoryQueue::new(),
            failing_polls: Arc::new(AtomicUsize::new(0)),
            always_fail: true,
        }
    }

    /// The next `polls` polls fail, later ones reach `inner`.
    pub fn flaky(inner: InMemoryQueue, polls: usize) -> Self {
        Self {
            inner,
            failing_polls: Arc::new(AtomicUsize::new(polls)),
            always_fail: false,
        }
    }

    pub fn inner(&self) -> &InMemoryQueue {
        &self.inner
    }

    fn should_fail(&self) -> bool {
        if self.always_fail {
            return true;
        }
        self.failing_polls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl EventQueue for MockQueue {
    async fn available(&self) -> Result<usize, TransportError> {
        if self.should_fail() {
            return Err(TransportError::Unavailable(
                "Mock transport not available".to_string(),
            ));
        }
        self.inner.available().await
    }

    async fn pop_message(&self) -> Result<Option<String>, TransportError> {
        if self.always_fail {
            return Err(TransportError::Closed);
        }
        self.inner.pop_message().await
    }
}
