//! In-process queue implementation.

use crate::transport::base::{EventQueue, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Unbounded in-memory FIFO.
///
/// Cloning yields another handle to the same queue, so producers can keep
/// pushing while the engine owns a handle.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQueue {
    messages: Arc<Mutex<VecDeque<String>>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, payload: impl Into<String>) {
        self.messages.lock().await.push_back(payload.into());
    }

    pub async fn extend<I, S>(&self, payloads: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut messages = self.messages.lock().await;
        messages.extend(payloads.into_iter().map(Into::into));
    }

    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.lock().await.is_empty()
    }
}

#[async_trait]
impl EventQueue for InMemoryQueue {
    async fn available(&self) -> Result<usize, TransportError> {
        Ok(self.len().await)
    }

    async fn pop_message(&self) -> Result<Option<String>, TransportError> {
        Ok(self.messages.lock().await.pop_front())
    }
}
