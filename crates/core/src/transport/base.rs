//! Base EventQueue trait and supporting types.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a transport while polling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    #[error("Transport closed")]
    Closed,
}

/// A FIFO queue of serialized step-start messages.
///
/// Implementations wrap whatever carries the messages (a Redis list, a
/// spool directory, an in-process buffer). The engine owns its handle and
/// polls it once per cycle: it reads [`available`](Self::available) once and
/// then pops at most that many messages.
#[async_trait]
pub trait EventQueue: Send + Sync {
    /// Number of messages waiting right now.
    async fn available(&self) -> Result<usize, TransportError>;

    /// Remove and return the oldest message, or `None` when empty.
    async fn pop_message(&self) -> Result<Option<String>, TransportError>;
}
