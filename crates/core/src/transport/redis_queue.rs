//! Redis list transport.
//!
//! Producers LPUSH step-start payloads onto a list; the engine reads LLEN
//! once per poll and RPOPs that many, so messages come out oldest first.

use crate::transport::base::{EventQueue, TransportError};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// A queue backed by a Redis list.
///
/// The connection is opened on first use and dropped after any error, so a
/// Redis outage surfaces as [`TransportError::Unavailable`] for that poll and
/// the next poll reconnects.
pub struct RedisQueue {
    client: Client,
    queue_name: String,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl RedisQueue {
    /// Create a queue for list `queue_name` on the server at `url`.
    ///
    /// Only the URL is validated here; no connection is made.
    pub fn new(url: &str, queue_name: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::open(url).map_err(unavailable)?;
        Ok(Self {
            client,
            queue_name: queue_name.into(),
            connection: Mutex::new(None),
        })
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Append a payload the way a producer does (LPUSH).
    pub async fn push(&self, payload: &str) -> Result<(), TransportError> {
        let mut conn = self.connection().await?;
        let result: Result<(), RedisError> = conn.lpush(&self.queue_name, payload).await;
        self.check(result).await
    }

    async fn connection(&self) -> Result<MultiplexedConnection, TransportError> {
        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)?;
        debug!(queue = %self.queue_name, "Connected to Redis");
        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Forget the connection after a failed command.
    async fn check<T>(&self, result: Result<T, RedisError>) -> Result<T, TransportError> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(queue = %self.queue_name, error = %e, "Redis command failed, reconnecting on next poll");
                *self.connection.lock().await = None;
                Err(unavailable(e))
            }
        }
    }
}

#[async_trait]
impl EventQueue for RedisQueue {
    async fn available(&self) -> Result<usize, TransportError> {
        let mut conn = self.connection().await?;
        let result: Result<usize, RedisError> = conn.llen(&self.queue_name).await;
        self.check(result).await
    }

    async fn pop_message(&self) -> Result<Option<String>, TransportError> {
        let mut conn = self.connection().await?;
        let result: Result<Option<String>, RedisError> = conn.rpop(&self.queue_name, None).await;
        self.check(result).await
    }
}

fn unavailable(error: RedisError) -> TransportError {
    TransportError::Unavailable(error.to_string())
}
