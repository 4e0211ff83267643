//! Message transport abstraction.
//!
//! This module provides the `EventQueue` trait the engine polls, and
//! the queue implementations that ship with the crate.

pub mod base;
pub mod memory;
pub mod mock;
pub mod redis_queue;

pub use base::{EventQueue, TransportError};
pub use memory::InMemoryQueue;
pub use mock::MockQueue;
pub use redis_queue::RedisQueue;
