//! # bt-protocol
//!
//! Core protocol definitions and data models for batch-tracker.
//!
//! This crate defines all shared data structures used for:
//! - Routing definitions (the ordered list of process steps for a batch)
//! - Runtime step status and status snapshots
//! - The wire format of inbound step-start messages
//! - Global configuration from `config.toml`
//! - Events emitted by the engine to its sink
//!
//! ## Modules
//!
//! - [`routing_models`]: Routing and routing step definitions
//! - [`step_models`]: Step status and per-step snapshots
//! - [`message_models`]: Inbound step-start message wire format
//! - [`config_models`]: Global configuration from config.toml
//! - [`ipc`]: Events sent from the engine to its sink
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, chrono, ts-rs, and uuid
//! - TypeScript generation: All types derive `TS` for client compatibility
//! - Independent compilation: No dependencies on other batch-tracker crates

pub mod config_models;
pub mod ipc;
pub mod message_models;
pub mod routing_models;
pub mod step_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use ipc::*;
pub use message_models::*;
pub use routing_models::*;
pub use step_models::*;
