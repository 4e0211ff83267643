//! # bt-core
//!
//! Core batch step tracking engine for batch-tracker.
//!
//! This crate provides:
//! - Per-step state machines with active, idle and performance accounting
//! - A sequence coordinator that advances a batch along its routing
//! - The polling engine that feeds a sequence from a message queue
//! - Configuration loading from the `.batch-tracker/` directory
//!
//! ## Modules
//!
//! - [`step`]: Step state machine
//! - [`sequence`]: Routing validation and sequence coordination
//! - [`decode`]: Step-start message decoding
//! - [`transport`]: Message queue trait and implementations
//! - [`clock`]: Injectable time source
//! - [`engine`]: Poll, apply, tick and render loop
//! - [`config`]: Configuration loading and management
//! - [`logging`]: Tracing subscriber setup

pub mod clock;
pub mod config;
pub mod decode;
pub mod engine;
pub mod logging;
pub mod sequence;
pub mod step;
pub mod transport;
