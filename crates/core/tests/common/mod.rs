//! Common test utilities shared by the integration tests.
//!
//! - Fixtures: timestamps, routings, wire payloads and sample projects
//! - Assertions over published events

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
