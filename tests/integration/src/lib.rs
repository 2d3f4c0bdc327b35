//! Integration test utilities for the engagement server
//!
//! In-memory store doubles, a manual clock and a stub risk verifier, plus a
//! test server that runs the real router on an ephemeral port.

pub mod fixtures;
pub mod helpers;
pub mod memory;

pub use fixtures::*;
pub use helpers::*;
pub use memory::*;
