//! # Battle Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Fixture tables and fleets
//! - In-memory engines and output rendering
//! - Stub engine scripts for process tests (unix only)
//! - Determinism harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
#[cfg(unix)]
pub mod scripts;
pub mod seeds;
pub mod strategies;
pub mod stub;

/// Re-export proptest for convenience.
pub use proptest;
