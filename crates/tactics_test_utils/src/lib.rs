//! # Tactics Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Data and battle fixtures
//! - Determinism test harness
//! - Board occupancy invariants
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod invariants;

/// Re-export proptest for convenience.
pub use proptest;
