//! Internal test modules - whitebox tests with crate access
//!
//! Tests here drive the whole container through the acceptance harness and
//! can reach crate-private items when checking internal invariants.

// Harness-based acceptance tests
mod acceptance_scenarios;
