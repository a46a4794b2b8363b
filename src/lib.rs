//! Logscope
//!
//! Reactive state coordination for a log-search view over two log domains
//! (service and audit logs).
//!
//! The library is a pure core driven through narrow collaborator traits
//! ([`source`]); the binary wires it to in-memory collaborators filled from
//! a JSON fixture and prints the resulting view.

pub mod config;
pub mod logging;
pub mod model;
pub mod reactive;
pub mod source;
pub mod state;
pub mod view;

// Wiring of the container to in-memory collaborators
pub mod integration;

#[cfg(test)]
mod test_harness;

#[cfg(test)]
mod tests;
