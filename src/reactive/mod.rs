//! Single-threaded reactive primitives.
//!
//! The view is a small dataflow graph driven on one logical thread:
//!
//! - [`Source`]: write handle of a replaying value stream. Exactly one owner.
//! - [`Signal`]: cloneable read-only handle over the same stream.
//! - [`Subscription`]: RAII guard that removes its listener on drop.
//! - [`ScopeController`] / [`Scope`] / [`ScopeToken`]: groups subscriptions
//!   under a generation counter so a context switch can retire all of them at
//!   once and discard emissions already in flight.
//!
//! # Invariants
//!
//! 1. Listeners are notified in registration order.
//! 2. The listener list is snapshotted before dispatch, so listeners may
//!    subscribe, unsubscribe or emit re-entrantly.
//! 3. A retired scope token never becomes current again.
//! 4. Subscriptions never keep their source alive.

pub mod scope;
pub mod source;

pub use scope::{Scope, ScopeController, ScopeToken};
pub use source::{Signal, Source, Subscription};
