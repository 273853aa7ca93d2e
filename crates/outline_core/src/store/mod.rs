//! Node ownership and clone bookkeeping.
//!
//! # Responsibility
//! - Hold canonical node records (`NodeStore`).
//! - Track attachment points of shared nodes (`CloneRegistry`).
//!
//! # Invariants
//! - Only the outline service edits child sequences, and it updates the store
//!   and the registry in the same call.

pub mod clone_registry;
pub mod node_store;
