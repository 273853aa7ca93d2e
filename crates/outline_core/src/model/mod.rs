//! Outline domain model.
//!
//! # Responsibility
//! - Define the canonical node record and the position cursor value.
//!
//! # Invariants
//! - Every node is identified by a stable `NodeId`.
//! - Positions never own nodes; they only name an occurrence.

pub mod node;
pub mod position;
