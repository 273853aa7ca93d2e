//! Outline use-case services.
//!
//! # Responsibility
//! - Turn store and registry primitives into position-based navigation,
//!   editing, search and auditing.
//!
//! # See also
//! - `store` for record ownership.

pub mod check;
pub mod outline;
pub mod search;
pub mod traversal;
