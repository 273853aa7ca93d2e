//! Outline data model core.
//! Nodes shared by clones, path-qualified positions, and structural edits
//! that keep clone bookkeeping consistent.

pub mod config;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{ConfigError, OutlineConfig, DEFAULT_HEADLINE};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::node::{normalize_headline, NodeId, NodeRecord, NodeStatus, HIDDEN_ROOT_ID};
pub use model::position::{PathStep, Position};
pub use service::outline::{Outline, OutlineError, OutlineResult};
pub use service::search::{match_headline, UNL_SEPARATOR};
pub use service::traversal::{OutlineIter, SubtreeIter};
pub use store::clone_registry::{Attachment, CloneRegistry};
pub use store::node_store::{NodeStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
