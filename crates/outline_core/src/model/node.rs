//! Node domain model.
//!
//! # Responsibility
//! - Define the canonical content record shared by every clone of a node.
//! - Keep headline normalization in one place.
//!
//! # Invariants
//! - `id` is stable and never reused for another node.
//! - `headline` never contains line breaks.
//! - `children` order is the outline order under this node.
//!
//! # See also
//! - `store::node_store` for record ownership and lifetime.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Global node identifier (gnx).
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NodeId = Uuid;

/// Reserved id of the hidden root whose children are the top-level nodes.
pub const HIDDEN_ROOT_ID: NodeId = Uuid::nil();

/// Per-node status bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    /// User-visible mark.
    pub marked: bool,
    /// Content changed since the last `clear_dirty`.
    pub dirty: bool,
    /// Children are shown by views.
    pub expanded: bool,
}

/// Canonical record for one outline node.
///
/// Clones are not copies: every attachment of a node refers to this record,
/// so edits are visible from all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Stable global id.
    pub id: NodeId,
    /// Single-line title.
    pub headline: String,
    /// Multi-line text.
    pub body: String,
    pub status: NodeStatus,
    children: Vec<NodeId>,
}

impl NodeRecord {
    /// Creates a detached record with no children.
    pub fn new(id: NodeId, headline: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            headline: normalize_headline(headline.into()),
            body: body.into(),
            status: NodeStatus::default(),
            children: Vec::new(),
        }
    }

    /// Ordered child ids. The same id may appear more than once.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_hidden_root(&self) -> bool {
        self.id == HIDDEN_ROOT_ID
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }
}

/// Folds line breaks into single spaces so headlines stay one line.
pub fn normalize_headline(value: String) -> String {
    if !value.contains(['\n', '\r']) {
        return value;
    }
    value
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}
