//! Canonical node record storage.
//!
//! # Responsibility
//! - Own every `NodeRecord`, keyed by id.
//! - Provide content reads and writes shared by all clones of a node.
//! - Expose child-sequence edits to the outline service only.
//!
//! # Invariants
//! - The hidden root record always exists and is never removed.
//! - Ids are unique; nil ids are reserved for the hidden root.
//! - Content writes mark the record dirty.

use crate::model::node::{normalize_headline, NodeId, NodeRecord, HIDDEN_ROOT_ID};
use log::debug;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from node store and clone registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record with this id.
    NodeNotFound(NodeId),
    /// Caller-supplied id is already in use.
    DuplicateNodeId(NodeId),
    /// Nil id is reserved for the hidden root.
    NilNodeId,
    /// Child index is outside the parent's children.
    ChildIndexOutOfRange {
        parent: NodeId,
        index: usize,
        len: usize,
    },
    /// Registry has no such attachment.
    AttachmentNotFound {
        child: NodeId,
        parent: NodeId,
        index: usize,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::DuplicateNodeId(id) => write!(f, "node id already in use: {id}"),
            Self::NilNodeId => write!(f, "nil node id is reserved for the hidden root"),
            Self::ChildIndexOutOfRange { parent, index, len } => write!(
                f,
                "child index {index} out of range for parent {parent} with {len} children"
            ),
            Self::AttachmentNotFound {
                child,
                parent,
                index,
            } => write!(
                f,
                "attachment not found: node {child} at index {index} of parent {parent}"
            ),
        }
    }
}

impl Error for StoreError {}

/// Owner of all node records.
#[derive(Debug, Clone)]
pub struct NodeStore {
    records: HashMap<NodeId, NodeRecord>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates a store that holds only the hidden root.
    pub fn new() -> Self {
        let mut records = HashMap::new();
        records.insert(HIDDEN_ROOT_ID, NodeRecord::new(HIDDEN_ROOT_ID, "", ""));
        Self { records }
    }

    /// Creates a detached node with a fresh id.
    pub fn create(&mut self, headline: impl Into<String>, body: impl Into<String>) -> NodeId {
        let mut id = Uuid::new_v4();
        while id.is_nil() || self.records.contains_key(&id) {
            id = Uuid::new_v4();
        }
        self.records.insert(id, NodeRecord::new(id, headline, body));
        id
    }

    /// Creates a detached node with a caller-supplied id.
    ///
    /// # Errors
    /// - `NilNodeId` when `id` is nil.
    /// - `DuplicateNodeId` when `id` already names a node.
    pub fn create_with_id(
        &mut self,
        id: NodeId,
        headline: impl Into<String>,
        body: impl Into<String>,
    ) -> StoreResult<NodeId> {
        if id.is_nil() {
            return Err(StoreError::NilNodeId);
        }
        if self.records.contains_key(&id) {
            return Err(StoreError::DuplicateNodeId(id));
        }
        self.records.insert(id, NodeRecord::new(id, headline, body));
        Ok(id)
    }

    /// Returns the record for `id`.
    pub fn get(&self, id: NodeId) -> StoreResult<&NodeRecord> {
        self.records.get(&id).ok_or(StoreError::NodeNotFound(id))
    }

    pub fn set_headline(&mut self, id: NodeId, headline: impl Into<String>) -> StoreResult<()> {
        let record = self.get_mut(id)?;
        record.headline = normalize_headline(headline.into());
        record.status.dirty = true;
        Ok(())
    }

    pub fn set_body(&mut self, id: NodeId, body: impl Into<String>) -> StoreResult<()> {
        let record = self.get_mut(id)?;
        record.body = body.into();
        record.status.dirty = true;
        Ok(())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.records.contains_key(&id)
    }

    /// Number of nodes, excluding the hidden root.
    pub fn len(&self) -> usize {
        self.records.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of all nodes except the hidden root, in unspecified order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.records.keys().copied().filter(|id| !id.is_nil())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> StoreResult<&mut NodeRecord> {
        self.records
            .get_mut(&id)
            .ok_or(StoreError::NodeNotFound(id))
    }

    pub(crate) fn insert_child_link(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> StoreResult<()> {
        if !self.contains(child) {
            return Err(StoreError::NodeNotFound(child));
        }
        let children = self.get_mut(parent)?.children_mut();
        if index > children.len() {
            return Err(StoreError::ChildIndexOutOfRange {
                parent,
                index,
                len: children.len(),
            });
        }
        children.insert(index, child);
        Ok(())
    }

    pub(crate) fn remove_child_link(&mut self, parent: NodeId, index: usize) -> StoreResult<NodeId> {
        let children = self.get_mut(parent)?.children_mut();
        if index >= children.len() {
            return Err(StoreError::ChildIndexOutOfRange {
                parent,
                index,
                len: children.len(),
            });
        }
        Ok(children.remove(index))
    }

    /// Drops a record. The caller must have released its attachments.
    pub(crate) fn remove_record(&mut self, id: NodeId) -> StoreResult<NodeRecord> {
        if id.is_nil() {
            return Err(StoreError::NilNodeId);
        }
        let record = self.records.remove(&id).ok_or(StoreError::NodeNotFound(id))?;
        debug!("event=node_drop module=store status=ok node={id}");
        Ok(record)
    }
}
