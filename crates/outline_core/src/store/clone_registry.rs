//! Attachment bookkeeping for shared nodes.
//!
//! # Responsibility
//! - Track every (parent, child index) attachment point of every node.
//! - Answer clone queries without walking the outline.
//!
//! # Invariants
//! - The attachment count of a node equals the number of times its id appears
//!   across all parents' children sequences.
//! - Attachment indices under one parent track insertions and removals there.

use crate::model::node::NodeId;
use crate::store::node_store::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One place where a node is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Attachment {
    pub parent: NodeId,
    pub index: usize,
}

/// Registry of attachment points, keyed by child id.
#[derive(Debug, Clone, Default)]
pub struct CloneRegistry {
    attachments: HashMap<NodeId, Vec<Attachment>>,
    attached_under: HashMap<NodeId, HashSet<NodeId>>,
}

impl CloneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `child_id` at `index` under `parent_id`.
    ///
    /// Existing attachments under `parent_id` at or after `index` move up one
    /// slot, mirroring the insertion into the parent's children.
    pub fn register_parent(&mut self, child_id: NodeId, parent_id: NodeId, index: usize) {
        self.shift_siblings(parent_id, index, true);
        self.attachments.entry(child_id).or_default().push(Attachment {
            parent: parent_id,
            index,
        });
        self.attached_under
            .entry(parent_id)
            .or_default()
            .insert(child_id);
    }

    /// Removes the attachment of `child_id` at `index` under `parent_id`.
    ///
    /// # Errors
    /// - `AttachmentNotFound` when no such attachment was registered.
    pub fn unregister_parent(
        &mut self,
        child_id: NodeId,
        parent_id: NodeId,
        index: usize,
    ) -> StoreResult<()> {
        let target = Attachment {
            parent: parent_id,
            index,
        };
        let missing = StoreError::AttachmentNotFound {
            child: child_id,
            parent: parent_id,
            index,
        };
        let entries = self.attachments.get_mut(&child_id).ok_or(missing.clone())?;
        let slot = entries
            .iter()
            .position(|entry| *entry == target)
            .ok_or(missing)?;
        entries.swap_remove(slot);

        let still_under_parent = entries.iter().any(|entry| entry.parent == parent_id);
        if entries.is_empty() {
            self.attachments.remove(&child_id);
        }
        if !still_under_parent {
            if let Some(children) = self.attached_under.get_mut(&parent_id) {
                children.remove(&child_id);
                if children.is_empty() {
                    self.attached_under.remove(&parent_id);
                }
            }
        }

        self.shift_siblings(parent_id, index + 1, false);
        Ok(())
    }

    /// Returns `true` when the node is attached in more than one place.
    pub fn is_cloned(&self, id: NodeId) -> bool {
        self.attachment_count(id) > 1
    }

    pub fn attachment_count(&self, id: NodeId) -> usize {
        self.attachments.get(&id).map_or(0, Vec::len)
    }

    /// Attachment points of `id`, sorted by parent then index.
    pub fn attachments(&self, id: NodeId) -> Vec<Attachment> {
        let mut entries = self.attachments.get(&id).cloned().unwrap_or_default();
        entries.sort();
        entries
    }

    /// Parent ids of `id`, one entry per attachment.
    pub fn parents_of(&self, id: NodeId) -> Vec<NodeId> {
        self.attachments(id)
            .into_iter()
            .map(|entry| entry.parent)
            .collect()
    }

    /// Total number of attachments across all nodes.
    pub fn total_attachments(&self) -> usize {
        self.attachments.values().map(Vec::len).sum()
    }

    fn shift_siblings(&mut self, parent_id: NodeId, from_index: usize, up: bool) {
        let Some(siblings) = self.attached_under.get(&parent_id) else {
            return;
        };
        for sibling in siblings {
            let Some(entries) = self.attachments.get_mut(sibling) else {
                continue;
            };
            for entry in entries
                .iter_mut()
                .filter(|entry| entry.parent == parent_id && entry.index >= from_index)
            {
                if up {
                    entry.index += 1;
                } else {
                    entry.index -= 1;
                }
            }
        }
    }
}
