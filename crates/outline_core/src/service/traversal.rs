//! Outline iterators and occurrence lookup.
//!
//! # Responsibility
//! - Enumerate positions in outline order without copying the tree.
//! - Find every occurrence of a node id.
//!
//! # Invariants
//! - Subtree walks never leave the subtree they started in.
//! - Clones are visited once per occurrence unless a `unique_*` form is used.

use crate::model::node::NodeId;
use crate::model::position::Position;
use crate::service::outline::{Outline, OutlineResult};
use std::collections::HashSet;

/// Pre-order walk over a subtree, starting with its root.
pub struct SubtreeIter<'a> {
    outline: &'a Outline,
    root: Position,
    next: Option<Position>,
}

impl Iterator for SubtreeIter<'_> {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = self.outline.step_in_subtree(&self.root, &current);
        Some(current)
    }
}

/// Pre-order walk over the whole outline.
pub struct OutlineIter<'a> {
    outline: &'a Outline,
    next: Option<Position>,
}

impl Iterator for OutlineIter<'_> {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = self.outline.thread_next(&current);
        Some(current)
    }
}

impl Outline {
    /// Every position of the outline in pre-order.
    pub fn all_positions(&self) -> OutlineIter<'_> {
        OutlineIter {
            outline: self,
            next: self.root_position(),
        }
    }

    /// `position` followed by its descendants in pre-order.
    pub fn self_and_subtree(&self, position: &Position) -> OutlineResult<SubtreeIter<'_>> {
        self.ensure_valid(position)?;
        Ok(SubtreeIter {
            outline: self,
            root: position.clone(),
            next: Some(position.clone()),
        })
    }

    /// Descendants of `position` in pre-order.
    pub fn subtree(&self, position: &Position) -> OutlineResult<SubtreeIter<'_>> {
        let mut iter = self.self_and_subtree(position)?;
        iter.next();
        Ok(iter)
    }

    pub fn children(&self, position: &Position) -> OutlineResult<Vec<Position>> {
        self.ensure_valid(position)?;
        Ok(self
            .children_of(position.node())
            .iter()
            .enumerate()
            .map(|(index, node)| position.child(*node, index))
            .collect())
    }

    pub fn following_siblings(&self, position: &Position) -> OutlineResult<Vec<Position>> {
        Ok(self
            .self_and_siblings(position)?
            .into_iter()
            .skip(position.child_index() + 1)
            .collect())
    }

    /// All positions sharing `position`'s parent, `position` included.
    pub fn self_and_siblings(&self, position: &Position) -> OutlineResult<Vec<Position>> {
        self.ensure_valid(position)?;
        Ok(self
            .children_of(position.parent_node())
            .iter()
            .enumerate()
            .map(|(index, node)| position.sibling(*node, index))
            .collect())
    }

    /// Ancestors of `position`, nearest first.
    pub fn parents(&self, position: &Position) -> OutlineResult<Vec<Position>> {
        let mut all = self.self_and_parents(position)?;
        all.remove(0);
        Ok(all)
    }

    pub fn self_and_parents(&self, position: &Position) -> OutlineResult<Vec<Position>> {
        self.ensure_valid(position)?;
        Ok(std::iter::successors(Some(position.clone()), Position::parent).collect())
    }

    /// Distinct node ids in `position`'s subtree, in first-visit order.
    pub fn unique_nodes(&self, position: &Position) -> OutlineResult<Vec<NodeId>> {
        let mut seen = HashSet::new();
        Ok(self
            .self_and_subtree(position)?
            .map(|each| each.node())
            .filter(|node| seen.insert(*node))
            .collect())
    }

    /// First occurrence of every node, skipping subtrees of repeated clones.
    pub fn all_unique_positions(&self) -> Vec<Position> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        let mut cursor = self.root_position();
        while let Some(position) = cursor {
            if seen.insert(position.node()) {
                cursor = self.thread_next(&position);
                found.push(position);
            } else {
                cursor = self.after_tree(&position);
            }
        }
        found
    }

    /// Every occurrence of `id`, in outline order.
    pub fn positions_of(&self, id: NodeId) -> Vec<Position> {
        if self.registry().attachment_count(id) == 0 {
            return Vec::new();
        }
        self.all_positions()
            .filter(|position| position.node() == id)
            .collect()
    }

    /// First occurrence of `id`, if it is attached anywhere.
    pub fn find_position(&self, id: NodeId) -> Option<Position> {
        if self.registry().attachment_count(id) == 0 {
            return None;
        }
        self.all_positions().find(|position| position.node() == id)
    }
}
