//! Path-qualified cursor into the outline.
//!
//! # Responsibility
//! - Identify one occurrence of a node by its ancestry and child indices.
//! - Provide pure path arithmetic that needs no access to the outline.
//!
//! # Invariants
//! - A position is a value: navigation returns new positions.
//! - Equality compares the full path, so two occurrences of one clone differ.
//! - Ordering follows outline (pre-order) order.
//!
//! # See also
//! - `service::outline` for navigation that checks positions against the tree.

use crate::model::node::{NodeId, HIDDEN_ROOT_ID};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// One step of a position's ancestry: an ancestor node and its child index.
pub type PathStep = (NodeId, usize);

/// Cursor to one occurrence of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    node: NodeId,
    child_index: usize,
    stack: Vec<PathStep>,
}

impl Position {
    pub(crate) fn new(node: NodeId, child_index: usize, stack: Vec<PathStep>) -> Self {
        Self {
            node,
            child_index,
            stack,
        }
    }

    /// Node at this occurrence.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Index of this occurrence in its parent's children.
    pub fn child_index(&self) -> usize {
        self.child_index
    }

    /// Ancestors from the top level down, each with its own child index.
    pub fn stack(&self) -> &[PathStep] {
        &self.stack
    }

    /// Depth below the top level. Top-level positions have level 0.
    pub fn level(&self) -> usize {
        self.stack.len()
    }

    pub fn has_parent(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Node that holds this occurrence in its children.
    pub fn parent_node(&self) -> NodeId {
        self.stack
            .last()
            .map(|(node, _)| *node)
            .unwrap_or(HIDDEN_ROOT_ID)
    }

    /// Child indices from the hidden root down to this occurrence.
    pub fn path(&self) -> Vec<usize> {
        self.stack
            .iter()
            .map(|(_, index)| *index)
            .chain(std::iter::once(self.child_index))
            .collect()
    }

    /// Stable textual key, usable in hash maps of view state.
    pub fn key(&self) -> String {
        self.steps()
            .map(|(node, index)| format!("{node}:{index}"))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Returns `true` when `other` lies strictly inside this position's subtree.
    pub fn is_ancestor_of(&self, other: &Position) -> bool {
        let depth = self.level();
        other.stack.len() > depth
            && other.stack[..depth] == self.stack[..]
            && other.stack[depth] == (self.node, self.child_index)
    }

    /// Position of the parent occurrence, `None` at the top level.
    pub fn parent(&self) -> Option<Position> {
        let mut stack = self.stack.clone();
        let (node, child_index) = stack.pop()?;
        Some(Position::new(node, child_index, stack))
    }

    pub(crate) fn child(&self, node: NodeId, child_index: usize) -> Position {
        let mut stack = self.stack.clone();
        stack.push((self.node, self.child_index));
        Position::new(node, child_index, stack)
    }

    pub(crate) fn sibling(&self, node: NodeId, child_index: usize) -> Position {
        Position::new(node, child_index, self.stack.clone())
    }

    /// Rewrites this position as it reads after `removed` is unlinked.
    ///
    /// Every step under `removed`'s parent node that follows `removed` shifts
    /// down by one. Steps are matched by parent node, not by path, so clone
    /// occurrences of that parent elsewhere in the outline are adjusted too.
    /// Positions inside the removed occurrence cannot be adjusted and keep
    /// their indices.
    pub fn adjusted_for_unlink(&self, removed: &Position) -> Position {
        let removed_parent = removed.parent_node();
        let mut parent = HIDDEN_ROOT_ID;
        let mut steps = Vec::with_capacity(self.stack.len() + 1);
        for (node, mut index) in self.steps() {
            if parent == removed_parent && index > removed.child_index {
                index -= 1;
            }
            steps.push((node, index));
            parent = node;
        }
        let (node, child_index) = steps.pop().unwrap_or((self.node, self.child_index));
        Position::new(node, child_index, steps)
    }

    fn steps(&self) -> impl Iterator<Item = PathStep> + '_ {
        self.stack
            .iter()
            .copied()
            .chain(std::iter::once((self.node, self.child_index)))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path()
            .cmp(&other.path())
            .then_with(|| self.stack.cmp(&other.stack))
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let path = self
            .path()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "<pos {} @{}>", self.node, path)
    }
}
