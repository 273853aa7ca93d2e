//! Outline use-case service.
//!
//! # Responsibility
//! - Own the node store and clone registry of one outline.
//! - Navigate positions and reject stale ones.
//! - Apply structural edits with cycle checks and node garbage collection.
//!
//! # Invariants
//! - Store and registry change together inside one method call.
//! - Every check runs before the first write, so a rejected edit leaves the
//!   outline unchanged.
//! - No node is reachable from itself.
//! - A node is dropped only when its last attachment is removed.
//!
//! # See also
//! - `service::traversal` for iterators.
//! - `service::check` for the consistency audit.

use crate::config::OutlineConfig;
use crate::model::node::{NodeId, NodeRecord, NodeStatus, HIDDEN_ROOT_ID};
use crate::model::position::Position;
use crate::store::clone_registry::CloneRegistry;
use crate::store::node_store::{NodeStore, StoreError};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for outline operations.
pub type OutlineResult<T> = Result<T, OutlineError>;

/// Errors from outline navigation and mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineError {
    /// Unknown node id.
    NodeNotFound(NodeId),
    /// No child slot at `index` under `parent`.
    ChildIndexOutOfRange {
        parent: NodeId,
        index: usize,
        len: usize,
    },
    /// Attaching `node` under `parent` would make a node its own ancestor.
    CycleDetected { node: NodeId, parent: NodeId },
    /// Position no longer resolves in the outline.
    InvalidPosition(Position),
    /// The hidden root cannot be attached, moved or removed.
    HiddenRoot,
    /// Node still has attachments and cannot be discarded.
    NodeAttached(NodeId),
    /// Consistency audit failed.
    Inconsistent(String),
    /// Other store-level failure.
    Store(StoreError),
}

impl OutlineError {
    /// Groups unknown ids and missing child slots.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NodeNotFound(_) | Self::ChildIndexOutOfRange { .. }
        )
    }
}

impl Display for OutlineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::ChildIndexOutOfRange { parent, index, len } => write!(
                f,
                "child index {index} out of range for parent {parent} with {len} children"
            ),
            Self::CycleDetected { node, parent } => write!(
                f,
                "edit would create cycle: node {node} under parent {parent}"
            ),
            Self::InvalidPosition(position) => write!(f, "position is no longer valid: {position}"),
            Self::HiddenRoot => write!(f, "hidden root cannot be attached, moved or removed"),
            Self::NodeAttached(id) => write!(f, "node is still attached: {id}"),
            Self::Inconsistent(message) => write!(f, "outline is inconsistent: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OutlineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for OutlineError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NodeNotFound(id) => Self::NodeNotFound(id),
            StoreError::ChildIndexOutOfRange { parent, index, len } => {
                Self::ChildIndexOutOfRange { parent, index, len }
            }
            other => Self::Store(other),
        }
    }
}

/// One outline: node records, their attachments, and session state.
#[derive(Debug, Clone)]
pub struct Outline {
    store: NodeStore,
    registry: CloneRegistry,
    config: OutlineConfig,
    changed: bool,
}

impl Default for Outline {
    fn default() -> Self {
        Self::new()
    }
}

impl Outline {
    /// Creates an empty outline with default config.
    pub fn new() -> Self {
        Self::with_config(OutlineConfig::default())
    }

    pub fn with_config(config: OutlineConfig) -> Self {
        Self {
            store: NodeStore::new(),
            registry: CloneRegistry::new(),
            config,
            changed: false,
        }
    }

    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn registry(&self) -> &CloneRegistry {
        &self.registry
    }

    /// Creates a detached node. Attach it with `insert_child`.
    pub fn create_node(&mut self, headline: impl Into<String>, body: impl Into<String>) -> NodeId {
        self.store.create(headline, body)
    }

    /// Creates a detached node with a caller-supplied id.
    pub fn create_node_with_id(
        &mut self,
        id: NodeId,
        headline: impl Into<String>,
        body: impl Into<String>,
    ) -> OutlineResult<NodeId> {
        self.store
            .create_with_id(id, headline, body)
            .map_err(Into::into)
    }

    /// Returns the record for `id`. The hidden root is never exposed.
    pub fn get(&self, id: NodeId) -> OutlineResult<&NodeRecord> {
        if id == HIDDEN_ROOT_ID {
            return Err(OutlineError::NodeNotFound(id));
        }
        self.store.get(id).map_err(Into::into)
    }

    /// Sets the headline of `id`, attached or not.
    pub fn set_node_headline(&mut self, id: NodeId, headline: impl Into<String>) -> OutlineResult<()> {
        self.get(id)?;
        self.store.set_headline(id, headline)?;
        self.changed = true;
        Ok(())
    }

    /// Sets the body of `id`, attached or not.
    pub fn set_node_body(&mut self, id: NodeId, body: impl Into<String>) -> OutlineResult<()> {
        self.get(id)?;
        self.store.set_body(id, body)?;
        self.changed = true;
        Ok(())
    }

    pub fn is_cloned(&self, id: NodeId) -> bool {
        self.registry.is_cloned(id)
    }

    /// Drops a node that was created but never attached, with its subtree.
    pub fn discard_detached(&mut self, id: NodeId) -> OutlineResult<usize> {
        if id == HIDDEN_ROOT_ID {
            return Err(OutlineError::HiddenRoot);
        }
        self.store.get(id)?;
        if self.registry.attachment_count(id) > 0 {
            return Err(OutlineError::NodeAttached(id));
        }
        self.collect(id)
    }

    /// Returns `true` when every step of `position` still resolves.
    pub fn position_exists(&self, position: &Position) -> bool {
        let mut parent = HIDDEN_ROOT_ID;
        for (node, index) in position
            .stack()
            .iter()
            .copied()
            .chain(std::iter::once((position.node(), position.child_index())))
        {
            if self.children_of(parent).get(index) != Some(&node) {
                return false;
            }
            parent = node;
        }
        true
    }

    /// First top-level position, `None` for an empty outline.
    pub fn root_position(&self) -> Option<Position> {
        self.child_at(None, 0)
    }

    pub fn top_level_positions(&self) -> Vec<Position> {
        self.children_of(HIDDEN_ROOT_ID)
            .iter()
            .enumerate()
            .map(|(index, node)| Position::new(*node, index, Vec::new()))
            .collect()
    }

    /// Resolves child indices from the hidden root, as given by `Position::path`.
    pub fn position_from_path(&self, path: &[usize]) -> Option<Position> {
        let (first, rest) = path.split_first()?;
        let mut position = self.child_at(None, *first)?;
        for index in rest {
            position = self.child_at(Some(&position), *index)?;
        }
        Some(position)
    }

    pub fn first_child(&self, position: &Position) -> OutlineResult<Option<Position>> {
        self.ensure_valid(position)?;
        Ok(self.child_at(Some(position), 0))
    }

    pub fn nth_child(&self, position: &Position, n: usize) -> OutlineResult<Option<Position>> {
        self.ensure_valid(position)?;
        Ok(self.child_at(Some(position), n))
    }

    pub fn last_child(&self, position: &Position) -> OutlineResult<Option<Position>> {
        self.ensure_valid(position)?;
        Ok(self.last_child_of(position))
    }

    pub fn next_sibling(&self, position: &Position) -> OutlineResult<Option<Position>> {
        self.ensure_valid(position)?;
        Ok(self.next_sibling_of(position))
    }

    pub fn prev_sibling(&self, position: &Position) -> OutlineResult<Option<Position>> {
        self.ensure_valid(position)?;
        Ok(self.prev_sibling_of(position))
    }

    /// Parent occurrence, `None` for top-level positions.
    pub fn parent(&self, position: &Position) -> OutlineResult<Option<Position>> {
        self.ensure_valid(position)?;
        Ok(position.parent())
    }

    /// Depth-first pre-order successor over the whole outline.
    pub fn next_in_preorder(&self, position: &Position) -> OutlineResult<Option<Position>> {
        self.ensure_valid(position)?;
        Ok(self.thread_next(position))
    }

    /// Pre-order successor that stays inside `root`'s subtree.
    ///
    /// Returns `None` once the walk would leave the subtree, even when nodes
    /// follow `root` in the outline.
    pub fn next_in_subtree(
        &self,
        root: &Position,
        position: &Position,
    ) -> OutlineResult<Option<Position>> {
        self.ensure_valid(root)?;
        self.ensure_valid(position)?;
        if position != root && !root.is_ancestor_of(position) {
            return Err(OutlineError::InvalidPosition(position.clone()));
        }
        Ok(self.step_in_subtree(root, position))
    }

    /// Pre-order predecessor over the whole outline.
    pub fn prev_in_preorder(&self, position: &Position) -> OutlineResult<Option<Position>> {
        self.ensure_valid(position)?;
        Ok(self.thread_back(position))
    }

    /// First position after `position`'s subtree.
    pub fn node_after_tree(&self, position: &Position) -> OutlineResult<Option<Position>> {
        self.ensure_valid(position)?;
        Ok(self.after_tree(position))
    }

    /// Deepest last descendant of `position`, or `position` itself.
    pub fn last_descendant(&self, position: &Position) -> OutlineResult<Position> {
        self.ensure_valid(position)?;
        Ok(self.deepest_last(position))
    }

    /// Last position of the outline in pre-order.
    pub fn last_node(&self) -> Option<Position> {
        let last_top = self.top_level_positions().pop()?;
        Some(self.deepest_last(&last_top))
    }

    pub fn node_at(&self, position: &Position) -> OutlineResult<&NodeRecord> {
        self.ensure_valid(position)?;
        self.get(position.node())
    }

    pub fn headline(&self, position: &Position) -> OutlineResult<&str> {
        Ok(self.node_at(position)?.headline.as_str())
    }

    pub fn body(&self, position: &Position) -> OutlineResult<&str> {
        Ok(self.node_at(position)?.body.as_str())
    }

    /// Sets the headline of the node at `position`, visible from all clones.
    pub fn set_headline(
        &mut self,
        position: &Position,
        headline: impl Into<String>,
    ) -> OutlineResult<()> {
        self.ensure_valid(position)?;
        self.store.set_headline(position.node(), headline)?;
        self.changed = true;
        Ok(())
    }

    /// Sets the body of the node at `position`, visible from all clones.
    pub fn set_body(&mut self, position: &Position, body: impl Into<String>) -> OutlineResult<()> {
        self.ensure_valid(position)?;
        self.store.set_body(position.node(), body)?;
        self.changed = true;
        Ok(())
    }

    pub fn mark(&mut self, position: &Position) -> OutlineResult<()> {
        self.update_status(position, |status| status.marked = true)
    }

    pub fn unmark(&mut self, position: &Position) -> OutlineResult<()> {
        self.update_status(position, |status| status.marked = false)
    }

    pub fn expand(&mut self, position: &Position) -> OutlineResult<()> {
        self.update_status(position, |status| status.expanded = true)
    }

    pub fn contract(&mut self, position: &Position) -> OutlineResult<()> {
        self.update_status(position, |status| status.expanded = false)
    }

    /// Clears every node's dirty bit and the outline's changed flag.
    pub fn clear_dirty(&mut self) {
        let ids = self.store.ids().collect::<Vec<_>>();
        for id in ids {
            if let Ok(record) = self.store.get_mut(id) {
                record.status.dirty = false;
            }
        }
        self.changed = false;
    }

    /// Returns `true` after any content or structure edit since the last clear.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn set_changed(&mut self, changed: bool) {
        self.changed = changed;
    }

    /// Attaches `node_id` at `index` under `parent` (`None` is the top level).
    ///
    /// Attaching a node that is already attached elsewhere makes it a clone.
    ///
    /// # Errors
    /// - `ChildIndexOutOfRange` when `index` exceeds the child count.
    /// - `CycleDetected` when `node_id` is `parent` or one of its ancestors.
    pub fn insert_child(
        &mut self,
        parent: Option<&Position>,
        index: usize,
        node_id: NodeId,
    ) -> OutlineResult<Position> {
        if node_id == HIDDEN_ROOT_ID {
            return Err(OutlineError::HiddenRoot);
        }
        let parent_id = self.parent_target(parent)?;
        self.store.get(node_id)?;
        self.ensure_insert_index(parent_id, index)?;
        if self.would_create_cycle(node_id, parent_id) {
            warn!(
                "event=outline_insert module=outline status=rejected reason=cycle node={node_id} parent={parent_id}"
            );
            return Err(OutlineError::CycleDetected {
                node: node_id,
                parent: parent_id,
            });
        }

        self.link(parent_id, index, node_id)?;
        debug!(
            "event=outline_insert module=outline status=ok node={node_id} parent={parent_id} index={index} cloned={}",
            self.registry.is_cloned(node_id)
        );
        Ok(Self::child_position(parent, node_id, index))
    }

    /// Detaches the child at `index` under `parent` and returns its id.
    ///
    /// When that was the node's last attachment the node and every descendant
    /// left without attachments are dropped from the store.
    pub fn remove_child(&mut self, parent: Option<&Position>, index: usize) -> OutlineResult<NodeId> {
        let parent_id = self.parent_target(parent)?;
        let len = self.children_of(parent_id).len();
        if index >= len {
            return Err(OutlineError::ChildIndexOutOfRange {
                parent: parent_id,
                index,
                len,
            });
        }

        let child = self.unlink(parent_id, index)?;
        let dropped = if self.registry.attachment_count(child) == 0 {
            self.collect(child)?
        } else {
            0
        };
        debug!(
            "event=outline_remove module=outline status=ok node={child} parent={parent_id} index={index} dropped={dropped}"
        );
        Ok(child)
    }

    /// Removes the occurrence at `position`.
    pub fn delete(&mut self, position: &Position) -> OutlineResult<NodeId> {
        self.ensure_valid(position)?;
        self.remove_child(position.parent().as_ref(), position.child_index())
    }

    /// Moves the occurrence at `src` to `dst_index` under `dst_parent`.
    ///
    /// `dst_index` counts children after `src` is unlinked, and `dst_parent`
    /// may be given as it read before the move.
    ///
    /// # Errors
    /// - `CycleDetected` when the destination is `src` or inside its subtree,
    ///   including through clones.
    /// - `ChildIndexOutOfRange` when `dst_index` exceeds the child count.
    pub fn move_subtree(
        &mut self,
        src: &Position,
        dst_parent: Option<&Position>,
        dst_index: usize,
    ) -> OutlineResult<Position> {
        self.ensure_valid(src)?;
        let dst_parent_id = self.parent_target(dst_parent)?;
        let node = src.node();
        if self.would_create_cycle(node, dst_parent_id) {
            warn!(
                "event=outline_move module=outline status=rejected reason=cycle node={node} parent={dst_parent_id}"
            );
            return Err(OutlineError::CycleDetected {
                node,
                parent: dst_parent_id,
            });
        }

        let src_parent_id = src.parent_node();
        let len_after = self.children_of(dst_parent_id).len()
            - usize::from(dst_parent_id == src_parent_id);
        if dst_index > len_after {
            return Err(OutlineError::ChildIndexOutOfRange {
                parent: dst_parent_id,
                index: dst_index,
                len: len_after,
            });
        }

        let dst_parent = dst_parent.map(|position| position.adjusted_for_unlink(src));
        self.unlink(src_parent_id, src.child_index())?;
        self.link(dst_parent_id, dst_index, node)?;
        info!(
            "event=outline_move module=outline status=ok node={node} from={src_parent_id} to={dst_parent_id} index={dst_index}"
        );
        Ok(Self::child_position(dst_parent.as_ref(), node, dst_index))
    }

    /// Moves `position` to the first top-level slot.
    pub fn move_to_root(&mut self, position: &Position) -> OutlineResult<Position> {
        self.move_subtree(position, None, 0)
    }

    /// Creates a node with the default headline at `index` under `parent`.
    pub fn insert_new_child(
        &mut self,
        parent: Option<&Position>,
        index: usize,
    ) -> OutlineResult<Position> {
        let parent_id = self.parent_target(parent)?;
        self.ensure_insert_index(parent_id, index)?;
        let headline = self.config.default_headline.clone();
        let node = self.store.create(headline, "");
        self.insert_child(parent, index, node)
    }

    pub fn insert_as_last_child(&mut self, position: &Position) -> OutlineResult<Position> {
        self.ensure_valid(position)?;
        let len = self.children_of(position.node()).len();
        self.insert_new_child(Some(position), len)
    }

    /// Creates a node right after `position`.
    pub fn insert_after(&mut self, position: &Position) -> OutlineResult<Position> {
        self.ensure_valid(position)?;
        self.insert_new_child(position.parent().as_ref(), position.child_index() + 1)
    }

    /// Creates a node right before `position`; `position` itself shifts down.
    pub fn insert_before(&mut self, position: &Position) -> OutlineResult<Position> {
        self.ensure_valid(position)?;
        self.insert_new_child(position.parent().as_ref(), position.child_index())
    }

    /// Attaches the node at `position` again, right after it.
    pub fn clone_node(&mut self, position: &Position) -> OutlineResult<Position> {
        self.ensure_valid(position)?;
        self.insert_child(
            position.parent().as_ref(),
            position.child_index() + 1,
            position.node(),
        )
    }

    /// Deep-copies the subtree at `position` into fresh, detached nodes.
    ///
    /// Clones inside the subtree become independent copies.
    pub fn copy_tree(&mut self, position: &Position) -> OutlineResult<NodeId> {
        self.ensure_valid(position)?;
        self.copy_node(position.node())
    }

    /// Inserts a deep copy of `position` right after it.
    pub fn copy_tree_after(&mut self, position: &Position) -> OutlineResult<Position> {
        let copy = self.copy_tree(position)?;
        self.insert_child(
            position.parent().as_ref(),
            position.child_index() + 1,
            copy,
        )
    }

    /// Makes the children of `position` its following siblings.
    ///
    /// Returns the number of promoted children.
    pub fn promote(&mut self, position: &Position) -> OutlineResult<usize> {
        self.ensure_valid(position)?;
        let node = position.node();
        let parent_id = position.parent_node();
        let count = self.children_of(node).len();
        for offset in 0..count {
            let child = self.unlink(node, 0)?;
            self.link(parent_id, position.child_index() + 1 + offset, child)?;
        }
        debug!("event=outline_promote module=outline status=ok node={node} count={count}");
        Ok(count)
    }

    /// Makes the following siblings of `position` its last children.
    ///
    /// Returns the number of demoted siblings.
    pub fn demote(&mut self, position: &Position) -> OutlineResult<usize> {
        self.ensure_valid(position)?;
        let node = position.node();
        let parent_id = position.parent_node();
        let first_moved = position.child_index() + 1;
        let followers = self.children_of(parent_id)[first_moved..].to_vec();
        if let Some(sibling) = followers
            .iter()
            .copied()
            .find(|sibling| self.would_create_cycle(*sibling, node))
        {
            warn!(
                "event=outline_demote module=outline status=rejected reason=cycle node={sibling} parent={node}"
            );
            return Err(OutlineError::CycleDetected {
                node: sibling,
                parent: node,
            });
        }

        for _ in &followers {
            let child = self.unlink(parent_id, first_moved)?;
            let end = self.children_of(node).len();
            self.link(node, end, child)?;
        }
        debug!(
            "event=outline_demote module=outline status=ok node={node} count={}",
            followers.len()
        );
        Ok(followers.len())
    }

    /// Removes every child occurrence of `position`. Returns how many.
    pub fn delete_all_children(&mut self, position: &Position) -> OutlineResult<usize> {
        self.ensure_valid(position)?;
        let count = self.children_of(position.node()).len();
        for index in (0..count).rev() {
            self.remove_child(Some(position), index)?;
        }
        Ok(count)
    }

    /// Position that will follow `position`'s subtree once it is deleted.
    pub fn position_after_deleted_tree(
        &self,
        position: &Position,
    ) -> OutlineResult<Option<Position>> {
        self.ensure_valid(position)?;
        Ok(self
            .after_tree(position)
            .map(|after| after.adjusted_for_unlink(position)))
    }

    pub(crate) fn ensure_valid(&self, position: &Position) -> OutlineResult<()> {
        if self.position_exists(position) {
            Ok(())
        } else {
            Err(OutlineError::InvalidPosition(position.clone()))
        }
    }

    pub(crate) fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.store
            .get(id)
            .map(NodeRecord::children)
            .unwrap_or(&[])
    }

    pub(crate) fn child_at(&self, parent: Option<&Position>, index: usize) -> Option<Position> {
        let parent_id = parent.map_or(HIDDEN_ROOT_ID, Position::node);
        let node = *self.children_of(parent_id).get(index)?;
        Some(Self::child_position(parent, node, index))
    }

    pub(crate) fn next_sibling_of(&self, position: &Position) -> Option<Position> {
        let index = position.child_index() + 1;
        let node = *self.children_of(position.parent_node()).get(index)?;
        Some(position.sibling(node, index))
    }

    pub(crate) fn prev_sibling_of(&self, position: &Position) -> Option<Position> {
        let index = position.child_index().checked_sub(1)?;
        let node = *self.children_of(position.parent_node()).get(index)?;
        Some(position.sibling(node, index))
    }

    pub(crate) fn last_child_of(&self, position: &Position) -> Option<Position> {
        let len = self.children_of(position.node()).len();
        self.child_at(Some(position), len.checked_sub(1)?)
    }

    pub(crate) fn thread_next(&self, position: &Position) -> Option<Position> {
        self.child_at(Some(position), 0)
            .or_else(|| self.after_tree(position))
    }

    pub(crate) fn thread_back(&self, position: &Position) -> Option<Position> {
        match self.prev_sibling_of(position) {
            Some(back) => Some(self.deepest_last(&back)),
            None => position.parent(),
        }
    }

    pub(crate) fn after_tree(&self, position: &Position) -> Option<Position> {
        let mut cursor = position.clone();
        loop {
            if let Some(next) = self.next_sibling_of(&cursor) {
                return Some(next);
            }
            cursor = cursor.parent()?;
        }
    }

    pub(crate) fn step_in_subtree(&self, root: &Position, position: &Position) -> Option<Position> {
        if let Some(child) = self.child_at(Some(position), 0) {
            return Some(child);
        }
        let mut cursor = position.clone();
        loop {
            if cursor == *root {
                return None;
            }
            if let Some(next) = self.next_sibling_of(&cursor) {
                return Some(next);
            }
            cursor = cursor.parent()?;
        }
    }

    pub(crate) fn deepest_last(&self, position: &Position) -> Position {
        let mut cursor = position.clone();
        while let Some(last) = self.last_child_of(&cursor) {
            cursor = last;
        }
        cursor
    }

    /// Returns `true` when `node` is `candidate_parent` or one of its ancestors.
    pub(crate) fn would_create_cycle(&self, node: NodeId, candidate_parent: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut pending = vec![candidate_parent];
        while let Some(current) = pending.pop() {
            if current == node {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            pending.extend(self.registry.parents_of(current));
        }
        false
    }

    fn child_position(parent: Option<&Position>, node: NodeId, index: usize) -> Position {
        match parent {
            Some(parent) => parent.child(node, index),
            None => Position::new(node, index, Vec::new()),
        }
    }

    fn parent_target(&self, parent: Option<&Position>) -> OutlineResult<NodeId> {
        match parent {
            Some(position) => {
                self.ensure_valid(position)?;
                Ok(position.node())
            }
            None => Ok(HIDDEN_ROOT_ID),
        }
    }

    fn ensure_insert_index(&self, parent_id: NodeId, index: usize) -> OutlineResult<()> {
        let len = self.children_of(parent_id).len();
        if index > len {
            return Err(OutlineError::ChildIndexOutOfRange {
                parent: parent_id,
                index,
                len,
            });
        }
        Ok(())
    }

    fn update_status(
        &mut self,
        position: &Position,
        apply: impl FnOnce(&mut NodeStatus),
    ) -> OutlineResult<()> {
        self.ensure_valid(position)?;
        apply(&mut self.store.get_mut(position.node())?.status);
        Ok(())
    }

    fn link(&mut self, parent: NodeId, index: usize, child: NodeId) -> OutlineResult<()> {
        self.store.insert_child_link(parent, index, child)?;
        self.registry.register_parent(child, parent, index);
        self.changed = true;
        Ok(())
    }

    fn unlink(&mut self, parent: NodeId, index: usize) -> OutlineResult<NodeId> {
        let child = self.store.remove_child_link(parent, index)?;
        self.registry.unregister_parent(child, parent, index)?;
        self.changed = true;
        Ok(child)
    }

    fn copy_node(&mut self, source: NodeId) -> OutlineResult<NodeId> {
        let record = self.store.get(source)?;
        let children = record.children().to_vec();
        let (headline, body) = (record.headline.clone(), record.body.clone());
        let copy = self.store.create(headline, body);
        for (index, child) in children.iter().enumerate() {
            let child_copy = self.copy_node(*child)?;
            self.link(copy, index, child_copy)?;
        }
        Ok(copy)
    }

    /// Drops `root` and every descendant whose last attachment it held.
    fn collect(&mut self, root: NodeId) -> OutlineResult<usize> {
        let mut pending = vec![root];
        let mut dropped = 0;
        while let Some(id) = pending.pop() {
            let record = self.store.remove_record(id)?;
            dropped += 1;
            for (index, child) in record.children().iter().enumerate().rev() {
                self.registry.unregister_parent(*child, id, index)?;
                if self.registry.attachment_count(*child) == 0 {
                    pending.push(*child);
                }
            }
        }
        info!("event=node_gc module=outline status=ok root={root} dropped={dropped}");
        Ok(dropped)
    }
}
