//! Structural consistency audit.
//!
//! # Responsibility
//! - Verify registry counts against the children sequences.
//! - Verify the node graph is acyclic.
//! - Verify navigation symmetry at every position.

use crate::model::node::{NodeId, HIDDEN_ROOT_ID};
use crate::service::outline::{Outline, OutlineError, OutlineResult};
use log::{error, info};
use std::collections::HashMap;

impl Outline {
    /// Audits the outline and returns the number of positions visited.
    ///
    /// # Errors
    /// - `Inconsistent` with a description of the first violation found.
    pub fn check_outline(&self) -> OutlineResult<usize> {
        let result = self
            .check_attachments()
            .and_then(|_| self.check_acyclic())
            .and_then(|_| self.check_navigation());
        match &result {
            Ok(count) => info!("event=outline_check module=outline status=ok positions={count}"),
            Err(err) => error!("event=outline_check module=outline status=error reason={err}"),
        }
        result
    }

    fn check_attachments(&self) -> OutlineResult<()> {
        let mut occurrences: HashMap<NodeId, usize> = HashMap::new();
        for parent in self.store().ids().chain(std::iter::once(HIDDEN_ROOT_ID)) {
            for child in self.children_of(parent) {
                if !self.store().contains(*child) {
                    return Err(inconsistent(format!(
                        "parent {parent} references missing node {child}"
                    )));
                }
                *occurrences.entry(*child).or_default() += 1;
            }
        }

        for id in self.store().ids() {
            let expected = occurrences.get(&id).copied().unwrap_or(0);
            let registered = self.registry().attachment_count(id);
            if expected != registered {
                return Err(inconsistent(format!(
                    "node {id} appears {expected} times but has {registered} attachments"
                )));
            }
            for attachment in self.registry().attachments(id) {
                if self.children_of(attachment.parent).get(attachment.index) != Some(&id) {
                    return Err(inconsistent(format!(
                        "attachment of {id} at {} under {} is stale",
                        attachment.index, attachment.parent
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_acyclic(&self) -> OutlineResult<()> {
        for id in self.store().ids() {
            for parent in self.registry().parents_of(id) {
                if self.would_create_cycle(id, parent) {
                    return Err(inconsistent(format!("node {id} is its own ancestor")));
                }
            }
        }
        Ok(())
    }

    fn check_navigation(&self) -> OutlineResult<usize> {
        let mut count = 0;
        for position in self.all_positions() {
            count += 1;
            if let Some(next) = self.thread_next(&position) {
                if self.thread_back(&next).as_ref() != Some(&position) {
                    return Err(inconsistent(format!("thread back of {next} is not {position}")));
                }
            }
            if let Some(next) = self.next_sibling_of(&position) {
                if self.prev_sibling_of(&next).as_ref() != Some(&position) {
                    return Err(inconsistent(format!("back of {next} is not {position}")));
                }
            }
            if let Some(child) = self.child_at(Some(&position), 0) {
                if child.parent().as_ref() != Some(&position) {
                    return Err(inconsistent(format!("parent of {child} is not {position}")));
                }
            }
        }
        Ok(count)
    }
}

fn inconsistent(message: String) -> OutlineError {
    OutlineError::Inconsistent(message)
}
