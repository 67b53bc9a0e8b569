//! Flat task arena for hierarchy-aware views.
//!
//! # Responsibility
//! - Index flattened tasks by id without re-walking the source tree.
//! - Answer expand/collapse visibility for hierarchical rows.
//!
//! # Invariants
//! - Nodes are stored in source pre-order.
//! - Duplicate ids keep the first occurrence.
//! - A task is visible iff every ancestor is expanded.

use crate::model::task::TaskId;
use crate::normalize::normalizer::{FlatTask, NormalizedTasks};
use log::warn;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Expanded-node set owned by the UI above the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: BTreeSet<TaskId>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expands every node that has children.
    pub fn all_expanded(index: &TaskIndex) -> Self {
        let expanded = index
            .nodes
            .iter()
            .filter(|node| node.child_count > 0)
            .map(|node| node.id)
            .collect();
        Self { expanded }
    }

    pub fn is_expanded(&self, id: TaskId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn expand(&mut self, id: TaskId) {
        self.expanded.insert(id);
    }

    pub fn collapse(&mut self, id: TaskId) {
        self.expanded.remove(&id);
    }

    /// Flips one node and returns its new expanded state.
    pub fn toggle(&mut self, id: TaskId) -> bool {
        if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        }
    }
}

/// Arena of flattened tasks keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TaskIndex {
    nodes: Vec<FlatTask>,
    by_id: HashMap<TaskId, usize>,
    children: HashMap<TaskId, Vec<usize>>,
    roots: Vec<usize>,
}

impl TaskIndex {
    /// Builds the arena from one normalization result.
    pub fn build(normalized: &NormalizedTasks) -> Self {
        let mut index = Self::default();
        for task in normalized.flat_in_order() {
            if index.by_id.contains_key(&task.id) {
                warn!(
                    "event=duplicate_task_id module=index status=skipped task_id={}",
                    task.id
                );
                continue;
            }
            let slot = index.nodes.len();
            index.by_id.insert(task.id, slot);
            match task.parent_id {
                Some(parent_id) if task.depth > 0 => {
                    index.children.entry(parent_id).or_default().push(slot);
                }
                _ => index.roots.push(slot),
            }
            index.nodes.push(task.clone());
        }
        index
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&FlatTask> {
        self.by_id.get(&id).map(|slot| &self.nodes[*slot])
    }

    pub fn roots(&self) -> Vec<&FlatTask> {
        self.roots.iter().map(|slot| &self.nodes[*slot]).collect()
    }

    /// Direct children in source order.
    pub fn children(&self, id: TaskId) -> Vec<&FlatTask> {
        self.children
            .get(&id)
            .map(|slots| slots.iter().map(|slot| &self.nodes[*slot]).collect())
            .unwrap_or_default()
    }

    /// Ancestor ids from direct parent up to the root.
    ///
    /// Stops at unknown parents and at repeated ids, so malformed
    /// back-references cannot loop.
    pub fn ancestors(&self, id: TaskId) -> Vec<TaskId> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(id);
        let mut cursor = self.get(id).and_then(structural_parent);
        while let Some(current) = cursor {
            if !visited.insert(current) {
                break;
            }
            let Some(node) = self.get(current) else {
                break;
            };
            chain.push(current);
            cursor = structural_parent(node);
        }
        chain
    }

    pub fn is_visible(&self, id: TaskId, expansion: &ExpansionState) -> bool {
        self.get(id).is_some()
            && self
                .ancestors(id)
                .iter()
                .all(|ancestor| expansion.is_expanded(*ancestor))
    }

    /// Rows a hierarchical list shows under `expansion`, in pre-order.
    pub fn visible_rows(&self, expansion: &ExpansionState) -> Vec<&FlatTask> {
        let mut rows = Vec::new();
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(slot) = stack.pop() {
            let node = &self.nodes[slot];
            rows.push(node);
            if !expansion.is_expanded(node.id) {
                continue;
            }
            if let Some(children) = self.children.get(&node.id) {
                stack.extend(children.iter().rev().copied());
            }
        }
        rows
    }
}

fn structural_parent(node: &FlatTask) -> Option<TaskId> {
    if node.depth == 0 {
        None
    } else {
        node.parent_id
    }
}
