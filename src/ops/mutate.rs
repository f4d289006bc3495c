// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;

use super::{mark_save_unit, Changes, Position};
use crate::context::NodesContext;
use crate::model::{Node, NodeId, NodeKind, NodeType};
use crate::store::{parent_key, NodeStore};

impl NodesContext {
    /// Creates a node under `parent` (top level when `None`) with a fresh id.
    ///
    /// Returns `None` when `parent` does not exist.
    pub fn add_node(&self, parent: Option<&NodeId>, kind: NodeKind) -> Option<NodeId> {
        if let Some(parent) = parent {
            if !self.contains(parent) {
                tracing::debug!(parent_id = %parent, "add_node: parent missing");
                return None;
            }
        }

        let id = self.allocate_id();
        let parent_key = parent.cloned().unwrap_or_else(NodeId::root);
        let mut changes = Changes::default();
        {
            let mut store = self.store_mut();
            let mut node = Node::new(id.clone(), parent.cloned(), kind);
            node.set_changed(true);
            store.set(node);
            mark_save_unit(&mut store, &parent_key);
        }
        changes.record_children(&parent_key);
        changes.dispatch(self);
        Some(id)
    }

    /// Inserts (or overwrites) `nodes` as given, without marking or notifying.
    ///
    /// Callers notify after the batch. Ids retired earlier in the session are skipped, as
    /// are nodes whose parent is neither stored nor part of the batch. Overwriting keeps
    /// a dirty flag already set. Returns how many nodes were stored.
    pub fn add_nodes(&self, nodes: Vec<Node>) -> usize {
        let mut stored = 0;
        {
            let mut store = self.store_mut();
            let mut pending = Vec::with_capacity(nodes.len());
            for node in nodes {
                if store.is_retired(node.id()) {
                    tracing::debug!(node_id = %node.id(), "add_nodes: id was deleted earlier");
                    continue;
                }
                pending.push(node);
            }

            // Parents may follow their children in the batch.
            let mut accepted = HashSet::new();
            loop {
                let before = accepted.len();
                for node in &pending {
                    if accepted.contains(node.id()) {
                        continue;
                    }
                    let linked = node.parent_id().map_or(true, |parent| {
                        accepted.contains(parent) || store.contains(parent)
                    });
                    if linked {
                        accepted.insert(node.id().clone());
                    }
                }
                if accepted.len() == before {
                    break;
                }
            }

            for mut node in pending {
                if !accepted.contains(node.id()) {
                    tracing::debug!(
                        node_id = %node.id(),
                        parent_id = ?node.parent_id(),
                        "add_nodes: parent missing"
                    );
                    continue;
                }
                if store.get(node.id()).is_some_and(Node::is_changed) {
                    node.set_changed(true);
                }
                store.set(node);
                stored += 1;
            }
        }
        self.refresh_dirty_count();
        stored
    }

    /// Moves an existing `child` under `parent` at `index` (`None` appends).
    pub fn link_child_to_parent(
        &self,
        child: &NodeId,
        parent: &NodeId,
        index: Option<usize>,
    ) -> bool {
        let mut changes = Changes::default();
        {
            let mut store = self.store_mut();
            let Some(old_parent) = store.get(child).map(parent_key) else {
                tracing::debug!(node_id = %child, "link_child_to_parent: child missing");
                return false;
            };
            if !store.link_child(parent, child, index) {
                tracing::debug!(node_id = %child, parent_id = %parent, "link rejected");
                return false;
            }
            store.mark_changed(child);
            mark_save_unit(&mut store, &old_parent);
            mark_save_unit(&mut store, parent);
            changes.record_children(&old_parent);
            changes.record_children(parent);
            changes.record_content(child);
        }
        changes.dispatch(self);
        true
    }

    /// Removes `id` and its whole subtree, unlinking it from its parent.
    pub fn delete_node(&self, id: &NodeId) -> bool {
        let mut changes = Changes::default();
        {
            let mut store = self.store_mut();
            let Some(parent) = store.get(id).map(parent_key) else {
                tracing::debug!(node_id = %id, "delete_node: node missing");
                return false;
            };
            let removed = store.remove_subtree(id);
            tracing::debug!(node_id = %id, removed = removed.len(), "deleted subtree");
            mark_save_unit(&mut store, &parent);
            changes.record_children(&parent);
        }
        changes.dispatch(self);
        true
    }

    /// Swaps `id` with its neighbour. At the boundary nothing moves but the parent is
    /// still notified. Returns whether the order changed.
    pub fn move_node(&self, id: &NodeId, position: Position) -> bool {
        let mut changes = Changes::default();
        let moved = {
            let mut store = self.store_mut();
            let Some(parent) = store.get(id).map(parent_key) else {
                tracing::debug!(node_id = %id, "move_node: node missing");
                return false;
            };
            let moved = store.move_child(id, position).unwrap_or(false);
            if moved {
                mark_save_unit(&mut store, &parent);
            } else {
                tracing::debug!(node_id = %id, ?position, "move_node: already at boundary");
            }
            changes.record_children(&parent);
            moved
        };
        changes.dispatch(self);
        moved
    }

    /// Replaces each known node wholesale and marks it dirty.
    ///
    /// Parent links stay as stored. A story fragment whose `pane_ids` is a reordering of
    /// its panes gets that order. Each touched id is notified once. Returns how many
    /// nodes were replaced.
    pub fn modify_nodes(&self, nodes: Vec<Node>) -> usize {
        let mut changes = Changes::default();
        let mut replaced = 0;
        {
            let mut store = self.store_mut();
            for mut node in nodes {
                let id = node.id().clone();
                let Some(stored_type) = store.get(&id).map(Node::node_type) else {
                    tracing::debug!(node_id = %id, "modify_nodes: node missing");
                    continue;
                };
                if stored_type != node.node_type() {
                    tracing::debug!(
                        node_id = %id,
                        from = %stored_type,
                        to = %node.node_type(),
                        "modify_nodes: node type cannot change"
                    );
                    continue;
                }
                if node.parent_id() != store.get(&id).and_then(Node::parent_id) {
                    tracing::debug!(node_id = %id, "modify_nodes: parent change ignored");
                }

                let reordered = match node.as_story_fragment() {
                    Some(sf) => reorder_panes(&mut store, &id, &sf.pane_ids),
                    None => false,
                };

                node.set_changed(true);
                store.replace(node);
                mark_save_unit(&mut store, &id);
                replaced += 1;

                changes.record_content(&id);
                if reordered {
                    changes.record_children(&id);
                }
            }
        }
        if !changes.is_empty() {
            changes.dispatch(self);
        }
        replaced
    }
}

/// Applies `desired` to the pane slots of `sf_id`'s children when it is a permutation
/// of the current panes.
fn reorder_panes(store: &mut NodeStore, sf_id: &NodeId, desired: &[NodeId]) -> bool {
    let current = store.children(sf_id).to_vec();
    let panes = current.iter().filter(|id| is_pane(store, id)).cloned().collect::<Vec<_>>();
    if panes.as_slice() == desired {
        return false;
    }

    let mut sorted_panes = panes.clone();
    let mut sorted_desired = desired.to_vec();
    sorted_panes.sort();
    sorted_desired.sort();
    if sorted_panes != sorted_desired {
        tracing::debug!(story_fragment = %sf_id, "modify_nodes: paneIds is not a reordering");
        return false;
    }

    let mut next_pane = desired.iter();
    let order = current
        .iter()
        .map(|id| {
            if is_pane(store, id) {
                next_pane.next().cloned().unwrap_or_else(|| id.clone())
            } else {
                id.clone()
            }
        })
        .collect::<Vec<_>>();
    store.reorder_children(sf_id, &order)
}

fn is_pane(store: &NodeStore, id: &NodeId) -> bool {
    store.get(id).map(Node::node_type) == Some(NodeType::Pane)
}
