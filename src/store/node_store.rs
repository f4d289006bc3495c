// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::model::{Node, NodeId, NodeKind, NodeType};

/// Placement relative to a sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Before,
    After,
}

#[derive(Debug, Clone)]
struct StoredNode {
    node: Node,
    seq: u64,
}

/// Ids touched since a fork was taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Journal {
    upserted: BTreeSet<NodeId>,
    removed: BTreeSet<NodeId>,
    reordered: BTreeSet<NodeId>,
}

impl Journal {
    pub fn upserted(&self) -> &BTreeSet<NodeId> {
        &self.upserted
    }

    pub fn removed(&self) -> &BTreeSet<NodeId> {
        &self.removed
    }

    pub fn reordered(&self) -> &BTreeSet<NodeId> {
        &self.reordered
    }

    pub fn is_empty(&self) -> bool {
        self.upserted.is_empty() && self.removed.is_empty() && self.reordered.is_empty()
    }
}

/// Outcome of replaying a fork onto the store it was taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub upserted: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    /// Nodes whose parent no longer exists in the target store.
    pub dropped: Vec<NodeId>,
}

/// The single owner of every node of an editing session.
///
/// Nodes are keyed by id; a secondary index keeps each parent's ordered child list
/// (parentless nodes are listed under [`NodeId::root`]). A StoryFragment's `pane_ids`
/// is rewritten from that index on every structural change so both always agree.
///
/// The store never notifies anyone; callers own notification.
#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    nodes: HashMap<NodeId, StoredNode>,
    children: HashMap<NodeId, Vec<NodeId>>,
    tombstones: HashSet<NodeId>,
    next_seq: u64,
    rev: u64,
    journal: Option<Journal>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumped on every write.
    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id).map(|stored| &stored.node)
    }

    /// Whether `id` was deleted during this session.
    pub fn is_retired(&self, id: &NodeId) -> bool {
        self.tombstones.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().map(|stored| &stored.node)
    }

    /// Nodes in insertion order.
    pub fn ordered_nodes(&self) -> Vec<&Node> {
        let mut stored = self.nodes.values().collect::<Vec<_>>();
        stored.sort_by_key(|stored| stored.seq);
        stored.into_iter().map(|stored| &stored.node).collect()
    }

    pub fn insertion_seq(&self, id: &NodeId) -> Option<u64> {
        self.nodes.get(id).map(|stored| stored.seq)
    }

    /// Ordered children of `parent`; pass [`NodeId::root`] for parentless nodes.
    pub fn children(&self, parent: &NodeId) -> &[NodeId] {
        self.children.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn journal(&self) -> Option<&Journal> {
        self.journal.as_ref()
    }

    /// Inserts or overwrites `node`.
    ///
    /// A new node is appended to its parent's children. Overwriting with a different
    /// `parent_id` moves the node to the end of the new parent's children.
    pub fn set(&mut self, node: Node) -> Option<Node> {
        let id = node.id().clone();
        let new_parent = parent_key(&node);

        let previous = match self.nodes.get_mut(&id) {
            Some(stored) => {
                let old_parent = parent_key(&stored.node);
                let previous = std::mem::replace(&mut stored.node, node);
                if old_parent != new_parent {
                    self.unlink(&old_parent, &id);
                    self.children.entry(new_parent.clone()).or_default().push(id.clone());
                    self.sync_pane_ids(&old_parent);
                    self.record_reordered(&old_parent);
                    self.record_reordered(&new_parent);
                }
                Some(previous)
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.nodes.insert(id.clone(), StoredNode { node, seq });
                self.children.entry(new_parent.clone()).or_default().push(id.clone());
                self.record_reordered(&new_parent);
                None
            }
        };

        self.sync_pane_ids(&new_parent);
        self.sync_pane_ids(&id);
        self.record_upserted(&id);
        self.bump_rev();
        previous
    }

    /// Replaces the record for an existing id, keeping its current parent link.
    ///
    /// Returns `false` (and stores nothing) when the id is unknown.
    pub fn replace(&mut self, mut node: Node) -> bool {
        let id = node.id().clone();
        let Some(stored) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.set_parent_id(stored.node.parent_id().cloned());
        stored.node = node;
        self.sync_pane_ids(&id);
        self.record_upserted(&id);
        self.bump_rev();
        true
    }

    /// Moves `child` under `parent` at `index` (clamped; `None` appends).
    ///
    /// Fails when either end is missing or the link would create a cycle.
    pub fn link_child(&mut self, parent: &NodeId, child: &NodeId, index: Option<usize>) -> bool {
        if !self.contains(child) || parent == child {
            return false;
        }
        if !parent.is_root() && (!self.contains(parent) || self.is_descendant_of(parent, child)) {
            return false;
        }

        let old_parent = self.get(child).map(parent_key).unwrap_or_else(NodeId::root);
        self.unlink(&old_parent, child);

        let siblings = self.children.entry(parent.clone()).or_default();
        let at = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(at, child.clone());

        let new_parent_id = if parent.is_root() { None } else { Some(parent.clone()) };
        if let Some(stored) = self.nodes.get_mut(child) {
            stored.node.set_parent_id(new_parent_id);
        }

        self.sync_pane_ids(&old_parent);
        self.sync_pane_ids(parent);
        self.record_upserted(child);
        self.record_reordered(&old_parent);
        self.record_reordered(parent);
        self.bump_rev();
        true
    }

    /// Rewrites `parent`'s child order. `order` must be a permutation of the current list.
    pub fn reorder_children(&mut self, parent: &NodeId, order: &[NodeId]) -> bool {
        let current = self.children(parent);
        if current == order {
            return true;
        }
        if !is_permutation(current, order) {
            return false;
        }
        self.children.insert(parent.clone(), order.to_vec());
        self.sync_pane_ids(parent);
        self.record_reordered(parent);
        self.bump_rev();
        true
    }

    /// Swaps `id` with its neighbour in `direction`.
    ///
    /// `None` when `id` is unknown, `Some(false)` at the boundary.
    pub fn move_child(&mut self, id: &NodeId, direction: Position) -> Option<bool> {
        let parent = parent_key(self.get(id)?);
        let siblings = self.children.get_mut(&parent)?;
        let at = siblings.iter().position(|sibling| sibling == id)?;
        let target = match direction {
            Position::Before if at > 0 => at - 1,
            Position::After if at + 1 < siblings.len() => at + 1,
            _ => return Some(false),
        };
        siblings.swap(at, target);
        self.sync_pane_ids(&parent);
        self.record_reordered(&parent);
        self.bump_rev();
        Some(true)
    }

    /// Removes `id` and every descendant, returning them in pre-order.
    pub fn remove_subtree(&mut self, id: &NodeId) -> Vec<Node> {
        let Some(root) = self.get(id) else {
            return Vec::new();
        };
        let parent = parent_key(root);
        self.unlink(&parent, id);

        let mut order = vec![id.clone()];
        order.extend(self.descendants(id));

        let mut removed = Vec::with_capacity(order.len());
        for node_id in &order {
            self.children.remove(node_id);
            if let Some(stored) = self.nodes.remove(node_id) {
                removed.push(stored.node);
            }
            self.tombstones.insert(node_id.clone());
            self.record_removed(node_id);
        }

        self.sync_pane_ids(&parent);
        self.record_reordered(&parent);
        self.bump_rev();
        removed
    }

    /// Pre-order descendants of `id`, excluding `id`.
    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = self.children(id).iter().rev().cloned().collect::<Vec<_>>();
        while let Some(next) = stack.pop() {
            stack.extend(self.children(&next).iter().rev().cloned());
            out.push(next);
        }
        out
    }

    /// Whether `candidate` sits somewhere below `ancestor`.
    pub fn is_descendant_of(&self, candidate: &NodeId, ancestor: &NodeId) -> bool {
        let mut cursor = self.get(candidate).and_then(Node::parent_id);
        while let Some(parent) = cursor {
            if parent == ancestor {
                return true;
            }
            cursor = self.get(parent).and_then(Node::parent_id);
        }
        false
    }

    /// Sets the dirty flag. Returns `true` when it flipped.
    pub fn mark_changed(&mut self, id: &NodeId) -> bool {
        let Some(stored) = self.nodes.get_mut(id) else {
            return false;
        };
        if stored.node.is_changed() {
            return false;
        }
        stored.node.set_changed(true);
        self.record_upserted(id);
        self.bump_rev();
        true
    }

    /// Clears the dirty flag. Only the save-completion path calls this.
    pub fn clear_changed(&mut self, id: &NodeId) -> bool {
        let Some(stored) = self.nodes.get_mut(id) else {
            return false;
        };
        if !stored.node.is_changed() {
            return false;
        }
        stored.node.set_changed(false);
        self.record_upserted(id);
        self.bump_rev();
        true
    }

    /// Nodes whose `parent_id` points at a missing node.
    pub fn dangling_nodes(&self) -> Vec<NodeId> {
        let mut dangling = self
            .iter()
            .filter(|node| node.parent_id().is_some_and(|parent| !self.contains(parent)))
            .map(|node| node.id().clone())
            .collect::<Vec<_>>();
        dangling.sort();
        dangling
    }

    /// Removes every node that cannot be reached from the root key: nodes with a
    /// missing ancestor and parent cycles. Returns the removed ids, sorted.
    pub fn retain_reachable(&mut self) -> Vec<NodeId> {
        let reachable = self.descendants(&NodeId::root()).into_iter().collect::<HashSet<_>>();
        if reachable.len() == self.nodes.len() {
            return Vec::new();
        }
        let mut removed = self
            .nodes
            .keys()
            .filter(|id| !reachable.contains(*id))
            .cloned()
            .collect::<Vec<_>>();
        removed.sort();

        for id in &removed {
            self.nodes.remove(id);
            self.children.remove(id);
            self.tombstones.insert(id.clone());
            self.record_removed(id);
        }
        for siblings in self.children.values_mut() {
            siblings.retain(|id| reachable.contains(id));
        }
        self.children.retain(|parent, siblings| {
            !siblings.is_empty() && (parent.is_root() || reachable.contains(parent))
        });
        self.bump_rev();
        removed
    }

    /// Drops every node, keeping tombstones so retired ids stay retired.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.children.clear();
        self.bump_rev();
    }

    /// Copy of this store that journals every write, for later [`NodeStore::absorb`].
    pub fn fork(&self) -> Self {
        let mut fork = self.clone();
        fork.journal = Some(Journal::default());
        fork
    }

    /// Replays the journaled writes of `fork` onto this store.
    ///
    /// Only ids the fork touched are written, so concurrent edits to other nodes
    /// survive. Ids deleted here since the fork stay deleted. Touched nodes take the
    /// fork's version, except that a dirty flag set here is never cleared by the merge.
    /// Child orders the fork changed are adopted, keeping any children added here in the
    /// meantime at the end.
    pub fn absorb(&mut self, fork: NodeStore) -> MergeSummary {
        let mut summary = MergeSummary::default();
        let Some(journal) = fork.journal.as_ref() else {
            return summary;
        };

        for id in journal.removed() {
            if self.contains(id) {
                summary
                    .removed
                    .extend(self.remove_subtree(id).iter().map(|node| node.id().clone()));
            }
        }

        let mut pending = journal
            .upserted()
            .iter()
            .filter_map(|id| fork.nodes.get(id))
            .collect::<Vec<_>>();
        pending.sort_by_key(|stored| stored.seq);

        // Parents may be created after nodes that were re-linked under them.
        loop {
            let before = pending.len();
            pending.retain(|stored| {
                let node = &stored.node;
                if self.is_retired(node.id()) {
                    summary.dropped.push(node.id().clone());
                    return false;
                }
                if node.parent_id().is_some_and(|parent| !self.contains(parent)) {
                    return true;
                }
                let mut node = node.clone();
                if self.get(node.id()).is_some_and(Node::is_changed) {
                    node.set_changed(true);
                }
                summary.upserted.push(node.id().clone());
                self.set(node);
                false
            });
            if pending.is_empty() || pending.len() == before {
                break;
            }
        }
        summary.dropped.extend(pending.iter().map(|stored| stored.node.id().clone()));

        for parent in journal.reordered() {
            if !parent.is_root() && !self.contains(parent) {
                continue;
            }
            let Some(fork_order) = fork.children.get(parent) else {
                continue;
            };
            let current = self.children(parent).to_vec();
            let mut merged =
                fork_order.iter().filter(|id| current.contains(id)).cloned().collect::<Vec<_>>();
            for id in current {
                if !merged.contains(&id) {
                    merged.push(id);
                }
            }
            self.reorder_children(parent, &merged);
        }

        summary
    }

    fn unlink(&mut self, parent: &NodeId, id: &NodeId) {
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.retain(|sibling| sibling != id);
            if siblings.is_empty() {
                self.children.remove(parent);
            }
        }
    }

    fn sync_pane_ids(&mut self, parent: &NodeId) {
        if !matches!(self.get(parent).map(Node::node_type), Some(NodeType::StoryFragment)) {
            return;
        }
        let pane_ids = self
            .children(parent)
            .iter()
            .filter(|id| matches!(self.get(id).map(Node::node_type), Some(NodeType::Pane)))
            .cloned()
            .collect::<Vec<_>>();

        let Some(stored) = self.nodes.get_mut(parent) else {
            return;
        };
        if let NodeKind::StoryFragment(sf) = stored.node.kind_mut() {
            if sf.pane_ids != pane_ids {
                sf.pane_ids = pane_ids;
                self.record_upserted(parent);
            }
        }
    }

    fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }

    fn record_upserted(&mut self, id: &NodeId) {
        if let Some(journal) = self.journal.as_mut() {
            journal.removed.remove(id);
            journal.upserted.insert(id.clone());
        }
    }

    fn record_removed(&mut self, id: &NodeId) {
        if let Some(journal) = self.journal.as_mut() {
            journal.upserted.remove(id);
            journal.removed.insert(id.clone());
        }
    }

    fn record_reordered(&mut self, parent: &NodeId) {
        if let Some(journal) = self.journal.as_mut() {
            journal.reordered.insert(parent.clone());
        }
    }
}

/// Child-index key for `node`: its parent, or the root key.
pub fn parent_key(node: &Node) -> NodeId {
    node.parent_id().cloned().unwrap_or_else(NodeId::root)
}

fn is_permutation(current: &[NodeId], order: &[NodeId]) -> bool {
    if current.len() != order.len() {
        return false;
    }
    let mut left = current.iter().collect::<Vec<_>>();
    let mut right = order.iter().collect::<Vec<_>>();
    left.sort();
    right.sort();
    left == right
}
