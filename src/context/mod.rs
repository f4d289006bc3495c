// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The editing context: store, notification bus, edit lock and id allocator.
//!
//! Every read or write goes through a [`NodesContext`] passed in by the caller. Writes
//! finish before any subscriber runs, so callbacks may read the context freely.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::config::EditorConfig;
use crate::load::{HydrationReport, LoadData};
use crate::model::{IdAllocator, Node, NodeId, NodeType};
use crate::notify::{Atom, Notification, NotificationBus, SubscribeMode, Subscription};
use crate::store::{MergeSummary, NodeStore};

pub struct NodesContext {
    store: RefCell<NodeStore>,
    bus: NotificationBus,
    ids: Rc<RefCell<IdAllocator>>,
    dirty_count: Atom<usize>,
    config: EditorConfig,
}

impl Default for NodesContext {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl NodesContext {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            store: RefCell::new(NodeStore::new()),
            bus: NotificationBus::new(),
            ids: Rc::new(RefCell::new(IdAllocator::new())),
            dirty_count: Atom::new(0),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Replaces the whole tree with `data`.
    ///
    /// Dirty flags are cleared, nodes whose parent chain is broken are dropped with their
    /// subtrees, and each story fragment's pane order follows its `paneIds`, with panes
    /// it did not list appended. Fires one root notification.
    pub fn build_nodes_tree_from_row_data_made_nodes(&self, data: LoadData) -> HydrationReport {
        let mut report = HydrationReport::default();
        let mut listed_panes = HashMap::<NodeId, Vec<NodeId>>::new();
        let mut seen = HashSet::<NodeId>::new();

        {
            let mut store = self.store.borrow_mut();
            *store = NodeStore::new();

            for mut node in data.into_nodes() {
                node.set_changed(false);
                if !seen.insert(node.id().clone()) {
                    tracing::warn!(node_id = %node.id(), "duplicate node id in load data");
                    report.duplicates.push(node.id().clone());
                }
                if let Some(sf) = node.as_story_fragment() {
                    listed_panes.insert(node.id().clone(), sf.pane_ids.clone());
                }
                store.set(node);
            }

            for id in store.retain_reachable() {
                tracing::warn!(node_id = %id, "dropping node with missing parent chain");
                report.dropped_orphans.push(id);
            }

            let mut story_fragments = listed_panes.into_iter().collect::<Vec<_>>();
            story_fragments.sort_by(|a, b| a.0.cmp(&b.0));
            for (sf_id, listed) in story_fragments {
                if !store.contains(&sf_id) {
                    continue;
                }
                let current = store.children(&sf_id).to_vec();
                let mut order = Vec::with_capacity(current.len());
                for id in &listed {
                    if current.contains(id) && !order.contains(id) {
                        order.push(id.clone());
                    }
                }
                let unlisted =
                    current.iter().filter(|id| !order.contains(id)).cloned().collect::<Vec<_>>();
                order.extend(unlisted);
                store.reorder_children(&sf_id, &order);

                let synced = store
                    .get(&sf_id)
                    .and_then(Node::as_story_fragment)
                    .map(|sf| sf.pane_ids.clone())
                    .unwrap_or_default();
                if synced != listed {
                    tracing::warn!(
                        story_fragment = %sf_id,
                        listed = listed.len(),
                        actual = synced.len(),
                        "paneIds reconciled with pane children"
                    );
                    report.reconciled.push(sf_id);
                }
            }

            report.inserted = store.len();
        }

        self.refresh_dirty_count();
        self.bus.notify_root();
        report
    }

    /// Clone of the node record, if present.
    pub fn get_node(&self, id: &NodeId) -> Option<Node> {
        self.store.borrow().get(id).cloned()
    }

    pub fn with_node<R>(&self, id: &NodeId, f: impl FnOnce(&Node) -> R) -> Option<R> {
        self.store.borrow().get(id).map(f)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.store.borrow().contains(id)
    }

    pub fn node_type(&self, id: &NodeId) -> Option<NodeType> {
        self.with_node(id, Node::node_type)
    }

    pub fn len(&self) -> usize {
        self.store.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.borrow().is_empty()
    }

    /// Read access to the whole store. Do not hold the guard across a mutation call.
    pub fn store(&self) -> Ref<'_, NodeStore> {
        self.store.borrow()
    }

    pub(crate) fn store_mut(&self) -> RefMut<'_, NodeStore> {
        self.store.borrow_mut()
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn subscribe(
        &self,
        node_id: &NodeId,
        callback: impl FnMut(&Notification) + 'static,
    ) -> Subscription {
        self.bus.subscribe(node_id, callback)
    }

    pub fn subscribe_with_mode(
        &self,
        node_id: &NodeId,
        mode: SubscribeMode,
        callback: impl FnMut(&Notification) + 'static,
    ) -> Subscription {
        self.bus.subscribe_with_mode(node_id, mode, callback)
    }

    pub fn subscribe_root(&self, callback: impl FnMut(&Notification) + 'static) -> Subscription {
        self.bus.subscribe_root(callback)
    }

    pub fn notify_node(&self, node_id: &NodeId) -> usize {
        self.bus.notify_node(node_id)
    }

    pub fn notify_root(&self) -> usize {
        self.bus.notify_root()
    }

    pub fn set_editing_node_id(&self, node_id: Option<NodeId>) {
        self.bus.set_editing_node_id(node_id);
    }

    pub fn editing_node_id(&self) -> Option<NodeId> {
        self.bus.editing().get()
    }

    /// Number of nodes with unsaved changes, observable for save indicators.
    pub fn dirty_count(&self) -> &Atom<usize> {
        &self.dirty_count
    }

    pub(crate) fn refresh_dirty_count(&self) {
        let count = self.store.borrow().iter().filter(|node| node.is_changed()).count();
        self.dirty_count.set(count);
    }

    /// Fresh id that was never issued and is neither stored nor retired.
    pub(crate) fn allocate_id(&self) -> NodeId {
        let store = self.store.borrow();
        self.ids.borrow_mut().next_id(|id| store.contains(id) || store.is_retired(id))
    }

    /// Journaled copy of this context with its own subscribers and the same id
    /// allocator, so ids issued in the copy never collide with live ones.
    pub(crate) fn scratch(&self) -> Self {
        Self {
            store: RefCell::new(self.store.borrow().fork()),
            bus: NotificationBus::new(),
            ids: Rc::clone(&self.ids),
            dirty_count: Atom::new(self.dirty_count.get()),
            config: self.config.clone(),
        }
    }

    /// Replays `scratch`'s journaled writes onto this context. `scratch` is left empty.
    pub(crate) fn absorb(&self, scratch: &NodesContext) -> MergeSummary {
        let fork = scratch.store.take();
        let summary = self.store.borrow_mut().absorb(fork);
        for id in &summary.dropped {
            tracing::warn!(node_id = %id, "atomic update dropped a node deleted or orphaned live");
        }
        summary
    }
}

impl std::fmt::Debug for NodesContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodesContext")
            .field("nodes", &self.store.borrow().len())
            .field("bus", &self.bus)
            .field("dirty", &self.dirty_count.get())
            .finish()
    }
}
