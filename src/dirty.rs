// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Snapshots for the save pipeline: what changed, which classes it uses, what still
//! needs uploading.

use std::collections::{BTreeSet, HashSet};

use crate::config::EditorConfig;
use crate::context::NodesContext;
use crate::model::{Node, NodeId, NodeKind, NodeType, Viewport};
use crate::query::{markdown_layer_classes, node_classes};
use crate::store::NodeStore;

/// Persist order: referenced records before the records that reference them.
fn save_rank(node_type: NodeType) -> u8 {
    match node_type {
        NodeType::File => 0,
        NodeType::Menu | NodeType::Belief => 1,
        NodeType::TagElement => 2,
        NodeType::Markdown | NodeType::BgPane => 3,
        NodeType::Impression => 4,
        NodeType::Pane => 5,
        NodeType::StoryFragment => 6,
    }
}

/// Dirty nodes in save order: panes before the story fragments listing them, ties in
/// insertion order.
pub fn dirty_nodes(store: &NodeStore) -> Vec<Node> {
    let mut dirty = store.iter().filter(|node| node.is_changed()).collect::<Vec<_>>();
    dirty.sort_by_key(|node| (save_rank(node.node_type()), store.insertion_seq(node.id())));
    dirty.into_iter().cloned().collect()
}

/// Every utility class used by dirty nodes and by the full content of dirty panes,
/// with responsive prefixes.
pub fn dirty_class_data(store: &NodeStore, config: &EditorConfig) -> BTreeSet<String> {
    let mut scope = HashSet::<NodeId>::new();
    for node in store.iter().filter(|node| node.is_changed()) {
        scope.insert(node.id().clone());
        if node.node_type() == NodeType::Pane {
            scope.extend(store.descendants(node.id()));
        }
    }

    let mut classes = BTreeSet::new();
    for id in &scope {
        let tokens = node_classes(store, id, Viewport::Auto, config);
        classes.extend(tokens.split_whitespace().map(ToOwned::to_owned));
        for layer in markdown_layer_classes(store, id, Viewport::Auto, config) {
            classes.extend(layer.split_whitespace().map(ToOwned::to_owned));
        }
    }
    classes
}

/// A file whose bytes have not reached the backend yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub id: NodeId,
    pub filename: String,
    pub data: Result<Vec<u8>, base64::DecodeError>,
}

/// Dirty file nodes still carrying inline `base64Data`.
pub fn pending_uploads(store: &NodeStore) -> Vec<PendingUpload> {
    dirty_nodes(store)
        .into_iter()
        .filter_map(|node| {
            let NodeKind::File(file) = node.kind() else {
                return None;
            };
            let data = file.pending_bytes()?;
            if let Err(err) = &data {
                tracing::warn!(node_id = %node.id(), %err, "pending upload is not valid base64");
            }
            Some(PendingUpload { id: node.id().clone(), filename: file.filename.clone(), data })
        })
        .collect()
}

impl NodesContext {
    pub fn get_dirty_nodes(&self) -> Vec<Node> {
        dirty_nodes(&self.store())
    }

    pub fn get_dirty_nodes_class_data(&self) -> BTreeSet<String> {
        dirty_class_data(&self.store(), self.config())
    }

    pub fn pending_uploads(&self) -> Vec<PendingUpload> {
        pending_uploads(&self.store())
    }

    /// Save completion: clears the dirty flag of `ids`. Returns how many flipped.
    pub fn clear_dirty(&self, ids: &[NodeId]) -> usize {
        let cleared = {
            let mut store = self.store_mut();
            ids.iter().filter(|id| store.clear_changed(id)).count()
        };
        self.refresh_dirty_count();
        cleared
    }
}
