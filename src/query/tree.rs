// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt::Write as _;

use crate::model::{Node, NodeId, NodeKind, NodeType};
use crate::store::NodeStore;

const LABEL_MAX_CHARS: usize = 32;

pub fn child_node_ids(store: &NodeStore, parent: &NodeId) -> Vec<NodeId> {
    store.children(parent).to_vec()
}

/// First node of `node_type` on the way from `id` (inclusive) up to the root.
pub fn closest_node_of_type(
    store: &NodeStore,
    id: &NodeId,
    node_type: NodeType,
) -> Option<NodeId> {
    let mut cursor = store.get(id);
    // The parent chain is acyclic, but a corrupted store must not hang a reader.
    let mut remaining = store.len();
    while let Some(node) = cursor {
        if node.node_type() == node_type {
            return Some(node.id().clone());
        }
        if remaining == 0 {
            return None;
        }
        remaining -= 1;
        cursor = node.parent_id().and_then(|parent| store.get(parent));
    }
    None
}

/// Indented dump of the tree, one node per line, `*` marking dirty nodes.
pub fn render_outline(store: &NodeStore) -> String {
    let mut out = String::new();
    let mut stack = store
        .children(&NodeId::root())
        .iter()
        .rev()
        .map(|id| (id, 0usize))
        .collect::<Vec<_>>();
    while let Some((id, depth)) = stack.pop() {
        let Some(node) = store.get(id) else {
            continue;
        };
        for _ in 0..depth {
            out.push_str("  ");
        }
        let _ = write!(out, "{} {}", node.node_type(), node.id());
        if let Some(tag) = node.tag_name() {
            let _ = write!(out, " <{tag}>");
        }
        if let Some(label) = outline_label(node) {
            let _ = write!(out, " \"{label}\"");
        }
        if node.is_changed() {
            out.push_str(" *");
        }
        out.push('\n');
        stack.extend(store.children(id).iter().rev().map(|child| (child, depth + 1)));
    }
    out
}

fn outline_label(node: &Node) -> Option<String> {
    let raw = match node.kind() {
        NodeKind::TagElement(flat) => flat.copy.as_deref(),
        NodeKind::BgPane(bg) => Some(bg.type_name()),
        NodeKind::File(file) => Some(file.filename.as_str()),
        _ => node.slug().or_else(|| node.title()),
    }?;
    let mut label = raw.chars().take(LABEL_MAX_CHARS).collect::<String>();
    if raw.chars().count() > LABEL_MAX_CHARS {
        label.push('…');
    }
    Some(label)
}
