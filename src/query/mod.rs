// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only derivations over the node tree.
//!
//! Everything here is recomputed from the current store on every call; callers memoize.

pub mod classes;
pub mod insert;
pub mod styles;
pub mod tree;

pub use classes::{markdown_layer_classes, node_classes, resolve_classes};
pub use insert::{allow_insert, allow_insert_li};
pub use styles::{code_hook_payload, css_properties, node_slug, CodeHook, CssProperties};
pub use tree::{child_node_ids, closest_node_of_type, render_outline};

use crate::context::NodesContext;
use crate::model::{NodeId, NodeType, Viewport};

impl NodesContext {
    /// Ordered children of `parent`; pass [`NodeId::root`] for top-level nodes.
    pub fn get_child_node_ids(&self, parent: &NodeId) -> Vec<NodeId> {
        child_node_ids(&self.store(), parent)
    }

    /// Nearest node of `node_type` from `id` upwards, `id` included.
    pub fn get_closest_node_type_from_id(
        &self,
        id: &NodeId,
        node_type: NodeType,
    ) -> Option<NodeId> {
        closest_node_of_type(&self.store(), id, node_type)
    }

    pub fn get_node_classes(&self, id: &NodeId, viewport: Viewport) -> String {
        node_classes(&self.store(), id, viewport, self.config())
    }

    pub fn get_markdown_layer_classes(&self, id: &NodeId, viewport: Viewport) -> Vec<String> {
        markdown_layer_classes(&self.store(), id, viewport, self.config())
    }

    pub fn get_node_css_properties_styles(&self, id: &NodeId) -> CssProperties {
        css_properties(&self.store(), id)
    }

    pub fn get_node_code_hook_payload(&self, id: &NodeId) -> Option<CodeHook> {
        code_hook_payload(&self.store(), id)
    }

    pub fn get_node_slug(&self, id: &NodeId) -> Option<String> {
        node_slug(&self.store(), id)
    }

    pub fn allow_insert(&self, anchor: &NodeId, tag: &str) -> bool {
        allow_insert(&self.store(), anchor, tag)
    }

    pub fn allow_insert_li(&self, anchor: &NodeId, tag: &str) -> bool {
        allow_insert_li(&self.store(), anchor, tag)
    }

    pub fn render_outline(&self) -> String {
        render_outline(&self.store())
    }
}
