// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::{mark_save_unit, Changes, Position};
use crate::context::NodesContext;
use crate::model::{
    Node, NodeId, NodeKind, NodeType, TemplateFragment, TemplateImpression, TemplateNode,
    TemplatePane,
};
use crate::query::{allow_insert, allow_insert_li};
use crate::slug::title_to_slug;
use crate::store::{parent_key, NodeStore};

impl NodesContext {
    /// Stamps `template` under the story fragment `owner` with fresh ids.
    ///
    /// The pane lands next to `anchor` (before or after), or at the end when no anchor
    /// is given or the anchor is not one of `owner`'s children. Its slug is made unique.
    /// Returns the new pane id, or `None` when `owner` is not a story fragment.
    pub fn add_template_pane(
        &self,
        owner: &NodeId,
        template: &TemplatePane,
        anchor: Option<&NodeId>,
        position: Position,
    ) -> Option<NodeId> {
        if self.node_type(owner) != Some(NodeType::StoryFragment) {
            tracing::debug!(owner_id = %owner, "add_template_pane: owner is not a story fragment");
            return None;
        }
        self.stamp_pane(owner, template, anchor, position, false)
    }

    /// Stamps `template` as a context pane: a standalone page owned by the root key or
    /// by a node that is not a story fragment.
    pub fn add_context_template_pane(
        &self,
        owner: &NodeId,
        template: &TemplatePane,
    ) -> Option<NodeId> {
        if !owner.is_root() {
            match self.node_type(owner) {
                None => {
                    tracing::debug!(owner_id = %owner, "add_context_template_pane: owner missing");
                    return None;
                }
                Some(NodeType::StoryFragment) => {
                    tracing::debug!(
                        owner_id = %owner,
                        "add_context_template_pane: story fragments take regular panes"
                    );
                    return None;
                }
                Some(_) => {}
            }
        }
        self.stamp_pane(owner, template, None, Position::After, true)
    }

    /// Attaches an impression to `pane_id`. A pane carries at most one impression.
    pub fn add_template_impression_node(
        &self,
        pane_id: &NodeId,
        template: &TemplateImpression,
    ) -> Option<NodeId> {
        {
            let store = self.store();
            if store.get(pane_id).map(Node::node_type) != Some(NodeType::Pane) {
                tracing::debug!(pane_id = %pane_id, "add_template_impression_node: not a pane");
                return None;
            }
            let has_impression = store.children(pane_id).iter().any(|child| {
                store.get(child).map(Node::node_type) == Some(NodeType::Impression)
            });
            if has_impression {
                tracing::debug!(pane_id = %pane_id, "pane already has an impression");
                return None;
            }
        }

        let id = self.allocate_id();
        let mut changes = Changes::default();
        {
            let mut store = self.store_mut();
            let kind = NodeKind::Impression(template.clone());
            let mut node = Node::new(id.clone(), Some(pane_id.clone()), kind);
            node.set_changed(true);
            store.set(node);
            mark_save_unit(&mut store, pane_id);
        }
        changes.record_children(pane_id);
        changes.dispatch(self);
        Some(id)
    }

    /// Inserts a tag-element subtree as a sibling of `anchor`, if the anchor's context
    /// accepts the template's root tag. Returns the id of the inserted root.
    pub fn insert_template_node(
        &self,
        anchor: &NodeId,
        template: &TemplateNode,
        position: Position,
    ) -> Option<NodeId> {
        let parent = {
            let store = self.store();
            let tag = template.element.tag_name.as_str();
            if !allow_insert(&store, anchor, tag) && !allow_insert_li(&store, anchor, tag) {
                tracing::debug!(anchor_id = %anchor, tag, "insert_template_node: not allowed here");
                return None;
            }
            store.get(anchor).map(parent_key)?
        };

        let mut nodes = Vec::with_capacity(template.node_count());
        let root_id = self.stamp_elements(&parent, std::slice::from_ref(template), &mut nodes);
        let root_id = root_id.into_iter().next()?;

        let mut changes = Changes::default();
        {
            let mut store = self.store_mut();
            let index = sibling_index(&store, &parent, Some(anchor), position);
            for mut node in nodes {
                node.set_changed(true);
                store.set(node);
            }
            if let Some(index) = index {
                store.link_child(&parent, &root_id, Some(index));
            }
            mark_save_unit(&mut store, &parent);
        }
        changes.record_children(&parent);
        changes.dispatch(self);
        Some(root_id)
    }

    fn stamp_pane(
        &self,
        owner: &NodeId,
        template: &TemplatePane,
        anchor: Option<&NodeId>,
        position: Position,
        is_context_pane: bool,
    ) -> Option<NodeId> {
        let pane_id = self.allocate_id();
        let mut pane = template.pane.clone();
        let base = if pane.slug.is_empty() {
            title_to_slug(&pane.title, self.config().slug_max_len)
        } else {
            pane.slug.clone()
        };
        pane.slug = self.find_unique_slug(&base);
        pane.is_context_pane = is_context_pane;

        let pane_parent = if owner.is_root() { None } else { Some(owner.clone()) };
        let mut nodes = Vec::with_capacity(template.node_count());
        nodes.push(Node::new(pane_id.clone(), pane_parent, NodeKind::Pane(pane)));

        for fragment in &template.fragments {
            let fragment_id = self.allocate_id();
            match fragment {
                TemplateFragment::Markdown { markdown, nodes: elements } => {
                    nodes.push(Node::new(
                        fragment_id.clone(),
                        Some(pane_id.clone()),
                        NodeKind::Markdown(markdown.clone()),
                    ));
                    self.stamp_elements(&fragment_id, elements, &mut nodes);
                }
                TemplateFragment::BgPane { bg } => nodes.push(Node::new(
                    fragment_id,
                    Some(pane_id.clone()),
                    NodeKind::BgPane(bg.clone()),
                )),
            }
        }

        let mut changes = Changes::default();
        {
            let mut store = self.store_mut();
            let index = sibling_index(&store, owner, anchor, position);
            for mut node in nodes {
                node.set_changed(true);
                store.set(node);
            }
            if let Some(index) = index {
                store.link_child(owner, &pane_id, Some(index));
            }
            mark_save_unit(&mut store, owner);
        }
        tracing::debug!(owner_id = %owner, pane_id = %pane_id, "template pane added");
        changes.record_children(owner);
        changes.dispatch(self);
        Some(pane_id)
    }

    /// Pre-order copies of `templates` under `parent`; returns the ids of the top level.
    fn stamp_elements(
        &self,
        parent: &NodeId,
        templates: &[TemplateNode],
        out: &mut Vec<Node>,
    ) -> Vec<NodeId> {
        let mut top = Vec::with_capacity(templates.len());
        for template in templates {
            let id = self.allocate_id();
            let parent_id = if parent.is_root() { None } else { Some(parent.clone()) };
            let kind = NodeKind::TagElement(template.element.clone());
            out.push(Node::new(id.clone(), parent_id, kind));
            self.stamp_elements(&id, &template.children, out);
            top.push(id);
        }
        top
    }
}

/// Where a new child of `parent` goes relative to `anchor`; `None` appends.
fn sibling_index(
    store: &NodeStore,
    parent: &NodeId,
    anchor: Option<&NodeId>,
    position: Position,
) -> Option<usize> {
    let anchor = anchor?;
    let Some(at) = store.children(parent).iter().position(|child| child == anchor) else {
        tracing::debug!(anchor_id = %anchor, "anchor is gone; appending");
        return None;
    };
    Some(match position {
        Position::Before => at,
        Position::After => at + 1,
    })
}
