// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::content::{
    BeliefNode, BgPaneNode, FileNode, FlatNode, ImpressionNode, MarkdownNode, MenuNode, PaneNode,
    StoryFragmentNode,
};
use super::ids::NodeId;

/// Payload-free discriminator of a [`NodeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    StoryFragment,
    Pane,
    Markdown,
    BgPane,
    TagElement,
    Impression,
    File,
    Menu,
    Belief,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StoryFragment => "StoryFragment",
            Self::Pane => "Pane",
            Self::Markdown => "Markdown",
            Self::BgPane => "BgPane",
            Self::TagElement => "TagElement",
            Self::Impression => "Impression",
            Self::File => "File",
            Self::Menu => "Menu",
            Self::Belief => "Belief",
        }
    }

    /// Markdown and background fragments, the direct content children of a pane.
    pub fn is_pane_fragment(self) -> bool {
        matches!(self, Self::Markdown | Self::BgPane)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "nodeType")]
pub enum NodeKind {
    StoryFragment(StoryFragmentNode),
    Pane(PaneNode),
    Markdown(MarkdownNode),
    BgPane(BgPaneNode),
    TagElement(FlatNode),
    Impression(ImpressionNode),
    File(FileNode),
    Menu(MenuNode),
    Belief(BeliefNode),
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::StoryFragment(_) => NodeType::StoryFragment,
            Self::Pane(_) => NodeType::Pane,
            Self::Markdown(_) => NodeType::Markdown,
            Self::BgPane(_) => NodeType::BgPane,
            Self::TagElement(_) => NodeType::TagElement,
            Self::Impression(_) => NodeType::Impression,
            Self::File(_) => NodeType::File,
            Self::Menu(_) => NodeType::Menu,
            Self::Belief(_) => NodeType::Belief,
        }
    }
}

/// A single addressable node of the content tree.
///
/// `parent_id` is a back-reference only; the store owns every node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    id: NodeId,
    #[serde(default)]
    parent_id: Option<NodeId>,
    #[serde(default)]
    is_changed: bool,
    #[serde(flatten)]
    kind: NodeKind,
}

impl Node {
    pub fn new(id: NodeId, parent_id: Option<NodeId>, kind: NodeKind) -> Self {
        Self { id, parent_id, is_changed: false, kind }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&NodeId> {
        self.parent_id.as_ref()
    }

    pub(crate) fn set_parent_id(&mut self, parent_id: Option<NodeId>) {
        self.parent_id = parent_id;
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn is_changed(&self) -> bool {
        self.is_changed
    }

    pub(crate) fn set_changed(&mut self, is_changed: bool) {
        self.is_changed = is_changed;
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn into_kind(self) -> NodeKind {
        self.kind
    }

    pub fn as_story_fragment(&self) -> Option<&StoryFragmentNode> {
        match &self.kind {
            NodeKind::StoryFragment(sf) => Some(sf),
            _ => None,
        }
    }

    pub fn as_pane(&self) -> Option<&PaneNode> {
        match &self.kind {
            NodeKind::Pane(pane) => Some(pane),
            _ => None,
        }
    }

    pub fn as_markdown(&self) -> Option<&MarkdownNode> {
        match &self.kind {
            NodeKind::Markdown(md) => Some(md),
            _ => None,
        }
    }

    pub fn as_tag_element(&self) -> Option<&FlatNode> {
        match &self.kind {
            NodeKind::TagElement(flat) => Some(flat),
            _ => None,
        }
    }

    /// Tag name for tag elements, `None` otherwise.
    pub fn tag_name(&self) -> Option<&str> {
        self.as_tag_element().map(|flat| flat.tag_name.as_str())
    }

    /// Slug for the slugged variants (Pane, StoryFragment, Belief).
    pub fn slug(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::StoryFragment(sf) => Some(&sf.slug),
            NodeKind::Pane(pane) => Some(&pane.slug),
            NodeKind::Belief(belief) => Some(&belief.slug),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::StoryFragment(sf) => Some(&sf.title),
            NodeKind::Pane(pane) => Some(&pane.title),
            NodeKind::Impression(imp) => Some(&imp.title),
            NodeKind::Menu(menu) => Some(&menu.title),
            NodeKind::Belief(belief) => Some(&belief.title),
            _ => None,
        }
    }
}
