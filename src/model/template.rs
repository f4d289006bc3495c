// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Id-less node subtrees used as stamps for new content.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::content::{BgPaneNode, FlatNode, ImpressionNode, MarkdownNode, PaneNode};

/// A tag element and its nested elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateNode {
    #[serde(flatten)]
    pub element: FlatNode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TemplateNode>,
}

impl TemplateNode {
    pub fn leaf(element: FlatNode) -> Self {
        Self { element, children: Vec::new() }
    }

    pub fn with_children(element: FlatNode, children: Vec<TemplateNode>) -> Self {
        Self { element, children }
    }

    /// Number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TemplateNode::node_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "fragment", rename_all = "kebab-case")]
pub enum TemplateFragment {
    Markdown {
        markdown: MarkdownNode,
        #[serde(default)]
        nodes: Vec<TemplateNode>,
    },
    BgPane {
        bg: BgPaneNode,
    },
}

impl TemplateFragment {
    pub fn node_count(&self) -> usize {
        match self {
            Self::Markdown { nodes, .. } => {
                1 + nodes.iter().map(TemplateNode::node_count).sum::<usize>()
            }
            Self::BgPane { .. } => 1,
        }
    }
}

/// A pane with its fragments and their content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePane {
    pub pane: PaneNode,
    #[serde(default)]
    pub fragments: Vec<TemplateFragment>,
}

impl TemplatePane {
    pub fn node_count(&self) -> usize {
        1 + self.fragments.iter().map(TemplateFragment::node_count).sum::<usize>()
    }
}

pub type TemplateImpression = ImpressionNode;
