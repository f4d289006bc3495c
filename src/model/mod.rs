// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A session is a flat set of [`Node`]s linked by `parent_id`: StoryFragment -> Pane ->
//! Markdown/BgPane -> TagElement, plus Impressions, Files, Menus and Beliefs.

pub mod content;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod node;
pub mod template;
pub mod viewport;

pub use content::{
    ArtpackImageNode, BeliefNode, BgImageNode, BgPaneNode, BreakShape, ButtonPayload, FileNode,
    FlatNode, ImpressionNode, MarkdownNode, MenuLink, MenuNode, ObjectFit, PaneNode,
    StoryFragmentNode, VisualBreakNode,
};
pub use ids::{IdAllocator, IdError, NodeId, ROOT_NODE_NAME};
pub use node::{Node, NodeKind, NodeType};
pub use template::{TemplateFragment, TemplateImpression, TemplateNode, TemplatePane};
pub use viewport::{class_token, ClassMap, Viewport, ViewportClasses, ViewportVisibility};
