// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Per-variant node payloads.

use std::collections::BTreeMap;

use base64::Engine as _;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::ids::NodeId;
use super::viewport::{ViewportClasses, ViewportVisibility};

/// A page: an ordered list of panes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryFragmentNode {
    pub title: String,
    pub slug: String,
    /// Render order. Kept equal to the fragment's Pane children by the store.
    #[serde(default)]
    pub pane_ids: Vec<NodeId>,
    #[serde(default)]
    pub has_menu: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tailwind_bg_colour: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaneNode {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub is_decorative: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_colour: Option<String>,
    /// When set, the pane renders an external widget instead of markdown content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_hook_target: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub code_hook_payload: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub held_beliefs: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub withheld_beliefs: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub is_context_pane: bool,
}

/// Markdown pane fragment: owns the class defaults for the tag elements below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown_id: Option<String>,
    /// Tag name -> per-viewport defaults for every element with that tag.
    #[serde(default)]
    pub default_classes: BTreeMap<String, ViewportClasses>,
    /// Wrapper layers, outermost first.
    #[serde(default)]
    pub parent_classes: Vec<ViewportClasses>,
    #[serde(default)]
    pub hidden_viewport_mobile: bool,
    #[serde(default)]
    pub hidden_viewport_tablet: bool,
    #[serde(default)]
    pub hidden_viewport_desktop: bool,
}

impl MarkdownNode {
    pub fn visibility(&self) -> ViewportVisibility {
        ViewportVisibility {
            hidden_mobile: self.hidden_viewport_mobile,
            hidden_tablet: self.hidden_viewport_tablet,
            hidden_desktop: self.hidden_viewport_desktop,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectFit {
    #[default]
    Cover,
    Contain,
    Fill,
}

impl ObjectFit {
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Contain => "contain",
            Self::Fill => "100% 100%",
        }
    }
}

/// Background pane fragments, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum BgPaneNode {
    #[serde(rename = "background-image")]
    BackgroundImage(BgImageNode),
    #[serde(rename = "artpack-image")]
    ArtpackImage(ArtpackImageNode),
    #[serde(rename = "visual-break")]
    VisualBreak(VisualBreakNode),
}

impl BgPaneNode {
    pub fn visibility(&self) -> ViewportVisibility {
        let (mobile, tablet, desktop) = match self {
            Self::BackgroundImage(bg) => {
                (bg.hidden_viewport_mobile, bg.hidden_viewport_tablet, bg.hidden_viewport_desktop)
            }
            Self::ArtpackImage(art) => (
                art.hidden_viewport_mobile,
                art.hidden_viewport_tablet,
                art.hidden_viewport_desktop,
            ),
            Self::VisualBreak(vb) => {
                (vb.hidden_viewport_mobile, vb.hidden_viewport_tablet, vb.hidden_viewport_desktop)
            }
        };
        ViewportVisibility { hidden_mobile: mobile, hidden_tablet: tablet, hidden_desktop: desktop }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::BackgroundImage(_) => "background-image",
            Self::ArtpackImage(_) => "artpack-image",
            Self::VisualBreak(_) => "visual-break",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BgImageNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<NodeId>,
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default)]
    pub object_fit: ObjectFit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default)]
    pub hidden_viewport_mobile: bool,
    #[serde(default)]
    pub hidden_viewport_tablet: bool,
    #[serde(default)]
    pub hidden_viewport_desktop: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtpackImageNode {
    pub collection: String,
    pub image: String,
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default)]
    pub object_fit: ObjectFit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default)]
    pub hidden_viewport_mobile: bool,
    #[serde(default)]
    pub hidden_viewport_tablet: bool,
    #[serde(default)]
    pub hidden_viewport_desktop: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BreakShape {
    pub collection: String,
    pub image: String,
    pub svg_fill: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisualBreakNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_desktop: Option<BreakShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_tablet: Option<BreakShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_mobile: Option<BreakShape>,
    #[serde(default)]
    pub hidden_viewport_mobile: bool,
    #[serde(default)]
    pub hidden_viewport_tablet: bool,
    #[serde(default)]
    pub hidden_viewport_desktop: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ButtonPayload {
    #[serde(default)]
    pub button_classes: BTreeMap<String, String>,
    #[serde(default)]
    pub button_hover_classes: BTreeMap<String, String>,
    pub callback_payload: String,
}

/// Generic flat content element (paragraph, heading, list item, link, image, widget...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlatNode {
    #[schemars(with = "String")]
    pub tag_name: SmolStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code_hook_params: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_classes: Option<ViewportClasses>,
    /// Inline declarations, `prop: value; prop: value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_css: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_payload: Option<ButtonPayload>,
}

impl FlatNode {
    pub fn new(tag_name: impl Into<SmolStr>) -> Self {
        Self { tag_name: tag_name.into(), ..Self::default() }
    }

    pub fn with_copy(mut self, copy: impl Into<String>) -> Self {
        self.copy = Some(copy.into());
        self
    }
}

/// Call-to-action attached 1:1 to a pane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImpressionNode {
    pub title: String,
    pub body: String,
    pub button_text: String,
    pub actions_lisp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub filename: String,
    #[serde(default)]
    pub alt_description: String,
    #[serde(default)]
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_set: Option<String>,
    /// Pending upload payload; cleared once the upload completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64_data: Option<String>,
}

impl FileNode {
    /// Decodes the pending upload, accepting both bare base64 and `data:` URLs.
    pub fn pending_bytes(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        let raw = self.base64_data.as_deref()?;
        let payload = match raw.split_once(";base64,") {
            Some((_, data)) if raw.starts_with("data:") => data,
            _ => raw,
        };
        Some(base64::engine::general_purpose::STANDARD.decode(payload.trim()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuLink {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub featured: bool,
    pub action_lisp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
    pub title: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub options_payload: Vec<MenuLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BeliefNode {
    pub title: String,
    pub slug: String,
    pub scale: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_values: Vec<String>,
}
