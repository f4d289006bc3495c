// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Utility-class map for a single breakpoint: utility key -> value.
///
/// A pair renders as `key-value`, or as the bare `key` when the value is empty
/// (e.g. `("italic", "")`).
pub type ClassMap = BTreeMap<String, String>;

/// One of the three editing breakpoints, or `Auto` for responsive output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    Mobile,
    Tablet,
    Desktop,
    Auto,
}

impl Viewport {
    pub const BREAKPOINTS: [Viewport; 3] = [Viewport::Mobile, Viewport::Tablet, Viewport::Desktop];

    /// Breakpoints consulted, in order, when resolving a utility key for this viewport.
    pub fn fallback_chain(self) -> &'static [Viewport] {
        match self {
            Self::Mobile => &[Self::Mobile, Self::Tablet, Self::Desktop],
            Self::Tablet => &[Self::Tablet, Self::Desktop],
            Self::Desktop => &[Self::Desktop],
            Self::Auto => &[],
        }
    }
}

/// Per-breakpoint class maps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ViewportClasses {
    #[serde(default)]
    pub mobile: ClassMap,
    #[serde(default)]
    pub tablet: ClassMap,
    #[serde(default)]
    pub desktop: ClassMap,
}

impl ViewportClasses {
    pub fn for_viewport(&self, viewport: Viewport) -> Option<&ClassMap> {
        match viewport {
            Viewport::Mobile => Some(&self.mobile),
            Viewport::Tablet => Some(&self.tablet),
            Viewport::Desktop => Some(&self.desktop),
            Viewport::Auto => None,
        }
    }

    pub fn for_viewport_mut(&mut self, viewport: Viewport) -> Option<&mut ClassMap> {
        match viewport {
            Viewport::Mobile => Some(&mut self.mobile),
            Viewport::Tablet => Some(&mut self.tablet),
            Viewport::Desktop => Some(&mut self.desktop),
            Viewport::Auto => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mobile.is_empty() && self.tablet.is_empty() && self.desktop.is_empty()
    }
}

/// Viewport visibility flags shared by Markdown and background panes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportVisibility {
    pub hidden_mobile: bool,
    pub hidden_tablet: bool,
    pub hidden_desktop: bool,
}

impl ViewportVisibility {
    pub fn is_hidden(&self, viewport: Viewport) -> bool {
        match viewport {
            Viewport::Mobile => self.hidden_mobile,
            Viewport::Tablet => self.hidden_tablet,
            Viewport::Desktop => self.hidden_desktop,
            Viewport::Auto => false,
        }
    }

    pub fn is_always_visible(&self) -> bool {
        !(self.hidden_mobile || self.hidden_tablet || self.hidden_desktop)
    }
}

pub fn class_token(key: &str, value: &str) -> String {
    if value.is_empty() {
        key.to_owned()
    } else {
        format!("{key}-{value}")
    }
}
