// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Utility-class resolution per viewport.
//!
//! For each class key the first hit wins, walking the viewport's fallback chain
//! (mobile -> tablet -> desktop) and, at every step, an element's own override before
//! the markdown block's default for its tag. [`Viewport::Auto`] renders mobile-first
//! classes with responsive prefixes where a larger breakpoint differs.
//!
//! `Auto` output follows CSS cascade: a key with no value at a larger breakpoint keeps
//! the smaller breakpoint's token there, since utility classes have no generic reset.
//! Single-viewport output reports only what resolves at that viewport, so a key set
//! at tablet but not desktop is absent from `Viewport::Desktop` yet still applies at
//! the desktop width of the `Auto` string.

use std::collections::BTreeSet;

use super::tree::closest_node_of_type;
use crate::config::EditorConfig;
use crate::model::{
    class_token, ClassMap, NodeId, NodeKind, NodeType, Viewport, ViewportClasses,
    ViewportVisibility,
};
use crate::store::NodeStore;

/// Class string for `id` at `viewport`; empty for unknown ids and unstyled variants.
pub fn node_classes(
    store: &NodeStore,
    id: &NodeId,
    viewport: Viewport,
    config: &EditorConfig,
) -> String {
    let Some(node) = store.get(id) else {
        return String::new();
    };
    match node.kind() {
        NodeKind::TagElement(flat) => {
            let defaults = closest_node_of_type(store, id, NodeType::Markdown)
                .and_then(|md_id| store.get(&md_id))
                .and_then(|md| md.as_markdown())
                .and_then(|md| md.default_classes.get(flat.tag_name.as_str()));
            classes_for(defaults, flat.override_classes.as_ref(), viewport, config).join(" ")
        }
        NodeKind::Markdown(md) => {
            let visibility = md.visibility();
            if viewport != Viewport::Auto && visibility.is_hidden(viewport) {
                return "hidden".to_owned();
            }
            let mut tokens = visibility_classes(visibility, viewport, config);
            tokens.extend(classes_for(md.parent_classes.first(), None, viewport, config));
            tokens.join(" ")
        }
        NodeKind::BgPane(bg) => visibility_classes(bg.visibility(), viewport, config).join(" "),
        _ => String::new(),
    }
}

/// One class string per wrapper layer of a markdown block, outermost first.
pub fn markdown_layer_classes(
    store: &NodeStore,
    id: &NodeId,
    viewport: Viewport,
    config: &EditorConfig,
) -> Vec<String> {
    store
        .get(id)
        .and_then(|node| node.as_markdown())
        .map(|md| {
            md.parent_classes
                .iter()
                .map(|layer| classes_for(Some(layer), None, viewport, config).join(" "))
                .collect()
        })
        .unwrap_or_default()
}

/// Resolved `key -> value` map for one concrete viewport.
pub fn resolve_classes(
    defaults: Option<&ViewportClasses>,
    overrides: Option<&ViewportClasses>,
    viewport: Viewport,
) -> ClassMap {
    let sources = [overrides, defaults];
    let keys = sources
        .into_iter()
        .flatten()
        .flat_map(|classes| {
            Viewport::BREAKPOINTS.iter().filter_map(move |vp| classes.for_viewport(*vp))
        })
        .flat_map(|map| map.keys())
        .collect::<BTreeSet<_>>();

    let mut resolved = ClassMap::new();
    for key in keys {
        let hit = viewport.fallback_chain().iter().find_map(|vp| {
            sources.into_iter().flatten().find_map(|classes| {
                classes.for_viewport(*vp).and_then(|map| map.get(key.as_str()))
            })
        });
        if let Some(value) = hit {
            resolved.insert(key.clone(), value.clone());
        }
    }
    resolved
}

fn classes_for(
    defaults: Option<&ViewportClasses>,
    overrides: Option<&ViewportClasses>,
    viewport: Viewport,
    config: &EditorConfig,
) -> Vec<String> {
    if viewport != Viewport::Auto {
        return tokens(&resolve_classes(defaults, overrides, viewport));
    }

    let mobile = resolve_classes(defaults, overrides, Viewport::Mobile);
    let tablet = resolve_classes(defaults, overrides, Viewport::Tablet);
    let desktop = resolve_classes(defaults, overrides, Viewport::Desktop);

    let mut out = tokens(&mobile);
    out.extend(prefixed_changes(&mobile, &tablet, &config.tablet_prefix));
    out.extend(prefixed_changes(&tablet, &desktop, &config.desktop_prefix));
    out
}

/// Prefixed tokens for keys whose value at `larger` differs from `smaller`. Keys that
/// resolve only at `smaller` emit nothing and cascade upward.
fn prefixed_changes(smaller: &ClassMap, larger: &ClassMap, prefix: &str) -> Vec<String> {
    larger
        .iter()
        .filter(|(key, value)| smaller.get(*key) != Some(*value))
        .map(|(key, value)| format!("{prefix}:{}", class_token(key, value)))
        .collect()
}

fn tokens(map: &ClassMap) -> Vec<String> {
    map.iter().map(|(key, value)| class_token(key, value)).collect()
}

fn visibility_classes(
    visibility: ViewportVisibility,
    viewport: Viewport,
    config: &EditorConfig,
) -> Vec<String> {
    if viewport != Viewport::Auto {
        return if visibility.is_hidden(viewport) { vec!["hidden".to_owned()] } else { Vec::new() };
    }
    if visibility.is_always_visible() {
        return Vec::new();
    }

    let mut out = Vec::new();
    if visibility.hidden_mobile {
        out.push("hidden".to_owned());
    }
    let steps = [
        (visibility.hidden_mobile, visibility.hidden_tablet, config.tablet_prefix.as_str()),
        (visibility.hidden_tablet, visibility.hidden_desktop, config.desktop_prefix.as_str()),
    ];
    for (before, now, prefix) in steps {
        if before != now {
            let display = if now { "hidden" } else { "block" };
            out.push(format!("{prefix}:{display}"));
        }
    }
    out
}
