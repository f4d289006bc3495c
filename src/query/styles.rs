// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::tree::closest_node_of_type;
use crate::model::{BgPaneNode, NodeId, NodeKind, NodeType, ObjectFit};
use crate::store::NodeStore;

/// Inline style properties, keyed by CSS property name.
pub type CssProperties = BTreeMap<String, String>;

/// Custom widget a pane renders instead of markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeHook {
    pub target: String,
    pub payload: BTreeMap<String, String>,
}

/// Inline styles derived from the node's own fields.
pub fn css_properties(store: &NodeStore, id: &NodeId) -> CssProperties {
    let mut css = CssProperties::new();
    let Some(node) = store.get(id) else {
        return css;
    };
    match node.kind() {
        NodeKind::Pane(pane) => {
            if let Some(colour) = pane.bg_colour.as_deref().filter(|c| !c.is_empty()) {
                css.insert("background-color".to_owned(), colour.to_owned());
            }
        }
        NodeKind::BgPane(BgPaneNode::BackgroundImage(bg)) => {
            let size = bg.size.as_deref();
            background(&mut css, &bg.src, bg.object_fit, size, bg.position.as_deref());
        }
        NodeKind::BgPane(BgPaneNode::ArtpackImage(art)) => {
            let size = art.size.as_deref();
            background(&mut css, &art.src, art.object_fit, size, art.position.as_deref());
        }
        NodeKind::TagElement(flat) => {
            if let Some(raw) = flat.element_css.as_deref() {
                css.extend(parse_declarations(raw));
            }
        }
        _ => {}
    }
    css
}

fn background(
    css: &mut CssProperties,
    src: &str,
    fit: ObjectFit,
    size: Option<&str>,
    position: Option<&str>,
) {
    if src.is_empty() {
        return;
    }
    css.insert("background-image".to_owned(), format!("url({src})"));
    css.insert("background-size".to_owned(), size.unwrap_or(fit.as_css()).to_owned());
    css.insert("background-position".to_owned(), position.unwrap_or("center").to_owned());
    css.insert("background-repeat".to_owned(), "no-repeat".to_owned());
}

/// `a: b; c: d` pairs; malformed declarations are skipped.
fn parse_declarations(raw: &str) -> impl Iterator<Item = (String, String)> + '_ {
    raw.split(';').filter_map(|declaration| {
        let (property, value) = declaration.split_once(':')?;
        let (property, value) = (property.trim(), value.trim());
        if property.is_empty() || value.is_empty() {
            return None;
        }
        Some((property.to_ascii_lowercase(), value.to_owned()))
    })
}

/// Code hook of the pane `id`, if it is configured to render one.
pub fn code_hook_payload(store: &NodeStore, id: &NodeId) -> Option<CodeHook> {
    let pane = store.get(id)?.as_pane()?;
    let target = pane.code_hook_target.as_deref().filter(|target| !target.is_empty())?;
    Some(CodeHook { target: target.to_owned(), payload: pane.code_hook_payload.clone() })
}

/// The node's own slug, else the slug of its pane.
pub fn node_slug(store: &NodeStore, id: &NodeId) -> Option<String> {
    let node = store.get(id)?;
    if let Some(slug) = node.slug() {
        return Some(slug.to_owned());
    }
    let pane_id = closest_node_of_type(store, id, NodeType::Pane)?;
    store.get(&pane_id)?.slug().map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::{code_hook_payload, css_properties, node_slug};
    use crate::model::fixtures::{nid, small_story};
    use crate::model::NodeKind;
    use crate::store::NodeStore;

    fn store() -> NodeStore {
        let mut store = NodeStore::new();
        for node in small_story() {
            store.set(node);
        }
        store
    }

    fn edit(store: &mut NodeStore, id: &str, f: impl FnOnce(&mut NodeKind)) {
        let mut node = store.get(&nid(id)).cloned().expect("node");
        f(node.kind_mut());
        store.replace(node);
    }

    #[test]
    fn pane_background_colour() {
        let mut store = store();
        assert!(css_properties(&store, &nid("p1")).is_empty());
        edit(&mut store, "p1", |kind| {
            if let NodeKind::Pane(pane) = kind {
                pane.bg_colour = Some("#10120d".to_owned());
            }
        });
        let css = css_properties(&store, &nid("p1"));
        assert_eq!(css.get("background-color").map(String::as_str), Some("#10120d"));
    }

    #[test]
    fn background_image_uses_fit_and_position() {
        let store = store();
        let css = css_properties(&store, &nid("bg1"));
        assert_eq!(css["background-image"], "url(/media/bg.webp)");
        assert_eq!(css["background-size"], "cover");
        assert_eq!(css["background-position"], "center");
    }

    #[test]
    fn element_css_is_parsed_leniently() {
        let mut store = store();
        edit(&mut store, "para", |kind| {
            if let NodeKind::TagElement(flat) = kind {
                flat.element_css = Some("Color: red; broken; margin-top : 2px;".to_owned());
            }
        });
        let css = css_properties(&store, &nid("para"));
        assert_eq!(css.len(), 2);
        assert_eq!(css["color"], "red");
        assert_eq!(css["margin-top"], "2px");
    }

    #[test]
    fn code_hook_only_for_configured_panes() {
        let mut store = store();
        assert_eq!(code_hook_payload(&store, &nid("p1")), None);
        edit(&mut store, "p1", |kind| {
            if let NodeKind::Pane(pane) = kind {
                pane.code_hook_target = Some("signup".to_owned());
                pane.code_hook_payload.insert("list".to_owned(), "news".to_owned());
            }
        });
        let hook = code_hook_payload(&store, &nid("p1")).expect("hook");
        assert_eq!(hook.target, "signup");
        assert_eq!(hook.payload["list"], "news");
        assert_eq!(code_hook_payload(&store, &nid("md1")), None);
    }

    #[test]
    fn slug_falls_back_to_pane() {
        let store = store();
        assert_eq!(node_slug(&store, &nid("sf1")).as_deref(), Some("home"));
        assert_eq!(node_slug(&store, &nid("li2")).as_deref(), Some("hero"));
        assert_eq!(node_slug(&store, &nid("bg1")).as_deref(), Some("footer"));
        assert_eq!(node_slug(&store, &nid("nope")), None);
    }
}
