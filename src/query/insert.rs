// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structural legality of inserting a tag next to an existing node.
//!
//! The anchor's parent decides the context: a markdown block takes block tags, a list
//! takes list items only, and any other element takes inline tags.

use crate::model::{Node, NodeId, NodeKind};
use crate::store::NodeStore;

const BLOCK_TAGS: &[&str] =
    &["p", "h2", "h3", "h4", "h5", "h6", "blockquote", "ul", "ol", "img", "code"];
const INLINE_TAGS: &[&str] = &["a", "strong", "em", "span", "button", "br"];
const LIST_TAGS: &[&str] = &["ul", "ol"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InsertContext {
    Block,
    List,
    ListItem,
    Inline,
}

fn insert_context<'a>(
    store: &'a NodeStore,
    anchor: &NodeId,
) -> Option<(InsertContext, &'a Node)> {
    let anchor_node = store.get(anchor)?;
    anchor_node.as_tag_element()?;
    let parent = store.get(anchor_node.parent_id()?)?;
    let context = match parent.kind() {
        NodeKind::Markdown(_) => InsertContext::Block,
        NodeKind::TagElement(flat) if LIST_TAGS.contains(&flat.tag_name.as_str()) => {
            InsertContext::List
        }
        NodeKind::TagElement(flat) if flat.tag_name.as_str() == "li" => InsertContext::ListItem,
        NodeKind::TagElement(_) => InsertContext::Inline,
        _ => return None,
    };
    Some((context, anchor_node))
}

/// Whether `tag` may be inserted beside `anchor` outside of list structure.
pub fn allow_insert(store: &NodeStore, anchor: &NodeId, tag: &str) -> bool {
    match insert_context(store, anchor) {
        Some((InsertContext::Block, _)) => BLOCK_TAGS.contains(&tag),
        Some((InsertContext::Inline, _)) => INLINE_TAGS.contains(&tag),
        _ => false,
    }
}

/// List-aware variant: list items beside list items, inline content (and images next
/// to images) inside a list item.
pub fn allow_insert_li(store: &NodeStore, anchor: &NodeId, tag: &str) -> bool {
    match insert_context(store, anchor) {
        Some((InsertContext::List, _)) => tag == "li",
        Some((InsertContext::ListItem, anchor_node)) => {
            INLINE_TAGS.contains(&tag) || (tag == "img" && anchor_node.tag_name() == Some("img"))
        }
        _ => false,
    }
}
