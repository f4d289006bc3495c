// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::content::{
    BgImageNode, BgPaneNode, FlatNode, MarkdownNode, PaneNode, StoryFragmentNode,
};
use super::ids::NodeId;
use super::node::{Node, NodeKind};
use super::template::{TemplateFragment, TemplateNode, TemplatePane};
use super::viewport::{ClassMap, ViewportClasses};

pub(crate) fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

pub(crate) fn class_map(pairs: &[(&str, &str)]) -> ClassMap {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

pub(crate) fn story_fragment(id: &str, slug: &str, pane_ids: &[&str]) -> Node {
    Node::new(
        nid(id),
        None,
        NodeKind::StoryFragment(StoryFragmentNode {
            title: slug.to_uppercase(),
            slug: slug.to_owned(),
            pane_ids: pane_ids.iter().map(|id| nid(id)).collect(),
            ..StoryFragmentNode::default()
        }),
    )
}

pub(crate) fn pane(id: &str, parent: &str, slug: &str) -> Node {
    Node::new(
        nid(id),
        Some(nid(parent)),
        NodeKind::Pane(PaneNode {
            title: slug.to_owned(),
            slug: slug.to_owned(),
            ..PaneNode::default()
        }),
    )
}

pub(crate) fn markdown(id: &str, parent: &str) -> Node {
    let mut default_classes = BTreeMap::new();
    default_classes.insert(
        "h2".to_owned(),
        ViewportClasses {
            mobile: class_map(&[("text", "2xl"), ("font", "bold")]),
            tablet: ClassMap::new(),
            desktop: class_map(&[("text", "5xl")]),
        },
    );
    default_classes.insert(
        "p".to_owned(),
        ViewportClasses {
            mobile: class_map(&[("text", "base")]),
            tablet: class_map(&[("text", "lg")]),
            desktop: ClassMap::new(),
        },
    );
    Node::new(
        nid(id),
        Some(nid(parent)),
        NodeKind::Markdown(MarkdownNode {
            markdown_id: Some(format!("{id}-md")),
            default_classes,
            parent_classes: vec![ViewportClasses {
                mobile: class_map(&[("px", "4")]),
                tablet: class_map(&[("px", "8")]),
                desktop: class_map(&[("px", "12")]),
            }],
            ..MarkdownNode::default()
        }),
    )
}

pub(crate) fn element(id: &str, parent: &str, tag: &str, copy: Option<&str>) -> Node {
    let mut flat = FlatNode::new(tag);
    flat.copy = copy.map(ToOwned::to_owned);
    Node::new(nid(id), Some(nid(parent)), NodeKind::TagElement(flat))
}

pub(crate) fn bg_image(id: &str, parent: &str) -> Node {
    Node::new(
        nid(id),
        Some(nid(parent)),
        NodeKind::BgPane(BgPaneNode::BackgroundImage(BgImageNode {
            src: "/media/bg.webp".to_owned(),
            hidden_viewport_mobile: true,
            ..BgImageNode::default()
        })),
    )
}

/// `sf1` -> [`p1` (markdown `md1`: h2, p > strong, ul > li, li), `p2` (bg `bg1`)].
pub(crate) fn small_story() -> Vec<Node> {
    vec![
        story_fragment("sf1", "home", &["p1", "p2"]),
        pane("p1", "sf1", "hero"),
        pane("p2", "sf1", "footer"),
        markdown("md1", "p1"),
        element("h2a", "md1", "h2", Some("Welcome")),
        element("para", "md1", "p", Some("Intro")),
        element("strong1", "para", "strong", Some("bold")),
        element("list", "md1", "ul", None),
        element("li1", "list", "li", Some("one")),
        element("li2", "list", "li", Some("two")),
        bg_image("bg1", "p2"),
    ]
}

pub(crate) fn hero_template() -> TemplatePane {
    TemplatePane {
        pane: PaneNode {
            title: "Hero".to_owned(),
            slug: "hero".to_owned(),
            bg_colour: Some("#ffffff".to_owned()),
            ..PaneNode::default()
        },
        fragments: vec![TemplateFragment::Markdown {
            markdown: MarkdownNode::default(),
            nodes: vec![
                TemplateNode::leaf(FlatNode::new("h2").with_copy("Title")),
                TemplateNode::with_children(
                    FlatNode::new("p"),
                    vec![TemplateNode::leaf(FlatNode::new("strong").with_copy("Body"))],
                ),
            ],
        }],
    }
}

/// Sorts `nodes` into the lists a backend snapshot would use.
pub(crate) fn load_data(nodes: Vec<Node>) -> crate::load::LoadData {
    use super::node::NodeType;

    let mut data = crate::load::LoadData::default();
    for node in nodes {
        let list = match node.node_type() {
            NodeType::StoryFragment => &mut data.storyfragment_nodes,
            NodeType::Pane => &mut data.pane_nodes,
            NodeType::Markdown | NodeType::BgPane => &mut data.pane_fragment_nodes,
            NodeType::TagElement => &mut data.flat_nodes,
            NodeType::Impression => &mut data.impression_nodes,
            NodeType::File => &mut data.file_nodes,
            NodeType::Menu => &mut data.menu_nodes,
            NodeType::Belief => &mut data.belief_nodes,
        };
        list.push(node);
    }
    data
}

/// Context hydrated from [`small_story`].
pub(crate) fn story_context() -> crate::context::NodesContext {
    let ctx = crate::context::NodesContext::default();
    ctx.build_nodes_tree_from_row_data_made_nodes(load_data(small_story()));
    ctx
}
