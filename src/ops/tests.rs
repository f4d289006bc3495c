// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rstest::{fixture, rstest};

use super::Position;
use crate::context::NodesContext;
use crate::model::fixtures::{element, hero_template, load_data, nid, story_context, story_fragment};
use crate::model::{
    FlatNode, ImpressionNode, Node, NodeId, NodeKind, NodeType, PaneNode, TemplateNode,
};
use crate::notify::{Notification, NotifyCause, Subscription};

#[fixture]
fn ctx() -> NodesContext {
    story_context()
}

type Log = Rc<RefCell<Vec<Notification>>>;

/// Records every notification delivered to `ids`.
fn record(ctx: &NodesContext, ids: &[&str]) -> (Log, Vec<Subscription>) {
    let log = Log::default();
    let subs = ids
        .iter()
        .map(|id| {
            let log = Rc::clone(&log);
            ctx.subscribe(&nid(id), move |n| log.borrow_mut().push(n.clone()))
        })
        .collect();
    (log, subs)
}

fn seen(log: &Log) -> Vec<(String, NotifyCause)> {
    log.borrow().iter().map(|n| (n.node_id.to_string(), n.cause)).collect()
}

fn children(ctx: &NodesContext, parent: &str) -> Vec<String> {
    ctx.get_child_node_ids(&nid(parent)).iter().map(ToString::to_string).collect()
}

fn pane_ids(ctx: &NodesContext, sf: &str) -> Vec<String> {
    ctx.with_node(&nid(sf), |node| {
        node.as_story_fragment()
            .map(|sf| sf.pane_ids.iter().map(ToString::to_string).collect::<Vec<_>>())
            .unwrap_or_default()
    })
    .unwrap_or_default()
}

fn is_dirty(ctx: &NodesContext, id: &str) -> bool {
    ctx.with_node(&nid(id), Node::is_changed).unwrap_or(false)
}

fn dirty_ids(ctx: &NodesContext) -> Vec<String> {
    ctx.get_dirty_nodes().iter().map(|node| node.id().to_string()).collect()
}

/// Every stored node is listed by its parent.
fn assert_parent_child_consistent(ctx: &NodesContext) {
    let store = ctx.store();
    for node in store.iter() {
        let parent = node.parent_id().cloned().unwrap_or_else(NodeId::root);
        assert!(
            store.children(&parent).contains(node.id()),
            "{} missing from children of {parent}",
            node.id()
        );
    }
}

#[rstest]
fn move_pane_before_reorders_pane_ids(ctx: NodesContext) {
    let (log, _subs) = record(&ctx, &["sf1"]);
    assert!(ctx.move_node(&nid("p2"), Position::Before));
    assert_eq!(pane_ids(&ctx, "sf1"), ["p2", "p1"]);
    assert_eq!(seen(&log), [("sf1".to_owned(), NotifyCause::Children)]);
    assert!(is_dirty(&ctx, "sf1"));
    assert_parent_child_consistent(&ctx);
}

#[test]
fn template_pane_without_anchor_appends_to_empty_owner() {
    let ctx = NodesContext::default();
    ctx.build_nodes_tree_from_row_data_made_nodes(load_data(vec![story_fragment(
        "sf1",
        "home",
        &[],
    )]));

    let pane_id = ctx
        .add_template_pane(&nid("sf1"), &hero_template(), None, Position::After)
        .expect("pane");
    assert_eq!(pane_ids(&ctx, "sf1"), [pane_id.to_string()]);
    assert_eq!(ctx.len(), 1 + hero_template().node_count());
    assert!(is_dirty(&ctx, "sf1"));
    assert_parent_child_consistent(&ctx);
}

#[rstest]
fn delete_pane_removes_it_from_owner(ctx: NodesContext) {
    let (log, _subs) = record(&ctx, &["sf1", "p1", "md1"]);
    assert!(ctx.delete_node(&nid("p1")));

    assert_eq!(pane_ids(&ctx, "sf1"), ["p2"]);
    assert!(ctx.get_node(&nid("p1")).is_none());
    assert!(ctx.get_node(&nid("strong1")).is_none());
    assert_eq!(seen(&log), [("sf1".to_owned(), NotifyCause::Children)]);
    assert!(!ctx.delete_node(&nid("p1")));
    assert_parent_child_consistent(&ctx);
}

#[rstest]
fn failed_atomic_update_leaves_live_store_untouched(ctx: NodesContext) {
    let before = dirty_ids(&ctx);
    let len = ctx.len();
    let roots = Rc::new(Cell::new(0));
    let counter = Rc::clone(&roots);
    let _root = ctx.subscribe_root(move |_| counter.set(counter.get() + 1));
    let (log, _subs) = record(&ctx, &["sf1"]);

    let result = ctx.apply_atomic_update_sync(|scratch| {
        for _ in 0..3 {
            scratch
                .add_template_pane(&nid("sf1"), &hero_template(), None, Position::After)
                .ok_or("owner missing")?;
        }
        Err::<(), _>("fourth pane failed")
    });

    assert_eq!(result, Err("fourth pane failed"));
    assert_eq!(dirty_ids(&ctx), before);
    assert_eq!(ctx.len(), len);
    assert_eq!(pane_ids(&ctx, "sf1"), ["p1", "p2"]);
    assert_eq!(roots.get(), 0);
    assert!(log.borrow().is_empty());
}

#[rstest]
fn two_subscribers_each_see_one_notification_per_modify(ctx: NodesContext) {
    let first = Rc::new(Cell::new(0));
    let second = Rc::new(Cell::new(0));
    let (a, b) = (Rc::clone(&first), Rc::clone(&second));
    let _s1 = ctx.subscribe(&nid("h2a"), move |_| a.set(a.get() + 1));
    let _s2 = ctx.subscribe(&nid("h2a"), move |_| b.set(b.get() + 1));

    let h2 = ctx.get_node(&nid("h2a")).expect("h2a");
    assert_eq!(ctx.modify_nodes(vec![h2.clone(), h2]), 2);

    assert_eq!((first.get(), second.get()), (1, 1));
}

#[rstest]
fn modify_replaces_whole_record_and_marks_pane(ctx: NodesContext) {
    let mut para = ctx.get_node(&nid("para")).expect("para");
    if let NodeKind::TagElement(flat) = para.kind_mut() {
        flat.copy = Some("Rewritten".to_owned());
        flat.href = Some("/about".to_owned());
    }
    assert_eq!(ctx.modify_nodes(vec![para]), 1);

    let stored = ctx.get_node(&nid("para")).expect("para");
    let flat = stored.as_tag_element().expect("element");
    assert_eq!(flat.copy.as_deref(), Some("Rewritten"));
    assert_eq!(flat.href.as_deref(), Some("/about"));
    assert!(stored.is_changed());
    assert!(is_dirty(&ctx, "p1"));
    assert!(!is_dirty(&ctx, "md1"));
}

#[rstest]
fn modify_skips_missing_ids_and_type_changes(ctx: NodesContext) {
    let (log, _subs) = record(&ctx, &["h2a"]);
    let ghost = element("ghost", "md1", "p", None);
    let retyped = Node::new(nid("h2a"), Some(nid("md1")), NodeKind::Pane(PaneNode::default()));

    assert_eq!(ctx.modify_nodes(vec![ghost, retyped]), 0);
    assert!(ctx.get_node(&nid("ghost")).is_none());
    assert_eq!(ctx.node_type(&nid("h2a")), Some(NodeType::TagElement));
    assert!(log.borrow().is_empty());
    assert_eq!(ctx.dirty_count().get(), 0);
}

#[rstest]
fn modify_keeps_stored_parent(ctx: NodesContext) {
    let mut h2 = ctx.get_node(&nid("h2a")).expect("h2a");
    h2.set_parent_id(Some(nid("list")));
    ctx.modify_nodes(vec![h2]);
    assert_eq!(ctx.with_node(&nid("h2a"), |n| n.parent_id().cloned()), Some(Some(nid("md1"))));
    assert_eq!(children(&ctx, "md1"), ["h2a", "para", "list"]);
}

#[rstest]
#[case(&["p2", "p1"], &["p2", "p1"], NotifyCause::Children)]
#[case(&["p1"], &["p1", "p2"], NotifyCause::Content)]
#[case(&["p1", "p9"], &["p1", "p2"], NotifyCause::Content)]
fn modify_story_fragment_applies_pane_order(
    ctx: NodesContext,
    #[case] requested: &[&str],
    #[case] expected: &[&str],
    #[case] cause: NotifyCause,
) {
    let (log, _subs) = record(&ctx, &["sf1"]);
    let mut sf = ctx.get_node(&nid("sf1")).expect("sf1");
    if let NodeKind::StoryFragment(fragment) = sf.kind_mut() {
        fragment.pane_ids = requested.iter().map(|id| nid(id)).collect();
    }
    ctx.modify_nodes(vec![sf]);

    assert_eq!(pane_ids(&ctx, "sf1"), expected);
    assert_eq!(children(&ctx, "sf1"), expected);
    assert_eq!(seen(&log), [("sf1".to_owned(), cause)]);
}

#[rstest]
fn dirty_flags_survive_later_operations(ctx: NodesContext) {
    let h2 = ctx.get_node(&nid("h2a")).expect("h2a");
    ctx.modify_nodes(vec![h2]);

    let mut clean = ctx.get_node(&nid("h2a")).expect("h2a");
    clean.set_changed(false);
    ctx.modify_nodes(vec![clean]);
    ctx.move_node(&nid("li2"), Position::Before);
    ctx.delete_node(&nid("strong1"));

    assert!(is_dirty(&ctx, "h2a"));
    assert!(is_dirty(&ctx, "p1"));
    assert!(is_dirty(&ctx, "list"));
    assert!(is_dirty(&ctx, "para"));
}

#[rstest]
fn add_node_issues_fresh_ids(ctx: NodesContext) {
    let (log, _subs) = record(&ctx, &["md1"]);
    let first = ctx
        .add_node(Some(&nid("md1")), NodeKind::TagElement(FlatNode::new("p")))
        .expect("first");
    assert!(ctx.delete_node(&first));
    let second = ctx
        .add_node(Some(&nid("md1")), NodeKind::TagElement(FlatNode::new("p")))
        .expect("second");

    assert_ne!(first, second);
    assert_eq!(children(&ctx, "md1"), ["h2a", "para", "list", second.as_str()]);
    assert!(is_dirty(&ctx, &second.to_string()));
    assert!(is_dirty(&ctx, "p1"));
    assert_eq!(log.borrow().len(), 3);
    assert!(log.borrow().iter().all(|n| n.cause == NotifyCause::Children));
}

#[rstest]
fn add_node_needs_an_existing_parent(ctx: NodesContext) {
    let len = ctx.len();
    assert_eq!(ctx.add_node(Some(&nid("ghost")), NodeKind::TagElement(FlatNode::new("p"))), None);
    assert_eq!(ctx.len(), len);

    let top = ctx.add_node(None, NodeKind::Impression(ImpressionNode::default())).expect("top");
    assert!(ctx.get_child_node_ids(&NodeId::root()).contains(&top));
}

#[rstest]
fn add_nodes_skips_deleted_ids(ctx: NodesContext) {
    ctx.delete_node(&nid("li2"));
    let stored = ctx.add_nodes(vec![
        element("li2", "list", "li", Some("back")),
        element("li3", "list", "li", Some("three")),
    ]);
    assert_eq!(stored, 1);
    assert_eq!(children(&ctx, "list"), ["li1", "li3"]);
}

#[rstest]
fn add_nodes_overwrite_keeps_dirty_flag(ctx: NodesContext) {
    let para = ctx.get_node(&nid("para")).expect("para");
    assert_eq!(ctx.modify_nodes(vec![para.clone()]), 1);
    assert!(is_dirty(&ctx, "para"));

    assert!(!para.is_changed());
    assert_eq!(ctx.add_nodes(vec![para]), 1);
    assert!(is_dirty(&ctx, "para"));
    assert!(dirty_ids(&ctx).contains(&"para".to_owned()));
}

#[rstest]
fn add_nodes_rejects_missing_parents(ctx: NodesContext) {
    let stored = ctx.add_nodes(vec![
        element("orphan", "ghost", "p", Some("lost")),
        element("late-child", "late-parent", "strong", Some("b")),
        element("late-parent", "md1", "p", Some("later")),
    ]);

    assert_eq!(stored, 2);
    assert!(ctx.get_node(&nid("orphan")).is_none());
    assert_eq!(children(&ctx, "late-parent"), ["late-child"]);
    assert!(ctx.store().dangling_nodes().is_empty());
    assert_parent_child_consistent(&ctx);
}

#[rstest]
fn move_at_boundary_is_a_notified_noop(ctx: NodesContext) {
    let (log, _subs) = record(&ctx, &["list"]);
    assert!(!ctx.move_node(&nid("li1"), Position::Before));
    assert!(!ctx.move_node(&nid("li2"), Position::After));

    assert_eq!(children(&ctx, "list"), ["li1", "li2"]);
    assert_eq!(log.borrow().len(), 2);
    assert_eq!(ctx.dirty_count().get(), 0);
    assert!(!ctx.move_node(&nid("ghost"), Position::After));
}

#[rstest]
fn link_moves_child_and_notifies_each_side_once(ctx: NodesContext) {
    let (log, _subs) = record(&ctx, &["para", "h2a", "strong1"]);
    assert!(ctx.link_child_to_parent(&nid("strong1"), &nid("h2a"), Some(0)));

    assert_eq!(children(&ctx, "h2a"), ["strong1"]);
    assert!(children(&ctx, "para").is_empty());
    let mut seen = seen(&log);
    seen.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        seen,
        [
            ("h2a".to_owned(), NotifyCause::Children),
            ("para".to_owned(), NotifyCause::Children),
            ("strong1".to_owned(), NotifyCause::Content),
        ]
    );
    assert_parent_child_consistent(&ctx);
}

#[rstest]
fn link_rejects_cycles_and_missing_nodes(ctx: NodesContext) {
    assert!(!ctx.link_child_to_parent(&nid("md1"), &nid("strong1"), None));
    assert!(!ctx.link_child_to_parent(&nid("ghost"), &nid("md1"), None));
    assert!(!ctx.link_child_to_parent(&nid("h2a"), &nid("ghost"), None));
    assert_eq!(ctx.dirty_count().get(), 0);
}

#[rstest]
fn notifications_stay_scoped(ctx: NodesContext) {
    let (log, _subs) = record(&ctx, &["p2", "bg1"]);
    let h2 = ctx.get_node(&nid("h2a")).expect("h2a");
    ctx.modify_nodes(vec![h2]);
    ctx.move_node(&nid("li2"), Position::Before);
    assert!(log.borrow().is_empty());
}

#[rstest]
#[case(Some("p1"), Position::Before, 0)]
#[case(Some("p1"), Position::After, 1)]
#[case(Some("p2"), Position::After, 2)]
#[case(Some("gone"), Position::Before, 2)]
#[case(None, Position::Before, 2)]
fn template_pane_lands_next_to_anchor(
    ctx: NodesContext,
    #[case] anchor: Option<&str>,
    #[case] position: Position,
    #[case] index: usize,
) {
    let anchor = anchor.map(nid);
    let pane_id = ctx
        .add_template_pane(&nid("sf1"), &hero_template(), anchor.as_ref(), position)
        .expect("pane");

    let panes = pane_ids(&ctx, "sf1");
    assert_eq!(panes.len(), 3);
    assert_eq!(panes[index], pane_id.to_string());
    assert_eq!(ctx.get_node_slug(&pane_id).as_deref(), Some("hero-2"));
    assert_parent_child_consistent(&ctx);
}

#[rstest]
fn template_pane_gets_fresh_ids_and_dirty_content(ctx: NodesContext) {
    let pane_id = ctx
        .add_template_pane(&nid("sf1"), &hero_template(), None, Position::After)
        .expect("pane");
    let again = ctx
        .add_template_pane(&nid("sf1"), &hero_template(), None, Position::After)
        .expect("pane");

    assert_ne!(pane_id, again);
    assert_eq!(ctx.get_node_slug(&again).as_deref(), Some("hero-3"));
    let subtree = ctx.store().descendants(&pane_id);
    assert_eq!(subtree.len(), hero_template().node_count() - 1);
    assert!(subtree.iter().all(|id| ctx.with_node(id, Node::is_changed) == Some(true)));
    let markdown = &subtree[0];
    let tags = ctx
        .get_child_node_ids(markdown)
        .iter()
        .filter_map(|id| ctx.with_node(id, |n| n.tag_name().map(ToOwned::to_owned)).flatten())
        .collect::<Vec<_>>();
    assert_eq!(tags, ["h2", "p"]);
}

#[rstest]
fn template_pane_needs_a_story_fragment_owner(ctx: NodesContext) {
    let (log, _subs) = record(&ctx, &["p1"]);
    let len = ctx.len();
    assert_eq!(ctx.add_template_pane(&nid("p1"), &hero_template(), None, Position::After), None);
    assert_eq!(ctx.add_template_pane(&nid("zz"), &hero_template(), None, Position::After), None);
    assert_eq!(ctx.len(), len);
    assert!(log.borrow().is_empty());
}

#[rstest]
fn context_pane_is_flagged_and_owned_by_root(ctx: NodesContext) {
    let roots = Rc::new(Cell::new(0));
    let counter = Rc::clone(&roots);
    let _root = ctx.subscribe_root(move |_| counter.set(counter.get() + 1));

    let pane_id = ctx.add_context_template_pane(&NodeId::root(), &hero_template()).expect("pane");
    let node = ctx.get_node(&pane_id).expect("pane node");
    assert_eq!(node.parent_id(), None);
    assert!(node.as_pane().is_some_and(|pane| pane.is_context_pane));
    assert_eq!(roots.get(), 1);

    assert_eq!(ctx.add_context_template_pane(&nid("sf1"), &hero_template()), None);
    assert_eq!(ctx.add_context_template_pane(&nid("ghost"), &hero_template()), None);
}

#[rstest]
fn impression_attaches_once_per_pane(ctx: NodesContext) {
    let template = ImpressionNode { title: "Join".to_owned(), ..ImpressionNode::default() };
    let id = ctx.add_template_impression_node(&nid("p1"), &template).expect("impression");

    assert_eq!(ctx.get_closest_node_type_from_id(&id, NodeType::Pane), Some(nid("p1")));
    assert_eq!(ctx.add_template_impression_node(&nid("p1"), &template), None);
    assert_eq!(ctx.add_template_impression_node(&nid("md1"), &template), None);
    assert!(ctx.add_template_impression_node(&nid("p2"), &template).is_some());
}

#[rstest]
fn insert_template_node_beside_block(ctx: NodesContext) {
    let template = TemplateNode::with_children(
        FlatNode::new("p"),
        vec![TemplateNode::leaf(FlatNode::new("em").with_copy("hi"))],
    );
    let id = ctx.insert_template_node(&nid("h2a"), &template, Position::After).expect("p");

    let md = children(&ctx, "md1");
    assert_eq!(md, ["h2a", id.as_str(), "para", "list"]);
    assert_eq!(ctx.get_child_node_ids(&id).len(), 1);
    assert!(is_dirty(&ctx, "md1"));
    assert!(is_dirty(&ctx, "p1"));
}

#[rstest]
fn insert_template_node_in_lists(ctx: NodesContext) {
    let li = TemplateNode::leaf(FlatNode::new("li").with_copy("zero"));
    let id = ctx.insert_template_node(&nid("li1"), &li, Position::Before).expect("li");
    assert_eq!(children(&ctx, "list"), [id.as_str(), "li1", "li2"]);

    let len = ctx.len();
    assert_eq!(ctx.insert_template_node(&nid("h2a"), &li, Position::After), None);
    let heading = TemplateNode::leaf(FlatNode::new("h3"));
    assert_eq!(ctx.insert_template_node(&nid("strong1"), &heading, Position::After), None);
    assert_eq!(ctx.len(), len);
}

#[tokio::test]
async fn atomic_update_merges_once_and_keeps_live_edits() {
    let ctx = story_context();
    let roots = Rc::new(Cell::new(0));
    let counter = Rc::clone(&roots);
    let _root = ctx.subscribe_root(move |_| counter.set(counter.get() + 1));
    let (log, _subs) = record(&ctx, &["sf1"]);
    let live = &ctx;

    let pane_id = ctx
        .apply_atomic_update(|scratch| async move {
            let id = scratch
                .add_template_pane(&nid("sf1"), &hero_template(), None, Position::After)
                .ok_or("owner missing")?;
            tokio::task::yield_now().await;

            let mut h2 = live.get_node(&nid("h2a")).ok_or("h2a missing")?;
            if let NodeKind::TagElement(flat) = h2.kind_mut() {
                flat.copy = Some("Typed meanwhile".to_owned());
            }
            live.modify_nodes(vec![h2]);
            assert!(live.get_node(&id).is_none());
            Ok::<_, &str>(id)
        })
        .await
        .expect("atomic update");

    assert_eq!(roots.get(), 1);
    assert!(log.borrow().is_empty());
    assert_eq!(pane_ids(&ctx, "sf1"), ["p1", "p2", pane_id.as_str()]);
    let copy = ctx.with_node(&nid("h2a"), |n| n.as_tag_element().and_then(|f| f.copy.clone()));
    assert_eq!(copy.flatten().as_deref(), Some("Typed meanwhile"));
    assert!(is_dirty(&ctx, "h2a"));
    assert!(is_dirty(&ctx, pane_id.as_str()));
    assert_parent_child_consistent(&ctx);
}

#[tokio::test]
async fn atomic_update_error_propagates() {
    let ctx = story_context();
    let result = ctx
        .apply_atomic_update(|scratch| async move {
            scratch.delete_node(&nid("p1"));
            tokio::task::yield_now().await;
            Err::<(), _>(String::from("generation failed"))
        })
        .await;

    assert_eq!(result, Err("generation failed".to_owned()));
    assert!(ctx.get_node(&nid("p1")).is_some());
    assert!(ctx.get_dirty_nodes().is_empty());
}
