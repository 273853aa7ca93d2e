use outline_core::{NodeId, Outline, OutlineConfig, OutlineError, Position, HIDDEN_ROOT_ID};
use uuid::Uuid;

fn top_level(outline: &mut Outline, names: &[&str]) -> Vec<Position> {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let id = outline.create_node(*name, "");
            outline.insert_child(None, index, id).unwrap()
        })
        .collect()
}

fn child_headlines(outline: &Outline, parent: Option<&Position>) -> Vec<String> {
    let positions = match parent {
        Some(position) => outline.children(position).unwrap(),
        None => outline.top_level_positions(),
    };
    positions
        .iter()
        .map(|position| outline.headline(position).unwrap().to_string())
        .collect()
}

fn snapshot(outline: &Outline) -> Vec<(Vec<usize>, NodeId)> {
    outline
        .all_positions()
        .map(|position| (position.path(), position.node()))
        .collect()
}

#[test]
fn insert_then_remove_restores_children() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["A"]);
    let a = &tops[0];
    for name in ["x", "y"] {
        let id = outline.create_node(name, "");
        let len = outline.children(a).unwrap().len();
        outline.insert_child(Some(a), len, id).unwrap();
    }
    let before = outline.get(a.node()).unwrap().children().to_vec();

    let extra = outline.create_node("extra", "");
    let inserted = outline.insert_child(Some(a), 1, extra).unwrap();
    assert_eq!(inserted.path(), vec![0, 1]);
    assert_eq!(child_headlines(&outline, Some(a)), vec!["x", "extra", "y"]);

    assert_eq!(outline.remove_child(Some(a), 1).unwrap(), extra);
    assert_eq!(outline.get(a.node()).unwrap().children(), before.as_slice());
    outline.check_outline().unwrap();
}

#[test]
fn insert_index_past_end_is_not_found() {
    let mut outline = Outline::new();
    let id = outline.create_node("A", "");
    let error = outline.insert_child(None, 1, id).unwrap_err();

    assert_eq!(
        error,
        OutlineError::ChildIndexOutOfRange {
            parent: HIDDEN_ROOT_ID,
            index: 1,
            len: 0
        }
    );
    assert!(error.is_not_found());
    assert_eq!(outline.registry().attachment_count(id), 0);
}

#[test]
fn insert_unknown_node_is_not_found() {
    let mut outline = Outline::new();
    let ghost = Uuid::new_v4();
    assert_eq!(
        outline.insert_child(None, 0, ghost).unwrap_err(),
        OutlineError::NodeNotFound(ghost)
    );
}

#[test]
fn hidden_root_cannot_be_attached() {
    let mut outline = Outline::new();
    assert_eq!(
        outline.insert_child(None, 0, HIDDEN_ROOT_ID).unwrap_err(),
        OutlineError::HiddenRoot
    );
}

#[test]
fn remove_past_end_is_not_found() {
    let mut outline = Outline::new();
    top_level(&mut outline, &["A"]);
    let error = outline.remove_child(None, 1).unwrap_err();
    assert!(error.is_not_found());
}

#[test]
fn remove_last_attachment_drops_node_and_orphaned_descendants() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["A", "B"]);
    let child = outline.insert_as_last_child(&tops[0]).unwrap();
    let grandchild = outline.insert_as_last_child(&child).unwrap();

    let removed = outline.remove_child(None, 0).unwrap();

    assert_eq!(removed, tops[0].node());
    assert!(!outline.store().contains(tops[0].node()));
    assert!(!outline.store().contains(child.node()));
    assert!(!outline.store().contains(grandchild.node()));
    assert_eq!(outline.store().len(), 1);
    assert_eq!(child_headlines(&outline, None), vec!["B"]);
    outline.check_outline().unwrap();
}

#[test]
fn remove_keeps_descendants_attached_elsewhere() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["A", "B"]);
    let shared = outline.insert_as_last_child(&tops[0]).unwrap();
    outline
        .insert_child(Some(&tops[1]), 0, shared.node())
        .unwrap();

    outline.remove_child(None, 0).unwrap();

    assert!(outline.store().contains(shared.node()));
    assert!(!outline.is_cloned(shared.node()));
    assert_eq!(outline.positions_of(shared.node()).len(), 1);
    outline.check_outline().unwrap();
}

#[test]
fn move_into_own_descendant_is_rejected_without_change() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["A"]);
    let child = outline.insert_as_last_child(&tops[0]).unwrap();
    let grandchild = outline.insert_as_last_child(&child).unwrap();
    let before = snapshot(&outline);

    for target in [&child, &grandchild, &tops[0]] {
        let error = outline.move_subtree(&tops[0], Some(target), 0).unwrap_err();
        assert!(matches!(error, OutlineError::CycleDetected { node, .. } if node == tops[0].node()));
    }
    assert_eq!(snapshot(&outline), before);
}

#[test]
fn move_under_clone_path_is_rejected() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["B", "C"]);
    let d_under_b = outline.insert_as_last_child(&tops[0]).unwrap();
    outline
        .insert_child(Some(&tops[1]), 0, d_under_b.node())
        .unwrap();

    // D is inside C through its clone, even when reached through B.
    let error = outline.move_subtree(&tops[1], Some(&d_under_b), 0).unwrap_err();
    assert_eq!(
        error,
        OutlineError::CycleDetected {
            node: tops[1].node(),
            parent: d_under_b.node()
        }
    );
}

#[test]
fn insert_under_own_descendant_is_rejected() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["A"]);
    let child = outline.insert_as_last_child(&tops[0]).unwrap();

    assert!(matches!(
        outline.insert_child(Some(&child), 0, tops[0].node()),
        Err(OutlineError::CycleDetected { .. })
    ));
    assert!(matches!(
        outline.insert_child(Some(&child), 0, child.node()),
        Err(OutlineError::CycleDetected { .. })
    ));
}

#[test]
fn move_within_parent_counts_index_after_unlink() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["X", "Y", "Z"]);

    let moved = outline.move_subtree(&tops[0], None, 2).unwrap();

    assert_eq!(moved.path(), vec![2]);
    assert_eq!(child_headlines(&outline, None), vec!["Y", "Z", "X"]);
    assert!(matches!(
        outline.move_subtree(&moved, None, 3),
        Err(OutlineError::ChildIndexOutOfRange { len: 2, .. })
    ));
    outline.check_outline().unwrap();
}

#[test]
fn move_adjusts_destination_shifted_by_the_unlink() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["P", "Q"]);
    outline.insert_as_last_child(&tops[1]).unwrap();

    let moved = outline.move_subtree(&tops[0], Some(&tops[1]), 0).unwrap();

    assert_eq!(moved.path(), vec![0, 0]);
    assert_eq!(outline.headline(&moved).unwrap(), "P");
    assert_eq!(outline.parents(&moved).unwrap().len(), 1);
    outline.check_outline().unwrap();
}

#[test]
fn move_to_root_puts_node_first() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["A"]);
    let child = outline.insert_as_last_child(&tops[0]).unwrap();

    let moved = outline.move_to_root(&child).unwrap();

    assert_eq!(moved.path(), vec![0]);
    assert_eq!(child_headlines(&outline, None), vec!["newHeadline", "A"]);
    assert!(outline.children(&outline.position_from_path(&[1]).unwrap()).unwrap().is_empty());
}

#[test]
fn promote_turns_children_into_following_siblings() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["B", "C"]);
    for name in ["d1", "d2"] {
        let id = outline.create_node(name, "");
        let len = outline.children(&tops[0]).unwrap().len();
        outline.insert_child(Some(&tops[0]), len, id).unwrap();
    }

    assert_eq!(outline.promote(&tops[0]).unwrap(), 2);
    assert_eq!(child_headlines(&outline, None), vec!["B", "d1", "d2", "C"]);
    outline.check_outline().unwrap();
}

#[test]
fn demote_turns_following_siblings_into_children() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["B", "C", "E"]);

    assert_eq!(outline.demote(&tops[0]).unwrap(), 2);
    assert_eq!(child_headlines(&outline, None), vec!["B"]);
    assert_eq!(child_headlines(&outline, Some(&tops[0])), vec!["C", "E"]);
    outline.check_outline().unwrap();
}

#[test]
fn demote_rejects_clone_of_itself_as_follower() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["A"]);
    outline.clone_node(&tops[0]).unwrap();
    let before = snapshot(&outline);

    assert!(matches!(
        outline.demote(&tops[0]),
        Err(OutlineError::CycleDetected { .. })
    ));
    assert_eq!(snapshot(&outline), before);
}

#[test]
fn new_nodes_use_configured_headline() {
    let config = OutlineConfig {
        default_headline: "untitled".to_string(),
        ..OutlineConfig::default()
    };
    let mut outline = Outline::with_config(config);
    let first = outline.insert_new_child(None, 0).unwrap();
    let after = outline.insert_after(&first).unwrap();
    let before = outline.insert_before(&first).unwrap();

    assert_eq!(before.path(), vec![0]);
    assert_eq!(after.path(), vec![1]);
    assert_eq!(
        child_headlines(&outline, None),
        vec!["untitled", "untitled", "untitled"]
    );
}

#[test]
fn copy_tree_creates_independent_nodes() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["A"]);
    let child = outline.insert_as_last_child(&tops[0]).unwrap();
    outline.set_body(&child, "child body").unwrap();

    let copy = outline.copy_tree_after(&tops[0]).unwrap();
    let copied_child = outline.first_child(&copy).unwrap().unwrap();

    assert_ne!(copy.node(), tops[0].node());
    assert_ne!(copied_child.node(), child.node());
    assert_eq!(outline.body(&copied_child).unwrap(), "child body");
    assert!(!outline.is_cloned(child.node()));

    outline.set_body(&copied_child, "changed").unwrap();
    assert_eq!(outline.body(&child).unwrap(), "child body");
    outline.check_outline().unwrap();
}

#[test]
fn delete_all_children_empties_the_node() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["A"]);
    outline.insert_as_last_child(&tops[0]).unwrap();
    outline.insert_as_last_child(&tops[0]).unwrap();

    assert_eq!(outline.delete_all_children(&tops[0]).unwrap(), 2);
    assert!(outline.children(&tops[0]).unwrap().is_empty());
    assert_eq!(outline.store().len(), 1);
}

#[test]
fn position_after_deleted_tree_stays_valid() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["A", "B", "C"]);

    let after = outline
        .position_after_deleted_tree(&tops[0])
        .unwrap()
        .unwrap();
    outline.delete(&tops[0]).unwrap();

    assert!(outline.position_exists(&after));
    assert_eq!(outline.headline(&after).unwrap(), "B");
}

#[test]
fn detached_nodes_can_be_discarded_but_attached_cannot() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["A"]);
    let loose = outline.create_node("loose", "");

    assert_eq!(outline.discard_detached(loose).unwrap(), 1);
    assert!(!outline.store().contains(loose));
    assert_eq!(
        outline.discard_detached(tops[0].node()).unwrap_err(),
        OutlineError::NodeAttached(tops[0].node())
    );
}

#[test]
fn edits_set_changed_and_dirty_until_cleared() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["A"]);
    outline.clear_dirty();
    assert!(!outline.is_changed());

    outline.set_headline(&tops[0], "renamed").unwrap();
    outline.mark(&tops[0]).unwrap();
    outline.expand(&tops[0]).unwrap();

    let status = outline.node_at(&tops[0]).unwrap().status;
    assert!(outline.is_changed());
    assert!(status.dirty && status.marked && status.expanded);

    outline.clear_dirty();
    outline.unmark(&tops[0]).unwrap();
    outline.contract(&tops[0]).unwrap();
    let status = outline.node_at(&tops[0]).unwrap().status;
    assert!(!outline.is_changed());
    assert!(!status.dirty && !status.marked && !status.expanded);
}

#[test]
fn move_into_clone_of_source_parent_returns_live_position() {
    let mut outline = Outline::new();
    let tops = top_level(&mut outline, &["P", "Q"]);
    for name in ["x", "y", "z"] {
        let id = outline.create_node(name, "");
        let len = outline.children(&tops[0]).unwrap().len();
        outline.insert_child(Some(&tops[0]), len, id).unwrap();
    }
    let p_under_q = outline
        .insert_child(Some(&tops[1]), 0, tops[0].node())
        .unwrap();
    let x = outline.first_child(&tops[0]).unwrap().unwrap();
    let z_under_q = outline.last_child(&p_under_q).unwrap().unwrap();
    assert_eq!(z_under_q.path(), vec![1, 0, 2]);

    let moved = outline.move_subtree(&x, Some(&z_under_q), 0).unwrap();

    assert_eq!(moved.path(), vec![1, 0, 1, 0]);
    assert!(outline.position_exists(&moved));
    assert_eq!(outline.headline(&moved).unwrap(), "x");
    let parent = outline.parent(&moved).unwrap().unwrap();
    assert_eq!(outline.headline(&parent).unwrap(), "z");
    assert_eq!(child_headlines(&outline, Some(&tops[0])), vec!["y", "z"]);
    outline.check_outline().unwrap();
}

#[test]
fn detached_node_content_is_editable_by_id() {
    let mut outline = Outline::new();
    let loose = outline.create_node("draft", "");
    outline.clear_dirty();

    outline.set_node_headline(loose, "final").unwrap();
    outline.set_node_body(loose, "text").unwrap();

    let record = outline.get(loose).unwrap();
    assert_eq!(record.headline, "final");
    assert_eq!(record.body, "text");
    assert!(record.status.dirty);
    assert!(outline.is_changed());

    let ghost = Uuid::new_v4();
    assert_eq!(
        outline.set_node_body(ghost, "x").unwrap_err(),
        OutlineError::NodeNotFound(ghost)
    );
}

#[test]
fn hidden_root_is_not_exposed_by_id() {
    let mut outline = Outline::new();
    top_level(&mut outline, &["A"]);

    assert_eq!(
        outline.get(HIDDEN_ROOT_ID).unwrap_err(),
        OutlineError::NodeNotFound(HIDDEN_ROOT_ID)
    );
    assert!(outline
        .set_node_headline(HIDDEN_ROOT_ID, "root")
        .unwrap_err()
        .is_not_found());
}
