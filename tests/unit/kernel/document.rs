use super::*;
use crate::kernel::services::adapters::MemoryStore;
use crate::models::Node;

fn open(children: Vec<Node>) -> (Document<MemoryStore>, MemoryStore) {
    let store = MemoryStore::with_snapshot(Node::with_children("root", children));
    let doc = Document::open(store.clone()).unwrap();
    (doc, store)
}

fn leaves(texts: &[&str]) -> Vec<Node> {
    texts.iter().map(|t| Node::new(*t)).collect()
}

fn child_texts(doc: &Document<MemoryStore>, parent: NodeId) -> Vec<String> {
    let tree = doc.tree();
    tree.children(parent)
        .iter()
        .map(|&c| tree.text(c).unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_open_missing_document_creates_and_saves() {
    let store = MemoryStore::new();
    let doc = Document::open(store.clone()).unwrap();
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.snapshot(), Some(Node::default()));
    assert!(doc.tree().is_empty());
    assert!(!doc.can_undo());
}

#[test]
fn test_open_existing_document_does_not_save() {
    let (doc, store) = open(leaves(&["A"]));
    assert_eq!(store.save_count(), 0);
    assert_eq!(child_texts(&doc, doc.tree().root()), vec!["A"]);
}

#[test]
fn test_open_fails_when_initial_save_fails() {
    let store = MemoryStore::new();
    store.set_fail_saves(true);
    assert!(matches!(
        Document::open(store),
        Err(DocumentError::Snapshot(_))
    ));
}

#[test]
fn test_insert_into_empty_document_persists() {
    let store = MemoryStore::new();
    let mut doc = Document::open(store.clone()).unwrap();
    let root = doc.tree().root();

    let node = doc.insert_child(root, 0, None).unwrap().unwrap();
    assert_eq!(doc.focus(), Some(node));
    assert_eq!(doc.tree().child_count(root), 1);
    assert_eq!(store.save_count(), 2);

    let saved = store.snapshot().unwrap();
    assert_eq!(saved, doc.tree().to_node());
    assert_eq!(OutlineTree::from_node(&saved).to_node(), saved);
}

#[test]
fn test_delete_scenario_with_undo() {
    let (mut doc, store) = open(leaves(&["A", "B", "C"]));
    let root = doc.tree().root();
    let b = doc.tree().children(root)[1];
    let c = doc.tree().children(root)[2];

    assert_eq!(doc.delete(b, false, true).unwrap(), Some(c));
    assert_eq!(child_texts(&doc, root), vec!["A", "C"]);
    assert_eq!(doc.focus(), Some(c));

    assert_eq!(doc.undo().unwrap(), Some(b));
    assert_eq!(child_texts(&doc, root), vec!["A", "B", "C"]);
    assert_eq!(doc.focus(), Some(b));
    assert_eq!(store.save_count(), 2);
    assert_eq!(store.snapshot(), Some(doc.tree().to_node()));
}

#[test]
fn test_merge_root_scenario_with_undo() {
    let (mut doc, _store) = open(vec![Node::with_children("X", leaves(&["P", "Q"]))]);
    let root = doc.tree().root();
    let x = doc.tree().children(root)[0];

    assert!(doc.can_merge_root_up());
    assert_eq!(doc.merge_root_up().unwrap(), Some(root));
    assert_eq!(child_texts(&doc, root), vec!["P", "Q"]);
    assert_eq!(doc.tree().text(root), Some("X"));

    doc.undo().unwrap();
    assert_eq!(doc.tree().text(root), Some("root"));
    assert_eq!(doc.tree().children(root), &[x]);
    assert_eq!(child_texts(&doc, x), vec!["P", "Q"]);
}

#[test]
fn test_delete_root_dispatches_to_merge() {
    let (mut doc, _store) = open(vec![Node::with_children("X", leaves(&["P"]))]);
    let root = doc.tree().root();
    assert!(doc.can_delete(root, true));
    assert!(!doc.can_delete(root, false));
    assert_eq!(doc.delete(root, true, false).unwrap(), Some(root));
    assert_eq!(doc.tree().text(root), Some("X"));
}

#[test]
fn test_delete_root_unavailable_without_single_child() {
    let (mut doc, store) = open(leaves(&["A", "B"]));
    let root = doc.tree().root();
    assert!(!doc.can_delete(root, true));
    assert_eq!(doc.delete(root, true, true).unwrap(), None);
    assert_eq!(doc.delete(root, false, true).unwrap(), None);
    assert_eq!(doc.history().len(), 0);
    assert_eq!(store.save_count(), 0);

    let (mut empty, _) = open(Vec::new());
    let root = empty.tree().root();
    assert_eq!(empty.delete(root, true, true).unwrap(), None);
}

#[test]
fn test_redo_restores_state_and_focus() {
    let (mut doc, _store) = open(leaves(&["A", "B", "C"]));
    let root = doc.tree().root();
    let b = doc.tree().children(root)[1];

    doc.move_child(b, true).unwrap();
    let after = doc.tree().to_node();
    let focus = doc.focus();

    doc.undo().unwrap();
    assert_eq!(child_texts(&doc, root), vec!["A", "B", "C"]);
    doc.redo().unwrap();
    assert_eq!(doc.tree().to_node(), after);
    assert_eq!(doc.focus(), focus);
}

#[test]
fn test_undo_redo_noop_does_not_persist() {
    let (mut doc, store) = open(leaves(&["A"]));
    assert_eq!(doc.undo().unwrap(), None);
    assert_eq!(doc.redo().unwrap(), None);
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_commit_after_undo_truncates_history() {
    let (mut doc, _store) = open(leaves(&["A"]));
    let root = doc.tree().root();
    doc.new_child(root).unwrap();
    doc.new_child(root).unwrap();
    doc.new_child(root).unwrap();
    assert_eq!(doc.history().len(), 3);

    doc.undo().unwrap();
    doc.undo().unwrap();
    doc.new_child(root).unwrap();
    assert_eq!(doc.history().len(), 2);
    assert!(!doc.can_redo());
}

#[test]
fn test_truncated_history_releases_abandoned_nodes() {
    let (mut doc, _store) = open(leaves(&["A"]));
    let root = doc.tree().root();
    let a = doc.tree().children(root)[0];

    let inserted = doc.new_child(a).unwrap().unwrap();
    doc.promote_to_new_parent(a).unwrap();
    let mid = doc.tree().children(a)[0];
    doc.undo().unwrap();
    doc.undo().unwrap();
    assert!(doc.tree().contains(inserted));
    assert!(doc.tree().contains(mid));

    doc.set_text(a, "A2").unwrap();
    assert!(!doc.tree().contains(inserted));
    assert!(!doc.tree().contains(mid));
    assert!(doc.tree().contains(a));
    assert_eq!(
        doc.tree().to_node(),
        Node::with_children("root", vec![Node::new("A2")])
    );
}

#[test]
fn test_new_sibling_before_and_after() {
    let (mut doc, _store) = open(leaves(&["A", "B"]));
    let root = doc.tree().root();
    let a = doc.tree().children(root)[0];

    let after = doc.new_sibling(a, true).unwrap().unwrap();
    assert_eq!(doc.tree().index_of(root, after), Some(1));
    let before = doc.new_sibling(a, false).unwrap().unwrap();
    assert_eq!(doc.tree().index_of(root, before), Some(0));

    // undo 回到触发插入的节点
    assert_eq!(doc.undo().unwrap(), Some(a));
}

#[test]
fn test_new_sibling_of_root_appends_child() {
    let (mut doc, _store) = open(leaves(&["A"]));
    let root = doc.tree().root();
    let node = doc.new_sibling(root, true).unwrap().unwrap();
    assert_eq!(doc.tree().index_of(root, node), Some(1));
    assert_eq!(doc.undo().unwrap(), Some(root));
}

#[test]
fn test_move_child_availability() {
    let (mut doc, store) = open(leaves(&["A", "B"]));
    let root = doc.tree().root();
    let a = doc.tree().children(root)[0];
    assert!(!doc.can_move(a, false));
    assert!(doc.can_move(a, true));
    assert!(!doc.can_move(root, true));
    assert_eq!(doc.move_child(a, false).unwrap(), None);
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_move_inside_deleted_subtree_is_unavailable() {
    let (mut doc, store) = open(vec![Node::with_children("A", leaves(&["a1", "a2"]))]);
    let root = doc.tree().root();
    let a = doc.tree().children(root)[0];
    let a1 = doc.tree().children(a)[0];

    doc.delete(a, false, true).unwrap();
    assert_eq!(doc.history().len(), 1);
    assert_eq!(store.save_count(), 1);

    assert!(!doc.can_move(a1, true));
    assert_eq!(doc.move_child(a1, true).unwrap(), None);
    assert_eq!(doc.history().len(), 1);
    assert_eq!(store.save_count(), 1);
    assert_eq!(doc.focus(), Some(root));
}

#[test]
fn test_promote_and_undo() {
    let (mut doc, _store) = open(vec![Node::with_children("X", leaves(&["X1"]))]);
    let root = doc.tree().root();
    let x = doc.tree().children(root)[0];

    assert_eq!(doc.promote_to_new_parent(x).unwrap(), Some(x));
    assert_eq!(doc.tree().text(x), Some(""));
    let mid = doc.tree().children(x)[0];
    assert_eq!(doc.tree().text(mid), Some("X"));

    assert_eq!(doc.undo().unwrap(), Some(x));
    assert_eq!(doc.tree().text(x), Some("X"));
    assert_eq!(child_texts(&doc, x), vec!["X1"]);
}

#[test]
fn test_set_text_skips_unchanged() {
    let (mut doc, store) = open(leaves(&["A"]));
    let a = doc.tree().children(doc.tree().root())[0];
    assert_eq!(doc.set_text(a, "A").unwrap(), None);
    assert_eq!(store.save_count(), 0);
    assert_eq!(doc.set_text(a, "B").unwrap(), Some(a));
    assert_eq!(doc.tree().text(a), Some("B"));
    doc.undo().unwrap();
    assert_eq!(doc.tree().text(a), Some("A"));
}

#[test]
fn test_edit_session_commits_only_changes() {
    let (mut doc, store) = open(leaves(&["A"]));
    let a = doc.tree().children(doc.tree().root())[0];

    assert!(doc.begin_edit(a).unwrap());
    doc.update_draft("draft");
    // 草稿不写入树
    assert_eq!(doc.tree().text(a), Some("A"));
    assert_eq!(doc.draft(), Some("draft"));
    doc.update_draft("A");
    assert_eq!(doc.finish_edit().unwrap(), None);
    assert_eq!(doc.history().len(), 0);
    assert_eq!(store.save_count(), 0);

    doc.begin_edit(a).unwrap();
    doc.update_draft("Alpha");
    assert_eq!(doc.finish_edit().unwrap(), Some(a));
    assert_eq!(doc.tree().text(a), Some("Alpha"));
    assert_eq!(doc.editing_node(), None);
    assert_eq!(doc.history().len(), 1);
}

#[test]
fn test_undo_finishes_open_edit_first() {
    let (mut doc, _store) = open(leaves(&["A"]));
    let a = doc.tree().children(doc.tree().root())[0];
    doc.begin_edit(a).unwrap();
    doc.update_draft("changed");

    assert_eq!(doc.undo().unwrap(), Some(a));
    assert_eq!(doc.tree().text(a), Some("A"));
    assert_eq!(doc.redo().unwrap(), Some(a));
    assert_eq!(doc.tree().text(a), Some("changed"));
}

#[test]
fn test_cancel_edit_discards_draft() {
    let (mut doc, _store) = open(leaves(&["A"]));
    let a = doc.tree().children(doc.tree().root())[0];
    doc.begin_edit(a).unwrap();
    doc.update_draft("lost");
    doc.cancel_edit();
    assert_eq!(doc.finish_edit().unwrap(), None);
    assert_eq!(doc.tree().text(a), Some("A"));
}

#[test]
fn test_persist_failure_is_reported() {
    let (mut doc, store) = open(leaves(&["A"]));
    let root = doc.tree().root();
    store.set_fail_saves(true);
    let err = doc.new_child(root).unwrap_err();
    assert!(err.to_string().contains("Persist document failed"));
}

#[test]
fn test_focus_navigation_is_not_logged() {
    let (mut doc, store) = open(vec![
        Node::with_children("A", leaves(&["A1", "A2", "A3"])),
        Node::new("B"),
    ]);
    let root = doc.tree().root();
    let a = doc.tree().children(root)[0];
    let a2 = doc.tree().children(a)[1];
    let b = doc.tree().children(root)[1];

    assert_eq!(doc.focus_child(a), Some(a2));
    assert_eq!(doc.focus_parent(a2), Some(a));
    assert_eq!(doc.focus_next(a, true), Some(b));
    assert_eq!(doc.focus(), Some(b));
    assert_eq!(doc.focus_parent(root), None);

    assert!(doc.toggle_collapsed(a));
    assert_eq!(doc.focus_child(a), None);
    assert_eq!(doc.history().len(), 0);
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_replaying_history_reproduces_tree() {
    let store = MemoryStore::new();
    let mut doc = Document::open(store).unwrap();
    let root = doc.tree().root();
    let a = doc.new_child(root).unwrap().unwrap();
    doc.set_text(a, "A").unwrap();
    let b = doc.new_sibling(a, true).unwrap().unwrap();
    doc.set_text(b, "B").unwrap();
    doc.promote_to_new_parent(b).unwrap();
    doc.move_child(b, false).unwrap();
    doc.undo().unwrap();

    let cursor = doc.history().cursor();
    let expected = doc.tree().to_node();
    while doc.undo().unwrap().is_some() {}
    assert_eq!(doc.tree().to_node(), Node::default());

    for _ in 0..cursor {
        doc.redo().unwrap();
    }
    assert_eq!(doc.tree().to_node(), expected);
}
