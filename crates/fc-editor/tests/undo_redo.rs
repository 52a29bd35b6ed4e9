//! Integration tests: snapshot history through the editor (fc-editor).
//!
//! Every structural change must be undoable, undo/redo must round-trip
//! exactly, and history must stay bounded.

use fc_core::{Diagram, EdgePreset, NodeId, NodeType, Position};
use fc_editor::changes::{Connection, NodeChange};
use fc_editor::properties::NodeField;
use fc_editor::{Editor, EditorConfig};
use pretty_assertions::assert_eq;

fn id(s: &str) -> NodeId {
    NodeId::intern(s)
}

/// Run `edit`, then check that undo restores the prior diagram and redo
/// restores the edited one.
fn assert_undoable(editor: &mut Editor, edit: impl FnOnce(&mut Editor)) {
    let before: Diagram = editor.diagram().clone();
    edit(editor);
    let after: Diagram = editor.diagram().clone();
    assert_ne!(before, after, "edit should change the diagram");

    assert!(editor.undo(), "undo should be available");
    assert_eq!(editor.diagram(), &before);
    assert!(editor.redo(), "redo should be available");
    assert_eq!(editor.diagram(), &after);
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn every_structural_change_is_undoable() {
    let mut editor = Editor::default();
    assert!(editor.load_template("simpleProcess"));

    assert_undoable(&mut editor, |ed| {
        ed.add_node(NodeType::Decision);
    });
    assert_undoable(&mut editor, |ed| {
        ed.connect(Connection {
            source: id("end"),
            target: id("start"),
        });
    });
    assert_undoable(&mut editor, |ed| {
        ed.click_node(id("error"));
        ed.delete_selected();
    });
    assert_undoable(&mut editor, |ed| {
        ed.update_node(id("input"), NodeField::Label("Collect".into()))
            .unwrap();
    });
    assert_undoable(&mut editor, |ed| {
        ed.apply_edge_preset(id("e-start-input"), EdgePreset::Dotted);
    });
    assert_undoable(&mut editor, |ed| {
        ed.apply_node_changes(&[NodeChange::Position {
            id: id("start"),
            position: Some(Position::new(0.0, 0.0)),
            dragging: false,
        }]);
    });
}

#[test]
fn undo_at_start_is_noop() {
    let mut editor = Editor::default();
    assert!(!editor.undo());
    assert!(!editor.redo());
    assert!(editor.diagram().is_empty());
}

#[test]
fn undo_all_then_redo_all() {
    let mut editor = Editor::default();
    let mut states = vec![editor.diagram().clone()];
    for _ in 0..4 {
        editor.add_node(NodeType::Process);
        states.push(editor.diagram().clone());
    }

    for expected in states.iter().rev().skip(1) {
        assert!(editor.undo());
        assert_eq!(editor.diagram(), expected);
    }
    assert!(!editor.can_undo());

    for expected in states.iter().skip(1) {
        assert!(editor.redo());
        assert_eq!(editor.diagram(), expected);
    }
    assert!(!editor.can_redo());
}

#[test]
fn new_change_discards_redo_tail() {
    let mut editor = Editor::default();
    editor.add_node(NodeType::Process);
    editor.add_node(NodeType::Process);
    editor.undo();
    assert!(editor.can_redo());

    editor.add_node(NodeType::Custom);
    assert!(!editor.can_redo());
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn undo_redo_do_not_record() {
    let mut editor = Editor::default();
    editor.add_node(NodeType::Process);
    editor.add_node(NodeType::Process);
    let len = editor.history().len();
    editor.undo();
    editor.redo();
    editor.undo();
    assert_eq!(editor.history().len(), len);
}

// ─── Selection across history ────────────────────────────────────────────

#[test]
fn redo_after_delete_clears_selection_of_removed_node() {
    let mut editor = Editor::default();
    editor.load_template("decisionTree");
    editor.click_node(id("wait"));
    editor.delete_selected();
    editor.undo();
    editor.click_node(id("wait"));
    editor.redo();
    assert!(editor.selection().is_empty());
    assert!(!editor.diagram().contains_node(id("wait")));
}

#[test]
fn surviving_selection_is_kept() {
    let mut editor = Editor::default();
    editor.load_template("decisionTree");
    editor.add_node(NodeType::Process);
    editor.click_node(id("ready"));
    editor.undo();
    assert_eq!(editor.selection().node(), Some(id("ready")));
}

// ─── Bounds & batching ───────────────────────────────────────────────────

#[test]
fn history_is_capped() {
    let config = EditorConfig {
        history_limit: 5,
        ..EditorConfig::default()
    };
    let mut editor = Editor::new(config);
    for _ in 0..12 {
        editor.add_node(NodeType::Process);
    }
    assert_eq!(editor.history().len(), 5);

    let mut undone = 0;
    while editor.undo() {
        undone += 1;
    }
    assert_eq!(undone, 4);
    assert_eq!(editor.diagram().nodes.len(), 8);
}

#[test]
fn undo_mid_drag_closes_gesture() {
    let mut editor = Editor::default();
    editor.load_template("decisionTree");
    let before = editor.diagram().clone();
    editor.apply_node_changes(&[NodeChange::Position {
        id: id("fix"),
        position: Some(Position::new(300.0, 300.0)),
        dragging: true,
    }]);
    assert!(editor.can_undo());

    assert!(editor.undo());
    assert_eq!(editor.diagram(), &before);
    assert!(editor.redo());
    assert_eq!(
        editor.diagram().node(id("fix")).unwrap().position,
        Position::new(300.0, 300.0)
    );
}

#[test]
fn drag_without_movement_records_nothing() {
    let mut editor = Editor::default();
    editor.load_template("decisionTree");
    let at = editor.diagram().node(id("deploy")).unwrap().position;
    editor.apply_node_changes(&[NodeChange::Position {
        id: id("deploy"),
        position: Some(at),
        dragging: true,
    }]);
    editor.apply_node_changes(&[NodeChange::Position {
        id: id("deploy"),
        position: None,
        dragging: false,
    }]);
    assert_eq!(editor.history().len(), 1);
    assert!(!editor.can_undo());
}

#[test]
fn drag_back_to_start_leaves_undo_disabled() {
    let mut editor = Editor::default();
    editor.load_template("decisionTree");
    let at = editor.diagram().node(id("deploy")).unwrap().position;
    for position in [at.offset(40.0, 0.0), at] {
        editor.apply_node_changes(&[NodeChange::Position {
            id: id("deploy"),
            position: Some(position),
            dragging: true,
        }]);
    }
    assert!(editor.history().in_batch());
    assert!(!editor.can_undo());
    assert!(!editor.undo());
}
