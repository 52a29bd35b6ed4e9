//! The editor store.
//!
//! `Editor` is the single owner of the diagram and of all UI state around
//! it: history, selection, clipboard, configuration, and pending notices.
//! Every structural change goes through `commit`, which keeps the
//! selection pointing at live entities and appends a history entry. Undo and
//! redo restore snapshots directly and never commit.

use crate::changes::{Connection, EdgeChange, NodeChange};
use crate::config::EditorConfig;
use crate::history::History;
use crate::notice::Notice;
use crate::properties::{EdgeField, NodeField, PanelView, PropertyError};
use crate::selection::{Clipboard, Selection};
use crate::shortcuts::ShortcutAction;
use chrono::{DateTime, Utc};
use fc_core::image::{encode_data_uri, is_image_data_uri};
use fc_core::{
    Diagram, DiagramError, Edge, EdgePreset, ExportDocument, ExportFile, Node, NodeId, NodeKind,
    NodeType, Position, load_template, parse_document,
};

pub struct Editor {
    diagram: Diagram,
    history: History,
    selection: Selection,
    clipboard: Clipboard,
    config: EditorConfig,
    /// Notices waiting for the host to display them.
    notices: Vec<Notice>,
    /// Canvas gesture that opened the current history batch.
    gesture: Option<Gesture>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Drag,
    Resize,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// An editor over an empty diagram.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_diagram(config, Diagram::new())
    }

    /// An editor whose history starts at `diagram`.
    pub fn with_diagram(config: EditorConfig, diagram: Diagram) -> Self {
        let history = History::new(&diagram, config.history_limit);
        Self {
            diagram,
            history,
            selection: Selection::None,
            clipboard: Clipboard::default(),
            config,
            notices: Vec::new(),
            gesture: None,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo(&self.diagram)
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn can_delete(&self) -> bool {
        !self.selection.is_empty()
    }

    pub fn can_copy(&self) -> bool {
        self.selection.node().is_some()
    }

    pub fn can_paste(&self) -> bool {
        !self.clipboard.is_empty()
    }

    /// The properties panel is open exactly while something is selected.
    pub fn panel_visible(&self) -> bool {
        !self.selection.is_empty()
    }

    pub fn panel_view(&self) -> Option<PanelView> {
        PanelView::of(self.selection, &self.diagram)
    }

    /// Hand pending notices to the host.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ─── Adding nodes and edges ──────────────────────────────────────────

    /// Add a toolbar node of `node_type` at the default insert position.
    pub fn add_node(&mut self, node_type: NodeType) -> Option<NodeId> {
        self.add_node_at(node_type, self.config.default_position)
    }

    pub fn add_node_at(&mut self, node_type: NodeType, position: Position) -> Option<NodeId> {
        let id = self.diagram.fresh_id("node");
        self.insert_node(Node::with_defaults(id, node_type, position))
    }

    /// Embed an uploaded file as an image node. Content that is not a
    /// recognizable image is dropped with a log line and no notice.
    pub fn import_image(&mut self, file_name: &str, bytes: &[u8]) -> Option<NodeId> {
        match encode_data_uri(bytes) {
            Ok(uri) => self.add_image_node(file_name, uri),
            Err(e) => {
                log::warn!("image `{file_name}` dropped: {e}");
                None
            }
        }
    }

    /// Like [`import_image`](Self::import_image) for a file the host has
    /// already read as a data URI.
    pub fn import_image_uri(&mut self, file_name: &str, uri: &str) -> Option<NodeId> {
        if !is_image_data_uri(uri) {
            log::warn!("image `{file_name}` dropped: not an image data URI");
            return None;
        }
        self.add_image_node(file_name, uri.to_string())
    }

    fn add_image_node(&mut self, file_name: &str, image_url: String) -> Option<NodeId> {
        let id = self.diagram.fresh_id("image");
        let node = Node::new(
            id,
            NodeKind::Image { image_url },
            self.config.default_position,
            file_name,
        );
        self.insert_node(node)
    }

    fn insert_node(&mut self, node: Node) -> Option<NodeId> {
        let id = node.id;
        match self.diagram.add_node(node) {
            Ok(()) => {
                self.commit();
                Some(id)
            }
            Err(e) => {
                log::warn!("node not added: {e}");
                None
            }
        }
    }

    /// Add the edge the user drew. Repeated connections and connections to
    /// unknown nodes are ignored.
    pub fn connect(&mut self, connection: Connection) -> Option<NodeId> {
        let Connection { source, target } = connection;
        let mut id = NodeId::intern(&format!("e{source}-{target}"));
        if self.diagram.contains_id(id) {
            id = self.diagram.fresh_id("edge");
        }
        match self.diagram.add_edge(Edge::new(id, source, target)) {
            Ok(true) => {
                self.commit();
                Some(id)
            }
            Ok(false) => None,
            Err(e) => {
                log::warn!("connection ignored: {e}");
                None
            }
        }
    }

    // ─── Canvas change events ────────────────────────────────────────────

    /// Apply node changes reported by the canvas. Returns `true` if the
    /// diagram changed.
    ///
    /// Drag and resize gestures are grouped so a whole gesture undoes in
    /// one step. A `dragging` position record opens a drag batch and the
    /// first position record without it closes that batch. A `resizing`
    /// dimensions record opens a resize batch and the first dimensions
    /// record without it closes that batch. A resizer also reports plain
    /// position records while the top or left edge moves; those stay inside
    /// the resize batch. Dimension records outside a resize are measurements
    /// and are ignored.
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) -> bool {
        let mut changed = false;
        let mut gesture_ended = false;

        for change in changes {
            log::trace!("node change: {change:?}");
            match change {
                NodeChange::Position {
                    id,
                    position,
                    dragging,
                } => {
                    if *dragging {
                        self.begin_gesture(Gesture::Drag);
                    } else {
                        gesture_ended |= self.in_gesture(Gesture::Drag);
                    }
                    if let Some(position) = position
                        && let Some(node) = self.diagram.node_mut(*id)
                        && node.position != *position
                    {
                        node.position = *position;
                        changed = true;
                    }
                }
                NodeChange::Dimensions {
                    id,
                    dimensions,
                    resizing,
                } => {
                    if !*resizing {
                        gesture_ended |= self.in_gesture(Gesture::Resize);
                        continue;
                    }
                    self.begin_gesture(Gesture::Resize);
                    if let Some(dims) = dimensions
                        && let Some(node) = self.diagram.node_mut(*id)
                    {
                        let (w, h) = (Some(dims.width), Some(dims.height));
                        if node.style.width != w || node.style.height != h {
                            node.style.width = w;
                            node.style.height = h;
                            changed = true;
                        }
                    }
                }
                NodeChange::Remove { id } => {
                    changed |= self.diagram.remove_node(*id).is_some();
                }
                NodeChange::Ignored => {}
            }
        }

        if changed {
            self.commit();
        }
        if gesture_ended && self.history.in_batch() {
            self.history.end_batch(&self.diagram);
            self.gesture = None;
        }
        changed
    }

    fn begin_gesture(&mut self, gesture: Gesture) {
        if !self.history.in_batch() {
            self.history.begin_batch();
            self.gesture = Some(gesture);
        }
    }

    /// Whether the open history batch belongs to `gesture`. Undo and redo
    /// close batches on their own, so the batch state is checked as well.
    fn in_gesture(&self, gesture: Gesture) -> bool {
        self.history.in_batch() && self.gesture == Some(gesture)
    }

    /// Apply edge changes reported by the canvas.
    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) -> bool {
        let mut changed = false;
        for change in changes {
            log::trace!("edge change: {change:?}");
            if let EdgeChange::Remove { id } = change {
                changed |= self.diagram.remove_edge(*id).is_some();
            }
        }
        if changed {
            self.commit();
        }
        changed
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select a node, clearing any edge selection.
    pub fn click_node(&mut self, id: NodeId) -> bool {
        if !self.diagram.contains_node(id) {
            return false;
        }
        self.selection = Selection::Node(id);
        true
    }

    /// Select an edge, clearing any node selection.
    pub fn click_edge(&mut self, id: NodeId) -> bool {
        if !self.diagram.contains_edge(id) {
            return false;
        }
        self.selection = Selection::Edge(id);
        true
    }

    /// Click on empty canvas: nothing selected.
    pub fn click_pane(&mut self) {
        self.selection = Selection::None;
    }

    /// Closing the properties panel clears the selection.
    pub fn close_panel(&mut self) {
        self.selection = Selection::None;
    }

    /// Delete the selected node (with its edges) or edge.
    pub fn delete_selected(&mut self) -> bool {
        let removed = match self.selection {
            Selection::None => false,
            Selection::Node(id) => self.diagram.remove_node(id).is_some(),
            Selection::Edge(id) => self.diagram.remove_edge(id).is_some(),
        };
        if removed {
            self.selection = Selection::None;
            self.commit();
        }
        removed
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Copy the selected node. Returns `false` when no node is selected.
    pub fn copy(&mut self) -> bool {
        let Some(node) = self.selection.node().and_then(|id| self.diagram.node(id)) else {
            return false;
        };
        self.clipboard.copy(node);
        true
    }

    pub fn cut(&mut self) -> bool {
        self.copy() && self.delete_selected()
    }

    /// Insert a clone of the clipboard node, offset from the copied
    /// position, and select it.
    pub fn paste(&mut self) -> Option<NodeId> {
        if self.clipboard.is_empty() {
            return None;
        }
        let id = self.diagram.fresh_id("node");
        let offset = self.config.paste_offset;
        let node = self.clipboard.paste_as(id, offset.x, offset.y)?;
        let id = self.insert_node(node)?;
        self.selection = Selection::Node(id);
        Some(id)
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo(&self.diagram) else {
            return false;
        };
        self.diagram = snapshot.clone();
        self.selection = self.selection.retained_in(&self.diagram);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo(&self.diagram) else {
            return false;
        };
        self.diagram = snapshot.clone();
        self.selection = self.selection.retained_in(&self.diagram);
        true
    }

    // ─── Properties ──────────────────────────────────────────────────────

    /// Replace one attribute of node `id`. `Ok(false)` if the node is
    /// unknown or the value is unchanged.
    pub fn update_node(&mut self, id: NodeId, field: NodeField) -> Result<bool, PropertyError> {
        let Some(node) = self.diagram.node(id) else {
            return Ok(false);
        };
        let next = field.apply(node)?;
        if next == *node {
            return Ok(false);
        }
        Ok(self.diagram.replace_node(next).is_ok() && self.commit())
    }

    /// Replace one attribute of edge `id`.
    pub fn update_edge(&mut self, id: NodeId, field: EdgeField) -> bool {
        let Some(edge) = self.diagram.edge(id) else {
            return false;
        };
        let next = field.apply(edge);
        self.replace_edge(next)
    }

    /// Apply a named preset to edge `id` as one change.
    pub fn apply_edge_preset(&mut self, id: NodeId, preset: EdgePreset) -> bool {
        let Some(edge) = self.diagram.edge(id) else {
            return false;
        };
        let mut next = edge.clone();
        next.apply_preset(preset);
        self.replace_edge(next)
    }

    fn replace_edge(&mut self, next: Edge) -> bool {
        if self.diagram.edge(next.id) == Some(&next) {
            return false;
        }
        self.diagram.replace_edge(next).is_ok() && self.commit()
    }

    /// Panel input for the selected entity, addressed by field key.
    pub fn set_selected_property(&mut self, key: &str, value: &str) -> Result<bool, PropertyError> {
        match self.selection {
            Selection::None => Ok(false),
            Selection::Node(id) => self.update_node(id, NodeField::parse(key, value)?),
            Selection::Edge(id) => Ok(self.update_edge(id, EdgeField::parse(key, value)?)),
        }
    }

    // ─── Whole-diagram replacement ───────────────────────────────────────

    /// Replace the diagram with a copy of the named template.
    pub fn load_template(&mut self, name: &str) -> bool {
        match load_template(name) {
            Ok(diagram) => {
                log::debug!(
                    "loaded template {name}: {} nodes, {} edges",
                    diagram.nodes.len(),
                    diagram.edges.len()
                );
                self.replace_diagram(diagram);
                true
            }
            Err(e) => {
                self.notices.push(Notice::error(e.to_string()));
                false
            }
        }
    }

    /// Open an export document.
    pub fn import_document(&mut self, json: &str) -> bool {
        match parse_document(json) {
            Ok(diagram) => {
                self.replace_diagram(diagram);
                true
            }
            Err(e) => {
                log::warn!("document rejected: {e}");
                self.notices
                    .push(Notice::error(format!("Could not open diagram: {e}")));
                false
            }
        }
    }

    /// Back to an empty diagram with fresh history.
    pub fn clear(&mut self) {
        self.replace_diagram(Diagram::new());
    }

    fn replace_diagram(&mut self, diagram: Diagram) {
        self.diagram = diagram;
        self.history.reset(&self.diagram);
        self.selection = Selection::None;
    }

    // ─── Export & share ──────────────────────────────────────────────────

    /// Build the export file for a download stamped `now`.
    pub fn export(&mut self, now: DateTime<Utc>) -> Option<ExportFile> {
        match ExportDocument::new(&self.diagram, now).and_then(ExportDocument::into_file) {
            Ok(file) => {
                self.notices
                    .push(Notice::success(format!("Saved {}", file.file_name)));
                Some(file)
            }
            Err(DiagramError::EmptyDiagram) => {
                self.notices
                    .push(Notice::info("Nothing to export. Add a node first."));
                None
            }
            Err(e) => {
                self.notices.push(Notice::error(format!("Export failed: {e}")));
                None
            }
        }
    }

    pub fn export_now(&mut self) -> Option<ExportFile> {
        self.export(Utc::now())
    }

    /// The placeholder share link for this editor's origin.
    pub fn share_url(&self) -> String {
        fc_core::share_url(&self.config.share_origin)
    }

    /// Report the outcome of the host's clipboard write.
    pub fn share_completed(&mut self, result: Result<(), String>) {
        let notice = match result {
            Ok(()) => Notice::success("Share link copied to clipboard"),
            Err(e) => {
                log::warn!("share link copy failed: {e}");
                Notice::error(format!("Could not copy share link: {e}"))
            }
        };
        self.notices.push(notice);
    }

    // ─── Shortcuts ───────────────────────────────────────────────────────

    /// Run a shortcut action. Host actions (viewport, export download)
    /// return `false` so the caller handles them.
    pub fn perform(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::Copy => self.copy(),
            ShortcutAction::Cut => self.cut(),
            ShortcutAction::Paste => self.paste().is_some(),
            ShortcutAction::Deselect => {
                let had_selection = !self.selection.is_empty();
                self.click_pane();
                had_selection
            }
            ShortcutAction::Export
            | ShortcutAction::ZoomIn
            | ShortcutAction::ZoomOut
            | ShortcutAction::FitView => false,
        }
    }

    // ─── Private helpers ─────────────────────────────────────────────────

    /// Record the current diagram as a history entry.
    fn commit(&mut self) -> bool {
        self.selection = self.selection.retained_in(&self.diagram);
        self.history.record(&self.diagram) || self.history.in_batch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn editor() -> Editor {
        Editor::default()
    }

    #[test]
    fn starts_empty_with_one_history_entry() {
        let ed = editor();
        assert!(ed.diagram().is_empty());
        assert_eq!(ed.history().len(), 1);
        assert!(!ed.can_undo());
        assert!(!ed.can_redo());
        assert!(!ed.panel_visible());
    }

    #[test]
    fn add_node_records_history() {
        let mut ed = editor();
        let id = ed.add_node(NodeType::Process).unwrap();
        let node = ed.diagram().node(id).unwrap();
        assert_eq!(node.position, Position::new(250.0, 250.0));
        assert_eq!(ed.history().len(), 2);
        assert!(ed.selection().is_empty(), "adding does not select");
    }

    #[test]
    fn click_events_keep_selection_exclusive() {
        let mut ed = editor();
        ed.load_template("simpleProcess");
        let start = NodeId::intern("start");
        let edge = NodeId::intern("e-start-input");

        assert!(ed.click_node(start));
        assert_eq!(ed.selection(), Selection::Node(start));
        assert!(ed.click_edge(edge));
        assert_eq!(ed.selection(), Selection::Edge(edge));
        assert_eq!(ed.selection().node(), None);
        ed.click_pane();
        assert_eq!(ed.selection(), Selection::None);

        assert!(!ed.click_node(NodeId::intern("nope")));
        assert!(!ed.click_edge(start), "a node id is not an edge");
        assert_eq!(ed.selection(), Selection::None);
    }

    #[test]
    fn delete_without_selection_is_noop() {
        let mut ed = editor();
        ed.load_template("simpleProcess");
        assert!(!ed.delete_selected());
        assert_eq!(ed.history().len(), 1);
    }

    #[test]
    fn copy_requires_node_selection() {
        let mut ed = editor();
        ed.load_template("simpleProcess");
        assert!(!ed.copy());
        ed.click_edge(NodeId::intern("e-start-input"));
        assert!(!ed.can_copy());
        assert!(!ed.copy());
        assert!(!ed.can_paste());
    }

    #[test]
    fn cut_removes_and_keeps_clipboard() {
        let mut ed = editor();
        ed.load_template("simpleProcess");
        ed.click_node(NodeId::intern("end"));
        assert!(ed.cut());
        assert!(!ed.diagram().contains_node(NodeId::intern("end")));
        assert!(ed.can_paste());
        let pasted = ed.paste().unwrap();
        assert_eq!(ed.diagram().node(pasted).unwrap().label, "Done");
    }

    #[test]
    fn close_panel_clears_selection() {
        let mut ed = editor();
        ed.load_template("userFlow");
        ed.click_node(NodeId::intern("start"));
        assert!(ed.panel_visible());
        ed.close_panel();
        assert!(!ed.panel_visible());
        assert!(ed.panel_view().is_none());
    }

    #[test]
    fn undo_clears_vanished_selection() {
        let mut ed = editor();
        let id = ed.add_node(NodeType::Decision).unwrap();
        ed.click_node(id);
        assert!(ed.undo());
        assert!(ed.selection().is_empty());
    }

    #[test]
    fn unknown_template_leaves_model_alone() {
        let mut ed = editor();
        ed.add_node(NodeType::Process);
        assert!(!ed.load_template("orgchart"));
        assert_eq!(ed.diagram().nodes.len(), 1);
        assert_eq!(ed.history().len(), 2);
        let notices = ed.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, crate::NoticeLevel::Error);
    }

    #[test]
    fn export_empty_is_refused_with_notice() {
        let mut ed = editor();
        assert!(ed.export_now().is_none());
        let notices = ed.take_notices();
        assert_eq!(notices, vec![Notice::info("Nothing to export. Add a node first.")]);
        assert!(ed.take_notices().is_empty());
    }

    #[test]
    fn export_names_file_by_date() {
        let mut ed = editor();
        ed.load_template("decisionTree");
        let now = Utc.with_ymd_and_hms(2025, 11, 2, 8, 30, 0).unwrap();
        let file = ed.export(now).unwrap();
        assert_eq!(file.file_name, "flowchart_2025-11-02.json");
        assert!(file.contents.contains("\"timestamp\": \"2025-11-02T08:30:00.000Z\""));
    }

    #[test]
    fn share_reports_outcome() {
        let mut ed = editor();
        assert_eq!(ed.share_url(), "http://localhost:8080/editor?shared=true");
        ed.share_completed(Err("permission denied".into()));
        ed.share_completed(Ok(()));
        let notices = ed.take_notices();
        assert_eq!(notices[0].level, crate::NoticeLevel::Error);
        assert!(notices[0].message.contains("permission denied"));
        assert_eq!(notices[1].level, crate::NoticeLevel::Success);
    }

    #[test]
    fn image_import_embeds_data_uri() {
        let mut ed = editor();
        let id = ed
            .import_image("logo.png", b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR")
            .unwrap();
        let node = ed.diagram().node(id).unwrap();
        assert_eq!(node.label, "logo.png");
        let NodeKind::Image { image_url } = &node.kind else {
            panic!("expected image node");
        };
        assert!(image_url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn less_common_images_are_embedded() {
        let mut ed = editor();
        let files: [(&str, &[u8], &str); 4] = [
            ("scan.bmp", b"BM\x3a\0\0\0\0\0\0\0\x36\0\0\0", "image/bmp"),
            ("favicon.ico", &[0, 0, 1, 0, 1, 0, 16, 16], "image/x-icon"),
            ("photo.avif", b"\0\0\0\x1cftypavif\0\0\0\0", "image/avif"),
            ("chart.svg", b"<!-- exported -->\n<!DOCTYPE svg>\n<svg/>", "image/svg+xml"),
        ];
        for (name, bytes, mime) in files {
            let id = ed.import_image(name, bytes).unwrap();
            let NodeKind::Image { image_url } = &ed.diagram().node(id).unwrap().kind else {
                panic!("expected image node");
            };
            assert!(image_url.starts_with(&format!("data:{mime};base64,")), "{name}");
        }
        assert_eq!(ed.diagram().nodes.len(), 4);
    }

    #[test]
    fn bad_image_fails_silently() {
        let mut ed = editor();
        assert!(ed.import_image("notes.txt", b"plain text").is_none());
        assert!(ed.import_image_uri("x", "data:text/plain;base64,aGk=").is_none());
        assert!(ed.diagram().is_empty());
        assert_eq!(ed.history().len(), 1);
        assert!(ed.take_notices().is_empty());
    }

    #[test]
    fn perform_routes_actions() {
        let mut ed = editor();
        ed.add_node(NodeType::Process);
        assert!(ed.perform(ShortcutAction::Undo));
        assert!(ed.diagram().is_empty());
        assert!(ed.perform(ShortcutAction::Redo));
        assert_eq!(ed.diagram().nodes.len(), 1);
        assert!(!ed.perform(ShortcutAction::ZoomIn));
        assert!(!ed.perform(ShortcutAction::Deselect));
    }
}
