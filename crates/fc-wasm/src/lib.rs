//! WASM bridge for Flow Canvas. Exposes the editor store to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host page owns the
//! canvas library and DOM; it forwards change records and panel inputs
//! here and re-renders from `nodes_json` / `edges_json` when a call reports
//! a change.

use fc_core::{Diagram, EdgePreset, NodeId, NodeType, lint_diagram, template_catalog};
use fc_editor::changes::{Connection, EdgeChange, NodeChange};
use fc_editor::shortcuts::ShortcutMap;
use fc_editor::{Editor, EditorConfig};
use wasm_bindgen::prelude::*;

/// The main WASM-facing editor controller.
///
/// All interaction from the host page goes through this struct.
#[wasm_bindgen]
pub struct FlowEditor {
    editor: Editor,
}

#[wasm_bindgen]
impl FlowEditor {
    /// Create an editor from a JSON config. Missing fields take defaults;
    /// an empty or malformed config falls back to all defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Self {
        console_error_panic_hook_setup();
        Self {
            editor: Editor::new(parse_config(config_json)),
        }
    }

    // ─── Diagram state ───────────────────────────────────────────────────

    /// The node list in the canvas library's shape.
    pub fn nodes_json(&self) -> String {
        to_json(&self.editor.diagram().nodes)
    }

    pub fn edges_json(&self) -> String {
        to_json(&self.editor.diagram().edges)
    }

    /// Toolbar and panel flags:
    /// `{"canUndo","canRedo","canCopy","canPaste","canDelete","panelVisible","selection"}`.
    pub fn ui_state_json(&self) -> String {
        let ed = &self.editor;
        serde_json::json!({
            "canUndo": ed.can_undo(),
            "canRedo": ed.can_redo(),
            "canCopy": ed.can_copy(),
            "canPaste": ed.can_paste(),
            "canDelete": ed.can_delete(),
            "panelVisible": ed.panel_visible(),
            "selection": ed.selection(),
        })
        .to_string()
    }

    // ─── Canvas events ───────────────────────────────────────────────────

    /// Apply a JSON array of node change records. Returns true if the
    /// diagram changed.
    pub fn apply_node_changes(&mut self, changes_json: &str) -> bool {
        match serde_json::from_str::<Vec<NodeChange>>(changes_json) {
            Ok(changes) => self.editor.apply_node_changes(&changes),
            Err(e) => {
                log::warn!("bad node changes: {e}");
                false
            }
        }
    }

    pub fn apply_edge_changes(&mut self, changes_json: &str) -> bool {
        match serde_json::from_str::<Vec<EdgeChange>>(changes_json) {
            Ok(changes) => self.editor.apply_edge_changes(&changes),
            Err(e) => {
                log::warn!("bad edge changes: {e}");
                false
            }
        }
    }

    /// Add the edge the user drew. Returns the new edge id, or `""` if the
    /// connection was ignored.
    pub fn connect(&mut self, source: &str, target: &str) -> String {
        let connection = Connection {
            source: NodeId::intern(source),
            target: NodeId::intern(target),
        };
        id_or_empty(self.editor.connect(connection))
    }

    /// Add a toolbar node (`process`, `decision`, `custom`). Returns the
    /// new node id, or `""` for an unknown kind.
    pub fn add_node(&mut self, kind: &str) -> String {
        let Ok(node_type) = kind.parse::<NodeType>() else {
            log::warn!("unknown node kind `{kind}`");
            return String::new();
        };
        id_or_empty(self.editor.add_node(node_type))
    }

    /// Embed an uploaded image file. Returns the node id, or `""` if the
    /// bytes are not an image.
    pub fn import_image(&mut self, file_name: &str, bytes: &[u8]) -> String {
        id_or_empty(self.editor.import_image(file_name, bytes))
    }

    // ─── Selection & clipboard ───────────────────────────────────────────

    pub fn select_node(&mut self, id: &str) -> bool {
        self.editor.click_node(NodeId::intern(id))
    }

    pub fn select_edge(&mut self, id: &str) -> bool {
        self.editor.click_edge(NodeId::intern(id))
    }

    /// Pane click.
    pub fn clear_selection(&mut self) {
        self.editor.click_pane();
    }

    pub fn close_panel(&mut self) {
        self.editor.close_panel();
    }

    pub fn delete_selected(&mut self) -> bool {
        self.editor.delete_selected()
    }

    pub fn copy(&mut self) -> bool {
        self.editor.copy()
    }

    pub fn cut(&mut self) -> bool {
        self.editor.cut()
    }

    /// Returns the pasted node id, or `""` when the clipboard is empty.
    pub fn paste(&mut self) -> String {
        id_or_empty(self.editor.paste())
    }

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    // ─── Properties panel ────────────────────────────────────────────────

    /// The panel contents for the current selection, or `{}` when hidden.
    pub fn get_panel_json(&self) -> String {
        match self.editor.panel_view() {
            Some(view) => to_json(&view),
            None => "{}".to_string(),
        }
    }

    /// Set one property of the selected node or edge. Returns JSON:
    /// `{"ok":true,"changed":bool}` or `{"ok":false,"error":"..."}`.
    pub fn set_prop(&mut self, key: &str, value: &str) -> String {
        match self.editor.set_selected_property(key, value) {
            Ok(changed) => serde_json::json!({ "ok": true, "changed": changed }).to_string(),
            Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }).to_string(),
        }
    }

    /// Apply a named preset to the selected edge.
    pub fn apply_edge_preset(&mut self, preset: &str) -> bool {
        let Some(edge) = self.editor.selection().edge() else {
            return false;
        };
        match preset.parse::<EdgePreset>() {
            Ok(preset) => self.editor.apply_edge_preset(edge, preset),
            Err(()) => {
                log::warn!("unknown edge preset `{preset}`");
                false
            }
        }
    }

    // ─── Templates, files, sharing ───────────────────────────────────────

    pub fn load_template(&mut self, name: &str) -> bool {
        self.editor.load_template(name)
    }

    /// Build the download for the current diagram. Returns JSON:
    /// `{"ok":true,"fileName":"...","contents":"..."}` or `{"ok":false}`;
    /// the reason is queued as a notice.
    pub fn export_document(&mut self) -> String {
        match self.editor.export_now() {
            Some(file) => serde_json::json!({
                "ok": true,
                "fileName": file.file_name,
                "contents": file.contents,
            })
            .to_string(),
            None => r#"{"ok":false}"#.to_string(),
        }
    }

    pub fn import_document(&mut self, json: &str) -> bool {
        self.editor.import_document(json)
    }

    pub fn share_url(&self) -> String {
        self.editor.share_url()
    }

    /// Report the clipboard write result. `error` is ignored when `ok`.
    pub fn share_completed(&mut self, ok: bool, error: &str) {
        let result = if ok { Ok(()) } else { Err(error.to_string()) };
        self.editor.share_completed(result);
    }

    /// Drain pending notices as a JSON array of `{"level","message"}`.
    pub fn take_notices_json(&mut self) -> String {
        to_json(&self.editor.take_notices())
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. Returns a JSON string:
    /// `{"changed":bool,"action":"<action_name>","host":bool}`.
    ///
    /// `host` is true for actions the page must carry out itself (viewport
    /// zoom, fit, and the export download).
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return r#"{"changed":false,"action":"none","host":false}"#.to_string();
        };
        let changed = self.editor.perform(action);
        serde_json::json!({
            "changed": changed,
            "action": action.name(),
            "host": action.is_host_action(),
        })
        .to_string()
    }
}

fn parse_config(config_json: &str) -> EditorConfig {
    if config_json.trim().is_empty() {
        return with_page_origin(EditorConfig::default(), false);
    }
    let explicit_origin = serde_json::from_str::<serde_json::Value>(config_json)
        .is_ok_and(|v| v.get("shareOrigin").is_some());
    match EditorConfig::from_json(config_json) {
        Ok(config) => with_page_origin(config, explicit_origin),
        Err(e) => {
            log::warn!("bad editor config, using defaults: {e}");
            with_page_origin(EditorConfig::default(), false)
        }
    }
}

/// Share links point at the page's own origin unless the config names one.
fn with_page_origin(config: EditorConfig, explicit: bool) -> EditorConfig {
    if explicit {
        return config;
    }
    match page_origin() {
        Some(share_origin) => EditorConfig {
            share_origin,
            ..config
        },
        None => config,
    }
}

#[cfg(target_arch = "wasm32")]
fn page_origin() -> Option<String> {
    web_sys::window().and_then(|w| w.location().origin().ok())
}

#[cfg(not(target_arch = "wasm32"))]
fn page_origin() -> Option<String> {
    None
}

fn id_or_empty(id: Option<NodeId>) -> String {
    id.map(|id| id.as_str().to_string()).unwrap_or_default()
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("serialization failed: {e}");
        "null".to_string()
    })
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Flow Canvas WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no editor needed) ─────────────────────────────

/// Validate an export document. Returns JSON: `{"ok":true}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate(json: &str) -> String {
    match fc_core::parse_document(json) {
        Ok(_) => r#"{"ok":true}"#.to_string(),
        Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}

/// Lint a document without enforcing its invariants, so broken files
/// still get diagnostics. Returns JSON `{"ok":true,"diagnostics":[...]}`.
#[wasm_bindgen]
pub fn lint(json: &str) -> String {
    match serde_json::from_str::<Diagram>(json) {
        Ok(diagram) => serde_json::json!({
            "ok": true,
            "diagnostics": lint_diagram(&diagram),
        })
        .to_string(),
        Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}

/// The template picker entries as a JSON array.
#[wasm_bindgen]
pub fn templates_json() -> String {
    to_json(template_catalog())
}
