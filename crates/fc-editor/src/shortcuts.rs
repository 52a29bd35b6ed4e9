//! Keyboard bindings.
//!
//! One table maps key chords to editor actions so the bridge and native
//! hosts agree on bindings. `Ctrl` and `⌘` are interchangeable.

/// What a key chord asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
    Delete,
    Copy,
    Cut,
    Paste,
    Deselect,
    /// Build the export file; the host performs the download.
    Export,
    ZoomIn,
    ZoomOut,
    FitView,
}

impl ShortcutAction {
    /// camelCase name reported to the host.
    pub fn name(self) -> &'static str {
        use ShortcutAction::*;
        match self {
            Undo => "undo",
            Redo => "redo",
            Delete => "delete",
            Copy => "copy",
            Cut => "cut",
            Paste => "paste",
            Deselect => "deselect",
            Export => "export",
            ZoomIn => "zoomIn",
            ZoomOut => "zoomOut",
            FitView => "fitView",
        }
    }

    /// Viewport commands belong to the canvas library and the download to
    /// the page; the editor store cannot carry these out.
    pub fn is_host_action(self) -> bool {
        matches!(
            self,
            ShortcutAction::Export
                | ShortcutAction::ZoomIn
                | ShortcutAction::ZoomOut
                | ShortcutAction::FitView
        )
    }
}

/// Modifier state a binding requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chord {
    /// No command key, no shift.
    Bare,
    Cmd,
    CmdShift,
}

/// Keys are matched case-insensitively.
const BINDINGS: &[(Chord, &str, ShortcutAction)] = &[
    (Chord::Cmd, "z", ShortcutAction::Undo),
    (Chord::CmdShift, "z", ShortcutAction::Redo),
    (Chord::Cmd, "y", ShortcutAction::Redo),
    (Chord::Cmd, "c", ShortcutAction::Copy),
    (Chord::Cmd, "x", ShortcutAction::Cut),
    (Chord::Cmd, "v", ShortcutAction::Paste),
    (Chord::Cmd, "s", ShortcutAction::Export),
    (Chord::Cmd, "=", ShortcutAction::ZoomIn),
    (Chord::Cmd, "+", ShortcutAction::ZoomIn),
    (Chord::Cmd, "-", ShortcutAction::ZoomOut),
    (Chord::Cmd, "0", ShortcutAction::FitView),
    (Chord::Bare, "delete", ShortcutAction::Delete),
    (Chord::Bare, "backspace", ShortcutAction::Delete),
    (Chord::Bare, "escape", ShortcutAction::Deselect),
];

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a `KeyboardEvent.key` plus modifiers to an action. `alt` is
    /// accepted for signature parity with the host event and never binds.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let chord = match (ctrl || meta, shift) {
            (true, true) => Chord::CmdShift,
            (true, false) => Chord::Cmd,
            (false, false) => Chord::Bare,
            (false, true) => return None,
        };
        BINDINGS
            .iter()
            .find(|(c, k, _)| *c == chord && k.eq_ignore_ascii_case(key))
            .map(|&(_, _, action)| action)
    }
}
