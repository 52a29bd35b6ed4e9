//! Change notifications forwarded from the canvas library.
//!
//! The canvas owns gestures (drag, resize, delete key on a focused
//! element, drawing a connection) and reports them as small change records.
//! The shapes here match the records the host emits, so the bridge can
//! deserialize them straight from JSON.

use fc_core::{NodeId, Position};
use serde::Deserialize;

/// A change to one node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeChange {
    /// Drag progress. `dragging: true` while the pointer is down; the final
    /// record of a gesture has `dragging: false` and may omit `position`.
    Position {
        id: NodeId,
        #[serde(default)]
        position: Option<Position>,
        #[serde(default)]
        dragging: bool,
    },
    /// Measured or resized dimensions.
    Dimensions {
        id: NodeId,
        #[serde(default)]
        dimensions: Option<Dimensions>,
        /// Set while a resize handle is held.
        #[serde(default)]
        resizing: bool,
    },
    Remove { id: NodeId },
    /// Selection, hover, and other view-only changes the editor tracks itself.
    #[serde(other)]
    Ignored,
}

/// A change to one edge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EdgeChange {
    Remove { id: NodeId },
    #[serde(other)]
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

/// A connection the user drew between two node handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
}
