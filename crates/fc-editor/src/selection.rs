//! Selection and clipboard state.

use fc_core::{Diagram, Node, NodeId};
use serde::Serialize;

/// What the user has selected: one node, one edge, or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Selection {
    #[default]
    None,
    Node(NodeId),
    Edge(NodeId),
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn node(&self) -> Option<NodeId> {
        match self {
            Selection::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn edge(&self) -> Option<NodeId> {
        match self {
            Selection::Edge(id) => Some(*id),
            _ => None,
        }
    }

    /// This selection if its target still exists in `diagram`, else `None`.
    pub fn retained_in(self, diagram: &Diagram) -> Self {
        let alive = match self {
            Selection::None => true,
            Selection::Node(id) => diagram.contains_node(id),
            Selection::Edge(id) => diagram.contains_edge(id),
        };
        if alive { self } else { Selection::None }
    }
}

/// Holds at most one copied node.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    node: Option<Node>,
}

impl Clipboard {
    pub fn copy(&mut self, node: &Node) {
        self.node = Some(node.clone());
    }

    pub fn node(&self) -> Option<&Node> {
        self.node.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_none()
    }

    /// A clone of the copied node with a new id, shifted by `(dx, dy)`.
    pub fn paste_as(&self, id: NodeId, dx: f32, dy: f32) -> Option<Node> {
        let source = self.node.as_ref()?;
        let mut node = source.clone();
        node.id = id;
        node.position = source.position.offset(dx, dy);
        Some(node)
    }
}
