//! The node and edge collections of one flowchart.
//!
//! `Diagram` enforces the referential invariant: every edge's endpoints
//! exist, and removing a node removes every edge touching it.

use crate::error::DiagramError;
use crate::id::NodeId;
use crate::model::{Edge, Node};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashSet;

/// Edges removed alongside a node. Most nodes have few connections.
pub type RemovedEdges = SmallVec<[Edge; 4]>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Diagram {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Diagram {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a diagram from raw collections, checking ids and endpoints.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, DiagramError> {
        let diagram = Self { nodes, edges };
        diagram.validate()?;
        Ok(diagram)
    }

    /// No nodes and no edges.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Mutable node lookup. Changing `id` here bypasses the id checks.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Look up an edge by id.
    pub fn edge(&self, id: NodeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Mutable edge lookup. Endpoints are not rechecked.
    pub fn edge_mut(&mut self, id: NodeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    /// Whether a node has this id.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Whether an edge has this id.
    pub fn contains_edge(&self, id: NodeId) -> bool {
        self.edge(id).is_some()
    }

    /// Whether `id` is taken by any node or edge.
    pub fn contains_id(&self, id: NodeId) -> bool {
        self.contains_node(id) || self.contains_edge(id)
    }

    /// Edges with `id` as source or target.
    pub fn edges_of(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.touches(id))
    }

    /// Generate an id with `prefix` that no node or edge uses yet.
    pub fn fresh_id(&self, prefix: &str) -> NodeId {
        loop {
            let id = NodeId::sequential(prefix);
            if !self.contains_id(id) {
                return id;
            }
        }
    }

    /// Insert a node. Fails if the id is already taken.
    pub fn add_node(&mut self, node: Node) -> Result<(), DiagramError> {
        if self.contains_id(node.id) {
            return Err(DiagramError::DuplicateId(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Replace the node with the same id. The old value is returned.
    pub fn replace_node(&mut self, node: Node) -> Result<Node, DiagramError> {
        let slot = self
            .node_mut(node.id)
            .ok_or(DiagramError::UnknownNode(node.id))?;
        Ok(std::mem::replace(slot, node))
    }

    /// Remove a node and every edge that references it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<(Node, RemovedEdges)> {
        let pos = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(pos);
        let mut removed = RemovedEdges::new();
        self.edges.retain(|e| {
            if e.touches(id) {
                removed.push(e.clone());
                false
            } else {
                true
            }
        });
        log::debug!("removed node {id} and {} edge(s)", removed.len());
        Some((node, removed))
    }

    /// Add an edge. Both endpoints must exist.
    ///
    /// Returns `Ok(false)` without inserting when an edge already joins the
    /// same source and target, matching the canvas library's behavior for
    /// repeated connections.
    pub fn add_edge(&mut self, edge: Edge) -> Result<bool, DiagramError> {
        for endpoint in [edge.source, edge.target] {
            if !self.contains_node(endpoint) {
                return Err(DiagramError::DanglingEdge {
                    edge: edge.id,
                    node: endpoint,
                });
            }
        }
        if self
            .edges
            .iter()
            .any(|e| e.source == edge.source && e.target == edge.target)
        {
            return Ok(false);
        }
        if self.contains_id(edge.id) {
            return Err(DiagramError::DuplicateId(edge.id));
        }
        self.edges.push(edge);
        Ok(true)
    }

    /// Replace the edge with the same id. Endpoints must still exist.
    pub fn replace_edge(&mut self, edge: Edge) -> Result<Edge, DiagramError> {
        for endpoint in [edge.source, edge.target] {
            if !self.contains_node(endpoint) {
                return Err(DiagramError::DanglingEdge {
                    edge: edge.id,
                    node: endpoint,
                });
            }
        }
        let slot = self
            .edge_mut(edge.id)
            .ok_or(DiagramError::UnknownEdge(edge.id))?;
        Ok(std::mem::replace(slot, edge))
    }

    /// Remove an edge by id; its endpoints stay.
    pub fn remove_edge(&mut self, id: NodeId) -> Option<Edge> {
        let pos = self.edges.iter().position(|e| e.id == id)?;
        Some(self.edges.remove(pos))
    }

    /// Check the referential invariants: unique ids, no dangling edges.
    pub fn validate(&self) -> Result<(), DiagramError> {
        let mut seen = HashSet::with_capacity(self.nodes.len() + self.edges.len());
        for node in &self.nodes {
            if !seen.insert(node.id) {
                return Err(DiagramError::DuplicateId(node.id));
            }
        }
        let node_ids = seen.clone();
        for edge in &self.edges {
            if !seen.insert(edge.id) {
                return Err(DiagramError::DuplicateId(edge.id));
            }
            for endpoint in [edge.source, edge.target] {
                if !node_ids.contains(&endpoint) {
                    return Err(DiagramError::DanglingEdge {
                        edge: edge.id,
                        node: endpoint,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeType, Position};

    fn node(id: &str) -> Node {
        Node::with_defaults(NodeId::intern(id), NodeType::Process, Position::default())
    }

    fn chain() -> Diagram {
        Diagram::from_parts(
            vec![node("a"), node("b"), node("c")],
            vec![
                Edge::between("a", "b"),
                Edge::between("b", "c"),
                Edge::between("c", "a"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn remove_node_cascades_edges() {
        let mut d = chain();
        let (removed, edges) = d.remove_node(NodeId::intern("b")).unwrap();
        assert_eq!(removed.id, NodeId::intern("b"));
        assert_eq!(edges.len(), 2);
        assert_eq!(d.edges.len(), 1);
        assert!(d.validate().is_ok());
        assert!(d.edges.iter().all(|e| !e.touches(NodeId::intern("b"))));
    }

    #[test]
    fn remove_missing_node_is_none() {
        let mut d = chain();
        assert!(d.remove_node(NodeId::intern("zzz")).is_none());
        assert_eq!(d, chain());
    }

    #[test]
    fn add_edge_rejects_dangling_endpoint() {
        let mut d = chain();
        let err = d.add_edge(Edge::between("a", "ghost")).unwrap_err();
        assert!(matches!(err, DiagramError::DanglingEdge { .. }));
        assert_eq!(d.edges.len(), 3);
    }

    #[test]
    fn add_edge_ignores_repeated_connection() {
        let mut d = chain();
        let mut again = Edge::between("a", "b");
        again.id = NodeId::intern("other-id");
        assert!(!d.add_edge(again).unwrap());
        assert_eq!(d.edges.len(), 3);
    }

    #[test]
    fn add_node_rejects_duplicate_id() {
        let mut d = chain();
        assert!(matches!(
            d.add_node(node("a")),
            Err(DiagramError::DuplicateId(_))
        ));
        // Edge ids share the namespace.
        assert!(d.add_node(node("ea-b")).is_err());
    }

    #[test]
    fn from_parts_validates() {
        let err = Diagram::from_parts(vec![node("a")], vec![Edge::between("a", "b")]);
        assert!(err.is_err());

        let dup = Diagram::from_parts(vec![node("a"), node("a")], vec![]);
        assert!(matches!(dup, Err(DiagramError::DuplicateId(_))));
    }

    #[test]
    fn fresh_id_skips_taken_ids() {
        let d = chain();
        let id = d.fresh_id("node");
        assert!(!d.contains_id(id));
    }

    #[test]
    fn replace_node_keeps_order() {
        let mut d = chain();
        let mut b = d.node(NodeId::intern("b")).unwrap().clone();
        b.label = "renamed".into();
        let old = d.replace_node(b).unwrap();
        assert_eq!(old.label, "New Node");
        assert_eq!(d.nodes[1].label, "renamed");
    }
}
