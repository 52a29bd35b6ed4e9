//! Lint diagnostics for flowcharts.
//!
//! Reports structural issues without modifying the diagram. Results feed
//! the CLI's `lint` command and the bridge's diagnostics call.

use crate::diagram::Diagram;
use crate::id::NodeId;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Walker};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    /// Breaks the diagram invariants; the document will not load.
    Error,
    /// Likely a mistake.
    Warning,
    /// Informational.
    Info,
}

/// A single lint diagnostic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintDiagnostic {
    /// The node or edge this diagnostic refers to.
    pub target: NodeId,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "dangling-edge", "isolated-node").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over the diagram, most severe first.
#[must_use]
pub fn lint_diagram(diagram: &Diagram) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_duplicate_ids(diagram, &mut diags);
    lint_dangling_edges(diagram, &mut diags);
    lint_self_loops(diagram, &mut diags);

    let flow = FlowGraph::build(diagram);
    lint_isolated_nodes(&flow, &mut diags);
    lint_unreachable(&flow, &mut diags);

    diags.sort_by_key(|d| d.severity);
    diags
}

// ─── Graph view ──────────────────────────────────────────────────────────

/// Directed graph over the diagram's nodes, skipping dangling edges.
struct FlowGraph {
    graph: DiGraph<NodeId, ()>,
}

impl FlowGraph {
    fn build(diagram: &Diagram) -> Self {
        let mut graph = DiGraph::with_capacity(diagram.nodes.len(), diagram.edges.len());
        let mut index: HashMap<NodeId, NodeIndex> = HashMap::new();
        for node in &diagram.nodes {
            index.entry(node.id).or_insert_with(|| graph.add_node(node.id));
        }
        for edge in &diagram.edges {
            if let (Some(&s), Some(&t)) = (index.get(&edge.source), index.get(&edge.target)) {
                graph.add_edge(s, t, ());
            }
        }
        Self { graph }
    }

    fn roots(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices().filter(|&idx| {
            self.graph
                .neighbors_directed(idx, Direction::Incoming)
                .next()
                .is_none()
        })
    }
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn lint_duplicate_ids(diagram: &Diagram, diags: &mut Vec<LintDiagnostic>) {
    let mut seen = HashSet::new();
    let ids = diagram
        .nodes
        .iter()
        .map(|n| n.id)
        .chain(diagram.edges.iter().map(|e| e.id));
    for id in ids {
        if !seen.insert(id) {
            diags.push(LintDiagnostic {
                target: id,
                message: format!("Id `{id}` is used more than once."),
                severity: LintSeverity::Error,
                rule: "duplicate-id",
            });
        }
    }
}

fn lint_dangling_edges(diagram: &Diagram, diags: &mut Vec<LintDiagnostic>) {
    for edge in &diagram.edges {
        for endpoint in [edge.source, edge.target] {
            if !diagram.contains_node(endpoint) {
                diags.push(LintDiagnostic {
                    target: edge.id,
                    message: format!("Edge `{}` points at missing node `{endpoint}`.", edge.id),
                    severity: LintSeverity::Error,
                    rule: "dangling-edge",
                });
            }
        }
    }
}

fn lint_self_loops(diagram: &Diagram, diags: &mut Vec<LintDiagnostic>) {
    for edge in diagram.edges.iter().filter(|e| e.source == e.target) {
        diags.push(LintDiagnostic {
            target: edge.id,
            message: format!("Edge `{}` connects `{}` to itself.", edge.id, edge.source),
            severity: LintSeverity::Warning,
            rule: "self-loop",
        });
    }
}

fn lint_isolated_nodes(flow: &FlowGraph, diags: &mut Vec<LintDiagnostic>) {
    // A lone node is the whole chart, not a mistake.
    if flow.graph.node_count() < 2 {
        return;
    }
    for idx in flow.graph.node_indices() {
        if flow.graph.neighbors_undirected(idx).next().is_none() {
            let id = flow.graph[idx];
            diags.push(LintDiagnostic {
                target: id,
                message: format!("Node `{id}` has no connections."),
                severity: LintSeverity::Info,
                rule: "isolated-node",
            });
        }
    }
}

/// Nodes no entry point leads to. Only meaningful when entry points exist;
/// a chart that is one big cycle has none and is left alone.
fn lint_unreachable(flow: &FlowGraph, diags: &mut Vec<LintDiagnostic>) {
    let roots: Vec<NodeIndex> = flow
        .roots()
        .filter(|&idx| flow.graph.neighbors_undirected(idx).next().is_some())
        .collect();
    if roots.is_empty() {
        return;
    }

    let mut reached = HashSet::new();
    for root in roots {
        reached.extend(Dfs::new(&flow.graph, root).iter(&flow.graph));
    }

    for idx in flow.graph.node_indices() {
        let connected = flow.graph.neighbors_undirected(idx).next().is_some();
        if connected && !reached.contains(&idx) {
            let id = flow.graph[idx];
            diags.push(LintDiagnostic {
                target: id,
                message: format!("Node `{id}` cannot be reached from any starting node."),
                severity: LintSeverity::Info,
                rule: "unreachable",
            });
        }
    }
}
