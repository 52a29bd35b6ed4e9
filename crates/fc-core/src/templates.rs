//! Built-in starter diagrams.
//!
//! Each template is built once and handed out as a deep copy, so edits to
//! a loaded diagram never reach the shared definition.

use crate::diagram::Diagram;
use crate::error::DiagramError;
use crate::id::NodeId;
use crate::model::*;
use serde::Serialize;
use std::sync::LazyLock;

/// Catalog entry shown in the template picker.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TemplateInfo {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: &'static str,
}

const CATALOG: &[TemplateInfo] = &[
    TemplateInfo {
        name: "simpleProcess",
        title: "Simple Process",
        description: "Input, validation, and a retry loop ending in a done step",
        category: "Business",
    },
    TemplateInfo {
        name: "userFlow",
        title: "User Flow",
        description: "Map a user journey through localization checks",
        category: "UX/UI",
    },
    TemplateInfo {
        name: "decisionTree",
        title: "Decision Tree",
        description: "Nested yes/no decision points and their outcomes",
        category: "Planning",
    },
];

static SIMPLE_PROCESS: LazyLock<Diagram> = LazyLock::new(simple_process);
static USER_FLOW: LazyLock<Diagram> = LazyLock::new(user_flow);
static DECISION_TREE: LazyLock<Diagram> = LazyLock::new(decision_tree);

/// All templates, in picker order.
pub fn template_catalog() -> &'static [TemplateInfo] {
    CATALOG
}

/// A fresh copy of the named template.
pub fn load_template(name: &str) -> Result<Diagram, DiagramError> {
    let template: &Diagram = match name {
        "simpleProcess" => &SIMPLE_PROCESS,
        "userFlow" => &USER_FLOW,
        "decisionTree" => &DECISION_TREE,
        _ => return Err(DiagramError::UnknownTemplate(name.to_string())),
    };
    Ok(template.clone())
}

// ─── Builders ────────────────────────────────────────────────────────────

fn process(id: &str, label: &str, x: f32, y: f32) -> Node {
    Node::new(
        NodeId::intern(id),
        NodeKind::Process { flags: false },
        Position::new(x, y),
        label,
    )
}

fn decision(id: &str, label: &str, x: f32, y: f32) -> Node {
    Node::new(NodeId::intern(id), NodeKind::Decision, Position::new(x, y), label)
}

fn custom(id: &str, label: &str, variant: CustomVariant, x: f32, y: f32) -> Node {
    Node::new(
        NodeId::intern(id),
        NodeKind::Custom { variant },
        Position::new(x, y),
        label,
    )
}

fn edge(id: &str, source: &str, target: &str) -> Edge {
    Edge::new(
        NodeId::intern(id),
        NodeId::intern(source),
        NodeId::intern(target),
    )
}

fn build(nodes: Vec<Node>, edges: Vec<Edge>) -> Diagram {
    // Template tables are static; a broken one is a programming error.
    Diagram::from_parts(nodes, edges).unwrap_or_else(|e| panic!("invalid template: {e}"))
}

fn simple_process() -> Diagram {
    build(
        vec![
            process("start", "Start", 250.0, 0.0),
            process("input", "Enter Details", 250.0, 100.0),
            decision("validate", "Valid?", 250.0, 200.0),
            process("process", "Process Request", 100.0, 330.0).with_width(160.0),
            custom("error", "Show Error", CustomVariant::Dark, 400.0, 330.0).with_width(120.0),
            custom("end", "Done", CustomVariant::Purple, 100.0, 450.0).with_width(100.0),
        ],
        vec![
            edge("e-start-input", "start", "input"),
            edge("e-input-validate", "input", "validate"),
            edge("e-validate-process", "validate", "process").with_label("Yes"),
            edge("e-validate-error", "validate", "error").with_label("No"),
            edge("e-error-input", "error", "input").with_label("Retry"),
            edge("e-process-end", "process", "end"),
        ],
    )
}

fn user_flow() -> Diagram {
    let mut internationalized = process("process1", "Internationalized", 130.0, 250.0);
    internationalized.kind = NodeKind::Process { flags: true };

    build(
        vec![
            process("start", "User Flow", 250.0, 0.0),
            decision("decision1", "Is user country?", 250.0, 100.0),
            custom("yes1", "Yes", CustomVariant::Default, 175.0, 180.0),
            custom("no1", "No", CustomVariant::Default, 325.0, 180.0),
            internationalized.with_width(180.0),
            process("process2", "Not Accessible", 350.0, 250.0).with_width(120.0),
            custom("exit1", "Exit", CustomVariant::Dark, 380.0, 350.0).with_width(60.0),
            custom("custom1", "Account", CustomVariant::Purple, 130.0, 330.0).with_width(80.0),
            custom("custom2", "Currency", CustomVariant::Purple, 130.0, 390.0).with_width(80.0),
            custom("custom3", "Country", CustomVariant::Purple, 130.0, 450.0).with_width(80.0),
            custom("custom4", "Popular System", CustomVariant::Purple, 130.0, 510.0)
                .with_width(140.0),
        ],
        vec![
            edge("e1-2", "start", "decision1"),
            edge("e2-3", "decision1", "yes1"),
            edge("e2-4", "decision1", "no1"),
            edge("e3-5", "yes1", "process1"),
            edge("e4-6", "no1", "process2"),
            edge("e6-7", "process2", "exit1"),
            edge("e5-8", "process1", "custom1"),
            edge("e8-9", "custom1", "custom2"),
            edge("e9-10", "custom2", "custom3"),
            edge("e10-11", "custom3", "custom4"),
        ],
    )
}

fn decision_tree() -> Diagram {
    build(
        vec![
            decision("ready", "Ready to ship?", 250.0, 0.0),
            decision("tests", "Tests passing?", 120.0, 140.0),
            custom("wait", "Keep building", CustomVariant::Dark, 380.0, 140.0).with_width(120.0),
            process("deploy", "Deploy", 40.0, 280.0),
            process("fix", "Fix tests", 200.0, 280.0),
        ],
        vec![
            edge("e-ready-tests", "ready", "tests").with_label("Yes"),
            edge("e-ready-wait", "ready", "wait").with_label("No"),
            edge("e-tests-deploy", "tests", "deploy").with_label("Yes"),
            edge("e-tests-fix", "tests", "fix").with_label("No"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_catalog_entry_loads() {
        for info in template_catalog() {
            let diagram = load_template(info.name).unwrap();
            assert!(!diagram.is_empty(), "{} is empty", info.name);
            assert!(diagram.validate().is_ok(), "{} is invalid", info.name);
        }
    }

    #[test]
    fn simple_process_shape() {
        let d = load_template("simpleProcess").unwrap();
        assert_eq!(d.nodes.len(), 6);
        assert_eq!(d.edges.len(), 6);
        let ids: Vec<&str> = d.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["start", "input", "validate", "process", "error", "end"]
        );
    }

    #[test]
    fn user_flow_matches_default_chart() {
        let d = load_template("userFlow").unwrap();
        assert_eq!(d.nodes.len(), 11);
        assert_eq!(d.edges.len(), 10);
        let p1 = d.node(NodeId::intern("process1")).unwrap();
        assert_eq!(p1.kind, NodeKind::Process { flags: true });
        assert_eq!(p1.style.width, Some(180.0));
    }

    #[test]
    fn loaded_copy_is_independent() {
        let mut d = load_template("simpleProcess").unwrap();
        d.nodes[0].label = "Changed".into();
        d.edges.clear();

        let fresh = load_template("simpleProcess").unwrap();
        assert_eq!(fresh.nodes[0].label, "Start");
        assert_eq!(fresh.edges.len(), 6);
    }

    #[test]
    fn unknown_template_errors() {
        assert!(matches!(
            load_template("gantt"),
            Err(DiagramError::UnknownTemplate(_))
        ));
    }
}
