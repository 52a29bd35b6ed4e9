//! Export documents and share links.
//!
//! An export document is `{ "nodes": [...], "edges": [...], "timestamp": "..." }`
//! written to `flowchart_<YYYY-MM-DD>.json`. Nothing here performs I/O;
//! the host triggers the download and writes the clipboard.

use crate::diagram::Diagram;
use crate::error::DiagramError;
use crate::model::{Edge, Node};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Path of the editor route a shared link points at.
const SHARE_PATH: &str = "/editor?shared=true";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(serialize_with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

/// A ready-to-download export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// Same layout as JavaScript's `Date.prototype.toISOString`.
fn iso_millis<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl ExportDocument {
    /// Snapshot `diagram` at `timestamp`. Empty diagrams are refused.
    pub fn new(diagram: &Diagram, timestamp: DateTime<Utc>) -> Result<Self, DiagramError> {
        if diagram.nodes.is_empty() {
            return Err(DiagramError::EmptyDiagram);
        }
        Ok(Self {
            nodes: diagram.nodes.clone(),
            edges: diagram.edges.clone(),
            timestamp,
        })
    }

    /// `flowchart_<YYYY-MM-DD>.json`
    pub fn file_name(&self) -> String {
        format!("flowchart_{}.json", self.timestamp.format("%Y-%m-%d"))
    }

    pub fn to_json(&self) -> Result<String, DiagramError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn into_file(self) -> Result<ExportFile, DiagramError> {
        Ok(ExportFile {
            file_name: self.file_name(),
            contents: self.to_json()?,
        })
    }

    /// The document's contents as a validated diagram.
    pub fn into_diagram(self) -> Result<Diagram, DiagramError> {
        Diagram::from_parts(self.nodes, self.edges)
    }
}

/// Parse an export document back into a diagram.
///
/// The timestamp is optional on input so hand-written files load too.
pub fn parse_document(json: &str) -> Result<Diagram, DiagramError> {
    #[derive(Deserialize)]
    struct Incoming {
        nodes: Vec<Node>,
        #[serde(default)]
        edges: Vec<Edge>,
    }

    let incoming: Incoming = serde_json::from_str(json)?;
    Diagram::from_parts(incoming.nodes, incoming.edges)
}

/// `<origin>/editor?shared=true`. The link is a placeholder; nothing
/// server-side resolves it.
pub fn share_url(origin: &str) -> String {
    format!("{}{SHARE_PATH}", origin.trim_end_matches('/'))
}
