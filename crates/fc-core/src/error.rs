//! Error type shared by every fallible operation on a diagram.

use crate::id::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("unknown node `{0}`")]
    UnknownNode(NodeId),

    #[error("unknown edge `{0}`")]
    UnknownEdge(NodeId),

    #[error("id `{0}` is already used in this diagram")]
    DuplicateId(NodeId),

    #[error("edge `{edge}` references missing node `{node}`")]
    DanglingEdge { edge: NodeId, node: NodeId },

    #[error("unknown template `{0}`")]
    UnknownTemplate(String),

    #[error("nothing to export: the diagram is empty")]
    EmptyDiagram,

    #[error("invalid diagram document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("unsupported image content")]
    UnsupportedImage,
}
