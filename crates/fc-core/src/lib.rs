pub mod diagram;
pub mod document;
pub mod error;
pub mod id;
pub mod image;
pub mod lint;
pub mod model;
pub mod templates;

pub use diagram::Diagram;
pub use document::{ExportDocument, ExportFile, parse_document, share_url};
pub use error::DiagramError;
pub use id::NodeId;
pub use lint::{LintDiagnostic, LintSeverity, lint_diagram};
pub use model::*;
pub use templates::{TemplateInfo, load_template, template_catalog};
