//! Command-line interface for the `fc` utility.
//!
//! Lists and exports the built-in templates, and inspects or lints export
//! documents written by the editor.

use chrono::Utc;
use clap::{Parser, Subcommand};
use fc_core::{
    Diagram, DiagramError, EdgePreset, ExportDocument, LintDiagnostic, LintSeverity, NodeType,
    lint_diagram, load_template, parse_document, template_catalog,
};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// fc - Flow Canvas diagram tool
#[derive(Parser)]
#[command(name = "fc")]
#[command(about = "Work with Flow Canvas templates and export documents")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the built-in templates
    Templates,

    /// Write a template as an export document
    Export {
        /// Template name, e.g. `simpleProcess`
        template: String,

        /// Output file or directory. Prints to stdout when omitted.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Report structural problems in a document
    Lint {
        /// Path to an export document
        file: PathBuf,
    },

    /// Summarize a document
    Info {
        /// Path to an export document
        file: PathBuf,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Diagram(#[from] DiagramError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} error(s) found")]
    LintFailed(usize),
}

impl Cli {
    /// The `env_logger` filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn run(self) -> Result<(), CliError> {
        match self.command {
            Commands::Templates => {
                print!("{}", render_templates());
                Ok(())
            }
            Commands::Export { template, out } => export(&template, out.as_deref()),
            Commands::Lint { file } => {
                let diagram: Diagram = serde_json::from_str(&read(&file)?)?;
                let diagnostics = lint_diagram(&diagram);
                print!("{}", render_lint(&file.display().to_string(), &diagnostics));
                let errors = diagnostics
                    .iter()
                    .filter(|d| d.severity == LintSeverity::Error)
                    .count();
                if errors > 0 {
                    return Err(CliError::LintFailed(errors));
                }
                Ok(())
            }
            Commands::Info { file } => {
                let diagram = parse_document(&read(&file)?)?;
                print!("{}", render_info(&diagram));
                Ok(())
            }
        }
    }
}

// ─── Commands ────────────────────────────────────────────────────────────

fn export(template: &str, out: Option<&Path>) -> Result<(), CliError> {
    let diagram = load_template(template)?;
    let file = ExportDocument::new(&diagram, Utc::now())?.into_file()?;

    let Some(out) = out else {
        println!("{}", file.contents);
        return Ok(());
    };
    let path = if out.is_dir() {
        out.join(&file.file_name)
    } else {
        out.to_path_buf()
    };
    fs::write(&path, &file.contents).map_err(|source| CliError::Io {
        path: path.clone(),
        source,
    })?;
    log::info!("wrote {}", path.display());
    eprintln!("Wrote {}", path.display());
    Ok(())
}

fn read(path: &Path) -> Result<String, CliError> {
    log::debug!("reading {}", path.display());
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ─── Rendering ───────────────────────────────────────────────────────────

pub fn render_templates() -> String {
    let mut out = String::new();
    for info in template_catalog() {
        let _ = writeln!(
            out,
            "{:<14} {:<16} [{}] {}",
            info.name, info.title, info.category, info.description
        );
    }
    out
}

pub fn render_lint(source: &str, diagnostics: &[LintDiagnostic]) -> String {
    if diagnostics.is_empty() {
        return format!("{source}: no problems\n");
    }
    let mut out = String::new();
    for d in diagnostics {
        let _ = writeln!(
            out,
            "{source}: {}[{}] {}: {}",
            severity_name(d.severity),
            d.rule,
            d.target,
            d.message
        );
    }
    out
}

pub fn render_info(diagram: &Diagram) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "nodes: {}", diagram.nodes.len());
    for node_type in [
        NodeType::Process,
        NodeType::Decision,
        NodeType::Custom,
        NodeType::Image,
    ] {
        let count = diagram
            .nodes
            .iter()
            .filter(|n| n.node_type() == node_type)
            .count();
        if count > 0 {
            let _ = writeln!(out, "  {node_type}: {count}");
        }
    }

    let _ = writeln!(out, "edges: {}", diagram.edges.len());
    for preset in EdgePreset::ALL {
        let count = diagram
            .edges
            .iter()
            .filter(|e| EdgePreset::matching(e) == Some(preset))
            .count();
        if count > 0 {
            let _ = writeln!(out, "  {}: {count}", preset.as_str());
        }
    }
    let custom = diagram
        .edges
        .iter()
        .filter(|e| EdgePreset::matching(e).is_none())
        .count();
    if custom > 0 {
        let _ = writeln!(out, "  custom: {custom}");
    }
    out
}

fn severity_name(severity: LintSeverity) -> &'static str {
    match severity {
        LintSeverity::Error => "error",
        LintSeverity::Warning => "warning",
        LintSeverity::Info => "info",
    }
}
