//! Properties panel: read view and field updates.
//!
//! The panel shows whichever entity is selected. Every edit names exactly
//! one attribute; applying it yields a new node or edge value with only that
//! attribute replaced. Kind-specific fields are checked against the node's
//! kind, so a `flags` edit on a decision node is refused instead of silently
//! stored.

use crate::selection::Selection;
use fc_core::image::is_image_data_uri;
use fc_core::{Color, CustomVariant, Diagram, Edge, EdgePreset, Node, NodeId, NodeKind, NodeType};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    #[error("unknown property `{0}`")]
    UnknownField(String),

    #[error("invalid value `{value}` for `{field}`")]
    InvalidValue { field: &'static str, value: String },

    #[error("`{field}` does not apply to {node_type} nodes")]
    NotApplicable {
        field: &'static str,
        node_type: NodeType,
    },
}

// ─── Node fields ─────────────────────────────────────────────────────────

/// One editable node attribute with its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeField {
    Label(String),
    /// `process` only.
    Flags(bool),
    /// `custom` only.
    Variant(CustomVariant),
    /// `image` only.
    ImageUrl(String),
    Width(Option<f32>),
    Height(Option<f32>),
    Background(Option<Color>),
}

impl NodeField {
    /// Parse a panel input by its field key (`label`, `flags`, `variant`,
    /// `imageUrl`, `width`, `height`, `background`). An empty value clears
    /// optional style fields.
    pub fn parse(key: &str, value: &str) -> Result<Self, PropertyError> {
        let field = match key {
            "label" => NodeField::Label(value.to_string()),
            "flags" => NodeField::Flags(parse_bool("flags", value)?),
            "variant" => NodeField::Variant(
                value
                    .parse()
                    .map_err(|_| invalid("variant", value))?,
            ),
            "imageUrl" => {
                if !is_image_data_uri(value) {
                    return Err(invalid("imageUrl", value));
                }
                NodeField::ImageUrl(value.to_string())
            }
            "width" => NodeField::Width(parse_length("width", value)?),
            "height" => NodeField::Height(parse_length("height", value)?),
            "background" => NodeField::Background(parse_color("background", value)?),
            other => return Err(PropertyError::UnknownField(other.to_string())),
        };
        Ok(field)
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeField::Label(_) => "label",
            NodeField::Flags(_) => "flags",
            NodeField::Variant(_) => "variant",
            NodeField::ImageUrl(_) => "imageUrl",
            NodeField::Width(_) => "width",
            NodeField::Height(_) => "height",
            NodeField::Background(_) => "background",
        }
    }

    /// A copy of `node` with this one attribute replaced.
    pub fn apply(self, node: &Node) -> Result<Node, PropertyError> {
        let name = self.name();
        let mut next = node.clone();
        match (self, &mut next.kind) {
            (NodeField::Label(label), _) => next.label = label,
            (NodeField::Flags(v), NodeKind::Process { flags }) => *flags = v,
            (NodeField::Variant(v), NodeKind::Custom { variant }) => *variant = v,
            (NodeField::ImageUrl(v), NodeKind::Image { image_url }) => *image_url = v,
            (NodeField::Width(v), _) => next.style.width = v,
            (NodeField::Height(v), _) => next.style.height = v,
            (NodeField::Background(v), _) => next.style.background = v,
            (NodeField::Flags(_) | NodeField::Variant(_) | NodeField::ImageUrl(_), kind) => {
                return Err(PropertyError::NotApplicable {
                    field: name,
                    node_type: kind.node_type(),
                });
            }
        }
        Ok(next)
    }
}

// ─── Edge fields ─────────────────────────────────────────────────────────

/// One editable edge attribute with its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeField {
    Label(Option<String>),
    Stroke(Color),
    Dasharray(Option<String>),
    StrokeWidth(Option<f32>),
    Animated(bool),
}

impl EdgeField {
    /// Parse a panel input by its field key (`label`, `stroke`,
    /// `strokeDasharray`, `strokeWidth`, `animated`).
    pub fn parse(key: &str, value: &str) -> Result<Self, PropertyError> {
        let field = match key {
            "label" => EdgeField::Label((!value.is_empty()).then(|| value.to_string())),
            "stroke" => EdgeField::Stroke(
                Color::from_hex(value).ok_or_else(|| invalid("stroke", value))?,
            ),
            "strokeDasharray" => EdgeField::Dasharray(parse_dasharray(value)?),
            "strokeWidth" => EdgeField::StrokeWidth(parse_length("strokeWidth", value)?),
            "animated" => EdgeField::Animated(parse_bool("animated", value)?),
            other => return Err(PropertyError::UnknownField(other.to_string())),
        };
        Ok(field)
    }

    /// A copy of `edge` with this one attribute replaced.
    pub fn apply(self, edge: &Edge) -> Edge {
        let mut next = edge.clone();
        match self {
            EdgeField::Label(v) => next.label = v,
            EdgeField::Stroke(v) => next.style.stroke = v,
            EdgeField::Dasharray(v) => next.style.stroke_dasharray = v,
            EdgeField::StrokeWidth(v) => next.style.stroke_width = v,
            EdgeField::Animated(v) => next.animated = v,
        }
        next
    }
}

// ─── Value parsing ───────────────────────────────────────────────────────

fn invalid(field: &'static str, value: &str) -> PropertyError {
    PropertyError::InvalidValue {
        field,
        value: value.to_string(),
    }
}

fn parse_bool(field: &'static str, value: &str) -> Result<bool, PropertyError> {
    match value {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" | "" => Ok(false),
        _ => Err(invalid(field, value)),
    }
}

/// Positive finite length, or `None` for an empty input.
fn parse_length(field: &'static str, value: &str) -> Result<Option<f32>, PropertyError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<f32>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(Some(v)),
        _ => Err(invalid(field, value)),
    }
}

fn parse_color(field: &'static str, value: &str) -> Result<Option<Color>, PropertyError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    Color::from_hex(value.trim())
        .map(Some)
        .ok_or_else(|| invalid(field, value))
}

/// SVG dash list: non-negative numbers separated by commas or spaces.
fn parse_dasharray(value: &str) -> Result<Option<String>, PropertyError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let valid = value
        .split([',', ' '])
        .filter(|part| !part.is_empty())
        .all(|part| part.parse::<f32>().is_ok_and(|v| v.is_finite() && v >= 0.0));
    if valid {
        Ok(Some(value.to_string()))
    } else {
        Err(invalid("strokeDasharray", value))
    }
}

// ─── Panel view ──────────────────────────────────────────────────────────

/// What the properties panel displays for the current selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "entity", rename_all = "lowercase")]
pub enum PanelView {
    Node(NodePanel),
    Edge(EdgePanel),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePanel {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub label: String,
    /// Position, rounded for display. Read-only in the panel.
    pub x: i32,
    pub y: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<CustomVariant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub background: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgePanel {
    pub id: NodeId,
    pub source: NodeId,
    pub target: NodeId,
    pub label: Option<String>,
    pub stroke: Color,
    pub stroke_dasharray: Option<String>,
    pub stroke_width: Option<f32>,
    pub animated: bool,
    /// The named preset the edge currently matches, if any.
    pub preset: Option<EdgePreset>,
}

impl PanelView {
    /// The panel for `selection`, or `None` when the panel is hidden.
    pub fn of(selection: Selection, diagram: &Diagram) -> Option<Self> {
        match selection {
            Selection::None => None,
            Selection::Node(id) => diagram.node(id).map(|n| PanelView::Node(NodePanel::from(n))),
            Selection::Edge(id) => diagram.edge(id).map(|e| PanelView::Edge(EdgePanel::from(e))),
        }
    }
}

impl From<&Node> for NodePanel {
    fn from(node: &Node) -> Self {
        let (flags, variant, image_url) = match &node.kind {
            NodeKind::Process { flags } => (Some(*flags), None, None),
            NodeKind::Decision => (None, None, None),
            NodeKind::Custom { variant } => (None, Some(*variant), None),
            NodeKind::Image { image_url } => (None, None, Some(image_url.clone())),
        };
        Self {
            id: node.id,
            node_type: node.node_type(),
            label: node.label.clone(),
            x: node.position.x.round() as i32,
            y: node.position.y.round() as i32,
            flags,
            variant,
            image_url,
            width: node.style.width,
            height: node.style.height,
            background: node.style.background,
        }
    }
}

impl From<&Edge> for EdgePanel {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id,
            source: edge.source,
            target: edge.target,
            label: edge.label.clone(),
            stroke: edge.style.stroke,
            stroke_dasharray: edge.style.stroke_dasharray.clone(),
            stroke_width: edge.style.stroke_width,
            animated: edge.animated,
            preset: EdgePreset::matching(edge),
        }
    }
}
