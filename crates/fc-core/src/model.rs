//! Core data model for FC flowcharts.
//!
//! A diagram is a flat list of nodes plus a list of directed edges between
//! them. Node kinds form a closed set (`process`, `decision`, `custom`,
//! `image`); each kind carries its own data. The JSON shape of nodes and
//! edges matches what the host canvas library consumes, so records pass
//! through the WASM bridge and export documents unchanged.

use crate::id::NodeId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let channels: Vec<u8> = match bytes.len() {
            3 | 4 => bytes
                .iter()
                .map(|&c| hex_val(c).map(|v| v * 17))
                .collect::<Option<_>>()?,
            6 | 8 => bytes
                .chunks(2)
                .map(|pair| Some(hex_val(pair[0])? << 4 | hex_val(pair[1])?))
                .collect::<Option<_>>()?,
            _ => return None,
        };
        let a = channels.get(3).copied().unwrap_or(255);
        Some(Self::rgba(
            channels[0] as f32 / 255.0,
            channels[1] as f32 / 255.0,
            channels[2] as f32 / 255.0,
            a as f32 / 255.0,
        ))
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let r = (self.r * 255.0).round() as u8;
        let g = (self.g * 255.0).round() as u8;
        let b = (self.b * 255.0).round() as u8;
        let a = (self.a * 255.0).round() as u8;
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color `{s}`")))
    }
}

/// Default stroke for new connections.
pub const EDGE_GRAY: Color = Color::rgba(184.0 / 255.0, 184.0 / 255.0, 184.0 / 255.0, 1.0);

// ─── Geometry ────────────────────────────────────────────────────────────

/// Canvas-space position of a node's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// This position moved by `(dx, dy)`.
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Color scheme of a `custom` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomVariant {
    #[default]
    Default,
    Purple,
    Dark,
}

impl FromStr for CustomVariant {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "default" => Ok(Self::Default),
            "purple" => Ok(Self::Purple),
            "dark" => Ok(Self::Dark),
            _ => Err(()),
        }
    }
}

/// The node kinds, each with its kind-specific data.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Rectangular step. `flags` shows the country-flag strip.
    Process { flags: bool },
    /// Diamond branch point.
    Decision,
    /// Free-form box with a color variant.
    Custom { variant: CustomVariant },
    /// Embedded picture, usually an inline `data:` URI.
    Image { image_url: String },
}

/// Tag-only view of [`NodeKind`], used where a kind is chosen by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Process,
    Decision,
    Custom,
    Image,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Process => "process",
            NodeType::Decision => "decision",
            NodeType::Custom => "custom",
            NodeType::Image => "image",
        }
    }
}

impl FromStr for NodeType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "process" => Ok(Self::Process),
            "decision" => Ok(Self::Decision),
            "custom" => Ok(Self::Custom),
            "image" => Ok(Self::Image),
            _ => Err(()),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NodeKind {
    /// The tag of this kind.
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Process { .. } => NodeType::Process,
            NodeKind::Decision => NodeType::Decision,
            NodeKind::Custom { .. } => NodeType::Custom,
            NodeKind::Image { .. } => NodeType::Image,
        }
    }
}

/// Inline style overrides. Unset fields fall back to the renderer's
/// defaults for the node kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
}

impl NodeStyle {
    /// True when no override is set; the `style` key is then omitted.
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.background.is_none()
    }
}

/// A single shape in the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "NodeRecord", try_from = "NodeRecord")]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Position,
    pub label: String,
    pub style: NodeStyle,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, position: Position, label: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            position,
            label: label.into(),
            style: NodeStyle::default(),
        }
    }

    /// A freshly added node as the toolbar creates it.
    pub fn with_defaults(id: NodeId, node_type: NodeType, position: Position) -> Self {
        let (kind, label) = match node_type {
            NodeType::Process => (NodeKind::Process { flags: false }, "New Node"),
            NodeType::Decision => (NodeKind::Decision, "New Decision"),
            NodeType::Custom => (
                NodeKind::Custom {
                    variant: CustomVariant::Purple,
                },
                "New Node",
            ),
            NodeType::Image => (
                NodeKind::Image {
                    image_url: String::new(),
                },
                "Image",
            ),
        };
        let mut node = Self::new(id, kind, position, label);
        if node_type == NodeType::Custom {
            node.style.width = Some(100.0);
        }
        node
    }

    /// Shorthand for `self.kind.node_type()`.
    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.style.width = Some(width);
        self
    }
}

/// Wire shape of a node: `{ id, type, position, data: {...}, style }`.
#[derive(Serialize, Deserialize)]
struct NodeRecord {
    id: NodeId,
    #[serde(rename = "type")]
    node_type: NodeType,
    position: Position,
    data: NodeData,
    #[serde(default, skip_serializing_if = "NodeStyle::is_empty")]
    style: NodeStyle,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeData {
    #[serde(default)]
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flags: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    variant: Option<CustomVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

impl From<Node> for NodeRecord {
    fn from(node: Node) -> Self {
        let node_type = node.kind.node_type();
        let mut data = NodeData {
            label: node.label,
            flags: None,
            variant: None,
            image_url: None,
        };
        match node.kind {
            NodeKind::Process { flags } => data.flags = flags.then_some(true),
            NodeKind::Decision => {}
            NodeKind::Custom { variant } => {
                data.variant = (variant != CustomVariant::Default).then_some(variant)
            }
            NodeKind::Image { image_url } => data.image_url = Some(image_url),
        }
        NodeRecord {
            id: node.id,
            node_type,
            position: node.position,
            data,
            style: node.style,
        }
    }
}

impl TryFrom<NodeRecord> for Node {
    type Error = String;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        let data = record.data;
        let kind = match record.node_type {
            NodeType::Process => NodeKind::Process {
                flags: data.flags.unwrap_or(false),
            },
            NodeType::Decision => NodeKind::Decision,
            NodeType::Custom => NodeKind::Custom {
                variant: data.variant.unwrap_or_default(),
            },
            NodeType::Image => NodeKind::Image {
                image_url: data
                    .image_url
                    .ok_or_else(|| format!("image node `{}` has no imageUrl", record.id))?,
            },
        };
        Ok(Node {
            id: record.id,
            kind,
            position: record.position,
            label: data.label,
            style: record.style,
        })
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// Visual attributes of an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: Color,
    /// SVG dash pattern, e.g. `"5,5"`. `None` draws a solid line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            stroke: EDGE_GRAY,
            stroke_dasharray: None,
            stroke_width: None,
        }
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: NodeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub style: EdgeStyle,
    #[serde(default)]
    pub animated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    /// A plain edge in the default gray style.
    pub fn new(id: NodeId, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            source,
            target,
            style: EdgeStyle::default(),
            animated: false,
            label: None,
        }
    }

    /// Edge between `source` and `target` with the conventional `e<src>-<dst>` id.
    pub fn between(source: &str, target: &str) -> Self {
        Self::new(
            NodeId::intern(&format!("e{source}-{target}")),
            NodeId::intern(source),
            NodeId::intern(target),
        )
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether this edge touches `node` at either end.
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }

    /// Replace the visual attributes with a preset's, atomically.
    pub fn apply_preset(&mut self, preset: EdgePreset) {
        let (style, animated) = preset.attributes();
        self.style = style;
        self.animated = animated;
    }
}

/// Named edge looks offered by the properties panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePreset {
    Default,
    Dashed,
    Dotted,
    Thick,
    Animated,
    Highlight,
}

impl EdgePreset {
    pub const ALL: [EdgePreset; 6] = [
        EdgePreset::Default,
        EdgePreset::Dashed,
        EdgePreset::Dotted,
        EdgePreset::Thick,
        EdgePreset::Animated,
        EdgePreset::Highlight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EdgePreset::Default => "default",
            EdgePreset::Dashed => "dashed",
            EdgePreset::Dotted => "dotted",
            EdgePreset::Thick => "thick",
            EdgePreset::Animated => "animated",
            EdgePreset::Highlight => "highlight",
        }
    }

    /// The style and animated flag this preset stands for.
    pub fn attributes(self) -> (EdgeStyle, bool) {
        let dashed = |pattern: &str| EdgeStyle {
            stroke_dasharray: Some(pattern.to_string()),
            ..EdgeStyle::default()
        };
        match self {
            EdgePreset::Default => (EdgeStyle::default(), false),
            EdgePreset::Dashed => (dashed("5,5"), false),
            EdgePreset::Dotted => (dashed("2,2"), false),
            EdgePreset::Thick => (
                EdgeStyle {
                    stroke: Color::rgba(85.0 / 255.0, 85.0 / 255.0, 85.0 / 255.0, 1.0),
                    stroke_dasharray: None,
                    stroke_width: Some(3.0),
                },
                false,
            ),
            EdgePreset::Animated => (EdgeStyle::default(), true),
            EdgePreset::Highlight => (
                EdgeStyle {
                    stroke: Color::rgba(59.0 / 255.0, 130.0 / 255.0, 246.0 / 255.0, 1.0),
                    stroke_dasharray: None,
                    stroke_width: Some(2.0),
                },
                false,
            ),
        }
    }

    /// The preset whose attributes `edge` currently carries, if any.
    pub fn matching(edge: &Edge) -> Option<EdgePreset> {
        Self::ALL.into_iter().find(|preset| {
            let (style, animated) = preset.attributes();
            edge.style == style && edge.animated == animated
        })
    }
}

impl FromStr for EdgePreset {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str() == s)
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hex_parse_and_emit() {
        let c = Color::from_hex("#b8b8b8").unwrap();
        assert_eq!(c.to_hex(), "#B8B8B8");
        assert_eq!(c, EDGE_GRAY);

        let short = Color::from_hex("f00").unwrap();
        assert_eq!(short.to_hex(), "#FF0000");

        let translucent = Color::from_hex("#00FF0080").unwrap();
        assert_eq!(translucent.to_hex(), "#00FF0080");

        assert!(Color::from_hex("#12").is_none());
        assert!(Color::from_hex("#GGGGGG").is_none());
    }

    #[test]
    fn node_wire_shape() {
        let node = Node::new(
            NodeId::intern("process1"),
            NodeKind::Process { flags: true },
            Position::new(130.0, 250.0),
            "Internationalized",
        )
        .with_width(180.0);

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "process1",
                "type": "process",
                "position": { "x": 130.0, "y": 250.0 },
                "data": { "label": "Internationalized", "flags": true },
                "style": { "width": 180.0 }
            })
        );

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn custom_default_variant_is_omitted() {
        let node = Node::new(
            NodeId::intern("plain"),
            NodeKind::Custom {
                variant: CustomVariant::Default,
            },
            Position::default(),
            "Plain",
        );
        let json = serde_json::to_value(&node).unwrap();
        assert!(json["data"].get("variant").is_none());
        assert!(json.get("style").is_none());
    }

    #[test]
    fn image_node_requires_url() {
        let json = serde_json::json!({
            "id": "img",
            "type": "image",
            "position": { "x": 0.0, "y": 0.0 },
            "data": { "label": "photo.png" }
        });
        assert!(serde_json::from_value::<Node>(json).is_err());
    }

    #[test]
    fn image_node_wire_shape() {
        let node = Node::new(
            NodeId::intern("photo"),
            NodeKind::Image {
                image_url: "data:image/png;base64,iVBORw0KGgo".to_string(),
            },
            Position::new(5.0, 6.0),
            "photo.png",
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["data"]["imageUrl"], "data:image/png;base64,iVBORw0KGgo");

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn unknown_node_type_is_rejected() {
        let json = serde_json::json!({
            "id": "x",
            "type": "cloud",
            "position": { "x": 0.0, "y": 0.0 },
            "data": { "label": "?" }
        });
        assert!(serde_json::from_value::<Node>(json).is_err());
    }

    #[test]
    fn edge_wire_shape() {
        let mut edge = Edge::between("start", "decision1");
        edge.apply_preset(EdgePreset::Dashed);
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "estart-decision1",
                "source": "start",
                "target": "decision1",
                "style": { "stroke": "#B8B8B8", "strokeDasharray": "5,5" },
                "animated": false
            })
        );
    }

    #[test]
    fn preset_matching() {
        let mut edge = Edge::between("a", "b");
        assert_eq!(EdgePreset::matching(&edge), Some(EdgePreset::Default));

        edge.apply_preset(EdgePreset::Animated);
        assert!(edge.animated);
        assert_eq!(EdgePreset::matching(&edge), Some(EdgePreset::Animated));

        edge.apply_preset(EdgePreset::Thick);
        assert!(!edge.animated, "preset replaces the animated flag too");
        assert_eq!(edge.style.stroke_width, Some(3.0));

        edge.style.stroke_width = Some(7.0);
        assert_eq!(EdgePreset::matching(&edge), None);
    }

    #[test]
    fn toolbar_defaults() {
        let id = NodeId::intern("n");
        let custom = Node::with_defaults(id, NodeType::Custom, Position::new(250.0, 250.0));
        assert_eq!(
            custom.kind,
            NodeKind::Custom {
                variant: CustomVariant::Purple
            }
        );
        assert_eq!(custom.style.width, Some(100.0));

        let decision = Node::with_defaults(id, NodeType::Decision, Position::default());
        assert_eq!(decision.label, "New Decision");
        assert!(decision.style.is_empty());
    }
}
