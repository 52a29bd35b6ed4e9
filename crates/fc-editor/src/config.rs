//! Editor configuration.

use fc_core::Position;
use serde::{Deserialize, Serialize};

/// Tunables for an [`Editor`](crate::Editor). Missing fields in a JSON
/// config take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum undo depth, counting the initial state.
    pub history_limit: usize,
    /// Distance between a copied node and its pasted clone.
    pub paste_offset: Position,
    /// Where toolbar-added and imported nodes appear.
    pub default_position: Position,
    /// Origin used to build share links, e.g. `https://flow.example.com`.
    pub share_origin: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            paste_offset: Position::new(50.0, 50.0),
            default_position: Position::new(250.0, 250.0),
            share_origin: "http://localhost:8080".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
