//! Editor tuning knobs.
//!
//! Everything has a default, so a host can deserialize a partial JSON
//! document (or none at all) and get a working editor.

use serde::{Deserialize, Serialize};

/// Configuration shared by the viewport, router and interaction controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Lower zoom bound (default: 0.1).
    pub min_scale: f32,
    /// Upper zoom bound (default: 3.0).
    pub max_scale: f32,
    /// Per-tick zoom factor (default: 1.1).
    pub zoom_step: f32,
    /// Cap on how far an edge bows away from the straight line (default: 100.0).
    pub max_bow_offset: f32,
    /// Label committed when an edit leaves the text blank.
    pub placeholder_label: String,
    /// Label given to children created by the add button.
    pub new_node_label: String,
    /// Screen distance within which a pointer counts as over an edge.
    pub edge_hit_distance: f32,
    /// Segments used to approximate an edge curve for hit testing.
    pub edge_hit_samples: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 3.0,
            zoom_step: 1.1,
            max_bow_offset: 100.0,
            placeholder_label: "Untitled Node".into(),
            new_node_label: "New Idea".into(),
            edge_hit_distance: 6.0,
            edge_hit_samples: 20,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Clamp a scale into `[min_scale, max_scale]`.
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        // f32::clamp panics on an inverted range; a bad config must not.
        scale.max(self.min_scale).min(self.max_scale)
    }
}
