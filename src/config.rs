use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};

use crate::error::BrushError;
use crate::nearest::SearchParams;
use crate::warp::Falloff;

/// All editor parameters in one struct.
/// Serializable (for saving presets) and adjustable at runtime
/// (for tool sliders). Missing fields in a preset take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    // -- Stroke finalizing --
    /// RDP tolerance applied to raw strokes before fitting, in scene units.
    pub simplify_tolerance: f64,
    /// Spline smoothing factor: 0 interpolates, larger gives fewer segments.
    pub smoothing: f64,

    // -- Warp brush --
    pub warp_radius: f64,
    /// Displacement fraction at the brush centre.
    pub warp_strength: f64,
    pub warp_falloff: Falloff,

    // -- Picking --
    /// Paths farther than this from the pointer are not warp targets.
    pub pick_distance: f64,
    /// Grab radius around each editing handle.
    pub handle_pick_radius: f64,
    /// Precise nearest-point search.
    pub search: SearchParams,

    // -- History --
    /// Undo steps kept. 0 disables history.
    pub undo_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            simplify_tolerance: 10.0,
            smoothing: 5.0,
            warp_radius: 100.0,
            warp_strength: 0.9,
            warp_falloff: Falloff::Cosine,
            pick_distance: 200.0,
            handle_pick_radius: 10.0,
            search: SearchParams::default(),
            undo_limit: 100,
        }
    }
}

impl EditorConfig {
    /// Read a JSON preset.
    pub fn load(path: &FsPath) -> Result<Self, BrushError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
