//! Editor configuration.
//!
//! Every field has a default, so a host may pass a partial JSON object:
//!
//! ```json
//! { "gridSize": 25, "snapToGrid": true }
//! ```

use mc_core::Size;
use mc_core::transform::{GRID_SIZE, SCALE_MAX, SCALE_MIN};
use serde::{Deserialize, Serialize};

/// Key under which the map snapshot is stored.
pub const DEFAULT_STORAGE_KEY: &str = "mindcraft_map_data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Snap pitch in world units.
    pub grid_size: f64,
    /// Relative scale change per wheel notch or zoom button press.
    pub zoom_step: f64,
    pub scale_min: f64,
    pub scale_max: f64,
    /// Clicks on a node this soon after its drag ended are swallowed.
    pub drag_grace_ms: u64,
    pub storage_key: String,
    /// Size given to new nodes and to stored nodes without one.
    pub node_width: f64,
    pub node_height: f64,
    /// Initial snap-to-grid toggle.
    pub snap_to_grid: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            zoom_step: 0.05,
            scale_min: SCALE_MIN,
            scale_max: SCALE_MAX,
            drag_grace_ms: 100,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            node_width: 180.0,
            node_height: 72.0,
            snap_to_grid: false,
        }
    }
}

impl EditorConfig {
    pub fn node_size(&self) -> Size {
        Size::new(self.node_width, self.node_height)
    }

    /// Parse a JSON object and repair out-of-range values.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(text).map(Self::validated)
    }

    /// Replace every unusable value with its default, logging each one.
    ///
    /// Requires finite values, `gridSize > 0`, `0 < zoomStep < 1`,
    /// `0 < scaleMin <= scaleMax` and positive node sizes.
    #[must_use]
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.grid_size) {
            log::warn!("gridSize {} must be positive, using {}", self.grid_size, defaults.grid_size);
            self.grid_size = defaults.grid_size;
        }
        if !(positive(self.zoom_step) && self.zoom_step < 1.0) {
            log::warn!("zoomStep {} must be in (0, 1), using {}", self.zoom_step, defaults.zoom_step);
            self.zoom_step = defaults.zoom_step;
        }
        if !(positive(self.scale_min) && positive(self.scale_max) && self.scale_min <= self.scale_max) {
            log::warn!(
                "scale range [{}, {}] is invalid, using [{}, {}]",
                self.scale_min,
                self.scale_max,
                defaults.scale_min,
                defaults.scale_max
            );
            self.scale_min = defaults.scale_min;
            self.scale_max = defaults.scale_max;
        }
        if !(positive(self.node_width) && positive(self.node_height)) {
            log::warn!(
                "node size {}x{} must be positive, using {}x{}",
                self.node_width,
                self.node_height,
                defaults.node_width,
                defaults.node_height
            );
            self.node_width = defaults.node_width;
            self.node_height = defaults.node_height;
        }
        self
    }

    /// Parse `text` if given, falling back to defaults on any error.
    pub fn from_json_or_default(text: Option<&str>) -> Self {
        match text.map(Self::from_json) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                log::warn!("invalid editor config, using defaults: {e}");
                Self::default()
            }
            None => Self::default(),
        }
    }
}
