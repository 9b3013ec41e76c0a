// Data-driven explorer configuration.
//
// All tunable parameters of the starfield and the planet pipeline live in
// `StarseedConfig`, supplied by the presentation layer as JSON (or built in
// code). Every field has a documented default and the struct is
// `#[serde(default)]`, so a partial JSON object such as `{"world_seed": 7}`
// is a valid config: unspecified entries fall back to `Default`.
//
// The core never re-validates device state (viewport size, raw wheel deltas);
// the presentation layer clamps those. Values that would break generation
// preconditions (zoom bounds, stride) are asserted where they are consumed,
// see `viewport.rs` and `texture.rs`.
//
// See also: `explorer.rs` which owns a `StarseedConfig`, `world.rs` for the
// tile parameters, `picking.rs` for the thresholds.
//
// **Critical constraint: determinism.** `world_seed`, `tile_size` and
// `stars_per_tile` fully determine the star layout. Two explorers with equal
// values for those three fields see identical worlds.

use serde::{Deserialize, Serialize};

use crate::viewport::ZoomBounds;

/// Flat set of tunables for the explorer and planet synthesis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarseedConfig {
    /// Seed of the whole infinite world.
    pub world_seed: u32,
    /// Side length of a world tile, in world units.
    pub tile_size: f64,
    /// Number of stars generated inside every tile.
    pub stars_per_tile: u32,
    /// Drawn star radius in screen pixels (presentation hint only).
    pub star_radius: f64,
    /// Maximum screen distance (px) for a click to select the nearest star.
    pub click_threshold: f64,
    /// Maximum screen distance (px) for hovering to highlight a star.
    /// Larger than `click_threshold`.
    pub hover_threshold: f64,
    /// Cumulative pointer travel (px) after which a press becomes a drag.
    pub drag_threshold: f64,
    /// Smallest allowed zoom factor.
    pub min_zoom: f64,
    /// Largest allowed zoom factor.
    pub max_zoom: f64,
    /// Relative scale change per zoom step (`scale * (1 + speed)`).
    pub zoom_speed: f64,
    /// Zoom factor of a freshly created explorer.
    pub initial_zoom: f64,
    /// Side length of the pixel block filled from one texture sample (1–4).
    pub texture_stride: u32,
    /// Disc radius as a fraction of the square disc canvas size. Small enough
    /// that rings (up to 1.64 radii wide) stay mostly on canvas.
    pub disc_radius_fraction: f64,
    /// Maximum number of tiles kept by the explorer's tile cache.
    pub tile_cache_capacity: usize,
}

impl Default for StarseedConfig {
    fn default() -> Self {
        Self {
            world_seed: 123_456_789,
            tile_size: 512.0,
            stars_per_tile: 60,
            star_radius: 1.2,
            click_threshold: 8.0,
            hover_threshold: 14.0,
            drag_threshold: 4.0,
            min_zoom: 0.25,
            max_zoom: 8.0,
            zoom_speed: 0.1,
            initial_zoom: 1.0,
            texture_stride: 2,
            disc_radius_fraction: 0.3,
            tile_cache_capacity: 256,
        }
    }
}

impl StarseedConfig {
    /// Parse a config from JSON. Missing keys take their default values.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON, e.g. to seed a settings file.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Zoom bounds and speed as one value for the viewport.
    pub fn zoom_bounds(&self) -> ZoomBounds {
        ZoomBounds::new(self.min_zoom, self.max_zoom, self.zoom_speed)
    }
}
