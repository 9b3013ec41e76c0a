// Core types shared across the crate.
//
// Defines the two coordinate spaces (`ScreenPoint` in pixels, `WorldPoint` in
// world units), the viewport size, tile coordinates, and the `Star` entity.
// Keeping screen and world points as distinct types makes it a compile error
// to feed a pixel position where a world position is expected.
//
// **Critical constraint: determinism.** `Star` values are produced only by the
// tile generator in `world.rs`; nothing else constructs them outside tests.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A position on screen, in pixels, origin at the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in pixels.
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A position on the infinite world plane, in world units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the presentation surface in pixels. The presentation layer
/// guarantees non-negative values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Integer coordinates of a world tile. Tile `(tx, ty)` covers
/// `[tx * size, (tx + 1) * size) x [ty * size, (ty + 1) * size)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub tx: i32,
    pub ty: i32,
}

impl TileCoord {
    pub const fn new(tx: i32, ty: i32) -> Self {
        Self { tx, ty }
    }

    /// The tile containing a world point.
    pub fn containing(point: WorldPoint, tile_size: f64) -> Self {
        Self {
            tx: (point.x / tile_size).floor() as i32,
            ty: (point.y / tile_size).floor() as i32,
        }
    }

    /// World position of the tile's top-left corner.
    pub fn origin(self, tile_size: f64) -> WorldPoint {
        WorldPoint::new(self.tx as f64 * tile_size, self.ty as f64 * tile_size)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.tx, self.ty)
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A star on the world plane. `(tile, id)` identifies it globally; `seed`
/// drives the planet generated when it is selected.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Star {
    /// Index within its tile, `0..stars_per_tile`.
    pub id: u32,
    pub tile: TileCoord,
    pub x: f64,
    pub y: f64,
    pub seed: u32,
}

impl Star {
    pub fn position(&self) -> WorldPoint {
        WorldPoint::new(self.x, self.y)
    }

    /// Whether two stars are the same entity (same tile and id).
    pub fn same_star(&self, other: &Star) -> bool {
        self.tile == other.tile && self.id == other.id
    }
}
