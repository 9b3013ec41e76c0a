// Viewport (camera) transform between screen pixels and world units.
//
// A `ViewportState` is `{ scale, offset }`: `offset` is the world position
// under the screen's top-left corner and `scale` is pixels per world unit.
//
//   screen_to_world(p) = p / scale + offset
//   world_to_screen(w) = (w - offset) * scale
//
// The state only changes through `pan()` and the two zoom operations. Zooming
// multiplies the scale by `1 + direction * speed`, clamps it to the
// configured bounds, then moves the offset so that the world point under the
// anchor (cursor or viewport centre) stays under the anchor. Panning is
// unbounded: the world is infinite and the offset is never clamped.
//
// `visible_tile_range()` returns the inclusive tile range covering the
// viewport padded by one tile on every side, so stars near an edge are drawn
// (and hit-testable) before their tile's origin scrolls into view.
//
// See also: `world.rs` for the tiles, `picking.rs` for hit-testing in screen
// space, `explorer.rs` which owns the state.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::types::{ScreenPoint, TileCoord, ViewportSize, WorldPoint};

/// Zoom limits and per-step speed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomBounds {
    pub min: f64,
    pub max: f64,
    /// Relative scale change per step.
    pub speed: f64,
}

impl ZoomBounds {
    pub fn new(min: f64, max: f64, speed: f64) -> Self {
        assert!(
            min > 0.0 && min.is_finite() && max.is_finite(),
            "ZoomBounds::new: zoom bounds must be positive and finite, got {min}..{max}"
        );
        assert!(min <= max, "ZoomBounds::new: min zoom {min} exceeds max zoom {max}");
        assert!(
            (0.0..1.0).contains(&speed),
            "ZoomBounds::new: zoom speed must be in [0, 1), got {speed}"
        );
        Self { min, max, speed }
    }

    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }
}

/// Zoom direction of a wheel event: scrolling up (negative delta) zooms in.
/// A zero delta does nothing.
pub fn wheel_direction(delta: f64) -> f64 {
    if delta == 0.0 || delta.is_nan() {
        0.0
    } else {
        -delta.signum()
    }
}

/// Inclusive rectangle of tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRange {
    pub min: TileCoord,
    pub max: TileCoord,
}

impl TileRange {
    pub fn contains(&self, tile: TileCoord) -> bool {
        (self.min.tx..=self.max.tx).contains(&tile.tx)
            && (self.min.ty..=self.max.ty).contains(&tile.ty)
    }

    pub fn len(&self) -> usize {
        let w = (self.max.tx as i64 - self.min.tx as i64 + 1).max(0) as usize;
        let h = (self.max.ty as i64 - self.min.ty as i64 + 1).max(0) as usize;
        w * h
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tiles row by row, top to bottom, left to right.
    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + use<> {
        let TileRange { min, max } = *self;
        (min.ty..=max.ty)
            .flat_map(move |ty| (min.tx..=max.tx).map(move |tx| TileCoord::new(tx, ty)))
    }
}

/// Scale and offset of the camera over the world plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    /// Screen pixels per world unit.
    pub scale: f64,
    /// World position under the screen's top-left corner.
    pub offset: WorldPoint,
}

fn assert_scale(scale: f64) {
    assert!(
        scale > 0.0 && scale.is_finite(),
        "ViewportState: scale must be positive and finite, got {scale}"
    );
}

impl ViewportState {
    pub fn new(scale: f64, offset: WorldPoint) -> Self {
        assert_scale(scale);
        Self { scale, offset }
    }

    pub fn screen_to_world(&self, p: ScreenPoint) -> WorldPoint {
        WorldPoint::new(p.x / self.scale + self.offset.x, p.y / self.scale + self.offset.y)
    }

    pub fn world_to_screen(&self, w: WorldPoint) -> ScreenPoint {
        ScreenPoint::new(
            (w.x - self.offset.x) * self.scale,
            (w.y - self.offset.y) * self.scale,
        )
    }

    /// Drag the world by a screen-space delta (content follows the pointer).
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset.x -= dx / self.scale;
        self.offset.y -= dy / self.scale;
    }

    /// Zoom one step in `direction` (+1 in, -1 out) keeping the world point
    /// under `anchor` fixed on screen. Returns whether the scale changed.
    pub fn zoom_at_cursor(
        &mut self,
        anchor: ScreenPoint,
        direction: f64,
        bounds: &ZoomBounds,
    ) -> bool {
        let target = self.scale * (1.0 + direction * bounds.speed);
        let new_scale = bounds.clamp(target);
        if new_scale != target {
            debug!("zoom clamped to {new_scale} (wanted {target})");
        }
        if new_scale == self.scale {
            return false;
        }
        assert_scale(new_scale);

        let pinned = self.screen_to_world(anchor);
        self.scale = new_scale;
        self.offset = WorldPoint::new(
            pinned.x - anchor.x / new_scale,
            pinned.y - anchor.y / new_scale,
        );
        true
    }

    /// Zoom one step anchored at the viewport centre.
    pub fn zoom_at_center(
        &mut self,
        size: ViewportSize,
        direction: f64,
        bounds: &ZoomBounds,
    ) -> bool {
        self.zoom_at_cursor(size.center(), direction, bounds)
    }

    /// World rectangle covered by the viewport: top-left and bottom-right.
    pub fn visible_world_rect(&self, size: ViewportSize) -> (WorldPoint, WorldPoint) {
        (
            self.offset,
            self.screen_to_world(ScreenPoint::new(size.width, size.height)),
        )
    }

    /// Tiles covering the viewport, padded by one tile on every side.
    pub fn visible_tile_range(&self, size: ViewportSize, tile_size: f64) -> TileRange {
        let (top_left, bottom_right) = self.visible_world_rect(size);
        let min = TileCoord::containing(top_left, tile_size);
        let max = TileCoord::containing(bottom_right, tile_size);
        TileRange {
            min: TileCoord::new(min.tx.saturating_sub(1), min.ty.saturating_sub(1)),
            max: TileCoord::new(max.tx.saturating_add(1), max.ty.saturating_add(1)),
        }
    }
}
