// Hit-testing and pointer gesture classification.
//
// Picking works in screen space: a star is hit when its projected position
// lies within a pixel threshold of the pointer, so the feel of clicking does
// not change with zoom. Only the 3x3 tile neighbourhood around the pointer's
// world tile is searched. With the default tile size of 512 world units and
// a minimum zoom of 0.25, one tile is at least 128 px across, which is far
// larger than any threshold, so no hit can be missed.
//
// Two thresholds are used by the explorer: `click_threshold` for selecting
// and the larger `hover_threshold` for highlighting. `resolve_click()` gives
// the highlighted star priority over the click's own nearest star, so a
// click anywhere while a star is highlighted selects that star.
//
// `PointerTracker` separates clicks from drags. It sums the screen-space path
// length since the press; once the sum exceeds `drag_threshold` the gesture
// is a drag and the release selects nothing. Moves while pressed always pan,
// below the threshold too, so short drags still move the view.
//
// See also: `viewport.rs` for the transforms, `world.rs` for the tile
// contents, `explorer.rs` for how gestures become pans and selections.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::types::{ScreenPoint, Star, TileCoord};
use crate::viewport::ViewportState;
use crate::world::{TileCache, WorldKey, neighborhood};

/// A star near the pointer and its screen distance in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub star: Star,
    pub distance: f64,
}

/// Nearest star to `point` within `threshold` pixels. On equal distance the
/// first star in iteration order wins.
pub fn nearest_within<'a>(
    stars: impl IntoIterator<Item = &'a Star>,
    viewport: &ViewportState,
    point: ScreenPoint,
    threshold: f64,
) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    for star in stars {
        let distance = viewport.world_to_screen(star.position()).distance(point);
        if distance > threshold {
            continue;
        }
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(Hit { star: *star, distance });
        }
    }
    best
}

/// The tiles searched for a pointer at `point`.
pub fn search_tiles(
    viewport: &ViewportState,
    point: ScreenPoint,
    tile_size: f64,
) -> SmallVec<[TileCoord; 9]> {
    neighborhood(TileCoord::containing(viewport.screen_to_world(point), tile_size))
}

/// Nearest star to `point` within `threshold`, searching the 3x3 tile
/// neighbourhood through the cache.
pub fn pick(
    cache: &mut TileCache,
    key: &WorldKey,
    viewport: &ViewportState,
    point: ScreenPoint,
    threshold: f64,
) -> Option<Hit> {
    let tiles = search_tiles(viewport, point, key.tile_size);
    let contents = cache.tiles(key, &tiles);
    nearest_within(contents.iter().flat_map(|stars| stars.iter()), viewport, point, threshold)
}

/// The star a click selects: the highlighted star if any, otherwise the
/// nearest star within the click threshold.
pub fn resolve_click(highlighted: Option<Star>, nearest: Option<Hit>) -> Option<Star> {
    highlighted.or(nearest.map(|hit| hit.star))
}

// ---------------------------------------------------------------------------
// Gestures
// ---------------------------------------------------------------------------

/// What a pointer event means once classified.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    /// Nothing to do.
    Idle,
    /// Pressed move: pan by this screen delta.
    Pan { dx: f64, dy: f64 },
    /// Released move: update the highlight at this point.
    Hover(ScreenPoint),
    /// Release that stayed under the drag threshold.
    Click(ScreenPoint),
    /// Release that ended a drag.
    DragEnd,
}

/// Press/drag state between pointer events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerTracker {
    drag_threshold: f64,
    pressed: bool,
    last: ScreenPoint,
    travelled: f64,
}

impl PointerTracker {
    pub fn new(drag_threshold: f64) -> Self {
        Self {
            drag_threshold,
            pressed: false,
            last: ScreenPoint::default(),
            travelled: 0.0,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Path length since the press, in pixels.
    pub fn travelled(&self) -> f64 {
        self.travelled
    }

    pub fn is_dragging(&self) -> bool {
        self.pressed && self.travelled > self.drag_threshold
    }

    pub fn down(&mut self, at: ScreenPoint) -> Gesture {
        self.pressed = true;
        self.last = at;
        self.travelled = 0.0;
        Gesture::Idle
    }

    pub fn moved(&mut self, to: ScreenPoint) -> Gesture {
        if !self.pressed {
            self.last = to;
            return Gesture::Hover(to);
        }
        let (dx, dy) = (to.x - self.last.x, to.y - self.last.y);
        self.travelled += self.last.distance(to);
        self.last = to;
        Gesture::Pan { dx, dy }
    }

    /// Release. A release without a preceding press is ignored.
    pub fn up(&mut self, at: ScreenPoint) -> Gesture {
        if !self.pressed {
            return Gesture::Idle;
        }
        self.travelled += self.last.distance(at);
        let gesture = if self.is_dragging() {
            Gesture::DragEnd
        } else {
            Gesture::Click(at)
        };
        self.pressed = false;
        self.last = at;
        gesture
    }
}
