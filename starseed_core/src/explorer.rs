// Explorer session: the frame-driven glue between input and generation.
//
// The presentation layer owns the window, the canvas and the 3D scene. Each
// frame it forwards pointer events and the current viewport size to an
// `Explorer`, asks for a `Frame` (stars to draw, with screen positions, and
// the highlighted star), and receives a `Selection` when a click lands on a
// star. A selection carries everything needed to present the planet:
// attributes, spin, facts, and helpers that synthesize the textures.
//
// Event handling:
//
//   Down             start a press
//   Move (pressed)   pan by the pointer delta; once the press becomes a
//                    drag, clears the highlight
//   Move (released)  highlight the nearest star within `hover_threshold`
//   Up               without a drag: select the highlighted star, else the
//                    nearest star within `click_threshold`; after a drag:
//                    nothing
//   Wheel { delta }  zoom one step at the pointer, scrolling up zooms in
//
// Nothing about the world is stored except the tile cache, which only
// memoizes `stars_in_tile()`. Two explorers with the same config and the same
// event sequence produce identical frames and selections.
//
// See also: `picking.rs` for the click/drag/hover rules, `viewport.rs` for
// the camera, `texture.rs` for the synthesis behind `Selection`.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::StarseedConfig;
use crate::facts::{PlanetFacts, generate_facts};
use crate::picking::{self, Gesture, PointerTracker};
use crate::planet::{PlanetParams, SpinParams, generate_planet, generate_spin};
use crate::texture::{self, PlanetTextures};
use crate::types::{ScreenPoint, Star, ViewportSize, WorldPoint};
use crate::viewport::{ViewportState, ZoomBounds, wheel_direction};
use crate::world::{TileCache, WorldKey};

/// Kind of a pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    /// Wheel delta as reported by the device; negative scrolls up.
    Wheel { delta: f64 },
}

/// A pointer event at a screen position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub kind: PointerKind,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64, kind: PointerKind) -> Self {
        Self { x, y, kind }
    }

    pub fn position(&self) -> ScreenPoint {
        ScreenPoint::new(self.x, self.y)
    }
}

/// A star to draw this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleStar {
    pub star: Star,
    pub screen: ScreenPoint,
}

/// Everything the presentation layer draws for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Ordered by tile (row-major), then by id within the tile.
    pub stars: Vec<VisibleStar>,
    pub highlighted: Option<Star>,
}

/// A selected star and its planet.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub star: Star,
    pub params: PlanetParams,
    pub spin: SpinParams,
    pub facts: PlanetFacts,
    stride: u32,
    disc_radius_fraction: f64,
}

impl Selection {
    pub fn new(star: Star, config: &StarseedConfig) -> Self {
        let params = generate_planet(star.seed);
        Self {
            star,
            params,
            spin: generate_spin(star.seed),
            facts: generate_facts(star.seed, &params),
            stride: config.texture_stride,
            disc_radius_fraction: config.disc_radius_fraction,
        }
    }

    /// Equirectangular maps for a sphere.
    pub fn sphere_textures(&self, width: u32, height: u32) -> PlanetTextures {
        texture::synthesize_sphere(self.star.seed, &self.params, width, height, self.stride)
    }

    /// Flat disc rendering on a `size x size` canvas.
    pub fn disc_textures(&self, size: u32) -> PlanetTextures {
        let radius = size as f64 * self.disc_radius_fraction;
        texture::synthesize_disc(self.star.seed, &self.params, size, radius, self.stride)
    }
}

/// Interactive session over one infinite world.
#[derive(Debug)]
pub struct Explorer {
    config: StarseedConfig,
    zoom: ZoomBounds,
    viewport: ViewportState,
    size: ViewportSize,
    pointer: PointerTracker,
    highlighted: Option<Star>,
    cache: TileCache,
}

impl Explorer {
    pub fn new(config: StarseedConfig) -> Self {
        let zoom = config.zoom_bounds();
        let viewport = ViewportState::new(zoom.clamp(config.initial_zoom), WorldPoint::default());
        Self {
            zoom,
            viewport,
            size: ViewportSize::default(),
            pointer: PointerTracker::new(config.drag_threshold),
            highlighted: None,
            cache: TileCache::new(config.tile_cache_capacity),
            config,
        }
    }

    pub fn config(&self) -> &StarseedConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn highlighted(&self) -> Option<Star> {
        self.highlighted
    }

    pub fn world_key(&self) -> WorldKey {
        WorldKey {
            world_seed: self.config.world_seed,
            tile_size: self.config.tile_size,
            stars_per_tile: self.config.stars_per_tile,
        }
    }

    pub fn resize(&mut self, size: ViewportSize) {
        self.size = size;
    }

    /// Move the camera so that `world` sits at the viewport centre.
    pub fn center_on(&mut self, world: WorldPoint) {
        let center = self.size.center();
        self.viewport.offset = WorldPoint::new(
            world.x - center.x / self.viewport.scale,
            world.y - center.y / self.viewport.scale,
        );
    }

    /// Process one pointer event. Returns a selection when the event is a
    /// click that lands on a star.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<Selection> {
        let at = event.position();
        let gesture = match event.kind {
            PointerKind::Down => self.pointer.down(at),
            PointerKind::Move => self.pointer.moved(at),
            PointerKind::Up => self.pointer.up(at),
            PointerKind::Wheel { delta } => {
                let direction = wheel_direction(delta);
                if direction != 0.0 {
                    self.viewport.zoom_at_cursor(at, direction, &self.zoom);
                }
                Gesture::Idle
            }
        };

        match gesture {
            Gesture::Idle | Gesture::DragEnd => None,
            Gesture::Pan { dx, dy } => {
                self.viewport.pan(dx, dy);
                if self.pointer.is_dragging() {
                    self.highlighted = None;
                }
                None
            }
            Gesture::Hover(point) => {
                let hit = self.pick(point, self.config.hover_threshold);
                self.highlighted = hit.map(|hit| hit.star);
                None
            }
            Gesture::Click(point) => {
                let nearest = self.pick(point, self.config.click_threshold);
                let star = picking::resolve_click(self.highlighted, nearest)?;
                debug!(
                    "selected star {} in tile {} (seed {})",
                    star.id, star.tile, star.seed
                );
                Some(Selection::new(star, &self.config))
            }
        }
    }

    fn pick(&mut self, point: ScreenPoint, threshold: f64) -> Option<picking::Hit> {
        let key = self.world_key();
        picking::pick(&mut self.cache, &key, &self.viewport, point, threshold)
    }

    /// Zoom one step in, anchored at the viewport centre.
    pub fn zoom_in(&mut self) -> bool {
        self.viewport.zoom_at_center(self.size, 1.0, &self.zoom)
    }

    /// Zoom one step out, anchored at the viewport centre.
    pub fn zoom_out(&mut self) -> bool {
        self.viewport.zoom_at_center(self.size, -1.0, &self.zoom)
    }

    /// Stars inside the viewport (plus the drawn star radius) and the
    /// current highlight.
    pub fn frame(&mut self) -> Frame {
        let key = self.world_key();
        let range = self.viewport.visible_tile_range(self.size, key.tile_size);
        let tiles: Vec<_> = range.iter().collect();
        let contents = self.cache.tiles(&key, &tiles);

        let margin = self.config.star_radius;
        let (w, h) = (self.size.width, self.size.height);
        let stars = contents
            .iter()
            .flat_map(|tile| tile.iter())
            .filter_map(|star| {
                let screen = self.viewport.world_to_screen(star.position());
                let on_screen = (-margin..=w + margin).contains(&screen.x)
                    && (-margin..=h + margin).contains(&screen.y);
                on_screen.then_some(VisibleStar { star: *star, screen })
            })
            .collect();

        Frame { stars, highlighted: self.highlighted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TileCoord;

    fn explorer() -> Explorer {
        let mut explorer = Explorer::new(StarseedConfig::default());
        explorer.resize(ViewportSize::new(800.0, 600.0));
        explorer
    }

    /// A star of tile (0, 0) with no other star within `clearance` world
    /// units anywhere in its neighbourhood.
    fn isolated_star(explorer: &Explorer, clearance: f64) -> Star {
        let key = explorer.world_key();
        let neighbours: Vec<Star> = crate::world::neighborhood(TileCoord::new(0, 0))
            .iter()
            .flat_map(|&t| key.generate(t))
            .collect();
        key.generate(TileCoord::new(0, 0))
            .into_iter()
            .find(|s| {
                neighbours.iter().all(|o| {
                    o.same_star(s) || (o.x - s.x).hypot(o.y - s.y) > clearance
                })
            })
            .expect("some star of the tile is isolated")
    }

    fn event(p: ScreenPoint, kind: PointerKind) -> PointerEvent {
        PointerEvent::new(p.x, p.y, kind)
    }

    #[test]
    fn initial_zoom_is_clamped() {
        let config = StarseedConfig { initial_zoom: 50.0, ..StarseedConfig::default() };
        assert_eq!(Explorer::new(config).viewport().scale, 8.0);
    }

    #[test]
    fn click_near_star_selects_it() {
        let mut ex = explorer();
        let target = isolated_star(&ex, 40.0);
        ex.center_on(target.position());
        let p = ex.viewport().world_to_screen(target.position());
        let click = ScreenPoint::new(p.x + 3.0, p.y + 4.0);
        assert!(ex.handle_pointer(event(click, PointerKind::Down)).is_none());
        let selection = ex
            .handle_pointer(event(click, PointerKind::Up))
            .expect("click 5px from a star selects it");
        assert!(selection.star.same_star(&target));
        assert_eq!(selection.params, generate_planet(target.seed));
        assert_eq!(selection.facts, generate_facts(target.seed, &selection.params));
    }

    #[test]
    fn hover_highlights_and_wins_the_click() {
        let mut ex = explorer();
        let target = isolated_star(&ex, 60.0);
        ex.center_on(target.position());
        let p = ex.viewport().world_to_screen(target.position());
        ex.handle_pointer(event(ScreenPoint::new(p.x + 12.0, p.y), PointerKind::Move));
        assert!(ex.highlighted().is_some_and(|s| s.same_star(&target)));
        assert!(ex.frame().highlighted.is_some());

        // Far outside the click threshold, but the highlight takes the click.
        let away = ScreenPoint::new(p.x + 30.0, p.y);
        ex.handle_pointer(event(away, PointerKind::Down));
        let selection = ex.handle_pointer(event(away, PointerKind::Up));
        assert!(selection.is_some_and(|s| s.star.same_star(&target)));
    }

    #[test]
    fn jitter_below_drag_threshold_keeps_the_highlight() {
        let mut ex = explorer();
        let target = isolated_star(&ex, 60.0);
        ex.center_on(target.position());
        let p = ex.viewport().world_to_screen(target.position());
        let hover = ScreenPoint::new(p.x + 12.0, p.y);
        ex.handle_pointer(event(hover, PointerKind::Move));
        assert!(ex.highlighted().is_some_and(|s| s.same_star(&target)));

        ex.handle_pointer(event(hover, PointerKind::Down));
        let jittered = ScreenPoint::new(hover.x + 1.0, hover.y);
        ex.handle_pointer(event(jittered, PointerKind::Move));
        assert!(ex.highlighted().is_some_and(|s| s.same_star(&target)));
        let selection = ex.handle_pointer(event(jittered, PointerKind::Up));
        assert!(selection.is_some_and(|s| s.star.same_star(&target)));
    }

    #[test]
    fn drag_clears_the_highlight() {
        let mut ex = explorer();
        let target = isolated_star(&ex, 60.0);
        ex.center_on(target.position());
        let p = ex.viewport().world_to_screen(target.position());
        let hover = ScreenPoint::new(p.x + 12.0, p.y);
        ex.handle_pointer(event(hover, PointerKind::Move));
        ex.handle_pointer(event(hover, PointerKind::Down));
        ex.handle_pointer(event(ScreenPoint::new(hover.x + 30.0, hover.y), PointerKind::Move));
        assert!(ex.highlighted().is_none());
    }

    #[test]
    fn drag_pans_and_does_not_select() {
        let mut ex = explorer();
        let target = isolated_star(&ex, 40.0);
        ex.center_on(target.position());
        let p = ex.viewport().world_to_screen(target.position());
        let before = ex.viewport().offset;

        ex.handle_pointer(event(p, PointerKind::Down));
        ex.handle_pointer(event(ScreenPoint::new(p.x + 20.0, p.y), PointerKind::Move));
        let mid = ex.viewport().offset;
        assert!((mid.x - (before.x - 20.0)).abs() < 1e-9);
        ex.handle_pointer(event(p, PointerKind::Move));
        assert!(ex.handle_pointer(event(p, PointerKind::Up)).is_none());
    }

    #[test]
    fn wheel_zooms_at_cursor() {
        let mut ex = explorer();
        let cursor = ScreenPoint::new(200.0, 150.0);
        let pinned = ex.viewport().screen_to_world(cursor);
        ex.handle_pointer(event(cursor, PointerKind::Wheel { delta: -100.0 }));
        assert!(ex.viewport().scale > 1.0);
        let after = ex.viewport().screen_to_world(cursor);
        assert!((pinned.x - after.x).abs() < 1e-9 && (pinned.y - after.y).abs() < 1e-9);
        ex.handle_pointer(event(cursor, PointerKind::Wheel { delta: 0.0 }));
        assert!((ex.viewport().scale - 1.1).abs() < 1e-12);
    }

    #[test]
    fn zoom_buttons_step_and_stop() {
        let mut ex = explorer();
        assert!(ex.zoom_in());
        assert!(ex.zoom_out());
        for _ in 0..100 {
            ex.zoom_out();
        }
        assert_eq!(ex.viewport().scale, 0.25);
        assert!(!ex.zoom_out());
    }

    #[test]
    fn frame_lists_on_screen_stars_in_order() {
        let mut ex = explorer();
        let frame = ex.frame();
        assert!(!frame.stars.is_empty());
        for vs in &frame.stars {
            assert!((-1.2..=801.2).contains(&vs.screen.x));
            assert!((-1.2..=601.2).contains(&vs.screen.y));
            assert_eq!(vs.screen, ex.viewport().world_to_screen(vs.star.position()));
        }
        // Every star of tile (0, 0) inside the viewport is listed.
        let key = ex.world_key();
        let expected = key
            .generate(TileCoord::new(0, 0))
            .into_iter()
            .filter(|s| s.x < 800.0 && s.y < 512.0)
            .count();
        let listed = frame.stars.iter().filter(|vs| vs.star.tile == TileCoord::new(0, 0)).count();
        assert_eq!(listed, expected);
        assert_eq!(frame, ex.frame());
    }

    #[test]
    fn same_events_same_results() {
        let events = [
            PointerEvent::new(100.0, 100.0, PointerKind::Down),
            PointerEvent::new(160.0, 90.0, PointerKind::Move),
            PointerEvent::new(160.0, 90.0, PointerKind::Up),
            PointerEvent::new(300.0, 200.0, PointerKind::Wheel { delta: -3.0 }),
            PointerEvent::new(310.0, 210.0, PointerKind::Move),
        ];
        let mut a = explorer();
        let mut b = explorer();
        for e in events {
            assert_eq!(a.handle_pointer(e), b.handle_pointer(e));
        }
        assert_eq!(a.frame(), b.frame());
    }

    #[test]
    fn selection_textures_use_config() {
        let config = StarseedConfig { texture_stride: 4, ..StarseedConfig::default() };
        let star = Star { id: 0, tile: TileCoord::new(0, 0), x: 0.0, y: 0.0, seed: 42 };
        let selection = Selection::new(star, &config);
        let sphere = selection.sphere_textures(32, 16);
        assert_eq!((sphere.color.width, sphere.color.height), (32, 16));
        assert_eq!(sphere.color.get(0, 0), sphere.color.get(3, 3));
        let disc = selection.disc_textures(40);
        assert_eq!(disc.elevation.width, 40);
        // Radius 12 around (20, 20): (20, 20) inside, (20, 5) outside.
        assert_eq!(disc.elevation.get(20, 20)[3], 255);
        assert_eq!(disc.elevation.get(20, 5)[3], 0);
    }
}
