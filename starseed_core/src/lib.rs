// starseed_core: deterministic starfield and procedural planet library.
//
// This crate contains everything the Starseed explorer computes: the infinite
// tiled star world, the camera transform and hit-testing, and the pipeline
// that turns a star's seed into planet attributes, facts and textures. It has
// no windowing or GPU dependencies; the presentation layer feeds it pointer
// events and a viewport size and draws what it returns.
//
// Module overview:
// - `config.rs`:   StarseedConfig: all tunable parameters, JSON-loadable.
// - `types.rs`:    ScreenPoint, WorldPoint, ViewportSize, TileCoord, Star.
// - `noise.rs`:    Hashed-lattice value noise, fbm, periodic-in-x variant.
// - `color.rs`:    HSL → RGB conversion and channel helpers.
// - `planet.rs`:   Seed → PlanetParams (fixed draw order) and SpinParams.
// - `facts.rs`:    Seed → PlanetFacts (name, radius, temperature, elements).
// - `raster.rs`:   TextureData plus alpha-blended circle/arc/ellipse strokes.
// - `texture.rs`:  Sphere (equirectangular) and disc texture synthesis.
// - `world.rs`:    Per-tile star generation, scatter field, TileCache.
// - `viewport.rs`: ViewportState transforms, pan, zoom, visible tile range.
// - `picking.rs`:  Nearest-star hit-testing, click rule, drag detection.
// - `explorer.rs`: Explorer session: events in, frames and selections out.
// - `prng`:        Re-exported from `starseed_prng`: mulberry32 stream.
//
// **Critical constraint: determinism.** Every output is a pure function of
// its seed(s) and parameters. All randomness comes from `StarRng` streams
// created fresh for each derivation, or from the stateless lattice hash in
// `noise.rs`. No system time, no OS entropy, no shared mutable PRNG state.
// Parallel code paths (texture rows, tile cache misses) produce the same
// bytes as a serial run.

pub mod color;
pub mod config;
pub mod explorer;
pub mod facts;
pub mod noise;
pub mod picking;
pub mod planet;
pub use starseed_prng as prng;
pub mod raster;
pub mod texture;
pub mod types;
pub mod viewport;
pub mod world;
