// Planet attribute generation.
//
// `generate_planet(seed)` maps a star's seed to a `PlanetParams` record by
// drawing from a fresh `StarRng` in a fixed order:
//
//   category, hue, saturation, lightness, banding, noise, clouds, ocean,
//   rings flag, ring tilt
//
// Each field consumes exactly one draw. The order is a compatibility
// contract: inserting, removing or reordering a draw changes the appearance
// of every planet in every world. Add new attributes with their own stream
// (see `facts.rs`), never by appending draws here.
//
// `generate_spin(seed)` derives the presentation layer's rotation direction
// and speed by replaying the same seed's stream from the start, so its draws
// are correlated with the first two attribute draws.
//
// See also: `texture.rs` which turns `PlanetParams` into pixel buffers,
// `facts.rs` for the descriptive record shown next to the planet.

use serde::{Deserialize, Serialize};
use starseed_prng::StarRng;

use crate::color::{Rgb, hsl_to_rgb};

/// Probability threshold of the first draw: below it, the planet is gaseous.
pub const GASEOUS_PROBABILITY: f64 = 0.8;

/// Probability that a planet has rings.
pub const RING_PROBABILITY: f64 = 0.35;

/// Broad planet type; selects the texture algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanetCategory {
    /// Land and ocean with biome shading.
    Rocky,
    /// Latitudinal bands with noise swirls.
    Gaseous,
}

/// Visual parameters of a planet. Derived once per seed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanetParams {
    pub category: PlanetCategory,
    /// Base hue in degrees, [0, 360).
    pub hue: f64,
    /// [0.4, 0.9).
    pub saturation: f64,
    /// [0.35, 0.65).
    pub lightness: f64,
    /// Band strength and frequency for gaseous planets, [0, 1).
    pub banding: f64,
    /// Terrain frequency / swirl strength, [0.2, 0.8).
    pub noise: f64,
    /// Cloud cover, [0, 0.7).
    pub clouds: f64,
    /// Ocean cover. Rocky: [0.2, 0.8); gaseous: [0, 0.3).
    pub ocean: f64,
    pub has_rings: bool,
    /// Ring plane tilt in degrees, [-35, 35).
    pub ring_tilt: f64,
}

impl PlanetParams {
    pub fn is_rocky(&self) -> bool {
        self.category == PlanetCategory::Rocky
    }

    /// Base color of the planet body.
    pub fn base_rgb(&self) -> Rgb {
        hsl_to_rgb(self.hue, self.saturation, self.lightness)
    }

    /// Highlight variant (lightness + 0.1), used for the lit side and glow.
    pub fn lighter_rgb(&self) -> Rgb {
        hsl_to_rgb(self.hue, self.saturation, (self.lightness + 0.1).min(1.0))
    }

    /// Shadow variant (lightness - 0.15), used for the terminator side.
    pub fn darker_rgb(&self) -> Rgb {
        hsl_to_rgb(self.hue, self.saturation, (self.lightness - 0.15).max(0.0))
    }
}

/// Generate planet attributes from a seed. Total over all seeds.
pub fn generate_planet(seed: u32) -> PlanetParams {
    let mut rng = StarRng::new(seed);

    let category = if rng.next_f64() < GASEOUS_PROBABILITY {
        PlanetCategory::Gaseous
    } else {
        PlanetCategory::Rocky
    };
    let hue = rng.range_f64(0.0, 360.0);
    let saturation = rng.range_f64(0.4, 0.9);
    let lightness = rng.range_f64(0.35, 0.65);
    let banding = rng.range_f64(0.0, 1.0);
    let noise = rng.range_f64(0.2, 0.8);
    let clouds = rng.range_f64(0.0, 0.7);
    let ocean = match category {
        PlanetCategory::Rocky => rng.range_f64(0.2, 0.8),
        PlanetCategory::Gaseous => rng.range_f64(0.0, 0.3),
    };
    let has_rings = rng.random_bool(RING_PROBABILITY);
    let ring_tilt = rng.range_f64(-35.0, 35.0);

    PlanetParams {
        category,
        hue,
        saturation,
        lightness,
        banding,
        noise,
        clouds,
        ocean,
        has_rings,
        ring_tilt,
    }
}

/// Rotation of the presented planet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpinParams {
    /// +1.0 (the common case, 95%) or -1.0.
    pub direction: f64,
    /// Radians per frame, [0.006, 0.016).
    pub speed: f64,
}

impl SpinParams {
    /// Signed angular step per frame.
    pub fn step(&self) -> f64 {
        self.direction * self.speed
    }
}

/// Generate spin parameters from a seed.
///
/// Uses a fresh `StarRng` on the same seed, so it replays the attribute
/// stream: the direction draw is the category draw. Every gaseous planet
/// (first draw < 0.8) therefore spins in the +1 direction.
pub fn generate_spin(seed: u32) -> SpinParams {
    let mut rng = StarRng::new(seed);
    let direction = if rng.random_bool(0.95) { 1.0 } else { -1.0 };
    let speed = rng.range_f64(0.006, 0.016);
    SpinParams { direction, speed }
}
