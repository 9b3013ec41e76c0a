// Coherent 2D value noise and fractal Brownian motion.
//
// Value noise: every integer lattice point `(gx, gy)` gets a pseudo-random
// value in [0, 1) from `lattice_value()`, a pure integer hash of
// `(gx, gy, seed)`. A sample bilinearly interpolates the four surrounding
// lattice values with smoothstep easing. There is no mutable state anywhere
// in this module, so samples may be evaluated in any order and on any thread.
//
// fbm sums `octaves` layers. Layer `i` uses seed `seed + i * 1337`
// (wrapping), amplitude `0.5^(i+1)` and frequency `base_scale * 2^i`. The
// sum is clamped to [0, 1].
//
// The periodic variant wraps the lattice x-index modulo
// `period_cells = max(1, floor(period * scale))` and maps x into lattice
// space as `x / period * period_cells`. That mapping puts `x = period`
// exactly on lattice column `period_cells`, which wraps to column 0, so
// `f(0, y) == f(period, y)` holds bit-for-bit. Textures built on it can be
// wrapped around a sphere without a seam. Flat (disc) rendering uses the
// plain variant.
//
// `NoiseField` abstracts over the two so the texture code in `texture.rs` is
// written once.
//
// Preconditions (`scale > 0`, `octaves >= 1`, `period > 0`, all finite) are
// asserted: violating them is a caller bug.

/// Seed offset between successive fbm octaves.
pub const OCTAVE_SEED_STEP: u32 = 1337;

/// Murmur3 finalizer: full avalanche on 32 bits.
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 13;
    h = h.wrapping_mul(0xC2B2_AE35);
    h ^= h >> 16;
    h
}

/// Pseudo-random value in [0, 1) for a lattice point.
///
/// Lattice indices are truncated to 32 bits; coordinates beyond ±2^31 cells
/// alias, which is far outside any texture or world this is used for.
pub fn lattice_value(gx: i64, gy: i64, seed: u32) -> f64 {
    let h = fmix32(seed ^ (gx as u32).wrapping_mul(0x9E37_79B1));
    let h = fmix32(h ^ (gy as u32).wrapping_mul(0x85EB_CA77));
    // Top 24 bits: uniform on [0, 1) with exact f64 representation.
    (h >> 8) as f64 / 16_777_216.0
}

fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Bilinear, smoothstep-eased lookup at lattice-space coordinates.
/// `wrap_x` maps a lattice column onto the column actually hashed.
fn interpolate(fx: f64, fy: f64, seed: u32, wrap_x: impl Fn(i64) -> i64) -> f64 {
    let gx = fx.floor();
    let gy = fy.floor();
    let tx = smoothstep(fx - gx);
    let ty = smoothstep(fy - gy);
    let (gx, gy) = (gx as i64, gy as i64);
    let (x0, x1) = (wrap_x(gx), wrap_x(gx + 1));

    let h00 = lattice_value(x0, gy, seed);
    let h10 = lattice_value(x1, gy, seed);
    let h01 = lattice_value(x0, gy + 1, seed);
    let h11 = lattice_value(x1, gy + 1, seed);

    let a = h00 * (1.0 - tx) + h10 * tx;
    let b = h01 * (1.0 - tx) + h11 * tx;
    a * (1.0 - ty) + b * ty
}

fn assert_scale(scale: f64, caller: &str) {
    assert!(
        scale > 0.0 && scale.is_finite(),
        "{caller}: scale must be positive and finite, got {scale}"
    );
}

/// Single layer of value noise. Result in [0, 1].
pub fn value_noise_2d(x: f64, y: f64, seed: u32, scale: f64) -> f64 {
    assert_scale(scale, "value_noise_2d");
    interpolate(x * scale, y * scale, seed, |gx| gx)
}

/// Number of lattice columns in one period at the given scale, at least 1.
pub fn period_cells(period: f64, scale: f64) -> i64 {
    ((period * scale).floor() as i64).max(1)
}

/// Single layer of value noise, periodic in x with the given period.
/// Result in [0, 1].
pub fn periodic_noise_2d(x: f64, y: f64, seed: u32, scale: f64, period: f64) -> f64 {
    assert_scale(scale, "periodic_noise_2d");
    assert!(
        period > 0.0 && period.is_finite(),
        "periodic_noise_2d: period must be positive and finite, got {period}"
    );
    let cells = period_cells(period, scale);
    let fx = x / period * cells as f64;
    interpolate(fx, y * scale, seed, |gx| gx.rem_euclid(cells))
}

/// A source of single-layer noise. `fbm` is provided on top of `sample`.
pub trait NoiseField {
    /// One layer of noise in [0, 1] at the given lattice scale.
    fn sample(&self, x: f64, y: f64, seed: u32, scale: f64) -> f64;

    /// Fractal sum of `octaves` layers, clamped to [0, 1].
    fn fbm(&self, x: f64, y: f64, seed: u32, base_scale: f64, octaves: u32) -> f64 {
        assert!(octaves >= 1, "fbm: octaves must be at least 1");
        let mut value = 0.0;
        let mut amplitude = 0.5;
        let mut scale = base_scale;
        for i in 0..octaves {
            let layer_seed = seed.wrapping_add(i.wrapping_mul(OCTAVE_SEED_STEP));
            value += amplitude * self.sample(x, y, layer_seed, scale);
            amplitude *= 0.5;
            scale *= 2.0;
        }
        value.clamp(0.0, 1.0)
    }
}

/// Plain, non-repeating noise for flat rendering.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatNoise;

impl NoiseField for FlatNoise {
    fn sample(&self, x: f64, y: f64, seed: u32, scale: f64) -> f64 {
        value_noise_2d(x, y, seed, scale)
    }
}

/// Noise that repeats every `period` units along x.
#[derive(Clone, Copy, Debug)]
pub struct PeriodicNoise {
    period: f64,
}

impl PeriodicNoise {
    pub fn new(period: f64) -> Self {
        assert!(
            period > 0.0 && period.is_finite(),
            "PeriodicNoise::new: period must be positive and finite, got {period}"
        );
        Self { period }
    }

    pub fn period(&self) -> f64 {
        self.period
    }
}

impl NoiseField for PeriodicNoise {
    fn sample(&self, x: f64, y: f64, seed: u32, scale: f64) -> f64 {
        periodic_noise_2d(x, y, seed, scale, self.period)
    }
}

/// Flat fbm; see `NoiseField::fbm`.
pub fn fbm(x: f64, y: f64, seed: u32, base_scale: f64, octaves: u32) -> f64 {
    FlatNoise.fbm(x, y, seed, base_scale, octaves)
}

/// Periodic-in-x fbm; every octave wraps with the same `period`.
pub fn periodic_fbm(x: f64, y: f64, seed: u32, base_scale: f64, octaves: u32, period: f64) -> f64 {
    PeriodicNoise::new(period).fbm(x, y, seed, base_scale, octaves)
}
