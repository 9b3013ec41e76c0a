// Planet texture synthesis.
//
// Turns `(seed, PlanetParams)` into two equal-size RGBA8 buffers: a color
// texture and an elevation (bump) texture. Two presentations are supported:
//
// - **Sphere** (`synthesize_sphere`): an equirectangular map for wrapping onto
//   a 3D sphere. All noise is sampled through `PeriodicNoise` with the
//   texture width as the period, so the left and right edges meet without a
//   seam. Fully opaque.
// - **Disc** (`synthesize_disc`): a square canvas with the planet drawn as a
//   flat disc, transparent outside. Uses plain `FlatNoise`. After the surface
//   pass, the overlay step draws polar caps, the cloud ring, the edge glow
//   and the tilted ring system onto the color buffer (see `draw_overlays`).
//
// The per-pixel surface is shared between presentations:
// - Rocky: terrain fbm decides ocean vs land against `0.5 - ocean * 0.25`;
//   a second fbm field ("shade") varies lightness and drifts the land hue;
//   latitude adds a climate gradient. Elevation is low for ocean
//   (`0.4 + t*0.2`) and high for land (`0.6 + t*0.4`), taken from the same
//   terrain sample `t` so color and relief always agree.
// - Gaseous: `sin(lat * 2π * (3 + banding*8))` bands plus a swirl fbm sample,
//   mixed by the `noise` and `banding` attributes into small signed deltas on
//   the base RGB. Elevation is the same mix remapped to mid-grey and up.
//
// Sampling is strided: one sample fills a `stride x stride` block. Bands of
// block rows are synthesized in parallel with rayon. Every sample is a pure
// function of its coordinates, so the output is identical to a serial run.
//
// See also: `noise.rs` for the noise fields, `raster.rs` for `TextureData`
// and the overlay primitives, `planet.rs` for `PlanetParams`.

use std::f64::consts::{PI, TAU};

use log::trace;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::color::{Rgb, hsl_to_rgb, offset_channel, to_channel};
use crate::noise::{FlatNoise, NoiseField, PeriodicNoise};
use crate::planet::{PlanetCategory, PlanetParams};
use crate::raster::{DiscClip, fill_circle, stroke_arc, stroke_circle, stroke_ellipse};

pub use crate::raster::TextureData;

/// Largest block size; larger strides look visibly blocky at planet scale.
pub const MAX_STRIDE: u32 = 4;

/// Cloud cover below which no cloud layer is drawn.
pub const CLOUD_MIN_COVER: f64 = 0.15;

/// Number of ellipses in a ring system.
pub const RING_COUNT: u32 = 12;

const WHITE: Rgb = [255, 255, 255];

// Seed offsets of the secondary noise fields.
const SHADE_SEED_OFFSET: u32 = 999;
const SWIRL_SEED_OFFSET: u32 = 555;
const CLOUD_SEED_OFFSET: u32 = 4321;

/// Color and elevation buffers of equal dimensions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetTextures {
    pub color: TextureData,
    pub elevation: TextureData,
}

// ---------------------------------------------------------------------------
// Per-pixel surface
// ---------------------------------------------------------------------------

/// One surface sample: color plus elevation in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SurfaceSample {
    pub rgb: Rgb,
    pub elevation: f64,
}

impl SurfaceSample {
    fn color_rgba(&self) -> [u8; 4] {
        [self.rgb[0], self.rgb[1], self.rgb[2], 255]
    }

    fn elevation_rgba(&self) -> [u8; 4] {
        let grey = to_channel(self.elevation);
        [grey, grey, grey, 255]
    }
}

/// Terrain height threshold below which a rocky pixel is ocean.
pub fn ocean_threshold(params: &PlanetParams) -> f64 {
    0.5 - params.ocean * 0.25
}

/// Rocky surface at `(x, y)`. `lat_shade` is the signed latitude term added
/// (scaled by 0.12) to lightness.
fn rocky_sample(
    field: &impl NoiseField,
    seed: u32,
    params: &PlanetParams,
    (x, y): (f64, f64),
    lat_shade: f64,
) -> SurfaceSample {
    let terrain = field.fbm(x, y, seed, 0.006 + params.noise * 0.006, 5);
    let is_ocean = terrain < ocean_threshold(params);

    let (mut hue, saturation, mut lightness) = if is_ocean {
        ((params.hue + 200.0) % 360.0, params.saturation * 0.7, params.lightness * 0.6)
    } else {
        ((params.hue + 20.0) % 360.0, params.saturation * 0.9, params.lightness * 0.55)
    };

    let shade = field.fbm(
        x + 1000.0,
        y - 500.0,
        seed.wrapping_add(SHADE_SEED_OFFSET),
        0.012,
        3,
    );
    lightness += (shade - 0.5) * 0.18 + lat_shade * 0.12;
    if !is_ocean {
        hue += (shade - 0.5) * 30.0;
    }

    let elevation = if is_ocean {
        0.4 + terrain * 0.2
    } else {
        0.6 + terrain * 0.4
    };

    SurfaceSample {
        rgb: hsl_to_rgb(hue, saturation, lightness.clamp(0.0, 1.0)),
        elevation,
    }
}

/// Band value in [0, 1] for a normalized latitude (0 top, 1 bottom).
fn band_at(params: &PlanetParams, lat_norm: f64) -> f64 {
    (lat_norm * TAU * (3.0 + params.banding * 8.0)).sin() * 0.5 + 0.5
}

/// Gaseous surface for a given band and swirl value.
fn gaseous_sample(params: &PlanetParams, base: Rgb, band: f64, swirl: f64) -> SurfaceSample {
    let mix = (0.5 * (params.noise * swirl + params.banding * band)).min(1.0);
    SurfaceSample {
        rgb: [
            offset_channel(base[0], mix * 25.0 - 8.0),
            offset_channel(base[1], mix * 15.0 - 6.0),
            offset_channel(base[2], mix * 12.0 - 6.0),
        ],
        elevation: 0.5 + mix * 0.5,
    }
}

/// Surface sample of the equirectangular sphere map at pixel `(x, y)`.
///
/// Defined for any `x`, including `x >= width`, which is how the seam tests
/// check the wrap.
pub(crate) fn sphere_sample(
    seed: u32,
    params: &PlanetParams,
    (width, height): (u32, u32),
    (x, y): (f64, f64),
) -> SurfaceSample {
    let lat_norm = y / height as f64;
    match params.category {
        PlanetCategory::Rocky => {
            let field = PeriodicNoise::new(width as f64);
            // -1 at the top edge, +1 at the bottom.
            let lat = (lat_norm - 0.5) * 2.0;
            rocky_sample(&field, seed, params, (x, y), lat)
        }
        PlanetCategory::Gaseous => {
            // Swirls are stretched 0.6x along longitude; the period shrinks
            // with them so the wrap still lands on the texture width.
            let field = PeriodicNoise::new(width as f64 * 0.6);
            let swirl = field.fbm(
                x * 0.6,
                y * 1.4,
                seed.wrapping_add(SWIRL_SEED_OFFSET),
                0.01,
                4,
            );
            gaseous_sample(params, params.base_rgb(), band_at(params, lat_norm), swirl)
        }
    }
}

// ---------------------------------------------------------------------------
// Block filling
// ---------------------------------------------------------------------------

fn assert_stride(stride: u32, caller: &str) {
    assert!(
        (1..=MAX_STRIDE).contains(&stride),
        "{caller}: stride must be in 1..={MAX_STRIDE}, got {stride}"
    );
}

/// Write `rgba` into columns `x0..x0 + w` of every row in a band.
fn fill_block(band: &mut [u8], row_bytes: usize, x0: usize, w: usize, rgba: [u8; 4]) {
    for row in band.chunks_mut(row_bytes) {
        for px in row[x0 * 4..(x0 + w) * 4].chunks_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }
}

// ---------------------------------------------------------------------------
// Sphere presentation
// ---------------------------------------------------------------------------

/// Synthesize equirectangular color and elevation maps for a sphere.
pub fn synthesize_sphere(
    seed: u32,
    params: &PlanetParams,
    width: u32,
    height: u32,
    stride: u32,
) -> PlanetTextures {
    assert_stride(stride, "synthesize_sphere");
    trace!(
        "synthesizing {:?} sphere textures {}x{} stride {} for seed {}",
        params.category, width, height, stride, seed
    );

    let mut color = TextureData::new(width, height);
    let mut elevation = TextureData::new(width, height);
    let row_bytes = width as usize * 4;
    let band_bytes = row_bytes * stride as usize;

    color
        .pixels
        .par_chunks_mut(band_bytes)
        .zip(elevation.pixels.par_chunks_mut(band_bytes))
        .enumerate()
        .for_each(|(band, (color_rows, elevation_rows))| {
            let y = (band * stride as usize) as f64;
            for x0 in (0..width as usize).step_by(stride as usize) {
                let w = (stride as usize).min(width as usize - x0);
                let sample = sphere_sample(seed, params, (width, height), (x0 as f64, y));
                fill_block(color_rows, row_bytes, x0, w, sample.color_rgba());
                fill_block(elevation_rows, row_bytes, x0, w, sample.elevation_rgba());
            }
        });

    PlanetTextures { color, elevation }
}

// ---------------------------------------------------------------------------
// Disc presentation
// ---------------------------------------------------------------------------

/// Geometry of a disc rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Disc {
    cx: f64,
    cy: f64,
    radius: f64,
}

impl Disc {
    fn contains(&self, px: f64, py: f64) -> bool {
        let (dx, dy) = (px - self.cx, py - self.cy);
        dx * dx + dy * dy <= self.radius * self.radius
    }

    fn clip(&self) -> DiscClip {
        DiscClip { cx: self.cx, cy: self.cy, radius: self.radius }
    }
}

/// Surface sample of the disc at canvas position `(x, y)`.
fn disc_sample(seed: u32, params: &PlanetParams, disc: &Disc, (x, y): (f64, f64)) -> SurfaceSample {
    match params.category {
        PlanetCategory::Rocky => {
            // 0 at the poles, 1 on the equator, centred on zero.
            let lat = 1.0 - (y - disc.cy).abs() / disc.radius;
            rocky_sample(&FlatNoise, seed, params, (x, y), lat - 0.5)
        }
        PlanetCategory::Gaseous => {
            let lat_norm = (y - (disc.cy - disc.radius)) / (2.0 * disc.radius);
            let swirl = FlatNoise.fbm(
                y * 1.7,
                disc.cx * 0.6,
                seed.wrapping_add(SWIRL_SEED_OFFSET),
                0.01,
                4,
            );
            gaseous_sample(params, params.base_rgb(), band_at(params, lat_norm), swirl)
        }
    }
}

/// Synthesize a flat disc rendering on a `size x size` canvas.
///
/// The disc of radius `radius` is centred on the canvas. Pixels outside the
/// disc stay transparent in the elevation buffer; in the color buffer they
/// only receive the glow and ring overlays.
pub fn synthesize_disc(
    seed: u32,
    params: &PlanetParams,
    size: u32,
    radius: f64,
    stride: u32,
) -> PlanetTextures {
    assert_stride(stride, "synthesize_disc");
    assert!(
        radius > 0.0 && radius.is_finite(),
        "synthesize_disc: radius must be positive and finite, got {radius}"
    );
    trace!(
        "synthesizing {:?} disc textures {}px radius {:.1} for seed {}",
        params.category, size, radius, seed
    );

    let center = size as f64 / 2.0;
    let disc = Disc { cx: center, cy: center, radius };
    let mut color = TextureData::new(size, size);
    let mut elevation = TextureData::new(size, size);
    let row_bytes = size as usize * 4;
    let band_bytes = row_bytes * stride as usize;

    color
        .pixels
        .par_chunks_mut(band_bytes)
        .zip(elevation.pixels.par_chunks_mut(band_bytes))
        .enumerate()
        .for_each(|(band, (color_rows, elevation_rows))| {
            let y0 = band * stride as usize;
            for x0 in (0..size as usize).step_by(stride as usize) {
                let w = (stride as usize).min(size as usize - x0);
                let mut sample = None;
                for (dy, (color_row, elevation_row)) in color_rows
                    .chunks_mut(row_bytes)
                    .zip(elevation_rows.chunks_mut(row_bytes))
                    .enumerate()
                {
                    for dx in 0..w {
                        let (px, py) = (x0 + dx, y0 + dy);
                        if !disc.contains(px as f64 + 0.5, py as f64 + 0.5) {
                            continue;
                        }
                        let s = *sample.get_or_insert_with(|| {
                            disc_sample(seed, params, &disc, (x0 as f64, y0 as f64))
                        });
                        color_row[px * 4..px * 4 + 4].copy_from_slice(&s.color_rgba());
                        elevation_row[px * 4..px * 4 + 4].copy_from_slice(&s.elevation_rgba());
                    }
                }
            }
        });

    draw_overlays(&mut color, seed, params, &disc);
    PlanetTextures { color, elevation }
}

/// Overlay step of the disc presentation, drawn in order: polar caps, cloud
/// ring, edge glow, rings.
fn draw_overlays(tex: &mut TextureData, seed: u32, params: &PlanetParams, disc: &Disc) {
    let Disc { cx, cy, radius: r } = *disc;

    // Polar caps.
    for pole_y in [cy - r * 0.85, cy + r * 0.85] {
        fill_circle(tex, cx, pole_y, r * 0.2, WHITE, 0.25, Some(disc.clip()));
    }

    if params.clouds > CLOUD_MIN_COVER {
        let alpha = (params.clouds * 0.6).min(0.5);
        let cloud_seed = seed.wrapping_add(CLOUD_SEED_OFFSET);
        for i in 0..180 {
            let angle = i as f64 / 180.0 * TAU;
            let (ax, ay) = (angle.cos() * 120.0, angle.sin() * 120.0);
            let jitter = FlatNoise.fbm(ax, ay, cloud_seed, 0.01, 3);
            let ring_radius = r * (0.5 + 0.4 * jitter);
            stroke_arc(tex, (cx, cy), ring_radius, (angle, angle + 0.02), 1.0, WHITE, alpha);
        }
    }

    // Glow just outside the edge.
    stroke_circle(tex, (cx, cy), r + 1.0, 2.0, params.lighter_rgb(), 0.08);

    if params.has_rings {
        let tilt = params.ring_tilt * PI / 180.0;
        for i in 0..RING_COUNT {
            let ir = r * (1.2 + i as f64 * 0.04);
            let (rgb, alpha) = if i % 2 == 0 {
                ([200, 200, 200], 0.5)
            } else {
                ([160, 160, 160], 0.35)
            };
            stroke_ellipse(tex, (cx, cy), (ir, ir * 0.6), tilt, 1.2, rgb, alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planet::generate_planet;

    fn rocky(ocean: f64) -> PlanetParams {
        PlanetParams {
            category: PlanetCategory::Rocky,
            hue: 120.0,
            saturation: 0.6,
            lightness: 0.5,
            banding: 0.3,
            noise: 0.5,
            clouds: 0.4,
            ocean,
            has_rings: false,
            ring_tilt: 10.0,
        }
    }

    fn gaseous() -> PlanetParams {
        PlanetParams {
            category: PlanetCategory::Gaseous,
            ocean: 0.1,
            banding: 0.7,
            ..rocky(0.1)
        }
    }

    fn greys(tex: &TextureData) -> Vec<u8> {
        tex.pixels.chunks(4).map(|p| p[0]).collect()
    }

    #[test]
    fn sphere_buffers_have_equal_dimensions_and_are_opaque() {
        let textures = synthesize_sphere(42, &generate_planet(42), 64, 32, 2);
        for tex in [&textures.color, &textures.elevation] {
            assert_eq!(tex.width, 64);
            assert_eq!(tex.height, 32);
            assert_eq!(tex.pixels.len(), 64 * 32 * 4);
            assert!(tex.pixels.chunks(4).all(|p| p[3] == 255));
        }
    }

    #[test]
    fn sphere_synthesis_is_deterministic() {
        let params = rocky(0.5);
        let a = synthesize_sphere(7, &params, 48, 24, 1);
        let b = synthesize_sphere(7, &params, 48, 24, 1);
        assert_eq!(a, b);
        let c = synthesize_sphere(8, &params, 48, 24, 1);
        assert_ne!(a.color, c.color);
    }

    #[test]
    fn sphere_seam_matches_for_both_categories() {
        for seed in 0..50u32 {
            for params in [rocky(0.5), gaseous()] {
                for y in [0.0, 10.0, 31.0] {
                    let left = sphere_sample(seed, &params, (64, 32), (0.0, y));
                    let wrapped = sphere_sample(seed, &params, (64, 32), (64.0, y));
                    assert_eq!(left, wrapped, "seed {seed} {:?} y {y}", params.category);
                }
            }
        }
    }

    #[test]
    fn stride_fills_uniform_blocks() {
        let textures = synthesize_sphere(3, &rocky(0.4), 16, 16, 4);
        for by in (0..16).step_by(4) {
            for bx in (0..16).step_by(4) {
                let expected = textures.color.get(bx, by);
                for dy in 0..4 {
                    for dx in 0..4 {
                        assert_eq!(textures.color.get(bx + dx, by + dy), expected);
                    }
                }
            }
        }
    }

    #[test]
    fn stride_handles_partial_edge_blocks() {
        let textures = synthesize_sphere(3, &rocky(0.4), 10, 7, 3);
        assert_eq!(textures.color.pixels.len(), 10 * 7 * 4);
        // Last column block (x = 9) and last row block (y = 6) are 1 wide.
        let corner = sphere_sample(3, &rocky(0.4), (10, 7), (9.0, 6.0));
        assert_eq!(textures.color.get(9, 6), corner.color_rgba());
        assert_eq!(textures.elevation.get(9, 6), corner.elevation_rgba());
    }

    #[test]
    fn rocky_elevation_separates_ocean_and_land() {
        let textures = synthesize_sphere(11, &rocky(0.5), 96, 48, 1);
        let grey = greys(&textures.elevation);
        // Ocean: 0.4 + t*0.2 with t below the threshold (<= 0.5) -> <= 128.
        // Land: 0.6 + t*0.4 -> >= 153.
        assert!(grey.iter().all(|&g| g <= 128 || g >= 153));
        assert!(grey.iter().any(|&g| g <= 128), "expected some ocean");
        assert!(grey.iter().any(|&g| g >= 153), "expected some land");
    }

    #[test]
    fn higher_ocean_attribute_lowers_sea_level() {
        let ocean_pixels = |ocean: f64| {
            let textures = synthesize_sphere(5, &rocky(ocean), 256, 128, 2);
            greys(&textures.elevation).iter().filter(|&&g| g <= 128).count()
        };
        assert!(ocean_pixels(0.2) > ocean_pixels(0.8));
    }

    #[test]
    fn gaseous_elevation_is_mid_grey_and_up() {
        let textures = synthesize_sphere(9, &gaseous(), 64, 64, 1);
        let grey = greys(&textures.elevation);
        assert!(grey.iter().all(|&g| g >= 127));
        let min = *grey.iter().min().unwrap();
        let max = *grey.iter().max().unwrap();
        assert!(max > min, "bands should produce relief");
    }

    #[test]
    fn gaseous_rows_show_bands() {
        let params = gaseous();
        let textures = synthesize_sphere(9, &params, 32, 128, 1);
        let row_mean = |y: u32| -> f64 {
            (0..32).map(|x| textures.elevation.get(x, y)[0] as f64).sum::<f64>() / 32.0
        };
        let means: Vec<f64> = (0..128).map(row_mean).collect();
        let spread = means.iter().cloned().fold(f64::MIN, f64::max)
            - means.iter().cloned().fold(f64::MAX, f64::min);
        assert!(spread > 10.0, "band spread {spread}");
    }

    #[test]
    fn disc_is_transparent_outside_and_opaque_inside() {
        let params = PlanetParams { has_rings: false, clouds: 0.0, ..rocky(0.5) };
        let textures = synthesize_disc(1, &params, 100, 30.0, 1);
        assert_eq!(textures.color.width, textures.elevation.width);
        assert_eq!(textures.color.height, textures.elevation.height);
        assert_eq!(textures.elevation.get(50, 50)[3], 255);
        assert_eq!(textures.color.get(50, 50)[3], 255);
        assert_eq!(textures.elevation.get(2, 2), [0, 0, 0, 0]);
        assert_eq!(textures.color.get(2, 2), [0, 0, 0, 0]);
        // Elevation stops at the edge; the glow reaches just past it.
        assert_eq!(textures.elevation.get(50 + 32, 50)[3], 0);
    }

    #[test]
    fn rings_draw_outside_the_disc() {
        let without = PlanetParams { has_rings: false, ..gaseous() };
        let with = PlanetParams { has_rings: true, ring_tilt: 0.0, ..gaseous() };
        let plain = synthesize_disc(2, &without, 128, 30.0, 2);
        let ringed = synthesize_disc(2, &with, 128, 30.0, 2);
        // Untilted rings cross the horizontal axis at 1.2r..1.64r.
        let x = (64.0 + 30.0 * 1.4) as u32;
        assert_eq!(plain.color.get(x, 64)[3], 0);
        assert!(
            (60..=67).any(|y| ringed.color.get(x, y)[3] > 0),
            "expected ring pixels near ({x}, 64)"
        );
        assert_eq!(plain.elevation, ringed.elevation);
    }

    #[test]
    fn clouds_only_above_threshold() {
        let clear = PlanetParams { clouds: 0.1, ..rocky(0.5) };
        let cloudy = PlanetParams { clouds: 0.6, ..rocky(0.5) };
        let a = synthesize_disc(4, &clear, 96, 40.0, 1);
        let b = synthesize_disc(4, &cloudy, 96, 40.0, 1);
        assert_ne!(a.color, b.color);
        // Cloud cover 0.1 vs 0.14 are both below the threshold: same image.
        let also_clear = PlanetParams { clouds: 0.14, ..rocky(0.5) };
        assert_eq!(a.color, synthesize_disc(4, &also_clear, 96, 40.0, 1).color);
    }

    #[test]
    fn disc_synthesis_is_deterministic() {
        let params = generate_planet(42);
        assert_eq!(
            synthesize_disc(42, &params, 80, 24.0, 2),
            synthesize_disc(42, &params, 80, 24.0, 2)
        );
    }

    #[test]
    #[should_panic(expected = "stride must be in")]
    fn zero_stride_panics() {
        synthesize_sphere(1, &rocky(0.5), 8, 8, 0);
    }

    #[test]
    #[should_panic(expected = "stride must be in")]
    fn oversized_stride_panics() {
        synthesize_disc(1, &rocky(0.5), 8, 3.0, MAX_STRIDE + 1);
    }

    #[test]
    fn ocean_threshold_drops_with_ocean_cover() {
        assert_eq!(ocean_threshold(&rocky(0.0)), 0.5);
        assert!(ocean_threshold(&rocky(0.8)) < ocean_threshold(&rocky(0.2)));
    }
}
