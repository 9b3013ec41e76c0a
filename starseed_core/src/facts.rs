// Planet "facts": a name and a few plausible-sounding figures.
//
// Flavour text for the info panel next to a selected planet. Nothing here is
// astrophysics; the ranges are picked to read believably for each category.
//
// Derived from its own `StarRng`, seeded with `seed ^ FACTS_STREAM_SALT`, so
// it never perturbs the attribute stream in `planet.rs`. Draw order:
//
//   syllable count, syllables, designation number, radius, temperature,
//   elements (one draw per element)
//
// Names are 2–3 syllables from a fixed table, capitalized, followed by a
// catalogue designation such as `Kazetor-412`.

use serde::{Deserialize, Serialize};
use starseed_prng::StarRng;

use crate::planet::{PlanetCategory, PlanetParams};

/// XORed into the planet seed to get an independent facts stream.
pub const FACTS_STREAM_SALT: u32 = 0x5EED_FAC7;

const SYLLABLES: &[&str] = &[
    "ka", "ze", "tor", "vel", "ni", "or", "xa", "lu", "rem", "sa", "thi", "quo", "bel", "dra",
    "mi", "on",
];

const ROCKY_ELEMENTS: &[&str] = &["Fe", "O", "Si", "Mg", "Ni", "S", "Al", "Ca"];
const GASEOUS_ELEMENTS: &[&str] = &["H", "He", "CH4", "NH3", "H2O", "Ne"];

/// Number of main elements listed per planet.
pub const ELEMENT_COUNT: usize = 3;

/// Descriptive record for a planet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanetFacts {
    pub name: String,
    pub category: PlanetCategory,
    pub radius_km: u32,
    pub avg_temp_k: u32,
    /// Distinct entries, most abundant first.
    pub elements: Vec<String>,
}

/// Generate the facts record for a planet.
pub fn generate_facts(seed: u32, params: &PlanetParams) -> PlanetFacts {
    let mut rng = StarRng::new(seed ^ FACTS_STREAM_SALT);

    let syllable_count = rng.range_usize(2, 4);
    let stem: String = (0..syllable_count).map(|_| *rng.choose(SYLLABLES)).collect();
    let designation = rng.range_usize(1, 1000);
    let name = format!("{}-{}", capitalize(&stem), designation);

    let (radius_km, avg_temp_k, table) = match params.category {
        PlanetCategory::Rocky => {
            let radius = rng.range_f64(2000.0, 9000.0);
            // Wetter worlds read cooler.
            let temp = rng.range_f64(180.0, 420.0) - params.ocean * 40.0;
            (radius, temp, ROCKY_ELEMENTS)
        }
        PlanetCategory::Gaseous => {
            let radius = rng.range_f64(20_000.0, 75_000.0);
            let temp = rng.range_f64(60.0, 180.0);
            (radius, temp, GASEOUS_ELEMENTS)
        }
    };

    PlanetFacts {
        name,
        category: params.category,
        radius_km: radius_km.round() as u32,
        avg_temp_k: avg_temp_k.round() as u32,
        elements: pick_distinct(&mut rng, table, ELEMENT_COUNT),
    }
}

/// Pick `count` distinct entries, one draw each, without replacement.
fn pick_distinct(rng: &mut StarRng, table: &[&str], count: usize) -> Vec<String> {
    let mut pool: Vec<&str> = table.to_vec();
    (0..count.min(table.len()))
        .map(|_| pool.remove(rng.range_usize(0, pool.len())).to_string())
        .collect()
}

/// Capitalize the first character of a string.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => {
            let upper: String = c.to_uppercase().collect();
            format!("{}{}", upper, chars.as_str())
        }
    }
}
