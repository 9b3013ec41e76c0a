// Infinite tiled star world.
//
// The world plane is cut into square tiles of `tile_size` world units. Each
// tile's stars are a pure function of `(world_seed, tile, tile_size,
// stars_per_tile)`: `stars_in_tile()` seeds a fresh `StarRng` with
// `tile_seed(world_seed, tile)` and draws, per star, x offset, y offset and
// the planet seed. No tile reads another tile's stream, so tiles can be
// generated in any order, on any thread, and regenerated at will. Nothing is
// stored; the explorer re-derives visible tiles every frame.
//
// `TileCache` is an optional LRU memo on top of `stars_in_tile()` for the
// explorer. It is bound to one world key and clears itself when the key
// changes, so a cached answer is always the answer the generator would give.
//
// `scatter_field()` is the bounded variant: a fixed number of stars spread
// over one `width x height` rectangle from a single stream.
//
// See also: `types.rs` for `Star` and `TileCoord`, `viewport.rs` for the
// visible tile range, `picking.rs` for hit-testing against tile contents.

use std::sync::Arc;

use log::{debug, trace};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use starseed_prng::StarRng;

use crate::types::{Star, TileCoord};

/// Per-tile stream seed. Wrapping integer mix of the world seed and the
/// tile coordinates; tile (0, 0) uses the world seed itself.
pub fn tile_seed(world_seed: u32, tile: TileCoord) -> u32 {
    world_seed
        ^ (tile.tx as u32).wrapping_mul(0x9E37_79B1)
        ^ (tile.ty as u32).wrapping_mul(0x85EB_CA77)
}

fn assert_tile_size(tile_size: f64) {
    assert!(
        tile_size > 0.0 && tile_size.is_finite(),
        "stars_in_tile: tile_size must be positive and finite, got {tile_size}"
    );
}

/// Generate the stars of one tile, ordered by id.
pub fn stars_in_tile(
    world_seed: u32,
    tile: TileCoord,
    tile_size: f64,
    stars_per_tile: u32,
) -> Vec<Star> {
    assert_tile_size(tile_size);
    trace!("generating {stars_per_tile} stars for tile {tile}");

    let origin = tile.origin(tile_size);
    let mut rng = StarRng::new(tile_seed(world_seed, tile));
    (0..stars_per_tile)
        .map(|id| {
            let x = origin.x + rng.next_f64() * tile_size;
            let y = origin.y + rng.next_f64() * tile_size;
            let seed = rng.next_u32();
            Star { id, tile, x, y, seed }
        })
        .collect()
}

/// The tile containing `center` and its eight neighbours, row by row.
pub fn neighborhood(center: TileCoord) -> SmallVec<[TileCoord; 9]> {
    let mut tiles = SmallVec::new();
    for dy in -1..=1 {
        for dx in -1..=1 {
            tiles.push(TileCoord::new(center.tx + dx, center.ty + dy));
        }
    }
    tiles
}

/// A bounded field of `count` stars over `[0, width) x [0, height)`, all
/// drawn from one stream seeded with `seed`. Stars carry tile (0, 0).
pub fn scatter_field(seed: u32, count: u32, width: f64, height: f64) -> Vec<Star> {
    let mut rng = StarRng::new(seed);
    (0..count)
        .map(|id| {
            let x = rng.next_f64() * width;
            let y = rng.next_f64() * height;
            let seed = rng.next_u32();
            Star { id, tile: TileCoord::new(0, 0), x, y, seed }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tile cache
// ---------------------------------------------------------------------------

/// The parameters that fully determine tile contents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldKey {
    pub world_seed: u32,
    pub tile_size: f64,
    pub stars_per_tile: u32,
}

impl WorldKey {
    pub fn generate(&self, tile: TileCoord) -> Vec<Star> {
        stars_in_tile(self.world_seed, tile, self.tile_size, self.stars_per_tile)
    }
}

#[derive(Debug)]
struct CacheEntry {
    stars: Arc<[Star]>,
    last_used: u64,
}

/// Least-recently-used memo of generated tiles for one world.
///
/// Capacity 0 disables caching; every lookup then generates.
#[derive(Debug)]
pub struct TileCache {
    key: Option<WorldKey>,
    capacity: usize,
    entries: FxHashMap<TileCoord, CacheEntry>,
    clock: u64,
}

impl TileCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            key: None,
            capacity,
            entries: FxHashMap::default(),
            clock: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Whether a tile is currently held for the given world.
    pub fn contains(&self, key: &WorldKey, tile: TileCoord) -> bool {
        self.key.as_ref() == Some(key) && self.entries.contains_key(&tile)
    }

    /// Rebind to `key`, dropping everything cached for another world.
    fn bind(&mut self, key: &WorldKey) {
        if self.key.as_ref() != Some(key) {
            if !self.entries.is_empty() {
                debug!(
                    "tile cache reset: world changed, dropping {} tiles",
                    self.entries.len()
                );
            }
            self.entries.clear();
            self.key = Some(*key);
        }
    }

    fn touch(&mut self, tile: TileCoord) -> Option<Arc<[Star]>> {
        self.clock += 1;
        let clock = self.clock;
        self.entries.get_mut(&tile).map(|entry| {
            entry.last_used = clock;
            Arc::clone(&entry.stars)
        })
    }

    fn insert(&mut self, tile: TileCoord, stars: Arc<[Star]>) {
        self.clock += 1;
        self.entries.insert(tile, CacheEntry { stars, last_used: self.clock });
    }

    /// Drop least-recently-used entries until at most `limit` remain.
    fn evict_to(&mut self, limit: usize) {
        let excess = self.entries.len().saturating_sub(limit);
        if excess == 0 {
            return;
        }
        let mut by_age: Vec<(u64, TileCoord)> = self
            .entries
            .iter()
            .map(|(&tile, entry)| (entry.last_used, tile))
            .collect();
        by_age.select_nth_unstable(excess - 1);
        for &(_, tile) in &by_age[..excess] {
            self.entries.remove(&tile);
        }
        debug!("tile cache evicted {excess} tiles");
    }

    /// Stars of one tile, from the cache or freshly generated.
    pub fn tile(&mut self, key: &WorldKey, tile: TileCoord) -> Arc<[Star]> {
        self.bind(key);
        if let Some(stars) = self.touch(tile) {
            return stars;
        }
        let stars: Arc<[Star]> = key.generate(tile).into();
        if self.capacity > 0 {
            self.insert(tile, Arc::clone(&stars));
            self.evict_to(self.capacity);
        }
        stars
    }

    /// Stars of several tiles, in the order requested. Misses are generated
    /// in parallel.
    ///
    /// Eviction runs once after the batch and never drops a requested tile,
    /// so the cache may hold more than `capacity` tiles until the next
    /// single-tile lookup when the batch is larger than `capacity`.
    pub fn tiles(&mut self, key: &WorldKey, tiles: &[TileCoord]) -> Vec<Arc<[Star]>> {
        self.bind(key);
        let mut found: Vec<Option<Arc<[Star]>>> = tiles.iter().map(|&t| self.touch(t)).collect();

        let misses: Vec<(usize, TileCoord)> = found
            .iter()
            .enumerate()
            .filter(|(_, hit)| hit.is_none())
            .map(|(i, _)| (i, tiles[i]))
            .collect();
        if !misses.is_empty() {
            trace!("tile cache: {} hits, {} misses", tiles.len() - misses.len(), misses.len());
        }
        let generated: Vec<(usize, TileCoord, Arc<[Star]>)> = misses
            .par_iter()
            .map(|&(i, tile)| (i, tile, Arc::from(key.generate(tile))))
            .collect();

        for (i, tile, stars) in generated {
            found[i] = Some(Arc::clone(&stars));
            if self.capacity > 0 {
                self.insert(tile, stars);
            }
        }
        if self.capacity > 0 {
            self.evict_to(self.capacity.max(tiles.len()));
        }
        found.into_iter().flatten().collect()
    }
}
