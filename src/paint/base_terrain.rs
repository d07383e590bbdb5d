//! First-pass terrain painters.
//!
//! Each one fills a band of the `base` layer from scratch, so they are meant
//! for blank worlds and are not combined with each other.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{base_designation, terrain_designations};
use crate::error::Result;
use crate::generators::{CoherentNoise, Generator};
use crate::seeds::column_seed;
use crate::tile_set::TileIndex;
use crate::tilemap::ColumnBand;
use crate::tiles::{Terrain, TileId};

/// A scattered Voronoi site and the terrain it spreads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoronoiPoint {
    pub pos: (usize, usize),
    pub terrain: Terrain,
}

/// Fill the band with grass.
pub fn only_grass(band: &mut ColumnBand<'_, u8>, primary: &TileIndex) -> Result<()> {
    let grass = base_designation(primary, TileId::Terrain(Terrain::Grass))?;
    for x in band.columns() {
        for y in 0..band.height() {
            band.set(x, y, grass);
        }
    }
    Ok(())
}

/// Band a noise value into stone / dirt / grass / dirt / stone.
pub fn classify_noise(value: f64) -> Terrain {
    if value < -0.4 {
        Terrain::Stone
    } else if value < -0.35 {
        Terrain::Dirt
    } else if value < 0.35 {
        Terrain::Grass
    } else if value < 0.4 {
        Terrain::Dirt
    } else {
        Terrain::Stone
    }
}

/// Classify every cell of the band from one coherent noise field.
pub fn perlin_classify(band: &mut ColumnBand<'_, u8>, primary: &TileIndex, noise: &CoherentNoise) -> Result<()> {
    let designations = terrain_designations(primary)?;
    for x in band.columns() {
        for y in 0..band.height() {
            let terrain = classify_noise(noise.value(x as f64, y as f64));
            band.set(x, y, designations[terrain.index() as usize]);
        }
    }
    Ok(())
}

/// Scatter `count` Voronoi sites uniformly over the world.
pub fn make_voronoi_points<R: Rng>(
    rng: &mut R,
    sizes: (usize, usize),
    count: usize,
    choices: &[Terrain],
) -> Vec<VoronoiPoint> {
    let (width, height) = sizes;
    let mut points = Vec::with_capacity(count);
    if width == 0 || height == 0 {
        return points;
    }

    for _ in 0..count {
        let terrain = match choices.choose(rng) {
            Some(&terrain) => terrain,
            None => break,
        };
        let x = rng.gen_range(0..width);
        let y = rng.gen_range(0..height);
        points.push(VoronoiPoint { pos: (x, y), terrain });
    }
    points
}

/// Give every cell the terrain of its nearest site, or `default` when no
/// site is closer than `max_dist`. The first of several equidistant sites
/// wins.
pub fn voronoi_classify(
    band: &mut ColumnBand<'_, u8>,
    primary: &TileIndex,
    points: &[VoronoiPoint],
    max_dist: f64,
    default: Terrain,
) -> Result<()> {
    let designations = terrain_designations(primary)?;
    for x in band.columns() {
        for y in 0..band.height() {
            let mut closest_dist = f64::INFINITY;
            let mut choice = default;

            for point in points {
                let dist = (point.pos.0 as f64 - x as f64).hypot(point.pos.1 as f64 - y as f64);
                if dist < closest_dist && dist < max_dist {
                    closest_dist = dist;
                    choice = point.terrain;
                }
            }

            band.set(x, y, designations[choice.index() as usize]);
        }
    }
    Ok(())
}

/// Uniformly random terrain per cell. Diagnostic only.
///
/// Every column draws from its own RNG so the output does not depend on how
/// the world was split into bands.
pub fn stochastic(band: &mut ColumnBand<'_, u8>, primary: &TileIndex, seed: u64) -> Result<()> {
    let designations = terrain_designations(primary)?;
    for x in band.columns() {
        let mut rng = ChaCha8Rng::seed_from_u64(column_seed(seed, x));
        for y in 0..band.height() {
            let pick = rng.gen_range(0..designations.len());
            band.set(x, y, designations[pick]);
        }
    }
    Ok(())
}
