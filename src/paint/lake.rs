//! Chained square lakes with a one-tile sand rim.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::Distribution;
use tracing::{debug, warn};

use super::base_designation;
use crate::config::LakeConfig;
use crate::error::Result;
use crate::tile_set::TileIndex;
use crate::tilemap::Tilemap;
use crate::tiles::{Terrain, TileId};

/// One square lake. A radius of zero or less is a single water tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lake {
    pub center: (i64, i64),
    pub radius: i64,
}

/// Lakes that overlap each other, painted in order.
pub type LakeChain = Vec<Lake>;

/// Draw the lake chains for a world of the given size.
///
/// A chain starts at a uniform point at least `margin` tiles from every
/// edge; each further lake is offset from a random earlier lake of the same
/// chain. Worlds too small for the margin get no lakes.
pub fn generate_chain_lakes<R: Rng>(rng: &mut R, sizes: (usize, usize), config: &LakeConfig) -> Result<Vec<LakeChain>> {
    let (width, height) = sizes;
    let margin = config.margin;
    if width < margin * 2 || height < margin * 2 {
        warn!(width, height, margin, "world is too small for the lake margin, skipping lakes");
        return Ok(Vec::new());
    }

    let count_dist = config.count.normal()?;
    let length_dist = config.chain_length.normal()?;
    let offset_dist = config.offset.normal()?;
    let radius_dist = config.radius.normal()?;

    let chain_count = (count_dist.sample(rng) as i64).max(0);
    let mut chains = Vec::with_capacity(chain_count as usize);

    for _ in 0..chain_count {
        let first = (
            rng.gen_range(margin..=width - margin) as i64,
            rng.gen_range(margin..=height - margin) as i64,
        );
        let length = (length_dist.sample(rng) as i64).max(1);

        let mut chain: LakeChain = Vec::with_capacity(length as usize);
        for _ in 0..length {
            let center = match chain.choose(rng) {
                Some(anchor) => {
                    let (cx, cy) = anchor.center;
                    let dx = offset_dist.sample(rng) * random_sign(rng);
                    let dy = offset_dist.sample(rng) * random_sign(rng);
                    ((cx as f64 + dx) as i64, (cy as f64 + dy) as i64)
                }
                None => first,
            };
            let radius = radius_dist.sample(rng) as i64;
            chain.push(Lake { center, radius });
        }

        debug!(lakes = chain.len(), center = ?first, "generated lake chain");
        chains.push(chain);
    }

    Ok(chains)
}

fn random_sign<R: Rng>(rng: &mut R) -> f64 {
    if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}

/// Paint each lake of a chain as a water square ringed by sand.
///
/// Sand never replaces water, so overlapping lakes merge instead of rimming
/// each other. Cells past the map edge are skipped.
pub fn paint_square_lake_chain(base: &mut Tilemap<u8>, primary: &TileIndex, chain: &[Lake]) -> Result<()> {
    let water = base_designation(primary, TileId::Terrain(Terrain::Water))?;
    let sand = base_designation(primary, TileId::Terrain(Terrain::Sand))?;

    for lake in chain {
        let radius = lake.radius.max(0);
        let (cx, cy) = lake.center;

        for dx in -radius..=radius {
            for dy in -radius..=radius {
                let (x, y) = (cx + dx, cy + dy);
                if !base.in_bounds(x, y) {
                    continue;
                }
                let (x, y) = (x as usize, y as usize);

                let on_rim = radius > 0 && (dx.abs() == radius || dy.abs() == radius);
                if on_rim {
                    if *base.get(x, y) != water {
                        base.set(x, y, sand);
                    }
                } else {
                    base.set(x, y, water);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_single_lake_shape() {
        let index = primary();
        let grass = terrain(&index, Terrain::Grass);
        let water = terrain(&index, Terrain::Water);
        let sand = terrain(&index, Terrain::Sand);

        let mut base = Tilemap::new_with(12, 12, grass);
        paint_square_lake_chain(&mut base, &index, &[Lake { center: (5, 5), radius: 2 }]).unwrap();

        assert_eq!(*base.get(5, 5), water);
        assert_eq!(*base.get(6, 4), water);
        assert_eq!(*base.get(7, 5), sand);
        assert_eq!(*base.get(3, 3), sand);
        assert_eq!(*base.get(8, 5), grass);
        let water_cells = base.iter().filter(|(_, _, &v)| v == water).count();
        let sand_cells = base.iter().filter(|(_, _, &v)| v == sand).count();
        assert_eq!(water_cells, 9);
        assert_eq!(sand_cells, 16);
    }

    #[test]
    fn test_overlapping_lakes_keep_water() {
        let index = primary();
        let grass = terrain(&index, Terrain::Grass);
        let water = terrain(&index, Terrain::Water);
        let sand = terrain(&index, Terrain::Sand);

        let first = Lake { center: (10, 10), radius: 4 };
        let second = Lake { center: (15, 12), radius: 4 };
        let mut base = Tilemap::new_with(30, 30, grass);
        paint_square_lake_chain(&mut base, &index, &[first]).unwrap();
        let before = base.clone();
        paint_square_lake_chain(&mut base, &index, &[second]).unwrap();

        for (x, y, &v) in before.iter() {
            if v == water {
                assert_ne!(*base.get(x, y), sand, "water at ({}, {}) was rimmed", x, y);
            }
        }
        // the second lake's interior still floods the first lake's rim
        assert_eq!(*base.get(14, 10), water);
    }

    #[test]
    fn test_degenerate_radius_is_one_tile() {
        let index = primary();
        let grass = terrain(&index, Terrain::Grass);
        let water = terrain(&index, Terrain::Water);

        let mut base = Tilemap::new_with(5, 5, grass);
        let chain = [Lake { center: (2, 2), radius: 0 }, Lake { center: (0, 4), radius: -3 }];
        paint_square_lake_chain(&mut base, &index, &chain).unwrap();

        assert_eq!(*base.get(2, 2), water);
        assert_eq!(*base.get(0, 4), water);
        assert_eq!(base.iter().filter(|(_, _, &v)| v == water).count(), 2);
    }

    #[test]
    fn test_lakes_at_edge_stay_in_bounds() {
        let index = primary();
        let grass = terrain(&index, Terrain::Grass);
        let mut base = Tilemap::new_with(6, 6, grass);
        let chain = [Lake { center: (0, 0), radius: 4 }, Lake { center: (6, 7), radius: 2 }];
        paint_square_lake_chain(&mut base, &index, &chain).unwrap();
        assert_eq!(*base.get(0, 0), terrain(&index, Terrain::Water));
    }

    #[test]
    fn test_chain_generation() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let config = LakeConfig::default();
        let chains = generate_chain_lakes(&mut rng, (200, 200), &config).unwrap();

        for chain in &chains {
            assert!(!chain.is_empty());
            let (x, y) = chain[0].center;
            assert!((24..=176).contains(&x) && (24..=176).contains(&y));
        }

        let mut again = ChaCha8Rng::seed_from_u64(11);
        assert_eq!(chains, generate_chain_lakes(&mut again, (200, 200), &config).unwrap());
    }

    #[test]
    fn test_small_world_has_no_lakes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let chains = generate_chain_lakes(&mut rng, (20, 20), &LakeConfig::default()).unwrap();
        assert!(chains.is_empty());
    }
}
