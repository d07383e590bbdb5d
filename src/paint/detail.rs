//! Grass decorations on the detail layer.
//!
//! A placement field decides where decorations go at all. Two more fields
//! are each split into three buckets, and the bucket pair picks which
//! weighted distribution the decoration is drawn from, so flowers, logs
//! and plain texture form their own patches.

use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{base_designation, detail_designation};
use crate::config::DecorationConfig;
use crate::error::{Result, WorldError};
use crate::generators::{range_convert, CoherentNoise, Generator};
use crate::seeds::column_seed;
use crate::tile_set::TileIndex;
use crate::tilemap::{ColumnBand, Tilemap};
use crate::tiles::{Terrain, TileId};
use crate::world::NONE_DETAIL;

/// Bucket of a bucket-field value: 0, 1 or 2.
pub fn bucket(value: f64) -> usize {
    let scaled = range_convert(-0.5, 0.5, 0.0, 30.0, value);
    if scaled <= 13.0 {
        0
    } else if scaled < 17.0 {
        1
    } else {
        2
    }
}

/// A distribution resolved to detail designations.
#[derive(Clone, Debug)]
struct WeightedChoice {
    designations: Vec<i16>,
    weights: WeightedIndex<f64>,
}

impl WeightedChoice {
    fn pick(&self, rng: &mut ChaCha8Rng) -> i16 {
        self.designations[self.weights.sample(rng)]
    }
}

/// Everything needed to decorate a band, built once per world.
#[derive(Clone, Debug)]
pub struct DecorationPainter {
    grass: u8,
    placement: CoherentNoise,
    bucket_a: CoherentNoise,
    bucket_b: CoherentNoise,
    place_below: f64,
    place_above: f64,
    cells: Vec<WeightedChoice>,
}

impl DecorationPainter {
    /// `extent` is the size of the detail layer, which the fields repeat over.
    pub fn new(
        config: &DecorationConfig,
        primary: &TileIndex,
        detail: &TileIndex,
        extent: (usize, usize),
    ) -> Result<Self> {
        let mut cells = Vec::with_capacity(9);
        for row in &config.table.cells {
            for dist in row {
                let designations = dist
                    .choices
                    .iter()
                    .map(|&(decoration, _)| detail_designation(detail, TileId::Decoration(decoration)))
                    .collect::<Result<Vec<_>>>()?;
                let weights = WeightedIndex::new(dist.choices.iter().map(|&(_, w)| w)).map_err(|e| {
                    WorldError::InvalidConfig(format!("decoration distribution {}: {}", dist.name, e))
                })?;
                cells.push(WeightedChoice { designations, weights });
            }
        }

        Ok(Self {
            grass: base_designation(primary, TileId::Terrain(Terrain::Grass))?,
            placement: CoherentNoise::new(config.placement, extent),
            bucket_a: CoherentNoise::new(config.bucket_a, extent),
            bucket_b: CoherentNoise::new(config.bucket_b, extent),
            place_below: config.place_below,
            place_above: config.place_above,
            cells,
        })
    }

    fn places_at(&self, x: f64, y: f64) -> bool {
        let v = self.placement.value(x, y);
        v <= self.place_below || v >= self.place_above
    }

    /// Decorate the detail cells of a band.
    ///
    /// Only cells over plain grass that no edge has claimed are touched.
    /// Draws come from one RNG per detail column.
    pub fn paint(&self, band: &mut ColumnBand<'_, i16>, base: &Tilemap<u8>, seed: u64) {
        for x in band.columns() {
            let mut rng = ChaCha8Rng::seed_from_u64(column_seed(seed, x));
            for y in 0..band.height() {
                if *base.get(x / 2, y / 2) != self.grass || *band.get(x, y) != NONE_DETAIL {
                    continue;
                }
                let (fx, fy) = (x as f64, y as f64);
                if !self.places_at(fx, fy) {
                    continue;
                }

                let a = bucket(self.bucket_a.value(fx, fy));
                let b = bucket(self.bucket_b.value(fx, fy));
                band.set(x, y, self.cells[a * 3 + b].pick(&mut rng));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::Distribution as Weighted;
    use crate::tiles::Decoration;

    fn everywhere() -> DecorationConfig {
        // the placement field never reaches 10.0
        DecorationConfig {
            place_below: 10.0,
            place_above: 10.0,
            ..DecorationConfig::default()
        }
    }

    fn decorate(base: &Tilemap<u8>, detail: &mut Tilemap<i16>, painter: &DecorationPainter, ranges: &[std::ops::Range<usize>]) {
        for band in detail.column_bands_mut(ranges).iter_mut() {
            painter.paint(band, base, 17);
        }
    }

    #[test]
    fn test_bucket_bounds() {
        assert_eq!(bucket(-1.0), 0);
        assert_eq!(bucket(-0.0667), 0);
        assert_eq!(bucket(0.0), 1);
        assert_eq!(bucket(0.06), 1);
        assert_eq!(bucket(0.07), 2);
        assert_eq!(bucket(1.0), 2);
    }

    #[test]
    fn test_only_plain_grass_is_decorated() {
        let (primary, detail_index) = (primary(), detail());
        let painter = DecorationPainter::new(&everywhere(), &primary, &detail_index, (8, 8)).unwrap();

        let mut base = Tilemap::new_with(4, 4, terrain(&primary, Terrain::Grass));
        base.set(0, 0, terrain(&primary, Terrain::Stone));
        let mut detail = Tilemap::new_with(8, 8, NONE_DETAIL);
        // an edge piece already sits here
        detail.set(5, 5, 3);
        decorate(&base, &mut detail, &painter, &[0..8]);

        for (x, y, &v) in detail.iter() {
            if x < 2 && y < 2 {
                assert_eq!(v, NONE_DETAIL);
            } else if (x, y) == (5, 5) {
                assert_eq!(v, 3);
            } else {
                let id = detail_index.identifier_of(v as u16).unwrap();
                match id {
                    TileId::Decoration(d) => assert_eq!(d.terrain(), Terrain::Grass),
                    other => panic!("unexpected tile {} at ({}, {})", other, x, y),
                }
            }
        }
    }

    #[test]
    fn test_placement_includes_the_band_limits() {
        let (primary, detail_index) = (primary(), detail());
        let config = DecorationConfig::default();
        let reference = DecorationPainter::new(&config, &primary, &detail_index, (8, 8)).unwrap();
        let v = reference.placement.value(3.0, 5.0);

        let with_band = |below: f64, above: f64| {
            let config = DecorationConfig {
                place_below: below,
                place_above: above,
                ..DecorationConfig::default()
            };
            DecorationPainter::new(&config, &primary, &detail_index, (8, 8)).unwrap()
        };
        assert!(with_band(v, v + 1.0).places_at(3.0, 5.0));
        assert!(with_band(v - 1.0, v).places_at(3.0, 5.0));
        assert!(!with_band(v - 1.0, v + 1.0).places_at(3.0, 5.0));
    }

    #[test]
    fn test_decoration_is_partition_invariant() {
        let (primary, detail_index) = (primary(), detail());
        let painter = DecorationPainter::new(&DecorationConfig::default(), &primary, &detail_index, (40, 40)).unwrap();
        let base = Tilemap::new_with(20, 20, terrain(&primary, Terrain::Grass));

        let mut whole = Tilemap::new_with(40, 40, NONE_DETAIL);
        decorate(&base, &mut whole, &painter, &[0..40]);
        let mut split = Tilemap::new_with(40, 40, NONE_DETAIL);
        decorate(&base, &mut split, &painter, &[0..6, 6..22, 22..40]);

        assert_eq!(whole, split);
    }

    #[test]
    fn test_single_choice_table() {
        let (primary, detail_index) = (primary(), detail());
        let mut config = everywhere();
        let only_rock = Weighted {
            name: "ROCK".to_string(),
            choices: vec![(Decoration::GrassRockA, 1.0)],
        };
        for row in config.table.cells.iter_mut() {
            for cell in row.iter_mut() {
                *cell = only_rock.clone();
            }
        }
        let painter = DecorationPainter::new(&config, &primary, &detail_index, (4, 4)).unwrap();

        let base = Tilemap::new_with(2, 2, terrain(&primary, Terrain::Grass));
        let mut detail = Tilemap::new_with(4, 4, NONE_DETAIL);
        decorate(&base, &mut detail, &painter, &[0..2, 2..4]);

        let rock = detail_index
            .designation_of(TileId::Decoration(Decoration::GrassRockA))
            .unwrap() as i16;
        assert!(detail.iter().all(|(_, _, &v)| v == rock));
    }

    #[test]
    fn test_zero_weights_are_rejected() {
        let (primary, detail_index) = (primary(), detail());
        let mut config = DecorationConfig::default();
        config.table.cells[1][1].choices = vec![(Decoration::GrassFlowerA, 0.0)];
        assert!(matches!(
            DecorationPainter::new(&config, &primary, &detail_index, (4, 4)),
            Err(WorldError::InvalidConfig(_))
        ));
    }
}
