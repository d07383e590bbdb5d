//! Zone histograms and the plurality (`base_average`) layer.
//!
//! Counts are rebuilt with a full rescan after every stage that touches
//! `base`; painters never maintain them incrementally.

use tracing::debug;

use crate::world::{WorldGrid, NO_TERRAIN};

/// Rebuild every zone histogram from the `base` layer.
///
/// Cells still holding [`NO_TERRAIN`] are not counted.
pub fn recount_zones(grid: &mut WorldGrid) {
    let zone_len = grid.zone_len();
    let kinds = grid.counts.kinds();
    grid.counts.clear();

    let mut skipped = 0usize;
    for (x, y, &designation) in grid.base.iter() {
        let d = designation as usize;
        if designation == NO_TERRAIN || d >= kinds {
            skipped += 1;
            continue;
        }
        grid.counts.zone_mut(x / zone_len, y / zone_len)[d] += 1;
    }

    if skipped > 0 {
        debug!(skipped, "recount left unassigned cells out of the zone histograms");
    }
}

/// Plurality designation of one histogram.
///
/// Ties go to the lowest designation, i.e. the one registered first. An
/// empty histogram has no plurality and yields [`NO_TERRAIN`].
pub fn plurality(counts: &[u32]) -> u8 {
    let mut best = NO_TERRAIN;
    let mut best_count = 0;
    for (designation, &count) in counts.iter().enumerate() {
        if count > best_count {
            best = designation as u8;
            best_count = count;
        }
    }
    best
}

/// Set each zone's `base_average` to the plurality of its histogram.
pub fn assign_averages(grid: &mut WorldGrid) {
    let (zones_x, zones_y) = grid.zones();
    for zx in 0..zones_x {
        for zy in 0..zones_y {
            let average = plurality(grid.counts.zone(zx, zy));
            grid.base_average.set(zx, zy, average);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::tiles::Terrain;

    #[test]
    fn test_tie_goes_to_earlier_terrain() {
        let index = primary();
        let grass = terrain(&index, Terrain::Grass);
        let dirt = terrain(&index, Terrain::Dirt);

        let mut grid = WorldGrid::new(10, 10, 10, &index).unwrap();
        for x in 0..10 {
            for y in 0..10 {
                // exact 50/50 split with dirt written first
                let value = if x < 5 { dirt } else { grass };
                grid.base.set(x, y, value);
            }
        }

        recount_zones(&mut grid);
        assert_eq!(grid.counts.zone(0, 0)[grass as usize], 50);
        assert_eq!(grid.counts.zone(0, 0)[dirt as usize], 50);

        assign_averages(&mut grid);
        assert_eq!(*grid.base_average.get(0, 0), grass);
    }

    #[test]
    fn test_average_is_strict_maximum() {
        let index = primary();
        let stone = terrain(&index, Terrain::Stone);
        let sand = terrain(&index, Terrain::Sand);

        let mut grid = WorldGrid::new(20, 10, 10, &index).unwrap();
        grid.base.fill(stone);
        grid.base.set(0, 0, sand);
        for y in 0..10 {
            for x in 10..16 {
                grid.base.set(x, y, sand);
            }
        }

        recount_zones(&mut grid);
        assign_averages(&mut grid);

        assert_eq!(*grid.base_average.get(0, 0), stone);
        assert_eq!(*grid.base_average.get(1, 0), sand);
        for zx in 0..2 {
            let counts = grid.counts.zone(zx, 0);
            let avg = *grid.base_average.get(zx, 0) as usize;
            assert!(counts.iter().all(|&c| c <= counts[avg]));
        }
    }

    #[test]
    fn test_recount_replaces_stale_counts() {
        let index = primary();
        let grass = terrain(&index, Terrain::Grass);
        let water = terrain(&index, Terrain::Water);

        let mut grid = WorldGrid::new(10, 10, 10, &index).unwrap();
        grid.base.fill(grass);
        recount_zones(&mut grid);
        grid.base.fill(water);
        recount_zones(&mut grid);

        assert_eq!(grid.counts.zone(0, 0)[grass as usize], 0);
        assert_eq!(grid.counts.zone(0, 0)[water as usize], 100);
    }

    #[test]
    fn test_empty_zone_has_no_average() {
        let index = primary();
        let mut grid = WorldGrid::new(10, 10, 10, &index).unwrap();

        recount_zones(&mut grid);
        assign_averages(&mut grid);
        assert_eq!(*grid.base_average.get(0, 0), NO_TERRAIN);
    }
}
