//! World data container module
//!
//! Bundles every layer of a generated world into a single struct. The layers
//! share one x/y extent at three resolutions: `base` per tile, `detail` per
//! tile quadrant, `base_average` per zone.

use crate::error::{Result, WorldError};
use crate::tile_set::TileIndex;
use crate::tilemap::Tilemap;

/// `base` value for a cell no painter has written yet.
pub const NO_TERRAIN: u8 = u8::MAX;

/// `detail` value meaning "draw nothing here".
pub const NONE_DETAIL: i16 = -1;

/// Default averaging zone edge length in tiles.
pub const DEFAULT_ZONE_LEN: usize = 10;

/// Per-zone histogram of `base` designations.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoneCounts {
    zones_x: usize,
    zones_y: usize,
    kinds: usize,
    data: Vec<u32>,
}

impl ZoneCounts {
    pub fn new(zones_x: usize, zones_y: usize, kinds: usize) -> Self {
        Self {
            zones_x,
            zones_y,
            kinds,
            data: vec![0; zones_x * zones_y * kinds],
        }
    }

    fn offset(&self, zx: usize, zy: usize) -> usize {
        assert!(zx < self.zones_x && zy < self.zones_y, "zone ({}, {}) out of range", zx, zy);
        (zx * self.zones_y + zy) * self.kinds
    }

    /// Number of designations tracked per zone.
    pub fn kinds(&self) -> usize {
        self.kinds
    }

    /// The histogram of one zone, indexed by designation.
    pub fn zone(&self, zx: usize, zy: usize) -> &[u32] {
        let start = self.offset(zx, zy);
        &self.data[start..start + self.kinds]
    }

    pub fn zone_mut(&mut self, zx: usize, zy: usize) -> &mut [u32] {
        let start = self.offset(zx, zy);
        &mut self.data[start..start + self.kinds]
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}

/// All layers of one generated world.
pub struct WorldGrid {
    width: usize,
    height: usize,
    zone_len: usize,
    /// Primary tile set designation per tile
    pub base: Tilemap<u8>,
    /// Detail designation per tile quadrant (2x the base extent)
    pub detail: Tilemap<i16>,
    /// Reserved for structure placement; no painter writes it yet
    pub structures: Tilemap<u8>,
    /// Plurality designation per zone
    pub base_average: Tilemap<u8>,
    pub counts: ZoneCounts,
    complete: bool,
}

impl WorldGrid {
    /// Allocate an empty world for the given primary tile set.
    ///
    /// Fails if either extent is zero or not a multiple of `zone_len`, or if
    /// the primary set has more entries than a `u8` layer can hold next to
    /// the [`NO_TERRAIN`] sentinel.
    pub fn new(width: usize, height: usize, zone_len: usize, primary: &TileIndex) -> Result<Self> {
        if width == 0 || height == 0 || zone_len == 0 || width % zone_len != 0 || height % zone_len != 0 {
            return Err(WorldError::InvalidDimensions {
                width,
                height,
                zone_len,
            });
        }
        if primary.len() > NO_TERRAIN as usize {
            return Err(WorldError::DesignationOverflow {
                len: primary.len(),
                max: NO_TERRAIN as usize,
            });
        }

        let zones_x = width / zone_len;
        let zones_y = height / zone_len;

        Ok(Self {
            width,
            height,
            zone_len,
            base: Tilemap::new_with(width, height, NO_TERRAIN),
            detail: Tilemap::new_with(width * 2, height * 2, NONE_DETAIL),
            structures: Tilemap::new_with(width, height, 0),
            base_average: Tilemap::new_with(zones_x, zones_y, NO_TERRAIN),
            counts: ZoneCounts::new(zones_x, zones_y, primary.len()),
            complete: false,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn sizes(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn zone_len(&self) -> usize {
        self.zone_len
    }

    /// Zone grid extent.
    pub fn zones(&self) -> (usize, usize) {
        (self.width / self.zone_len, self.height / self.zone_len)
    }

    /// Zone containing base cell (x, y).
    pub fn zone_of(&self, x: usize, y: usize) -> (usize, usize) {
        (x / self.zone_len, y / self.zone_len)
    }

    /// True once every pipeline stage has finished successfully.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub(crate) fn mark_complete(&mut self) {
        self.complete = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{primary_tile_set, AssetSource};

    fn primary() -> TileIndex {
        primary_tile_set(&AssetSource::Blank).unwrap().index().clone()
    }

    #[test]
    fn test_layer_shapes() {
        let grid = WorldGrid::new(20, 30, 10, &primary()).unwrap();

        assert_eq!((grid.base.width, grid.base.height), (20, 30));
        assert_eq!((grid.detail.width, grid.detail.height), (40, 60));
        assert_eq!((grid.base_average.width, grid.base_average.height), (2, 3));
        assert_eq!(grid.zones(), (2, 3));
        assert_eq!(grid.counts.kinds(), 17);
        assert_eq!(*grid.base.get(19, 29), NO_TERRAIN);
        assert_eq!(*grid.detail.get(39, 59), NONE_DETAIL);
        assert!(!grid.is_complete());
    }

    #[test]
    fn test_rejects_indivisible_extent() {
        let index = primary();
        assert!(matches!(
            WorldGrid::new(25, 20, 10, &index),
            Err(WorldError::InvalidDimensions { width: 25, .. })
        ));
        assert!(matches!(
            WorldGrid::new(0, 20, 10, &index),
            Err(WorldError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            WorldGrid::new(20, 20, 0, &index),
            Err(WorldError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_zone_lookup() {
        let grid = WorldGrid::new(30, 20, 10, &primary()).unwrap();
        assert_eq!(grid.zone_of(0, 0), (0, 0));
        assert_eq!(grid.zone_of(9, 10), (0, 1));
        assert_eq!(grid.zone_of(29, 19), (2, 1));
    }

    #[test]
    fn test_zone_counts_are_independent() {
        let mut counts = ZoneCounts::new(2, 2, 3);
        counts.zone_mut(1, 0)[2] = 5;
        assert_eq!(counts.zone(1, 0), &[0, 0, 5]);
        assert_eq!(counts.zone(0, 1), &[0, 0, 0]);
        counts.clear();
        assert_eq!(counts.zone(1, 0), &[0, 0, 0]);
    }
}
