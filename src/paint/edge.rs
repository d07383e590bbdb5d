//! Edge disambiguation: pick border art for every detail quadrant.
//!
//! Each base tile owns four detail cells, one per quadrant:
//!
//! ```text
//!   +---+---+
//!   | NW| NE|   y + 1
//!   +---+---+
//!   | SW| SE|   y
//!   +---+---+
//!     x  x+1
//! ```
//!
//! A quadrant looks at the horizontal, vertical and diagonal neighbours in
//! its own direction. If one of them has a more dominant terrain than the
//! tile itself, the quadrant gets that terrain's border piece.

use super::{detail_designation, edge_terrain_table};
use crate::error::Result;
use crate::tile_set::TileIndex;
use crate::tilemap::{ColumnBand, Tilemap};
use crate::tiles::{EdgeShape, Terrain, TileId};
use crate::world::NONE_DETAIL;

/// One of the four detail cells of a base tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    SouthWest,
    SouthEast,
    NorthWest,
    NorthEast,
}

/// Border pieces for one quadrant, in rule order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeVariants {
    pub inner_corner: EdgeShape,
    pub horizontal: EdgeShape,
    pub vertical: EdgeShape,
    pub outer_corner: EdgeShape,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::SouthWest,
        Quadrant::SouthEast,
        Quadrant::NorthWest,
        Quadrant::NorthEast,
    ];

    /// Position of this quadrant inside the 2x2 detail block.
    pub fn offset(self) -> (usize, usize) {
        match self {
            Quadrant::SouthWest => (0, 0),
            Quadrant::SouthEast => (1, 0),
            Quadrant::NorthWest => (0, 1),
            Quadrant::NorthEast => (1, 1),
        }
    }

    /// Horizontal, vertical and diagonal neighbour shifts.
    pub fn shifts(self) -> [(i64, i64); 3] {
        let (dx, dy) = match self {
            Quadrant::SouthWest => (-1, -1),
            Quadrant::SouthEast => (1, -1),
            Quadrant::NorthWest => (-1, 1),
            Quadrant::NorthEast => (1, 1),
        };
        [(dx, 0), (0, dy), (dx, dy)]
    }

    pub fn variants(self) -> EdgeVariants {
        use EdgeShape::*;
        let (inner_corner, horizontal, vertical, outer_corner) = match self {
            Quadrant::SouthWest => (LowerLeftInner, LeftEdgeA, BottomEdgeA, UpperRightOuter),
            Quadrant::SouthEast => (LowerRightInner, RightEdgeA, BottomEdgeB, UpperLeftOuter),
            Quadrant::NorthWest => (UpperLeftInner, LeftEdgeB, TopEdgeA, LowerRightOuter),
            Quadrant::NorthEast => (UpperRightInner, RightEdgeB, TopEdgeB, LowerLeftOuter),
        };
        EdgeVariants {
            inner_corner,
            horizontal,
            vertical,
            outer_corner,
        }
    }
}

/// Choose the border piece for one quadrant.
///
/// `neighbors` is (horizontal, vertical, diagonal); `None` means off the
/// map and never dominates. Lower precedence rank is more dominant, and of
/// equal ranks the earlier entry in (current, horizontal, vertical,
/// diagonal) wins. Returns `None` when nothing outranks the current tile.
pub fn edge_determine(
    current: Option<Terrain>,
    neighbors: [Option<Terrain>; 3],
    variants: &EdgeVariants,
) -> Option<TileId> {
    let current = current?;
    let [horizontal, vertical, diagonal] = neighbors;

    let dominant = [Some(current), horizontal, vertical, diagonal]
        .into_iter()
        .flatten()
        .min_by_key(|t| t.precedence())?;
    if dominant == current {
        return None;
    }

    let is_dominant = |n: Option<Terrain>| n == Some(dominant);
    let shape = if is_dominant(horizontal) && is_dominant(vertical) {
        variants.inner_corner
    } else if is_dominant(horizontal) {
        variants.horizontal
    } else if is_dominant(vertical) {
        variants.vertical
    } else {
        variants.outer_corner
    };

    Some(TileId::Edge(dominant, shape))
}

/// Detail designations of every border piece.
#[derive(Clone, Debug)]
pub struct EdgeTable {
    designations: [[i16; 16]; 8],
}

impl EdgeTable {
    pub fn new(detail: &TileIndex) -> Result<Self> {
        let mut designations = [[NONE_DETAIL; 16]; 8];
        for (t, &terrain) in Terrain::ALL.iter().enumerate() {
            for (s, &shape) in EdgeShape::ALL.iter().enumerate() {
                designations[t][s] = detail_designation(detail, TileId::Edge(terrain, shape))?;
            }
        }
        Ok(Self { designations })
    }

    pub fn get(&self, terrain: Terrain, shape: EdgeShape) -> i16 {
        self.designations[terrain.index() as usize][shape as usize]
    }
}

/// Write border art (or `NONE`) into every detail quadrant of the band.
///
/// `band` covers detail columns; base column `x` owns detail columns
/// `2x` and `2x + 1`, so the band's bounds must be even.
pub fn edge_pass(
    band: &mut ColumnBand<'_, i16>,
    base: &Tilemap<u8>,
    primary: &TileIndex,
    edges: &EdgeTable,
) -> Result<()> {
    let lookup = edge_terrain_table(primary);
    let terrain_at = |x: i64, y: i64| base.get_checked(x, y).and_then(|&d| lookup[d as usize]);

    let columns = band.columns();
    for world_x in columns.start / 2..columns.end / 2 {
        for world_y in 0..base.height {
            let (x, y) = (world_x as i64, world_y as i64);
            let current = terrain_at(x, y);

            for quadrant in Quadrant::ALL {
                let shifts = quadrant.shifts();
                let neighbors = shifts.map(|(dx, dy)| terrain_at(x + dx, y + dy));

                let value = match edge_determine(current, neighbors, &quadrant.variants()) {
                    Some(TileId::Edge(terrain, shape)) => edges.get(terrain, shape),
                    _ => NONE_DETAIL,
                };

                let (ox, oy) = quadrant.offset();
                band.set(world_x * 2 + ox, world_y * 2 + oy, value);
            }
        }
    }
    Ok(())
}
