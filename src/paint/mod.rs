//! Painters: passes that mutate one concern of a [`WorldGrid`].
//!
//! Column-partitioned painters take a [`ColumnBand`] of the layer they write
//! and only ever touch its columns. Lake and river painters write a
//! scattered footprint and take the whole layer.
//!
//! [`WorldGrid`]: crate::world::WorldGrid
//! [`ColumnBand`]: crate::tilemap::ColumnBand

pub mod average;
pub mod base_terrain;
pub mod detail;
pub mod edge;
pub mod lake;
pub mod river;

use crate::error::{Result, WorldError};
use crate::tile_set::TileIndex;
use crate::tiles::{Terrain, TileId};
use crate::world::NO_TERRAIN;

/// Designation of a primary tile as stored in the `base` layer.
pub fn base_designation(primary: &TileIndex, id: TileId) -> Result<u8> {
    let designation = primary.designation_of(id)?;
    match u8::try_from(designation) {
        Ok(d) if d != NO_TERRAIN => Ok(d),
        _ => Err(WorldError::DesignationOverflow {
            len: primary.len(),
            max: NO_TERRAIN as usize,
        }),
    }
}

/// Designation of a detail tile as stored in the `detail` layer.
pub fn detail_designation(detail: &TileIndex, id: TileId) -> Result<i16> {
    let designation = detail.designation_of(id)?;
    i16::try_from(designation).map_err(|_| WorldError::DesignationOverflow {
        len: detail.len(),
        max: i16::MAX as usize,
    })
}

/// `base` designation of every primary terrain, indexed by [`Terrain::index`].
pub fn terrain_designations(primary: &TileIndex) -> Result<[u8; 8]> {
    let mut out = [NO_TERRAIN; 8];
    for (slot, &terrain) in out.iter_mut().zip(Terrain::ALL.iter()) {
        *slot = base_designation(primary, TileId::Terrain(terrain))?;
    }
    Ok(out)
}

/// Resolve every possible `base` value to the terrain used for edge
/// comparison. Unassigned values resolve to `None`.
pub fn edge_terrain_table(primary: &TileIndex) -> [Option<Terrain>; 256] {
    let mut table = [None; 256];
    for (designation, slot) in table.iter_mut().enumerate() {
        if designation == NO_TERRAIN as usize {
            continue;
        }
        *slot = primary
            .identifier_of(designation as u16)
            .ok()
            .and_then(|id| id.edge_terrain());
    }
    table
}
