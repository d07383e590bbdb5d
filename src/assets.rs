//! Sheet loaders for the primary and detail tile sets.
//!
//! Sheets come either from PNG files in a directory or from blank
//! placeholders of the right size, so generation can run headless.

use std::path::PathBuf;

use image::DynamicImage;
use tracing::debug;

use crate::error::Result;
use crate::tile_set::{LoadedSheet, TileSet};
use crate::tiles::{
    Decoration, EdgeShape, RiverFlow, SheetLayout, Terrain, TileId, DETAIL_SHEET, PRIMARY_SHEET,
    RIVER_SHEET,
};

/// Where sheet images come from.
#[derive(Clone, Debug)]
pub enum AssetSource {
    /// PNG files named after each sheet's path, inside this directory
    Directory(PathBuf),
    /// Transparent sheets with the expected dimensions
    Blank,
}

impl AssetSource {
    fn load(&self, layout: SheetLayout) -> Result<DynamicImage> {
        match self {
            AssetSource::Directory(dir) => {
                let path = dir.join(layout.path);
                debug!(path = %path.display(), "loading tile sheet");
                Ok(image::open(path)?)
            }
            AssetSource::Blank => Ok(DynamicImage::new_rgba8(
                layout.cols * layout.tile_px,
                layout.rows * layout.tile_px,
            )),
        }
    }
}

/// The eight primary terrains, in precedence order.
pub fn terrain_primary(source: &AssetSource) -> Result<LoadedSheet> {
    Ok(LoadedSheet {
        layout: PRIMARY_SHEET,
        image: source.load(PRIMARY_SHEET)?,
        groups: vec![Terrain::ALL.iter().map(|&t| TileId::Terrain(t)).collect()],
    })
}

/// Direction-specific river tiles.
pub fn river_dir(source: &AssetSource) -> Result<LoadedSheet> {
    Ok(LoadedSheet {
        layout: RIVER_SHEET,
        image: source.load(RIVER_SHEET)?,
        groups: vec![RiverFlow::ALL.iter().map(|&f| TileId::River(f)).collect()],
    })
}

/// Edge art for every terrain and shape, then the decorations.
pub fn terrain_detail(source: &AssetSource) -> Result<LoadedSheet> {
    let mut edges = Vec::with_capacity(Terrain::ALL.len() * EdgeShape::ALL.len());
    for &terrain in &Terrain::ALL {
        for &shape in &EdgeShape::ALL {
            edges.push(TileId::Edge(terrain, shape));
        }
    }
    let decorations = Decoration::ALL.iter().map(|&d| TileId::Decoration(d)).collect();

    Ok(LoadedSheet {
        layout: DETAIL_SHEET,
        image: source.load(DETAIL_SHEET)?,
        groups: vec![edges, decorations],
    })
}

/// Tile set addressed by the `base` layer: terrains first, then rivers.
pub fn primary_tile_set(source: &AssetSource) -> Result<TileSet> {
    Ok(TileSet::builder()
        .register(|| terrain_primary(source))?
        .register(|| river_dir(source))?
        .build())
}

/// Tile set addressed by the `detail` layer.
pub fn detail_tile_set(source: &AssetSource) -> Result<TileSet> {
    Ok(TileSet::builder().register(|| terrain_detail(source))?.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_set_orders_terrain_before_rivers() {
        let set = primary_tile_set(&AssetSource::Blank).unwrap();
        assert_eq!(set.len(), Terrain::ALL.len() + RiverFlow::ALL.len());
        assert_eq!(set.designation_of(TileId::Terrain(Terrain::Snow)).unwrap(), 0);
        assert_eq!(set.designation_of(TileId::Terrain(Terrain::LowStone)).unwrap(), 7);
        assert_eq!(set.designation_of(TileId::River(RiverFlow::East)).unwrap(), 8);
        assert_eq!(set.designation_of(TileId::River(RiverFlow::NoFlow)).unwrap(), 16);
    }

    #[test]
    fn test_detail_set_contains_every_edge() {
        let set = detail_tile_set(&AssetSource::Blank).unwrap();
        assert_eq!(set.len(), 8 * 16 + Decoration::ALL.len());
        for &t in &Terrain::ALL {
            for &s in &EdgeShape::ALL {
                let id = TileId::Edge(t, s);
                let d = set.designation_of(id).unwrap();
                assert_eq!(set.identifier_of(d).unwrap(), id);
                assert_eq!(set.image_cell(id).unwrap().dimensions(), (16, 16));
            }
        }
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let source = AssetSource::Directory(PathBuf::from("/nonexistent/sheets"));
        assert!(primary_tile_set(&source).is_err());
    }
}
