use std::path::Path;

use image::imageops;
use image::RgbaImage;
use tracing::info;

use crate::error::Result;
use crate::tile_set::TileSet;
use crate::tilemap::Tilemap;
use crate::tiles::{DETAIL_SHEET, PRIMARY_SHEET};
use crate::world::{WorldGrid, NONE_DETAIL, NO_TERRAIN};

/// Pixel position of a cell's top-left corner. Rows are flipped so north
/// (+y) ends up at the top of the image.
fn cell_origin(x: usize, y: usize, height: usize, tile_px: u32) -> (i64, i64) {
    let row = height - 1 - y;
    (x as i64 * tile_px as i64, row as i64 * tile_px as i64)
}

/// Composite the `base` layer from the primary sheets.
///
/// Unassigned cells stay transparent.
pub fn render_base(base: &Tilemap<u8>, primary: &TileSet) -> Result<RgbaImage> {
    let tile_px = PRIMARY_SHEET.tile_px;
    let mut canvas = RgbaImage::new(base.width as u32 * tile_px, base.height as u32 * tile_px);
    for (x, y, &designation) in base.iter() {
        if designation == NO_TERRAIN {
            continue;
        }
        let tile = primary.image_cell_by_designation(designation as u16)?;
        let (px, py) = cell_origin(x, y, base.height, tile_px);
        imageops::overlay(&mut canvas, tile, px, py);
    }
    Ok(canvas)
}

/// Alpha-blend the `detail` layer over an already rendered image.
pub fn overlay_detail(canvas: &mut RgbaImage, detail: &Tilemap<i16>, detail_set: &TileSet) -> Result<()> {
    let tile_px = DETAIL_SHEET.tile_px;
    for (x, y, &designation) in detail.iter() {
        if designation == NONE_DETAIL || designation < 0 {
            continue;
        }
        let tile = detail_set.image_cell_by_designation(designation as u16)?;
        let (px, py) = cell_origin(x, y, detail.height, tile_px);
        imageops::overlay(canvas, tile, px, py);
    }
    Ok(())
}

/// Render the whole world: base tiles with edges and decorations on top.
///
/// Detail tiles are half the size of primary tiles, so each base cell is
/// covered by its four detail quadrants.
pub fn render_world(grid: &WorldGrid, primary: &TileSet, detail: &TileSet) -> Result<RgbaImage> {
    let mut canvas = render_base(&grid.base, primary)?;
    overlay_detail(&mut canvas, &grid.detail, detail)?;
    Ok(canvas)
}

/// Render the world and save it; the format follows the file extension.
pub fn export_world(grid: &WorldGrid, primary: &TileSet, detail: &TileSet, path: &Path) -> Result<()> {
    let image = render_world(grid, primary, detail)?;
    image.save(path)?;
    info!(path = %path.display(), width = image.width(), height = image.height(), "world image written");
    Ok(())
}
