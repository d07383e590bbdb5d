//! ASCII rendering of world layers
//!
//! Provides text previews of the `base` and `base_average` layers for the
//! driver. North (+y) is printed at the top.

use crate::tile_set::TileIndex;
use crate::tilemap::Tilemap;
use crate::tiles::{RiverFlow, Terrain, TileId};
use crate::world::{WorldGrid, NO_TERRAIN};

/// Get ASCII character for a terrain
pub fn terrain_char(terrain: Terrain) -> char {
    match terrain {
        Terrain::Snow => '*',
        Terrain::Grass => '"',
        Terrain::Dirt => '.',
        Terrain::Sand => ':',
        Terrain::Stone => '^',
        Terrain::Ice => '#',
        Terrain::Water => '~',
        Terrain::LowStone => ',',
    }
}

/// Rivers are drawn by the axis they flow along.
pub fn river_char(flow: RiverFlow) -> char {
    match flow {
        RiverFlow::East | RiverFlow::West => '-',
        RiverFlow::North | RiverFlow::South => '|',
        RiverFlow::NorthEast | RiverFlow::SouthWest => '/',
        RiverFlow::NorthWest | RiverFlow::SouthEast => '\\',
        RiverFlow::NoFlow => 'o',
    }
}

/// Character for one `base` designation. Unassigned cells are blank and
/// anything unexpected is `?`.
pub fn designation_char(designation: u8, primary: &TileIndex) -> char {
    if designation == NO_TERRAIN {
        return ' ';
    }
    match primary.identifier_of(designation as u16) {
        Ok(TileId::Terrain(terrain)) => terrain_char(terrain),
        Ok(TileId::River(flow)) => river_char(flow),
        _ => '?',
    }
}

/// Render a layer of primary designations, one character per cell
pub fn render_layer(layer: &Tilemap<u8>, primary: &TileIndex) -> String {
    let mut result = String::with_capacity((layer.width + 1) * layer.height);
    for y in (0..layer.height).rev() {
        for x in 0..layer.width {
            result.push(designation_char(*layer.get(x, y), primary));
        }
        result.push('\n');
    }
    result
}

pub fn render_base(grid: &WorldGrid, primary: &TileIndex) -> String {
    render_layer(&grid.base, primary)
}

/// One character per averaging zone.
pub fn render_average(grid: &WorldGrid, primary: &TileIndex) -> String {
    render_layer(&grid.base_average, primary)
}

/// Generate legend for terrain characters
pub fn terrain_legend() -> String {
    let mut legend = String::new();
    legend.push_str("=== TERRAIN LEGEND ===\n");
    for pair in Terrain::ALL.chunks(4) {
        legend.push(' ');
        for &terrain in pair {
            legend.push_str(&format!(" {} {:<10}", terrain_char(terrain), terrain.name()));
        }
        legend.push('\n');
    }
    legend.push_str("RIVERS:\n  - | / \\ by flow axis, o still\n");
    legend
}

/// Count cells per primary tile, in designation order, skipping tiles that
/// never occur.
pub fn terrain_histogram(base: &Tilemap<u8>, primary: &TileIndex) -> Vec<(TileId, usize)> {
    let mut counts = vec![0usize; primary.len()];
    for (_, _, &designation) in base.iter() {
        if let Some(count) = counts.get_mut(designation as usize) {
            *count += 1;
        }
    }

    primary
        .ids()
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(&id, count)| (id, count))
        .collect()
}

/// Print the base layer preview to stdout
pub fn print_ascii_map(grid: &WorldGrid, primary: &TileIndex) {
    print!("{}", render_base(grid, primary));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{primary_tile_set, AssetSource};

    fn primary() -> TileIndex {
        primary_tile_set(&AssetSource::Blank).unwrap().index().clone()
    }

    fn code(index: &TileIndex, id: TileId) -> u8 {
        index.designation_of(id).unwrap() as u8
    }

    #[test]
    fn test_render_puts_north_on_top() {
        let index = primary();
        let mut layer = Tilemap::new_with(3, 2, code(&index, TileId::Terrain(Terrain::Grass)));
        layer.set(0, 1, code(&index, TileId::Terrain(Terrain::Water)));
        layer.set(2, 0, NO_TERRAIN);
        layer.set(1, 0, code(&index, TileId::River(RiverFlow::North)));

        assert_eq!(render_layer(&layer, &index), "~\"\"\n\"| \n");
    }

    #[test]
    fn test_histogram_skips_absent_tiles() {
        let index = primary();
        let grass = code(&index, TileId::Terrain(Terrain::Grass));
        let sand = code(&index, TileId::Terrain(Terrain::Sand));
        let mut layer = Tilemap::new_with(4, 4, grass);
        layer.set(0, 0, sand);
        layer.set(1, 0, NO_TERRAIN);

        let histogram = terrain_histogram(&layer, &index);
        assert_eq!(
            histogram,
            vec![(TileId::Terrain(Terrain::Grass), 14), (TileId::Terrain(Terrain::Sand), 1)]
        );
    }

    #[test]
    fn test_every_terrain_has_a_distinct_char() {
        let mut chars: Vec<char> = Terrain::ALL.iter().map(|&t| terrain_char(t)).collect();
        chars.sort_unstable();
        chars.dedup();
        assert_eq!(chars.len(), Terrain::ALL.len());
        assert!(terrain_legend().contains("GRASS"));
    }
}
