//! Tile identifiers and their static metadata.
//!
//! Every tile the generator can place is a [`TileId`]. The metadata a tile
//! carries (sheet, cell, precedence, edge behaviour, proxy) is fixed here in
//! declaration order; tile sets only decide the integer designation.

use std::f64::consts::FRAC_PI_4;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Layout of one sliced tile sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SheetLayout {
    pub path: &'static str,
    pub rows: u32,
    pub cols: u32,
    /// Edge length of one tile in pixels.
    pub tile_px: u32,
}

pub const PRIMARY_SHEET: SheetLayout = SheetLayout {
    path: "terrain_primary.png",
    rows: 8,
    cols: 1,
    tile_px: 32,
};

pub const RIVER_SHEET: SheetLayout = SheetLayout {
    path: "river_dir.png",
    rows: 3,
    cols: 3,
    tile_px: 32,
};

/// The detail sheet is split into 4x4 sections, one column of edge
/// sections and one column of decoration sections.
pub const DETAIL_SECTION: u32 = 4;

pub const DETAIL_SHEET: SheetLayout = SheetLayout {
    path: "terrain_detail.png",
    rows: DETAIL_SECTION * 8,
    cols: DETAIL_SECTION * 2,
    tile_px: 16,
};

/// Position of a tile inside its sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageCell {
    pub row: u32,
    pub col: u32,
}

impl ImageCell {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

// =============================================================================
// PRIMARY TERRAIN
// =============================================================================

/// Primary terrain types, in precedence order (first = most dominant).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Terrain {
    Snow,
    Grass,
    Dirt,
    Sand,
    Stone,
    Ice,
    Water,
    LowStone,
}

impl Terrain {
    pub const ALL: [Terrain; 8] = [
        Terrain::Snow,
        Terrain::Grass,
        Terrain::Dirt,
        Terrain::Sand,
        Terrain::Stone,
        Terrain::Ice,
        Terrain::Water,
        Terrain::LowStone,
    ];

    /// Position in the declaration order; also the row in the primary sheet.
    pub fn index(self) -> u32 {
        self as u32
    }

    /// Lower rank = more dominant when choosing edge art.
    pub fn precedence(self) -> u8 {
        self as u8
    }

    /// Water has no border art against itself; everything else does.
    pub fn has_edge(self) -> bool {
        !matches!(self, Terrain::Water)
    }

    pub fn name(self) -> &'static str {
        match self {
            Terrain::Snow => "SNOW",
            Terrain::Grass => "GRASS",
            Terrain::Dirt => "DIRT",
            Terrain::Sand => "SAND",
            Terrain::Stone => "STONE",
            Terrain::Ice => "ICE",
            Terrain::Water => "WATER",
            Terrain::LowStone => "LOW_STONE",
        }
    }
}

// =============================================================================
// RIVER FLOW
// =============================================================================

/// Compass directions, counter-clockwise from east, plus a "still" marker.
///
/// Used both for lattice steps while routing a river and for the
/// direction-specific river tiles painted into the base layer.
/// North is +y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiverFlow {
    East,
    NorthEast,
    North,
    NorthWest,
    West,
    SouthWest,
    South,
    SouthEast,
    NoFlow,
}

impl RiverFlow {
    pub const ALL: [RiverFlow; 9] = [
        RiverFlow::East,
        RiverFlow::NorthEast,
        RiverFlow::North,
        RiverFlow::NorthWest,
        RiverFlow::West,
        RiverFlow::SouthWest,
        RiverFlow::South,
        RiverFlow::SouthEast,
        RiverFlow::NoFlow,
    ];

    /// The eight moving directions, in rotation order.
    pub const COMPASS: [RiverFlow; 8] = [
        RiverFlow::East,
        RiverFlow::NorthEast,
        RiverFlow::North,
        RiverFlow::NorthWest,
        RiverFlow::West,
        RiverFlow::SouthWest,
        RiverFlow::South,
        RiverFlow::SouthEast,
    ];

    pub fn index(self) -> u32 {
        self as u32
    }

    /// Unit step (dx, dy) for this direction.
    pub fn shift(self) -> (i64, i64) {
        match self {
            RiverFlow::East => (1, 0),
            RiverFlow::NorthEast => (1, 1),
            RiverFlow::North => (0, 1),
            RiverFlow::NorthWest => (-1, 1),
            RiverFlow::West => (-1, 0),
            RiverFlow::SouthWest => (-1, -1),
            RiverFlow::South => (0, -1),
            RiverFlow::SouthEast => (1, -1),
            RiverFlow::NoFlow => (0, 0),
        }
    }

    /// Rotate by `turn` eighths of a circle (positive = counter-clockwise).
    pub fn rotate(self, turn: i32) -> RiverFlow {
        if self == RiverFlow::NoFlow {
            return self;
        }
        let idx = (self.index() as i32 + turn).rem_euclid(8) as usize;
        Self::COMPASS[idx]
    }

    /// Bucket a real-world displacement into the nearest of the eight
    /// directions by its angle.
    pub fn from_delta(dx: i64, dy: i64) -> RiverFlow {
        if dx == 0 && dy == 0 {
            return RiverFlow::NoFlow;
        }
        let angle = (dy as f64).atan2(dx as f64);
        let sector = (angle / FRAC_PI_4).round() as i64;
        Self::COMPASS[sector.rem_euclid(8) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            RiverFlow::East => "EAST",
            RiverFlow::NorthEast => "NORTH_EAST",
            RiverFlow::North => "NORTH",
            RiverFlow::NorthWest => "NORTH_WEST",
            RiverFlow::West => "WEST",
            RiverFlow::SouthWest => "SOUTH_WEST",
            RiverFlow::South => "SOUTH",
            RiverFlow::SouthEast => "SOUTH_EAST",
            RiverFlow::NoFlow => "NO_FLOW",
        }
    }
}

// =============================================================================
// EDGE SHAPES
// =============================================================================

/// The sixteen border pieces every primary terrain has on the detail sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeShape {
    LowerLeftInner,
    BottomEdgeA,
    BottomEdgeB,
    LowerRightInner,
    LeftEdgeA,
    LowerLeftOuter,
    LowerRightOuter,
    RightEdgeA,
    LeftEdgeB,
    UpperLeftOuter,
    UpperRightOuter,
    RightEdgeB,
    UpperLeftInner,
    TopEdgeA,
    TopEdgeB,
    UpperRightInner,
}

impl EdgeShape {
    pub const ALL: [EdgeShape; 16] = [
        EdgeShape::LowerLeftInner,
        EdgeShape::BottomEdgeA,
        EdgeShape::BottomEdgeB,
        EdgeShape::LowerRightInner,
        EdgeShape::LeftEdgeA,
        EdgeShape::LowerLeftOuter,
        EdgeShape::LowerRightOuter,
        EdgeShape::RightEdgeA,
        EdgeShape::LeftEdgeB,
        EdgeShape::UpperLeftOuter,
        EdgeShape::UpperRightOuter,
        EdgeShape::RightEdgeB,
        EdgeShape::UpperLeftInner,
        EdgeShape::TopEdgeA,
        EdgeShape::TopEdgeB,
        EdgeShape::UpperRightInner,
    ];

    /// Cell within the first (SNOW) edge section of the detail sheet.
    fn base_cell(self) -> ImageCell {
        // Four rows of four, laid out in declaration order, in columns 4..8.
        let idx = self as u32;
        ImageCell::new(idx / 4, DETAIL_SECTION + idx % 4)
    }

    pub fn name(self) -> &'static str {
        match self {
            EdgeShape::LowerLeftInner => "LOWER_LEFT_INNER",
            EdgeShape::BottomEdgeA => "BOTTOM_EDGE_A",
            EdgeShape::BottomEdgeB => "BOTTOM_EDGE_B",
            EdgeShape::LowerRightInner => "LOWER_RIGHT_INNER",
            EdgeShape::LeftEdgeA => "LEFT_EDGE_A",
            EdgeShape::LowerLeftOuter => "LOWER_LEFT_OUTER",
            EdgeShape::LowerRightOuter => "LOWER_RIGHT_OUTER",
            EdgeShape::RightEdgeA => "RIGHT_EDGE_A",
            EdgeShape::LeftEdgeB => "LEFT_EDGE_B",
            EdgeShape::UpperLeftOuter => "UPPER_LEFT_OUTER",
            EdgeShape::UpperRightOuter => "UPPER_RIGHT_OUTER",
            EdgeShape::RightEdgeB => "RIGHT_EDGE_B",
            EdgeShape::UpperLeftInner => "UPPER_LEFT_INNER",
            EdgeShape::TopEdgeA => "TOP_EDGE_A",
            EdgeShape::TopEdgeB => "TOP_EDGE_B",
            EdgeShape::UpperRightInner => "UPPER_RIGHT_INNER",
        }
    }
}

// =============================================================================
// DECORATIONS
// =============================================================================

/// Declares the decoration enum together with its name, owning terrain and
/// sheet cell so the three can never drift apart.
macro_rules! define_decorations {
    ($($variant:ident => $name:literal, $terrain:ident, ($row:expr, $col:expr);)*) => {
        /// Decorative detail tiles scattered over primary terrain.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum Decoration {
            $($variant,)*
        }

        impl Decoration {
            pub const ALL: &'static [Decoration] = &[$(Decoration::$variant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(Decoration::$variant => $name,)*
                }
            }

            /// The terrain this decoration is drawn for.
            pub fn terrain(self) -> Terrain {
                match self {
                    $(Decoration::$variant => Terrain::$terrain,)*
                }
            }

            pub fn cell(self) -> ImageCell {
                match self {
                    $(Decoration::$variant => ImageCell::new($row, $col),)*
                }
            }
        }
    };
}

define_decorations! {
    SnowBumpA => "SNOW_BUMP_A", Snow, (3, 2);
    SnowBumpB => "SNOW_BUMP_B", Snow, (2, 2);
    SnowLogA => "SNOW_LOG_A", Snow, (1, 2);
    SnowLogB => "SNOW_LOG_B", Snow, (0, 2);
    SnowRockA => "SNOW_ROCK_A", Snow, (2, 3);
    SnowRockB => "SNOW_ROCK_B", Snow, (1, 3);

    GrassPlantA => "GRASS_PLANT_A", Grass, (4, 0);
    GrassPlantB => "GRASS_PLANT_B", Grass, (4, 1);
    GrassPlantC => "GRASS_PLANT_C", Grass, (4, 2);
    GrassTextureA => "GRASS_TEXTURE_A", Grass, (5, 0);
    GrassTextureB => "GRASS_TEXTURE_B", Grass, (5, 1);
    GrassTextureC => "GRASS_TEXTURE_C", Grass, (6, 0);
    GrassTextureD => "GRASS_TEXTURE_D", Grass, (6, 1);
    GrassLogA => "GRASS_LOG_A", Grass, (5, 2);
    GrassLogB => "GRASS_LOG_B", Grass, (6, 2);
    GrassRockA => "GRASS_ROCK_A", Grass, (5, 3);
    GrassRockB => "GRASS_ROCK_B", Grass, (6, 3);
    GrassFlowerA => "GRASS_FLOWER_A", Grass, (7, 0);
    GrassFlowerB => "GRASS_FLOWER_B", Grass, (7, 1);
    GrassFlowerC => "GRASS_FLOWER_C", Grass, (7, 2);
    GrassFlowerD => "GRASS_FLOWER_D", Grass, (7, 3);
    GrassFlowerE => "GRASS_FLOWER_E", Grass, (4, 3);

    DirtBumpA => "DIRT_BUMP_A", Dirt, (8, 0);
    DirtBumpB => "DIRT_BUMP_B", Dirt, (8, 1);
    DirtTextureA => "DIRT_TEXTURE_A", Dirt, (9, 0);
    DirtTextureB => "DIRT_TEXTURE_B", Dirt, (9, 1);
    DirtTextureC => "DIRT_TEXTURE_C", Dirt, (10, 1);
    DirtTextureD => "DIRT_TEXTURE_D", Dirt, (9, 2);
    DirtPlantA => "DIRT_PLANT_A", Dirt, (10, 2);
    DirtRockA => "DIRT_ROCK_A", Dirt, (9, 3);
    DirtRockB => "DIRT_ROCK_B", Dirt, (10, 3);

    SandBumpA => "SAND_BUMP_A", Sand, (12, 0);
    SandBumpB => "SAND_BUMP_B", Sand, (12, 1);
    SandTextureA => "SAND_TEXTURE_A", Sand, (13, 0);
    SandTextureB => "SAND_TEXTURE_B", Sand, (13, 1);
    SandTextureC => "SAND_TEXTURE_C", Sand, (14, 1);
    SandTextureD => "SAND_TEXTURE_D", Sand, (13, 2);
    SandPlantA => "SAND_PLANT_A", Sand, (14, 2);
    SandRockA => "SAND_ROCK_A", Sand, (13, 3);
    SandRockB => "SAND_ROCK_B", Sand, (14, 3);

    StoneTextureA => "STONE_TEXTURE_A", Stone, (17, 0);
    StoneTextureB => "STONE_TEXTURE_B", Stone, (17, 1);
    StoneTextureC => "STONE_TEXTURE_C", Stone, (18, 1);
    StoneRockA => "STONE_ROCK_A", Stone, (17, 3);
    StoneRockB => "STONE_ROCK_B", Stone, (18, 3);

    IceShine => "ICE_SHINE", Ice, (23, 0);
    IceCrack => "ICE_CRACK", Ice, (22, 0);

    LowStoneTextureA => "LOW_STONE_TEXTURE_A", LowStone, (29, 0);
    LowStoneTextureB => "LOW_STONE_TEXTURE_B", LowStone, (29, 1);
    LowStoneTextureC => "LOW_STONE_TEXTURE_C", LowStone, (30, 1);
    LowStoneRockA => "LOW_STONE_ROCK_A", LowStone, (29, 3);
    LowStoneRockB => "LOW_STONE_ROCK_B", LowStone, (30, 3);
}

// =============================================================================
// TILE IDENTIFIERS
// =============================================================================

/// Any tile the generator knows how to place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileId {
    Terrain(Terrain),
    River(RiverFlow),
    Edge(Terrain, EdgeShape),
    Decoration(Decoration),
}

impl TileId {
    pub fn name(&self) -> String {
        match self {
            TileId::Terrain(t) => t.name().to_string(),
            TileId::River(flow) => format!("RIVER_{}", flow.name()),
            TileId::Edge(t, shape) => format!("{}_{}", t.name(), shape.name()),
            TileId::Decoration(d) => d.name().to_string(),
        }
    }

    pub fn image_path(&self) -> &'static str {
        match self {
            TileId::Terrain(_) => PRIMARY_SHEET.path,
            TileId::River(_) => RIVER_SHEET.path,
            TileId::Edge(..) | TileId::Decoration(_) => DETAIL_SHEET.path,
        }
    }

    pub fn image_cell(&self) -> ImageCell {
        match self {
            TileId::Terrain(t) => ImageCell::new(t.index(), 0),
            TileId::River(flow) => {
                let idx = flow.index();
                ImageCell::new(idx / RIVER_SHEET.cols, idx % RIVER_SHEET.cols)
            }
            TileId::Edge(t, shape) => {
                let cell = shape.base_cell();
                ImageCell::new(cell.row + t.index() * DETAIL_SECTION, cell.col)
            }
            TileId::Decoration(d) => d.cell(),
        }
    }

    /// No tile in the current sheets animates.
    pub fn is_animated(&self) -> bool {
        false
    }

    /// Precedence rank for primary-layer tiles; rivers rank as water.
    pub fn precedence(&self) -> Option<u8> {
        match self {
            TileId::Terrain(t) => Some(t.precedence()),
            TileId::River(_) => Some(Terrain::Water.precedence()),
            TileId::Edge(..) | TileId::Decoration(_) => None,
        }
    }

    pub fn has_edge(&self) -> bool {
        match self {
            TileId::Terrain(t) => t.has_edge(),
            _ => false,
        }
    }

    /// The tile this one stands in for during edge comparison.
    pub fn proxy(&self) -> TileId {
        match self {
            TileId::River(_) => TileId::Terrain(Terrain::Water),
            other => *other,
        }
    }

    /// The terrain used when comparing this tile against its neighbours.
    ///
    /// Tiles without their own edge art are first replaced by their proxy.
    pub fn edge_terrain(&self) -> Option<Terrain> {
        let id = if self.has_edge() { *self } else { self.proxy() };
        match id {
            TileId::Terrain(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_follows_declaration_order() {
        let ranks: Vec<u8> = Terrain::ALL.iter().map(|t| t.precedence()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert!(Terrain::Snow.precedence() < Terrain::LowStone.precedence());
    }

    #[test]
    fn test_river_proxies_as_water() {
        let river = TileId::River(RiverFlow::NorthWest);
        assert!(!river.has_edge());
        assert_eq!(river.proxy(), TileId::Terrain(Terrain::Water));
        assert_eq!(river.edge_terrain(), Some(Terrain::Water));
        assert_eq!(river.precedence(), TileId::Terrain(Terrain::Water).precedence());
    }

    #[test]
    fn test_edge_names_cross_terrain_and_shape() {
        let id = TileId::Edge(Terrain::Grass, EdgeShape::BottomEdgeA);
        assert_eq!(id.name(), "GRASS_BOTTOM_EDGE_A");
        let id = TileId::Edge(Terrain::LowStone, EdgeShape::UpperRightInner);
        assert_eq!(id.name(), "LOW_STONE_UPPER_RIGHT_INNER");
    }

    #[test]
    fn test_edge_cells_offset_per_terrain() {
        let snow = TileId::Edge(Terrain::Snow, EdgeShape::LowerLeftOuter).image_cell();
        assert_eq!(snow, ImageCell::new(1, 5));
        let grass = TileId::Edge(Terrain::Grass, EdgeShape::LowerLeftOuter).image_cell();
        assert_eq!(grass, ImageCell::new(5, 5));
        let last = TileId::Edge(Terrain::LowStone, EdgeShape::UpperRightInner).image_cell();
        assert!(last.row < DETAIL_SHEET.rows && last.col < DETAIL_SHEET.cols);
    }

    #[test]
    fn test_flow_from_delta_buckets() {
        assert_eq!(RiverFlow::from_delta(5, 0), RiverFlow::East);
        assert_eq!(RiverFlow::from_delta(5, 1), RiverFlow::East);
        assert_eq!(RiverFlow::from_delta(4, 4), RiverFlow::NorthEast);
        assert_eq!(RiverFlow::from_delta(0, 3), RiverFlow::North);
        assert_eq!(RiverFlow::from_delta(-5, 0), RiverFlow::West);
        assert_eq!(RiverFlow::from_delta(-4, -5), RiverFlow::SouthWest);
        assert_eq!(RiverFlow::from_delta(1, -6), RiverFlow::South);
        assert_eq!(RiverFlow::from_delta(6, -5), RiverFlow::SouthEast);
        assert_eq!(RiverFlow::from_delta(0, 0), RiverFlow::NoFlow);
    }

    #[test]
    fn test_flow_rotation_wraps() {
        assert_eq!(RiverFlow::East.rotate(-1), RiverFlow::SouthEast);
        assert_eq!(RiverFlow::SouthEast.rotate(1), RiverFlow::East);
        assert_eq!(RiverFlow::North.rotate(2), RiverFlow::West);
        assert_eq!(RiverFlow::NoFlow.rotate(3), RiverFlow::NoFlow);
    }

    #[test]
    fn test_decoration_metadata() {
        assert_eq!(Decoration::GrassFlowerE.name(), "GRASS_FLOWER_E");
        assert_eq!(Decoration::GrassFlowerE.terrain(), Terrain::Grass);
        assert_eq!(Decoration::GrassFlowerE.cell(), ImageCell::new(4, 3));
        for d in Decoration::ALL {
            let cell = d.cell();
            assert!(cell.row < DETAIL_SHEET.rows && cell.col < DETAIL_SHEET.cols);
        }
    }
}
