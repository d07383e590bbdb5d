//! Tile sets: integer designations for tile identifiers, plus their images.
//!
//! A tile set is the meeting point of three things: the renderable image of
//! each tile, the compact integer stored in the world layers, and the
//! [`TileId`] that names the tile. Designations are handed out in
//! registration order starting at 0 and are only stable for one build of
//! the set; never persist them.

use std::collections::HashMap;

use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::error::{Result, WorldError};
use crate::tiles::{ImageCell, SheetLayout, TileId};

/// What a sheet loader hands to [`TileSetBuilder::register`].
pub struct LoadedSheet {
    pub layout: SheetLayout,
    pub image: DynamicImage,
    /// Groups of identifiers drawn from this sheet, registered in order.
    pub groups: Vec<Vec<TileId>>,
}

/// A sheet image cut into its tiles.
pub struct TileSheet {
    layout: SheetLayout,
    /// Tiles indexed by `row * cols + col`
    cells: Vec<RgbaImage>,
}

impl TileSheet {
    /// Slice a sheet image into `layout.rows x layout.cols` tiles.
    pub fn from_image(image: DynamicImage, layout: SheetLayout) -> Result<Self> {
        let tile_w = image.width() / layout.cols;
        let tile_h = image.height() / layout.rows;
        if tile_w == 0 || tile_h == 0 {
            return Err(WorldError::SheetTooSmall {
                path: layout.path.into(),
                width: image.width(),
                height: image.height(),
                cols: layout.cols,
                rows: layout.rows,
            });
        }

        let mut cells = Vec::with_capacity((layout.rows * layout.cols) as usize);
        for row in 0..layout.rows {
            for col in 0..layout.cols {
                let tile = image.crop_imm(col * tile_w, row * tile_h, tile_w, tile_h).to_rgba8();
                cells.push(tile);
            }
        }

        Ok(Self { layout, cells })
    }

    pub fn cell(&self, cell: ImageCell) -> Option<&RgbaImage> {
        if cell.row >= self.layout.rows || cell.col >= self.layout.cols {
            return None;
        }
        self.cells.get((cell.row * self.layout.cols + cell.col) as usize)
    }
}

/// The image-free half of a tile set: just the two designation maps.
///
/// Cheap to clone and `Send + Sync`, so this is what workers receive.
#[derive(Clone, Debug, Default)]
pub struct TileIndex {
    ids: Vec<TileId>,
    designations: HashMap<TileId, u16>,
}

impl TileIndex {
    fn push(&mut self, id: TileId) -> Result<()> {
        if self.designations.contains_key(&id) {
            return Err(WorldError::InvalidConfig(format!("tile {} registered twice", id)));
        }
        let next = u16::try_from(self.ids.len()).map_err(|_| WorldError::DesignationOverflow {
            len: self.ids.len() + 1,
            max: u16::MAX as usize,
        })?;
        self.designations.insert(id, next);
        self.ids.push(id);
        Ok(())
    }

    pub fn designation_of(&self, id: TileId) -> Result<u16> {
        self.designations
            .get(&id)
            .copied()
            .ok_or(WorldError::UnknownTile(id))
    }

    pub fn identifier_of(&self, designation: u16) -> Result<TileId> {
        self.ids
            .get(designation as usize)
            .copied()
            .ok_or(WorldError::UnknownDesignation(designation))
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.designations.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All identifiers in designation order.
    pub fn ids(&self) -> &[TileId] {
        &self.ids
    }
}

/// An immutable tile set. Build one with [`TileSetBuilder`].
pub struct TileSet {
    index: TileIndex,
    sheets: HashMap<&'static str, TileSheet>,
}

impl TileSet {
    pub fn builder() -> TileSetBuilder {
        TileSetBuilder::new()
    }

    /// The designation maps without any image data.
    pub fn index(&self) -> &TileIndex {
        &self.index
    }

    pub fn designation_of(&self, id: TileId) -> Result<u16> {
        self.index.designation_of(id)
    }

    pub fn identifier_of(&self, designation: u16) -> Result<TileId> {
        self.index.identifier_of(designation)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The renderable tile for an identifier.
    pub fn image_cell(&self, id: TileId) -> Result<&RgbaImage> {
        if !self.index.contains(id) {
            return Err(WorldError::UnknownTile(id));
        }
        self.sheets
            .get(id.image_path())
            .and_then(|sheet| sheet.cell(id.image_cell()))
            .ok_or(WorldError::UnknownTile(id))
    }

    /// The renderable tile for a designation.
    pub fn image_cell_by_designation(&self, designation: u16) -> Result<&RgbaImage> {
        let id = self.index.identifier_of(designation)?;
        self.image_cell(id)
    }
}

/// Builder that registers sheets one loader at a time.
pub struct TileSetBuilder {
    index: TileIndex,
    sheets: HashMap<&'static str, TileSheet>,
}

impl TileSetBuilder {
    pub fn new() -> Self {
        Self {
            index: TileIndex::default(),
            sheets: HashMap::new(),
        }
    }

    /// Run a loader and assign the next designations to every identifier it
    /// returns, group by group.
    pub fn register<F>(mut self, loader: F) -> Result<Self>
    where
        F: FnOnce() -> Result<LoadedSheet>,
    {
        let loaded = loader()?;
        let sheet = TileSheet::from_image(loaded.image, loaded.layout)?;

        for group in &loaded.groups {
            for &id in group {
                self.index.push(id)?;
            }
        }

        self.sheets.insert(loaded.layout.path, sheet);
        Ok(self)
    }

    pub fn build(self) -> TileSet {
        TileSet {
            index: self.index,
            sheets: self.sheets,
        }
    }
}

impl Default for TileSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}
