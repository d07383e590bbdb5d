//! Error types for world generation

use std::path::PathBuf;

use thiserror::Error;

use crate::tiles::TileId;

/// Errors surfaced to the driver.
///
/// Configuration problems are reported before any worker is started.
/// `WorkerFailed` means a stage aborted part-way and the grid must be discarded.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("world size {width}x{height} must be non-zero and divisible by the zone length {zone_len}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        zone_len: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("tile {0} is not registered in this tile set")]
    UnknownTile(TileId),

    #[error("designation {0} is not assigned in this tile set")]
    UnknownDesignation(u16),

    #[error("tile set holds {len} tiles but the target layer only addresses {max}")]
    DesignationOverflow { len: usize, max: usize },

    #[error("sheet {path:?} is {width}x{height}px, too small for {cols}x{rows} tiles")]
    SheetTooSmall {
        path: PathBuf,
        width: u32,
        height: u32,
        cols: u32,
        rows: u32,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("worker failed during {stage}: {message}")]
    WorkerFailed { stage: &'static str, message: String },

    #[error("world build thread panicked")]
    BuildThreadPanicked,
}

pub type Result<T> = std::result::Result<T, WorldError>;
