//! Tile world generation library
//!
//! Builds layered tile worlds (terrain, lakes, rivers, edge art and
//! decorations) over a worker pool. Re-exports modules for use by the driver.

pub mod ascii;
pub mod assets;
pub mod config;
pub mod error;
pub mod export;
pub mod generators;
pub mod maker;
pub mod paint;
pub mod raster;
pub mod seeds;
pub mod tile_set;
pub mod tilemap;
pub mod tiles;
pub mod world;

pub use error::{Result, WorldError};
