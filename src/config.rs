//! World generation configuration.
//!
//! Every knob the pipeline reads lives here, loaded from JSON or built in
//! code. Call [`WorldConfig::validate`] before allocating anything; the maker
//! does this for you.

use std::path::Path;

use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorldError};
use crate::tiles::{Decoration, Terrain};
use crate::world::DEFAULT_ZONE_LEN;

/// Parameters for one fractal coherent-noise field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Tiles per noise unit; larger = smoother
    pub scale: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    /// Seed offset that decorrelates fields sharing the other parameters
    pub base: u32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            scale: 100.0,
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
            base: 1,
        }
    }
}

impl NoiseParams {
    pub fn with_base(mut self, base: u32) -> Self {
        self.base = base;
        self
    }

    fn validate(&self, field: &str) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(invalid(format!("{}.scale must be positive, got {}", field, self.scale)));
        }
        if self.octaves == 0 {
            return Err(invalid(format!("{}.octaves must be at least 1", field)));
        }
        if !self.persistence.is_finite() || !self.lacunarity.is_finite() {
            return Err(invalid(format!("{} has a non-finite persistence or lacunarity", field)));
        }
        Ok(())
    }
}

/// Mean and standard deviation of a normally distributed parameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gaussian {
    pub mu: f64,
    pub sigma: f64,
}

impl Gaussian {
    pub const fn new(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }

    pub fn normal(&self) -> Result<Normal<f64>> {
        Normal::new(self.mu, self.sigma).map_err(|e| invalid(format!("{:?}: {}", self, e)))
    }

    fn validate(&self, field: &str) -> Result<()> {
        if !self.mu.is_finite() || !(self.sigma.is_finite() && self.sigma >= 0.0) {
            return Err(invalid(format!(
                "{} needs a finite mean and a non-negative deviation, got {} / {}",
                field, self.mu, self.sigma
            )));
        }
        Ok(())
    }
}

/// Nearest-point terrain classification settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoronoiParams {
    /// Number of randomly scattered points
    pub points: usize,
    /// Cells farther than this from every point get `default`
    pub max_dist: f64,
    pub default: Terrain,
    /// Terrains the points are drawn from
    pub choices: Vec<Terrain>,
}

impl Default for VoronoiParams {
    fn default() -> Self {
        Self {
            points: 32,
            max_dist: 64.0,
            default: Terrain::Grass,
            choices: vec![Terrain::Grass, Terrain::Dirt, Terrain::Stone, Terrain::Sand],
        }
    }
}

/// Which painter lays down the first terrain pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerrainConfig {
    OnlyGrass,
    Perlin(NoiseParams),
    Voronoi(VoronoiParams),
    Stochastic,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig::Perlin(NoiseParams::default())
    }
}

impl TerrainConfig {
    pub fn name(&self) -> &'static str {
        match self {
            TerrainConfig::OnlyGrass => "only_grass",
            TerrainConfig::Perlin(_) => "perlin",
            TerrainConfig::Voronoi(_) => "voronoi",
            TerrainConfig::Stochastic => "stochastic",
        }
    }
}

/// Chained square lake settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LakeConfig {
    pub enabled: bool,
    /// Number of chains
    pub count: Gaussian,
    /// Lakes per chain (at least 1)
    pub chain_length: Gaussian,
    /// Unsigned per-axis offset of a lake from an earlier one in its chain
    pub offset: Gaussian,
    pub radius: Gaussian,
    /// Minimum distance of a chain's first center from any map edge
    pub margin: usize,
}

impl Default for LakeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            count: Gaussian::new(4.0, 1.0),
            chain_length: Gaussian::new(5.0, 2.0),
            offset: Gaussian::new(3.0, 2.0),
            radius: Gaussian::new(4.0, 1.0),
            margin: 24,
        }
    }
}

/// River lattice settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverConfig {
    pub enabled: bool,
    /// Explicit source tiles; random sources are drawn when empty
    pub sources: Vec<(usize, usize)>,
    pub source_count: usize,
    /// Tiles between lattice points on each axis
    pub point_step: usize,
    /// Standard deviation of the jitter applied to in-bounds lattice points
    pub point_deviation: f64,
    /// Starting width, also the increment applied below a confluence
    pub default_width: i64,
    /// Field sampled at lattice coordinates to make rivers meander
    pub noise: NoiseParams,
    /// Added to a candidate's score when it moves away from the exit
    pub far_penalty: f64,
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sources: Vec::new(),
            source_count: 2,
            point_step: 5,
            point_deviation: 1.5,
            default_width: 2,
            noise: NoiseParams::default().with_base(0),
            far_penalty: 100.0,
        }
    }
}

/// Weighted choice of decorations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub name: String,
    pub choices: Vec<(Decoration, f64)>,
}

impl Distribution {
    fn new(name: &str, choices: &[(Decoration, f64)]) -> Self {
        Self {
            name: name.to_string(),
            choices: choices.to_vec(),
        }
    }

    fn validate(&self) -> Result<()> {
        let total: f64 = self.choices.iter().map(|(_, w)| *w).sum();
        if self.choices.iter().any(|(_, w)| !(w.is_finite() && *w >= 0.0)) || total <= 0.0 {
            return Err(invalid(format!(
                "distribution {} needs non-negative weights with a positive sum",
                self.name
            )));
        }
        Ok(())
    }
}

/// Decoration distributions keyed by the two bucket noise values.
///
/// `cells[a][b]` is used where the first bucket field lands in bucket `a`
/// and the second in bucket `b`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecorationTable {
    pub cells: [[Distribution; 3]; 3],
}

impl Default for DecorationTable {
    fn default() -> Self {
        use Decoration::*;

        let pure_mix = Distribution::new(
            "PURE_MIX",
            &[
                (GrassPlantA, 0.0625),
                (GrassPlantB, 0.0625),
                (GrassPlantC, 0.0625),
                (GrassTextureA, 0.0625),
                (GrassTextureB, 0.0625),
                (GrassTextureC, 0.0625),
                (GrassTextureD, 0.0625),
                (GrassLogA, 0.0625),
                (GrassLogB, 0.0625),
                (GrassRockA, 0.0625),
                (GrassRockB, 0.0625),
                (GrassFlowerA, 0.0625),
                (GrassFlowerB, 0.0625),
                (GrassFlowerC, 0.0625),
                (GrassFlowerD, 0.0625),
                (GrassFlowerE, 0.0625),
            ],
        );
        let plant_mix = Distribution::new(
            "PLANT_MIX",
            &[
                (GrassPlantA, 0.083),
                (GrassPlantB, 0.083),
                (GrassPlantC, 0.083),
                (GrassTextureA, 0.083),
                (GrassTextureB, 0.083),
                (GrassTextureC, 0.083),
                (GrassTextureD, 0.083),
                (GrassFlowerA, 0.087),
                (GrassFlowerB, 0.083),
                (GrassFlowerC, 0.083),
                (GrassFlowerD, 0.083),
                (GrassFlowerE, 0.083),
            ],
        );
        let flower_field = Distribution::new(
            "FLOWER_FIELD",
            &[
                (GrassFlowerA, 0.2),
                (GrassFlowerB, 0.2),
                (GrassFlowerC, 0.2),
                (GrassFlowerD, 0.2),
                (GrassFlowerE, 0.2),
            ],
        );
        let grass_texture = Distribution::new(
            "GRASS_TEXTURE",
            &[
                (GrassTextureA, 0.25),
                (GrassTextureB, 0.25),
                (GrassTextureC, 0.25),
                (GrassTextureD, 0.25),
            ],
        );
        let felled_wood = Distribution::new(
            "FELLED_WOOD",
            &[
                (GrassPlantA, 0.1),
                (GrassPlantB, 0.1),
                (GrassPlantC, 0.1),
                (GrassLogA, 0.25),
                (GrassLogB, 0.25),
                (GrassRockA, 0.1),
                (GrassRockB, 0.1),
            ],
        );
        let green_mix = Distribution::new(
            "GREEN_MIX",
            &[
                (GrassPlantA, 0.1429),
                (GrassPlantB, 0.1429),
                (GrassPlantC, 0.1429),
                (GrassTextureA, 0.1429),
                (GrassTextureB, 0.1429),
                (GrassTextureC, 0.1426),
                (GrassTextureD, 0.1429),
            ],
        );

        Self {
            cells: [
                [pure_mix.clone(), grass_texture, pure_mix.clone()],
                [plant_mix, flower_field, pure_mix.clone()],
                [felled_wood, green_mix, pure_mix],
            ],
        }
    }
}

/// Grass decoration settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationConfig {
    pub enabled: bool,
    /// Decorations are placed where the placement field is outside
    /// `(place_below, place_above)`
    pub place_below: f64,
    pub place_above: f64,
    pub placement: NoiseParams,
    pub bucket_a: NoiseParams,
    pub bucket_b: NoiseParams,
    pub table: DecorationTable,
}

impl Default for DecorationConfig {
    fn default() -> Self {
        let bucket = NoiseParams {
            scale: 10.0,
            octaves: 10,
            persistence: 0.5,
            lacunarity: 2.0,
            base: 2,
        };
        Self {
            enabled: true,
            place_below: -0.35,
            place_above: 0.35,
            placement: NoiseParams {
                scale: 10.0,
                octaves: 6,
                persistence: 0.5,
                lacunarity: 2.0,
                base: 1,
            },
            bucket_a: bucket,
            bucket_b: bucket.with_base(3),
            table: DecorationTable::default(),
        }
    }
}

/// Top-level configuration for one world build.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: usize,
    pub height: usize,
    /// Edge length of an averaging zone; must divide both extents
    pub zone_len: usize,
    /// Threads in the worker pool
    pub workers: usize,
    /// Column ranges per partitioned stage; defaults to `workers`
    pub chunks: Option<usize>,
    /// Master seed; random when absent
    pub seed: Option<u64>,
    pub terrain: TerrainConfig,
    pub lakes: LakeConfig,
    pub rivers: RiverConfig,
    pub decoration: DecorationConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            zone_len: DEFAULT_ZONE_LEN,
            workers: 8,
            chunks: None,
            seed: None,
            terrain: TerrainConfig::default(),
            lakes: LakeConfig::default(),
            rivers: RiverConfig::default(),
            decoration: DecorationConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.unwrap_or(self.workers)
    }

    /// Check every parameter before anything is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0
            || self.height == 0
            || self.zone_len == 0
            || self.width % self.zone_len != 0
            || self.height % self.zone_len != 0
        {
            return Err(WorldError::InvalidDimensions {
                width: self.width,
                height: self.height,
                zone_len: self.zone_len,
            });
        }
        if self.workers == 0 {
            return Err(invalid("workers must be at least 1".to_string()));
        }
        if self.chunk_count() == 0 {
            return Err(invalid("chunks must be at least 1".to_string()));
        }

        match &self.terrain {
            TerrainConfig::Perlin(params) => params.validate("terrain")?,
            TerrainConfig::Voronoi(params) => {
                if !(params.max_dist > 0.0) {
                    return Err(invalid(format!(
                        "terrain.max_dist must be positive, got {}",
                        params.max_dist
                    )));
                }
                if params.choices.is_empty() {
                    return Err(invalid("terrain.choices must not be empty".to_string()));
                }
            }
            TerrainConfig::OnlyGrass | TerrainConfig::Stochastic => {}
        }

        let lakes = &self.lakes;
        lakes.count.validate("lakes.count")?;
        lakes.chain_length.validate("lakes.chain_length")?;
        lakes.offset.validate("lakes.offset")?;
        lakes.radius.validate("lakes.radius")?;

        let rivers = &self.rivers;
        if rivers.point_step == 0 {
            return Err(invalid("rivers.point_step must be at least 1".to_string()));
        }
        if !(rivers.point_deviation.is_finite() && rivers.point_deviation >= 0.0) {
            return Err(invalid(format!(
                "rivers.point_deviation must be non-negative, got {}",
                rivers.point_deviation
            )));
        }
        if rivers.default_width < 0 {
            return Err(invalid("rivers.default_width must not be negative".to_string()));
        }
        if !rivers.far_penalty.is_finite() {
            return Err(invalid("rivers.far_penalty must be finite".to_string()));
        }
        rivers.noise.validate("rivers.noise")?;
        for &(x, y) in &rivers.sources {
            if x >= self.width || y >= self.height {
                return Err(invalid(format!(
                    "river source ({}, {}) is outside the {}x{} world",
                    x, y, self.width, self.height
                )));
            }
        }

        let decoration = &self.decoration;
        if !(decoration.place_below <= decoration.place_above) {
            return Err(invalid("decoration.place_below must not exceed place_above".to_string()));
        }
        decoration.placement.validate("decoration.placement")?;
        decoration.bucket_a.validate("decoration.bucket_a")?;
        decoration.bucket_b.validate("decoration.bucket_b")?;
        for row in &decoration.table.cells {
            for dist in row {
                dist.validate()?;
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> WorldError {
    WorldError::InvalidConfig(message)
}
