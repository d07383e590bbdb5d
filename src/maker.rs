//! World assembly: runs every painter in order over a worker pool.
//!
//! Per-cell stages (base terrain, edges, decorations) are split into
//! contiguous column ranges, one band per task, so no two workers ever write
//! the same cell. Lakes and rivers touch scattered cells and run on the
//! calling thread. Zone counts are rebuilt after every stage that changes
//! `base`.

use std::any::Any;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{TerrainConfig, WorldConfig};
use crate::error::{Result, WorldError};
use crate::generators::CoherentNoise;
use crate::paint::average::{assign_averages, recount_zones};
use crate::paint::base_terrain::{make_voronoi_points, only_grass, perlin_classify, stochastic, voronoi_classify};
use crate::paint::detail::DecorationPainter;
use crate::paint::edge::{edge_pass, EdgeTable};
use crate::paint::lake::{generate_chain_lakes, paint_square_lake_chain};
use crate::paint::river::{generate_rivers, paint_river, random_sources};
use crate::seeds::WorldSeeds;
use crate::tile_set::TileIndex;
use crate::tilemap::{ColumnBand, Tilemap};
use crate::world::WorldGrid;

/// Split `0..width` into `chunks` contiguous ranges of `width / chunks`
/// columns. The last range takes the remainder; empty ranges are dropped.
pub fn column_ranges(width: usize, chunks: usize) -> Vec<Range<usize>> {
    let chunks = chunks.max(1);
    let step = width / chunks;
    let mut ranges = Vec::with_capacity(chunks);
    for i in 0..chunks {
        let start = i * step;
        let end = if i + 1 == chunks { width } else { start + step };
        if start < end {
            ranges.push(start..end);
        }
    }
    ranges
}

/// The detail-layer ranges owned by a set of base column ranges.
fn detail_ranges(ranges: &[Range<usize>]) -> Vec<Range<usize>> {
    ranges.iter().map(|r| r.start * 2..r.end * 2).collect()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Builds worlds from one validated configuration.
pub struct WorldMaker {
    config: WorldConfig,
    seeds: WorldSeeds,
    primary: TileIndex,
    edges: EdgeTable,
    decorations: Option<DecorationPainter>,
    pool: rayon::ThreadPool,
}

impl WorldMaker {
    /// Validate the configuration against both tile sets and start the
    /// worker pool. Nothing is allocated for the world yet.
    pub fn new(config: WorldConfig, primary: &TileIndex, detail: &TileIndex) -> Result<Self> {
        config.validate()?;

        let edges = EdgeTable::new(detail)?;
        let decorations = if config.decoration.enabled {
            let extent = (config.width * 2, config.height * 2);
            Some(DecorationPainter::new(&config.decoration, primary, detail, extent)?)
        } else {
            None
        };

        let seeds = match config.seed {
            Some(seed) => WorldSeeds::from_master(seed),
            None => WorldSeeds::default(),
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("tile-world-{}", i))
            .build()?;

        Ok(Self {
            config,
            seeds,
            primary: primary.clone(),
            edges,
            decorations,
            pool,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn seeds(&self) -> &WorldSeeds {
        &self.seeds
    }

    /// Run the whole pipeline and return the finished grid.
    pub fn build(&self) -> Result<WorldGrid> {
        let config = &self.config;
        let started = Instant::now();
        info!(
            width = config.width,
            height = config.height,
            seed = self.seeds.master,
            workers = config.workers,
            terrain = config.terrain.name(),
            "building world"
        );

        let mut grid = WorldGrid::new(config.width, config.height, config.zone_len, &self.primary)?;
        let ranges = column_ranges(config.width, config.chunk_count());

        self.paint_base_terrain(&mut grid, &ranges)?;
        refresh_averages(&mut grid);

        if config.lakes.enabled {
            self.paint_lakes(&mut grid)?;
            refresh_averages(&mut grid);
        }

        if config.rivers.enabled {
            self.paint_rivers(&mut grid)?;
            refresh_averages(&mut grid);
        }

        let detail_ranges = detail_ranges(&ranges);
        {
            let base = &grid.base;
            let primary = &self.primary;
            let edges = &self.edges;
            perform_spatial_work(&self.pool, "edges", &mut grid.detail, &detail_ranges, |band| {
                edge_pass(band, base, primary, edges)
            })?;
        }
        info!("edge pass done");

        if let Some(painter) = &self.decorations {
            let base = &grid.base;
            let seed = self.seeds.decoration;
            perform_spatial_work(&self.pool, "decoration", &mut grid.detail, &detail_ranges, |band| {
                painter.paint(band, base, seed);
                Ok(())
            })?;
            info!("decorations placed");
        }

        grid.mark_complete();
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "world complete");
        Ok(grid)
    }

    fn paint_base_terrain(&self, grid: &mut WorldGrid, ranges: &[Range<usize>]) -> Result<()> {
        let primary = &self.primary;
        let sizes = grid.sizes();
        let base = &mut grid.base;

        match &self.config.terrain {
            TerrainConfig::OnlyGrass => {
                perform_spatial_work(&self.pool, "terrain", base, ranges, |band| only_grass(band, primary))?;
            }
            TerrainConfig::Perlin(params) => {
                let noise = CoherentNoise::new(*params, sizes);
                perform_spatial_work(&self.pool, "terrain", base, ranges, |band| {
                    perlin_classify(band, primary, &noise)
                })?;
            }
            TerrainConfig::Voronoi(params) => {
                let mut rng = ChaCha8Rng::seed_from_u64(self.seeds.voronoi);
                let points = make_voronoi_points(&mut rng, sizes, params.points, &params.choices);
                debug!(points = points.len(), "scattered voronoi sites");
                perform_spatial_work(&self.pool, "terrain", base, ranges, |band| {
                    voronoi_classify(band, primary, &points, params.max_dist, params.default)
                })?;
            }
            TerrainConfig::Stochastic => {
                let seed = self.seeds.terrain;
                perform_spatial_work(&self.pool, "terrain", base, ranges, |band| stochastic(band, primary, seed))?;
            }
        }

        info!(terrain = self.config.terrain.name(), bands = ranges.len(), "base terrain painted");
        Ok(())
    }

    fn paint_lakes(&self, grid: &mut WorldGrid) -> Result<()> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seeds.lakes);
        let chains = generate_chain_lakes(&mut rng, grid.sizes(), &self.config.lakes)?;
        for chain in &chains {
            paint_square_lake_chain(&mut grid.base, &self.primary, chain)?;
        }
        info!(chains = chains.len(), lakes = chains.iter().map(Vec::len).sum::<usize>(), "lakes painted");
        Ok(())
    }

    fn paint_rivers(&self, grid: &mut WorldGrid) -> Result<()> {
        let rivers = &self.config.rivers;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seeds.rivers);
        let sources = if rivers.sources.is_empty() {
            random_sources(&mut rng, grid.sizes(), rivers.source_count)
        } else {
            rivers.sources.clone()
        };

        let segments = generate_rivers(&mut rng, grid.sizes(), &sources, rivers)?;
        paint_river(&mut grid.base, &self.primary, &segments)?;
        info!(rivers = sources.len(), segments = segments.len(), "rivers painted");
        Ok(())
    }

    /// Run [`build`](Self::build) on a background thread.
    pub fn spawn(self) -> BuildHandle {
        let complete = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&complete);
        let thread = thread::spawn(move || {
            let grid = self.build()?;
            flag.store(true, Ordering::Release);
            Ok(grid)
        });
        BuildHandle { complete, thread }
    }
}

fn refresh_averages(grid: &mut WorldGrid) {
    recount_zones(grid);
    assign_averages(grid);
}

/// Split `layer` into bands and run `work` on each inside the pool.
///
/// Returns once every band has finished. A band that panics is reported as
/// [`WorldError::WorkerFailed`]; the first error wins.
fn perform_spatial_work<T, F>(
    pool: &rayon::ThreadPool,
    stage: &'static str,
    layer: &mut Tilemap<T>,
    ranges: &[Range<usize>],
    work: F,
) -> Result<()>
where
    T: Send,
    F: Fn(&mut ColumnBand<'_, T>) -> Result<()> + Sync,
{
    let mut bands = layer.column_bands_mut(ranges);
    pool.install(|| {
        bands.par_iter_mut().try_for_each(|band| {
            let columns = band.columns();
            match panic::catch_unwind(AssertUnwindSafe(|| work(band))) {
                Ok(result) => {
                    debug!(stage, ?columns, "band finished");
                    result
                }
                Err(payload) => Err(WorldError::WorkerFailed {
                    stage,
                    message: panic_message(payload),
                }),
            }
        })
    })
}

/// A world being built in the background.
pub struct BuildHandle {
    complete: Arc<AtomicBool>,
    thread: JoinHandle<Result<WorldGrid>>,
}

impl BuildHandle {
    /// True once the build has finished successfully. Never reset.
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    /// Wait for the build and take the grid.
    pub fn join(self) -> Result<WorldGrid> {
        self.thread.join().map_err(|_| WorldError::BuildThreadPanicked)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{detail_tile_set, primary_tile_set, AssetSource};
    use crate::config::NoiseParams;
    use crate::world::{NONE_DETAIL, NO_TERRAIN};

    fn indices() -> (TileIndex, TileIndex) {
        let primary = primary_tile_set(&AssetSource::Blank).unwrap().index().clone();
        let detail = detail_tile_set(&AssetSource::Blank).unwrap().index().clone();
        (primary, detail)
    }

    fn small_config() -> WorldConfig {
        let mut config = WorldConfig {
            width: 20,
            height: 20,
            zone_len: 10,
            workers: 1,
            seed: Some(1),
            terrain: TerrainConfig::Perlin(NoiseParams {
                scale: 100.0,
                octaves: 6,
                persistence: 0.5,
                lacunarity: 2.0,
                base: 1,
            }),
            ..WorldConfig::default()
        };
        config.lakes.enabled = false;
        config.rivers.enabled = false;
        config.decoration.enabled = false;
        config
    }

    #[test]
    fn test_column_ranges() {
        assert_eq!(column_ranges(20, 1), vec![0..20]);
        assert_eq!(column_ranges(20, 3), vec![0..6, 6..12, 12..20]);
        assert_eq!(column_ranges(3, 8), vec![0..3]);
        assert_eq!(detail_ranges(&[0..6, 6..20]), vec![0..12, 12..40]);
    }

    #[test]
    fn test_small_world_end_to_end() {
        let (primary, detail) = indices();
        let maker = WorldMaker::new(small_config(), &primary, &detail).unwrap();
        let grid = maker.build().unwrap();

        assert!(grid.is_complete());
        assert!(grid.base.iter().all(|(_, _, &v)| v != NO_TERRAIN && (v as usize) < primary.len()));
        assert_eq!((grid.base_average.width, grid.base_average.height), (2, 2));
        assert_eq!((grid.detail.width, grid.detail.height), (40, 40));
        assert!(grid
            .detail
            .iter()
            .all(|(_, _, &v)| v == NONE_DETAIL || (v >= 0 && (v as usize) < detail.len())));
    }

    #[test]
    fn test_worker_count_does_not_change_the_world() {
        let (primary, detail) = indices();
        let build = |workers: usize| {
            let config = WorldConfig {
                width: 60,
                height: 60,
                workers,
                seed: Some(42),
                ..WorldConfig::default()
            };
            WorldMaker::new(config, &primary, &detail).unwrap().build().unwrap()
        };

        let four = build(4);
        let eight = build(8);
        assert_eq!(four.base, eight.base);
        assert_eq!(four.base_average, eight.base_average);
        assert_eq!(four.detail, eight.detail);
    }

    #[test]
    fn test_stage_seeds_derive_from_configured_seed() {
        let (primary, detail) = indices();
        let maker = WorldMaker::new(small_config(), &primary, &detail).unwrap();
        assert_eq!(maker.seeds(), &WorldSeeds::from_master(1));

        let again = WorldMaker::new(small_config(), &primary, &detail).unwrap();
        assert_eq!(maker.build().unwrap().base, again.build().unwrap().base);
    }

    #[test]
    fn test_bad_config_fails_before_building() {
        let (primary, detail) = indices();
        let config = WorldConfig {
            width: 25,
            ..small_config()
        };
        assert!(matches!(
            WorldMaker::new(config, &primary, &detail),
            Err(WorldError::InvalidDimensions { width: 25, .. })
        ));
    }

    #[test]
    fn test_every_terrain_mode_builds() {
        let (primary, detail) = indices();
        for terrain in [
            TerrainConfig::OnlyGrass,
            TerrainConfig::Voronoi(Default::default()),
            TerrainConfig::Stochastic,
        ] {
            let config = WorldConfig {
                terrain,
                workers: 3,
                ..small_config()
            };
            let grid = WorldMaker::new(config, &primary, &detail).unwrap().build().unwrap();
            assert!(grid.base.iter().all(|(_, _, &v)| v != NO_TERRAIN));
        }
    }

    #[test]
    fn test_spawned_build_completes() {
        let (primary, detail) = indices();
        let handle = WorldMaker::new(small_config(), &primary, &detail).unwrap().spawn();
        let grid = handle.join().unwrap();
        assert!(grid.is_complete());
    }

    #[test]
    fn test_completion_flag_is_set_after_build() {
        let (primary, detail) = indices();
        let handle = WorldMaker::new(small_config(), &primary, &detail).unwrap().spawn();
        while !handle.is_complete() && !handle.thread.is_finished() {
            thread::yield_now();
        }
        assert!(handle.is_complete());
        assert!(handle.join().is_ok());
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        let mut layer = Tilemap::new_with(10, 4, 0u8);
        let result = perform_spatial_work(&pool, "test", &mut layer, &[0..5, 5..10], |band| {
            if band.columns().start == 5 {
                panic!("band blew up");
            }
            Ok(())
        });

        match result {
            Err(WorldError::WorkerFailed { stage, message }) => {
                assert_eq!(stage, "test");
                assert!(message.contains("blew up"));
            }
            other => panic!("expected a worker failure, got {:?}", other.map(|_| ())),
        }
    }
}
