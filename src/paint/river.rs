//! River routing on a coarse, jittered lattice, then painting into `base`.
//!
//! Rivers walk lattice points greedily toward one shared exit on the map
//! border. Noise sampled at each candidate point makes them meander; a large
//! penalty keeps them from wandering away from the exit. A river that runs
//! into a point another river already claimed stops there and widens the
//! rest of that river below the confluence.
//!
//! Two rivers whose paths cross between lattice points are not merged.

use rand::Rng;
use rand_distr::Distribution;
use tracing::debug;

use super::base_designation;
use crate::config::{Gaussian, RiverConfig};
use crate::error::Result;
use crate::generators::{CoherentNoise, Generator};
use crate::raster;
use crate::tile_set::TileIndex;
use crate::tilemap::Tilemap;
use crate::tiles::{RiverFlow, TileId};

/// A lattice control point.
#[derive(Clone, Debug, PartialEq)]
pub struct LatticePoint {
    /// River width painted from this point to the next
    pub width: i64,
    /// Position in world tiles (may lie off the map on the margin)
    pub real_pos: (i64, i64),
    /// Lattice position the river continues to
    pub next: Option<(usize, usize)>,
    /// Lattice direction taken toward `next`
    pub lattice_flow: Option<RiverFlow>,
    /// Direction of the real displacement toward `next`, used for tile art
    pub real_flow: RiverFlow,
}

/// A one-tile slice across a river.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RiverSegment {
    pub pos: (i64, i64),
    pub flow: RiverFlow,
    pub width: i64,
}

/// The control-point grid, one point every `step` tiles with a one-point
/// margin outside the map on every side.
pub struct RiverLattice {
    step: usize,
    cols: usize,
    rows: usize,
    points: Vec<LatticePoint>,
    claimed: Vec<bool>,
    /// Claimed points in claim order
    claim_order: Vec<(usize, usize)>,
}

impl RiverLattice {
    /// Build a lattice for a world, jittering every on-map point.
    pub fn new<R: Rng>(rng: &mut R, sizes: (usize, usize), config: &RiverConfig) -> Result<Self> {
        let (width, height) = sizes;
        let step = config.point_step.max(1);
        let cols = width / step + 2;
        let rows = height / step + 2;
        let jitter = Gaussian::new(0.0, config.point_deviation).normal()?;

        let mut points = Vec::with_capacity(cols * rows);
        for lat_x in 0..cols {
            for lat_y in 0..rows {
                let mut x = (lat_x * step) as i64 - step as i64;
                let mut y = (lat_y * step) as i64 - step as i64;

                if x >= 0 && (x as usize) < width && y >= 0 && (y as usize) < height {
                    x = (x as f64 + jitter.sample(rng)).round() as i64;
                    y = (y as f64 + jitter.sample(rng)).round() as i64;
                }

                points.push(LatticePoint {
                    width: config.default_width,
                    real_pos: (x, y),
                    next: None,
                    lattice_flow: None,
                    real_flow: RiverFlow::NoFlow,
                });
            }
        }

        Ok(Self {
            step,
            cols,
            rows,
            points,
            claimed: vec![false; cols * rows],
            claim_order: Vec::new(),
        })
    }

    /// Lattice extent (columns, rows).
    pub fn size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.cols && (y as usize) < self.rows
    }

    /// Strictly inside the margin ring.
    pub fn is_interior(&self, pos: (usize, usize)) -> bool {
        pos.0 > 0 && pos.0 < self.cols - 1 && pos.1 > 0 && pos.1 < self.rows - 1
    }

    fn index(&self, pos: (usize, usize)) -> usize {
        pos.0 * self.rows + pos.1
    }

    pub fn point(&self, pos: (usize, usize)) -> &LatticePoint {
        &self.points[self.index(pos)]
    }

    pub fn point_mut(&mut self, pos: (usize, usize)) -> &mut LatticePoint {
        let idx = self.index(pos);
        &mut self.points[idx]
    }

    pub fn is_claimed(&self, pos: (usize, usize)) -> bool {
        self.claimed[self.index(pos)]
    }

    fn claim(&mut self, pos: (usize, usize)) {
        let idx = self.index(pos);
        if !self.claimed[idx] {
            self.claimed[idx] = true;
            self.claim_order.push(pos);
        }
    }

    /// Lattice point nearest a world tile.
    pub fn snap(&self, tile: (usize, usize)) -> (usize, usize) {
        let to_lattice = |v: usize, len: usize| {
            let lat = (v as f64 / self.step as f64).round() as usize + 1;
            lat.min(len - 1)
        };
        (to_lattice(tile.0, self.cols), to_lattice(tile.1, self.rows))
    }

    /// Widen every point from `start` down to the end of its river.
    ///
    /// The final point (the one without a successor) is left alone.
    pub fn buff_river(&mut self, start: (usize, usize), add: i64) {
        let mut pos = start;
        // a river that looped back onto itself must not spin forever
        for _ in 0..self.points.len() {
            let point = self.point_mut(pos);
            match point.next {
                Some(next) => {
                    point.width += add;
                    pos = next;
                }
                None => break,
            }
        }
    }

    /// Rasterise every claimed edge into segments, in claim order.
    pub fn to_segments(&self) -> Vec<RiverSegment> {
        let mut segments = Vec::new();
        for &pos in &self.claim_order {
            let point = self.point(pos);
            let Some(next) = point.next else {
                continue;
            };
            let target = self.point(next).real_pos;
            for cell in raster::line(point.real_pos, target) {
                segments.push(RiverSegment {
                    pos: cell,
                    flow: point.real_flow,
                    width: point.width,
                });
            }
        }
        segments
    }
}

/// Pick the exit point: a random lattice position just outside one of the
/// four map borders.
pub fn choose_exit<R: Rng>(rng: &mut R, lattice_size: (usize, usize)) -> (i64, i64) {
    let (cols, rows) = (lattice_size.0 as i64, lattice_size.1 as i64);
    match rng.gen_range(0..4) {
        0 => (-1, rng.gen_range(-1..=rows)),
        1 => (cols, rng.gen_range(-1..=rows)),
        2 => (rng.gen_range(-1..=cols), -1),
        _ => (rng.gen_range(-1..=cols), rows),
    }
}

/// Uniformly random source tiles.
pub fn random_sources<R: Rng>(rng: &mut R, sizes: (usize, usize), count: usize) -> Vec<(usize, usize)> {
    let (width, height) = sizes;
    if width == 0 || height == 0 {
        return Vec::new();
    }
    (0..count)
        .map(|_| (rng.gen_range(0..width), rng.gen_range(0..height)))
        .collect()
}

fn lattice_distance(a: (i64, i64), b: (i64, i64)) -> f64 {
    ((a.0 - b.0) as f64).hypot((a.1 - b.1) as f64)
}

/// Route one river per source and return the segments to paint.
pub fn generate_rivers<R: Rng>(
    rng: &mut R,
    sizes: (usize, usize),
    sources: &[(usize, usize)],
    config: &RiverConfig,
) -> Result<Vec<RiverSegment>> {
    let mut lattice = RiverLattice::new(rng, sizes, config)?;
    let exit = choose_exit(rng, lattice.size());
    let noise = CoherentNoise::new(config.noise, lattice.size());
    debug!(lattice = ?lattice.size(), ?exit, sources = sources.len(), "routing rivers");

    for &source in sources {
        let steps = route_river(&mut lattice, source, exit, &noise, config);
        debug!(?source, steps, "river routed");
    }

    Ok(lattice.to_segments())
}

/// Walk one river from `source` toward `exit`, returning the lattice steps taken.
///
/// The walk ends when it leaves the interior, when no candidate is on the
/// lattice, or when it meets a claimed point. Meeting a claimed point widens
/// the existing river from that point down by `default_width`.
pub fn route_river(
    lattice: &mut RiverLattice,
    source: (usize, usize),
    exit: (i64, i64),
    field: &dyn Generator,
    config: &RiverConfig,
) -> usize {
    let mut pos = lattice.snap(source);
    lattice.point_mut(pos).real_pos = (source.0 as i64, source.1 as i64);
    let mut previous: Option<RiverFlow> = None;
    let mut steps = 0usize;

    loop {
        if lattice.is_claimed(pos) {
            lattice.buff_river(pos, config.default_width);
            break;
        }

        let here = (pos.0 as i64, pos.1 as i64);
        let curr_dist = lattice_distance(here, exit);

        // Every direction on the first step, then ahead / right / left
        let (heading, turns): (RiverFlow, &[i32]) = match previous {
            None => (RiverFlow::East, &[0, 1, 2, 3, 4, 5, 6, 7]),
            Some(flow) => (flow, &[0, -1, 1]),
        };

        let mut best: Option<(f64, RiverFlow, (usize, usize))> = None;
        for &turn in turns {
            let flow = heading.rotate(turn);
            let (dx, dy) = flow.shift();
            let (nx, ny) = (here.0 + dx, here.1 + dy);
            if !lattice.in_bounds(nx, ny) {
                continue;
            }

            let mut score = field.value(nx as f64, ny as f64);
            let new_dist = lattice_distance((nx, ny), exit);
            if new_dist > curr_dist {
                score += config.far_penalty + new_dist - curr_dist;
            }
            if best.map_or(true, |(low, _, _)| score < low) {
                best = Some((score, flow, (nx as usize, ny as usize)));
            }
        }

        let Some((_, flow, next)) = best else {
            lattice.claim(pos);
            break;
        };

        let target = lattice.point(next).real_pos;
        let point = lattice.point_mut(pos);
        point.next = Some(next);
        point.lattice_flow = Some(flow);
        point.real_flow = RiverFlow::from_delta(target.0 - point.real_pos.0, target.1 - point.real_pos.1);
        lattice.claim(pos);

        if lattice.is_claimed(next) {
            lattice.buff_river(next, config.default_width);
            break;
        }

        previous = Some(flow);
        pos = next;
        steps += 1;
        if !lattice.is_interior(pos) {
            break;
        }
    }

    steps
}

/// Stamp a filled circle of river tiles for every segment.
///
/// Tiles carry the segment's flow direction; cells off the map are skipped.
pub fn paint_river(base: &mut Tilemap<u8>, primary: &TileIndex, segments: &[RiverSegment]) -> Result<()> {
    let mut designations = [0u8; 9];
    for (slot, &flow) in designations.iter_mut().zip(RiverFlow::ALL.iter()) {
        *slot = base_designation(primary, TileId::River(flow))?;
    }

    for segment in segments {
        let tile = designations[segment.flow.index() as usize];
        for (x, y) in raster::filled_circle(segment.pos, segment.width) {
            if base.in_bounds(x, y) {
                base.set(x as usize, y as usize, tile);
            }
        }
    }
    Ok(())
}
