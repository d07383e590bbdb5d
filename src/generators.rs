//! Value generators: deterministic `(x, y) -> f64` functions that painters
//! can mix and match.

use std::f64::consts::TAU;

use noise::{NoiseFn, Perlin};

use crate::config::NoiseParams;
use crate::error::{Result, WorldError};

/// A consistent value for every position.
pub trait Generator: Send + Sync {
    fn value(&self, x: f64, y: f64) -> f64;
}

/// Linearly map `value` from `[old_min, old_max]` onto `[new_min, new_max]`.
///
/// A degenerate input range maps everything to `new_min`.
pub fn range_convert(old_min: f64, old_max: f64, new_min: f64, new_max: f64, value: f64) -> f64 {
    let old_span = old_max - old_min;
    if old_span == 0.0 {
        return new_min;
    }
    (value - old_min) * (new_max - new_min) / old_span + new_min
}

/// Fractal Perlin noise that repeats seamlessly over a fixed extent.
///
/// Each axis is wrapped onto a circle whose circumference is the extent, and
/// the two circles are sampled as one 4D point, so `(x, y)` and
/// `(x + extent_x, y)` give the same value. Output is normalized by the total
/// octave amplitude and stays roughly inside `[-1, 1]`.
#[derive(Clone, Debug)]
pub struct CoherentNoise {
    perlin: Perlin,
    params: NoiseParams,
    extent: (f64, f64),
}

impl CoherentNoise {
    /// `extent` is the repeat period in cells on each axis.
    pub fn new(params: NoiseParams, extent: (usize, usize)) -> Self {
        Self {
            perlin: Perlin::new(params.base),
            params,
            extent: (extent.0.max(1) as f64, extent.1.max(1) as f64),
        }
    }

    /// Position on the torus for one octave's frequency.
    fn torus_point(&self, x: f64, y: f64, frequency: f64) -> [f64; 4] {
        let (ex, ey) = self.extent;
        let rx = ex / (TAU * self.params.scale) * frequency;
        let ry = ey / (TAU * self.params.scale) * frequency;
        let a = TAU * x / ex;
        let b = TAU * y / ey;
        [a.cos() * rx, a.sin() * rx, b.cos() * ry, b.sin() * ry]
    }
}

impl Generator for CoherentNoise {
    fn value(&self, x: f64, y: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..self.params.octaves {
            total += amplitude * self.perlin.get(self.torus_point(x, y, frequency));
            max_value += amplitude;
            amplitude *= self.params.persistence;
            frequency *= self.params.lacunarity;
        }

        if max_value == 0.0 {
            return 0.0;
        }
        total / max_value
    }
}

/// A bump centered on a point, fading linearly out to `radius`.
#[derive(Clone, Debug)]
pub struct RadialFalloff {
    pub center: (f64, f64),
    pub radius: f64,
    /// Value at the center
    pub center_value: f64,
    /// Value at the radius and beyond
    pub far_value: f64,
}

impl RadialFalloff {
    pub fn new(center: (f64, f64), radius: f64) -> Self {
        Self {
            center,
            radius,
            center_value: 1.0,
            far_value: -1.0,
        }
    }

    pub fn with_range(mut self, center_value: f64, far_value: f64) -> Self {
        self.center_value = center_value;
        self.far_value = far_value;
        self
    }
}

impl Generator for RadialFalloff {
    fn value(&self, x: f64, y: f64) -> f64 {
        let dist = (self.center.0 - x).hypot(self.center.1 - y).min(self.radius);
        range_convert(0.0, self.radius, self.center_value, self.far_value, dist)
    }
}

/// A linear gradient along a direction, constant on every line
/// perpendicular to it (like a paint program's gradient tool).
///
/// The value depends on the absolute distance along the direction from the
/// origin, mapped from `x_range` onto `val_range`.
#[derive(Clone, Debug)]
pub struct PerpendicularGradient {
    rise: f64,
    run: f64,
    x_range: (f64, f64),
    val_range: (f64, f64),
}

impl PerpendicularGradient {
    pub fn new(rise: f64, run: f64, x_range: (f64, f64)) -> Result<Self> {
        if !(rise.is_finite() && run.is_finite()) || (rise == 0.0 && run == 0.0) {
            return Err(WorldError::InvalidConfig(format!(
                "gradient direction ({}, {}) has no length",
                run, rise
            )));
        }
        Ok(Self {
            rise,
            run,
            x_range,
            val_range: (-1.0, 1.0),
        })
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.val_range = (min, max);
        self
    }
}

impl Generator for PerpendicularGradient {
    fn value(&self, x: f64, y: f64) -> f64 {
        // x coordinate where the perpendicular through (x, y) meets the line
        let along = (x * self.run + y * self.rise) * self.run / (self.run * self.run + self.rise * self.rise);
        let (min_x, max_x) = self.x_range;
        let (min_val, max_val) = self.val_range;
        range_convert(min_x, max_x, min_val, max_val, along.abs())
    }
}
