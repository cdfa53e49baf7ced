use crate::{
    core::Rgba8,
    error::{DriftboxError, DriftboxResult},
    model::ColorMode,
    palette::Palette,
};

/// One animated rectangle.
///
/// Position/size are logical pixels. Only `x` changes after generation, and
/// only inside [`ShapePool::update`]; everything else is fixed for the
/// lifetime of the pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shape {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub speed: f64, // oscillation amplitude, logical px/s
    pub phase: f64, // radians
    pub fill: Rgba8,
}

/// Fixed-size collection of drifting shapes. Shapes are never added or
/// removed individually; a new pool is generated instead.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapePool {
    shapes: Vec<Shape>,
}

impl ShapePool {
    /// Builds a pool from explicit shapes, bypassing sampling.
    pub fn from_shapes(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }

    /// Samples `count` shapes uniformly inside the bounds.
    ///
    /// Per shape: position uniform in `[0, w) x [0, h)`, each side
    /// `bounds_width / 16` at most, oscillation amplitude up to half the
    /// width, phase uniform in one turn, fill per the color mode. A seeded
    /// `rng` reproduces the pool exactly; `count = 0` yields an empty pool.
    pub fn generate<R: rand::Rng + ?Sized>(
        count: usize,
        bounds_width: f64,
        bounds_height: f64,
        colors: ColorMode,
        palette: &Palette,
        rng: &mut R,
    ) -> DriftboxResult<Self> {
        if !bounds_width.is_finite()
            || !bounds_height.is_finite()
            || bounds_width <= 0.0
            || bounds_height <= 0.0
        {
            return Err(DriftboxError::validation(format!(
                "pool bounds must be finite and > 0, got {bounds_width}x{bounds_height}"
            )));
        }

        let mut shapes = Vec::with_capacity(count);
        for _ in 0..count {
            let fill = match colors {
                ColorMode::Palette => palette.sample(rng),
                ColorMode::RandomRgb => Rgba8::opaque(
                    rng.gen_range(0..=255),
                    rng.gen_range(0..=255),
                    rng.gen_range(0..=255),
                ),
            };
            shapes.push(Shape {
                x: bounds_width * rng.gen_range(0.0..1.0),
                y: bounds_height * rng.gen_range(0.0..1.0),
                w: bounds_width * rng.gen_range(0.0..1.0) / 16.0,
                h: bounds_width * rng.gen_range(0.0..1.0) / 16.0,
                speed: 0.5 * bounds_width * rng.gen_range(0.0..1.0),
                phase: std::f64::consts::TAU * rng.gen_range(0.0..1.0),
                fill,
            });
        }

        Ok(Self { shapes })
    }

    /// Forward-Euler step of the per-shape sinusoidal horizontal drift:
    /// `x += speed * sin(now + phase) * elapsed`.
    ///
    /// Shapes may leave the bounds; nothing wraps, bounces, or clamps. `y`
    /// is never touched.
    pub fn update(&mut self, now: f64, elapsed: f64) {
        for shape in &mut self.shapes {
            shape.x += shape.speed * (now + shape.phase).sin() * elapsed;
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
