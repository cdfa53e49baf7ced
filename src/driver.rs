use crate::{
    clock::{FpsRounding, FrameClock},
    core::{Rect, Rgba8},
    error::DriftboxResult,
    model::OverlayStyle,
    pool::{Shape, ShapePool},
    store::ScaleStore,
    surface::{Surface, TextStyle},
};

/// Driver lifecycle: waiting for a usable surface, then running until the
/// caller stops ticking.
#[derive(Clone, Debug)]
enum DriverState {
    WaitingForSurface,
    Running(FrameClock),
}

/// Outcome of one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tick {
    /// The surface reported a zero dimension; nothing was drawn. Retried on
    /// the next tick, indefinitely.
    Deferred,
    /// A full update/draw pass ran.
    Rendered { elapsed: f64, fps: f64 },
}

/// Presentation knobs for a [`FrameDriver`].
#[derive(Clone, Debug)]
pub struct FrameDriverOpts {
    pub background: Rgba8,
    pub overlay: Option<OverlayStyle>,
    pub fps_rounding: FpsRounding,
}

impl Default for FrameDriverOpts {
    fn default() -> Self {
        Self {
            background: Rgba8::WHITE,
            overlay: Some(OverlayStyle::default()),
            fps_rounding: FpsRounding::default(),
        }
    }
}

/// Per-tick update/draw orchestrator over a [`Surface`].
///
/// Owns the shape pool and clock and holds a handle to the shared scale
/// store; pacing and cancellation around it live in [`crate::runner`].
pub struct FrameDriver {
    pool: ShapePool,
    state: DriverState,
    scale: ScaleStore,
    background: Rgba8,
    overlay: Option<OverlayStyle>,
    fps_rounding: FpsRounding,
}

impl FrameDriver {
    pub fn new(pool: ShapePool, scale: ScaleStore, opts: FrameDriverOpts) -> Self {
        Self {
            pool,
            state: DriverState::WaitingForSurface,
            scale,
            background: opts.background,
            overlay: opts.overlay,
            fps_rounding: opts.fps_rounding,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, DriverState::Running(_))
    }

    pub fn pool(&self) -> &ShapePool {
        &self.pool
    }

    pub fn scale_store(&self) -> ScaleStore {
        self.scale.clone()
    }

    pub fn overlay(&self) -> Option<&OverlayStyle> {
        self.overlay.as_ref()
    }

    /// Latest FPS sample; `0.0` while waiting or before the first window
    /// closes.
    pub fn fps(&self) -> f64 {
        match &self.state {
            DriverState::Running(clock) => clock.fps(),
            DriverState::WaitingForSurface => 0.0,
        }
    }

    /// Runs one tick at `now` seconds.
    ///
    /// While the surface reports a zero dimension the driver defers. The
    /// first sized tick starts the clock, so its elapsed time is zero and it
    /// opens the FPS window without being counted; every tick after it
    /// counts toward the window. Each running tick advances the pool,
    /// clears, fills every shape scaled about its center by the shared
    /// scale, and draws the FPS label when an overlay is configured.
    pub fn tick(&mut self, surface: &mut dyn Surface, now: f64) -> DriftboxResult<Tick> {
        let (width, height) = surface.logical_size();
        if width <= 0.0 || height <= 0.0 {
            return Ok(Tick::Deferred);
        }

        let starting = matches!(self.state, DriverState::WaitingForSurface);
        if starting {
            tracing::debug!(width, height, now, "surface ready, frame loop starting");
            self.state = DriverState::Running(FrameClock::new(now, self.fps_rounding));
        }
        let DriverState::Running(clock) = &mut self.state else {
            return Ok(Tick::Deferred);
        };

        let elapsed = clock.begin_tick(now);
        self.pool.update(now, elapsed);
        if !starting {
            // The starting tick is the window boundary, not a frame in it.
            clock.count_frame(now);
        }
        let fps = clock.fps();
        let label = clock.fps_label();

        surface.clear(self.background);

        let scale = self.scale.get();
        for shape in self.pool.shapes() {
            surface.fill_rect(scaled_rect(shape, scale), shape.fill);
        }

        if let Some(overlay) = &self.overlay {
            surface.draw_text(
                &label,
                overlay.origin,
                TextStyle {
                    size_px: overlay.size_px,
                    color: overlay.color,
                },
            )?;
        }

        Ok(Tick::Rendered { elapsed, fps })
    }
}

/// Rect for a shape drawn at `scale`, centered on the shape's `(x, y)`:
/// top-left `(x - scale*w/2, y - scale*h/2)`, size `(scale*w, scale*h)`.
fn scaled_rect(shape: &Shape, scale: f64) -> Rect {
    let w = scale * shape.w;
    let h = scale * shape.h;
    let x0 = shape.x - 0.5 * w;
    let y0 = shape.y - 0.5 * h;
    Rect::new(x0, y0, x0 + w, y0 + h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point;

    #[derive(Debug, PartialEq)]
    enum Op {
        Clear(Rgba8),
        Fill(Rect, Rgba8),
        Text(String, Point),
    }

    /// Surface double that records every call in order.
    struct RecordingSurface {
        size: (f64, f64),
        ops: Vec<Op>,
    }

    impl RecordingSurface {
        fn sized(width: f64, height: f64) -> Self {
            Self {
                size: (width, height),
                ops: Vec::new(),
            }
        }
    }

    impl Surface for RecordingSurface {
        fn logical_size(&self) -> (f64, f64) {
            self.size
        }

        fn clear(&mut self, color: Rgba8) {
            self.ops.push(Op::Clear(color));
        }

        fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
            self.ops.push(Op::Fill(rect, color));
        }

        fn draw_text(
            &mut self,
            text: &str,
            origin: Point,
            _style: TextStyle,
        ) -> DriftboxResult<()> {
            self.ops.push(Op::Text(text.to_string(), origin));
            Ok(())
        }

        fn supports_text(&self) -> bool {
            true
        }
    }

    fn shape_at(x: f64, y: f64, w: f64, h: f64) -> Shape {
        Shape {
            x,
            y,
            w,
            h,
            speed: 0.0,
            phase: 0.0,
            fill: Rgba8::opaque(10, 20, 30),
        }
    }

    fn driver_with(shapes: Vec<Shape>, scale: ScaleStore) -> FrameDriver {
        FrameDriver::new(
            ShapePool::from_shapes(shapes),
            scale,
            FrameDriverOpts::default(),
        )
    }

    #[test]
    fn defers_until_the_surface_has_size() {
        let mut driver = driver_with(vec![shape_at(1.0, 1.0, 1.0, 1.0)], ScaleStore::default());
        let mut surface = RecordingSurface::sized(0.0, 0.0);

        assert_eq!(driver.tick(&mut surface, 0.0).unwrap(), Tick::Deferred);
        assert_eq!(driver.tick(&mut surface, 0.1).unwrap(), Tick::Deferred);
        assert!(!driver.is_running());
        assert!(surface.ops.is_empty());

        surface.size = (800.0, 450.0);
        let tick = driver.tick(&mut surface, 0.2).unwrap();
        assert!(matches!(tick, Tick::Rendered { .. }));
        assert!(driver.is_running());
    }

    #[test]
    fn first_running_tick_has_zero_elapsed() {
        let mut driver = driver_with(vec![shape_at(10.0, 20.0, 4.0, 4.0)], ScaleStore::default());
        let mut surface = RecordingSurface::sized(800.0, 450.0);

        let Tick::Rendered { elapsed, fps } = driver.tick(&mut surface, 5.0).unwrap() else {
            panic!("expected a rendered tick");
        };
        assert_eq!(elapsed, 0.0);
        assert_eq!(fps, 0.0);
        // Zero elapsed leaves the shape where it was generated.
        assert!(
            surface
                .ops
                .contains(&Op::Fill(Rect::new(8.0, 18.0, 12.0, 22.0), Rgba8::opaque(10, 20, 30)))
        );
    }

    #[test]
    fn tick_clears_then_fills_then_draws_text() {
        let shapes = vec![shape_at(10.0, 10.0, 2.0, 2.0), shape_at(50.0, 50.0, 2.0, 2.0)];
        let mut driver = driver_with(shapes, ScaleStore::default());
        let mut surface = RecordingSurface::sized(800.0, 450.0);

        driver.tick(&mut surface, 0.0).unwrap();

        assert_eq!(surface.ops.len(), 4);
        assert_eq!(surface.ops[0], Op::Clear(Rgba8::WHITE));
        assert!(matches!(surface.ops[1], Op::Fill(..)));
        assert!(matches!(surface.ops[2], Op::Fill(..)));
        assert!(matches!(surface.ops[3], Op::Text(..)));
    }

    #[test]
    fn update_runs_before_draw_within_a_tick() {
        let shape = Shape {
            x: 10.0,
            y: 20.0,
            w: 4.0,
            h: 6.0,
            speed: 2.0,
            phase: 0.5,
            fill: Rgba8::BLACK,
        };
        let mut driver = driver_with(vec![shape], ScaleStore::default());
        let mut surface = RecordingSurface::sized(800.0, 450.0);

        driver.tick(&mut surface, 1.0).unwrap();
        surface.ops.clear();
        driver.tick(&mut surface, 1.016).unwrap();

        let x = 10.0 + 2.0 * (1.016f64 + 0.5).sin() * 0.016;
        let expected = Rect::new(x - 2.0, 17.0, x + 2.0, 23.0);
        let Some(Op::Fill(rect, _)) = surface.ops.iter().find(|op| matches!(op, Op::Fill(..)))
        else {
            panic!("expected a fill");
        };
        assert!((rect.x0 - expected.x0).abs() < 1e-12);
        assert!((rect.x1 - expected.x1).abs() < 1e-12);
        assert_eq!(rect.y0, expected.y0);
        assert_eq!(rect.y1, expected.y1);
    }

    #[test]
    fn shared_scale_centers_the_drawn_rect() {
        let scale = ScaleStore::new(1.0);
        let mut driver = driver_with(vec![shape_at(100.0, 50.0, 20.0, 10.0)], scale.clone());
        let mut surface = RecordingSurface::sized(800.0, 450.0);

        driver.tick(&mut surface, 0.0).unwrap();
        assert!(surface.ops.contains(&Op::Fill(
            Rect::new(90.0, 45.0, 110.0, 55.0),
            Rgba8::opaque(10, 20, 30)
        )));

        surface.ops.clear();
        scale.set(2.0);
        driver.tick(&mut surface, 0.0).unwrap();
        assert!(surface.ops.contains(&Op::Fill(
            Rect::new(80.0, 40.0, 120.0, 60.0),
            Rgba8::opaque(10, 20, 30)
        )));

        surface.ops.clear();
        scale.set(0.0);
        driver.tick(&mut surface, 0.0).unwrap();
        assert!(surface.ops.contains(&Op::Fill(
            Rect::new(100.0, 50.0, 100.0, 50.0),
            Rgba8::opaque(10, 20, 30)
        )));
    }

    #[test]
    fn first_window_at_sixty_hz_samples_sixty() {
        let mut driver = driver_with(vec![], ScaleStore::default());
        let mut surface = RecordingSurface::sized(640.0, 360.0);

        // Tick 0 opens the window without counting; ticks 1..=60 stay inside
        // it, and tick 61 closes it with 61 frames over 61/60 s.
        for i in 0..=60u32 {
            driver.tick(&mut surface, f64::from(i) / 60.0).unwrap();
            assert_eq!(driver.fps(), 0.0, "window must not close early");
        }
        let Tick::Rendered { fps, .. } = driver.tick(&mut surface, 61.0 / 60.0).unwrap() else {
            panic!("expected a rendered tick");
        };
        assert_eq!(fps, 60.0);
    }

    #[test]
    fn overlay_label_tracks_the_sampled_fps() {
        let mut driver = driver_with(vec![], ScaleStore::default());
        let mut surface = RecordingSurface::sized(800.0, 450.0);

        let mut last_fps = 0.0;
        for i in 0..=70u32 {
            if let Tick::Rendered { fps, .. } = driver.tick(&mut surface, i as f64 / 60.0).unwrap()
            {
                last_fps = fps;
            }
        }
        assert!(last_fps > 0.0, "one-second window should have closed");

        let Some(Op::Text(label, origin)) = surface
            .ops
            .iter()
            .rev()
            .find(|op| matches!(op, Op::Text(..)))
        else {
            panic!("expected an overlay draw");
        };
        assert_eq!(label, &FpsRounding::HalfUp.label(last_fps));
        assert_eq!(*origin, Point::new(32.0, 32.0));
    }

    #[test]
    fn no_overlay_means_no_text() {
        let opts = FrameDriverOpts {
            overlay: None,
            ..FrameDriverOpts::default()
        };
        let mut driver = FrameDriver::new(
            ShapePool::from_shapes(vec![shape_at(5.0, 5.0, 2.0, 2.0)]),
            ScaleStore::default(),
            opts,
        );
        let mut surface = RecordingSurface::sized(100.0, 100.0);

        driver.tick(&mut surface, 0.0).unwrap();
        assert!(!surface.ops.iter().any(|op| matches!(op, Op::Text(..))));
    }

    #[test]
    fn empty_pool_still_clears_and_overlays() {
        let mut driver = driver_with(vec![], ScaleStore::default());
        let mut surface = RecordingSurface::sized(100.0, 100.0);

        driver.tick(&mut surface, 0.0).unwrap();
        assert_eq!(surface.ops.len(), 2);
        assert!(matches!(surface.ops[0], Op::Clear(_)));
        assert!(matches!(surface.ops[1], Op::Text(..)));
    }
}
