//! End-to-end demo sessions: a validated scene config wired to a shape pool,
//! frame driver, and CPU surface.

use rand::{SeedableRng as _, rngs::StdRng};

use crate::{
    driver::{FrameDriver, FrameDriverOpts, Tick},
    error::{DriftboxError, DriftboxResult},
    model::SceneConfig,
    palette::Palette,
    pool::ShapePool,
    runner::{CancelToken, FramePacer, RunStats, run_loop},
    store::ScaleStore,
    surface::FrameRgba,
    surface_cpu::{CpuSurface, CpuSurfaceOpts},
};

/// A scene ready to produce frames, offline or live.
///
/// Construction validates the scene, derives the palette, seeds the RNG, and
/// generates the shape pool, so a built session renders without further
/// fallible setup.
pub struct DemoSession {
    scene: SceneConfig,
    driver: FrameDriver,
    surface: CpuSurface,
    frame_cursor: u64,
}

impl std::fmt::Debug for DemoSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoSession")
            .field("scene", &self.scene)
            .field("frame_cursor", &self.frame_cursor)
            .finish_non_exhaustive()
    }
}

impl DemoSession {
    #[tracing::instrument(skip(scene, font_bytes), fields(count = scene.count, fps = scene.fps))]
    /// Build a session from a scene. `font_bytes` is required whenever the
    /// scene has an fps overlay, since text needs a registered font.
    pub fn new(scene: SceneConfig, font_bytes: Option<Vec<u8>>) -> DriftboxResult<Self> {
        scene.validate()?;
        if scene.overlay.is_some() && font_bytes.is_none() {
            return Err(DriftboxError::validation(
                "scene has an fps overlay but no font was provided",
            ));
        }

        let palette = Palette::derive(scene.base_color);
        let mut rng = match scene.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let pool = ShapePool::generate(
            scene.count,
            f64::from(scene.canvas.width),
            f64::from(scene.canvas.height),
            scene.colors,
            &palette,
            &mut rng,
        )?;

        let scale = ScaleStore::new(scene.scale);
        let driver = FrameDriver::new(
            pool,
            scale,
            FrameDriverOpts {
                background: scene.background,
                overlay: scene.overlay.clone(),
                fps_rounding: scene.fps_rounding,
            },
        );
        let surface = CpuSurface::new(CpuSurfaceOpts {
            width: f64::from(scene.canvas.width),
            height: f64::from(scene.canvas.height),
            device_pixel_ratio: scene.device_pixel_ratio,
            font_bytes,
        })?;

        Ok(Self {
            scene,
            driver,
            surface,
            frame_cursor: 0,
        })
    }

    pub fn scene(&self) -> &SceneConfig {
        &self.scene
    }

    /// Handle for the scale the driver reads at every draw. Writes from any
    /// thread take effect on the next tick.
    pub fn scale_store(&self) -> ScaleStore {
        self.driver.scale_store()
    }

    /// Physical frame extent in pixels.
    pub fn frame_size(&self) -> (u32, u32) {
        self.surface.physical_size()
    }

    /// Change the logical canvas size mid-session.
    pub fn resize(&mut self, width: f64, height: f64) -> DriftboxResult<()> {
        self.surface.resize(width, height)
    }

    #[tracing::instrument(skip(self, sink), fields(frames, fps = self.scene.fps))]
    /// Render `frames` frames offline at fixed timestamps `index / fps`.
    ///
    /// The frame index continues across calls, so repeated invocations extend
    /// one timeline. `sink` receives each rendered frame as straight-alpha
    /// RGBA8 at physical resolution.
    pub fn render_sequence(
        &mut self,
        frames: u64,
        mut sink: impl FnMut(u64, &FrameRgba) -> DriftboxResult<()>,
    ) -> DriftboxResult<RunStats> {
        let step = 1.0 / f64::from(self.scene.fps);
        let mut stats = RunStats::default();
        for _ in 0..frames {
            let index = self.frame_cursor;
            let now = index as f64 * step;
            let tick = self.driver.tick(&mut self.surface, now)?;
            stats.ticks += 1;
            match tick {
                Tick::Rendered { .. } => {
                    stats.rendered += 1;
                    let frame = self.surface.frame()?;
                    sink(index, &frame)?;
                }
                Tick::Deferred => stats.deferred += 1,
            }
            self.frame_cursor += 1;
        }
        Ok(stats)
    }

    #[tracing::instrument(skip(self, cancel, on_tick), fields(fps = self.scene.fps))]
    /// Run the wall-clock frame loop until `cancel` fires.
    ///
    /// Frames are paced to the scene's fps; `on_tick` sees the surface after
    /// every tick and can pull frames with [`CpuSurface::frame`].
    pub fn run_live(
        &mut self,
        cancel: &CancelToken,
        on_tick: impl FnMut(&mut CpuSurface, Tick) -> DriftboxResult<()>,
    ) -> DriftboxResult<RunStats> {
        let mut pacer = FramePacer::new(self.scene.fps);
        run_loop(&mut self.driver, &mut self.surface, &mut pacer, cancel, on_tick)
    }
}
