//! Driftbox animates a pool of randomized rectangles drifting across a CPU
//! raster surface, with a live fps readout drawn over every frame.
//!
//! The public API is session-oriented:
//!
//! - Describe a scene with a [`SceneConfig`]
//! - Build a [`DemoSession`]
//! - Render fixed-timestep frames with [`DemoSession::render_sequence`], or
//!   pace a wall-clock loop with [`DemoSession::run_live`]
#![forbid(unsafe_code)]

pub mod clock;
pub mod core;
pub mod driver;
pub mod encode_ffmpeg;
pub mod error;
pub mod fib;
pub mod model;
pub mod palette;
pub mod pool;
pub mod runner;
pub mod session;
pub mod store;
pub mod surface;
pub mod surface_cpu;

pub use crate::core::{Affine, Canvas, Point, Rect, Rgba8, Vec2};
pub use crate::error::{DriftboxError, DriftboxResult};

pub use crate::clock::{FpsRounding, FrameClock};
pub use crate::driver::{FrameDriver, FrameDriverOpts, Tick};
pub use crate::encode_ffmpeg::{
    EncodeConfig, FfmpegEncoder, default_mp4_config, is_ffmpeg_on_path,
};
pub use crate::fib::{FibReport, fib, run_fib};
pub use crate::model::{ColorMode, OverlayStyle, SceneConfig};
pub use crate::palette::{HueFamily, Palette};
pub use crate::pool::{Shape, ShapePool};
pub use crate::runner::{CancelToken, FramePacer, RunStats, run_loop};
pub use crate::session::DemoSession;
pub use crate::store::ScaleStore;
pub use crate::surface::{FrameRgba, Surface, TextStyle};
pub use crate::surface_cpu::{CpuSurface, CpuSurfaceOpts};
