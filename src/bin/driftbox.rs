use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "driftbox", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a frame sequence as an MP4 or numbered PNGs.
    Render(RenderArgs),
    /// Time a naive Fibonacci run on the current machine.
    Fib(FibArgs),
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Scene config JSON; overrides every other scene flag.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Canvas width in logical pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Canvas height in logical pixels.
    #[arg(long, default_value_t = 450)]
    height: u32,

    /// Number of shapes in the pool.
    #[arg(long, default_value_t = 10)]
    count: usize,

    /// Frame rate: pacing target live, timestep offline.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// RNG seed for a reproducible scene.
    #[arg(long)]
    seed: Option<u64>,

    /// How shape fills are chosen.
    #[arg(long, value_enum, default_value_t = ColorModeChoice::Palette)]
    colors: ColorModeChoice,

    /// Background color as hex (#rgb or #rrggbb).
    #[arg(long)]
    background: Option<String>,

    /// Palette derivation base as hex.
    #[arg(long)]
    base_color: Option<String>,

    /// Drop the fps text overlay.
    #[arg(long)]
    no_overlay: bool,

    /// TTF/OTF font file for the overlay text.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Device pixel ratio of the backing store.
    #[arg(long, default_value_t = 1.0)]
    device_pixel_ratio: f64,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Frame index (0-based) to write.
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Number of frames to render.
    #[arg(long, default_value_t = 300)]
    frames: u64,

    /// Output MP4 path (requires `ffmpeg` on PATH).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write numbered PNGs into this directory instead of an MP4.
    #[arg(long)]
    png_dir: Option<PathBuf>,

    /// Linearly ramp the shared scale to this value over the run.
    #[arg(long)]
    scale_ramp: Option<f64>,
}

#[derive(Parser, Debug)]
struct FibArgs {
    /// Recursion depth.
    #[arg(long, default_value_t = 40)]
    n: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ColorModeChoice {
    Palette,
    RandomRgb,
}

impl From<ColorModeChoice> for driftbox::ColorMode {
    fn from(choice: ColorModeChoice) -> Self {
        match choice {
            ColorModeChoice::Palette => driftbox::ColorMode::Palette,
            ColorModeChoice::RandomRgb => driftbox::ColorMode::RandomRgb,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Fib(args) => cmd_fib(args),
    }
}

fn load_scene_config(path: &Path) -> anyhow::Result<driftbox::SceneConfig> {
    let f = File::open(path).with_context(|| format!("open scene config '{}'", path.display()))?;
    let r = BufReader::new(f);
    let scene: driftbox::SceneConfig =
        serde_json::from_reader(r).with_context(|| "parse scene JSON")?;
    Ok(scene)
}

impl SceneArgs {
    fn scene(&self) -> anyhow::Result<driftbox::SceneConfig> {
        if let Some(path) = &self.config {
            return load_scene_config(path);
        }

        let mut scene = driftbox::SceneConfig {
            canvas: driftbox::Canvas::new(self.width, self.height),
            fps: self.fps,
            count: self.count,
            colors: self.colors.into(),
            seed: self.seed,
            device_pixel_ratio: self.device_pixel_ratio,
            ..driftbox::SceneConfig::default()
        };
        if let Some(hex) = &self.background {
            scene.background = driftbox::Rgba8::from_hex(hex)?;
        }
        if let Some(hex) = &self.base_color {
            scene.base_color = driftbox::Rgba8::from_hex(hex)?;
        }
        if self.no_overlay {
            scene.overlay = None;
        }
        Ok(scene)
    }

    fn font_bytes(&self) -> anyhow::Result<Option<Vec<u8>>> {
        match &self.font {
            Some(path) => {
                let bytes =
                    std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
                Ok(Some(bytes))
            }
            None => Ok(None),
        }
    }
}

fn write_png(path: &Path, frame: &driftbox::FrameRgba) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = args.scene.scene()?;
    let font_bytes = args.scene.font_bytes()?;
    let mut session = driftbox::DemoSession::new(scene, font_bytes)?;

    let mut wanted: Option<driftbox::FrameRgba> = None;
    session.render_sequence(args.frame + 1, |index, frame| {
        if index == args.frame {
            wanted = Some(frame.clone());
        }
        Ok(())
    })?;
    let frame = wanted.context("no frame rendered")?;

    write_png(&args.out, &frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let scene = args.scene.scene()?;
    let font_bytes = args.scene.font_bytes()?;
    let scale_start = scene.scale;
    let fps = scene.fps;
    let bg = scene.background.to_array();

    let mut session = driftbox::DemoSession::new(scene, font_bytes)?;
    let store = session.scale_store();
    let (width, height) = session.frame_size();

    let ramp_at = |index: u64| -> Option<f64> {
        let end = args.scale_ramp?;
        let t = if args.frames <= 1 {
            1.0
        } else {
            index as f64 / (args.frames - 1) as f64
        };
        Some(scale_start + (end - scale_start) * t)
    };

    match (&args.out, &args.png_dir) {
        (Some(out), None) => {
            let cfg = driftbox::default_mp4_config(out, width, height, fps);
            let mut encoder = driftbox::FfmpegEncoder::new(cfg, bg)?;
            for index in 0..args.frames {
                if let Some(scale) = ramp_at(index) {
                    store.set(scale);
                }
                session.render_sequence(1, |_, frame| encoder.encode_frame(frame))?;
            }
            encoder.finish()?;
            eprintln!("wrote {}", out.display());
        }
        (None, Some(dir)) => {
            for index in 0..args.frames {
                if let Some(scale) = ramp_at(index) {
                    store.set(scale);
                }
                session.render_sequence(1, |i, frame| {
                    let path = dir.join(format!("frame_{i:05}.png"));
                    write_png(&path, frame)
                        .map_err(driftbox::DriftboxError::from)
                })?;
            }
            eprintln!("wrote {} frames to {}", args.frames, dir.display());
        }
        _ => anyhow::bail!("choose exactly one output: --out <mp4> or --png-dir <dir>"),
    }
    Ok(())
}

fn cmd_fib(args: FibArgs) -> anyhow::Result<()> {
    let report = driftbox::run_fib(args.n);
    println!("{report}");
    Ok(())
}
