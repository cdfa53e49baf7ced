use crate::{
    clock::FpsRounding,
    core::{Canvas, Point, Rgba8},
    error::{DriftboxError, DriftboxResult},
};

/// Scene description for one animation run.
///
/// All geometry is in logical pixels; the device pixel ratio only affects
/// the surface's backing resolution.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneConfig {
    pub canvas: Canvas,
    pub fps: u32, // pacing target and offline timestep
    pub count: usize,
    #[serde(default)]
    pub colors: ColorMode,
    #[serde(default = "default_background")]
    pub background: Rgba8,
    #[serde(default = "default_base_color")]
    pub base_color: Rgba8, // palette derivation base
    #[serde(default = "default_overlay")]
    pub overlay: Option<OverlayStyle>,
    #[serde(default)]
    pub seed: Option<u64>, // None samples from entropy
    #[serde(default = "default_scale")]
    pub scale: f64, // initial shared scale
    #[serde(default = "default_dpr")]
    pub device_pixel_ratio: f64,
    #[serde(default)]
    pub fps_rounding: FpsRounding,
}

/// How shape fills are chosen at generation time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Mid-tone pick from the derived palette.
    #[default]
    Palette,
    /// Three independent uniform channel bytes.
    RandomRgb,
}

/// Placement and look of the FPS text overlay.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct OverlayStyle {
    pub origin: Point, // top-left of the text, logical pixels
    pub size_px: f64,
    pub color: Rgba8,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            origin: Point::new(32.0, 32.0),
            size_px: 28.0,
            color: Rgba8::BLACK,
        }
    }
}

fn default_background() -> Rgba8 {
    Rgba8::WHITE
}

fn default_base_color() -> Rgba8 {
    Rgba8::opaque(0xbb, 0x88, 0x11)
}

fn default_overlay() -> Option<OverlayStyle> {
    Some(OverlayStyle::default())
}

fn default_scale() -> f64 {
    1.0
}

fn default_dpr() -> f64 {
    1.0
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::new(800, 450),
            fps: 60,
            count: 10,
            colors: ColorMode::default(),
            background: default_background(),
            base_color: default_base_color(),
            overlay: default_overlay(),
            seed: None,
            scale: default_scale(),
            device_pixel_ratio: default_dpr(),
            fps_rounding: FpsRounding::default(),
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> DriftboxResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(DriftboxError::validation("canvas width/height must be > 0"));
        }
        if self.fps == 0 {
            return Err(DriftboxError::validation("fps must be > 0"));
        }
        if !self.scale.is_finite() || self.scale < 0.0 {
            return Err(DriftboxError::validation("scale must be finite and >= 0"));
        }
        if !self.device_pixel_ratio.is_finite() || self.device_pixel_ratio <= 0.0 {
            return Err(DriftboxError::validation(
                "device_pixel_ratio must be finite and > 0",
            ));
        }
        for (dim, logical) in [
            ("width", self.canvas.width),
            ("height", self.canvas.height),
        ] {
            let physical = (logical as f64 * self.device_pixel_ratio).round();
            if physical > u16::MAX as f64 {
                return Err(DriftboxError::validation(format!(
                    "canvas {dim} exceeds the raster limit at this device_pixel_ratio \
                     ({physical} > {})",
                    u16::MAX
                )));
            }
        }
        if let Some(overlay) = &self.overlay {
            if !overlay.size_px.is_finite() || overlay.size_px <= 0.0 {
                return Err(DriftboxError::validation(
                    "overlay size_px must be finite and > 0",
                ));
            }
            if !overlay.origin.x.is_finite() || !overlay.origin.y.is_finite() {
                return Err(DriftboxError::validation("overlay origin must be finite"));
            }
        }
        Ok(())
    }
}
