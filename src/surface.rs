use crate::core::{Point, Rect, Rgba8};
use crate::error::DriftboxResult;

/// Text look for [`Surface::draw_text`]; the font face itself belongs to
/// the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub size_px: f64,
    pub color: Rgba8,
}

/// One rendered frame as straight-alpha RGBA8 rows, top to bottom, at the
/// surface's backing (physical) resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Drawing surface consumed by the frame driver.
///
/// All coordinates are logical pixels. Implementations apply any backing
/// device-pixel-ratio scale once at construction or resize, never per call.
pub trait Surface {
    /// Current logical size. Either dimension at zero means "not ready
    /// yet"; the driver defers and retries on the next tick.
    fn logical_size(&self) -> (f64, f64);

    /// Begins a frame by clearing the whole surface to one color.
    fn clear(&mut self, color: Rgba8);

    fn fill_rect(&mut self, rect: Rect, color: Rgba8);

    /// Draws one line of text with its top-left corner at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, style: TextStyle) -> DriftboxResult<()>;

    /// Whether [`Surface::draw_text`] can succeed (a font face is loaded).
    fn supports_text(&self) -> bool;
}
