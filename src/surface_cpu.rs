//! CPU raster surface backed by `vello_cpu`.
//!
//! [`CpuSurface`] draws in logical coordinates and owns a physical backing
//! pixmap sized `round(logical * device_pixel_ratio)`. The ratio is applied
//! exactly once, as a transform baked into every draw call, so callers never
//! multiply it in themselves.

use crate::{
    core::{Affine, Point, Rect, Rgba8},
    error::{DriftboxError, DriftboxResult},
    surface::{FrameRgba, Surface, TextStyle},
};

/// Construction options for [`CpuSurface`].
#[derive(Clone, Debug)]
pub struct CpuSurfaceOpts {
    pub width: f64,                  // logical width in px
    pub height: f64,                 // logical height in px
    pub device_pixel_ratio: f64,     // physical pixels per logical pixel
    pub font_bytes: Option<Vec<u8>>, // TTF/OTF bytes for text drawing
}

impl Default for CpuSurfaceOpts {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 450.0,
            device_pixel_ratio: 1.0,
            font_bytes: None,
        }
    }
}

/// Software surface rendering into a `vello_cpu` pixmap.
///
/// Draw calls accumulate in the render context; [`CpuSurface::frame`]
/// rasterizes them and reads the result back as straight-alpha RGBA8.
pub struct CpuSurface {
    logical: (f64, f64),
    dpr: f64,
    physical: (u16, u16),
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    text: Option<TextEngine>,
}

impl CpuSurface {
    pub fn new(opts: CpuSurfaceOpts) -> DriftboxResult<Self> {
        let dpr = opts.device_pixel_ratio;
        if !dpr.is_finite() || dpr <= 0.0 {
            return Err(DriftboxError::validation(
                "device_pixel_ratio must be finite and > 0",
            ));
        }
        let text = match &opts.font_bytes {
            Some(bytes) => Some(TextEngine::new(bytes)?),
            None => None,
        };
        let mut surface = Self {
            logical: (0.0, 0.0),
            dpr,
            physical: (0, 0),
            ctx: vello_cpu::RenderContext::new(1, 1),
            pixmap: vello_cpu::Pixmap::new(1, 1),
            text,
        };
        surface.resize(opts.width, opts.height)?;
        Ok(surface)
    }

    /// Device pixel ratio fixed at construction.
    pub fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }

    /// Backing store extent in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        (u32::from(self.physical.0), u32::from(self.physical.1))
    }

    /// Set the logical size, reallocating the backing store when the physical
    /// extent changes. Resizing to the current size is a no-op and keeps any
    /// unflushed draw commands.
    pub fn resize(&mut self, width: f64, height: f64) -> DriftboxResult<()> {
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(DriftboxError::validation(
                "surface size must be finite and >= 0",
            ));
        }
        let physical = (
            physical_extent(width, self.dpr),
            physical_extent(height, self.dpr),
        );
        if (width, height) == self.logical && physical == self.physical {
            return Ok(());
        }
        self.logical = (width, height);
        self.physical = physical;
        // Targets are at least 1x1 so draws issued before the surface has a
        // real size land in scratch instead of panicking.
        let w = physical.0.max(1);
        let h = physical.1.max(1);
        self.ctx = vello_cpu::RenderContext::new(w, h);
        self.pixmap = vello_cpu::Pixmap::new(w, h);
        tracing::debug!(
            width,
            height,
            physical_width = physical.0,
            physical_height = physical.1,
            "surface resized"
        );
        Ok(())
    }

    /// Rasterize everything drawn since the last [`Surface::clear`] and read
    /// the frame back as straight-alpha RGBA8 at physical resolution.
    pub fn frame(&mut self) -> DriftboxResult<FrameRgba> {
        let (pw, ph) = self.physical;
        if pw == 0 || ph == 0 {
            return Err(DriftboxError::surface(
                "frame requested before the surface has a size",
            ));
        }
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);

        let mut data = self.pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8(&mut data);
        Ok(FrameRgba {
            width: u32::from(pw),
            height: u32::from(ph),
            data,
        })
    }
}

impl Surface for CpuSurface {
    fn logical_size(&self) -> (f64, f64) {
        self.logical
    }

    fn clear(&mut self, color: Rgba8) {
        self.ctx.reset();
        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(Affine::scale(self.dpr)));
        self.ctx.set_paint(color_to_cpu(color));
        let (w, h) = self.logical;
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.ctx.set_transform(affine_to_cpu(Affine::scale(self.dpr)));
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    fn draw_text(&mut self, text: &str, origin: Point, style: TextStyle) -> DriftboxResult<()> {
        let Some(engine) = self.text.as_mut() else {
            return Err(DriftboxError::surface(
                "no font registered; text drawing is unavailable",
            ));
        };
        let layout = engine.layout(text, style)?;

        let tr = Affine::scale(self.dpr) * Affine::translate((origin.x, origin.y));
        self.ctx.set_transform(affine_to_cpu(tr));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&engine.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn supports_text(&self) -> bool {
        self.text.is_some()
    }
}

/// RGBA8 brush color carried through Parley layout styles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct GlyphBrush {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

/// Parley contexts plus the font registered at surface construction.
struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<GlyphBrush>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl TextEngine {
    fn new(font_bytes: &[u8]) -> DriftboxResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            DriftboxError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| DriftboxError::validation("registered font family has no name"))?
            .to_string();
        let font =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes.to_vec()), 0);
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
        })
    }

    fn layout(&mut self, text: &str, style: TextStyle) -> DriftboxResult<parley::Layout<GlyphBrush>> {
        if !style.size_px.is_finite() || style.size_px <= 0.0 {
            return Err(DriftboxError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let brush = GlyphBrush {
            r: style.color.r,
            g: style.color.g,
            b: style.color.b,
            a: style.color.a,
        };

        let family = self.family_name.clone();
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px as f32));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<GlyphBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

fn physical_extent(logical: f64, dpr: f64) -> u16 {
    // vello_cpu targets are u16-addressed.
    (logical * dpr).round().clamp(0.0, f64::from(u16::MAX)) as u16
}

fn unpremultiply_rgba8(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = px[3];
        match a {
            0 => {
                px[0] = 0;
                px[1] = 0;
                px[2] = 0;
            }
            255 => {}
            _ => {
                let a16 = u16::from(a);
                for c in &mut px[..3] {
                    let v = u16::from(*c) * 255 + a16 / 2;
                    *c = (v / a16).min(255) as u8;
                }
            }
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}
