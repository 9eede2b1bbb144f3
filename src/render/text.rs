use std::path::Path;

use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{OverlayError, OverlayResult};

/// Size of a laid out single-line label in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextExtent {
    /// Advance width.
    pub width: f64,
    /// Line height.
    pub height: f64,
}

/// Measures and paints single-line labels.
///
/// `origin` is the top-left corner of the label's line box.
pub trait TextPainter {
    /// Lay out `text` at `size_px` and return its extent.
    fn measure(&mut self, text: &str, size_px: f32) -> OverlayResult<TextExtent>;

    /// Paint `text` with its line box anchored at `origin`.
    fn paint(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        size_px: f32,
        origin: Point,
        color: Rgba8,
    ) -> OverlayResult<()>;
}

/// [`TextPainter`] shaping with Parley from a single font file.
pub struct FontTextPainter {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    family: String,
    font: vello_cpu::peniko::FontData,
}

impl FontTextPainter {
    /// Load a TrueType/OpenType font from disk.
    pub fn from_path(path: impl AsRef<Path>) -> OverlayResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            OverlayError::render(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Self::from_bytes(bytes)
    }

    /// Register font bytes. Fails when the bytes contain no usable font family.
    pub fn from_bytes(bytes: Vec<u8>) -> OverlayResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| OverlayError::render("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| OverlayError::render("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
        })
    }

    /// Family name of the registered font.
    pub fn family(&self) -> &str {
        &self.family
    }

    fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        brush: Rgba8,
    ) -> OverlayResult<parley::Layout<Rgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(OverlayError::render("font size must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

impl TextPainter for FontTextPainter {
    fn measure(&mut self, text: &str, size_px: f32) -> OverlayResult<TextExtent> {
        let layout = self.layout(text, size_px, Rgba8::default())?;
        Ok(TextExtent {
            width: f64::from(layout.width()),
            height: f64::from(layout.height()),
        })
    }

    fn paint(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        size_px: f32,
        origin: Point,
        color: Rgba8,
    ) -> OverlayResult<()> {
        let layout = self.layout(text, size_px, color)?;
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                ctx.set_paint(run.style().brush.to_cpu());
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
pub(crate) mod tests;
