use std::sync::{Arc, Mutex};

use super::*;
use crate::foundation::core::Canvas;
use crate::render::backend::CpuRaster;

/// One `paint` call captured by [`BlockTextPainter`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PaintedText {
    pub(crate) text: String,
    pub(crate) size_px: f32,
    pub(crate) origin: Point,
}

/// Font-free painter: every glyph is a solid block `0.6 * size` wide and `1.2 * size` tall.
#[derive(Clone, Default)]
pub(crate) struct BlockTextPainter {
    pub(crate) painted: Arc<Mutex<Vec<PaintedText>>>,
}

impl BlockTextPainter {
    pub(crate) fn painted(&self) -> Vec<PaintedText> {
        self.painted.lock().unwrap().clone()
    }
}

fn block_extent(text: &str, size_px: f32) -> TextExtent {
    TextExtent {
        width: 0.6 * f64::from(size_px) * text.chars().count() as f64,
        height: 1.2 * f64::from(size_px),
    }
}

impl TextPainter for BlockTextPainter {
    fn measure(&mut self, text: &str, size_px: f32) -> OverlayResult<TextExtent> {
        Ok(block_extent(text, size_px))
    }

    fn paint(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        size_px: f32,
        origin: Point,
        color: Rgba8,
    ) -> OverlayResult<()> {
        let ext = block_extent(text, size_px);
        ctx.set_paint(color.to_cpu());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            origin.x,
            origin.y,
            origin.x + ext.width,
            origin.y + ext.height,
        ));
        self.painted.lock().unwrap().push(PaintedText {
            text: text.to_string(),
            size_px,
            origin,
        });
        Ok(())
    }
}

#[test]
fn font_painter_rejects_non_font_bytes() {
    let err = FontTextPainter::from_bytes(b"definitely not a font".to_vec())
        .err()
        .expect("garbage bytes must not register a font family");
    assert!(err.to_string().contains("render error:"));
}

#[test]
fn font_painter_missing_file_is_render_error() {
    let err = FontTextPainter::from_path("tests/data/no-such-font.ttf")
        .err()
        .expect("missing font must fail");
    assert!(matches!(err, OverlayError::Render(_)));
    assert!(err.to_string().contains("no-such-font.ttf"));
}

#[test]
fn block_painter_measures_per_char() {
    let mut p = BlockTextPainter::default();
    let e = p.measure("MPH", 10.0).unwrap();
    assert!((e.width - 18.0).abs() < 1e-9);
    assert!((e.height - 12.0).abs() < 1e-9);
}

pub(crate) const DEJAVU_SANS: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/fonts/DejaVuSans.ttf");

#[test]
fn font_painter_loads_family_from_file() {
    let p = FontTextPainter::from_path(DEJAVU_SANS).unwrap();
    assert!(!p.family().is_empty());
    assert!(p.family().contains("DejaVu"), "{}", p.family());
}

#[test]
fn font_painter_measures_digits() {
    let mut p = FontTextPainter::from_path(DEJAVU_SANS).unwrap();
    let e = p.measure("63", 36.0).unwrap();
    assert!(e.width > 0.0 && e.height > 0.0, "{e:?}");
    // Two digits at 36 px are narrower than the font size times three.
    assert!(e.width < 108.0, "{e:?}");

    let wider = p.measure("6300", 36.0).unwrap();
    assert!(wider.width > e.width);
    assert!(p.measure("63", 0.0).is_err());
}

#[test]
fn font_painter_lights_pixels_inside_its_box() {
    let mut p = FontTextPainter::from_path(DEJAVU_SANS).unwrap();
    let ext = p.measure("63", 36.0).unwrap();
    let mut raster = CpuRaster::new(Canvas {
        width: 200,
        height: 100,
    })
    .unwrap();
    let bytes = raster
        .draw(|ctx| {
            p.paint(ctx, "63", 36.0, Point::new(50.0, 20.0), Rgba8::new(255, 255, 255, 255))?;
            // The painter restores the identity transform.
            ctx.set_paint(Rgba8::new(255, 0, 0, 255).to_cpu());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 2.0, 2.0));
            Ok(())
        })
        .unwrap()
        .to_vec();

    assert_eq!(&bytes[0..4], &[255, 0, 0, 255]);
    let mut inside = 0;
    let mut outside = 0;
    for (i, px) in bytes.chunks_exact(4).enumerate().skip(1) {
        let (x, y) = ((i % 200) as f64, (i / 200) as f64);
        if px[3] == 0 || (x < 2.0 && y < 2.0) {
            continue;
        }
        let in_box = (49.0..=51.0 + ext.width).contains(&x)
            && (19.0..=21.0 + ext.height).contains(&y);
        if in_box {
            inside += 1;
        } else {
            outside += 1;
        }
    }
    assert!(inside > 50, "only {inside} lit pixels");
    assert_eq!(outside, 0);
}
