use crate::foundation::core::Canvas;
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8, unpremul_u8};

/// A composed frame as RGBA8 pixels.
///
/// Frames produced by the compositor are **premultiplied alpha**; the `premultiplied` flag makes
/// this explicit at the sink boundary, where frames are converted to straight alpha.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent frame.
    pub fn transparent(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0u8; canvas.frame_bytes()],
            premultiplied: true,
        }
    }

    /// RGBA bytes at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copy with straight (non-premultiplied) alpha.
    pub fn to_straight(&self) -> FrameRGBA {
        if !self.premultiplied {
            return self.clone();
        }
        let mut data = vec![0u8; self.data.len()];
        unpremultiply_rgba8(&mut data, &self.data);
        FrameRGBA {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        }
    }
}

/// CPU rasterizer wrapping a reusable `vello_cpu` context and scratch pixmap.
pub(crate) struct CpuRaster {
    ctx: vello_cpu::RenderContext,
    scratch: vello_cpu::Pixmap,
}

impl CpuRaster {
    pub(crate) fn new(canvas: Canvas) -> OverlayResult<Self> {
        let (w, h) = canvas.to_u16()?;
        if w == 0 || h == 0 {
            return Err(OverlayError::render("canvas must be non-empty"));
        }
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            scratch: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Run `f` against a fresh context and return the rendered premultiplied bytes.
    pub(crate) fn draw(
        &mut self,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> OverlayResult<()>,
    ) -> OverlayResult<&[u8]> {
        self.ctx.reset();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        f(&mut self.ctx)?;
        self.ctx.flush();
        self.scratch.data_as_u8_slice_mut().fill(0);
        self.ctx.render_to_pixmap(&mut self.scratch);
        Ok(self.scratch.data_as_u8_slice())
    }
}

/// Convert any `kurbo` shape into a rasterizer path.
pub(crate) fn shape_to_cpu(shape: &impl kurbo::Shape) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in shape.path_elements(0.1) {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Premultiplied source-over of `src` onto `dst`.
pub(crate) fn premul_over_in_place(dst: &mut [u8], src: &[u8]) -> OverlayResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(OverlayError::render(
            "premul_over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = u16::from(s[3]);
        if sa == 0 {
            continue;
        }
        if sa == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255u16 - sa;
        d[3] = add_sat_u8(s[3], mul_div255_u8(u16::from(d[3]), inv));
        for c in 0..3 {
            let dc = mul_div255_u8(u16::from(d[c]), inv);
            d[c] = add_sat_u8(s[c], dc);
        }
    }
    Ok(())
}

/// Convert premultiplied RGBA8 to straight RGBA8. Fully transparent pixels become all zero.
pub(crate) fn unpremultiply_rgba8(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3];
        match a {
            0 => d.fill(0),
            255 => d.copy_from_slice(s),
            _ => {
                d[0] = unpremul_u8(s[0], a);
                d[1] = unpremul_u8(s[1], a);
                d[2] = unpremul_u8(s[2], a);
                d[3] = a;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
