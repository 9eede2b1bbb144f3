use std::sync::Arc;

use kurbo::{BezPath, Circle, Line, RoundedRect};

use crate::config::{OverlayConfig, OverlayLayout};
use crate::foundation::core::{Canvas, FrameIndex, Point, Rgba8, Vec2};
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::projection::ProjectedPoint;
use crate::projection::track::TrackProjection;
use crate::render::backend::{CpuRaster, FrameRGBA, premul_over_in_place, shape_to_cpu};
use crate::render::text::TextPainter;
use crate::telemetry::TelemetrySample;

const TRACK_COLOR: Rgba8 = Rgba8::new(255, 255, 255, 180);
const MARKER_COLOR: Rgba8 = Rgba8::new(255, 0, 0, 255);
const PANEL_FILL: Rgba8 = Rgba8::new(0, 0, 0, 160);
const PANEL_OUTLINE: Rgba8 = Rgba8::new(255, 255, 255, 180);
const SPEED_COLOR: Rgba8 = Rgba8::new(255, 255, 255, 255);
const UNIT_COLOR: Rgba8 = Rgba8::new(200, 200, 200, 255);
const GAUGE_OUTLINE: Rgba8 = Rgba8::new(255, 255, 255, 255);
const GAUGE_RING: Rgba8 = Rgba8::new(200, 200, 200, 120);
const CROSSHAIR_COLOR: Rgba8 = Rgba8::new(255, 255, 255, 255);
const G_DOT_COLOR: Rgba8 = Rgba8::new(255, 0, 0, 255);
const G_TEXT_COLOR: Rgba8 = Rgba8::new(255, 255, 255, 150);

/// Unit label under the speed readout.
pub const SPEED_UNIT: &str = "MPH";
/// Reference rings drawn on the gauge, in G.
pub const GAUGE_RINGS_G: [f64; 3] = [0.5, 1.0, 1.5];

/// Speed readout text: the input speed truncated toward zero.
pub fn speed_text(speed: f64) -> String {
    format!("{}", speed.trunc() as i64)
}

/// G magnitude label with two decimals.
pub fn g_text(magnitude: f64) -> String {
    format!("{magnitude:.2}G")
}

/// Offset of the G vector dot from the gauge center.
///
/// The distance is `radius * magnitude / max_g` and is not clamped to the outer
/// ring. Screen y grows downward, so forward acceleration moves the dot up.
pub fn gauge_dot_offset(g_lateral: f64, g_longitudinal: f64, radius: f64, max_g: f64) -> Vec2 {
    let r = radius * g_lateral.hypot(g_longitudinal) / max_g;
    let angle = (-g_longitudinal).atan2(g_lateral);
    Vec2::new(r * angle.cos(), r * angle.sin())
}

/// Pre-rendered, immutable track polyline at full frame size (premultiplied RGBA8).
#[derive(Clone, Debug)]
pub struct TrackLayer {
    canvas: Canvas,
    data: Arc<[u8]>,
}

impl TrackLayer {
    fn build(
        raster: &mut CpuRaster,
        canvas: Canvas,
        points: &[ProjectedPoint],
        layout: &OverlayLayout,
    ) -> OverlayResult<Self> {
        let bytes = raster.draw(|ctx| {
            let Some((first, rest)) = points.split_first() else {
                return Ok(());
            };
            let mut path = BezPath::new();
            path.move_to(first.to_point());
            for p in rest {
                path.line_to(p.to_point());
            }
            ctx.set_paint(TRACK_COLOR.to_cpu());
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(layout.track_width));
            ctx.stroke_path(&shape_to_cpu(&path));
            Ok(())
        })?;
        Ok(Self {
            canvas,
            data: Arc::from(bytes),
        })
    }

    /// Layer dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Premultiplied RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Builds one composed frame per retained sample on top of a shared [`TrackLayer`].
pub struct FrameCompositor {
    layout: OverlayLayout,
    points: Vec<ProjectedPoint>,
    track: TrackLayer,
    raster: CpuRaster,
    text: Box<dyn TextPainter>,
}

impl FrameCompositor {
    /// Render the static track layer and prepare per-frame state.
    pub fn new(
        cfg: &OverlayConfig,
        projection: &TrackProjection,
        text: Box<dyn TextPainter>,
    ) -> OverlayResult<Self> {
        let layout = cfg.layout();
        let canvas = cfg.canvas();
        let mut raster = CpuRaster::new(canvas)?;
        let track = TrackLayer::build(&mut raster, canvas, projection.points(), &layout)?;
        Ok(Self {
            layout,
            points: projection.points().to_vec(),
            track,
            raster,
            text,
        })
    }

    /// Derived overlay geometry.
    pub fn layout(&self) -> &OverlayLayout {
        &self.layout
    }

    /// Static track layer shared by every frame.
    pub fn track_layer(&self) -> &TrackLayer {
        &self.track
    }

    /// Compose frame `idx` showing `sample`.
    pub fn compose(&mut self, idx: FrameIndex, sample: &TelemetrySample) -> OverlayResult<FrameRGBA> {
        let marker = usize::try_from(idx.0)
            .ok()
            .and_then(|i| self.points.get(i))
            .copied()
            .ok_or_else(|| {
                OverlayError::render(format!(
                    "frame {} out of range ({} projected points)",
                    idx.0,
                    self.points.len()
                ))
            })?;

        let Self {
            layout,
            track,
            raster,
            text,
            ..
        } = self;

        let overlay = raster.draw(|ctx| {
            draw_marker(ctx, layout, marker);
            draw_speed_panel(ctx, layout, text.as_mut(), sample.speed)?;
            draw_g_gauge(ctx, layout, text.as_mut(), sample)?;
            Ok(())
        })?;

        let mut frame = FrameRGBA {
            width: track.canvas.width,
            height: track.canvas.height,
            data: track.data.to_vec(),
            premultiplied: true,
        };
        premul_over_in_place(&mut frame.data, overlay)?;
        Ok(frame)
    }
}

fn fill_shape(ctx: &mut vello_cpu::RenderContext, shape: &impl kurbo::Shape, color: Rgba8) {
    ctx.set_paint(color.to_cpu());
    ctx.fill_path(&shape_to_cpu(shape));
}

fn stroke_shape(
    ctx: &mut vello_cpu::RenderContext,
    shape: &impl kurbo::Shape,
    color: Rgba8,
    width: f64,
) {
    ctx.set_paint(color.to_cpu());
    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
    ctx.stroke_path(&shape_to_cpu(shape));
}

fn draw_marker(ctx: &mut vello_cpu::RenderContext, layout: &OverlayLayout, at: ProjectedPoint) {
    fill_shape(ctx, &Circle::new(at.to_point(), layout.dot_radius), MARKER_COLOR);
}

fn draw_speed_panel(
    ctx: &mut vello_cpu::RenderContext,
    layout: &OverlayLayout,
    text: &mut dyn TextPainter,
    speed: f64,
) -> OverlayResult<()> {
    let panel = layout.panel;
    let rr = RoundedRect::from_rect(panel, layout.panel_radius);
    fill_shape(ctx, &rr, PANEL_FILL);
    stroke_shape(ctx, &rr, PANEL_OUTLINE, layout.panel_outline);

    let value = speed_text(speed);
    let ext = text.measure(&value, layout.font_speed)?;
    let origin = Point::new(
        panel.x0 + (panel.width() - ext.width) / 2.0,
        panel.y0 + layout.speed_inset,
    );
    text.paint(ctx, &value, layout.font_speed, origin, SPEED_COLOR)?;

    let ext = text.measure(SPEED_UNIT, layout.font_label)?;
    let origin = Point::new(
        panel.x0 + (panel.width() - ext.width) / 2.0,
        panel.y1 - ext.height - layout.unit_inset,
    );
    text.paint(ctx, SPEED_UNIT, layout.font_label, origin, UNIT_COLOR)
}

fn draw_g_gauge(
    ctx: &mut vello_cpu::RenderContext,
    layout: &OverlayLayout,
    text: &mut dyn TextPainter,
    sample: &TelemetrySample,
) -> OverlayResult<()> {
    let c = layout.gauge_center;
    let radius = layout.gauge_radius;

    stroke_shape(ctx, &Circle::new(c, radius), GAUGE_OUTLINE, layout.gauge_outline);
    for g in GAUGE_RINGS_G {
        let r = g / layout.max_g * radius;
        stroke_shape(ctx, &Circle::new(c, r), GAUGE_RING, layout.gauge_hairline);
    }

    let h = Line::new((c.x - radius, c.y), (c.x + radius, c.y));
    let v = Line::new((c.x, c.y - radius), (c.x, c.y + radius));
    stroke_shape(ctx, &h, CROSSHAIR_COLOR, layout.gauge_crosshair);
    stroke_shape(ctx, &v, CROSSHAIR_COLOR, layout.gauge_crosshair);

    let dot = c + gauge_dot_offset(sample.g_lateral, sample.g_longitudinal, radius, layout.max_g);
    fill_shape(ctx, &Circle::new(dot, layout.gauge_dot_radius), G_DOT_COLOR);

    let label = g_text(sample.g_magnitude());
    let ext = text.measure(&label, layout.font_g)?;
    let origin = Point::new(c.x - ext.width / 2.0, c.y - ext.height / 2.0);
    text.paint(ctx, &label, layout.font_g, origin, G_TEXT_COLOR)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
