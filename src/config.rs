use std::path::{Path, PathBuf};

use crate::foundation::core::{Canvas, Fps, Point, Rect};
use crate::foundation::error::{OverlayError, OverlayResult};

/// Prefix shared by all environment overrides.
pub const ENV_PREFIX: &str = "RACE_OVERLAY_";

/// Run-wide overlay configuration.
///
/// All pixel sizes other than `width`, `height` and `minimap_size` are expressed at the base
/// resolution (`base_width` x `base_height`) and scaled linearly to the output resolution, so the
/// composition looks the same at any output size.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlayConfig {
    /// Reference width the base-pixel sizes are designed for.
    pub base_width: u32,
    /// Reference height the base-pixel sizes are designed for.
    pub base_height: u32,
    /// Output frame width in pixels.
    pub width: u32,
    /// Output frame height in pixels.
    pub height: u32,
    /// Output frame rate (one frame per telemetry sample).
    pub fps: u32,
    /// Side of the square the minimap is fitted into, in output pixels.
    pub minimap_size: u32,
    /// Samples discarded from each end of the track before projecting.
    pub trim: usize,
    /// G value mapped to the gauge's outer ring.
    pub max_g: f64,
    /// Corner margin (base pixels).
    pub margin: u32,
    /// Speed readout font size (base pixels).
    pub font_speed: u32,
    /// Unit label font size (base pixels).
    pub font_label: u32,
    /// G magnitude font size (base pixels).
    pub font_g: u32,
    /// TrueType/OpenType font used for every label.
    pub font_path: Option<PathBuf>,
    /// Output video path.
    pub out_path: PathBuf,
    /// Overwrite the output video if it already exists.
    pub overwrite: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            base_width: 960,
            base_height: 720,
            width: 1920,
            height: 1440,
            fps: 25,
            minimap_size: 600,
            trim: 5,
            max_g: 1.5,
            margin: 40,
            font_speed: 72,
            font_label: 28,
            font_g: 36,
            font_path: None,
            out_path: PathBuf::from("race_overlay.mov"),
            overwrite: true,
        }
    }
}

impl OverlayConfig {
    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn from_json_path(path: impl AsRef<Path>) -> OverlayResult<Self> {
        use anyhow::Context as _;
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        serde_json::from_str(&text).map_err(|e| {
            OverlayError::validation(format!("invalid config '{}': {e}", path.display()))
        })
    }

    /// Apply `RACE_OVERLAY_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> OverlayResult<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to resolve fully prefixed variable names.
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> OverlayResult<()> {
        let get = |suffix: &str| {
            let key = format!("{ENV_PREFIX}{suffix}");
            lookup(&key).map(|v| (key, v))
        };

        if let Some((k, v)) = get("WIDTH") {
            self.width = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("HEIGHT") {
            self.height = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("FPS") {
            self.fps = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("MINIMAP_SIZE") {
            self.minimap_size = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("TRIM") {
            self.trim = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("MAX_G") {
            self.max_g = parse_env(&k, &v)?;
        }
        if let Some((_, v)) = get("FONT") {
            self.font_path = Some(PathBuf::from(v));
        }
        if let Some((_, v)) = get("OUT") {
            self.out_path = PathBuf::from(v);
        }
        Ok(())
    }

    /// Check every value the pipeline relies on.
    pub fn validate(&self) -> OverlayResult<()> {
        if self.base_width == 0 || self.base_height == 0 {
            return Err(OverlayError::validation(
                "base resolution must be non-zero",
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(OverlayError::validation("width/height must be non-zero"));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(OverlayError::validation(format!(
                "width/height must be <= {}",
                u16::MAX
            )));
        }
        if self.fps == 0 {
            return Err(OverlayError::validation("fps must be non-zero"));
        }
        if self.minimap_size == 0 {
            return Err(OverlayError::validation("minimap_size must be non-zero"));
        }
        if !self.max_g.is_finite() || self.max_g <= 0.0 {
            return Err(OverlayError::validation(
                "max_g must be finite and > 0",
            ));
        }
        Ok(())
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Output frame rate.
    pub fn frame_rate(&self) -> OverlayResult<Fps> {
        Fps::new(self.fps, 1)
    }

    /// Resolution scale relative to the base resolution (mean of both axes).
    pub fn scale(&self) -> f64 {
        let sx = f64::from(self.width) / f64::from(self.base_width);
        let sy = f64::from(self.height) / f64::from(self.base_height);
        (sx + sy) / 2.0
    }

    /// Scale a base-resolution size to output pixels, truncating toward zero.
    pub fn px(&self, base: u32) -> u32 {
        (f64::from(base) * self.scale()) as u32
    }

    /// Precompute every derived overlay dimension.
    pub fn layout(&self) -> OverlayLayout {
        OverlayLayout::from_config(self)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> OverlayResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| OverlayError::validation(format!("invalid {key}='{value}': {e}")))
}

/// Output-pixel geometry derived from an [`OverlayConfig`].
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayLayout {
    /// Resolution scale factor.
    pub scale: f64,
    /// Output canvas.
    pub canvas: Canvas,
    /// Minimap square side in pixels.
    pub minimap_size: f64,
    /// Minimap placement offset. The vertical offset is applied after centering.
    pub minimap_offset: (f64, f64),
    /// Track polyline stroke width.
    pub track_width: f64,
    /// Position marker radius.
    pub dot_radius: f64,
    /// Speed panel bounds.
    pub panel: Rect,
    /// Speed panel corner radius.
    pub panel_radius: f64,
    /// Speed panel outline width.
    pub panel_outline: f64,
    /// Distance from panel top to the speed text.
    pub speed_inset: f64,
    /// Distance from panel bottom to the unit label.
    pub unit_inset: f64,
    /// Gauge center.
    pub gauge_center: Point,
    /// Gauge outer radius.
    pub gauge_radius: f64,
    /// Gauge outer ring width.
    pub gauge_outline: f64,
    /// Reference ring width.
    pub gauge_hairline: f64,
    /// Crosshair width. Fixed at one output pixel regardless of resolution.
    pub gauge_crosshair: f64,
    /// G vector dot radius.
    pub gauge_dot_radius: f64,
    /// G value mapped to `gauge_radius`.
    pub max_g: f64,
    /// Speed readout font size.
    pub font_speed: f32,
    /// Unit label font size.
    pub font_label: f32,
    /// G magnitude font size.
    pub font_g: f32,
}

impl OverlayLayout {
    fn from_config(cfg: &OverlayConfig) -> Self {
        let scale = cfg.scale();
        let px = |v: u32| f64::from(cfg.px(v));
        let w = f64::from(cfg.width);
        let h = f64::from(cfg.height);

        let margin = px(cfg.margin);
        let panel_w = px(260);
        let panel_h = px(140);
        let panel_y = h - panel_h - margin;

        let gauge_radius = px(100);

        Self {
            scale,
            canvas: cfg.canvas(),
            minimap_size: f64::from(cfg.minimap_size),
            minimap_offset: (margin, margin),
            track_width: px(4).max(1.0),
            dot_radius: px(15),
            panel: Rect::new(0.0, panel_y, panel_w, panel_y + panel_h),
            panel_radius: px(20),
            panel_outline: px(3).max(1.0),
            speed_inset: 20.0 * scale,
            unit_inset: 15.0 * scale,
            gauge_center: Point::new(w - gauge_radius, h - margin - gauge_radius),
            gauge_radius,
            gauge_outline: px(3).max(1.0),
            gauge_hairline: px(1).max(1.0),
            gauge_crosshair: 1.0,
            gauge_dot_radius: px(12),
            max_g: cfg.max_g,
            font_speed: cfg.px(cfg.font_speed) as f32,
            font_label: cfg.px(cfg.font_label) as f32,
            font_g: cfg.px(cfg.font_g) as f32,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
