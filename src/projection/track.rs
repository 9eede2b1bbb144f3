use std::ops::Range;

use crate::config::OverlayConfig;
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::projection::ProjectedPoint;
use crate::telemetry::min_max;

/// Meters per degree of longitude at the equator.
pub const METERS_PER_DEG_LON: f64 = 111_320.0;
/// Meters per degree of latitude.
pub const METERS_PER_DEG_LAT: f64 = 110_540.0;

/// Parameters of the minimap projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectorOpts {
    /// Samples dropped from each end before projecting. `0` keeps every sample.
    pub trim: usize,
    /// Side of the square the longer track dimension is fitted to, in pixels.
    pub minimap_size: f64,
    /// Corner margin added to both axes.
    pub offset: (f64, f64),
}

impl ProjectorOpts {
    /// Projection parameters for a run configuration.
    pub fn from_config(cfg: &OverlayConfig) -> Self {
        let layout = cfg.layout();
        Self {
            trim: cfg.trim,
            minimap_size: layout.minimap_size,
            offset: layout.minimap_offset,
        }
    }
}

/// Projected minimap track.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackProjection {
    points: Vec<ProjectedPoint>,
    trim: usize,
    origin: (f64, f64),
    px_per_meter: f64,
}

impl TrackProjection {
    /// One point per retained sample, in acquisition order.
    pub fn points(&self) -> &[ProjectedPoint] {
        &self.points
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return `true` when nothing was retained (never the case for a successful projection).
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Indices of the retained samples within the loaded telemetry.
    pub fn retained(&self) -> Range<usize> {
        self.trim..self.trim + self.points.len()
    }

    /// Mean latitude/longitude the local plane is centered on.
    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    /// Uniform scale applied to both axes.
    pub fn px_per_meter(&self) -> f64 {
        self.px_per_meter
    }
}

/// Truncate a projected coordinate to a pixel, toward zero.
///
/// Minimap coordinates can be negative once the vertical centering offset is applied, so this is
/// not the same as `floor`: `-0.5` maps to `0`, `10.5` maps to `10`.
pub fn to_pixel(v: f64) -> i32 {
    v.trunc() as i32
}

/// Project latitude/longitude columns onto a north-up minimap.
///
/// The first and last `opts.trim` samples are discarded, the rest are converted to local meters
/// around their mean with an equirectangular approximation, uniformly scaled so the longer extent
/// spans `opts.minimap_size` pixels, flipped so north is up, and offset into place. The vertical
/// offset also subtracts half the minimap size, centering the minimap on the margin line.
pub fn project_track(
    latitude: &[f64],
    longitude: &[f64],
    opts: &ProjectorOpts,
) -> OverlayResult<TrackProjection> {
    if latitude.len() != longitude.len() {
        return Err(OverlayError::validation(format!(
            "latitude/longitude length mismatch: {} vs {}",
            latitude.len(),
            longitude.len()
        )));
    }
    if !opts.minimap_size.is_finite() || opts.minimap_size <= 0.0 {
        return Err(OverlayError::validation("minimap_size must be > 0"));
    }

    let n = latitude.len();
    let keep = n.saturating_sub(opts.trim.saturating_mul(2));
    if keep == 0 {
        return Err(OverlayError::projection(format!(
            "{n} samples leave nothing after trimming {} from each end",
            opts.trim
        )));
    }
    let lat = &latitude[opts.trim..opts.trim + keep];
    let lon = &longitude[opts.trim..opts.trim + keep];

    let lat0 = mean(lat);
    let lon0 = mean(lon);
    let lon_scale = METERS_PER_DEG_LON * lat0.to_radians().cos();

    let xs: Vec<f64> = lon.iter().map(|&v| (v - lon0) * lon_scale).collect();
    let ys: Vec<f64> = lat.iter().map(|&v| (v - lat0) * METERS_PER_DEG_LAT).collect();

    let (min_x, max_x) = min_max(&xs);
    let (min_y, max_y) = min_max(&ys);
    let extent = (max_x - min_x).max(max_y - min_y);
    if !extent.is_finite() || extent <= 0.0 {
        return Err(OverlayError::projection(
            "degenerate track: zero extent on both axes",
        ));
    }

    // Normalizing by the extent first keeps the longer axis at exactly `minimap_size`.
    let size = opts.minimap_size;
    let (off_x, off_y) = opts.offset;
    let points = xs
        .iter()
        .zip(&ys)
        .map(|(&x, &y)| {
            let px = (x - min_x) / extent * size;
            let py = size - (y - min_y) / extent * size;
            ProjectedPoint {
                x: to_pixel(px + off_x),
                y: to_pixel(py + off_y - size / 2.0),
            }
        })
        .collect();

    tracing::debug!(
        lat0,
        lon0,
        width_m = max_x - min_x,
        height_m = max_y - min_y,
        "projected track"
    );

    Ok(TrackProjection {
        points,
        trim: opts.trim,
        origin: (lat0, lon0),
        px_per_meter: size / extent,
    })
}

fn mean(v: &[f64]) -> f64 {
    v.iter().sum::<f64>() / v.len() as f64
}

#[cfg(test)]
#[path = "../../tests/unit/projection/track.rs"]
mod tests;
