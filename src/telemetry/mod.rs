//! Telemetry samples in columnar form.
//!
//! Columns are always the same length: a log row is either accepted whole or skipped whole.

/// Row-oriented log parsing.
pub mod loader;

/// One reading of position, speed and acceleration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TelemetrySample {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Speed in mph.
    pub speed: f64,
    /// Lateral acceleration in G, right-positive.
    pub g_lateral: f64,
    /// Longitudinal acceleration in G, forward-positive.
    pub g_longitudinal: f64,
}

impl TelemetrySample {
    /// Euclidean norm of the lateral/longitudinal acceleration vector.
    pub fn g_magnitude(&self) -> f64 {
        self.g_lateral.hypot(self.g_longitudinal)
    }
}

/// Geographic extents of a telemetry log.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    /// Smallest latitude.
    pub min_lat: f64,
    /// Largest latitude.
    pub max_lat: f64,
    /// Smallest longitude.
    pub min_lon: f64,
    /// Largest longitude.
    pub max_lon: f64,
}

/// Aligned telemetry columns in acquisition order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Telemetry {
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    speed: Vec<f64>,
    g_lateral: Vec<f64>,
    g_longitudinal: Vec<f64>,
}

impl Telemetry {
    /// Build from samples in acquisition order.
    pub fn from_samples(samples: impl IntoIterator<Item = TelemetrySample>) -> Self {
        let mut out = Self::default();
        for s in samples {
            out.push(s);
        }
        out
    }

    pub(crate) fn push(&mut self, s: TelemetrySample) {
        self.latitude.push(s.latitude);
        self.longitude.push(s.longitude);
        self.speed.push(s.speed);
        self.g_lateral.push(s.g_lateral);
        self.g_longitudinal.push(s.g_longitudinal);
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.latitude.len()
    }

    /// Return `true` when no samples were loaded.
    pub fn is_empty(&self) -> bool {
        self.latitude.is_empty()
    }

    /// Latitude column.
    pub fn latitude(&self) -> &[f64] {
        &self.latitude
    }

    /// Longitude column.
    pub fn longitude(&self) -> &[f64] {
        &self.longitude
    }

    /// Speed column (mph).
    pub fn speed(&self) -> &[f64] {
        &self.speed
    }

    /// Lateral G column.
    pub fn g_lateral(&self) -> &[f64] {
        &self.g_lateral
    }

    /// Longitudinal G column.
    pub fn g_longitudinal(&self) -> &[f64] {
        &self.g_longitudinal
    }

    /// Sample at `i`, if in range.
    pub fn sample(&self, i: usize) -> Option<TelemetrySample> {
        Some(TelemetrySample {
            latitude: *self.latitude.get(i)?,
            longitude: *self.longitude.get(i)?,
            speed: *self.speed.get(i)?,
            g_lateral: *self.g_lateral.get(i)?,
            g_longitudinal: *self.g_longitudinal.get(i)?,
        })
    }

    /// Latitude/longitude extents, `None` for an empty log.
    pub fn bounds(&self) -> Option<GeoBounds> {
        if self.is_empty() {
            return None;
        }
        let (min_lat, max_lat) = min_max(&self.latitude);
        let (min_lon, max_lon) = min_max(&self.longitude);
        Some(GeoBounds {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }
}

pub(crate) fn min_max(v: &[f64]) -> (f64, f64) {
    v.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        })
}
