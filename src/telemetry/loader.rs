use std::io::BufRead;
use std::path::Path;

use crate::foundation::error::{OverlayError, OverlayResult};
use crate::telemetry::{Telemetry, TelemetrySample};

/// Field separator of the log format.
pub const DELIMITER: char = ',';
/// Rows with fewer fields are skipped.
pub const MIN_FIELDS: usize = 8;

const COL_LATITUDE: usize = 2;
const COL_LONGITUDE: usize = 3;
const COL_SPEED: usize = 5;
const COL_G_LONGITUDINAL: usize = 6;
const COL_G_LATERAL: usize = 7;

/// Load a telemetry log from disk.
///
/// Fails when the file cannot be read or when no row yields a complete sample.
pub fn load_path(path: impl AsRef<Path>) -> OverlayResult<Telemetry> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        OverlayError::telemetry(format!("failed to open '{}': {e}", path.display()))
    })?;
    load_reader(std::io::BufReader::new(file))
}

/// Load a telemetry log from any buffered reader.
pub fn load_reader(reader: impl BufRead) -> OverlayResult<Telemetry> {
    let mut out = Telemetry::default();
    let mut skipped = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            OverlayError::telemetry(format!("read failed at line {}: {e}", line_no + 1))
        })?;
        let line = if line_no == 0 {
            line.trim_start_matches('\u{feff}')
        } else {
            line.as_str()
        };
        if !line.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        match parse_row(line) {
            Some(sample) => out.push(sample),
            None => skipped += 1,
        }
    }

    let Some(bounds) = out.bounds() else {
        return Err(OverlayError::telemetry("no valid telemetry rows found"));
    };

    tracing::debug!(skipped, "skipped malformed telemetry rows");
    tracing::info!(
        samples = out.len(),
        lat_min = bounds.min_lat,
        lat_max = bounds.max_lat,
        lon_min = bounds.min_lon,
        lon_max = bounds.max_lon,
        "loaded telemetry"
    );
    Ok(out)
}

/// Parse one data row. Returns `None` unless every required field parses.
pub fn parse_row(line: &str) -> Option<TelemetrySample> {
    let fields: Vec<&str> = line.trim().split(DELIMITER).collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }
    let num = |i: usize| -> Option<f64> {
        fields[i]
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    };

    Some(TelemetrySample {
        latitude: num(COL_LATITUDE)?,
        longitude: num(COL_LONGITUDE)?,
        speed: num(COL_SPEED)?,
        // The logger reports lateral G left-positive.
        g_lateral: -num(COL_G_LATERAL)?,
        g_longitudinal: num(COL_G_LONGITUDINAL)?,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/telemetry/loader.rs"]
mod tests;
