use super::*;

fn opts(trim: usize) -> ProjectorOpts {
    ProjectorOpts {
        trim,
        minimap_size: 200.0,
        offset: (20.0, 20.0),
    }
}

#[test]
fn collinear_east_west_track_is_horizontal() {
    let lat = [51.5, 51.5, 51.5];
    let lon = [-0.130, -0.120, -0.110];
    let p = project_track(&lat, &lon, &opts(0)).unwrap();
    let pts = p.points();
    assert_eq!(pts.len(), 3);
    assert!(pts[0].x < pts[1].x && pts[1].x < pts[2].x);
    assert_eq!(pts[0].x, 20);
    assert_eq!(pts[2].x, 220);
    // 200 - 0 + 20 - 100.
    assert!(pts.iter().all(|pt| pt.y == 120), "{pts:?}");
}

#[test]
fn longer_axis_spans_the_minimap() {
    let lat = [51.50, 51.51, 51.52, 51.51];
    let lon = [-0.120, -0.118, -0.120, -0.122];
    let p = project_track(&lat, &lon, &opts(0)).unwrap();
    let xs = p.points().iter().map(|pt| pt.x);
    let ys = p.points().iter().map(|pt| pt.y);
    let w = xs.clone().max().unwrap() - xs.min().unwrap();
    let h = ys.clone().max().unwrap() - ys.min().unwrap();
    // North-south extent dominates here.
    assert!((199..=200).contains(&h), "h = {h}");
    assert!(w < h);
}

#[test]
fn north_is_up() {
    let lat = [51.50, 51.51];
    let lon = [-0.12, -0.12];
    let p = project_track(&lat, &lon, &opts(0)).unwrap();
    let [south, north] = [p.points()[0], p.points()[1]];
    assert!(north.y < south.y);
    assert_eq!(north.x, south.x);
}

#[test]
fn aspect_ratio_is_preserved() {
    // 2:1 east-west to north-south in meters.
    let lat0: f64 = 0.0;
    let dx_deg = 0.02;
    let dy_deg = 0.01 * METERS_PER_DEG_LON / METERS_PER_DEG_LAT;
    let lat = [lat0, lat0, lat0 + dy_deg, lat0 + dy_deg];
    let lon = [0.0, dx_deg, dx_deg, 0.0];
    let p = project_track(&lat, &lon, &opts(0)).unwrap();
    let pts = p.points();
    let w = pts[1].x - pts[0].x;
    let h = pts[1].y - pts[2].y;
    assert!((w - 200).abs() <= 1, "w = {w}");
    assert!((h - 100).abs() <= 1, "h = {h}");
}

#[test]
fn trim_drops_outliers_at_both_ends() {
    let lat = [0.0, 51.50, 51.51, 51.52, 89.0];
    let lon = [0.0, -0.12, -0.12, -0.12, 10.0];
    let p = project_track(&lat, &lon, &opts(1)).unwrap();
    assert_eq!(p.len(), 3);
    assert_eq!(p.retained(), 1..4);
    let ys: Vec<i32> = p.points().iter().map(|pt| pt.y).collect();
    assert_eq!(ys.first(), Some(&120));
    assert_eq!(ys.last(), Some(&-80));
    assert!((p.origin().0 - 51.51).abs() < 1e-9);
}

#[test]
fn zero_trim_keeps_everything() {
    let lat = [51.50, 51.51];
    let lon = [-0.12, -0.11];
    let p = project_track(&lat, &lon, &opts(0)).unwrap();
    assert_eq!(p.retained(), 0..2);
    assert!(p.px_per_meter() > 0.0);
}

#[test]
fn too_few_samples_for_trim_is_projection_error() {
    let lat = [51.50; 10];
    let lon = [-0.12; 10];
    let err = project_track(&lat, &lon, &opts(5)).unwrap_err();
    assert!(matches!(err, OverlayError::Projection(_)));
    let err = project_track(&[], &[], &opts(0)).unwrap_err();
    assert!(matches!(err, OverlayError::Projection(_)));
}

#[test]
fn stationary_track_is_degenerate() {
    let lat = [51.5; 4];
    let lon = [-0.12; 4];
    let err = project_track(&lat, &lon, &opts(0)).unwrap_err();
    assert!(matches!(err, OverlayError::Projection(_)));
    assert!(err.to_string().contains("degenerate"));
}

#[test]
fn mismatched_columns_are_rejected() {
    let err = project_track(&[1.0, 2.0], &[1.0], &opts(0)).unwrap_err();
    assert!(matches!(err, OverlayError::Validation(_)));
}

#[test]
fn pixels_truncate_toward_zero() {
    assert_eq!(to_pixel(10.5), 10);
    assert_eq!(to_pixel(10.99), 10);
    assert_eq!(to_pixel(-0.5), 0);
    assert_eq!(to_pixel(-1.5), -1);
}

#[test]
fn options_follow_config() {
    let cfg = OverlayConfig::default();
    let o = ProjectorOpts::from_config(&cfg);
    assert_eq!(o.trim, 5);
    assert_eq!(o.minimap_size, 600.0);
    assert_eq!(o.offset, (80.0, 80.0));
}
