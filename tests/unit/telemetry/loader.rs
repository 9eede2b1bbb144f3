use super::*;

const ROW: &str = "1,2024-05-01T10:00:00Z,51.5,-0.12,30.0,63.9,0.25,-0.40";

fn load(text: &str) -> OverlayResult<Telemetry> {
    load_reader(std::io::Cursor::new(text.as_bytes().to_vec()))
}

#[test]
fn parses_required_columns_and_flips_lateral_sign() {
    let s = parse_row(ROW).unwrap();
    assert_eq!(s.latitude, 51.5);
    assert_eq!(s.longitude, -0.12);
    assert_eq!(s.speed, 63.9);
    assert_eq!(s.g_longitudinal, 0.25);
    assert_eq!(s.g_lateral, 0.40);
}

#[test]
fn ignores_extra_fields_and_padding() {
    let s = parse_row("7, t , 51.5 , -0.12 ,x, 40 ,-0.1, 0.3 ,extra,more").unwrap();
    assert_eq!(s.speed, 40.0);
    assert_eq!(s.g_longitudinal, -0.1);
    assert_eq!(s.g_lateral, -0.3);
}

#[test]
fn rejects_short_and_non_numeric_rows() {
    assert!(parse_row("1,t,51.5,-0.12,30.0,63.9,0.25").is_none());
    assert!(parse_row("1,t,51.5,abc,30.0,63.9,0.25,-0.40").is_none());
    assert!(parse_row("1,t,51.5,-0.12,30.0,,0.25,-0.40").is_none());
    assert!(parse_row("1,t,NaN,-0.12,30.0,63.9,0.25,-0.40").is_none());
    assert!(parse_row("1,t,51.5,inf,30.0,63.9,0.25,-0.40").is_none());
}

#[test]
fn unused_columns_may_be_garbage() {
    assert!(parse_row("1,??,51.5,-0.12,n/a,63.9,0.25,-0.40").is_some());
}

#[test]
fn skips_headers_comments_and_malformed_rows() {
    let text = format!(
        "Session,Lap\n# exported\n\n{ROW}\n2,t,51.6,-0.13,0,64.0,0.1\n3,t,51.7,-0.14,0,65.0,0.2,0.1\n"
    );
    let t = load(&text).unwrap();
    assert_eq!(t.len(), 2);
    assert_eq!(t.latitude(), &[51.5, 51.7]);
    assert_eq!(t.speed(), &[63.9, 65.0]);
    assert_eq!(t.g_lateral(), &[0.40, -0.1]);
}

#[test]
fn columns_stay_aligned() {
    let text = format!("{ROW}\n1,t,x,1,1,1,1,1\n{ROW}\n");
    let t = load(&text).unwrap();
    let n = t.len();
    assert_eq!(n, 2);
    assert_eq!(t.longitude().len(), n);
    assert_eq!(t.speed().len(), n);
    assert_eq!(t.g_lateral().len(), n);
    assert_eq!(t.g_longitudinal().len(), n);
}

#[test]
fn strips_utf8_bom_on_first_line() {
    let text = format!("\u{feff}{ROW}\n");
    let t = load(&text).unwrap();
    assert_eq!(t.len(), 1);
}

#[test]
fn lines_with_leading_whitespace_are_not_data() {
    let text = format!(" {ROW}\n{ROW}\n");
    assert_eq!(load(&text).unwrap().len(), 1);
}

#[test]
fn empty_or_header_only_log_is_fatal() {
    let err = load("").unwrap_err();
    assert!(matches!(err, OverlayError::Telemetry(_)));
    assert!(err.to_string().contains("no valid telemetry rows"));

    let err = load("Time,Lat,Lon\n# nothing here\n").unwrap_err();
    assert!(matches!(err, OverlayError::Telemetry(_)));
}

#[test]
fn missing_file_is_telemetry_error() {
    let err = load_path("tests/data/does-not-exist.csv").unwrap_err();
    assert!(matches!(err, OverlayError::Telemetry(_)));
    assert!(err.to_string().contains("does-not-exist.csv"));
}

#[test]
fn bounds_and_samples_follow_columns() {
    let text = "1,t,10.0,20.0,0,50,0.5,0.5\n2,t,11.0,19.0,0,60,0.0,-1.0\n";
    let t = load(text).unwrap();
    let b = t.bounds().unwrap();
    assert_eq!((b.min_lat, b.max_lat, b.min_lon, b.max_lon), (10.0, 11.0, 19.0, 20.0));
    let s = t.sample(1).unwrap();
    assert_eq!(s.speed, 60.0);
    assert_eq!(s.g_lateral, 1.0);
    assert!((s.g_magnitude() - 1.0).abs() < 1e-12);
    assert!(t.sample(2).is_none());
}
