use super::*;

fn cfg(num: u32, den: u32) -> SinkConfig {
    SinkConfig {
        width: 1920,
        height: 1440,
        fps: Fps::new(num, den).unwrap(),
    }
}

#[test]
fn encoder_args_describe_raw_rgba_in_and_qtrle_out() {
    let args = encoder_args(&cfg(25, 1), true);
    let expected = [
        "-y",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
        "1920x1440",
        "-r",
        "25",
        "-i",
        "pipe:0",
        "-an",
        "-c:v",
        "qtrle",
        "-pix_fmt",
        "argb",
    ];
    assert_eq!(args, expected);
}

#[test]
fn no_overwrite_uses_dash_n() {
    let args = encoder_args(&cfg(25, 1), false);
    assert_eq!(args[0], "-n");
}

#[test]
fn fractional_fps_is_rational() {
    assert_eq!(fps_arg(Fps::new(30000, 1001).unwrap()), "30000/1001");
    assert_eq!(fps_arg(Fps::new(50, 1).unwrap()), "50");
}

#[test]
fn opts_default_to_overwrite() {
    let o = FfmpegSinkOpts::new("out/race.mov");
    assert!(o.overwrite);
    assert_eq!(o.out_path, PathBuf::from("out/race.mov"));
}

#[test]
fn push_before_begin_is_stream_error() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mov"));
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![0; 4],
        premultiplied: true,
    };
    let err = sink.push_frame(FrameIndex(0), &frame).unwrap_err();
    assert!(matches!(err, OverlayError::Stream { .. }));
    assert!(sink.end().is_err());
}

#[test]
fn begin_refuses_existing_output_without_overwrite() {
    let dir = std::env::temp_dir().join(format!("race-overlay-ffmpeg-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("exists.mov");
    std::fs::write(&out, b"old").unwrap();

    let mut opts = FfmpegSinkOpts::new(&out);
    opts.overwrite = false;
    let mut sink = FfmpegSink::new(opts);
    let err = sink.begin(cfg(25, 1)).unwrap_err();
    assert!(matches!(err, OverlayError::Validation(_)));
    assert!(err.to_string().contains("already exists"));
    assert_eq!(std::fs::read(&out).unwrap(), b"old");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn ensure_parent_dir_accepts_bare_file_names() {
    ensure_parent_dir(Path::new("race.mov")).unwrap();
}

#[test]
fn encoder_command_writes_to_out_path_last() {
    let mut opts = FfmpegSinkOpts::new("out/race.mov");
    opts.overwrite = false;
    let cmd = encoder_command(&cfg(25, 1), &opts);
    assert_eq!(cmd.get_program(), "ffmpeg");
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    assert_eq!(args.first().map(String::as_str), Some("-n"));
    assert_eq!(args.last().map(String::as_str), Some("out/race.mov"));
    assert_eq!(args.len(), encoder_args(&cfg(25, 1), false).len() + 1);
}

#[cfg(target_os = "linux")]
#[test]
fn encoder_runs_in_its_own_process_group() {
    // Prints the shell's pid and its process group id (field 5 of /proc/<pid>/stat).
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "echo $$ $(cut -d' ' -f5 /proc/$$/stat)"])
        .stdout(Stdio::piped());
    own_process_group(&mut cmd);
    let out = cmd.output().unwrap();
    let text = String::from_utf8_lossy(&out.stdout);
    let ids: Vec<&str> = text.split_whitespace().collect();
    assert_eq!(ids.len(), 2, "{text}");
    assert_eq!(ids[0], ids[1], "child should lead its own process group");

    // Without the setting the child inherits this process's group.
    let inherited = Command::new("sh")
        .args(["-c", "echo $$ $(cut -d' ' -f5 /proc/$$/stat)"])
        .output()
        .unwrap();
    let text = String::from_utf8_lossy(&inherited.stdout);
    let ids: Vec<&str> = text.split_whitespace().collect();
    assert_ne!(ids[0], ids[1]);
}
