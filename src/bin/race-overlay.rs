use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use race_overlay::{
    FfmpegSink, FfmpegSinkOpts, FontTextPainter, FrameIndex, OverlayConfig, OverlaySession,
};

#[derive(Parser, Debug)]
#[command(name = "race-overlay", version)]
struct Cli {
    /// Log debug diagnostics.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the overlay video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single overlay frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Args, Debug)]
struct OverlayArgs {
    /// Input telemetry log.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// JSON config file; fields not present keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Font used for all labels (TTF/OTF).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Output frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Minimap size in pixels.
    #[arg(long)]
    minimap_size: Option<u32>,

    /// Samples trimmed from each end of the track.
    #[arg(long)]
    trim: Option<usize>,

    /// G value at the gauge's outer ring.
    #[arg(long)]
    max_g: Option<f64>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    overlay: OverlayArgs,

    /// Output video path (.mov).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Refuse to overwrite an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    overlay: OverlayArgs,

    /// Frame index (0-based, after trimming).
    #[arg(long)]
    index: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn build_config(args: &OverlayArgs) -> anyhow::Result<OverlayConfig> {
    let mut cfg = match &args.config {
        Some(path) => OverlayConfig::from_json_path(path)?,
        None => OverlayConfig::default(),
    };
    cfg.apply_env()?;

    if let Some(v) = &args.font {
        cfg.font_path = Some(v.clone());
    }
    if let Some(v) = args.width {
        cfg.width = v;
    }
    if let Some(v) = args.height {
        cfg.height = v;
    }
    if let Some(v) = args.fps {
        cfg.fps = v;
    }
    if let Some(v) = args.minimap_size {
        cfg.minimap_size = v;
    }
    if let Some(v) = args.trim {
        cfg.trim = v;
    }
    if let Some(v) = args.max_g {
        cfg.max_g = v;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn open_session(args: &OverlayArgs, cfg: OverlayConfig) -> anyhow::Result<OverlaySession> {
    let telemetry = race_overlay::telemetry::loader::load_path(&args.in_path)
        .with_context(|| format!("load telemetry '{}'", args.in_path.display()))?;

    let font_path = cfg
        .font_path
        .clone()
        .context("no font configured (pass --font or set RACE_OVERLAY_FONT)")?;
    let painter = FontTextPainter::from_path(&font_path)?;
    tracing::info!(family = painter.family(), path = %font_path.display(), "loaded font");

    Ok(OverlaySession::new(cfg, telemetry, Box::new(painter))?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = build_config(&args.overlay)?;
    if let Some(out) = args.out {
        cfg.out_path = out;
    }
    if args.no_overwrite {
        cfg.overwrite = false;
    }
    let sink_opts = FfmpegSinkOpts {
        out_path: cfg.out_path.clone(),
        overwrite: cfg.overwrite,
    };

    let mut sess = open_session(&args.overlay, cfg)?;
    let mut sink = FfmpegSink::new(sink_opts.clone());

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_handler = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        cancel_handler.store(true, Ordering::SeqCst);
    })
    .context("install Ctrl-C handler")?;

    let stats = sess.stream(&mut sink, Some(&cancel))?;
    eprintln!(
        "wrote {} ({} frames)",
        sink_opts.out_path.display(),
        stats.frames_written
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = build_config(&args.overlay)?;
    let mut sess = open_session(&args.overlay, cfg)?;
    let frame = sess.render_frame(FrameIndex(args.index))?.to_straight();

    race_overlay::encode::ffmpeg::ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
