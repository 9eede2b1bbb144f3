use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig, check_frame};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::render::backend::{FrameRGBA, unpremultiply_rgba8};

/// Options for [`FfmpegSink`] output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output file path (QuickTime container).
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
}

impl FfmpegSinkOpts {
    /// Create options for writing to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw straight-alpha RGBA frames to its stdin.
///
/// Output is QuickTime RLE (`qtrle`, `argb`), which preserves the alpha channel. Writes block
/// when `ffmpeg` falls behind; that is the only backpressure in the pipeline.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink. `ffmpeg` is not started until [`FrameSink::begin`].
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Close stdin, reap the child and return its exit status with captured stderr.
    fn shutdown(&mut self) -> OverlayResult<(std::process::ExitStatus, String)> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| OverlayError::stream("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| OverlayError::stream(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| OverlayError::stream("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| OverlayError::stream(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        self.cfg = None;
        Ok((status, String::from_utf8_lossy(&stderr_bytes).trim().to_string()))
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> OverlayResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(OverlayError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(OverlayError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(OverlayError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(OverlayError::stream(
                "ffmpeg is required for encoding, but was not found on PATH",
            ));
        }

        let mut cmd = encoder_command(&cfg, &self.opts);
        tracing::debug!(?cmd, "spawning encoder");

        let mut child = cmd.spawn().map_err(|e| {
            OverlayError::stream(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| OverlayError::stream("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| OverlayError::stream("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> OverlayResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| OverlayError::stream("ffmpeg sink not started"))?;
        check_frame(cfg, self.last_idx, idx, frame)?;
        self.last_idx = Some(idx);

        if frame.premultiplied {
            unpremultiply_rgba8(&mut self.scratch, &frame.data);
        } else {
            self.scratch.copy_from_slice(&frame.data);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(OverlayError::stream("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        if let Err(e) = stdin.write_all(&self.scratch) {
            // The encoder usually explains itself on stderr before the pipe breaks.
            let detail = match self.shutdown() {
                Ok((status, stderr)) if !stderr.is_empty() => format!(" ({status}: {stderr})"),
                Ok((status, _)) => format!(" ({status})"),
                Err(_) => String::new(),
            };
            return Err(OverlayError::stream(format!(
                "failed to write frame to ffmpeg stdin: {e}{detail}"
            )));
        }
        Ok(())
    }

    fn end(&mut self) -> OverlayResult<()> {
        let (status, stderr) = self.shutdown()?;
        if !status.success() {
            return Err(OverlayError::stream(format!(
                "ffmpeg exited with status {status}: {stderr}"
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            let _ = self.shutdown();
        }
    }
}

/// Full `ffmpeg` invocation for `cfg`, writing to `opts.out_path`.
pub(crate) fn encoder_command(cfg: &SinkConfig, opts: &FfmpegSinkOpts) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    cmd.args(encoder_args(cfg, opts.overwrite))
        .arg(&opts.out_path);
    own_process_group(&mut cmd);
    cmd
}

/// Start the child in its own process group so a terminal Ctrl-C reaches only this process.
///
/// The session then closes stdin and waits, letting the encoder finalize the container.
pub(crate) fn own_process_group(cmd: &mut Command) {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt as _;
        cmd.process_group(0);
    }
    #[cfg(not(unix))]
    let _ = cmd;
}

/// Arguments placed before the output path.
pub(crate) fn encoder_args(cfg: &SinkConfig, overwrite: bool) -> Vec<String> {
    let mut args: Vec<String> = vec![if overwrite { "-y" } else { "-n" }.to_string()];
    args.extend(
        [
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
        ]
        .map(String::from),
    );
    args.push(format!("{}x{}", cfg.width, cfg.height));
    args.push("-r".to_string());
    args.push(fps_arg(cfg.fps));
    args.extend(
        ["-i", "pipe:0", "-an", "-c:v", "qtrle", "-pix_fmt", "argb"].map(String::from),
    );
    args
}

// For rawvideo input, `-r` before `-i` sets the input frame rate.
fn fps_arg(fps: Fps) -> String {
    if fps.den == 1 {
        fps.num.to_string()
    } else {
        format!("{}/{}", fps.num, fps.den)
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> OverlayResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
