use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::OverlayConfig;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{OverlayError, OverlayResult};
use crate::projection::track::{ProjectorOpts, TrackProjection, project_track};
use crate::render::backend::FrameRGBA;
use crate::render::compositor::FrameCompositor;
use crate::render::text::TextPainter;
use crate::telemetry::{Telemetry, TelemetrySample};

/// Summary of a streamed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Frames the run was expected to produce.
    pub frames_total: u64,
    /// Frames fully written to the sink.
    pub frames_written: u64,
}

/// One overlay run: projected track, compositor and the telemetry it draws from.
///
/// Frame `i` shows retained sample `i`, i.e. telemetry row `trim + i`.
pub struct OverlaySession {
    cfg: OverlayConfig,
    telemetry: Telemetry,
    projection: TrackProjection,
    compositor: FrameCompositor,
}

impl OverlaySession {
    /// Validate `cfg`, project the track and pre-render the track layer.
    pub fn new(
        cfg: OverlayConfig,
        telemetry: Telemetry,
        text: Box<dyn TextPainter>,
    ) -> OverlayResult<Self> {
        cfg.validate()?;
        if telemetry.is_empty() {
            return Err(OverlayError::telemetry("no telemetry samples"));
        }
        let projection = project_track(
            telemetry.latitude(),
            telemetry.longitude(),
            &ProjectorOpts::from_config(&cfg),
        )?;
        let compositor = FrameCompositor::new(&cfg, &projection, text)?;
        Ok(Self {
            cfg,
            telemetry,
            projection,
            compositor,
        })
    }

    /// Run configuration.
    pub fn config(&self) -> &OverlayConfig {
        &self.cfg
    }

    /// Projected track.
    pub fn projection(&self) -> &TrackProjection {
        &self.projection
    }

    /// Frame compositor.
    pub fn compositor(&self) -> &FrameCompositor {
        &self.compositor
    }

    /// Number of frames a full run produces.
    pub fn frame_count(&self) -> u64 {
        self.projection.len() as u64
    }

    /// Telemetry sample shown on frame `idx`.
    pub fn sample_for(&self, idx: FrameIndex) -> OverlayResult<TelemetrySample> {
        let retained = self.projection.retained();
        usize::try_from(idx.0)
            .ok()
            .map(|i| retained.start + i)
            .filter(|i| retained.contains(i))
            .and_then(|i| self.telemetry.sample(i))
            .ok_or_else(|| {
                OverlayError::validation(format!(
                    "frame {} out of range (run has {} frames)",
                    idx.0,
                    self.frame_count()
                ))
            })
    }

    /// Compose a single frame.
    pub fn render_frame(&mut self, idx: FrameIndex) -> OverlayResult<FrameRGBA> {
        let sample = self.sample_for(idx)?;
        self.compositor.compose(idx, &sample)
    }

    /// Compose every frame in order and stream it into `sink`.
    ///
    /// Aborts at the first failure: the frame after a failed write is never composed. When
    /// `cancel` is set between frames, the sink is ended so the encoder can finalize, and
    /// [`OverlayError::Interrupted`] is returned.
    #[tracing::instrument(skip_all, fields(frames = self.frame_count()))]
    pub fn stream(
        &mut self,
        sink: &mut dyn FrameSink,
        cancel: Option<&AtomicBool>,
    ) -> OverlayResult<StreamStats> {
        let total = self.frame_count();
        let fps = self.cfg.frame_rate()?;
        tracing::info!(
            width = self.cfg.width,
            height = self.cfg.height,
            fps = fps.as_f64(),
            "starting stream"
        );
        sink.begin(SinkConfig {
            width: self.cfg.width,
            height: self.cfg.height,
            fps,
        })?;

        let mut last_pct = None;
        for i in 0..total {
            if cancel.is_some_and(|c| c.load(Ordering::SeqCst)) {
                tracing::warn!(delivered = i, "interrupted, finalizing encoder");
                if let Err(e) = sink.end() {
                    tracing::warn!(error = %e, "encoder shutdown after interrupt failed");
                }
                return Err(OverlayError::Interrupted { delivered: i });
            }

            let idx = FrameIndex(i);
            let frame = self.render_frame(idx)?;
            sink.push_frame(idx, &frame).map_err(|e| e.at_frame(i, i))?;

            let pct = (i + 1) * 100 / total;
            if last_pct != Some(pct) {
                last_pct = Some(pct);
                tracing::info!(progress = pct, frame = i, "streaming");
            }
        }

        sink.end().map_err(|e| match e {
            OverlayError::Stream { message, .. } => OverlayError::Stream {
                index: None,
                delivered: total,
                message,
            },
            other => other,
        })?;

        tracing::info!(
            frames = total,
            secs = fps.frames_to_secs(total),
            "overlay complete"
        );
        Ok(StreamStats {
            frames_total: total,
            frames_written: total,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/overlay_session.rs"]
mod tests;
