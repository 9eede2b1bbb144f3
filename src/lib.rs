//! race-overlay turns a vehicle telemetry log into a transparent overlay video.
//!
//! The pipeline is strictly one-way:
//!
//! - Load a [`Telemetry`] log ([`telemetry::loader`])
//! - Project its track onto a north-up minimap ([`projection::track`])
//! - Compose one frame per retained sample ([`FrameCompositor`])
//! - Stream frames in order into a [`FrameSink`], usually [`FfmpegSink`]
//!
//! [`OverlaySession`] wires the stages together.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Run configuration and derived layout.
pub mod config;
/// Encoding sinks.
pub mod encode;
/// Geographic to pixel projection.
pub mod projection;
/// Frame rasterization.
pub mod render;
/// Session-oriented driver.
pub mod session;
/// Telemetry samples and log loading.
pub mod telemetry;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{OverlayError, OverlayResult};

pub use crate::config::{OverlayConfig, OverlayLayout};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::projection::ProjectedPoint;
pub use crate::projection::track::{ProjectorOpts, TrackProjection, project_track};
pub use crate::render::backend::FrameRGBA;
pub use crate::render::compositor::{FrameCompositor, TrackLayer};
pub use crate::render::text::{FontTextPainter, TextExtent, TextPainter};
pub use crate::session::overlay_session::{OverlaySession, StreamStats};
pub use crate::telemetry::{GeoBounds, Telemetry, TelemetrySample};
