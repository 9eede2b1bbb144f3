//! Encoding sinks.
//!
//! Sinks consume composed frames in sample order and are driven by `OverlaySession::stream`.

/// `ffmpeg`-based sink (alpha-preserving QuickTime output via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
