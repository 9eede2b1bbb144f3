//! CPU rasterization of overlay frames.
//!
//! Rendering is split into a static [`compositor::TrackLayer`], built once per run, and a
//! per-frame overlay (position marker, speed panel, G gauge) that is composited over a copy of it.

/// Frame buffers and `vello_cpu` plumbing.
pub mod backend;
/// Track layer and per-frame composition.
pub mod compositor;
/// Text measurement and painting.
pub mod text;
