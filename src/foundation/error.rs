/// Convenience result type used across the overlay pipeline.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Top-level error taxonomy. Every variant except row-local parse failures (which the loader
/// absorbs) aborts the run.
#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    /// Invalid configuration or a violated boundary contract (frame size, fps, ordering).
    #[error("validation error: {0}")]
    Validation(String),

    /// Telemetry could not be loaded or contained no usable rows.
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// The track could not be projected (too few samples, degenerate extent).
    #[error("projection error: {0}")]
    Projection(String),

    /// Rasterization failed (missing font, unusable canvas).
    #[error("render error: {0}")]
    Render(String),

    /// The encoder sink failed to start, broke mid-stream or exited unsuccessfully.
    #[error("stream error{}: {message} ({delivered} frames delivered)", fmt_index(.index))]
    Stream {
        /// Frame index being written when the failure happened, if any.
        index: Option<u64>,
        /// Number of frames completely written before the failure.
        delivered: u64,
        /// Human readable cause.
        message: String,
    },

    /// The run was interrupted by the user after the encoder was shut down.
    #[error("interrupted after {delivered} frames")]
    Interrupted {
        /// Number of frames completely written before the interruption.
        delivered: u64,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn fmt_index(index: &Option<u64>) -> String {
    match index {
        Some(i) => format!(" at frame {i}"),
        None => String::new(),
    }
}

impl OverlayError {
    /// Build a [`OverlayError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`OverlayError::Telemetry`] value.
    pub fn telemetry(msg: impl Into<String>) -> Self {
        Self::Telemetry(msg.into())
    }

    /// Build a [`OverlayError::Projection`] value.
    pub fn projection(msg: impl Into<String>) -> Self {
        Self::Projection(msg.into())
    }

    /// Build a [`OverlayError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`OverlayError::Stream`] value that is not tied to a particular frame.
    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream {
            index: None,
            delivered: 0,
            message: msg.into(),
        }
    }

    /// Attach the in-flight frame index to an error raised while handing a frame to a sink.
    ///
    /// Stream failures also record the delivered count; sink contract violations get the index
    /// prefixed to their message. Other errors are returned unchanged.
    pub fn at_frame(self, idx: u64, delivered: u64) -> Self {
        match self {
            Self::Stream { message, .. } => Self::Stream {
                index: Some(idx),
                delivered,
                message,
            },
            Self::Validation(msg) => Self::Validation(format!("frame {idx}: {msg}")),
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
