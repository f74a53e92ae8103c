//! Frame source error types

use thiserror::Error;

/// Errors raised by a frame source
#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame count could not be determined
    #[error("frame count resolution failed: {message}")]
    Resolution {
        kind: ResolutionKind,
        message: String,
    },

    /// Probe outside `0..count`; a bounds bug, not a user error
    #[error("frame index {index} out of range (count {count})")]
    IndexOutOfRange { index: u64, count: u64 },
}

impl FrameError {
    pub fn resolution(kind: ResolutionKind, message: impl Into<String>) -> Self {
        FrameError::Resolution {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::resolution(ResolutionKind::Timeout, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::resolution(ResolutionKind::Network, message)
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::resolution(ResolutionKind::Status(code), message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::resolution(ResolutionKind::Malformed, message)
    }

    /// Classification of a resolution failure, `None` for range errors
    pub fn resolution_kind(&self) -> Option<ResolutionKind> {
        match self {
            FrameError::Resolution { kind, .. } => Some(*kind),
            FrameError::IndexOutOfRange { .. } => None,
        }
    }
}

/// Why a frame count resolution failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    /// Request exceeded the configured timeout
    Timeout,
    /// Connection or transport failure
    Network,
    /// Non-2xx response
    Status(u16),
    /// Body was not `{"frames": <unsigned int>}`
    Malformed,
}
