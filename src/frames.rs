//! Frame sources
//!
//! A frame source is an ordered, indexable sequence of video frames. The
//! bisection only needs two things from it: how many frames there are, and
//! something the messaging gateway can display for a given index.

mod error;
mod fixed;
mod framex;

pub use error::FrameError;
#[allow(unused_imports)] // Inspected by callers matching on failures
pub use error::ResolutionKind;
#[allow(unused_imports)] // Alternate source for tests and embedders
pub use fixed::StaticFrames;
pub use framex::FrameXSource;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Reference to a single frame, in a form the messaging gateway can display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// HTTP URL the chat service fetches the image from
    Url(String),
    /// Opaque handle to media already uploaded to the chat service
    #[allow(dead_code)] // Produced by StaticFrames only
    FileId(String),
}

impl Locator {
    pub fn as_str(&self) -> &str {
        match self {
            Locator::Url(url) => url,
            Locator::FileId(id) => id,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lazy indexed view over an ordered sequence of frames
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Total number of addressable frames.
    ///
    /// May hit the network the first time; implementations memoise the value.
    async fn count(&self) -> Result<u64, FrameError>;

    /// Locator for the frame at `index`. Never performs I/O.
    fn frame(&self, index: u64) -> Result<Locator, FrameError>;
}

#[async_trait]
impl<T: FrameSource + ?Sized> FrameSource for Arc<T> {
    async fn count(&self) -> Result<u64, FrameError> {
        (**self).count().await
    }

    fn frame(&self, index: u64) -> Result<Locator, FrameError> {
        (**self).frame(index)
    }
}
