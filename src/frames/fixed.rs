//! In-memory frame source

use super::{FrameError, FrameSource, Locator};
use async_trait::async_trait;

/// Frame source backed by a fixed list of locators
#[allow(dead_code)] // Used by tests; production runs against FrameX
#[derive(Debug, Clone, Default)]
pub struct StaticFrames {
    frames: Vec<Locator>,
}

#[allow(dead_code)]
impl StaticFrames {
    pub fn new(frames: Vec<Locator>) -> Self {
        Self { frames }
    }

    /// `count` synthetic URL frames, `{base}/{index}`
    pub fn numbered(base: &str, count: u64) -> Self {
        let base = base.trim_end_matches('/');
        Self::new(
            (0..count)
                .map(|i| Locator::Url(format!("{base}/{i}")))
                .collect(),
        )
    }
}

#[async_trait]
impl FrameSource for StaticFrames {
    async fn count(&self) -> Result<u64, FrameError> {
        Ok(self.frames.len() as u64)
    }

    fn frame(&self, index: u64) -> Result<Locator, FrameError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.frames.get(i))
            .cloned()
            .ok_or(FrameError::IndexOutOfRange {
                index,
                count: self.frames.len() as u64,
            })
    }
}
