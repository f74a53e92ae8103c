//! FrameX HTTP frame source
//!
//! `GET {api}/api/video/{name}` answers `{"frames": <int>}`; frame images live
//! at `{api}/api/video/{name}/frame/{index}/` and are fetched by the chat
//! service itself, so building a locator never touches the network.

use super::{FrameError, FrameSource, Locator};
use crate::config::FrameXConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::OnceCell;

/// Frame source backed by the FrameX video API
pub struct FrameXSource {
    client: Client,
    video_name: String,
    video_url: String,
    /// Set once on first successful resolution, never changes afterwards
    count: OnceCell<u64>,
}

impl FrameXSource {
    pub fn new(config: &FrameXConfig) -> Result<Self, FrameError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FrameError::network(format!("Failed to create HTTP client: {e}")))?;

        let video_url = format!(
            "{}/api/video/{}",
            config.api_domain.trim_end_matches('/'),
            urlencoding::encode(&config.video_name)
        );

        Ok(Self {
            client,
            video_name: config.video_name.clone(),
            video_url,
            count: OnceCell::new(),
        })
    }

    async fn resolve_count(&self) -> Result<u64, FrameError> {
        tracing::debug!(url = %self.video_url, "Resolving frame count");

        let response = self.client.get(&self.video_url).send().await.map_err(|e| {
            if e.is_timeout() {
                FrameError::timeout(format!("Request timeout: {e}"))
            } else {
                FrameError::network(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FrameError::timeout(format!("Timed out reading response: {e}"))
            } else {
                FrameError::network(format!("Failed to read response: {e}"))
            }
        })?;

        if !status.is_success() {
            return Err(FrameError::status(
                status.as_u16(),
                format!("HTTP {status}: {body}"),
            ));
        }

        let info: VideoInfo = serde_json::from_str(&body).map_err(|e| {
            FrameError::malformed(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        tracing::info!(video = %self.video_name, frames = info.frames, "Frame count resolved");
        Ok(info.frames)
    }
}

#[async_trait]
impl FrameSource for FrameXSource {
    async fn count(&self) -> Result<u64, FrameError> {
        // Concurrent first callers wait on the same in-flight resolution.
        // A failure leaves the cell empty so a later call can try again.
        self.count
            .get_or_try_init(|| self.resolve_count())
            .await
            .copied()
    }

    fn frame(&self, index: u64) -> Result<Locator, FrameError> {
        if let Some(&count) = self.count.get() {
            if index >= count {
                return Err(FrameError::IndexOutOfRange { index, count });
            }
        }
        Ok(Locator::Url(format!("{}/frame/{index}/", self.video_url)))
    }
}

#[derive(Debug, Deserialize)]
struct VideoInfo {
    frames: u64,
}
