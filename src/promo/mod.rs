pub mod veo;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use url::Url;

use crate::config::ApiKeys;
use crate::error::MediatorError;

pub use veo::VeoClient;

pub const PROMO_PROMPT: &str = "A bright, upbeat promotional video for a real estate tool. \
A real estate agent stands in front of a modern home, types an address and MLS number into \
a laptop, and a grid of property video tours and walkthroughs appears on screen. \
Smooth camera moves, warm natural light, clean modern interface overlays.";

#[derive(Debug, Clone, PartialEq)]
pub struct VideoGenerationRequest {
    pub prompt: String,
    pub number_of_videos: u32,
    pub resolution: String,
    pub aspect_ratio: String,
}

impl VideoGenerationRequest {
    pub fn promotional() -> Self {
        Self {
            prompt: PROMO_PROMPT.to_string(),
            number_of_videos: 1,
            resolution: "720p".to_string(),
            aspect_ratio: "16:9".to_string(),
        }
    }
}

/// Handle of a long-running generation
#[derive(Debug, Clone, PartialEq)]
pub struct OperationHandle {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationStatus {
    pub done: bool,
    pub video_uri: Option<String>,
}

/// External long-running video generation service
#[async_trait]
pub trait VideoGenerationBackend: Send + Sync {
    async fn start(&self, api_key: &str, request: &VideoGenerationRequest) -> Result<OperationHandle>;

    async fn status(&self, api_key: &str, operation: &OperationHandle) -> Result<OperationStatus>;
}

#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_duration: Duration,
}

pub struct PromoVideoMediator {
    keys: ApiKeys,
    backend: Box<dyn VideoGenerationBackend>,
    policy: PollPolicy,
}

impl PromoVideoMediator {
    pub fn new(keys: ApiKeys, backend: Box<dyn VideoGenerationBackend>, policy: PollPolicy) -> Self {
        Self {
            keys,
            backend,
            policy,
        }
    }

    /// Generate the promotional video and return a URL that can be fetched directly.
    ///
    /// Polling stops with [`MediatorError::PollTimeout`] once `max_duration` has
    /// elapsed, or with [`MediatorError::Cancelled`] when `cancel` fires.
    pub async fn generate(&self, cancel: &CancellationToken) -> Result<String, MediatorError> {
        let api_key = self
            .keys
            .video_api_key
            .as_deref()
            .ok_or(MediatorError::MissingCredential("video"))?;
        if cancel.is_cancelled() {
            return Err(MediatorError::Cancelled);
        }

        let request = VideoGenerationRequest::promotional();
        let operation = self
            .backend
            .start(api_key, &request)
            .await
            .map_err(generation_failed)?;
        info!(operation = %operation.name, "video generation started");

        let started = Instant::now();
        let mut status = OperationStatus::default();
        while !status.done {
            let remaining = self.policy.max_duration.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                return Err(MediatorError::PollTimeout(self.policy.max_duration));
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(MediatorError::Cancelled),
                _ = tokio::time::sleep(self.policy.interval.min(remaining)) => {}
            }

            let remaining = self.policy.max_duration.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                return Err(MediatorError::PollTimeout(self.policy.max_duration));
            }
            let query = tokio::time::timeout(remaining, self.backend.status(api_key, &operation));
            status = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(MediatorError::Cancelled),
                result = query => match result {
                    Ok(result) => result.map_err(generation_failed)?,
                    Err(_) => return Err(MediatorError::PollTimeout(self.policy.max_duration)),
                },
            };
            debug!(operation = %operation.name, done = status.done, "polled video generation");
        }

        let uri = status.video_uri.ok_or(MediatorError::MissingVideoUri)?;
        info!(operation = %operation.name, "video generation finished");
        with_api_key(&uri, api_key)
    }
}

fn generation_failed(err: anyhow::Error) -> MediatorError {
    error!(error = ?err, "video generation failed");
    MediatorError::VideoGeneration(err)
}

/// Append the access key so the video can be downloaded without extra headers
fn with_api_key(uri: &str, api_key: &str) -> Result<String, MediatorError> {
    let mut url = Url::parse(uri).map_err(|err| {
        MediatorError::VideoGeneration(anyhow::anyhow!("invalid video location {uri}: {err}"))
    })?;
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url.to_string())
}
