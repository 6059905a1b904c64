use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::promo::{OperationHandle, OperationStatus, VideoGenerationBackend, VideoGenerationRequest};

/// Veo video generation over the Gemini REST API
pub struct VeoClient {
    client: Client,
    api_base: String,
    model: String,
}

impl VeoClient {
    pub fn new(client: Client, api_base: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            model: model.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<Instance<'a>>,
    parameters: Parameters<'a>,
}

#[derive(Debug, Serialize)]
struct Instance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters<'a> {
    sample_count: u32,
    resolution: &'a str,
    aspect_ratio: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Operation {
    name: Option<String>,
    #[serde(default)]
    done: bool,
    error: Option<OperationError>,
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: Option<GeneratedVideo>,
}

#[derive(Debug, Deserialize)]
struct GeneratedVideo {
    uri: Option<String>,
}

fn build_body(request: &VideoGenerationRequest) -> PredictRequest<'_> {
    PredictRequest {
        instances: vec![Instance {
            prompt: &request.prompt,
        }],
        parameters: Parameters {
            sample_count: request.number_of_videos,
            resolution: &request.resolution,
            aspect_ratio: &request.aspect_ratio,
        },
    }
}

fn into_status(operation: Operation) -> Result<OperationStatus> {
    if let Some(error) = operation.error {
        anyhow::bail!(
            "Video generation failed: {}",
            error.message.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    let video_uri = operation
        .response
        .and_then(|response| response.generate_video_response)
        .and_then(|response| response.generated_samples.into_iter().next())
        .and_then(|sample| sample.video)
        .and_then(|video| video.uri);

    Ok(OperationStatus {
        done: operation.done,
        video_uri,
    })
}

impl VeoClient {
    async fn fetch_operation(&self, request: reqwest::RequestBuilder, api_key: &str) -> Result<Operation> {
        let response = request
            .header("x-goog-api-key", api_key)
            .send()
            .await
            .context("Failed to reach video generation service")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, "video generation service returned an error");
            anyhow::bail!("Video generation service returned {}: {}", status, detail);
        }

        response
            .json()
            .await
            .context("Failed to parse video operation")
    }
}

#[async_trait]
impl VideoGenerationBackend for VeoClient {
    async fn start(&self, api_key: &str, request: &VideoGenerationRequest) -> Result<OperationHandle> {
        let url = format!("{}/models/{}:predictLongRunning", self.api_base, self.model);
        let builder = self.client.post(url).json(&build_body(request));
        let operation = self.fetch_operation(builder, api_key).await?;
        let name = operation.name.context("Operation has no name")?;
        Ok(OperationHandle { name })
    }

    async fn status(&self, api_key: &str, operation: &OperationHandle) -> Result<OperationStatus> {
        let url = format!("{}/{}", self.api_base, operation.name);
        let fetched = self.fetch_operation(self.client.get(url), api_key).await?;
        into_status(fetched)
    }
}
