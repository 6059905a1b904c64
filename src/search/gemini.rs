use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::ImageFile;
use crate::search::{GenerativeSearch, GroundedSearchReply, GroundedSearchRequest, GroundingCitation};

/// Gemini `generateContent` with Google Search grounding
pub struct GeminiSearchClient {
    client: Client,
    api_base: String,
    model: String,
}

impl GeminiSearchClient {
    pub fn new(client: Client, api_base: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Inline { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseCandidate {
    content: Option<ResponseContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

fn build_body<'a>(prompt: &'a str, images: &[&'a ImageFile]) -> GenerateContentRequest<'a> {
    let mut parts = vec![Part::Text { text: prompt }];
    parts.extend(images.iter().map(|image| Part::Inline {
        inline_data: InlineData {
            mime_type: &image.mime_type,
            data: &image.encoded,
        },
    }));

    GenerateContentRequest {
        contents: vec![Content { role: "user", parts }],
        tools: vec![Tool {
            google_search: GoogleSearch {},
        }],
    }
}

fn into_reply(response: GenerateContentResponse) -> Result<GroundedSearchReply> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .context("Model returned no candidates")?;

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let citations = candidate
        .grounding_metadata
        .map(|metadata| metadata.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .filter_map(|web| {
            web.uri.map(|uri| GroundingCitation {
                uri,
                title: web.title,
            })
        })
        .collect();

    Ok(GroundedSearchReply { text, citations })
}

#[async_trait]
impl GenerativeSearch for GeminiSearchClient {
    async fn search(&self, api_key: &str, request: &GroundedSearchRequest<'_>) -> Result<GroundedSearchReply> {
        let body = build_body(&request.prompt, &request.images);
        debug!(model = %self.model, images = request.images.len(), "sending grounded search request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to reach search model")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, "search model returned an error");
            anyhow::bail!("Search model returned {}: {}", status, truncate(&detail, 300));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse search model response")?;
        into_reply(parsed)
    }

    fn backend_name(&self) -> &'static str {
        "Gemini"
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
