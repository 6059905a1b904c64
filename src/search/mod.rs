pub mod categorize;
pub mod extract;
pub mod gemini;
pub mod platform;
pub mod probe;
pub mod prompt;
pub mod rules;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, info};

use crate::config::ApiKeys;
use crate::error::MediatorError;
use crate::models::{ImageFile, PropertyDetails, SearchResponse};

pub use gemini::GeminiSearchClient;
pub use probe::{OEmbedProbe, VideoProbe};

/// Structured source reference returned next to the model text
#[derive(Debug, Clone, PartialEq)]
pub struct GroundingCitation {
    pub uri: String,
    pub title: Option<String>,
}

#[derive(Debug)]
pub struct GroundedSearchRequest<'a> {
    pub prompt: String,
    pub images: Vec<&'a ImageFile>,
}

#[derive(Debug, Clone, Default)]
pub struct GroundedSearchReply {
    pub text: String,
    pub citations: Vec<GroundingCitation>,
}

/// External generative model with web-grounded search
#[async_trait]
pub trait GenerativeSearch: Send + Sync {
    async fn search(&self, api_key: &str, request: &GroundedSearchRequest<'_>) -> Result<GroundedSearchReply>;

    fn backend_name(&self) -> &'static str;
}

/// Optional photos sent along with a search
#[derive(Debug, Clone, Default)]
pub struct SearchImages {
    pub front: Option<ImageFile>,
    pub back: Option<ImageFile>,
}

impl SearchImages {
    fn attached(&self) -> Vec<&ImageFile> {
        self.front.iter().chain(self.back.iter()).collect()
    }
}

pub struct VideoSearchMediator {
    keys: ApiKeys,
    backend: Box<dyn GenerativeSearch>,
    probe: Box<dyn VideoProbe>,
    probe_timeout: Duration,
}

impl VideoSearchMediator {
    pub fn new(
        keys: ApiKeys,
        backend: Box<dyn GenerativeSearch>,
        probe: Box<dyn VideoProbe>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            keys,
            backend,
            probe,
            probe_timeout,
        }
    }

    /// Search the web for videos of a property
    pub async fn search(
        &self,
        details: &PropertyDetails,
        images: &SearchImages,
    ) -> Result<SearchResponse, MediatorError> {
        details.validate()?;
        let api_key = self
            .keys
            .search_api_key
            .as_deref()
            .ok_or(MediatorError::MissingCredential("search"))?;

        let images = images.attached();
        let image_bytes: usize = images.iter().map(|image| image.bytes.len()).sum();
        let request = GroundedSearchRequest {
            prompt: prompt::build_prompt(details, images.len()),
            images,
        };

        info!(
            address = %details.display_address(),
            mls = %details.mls_number.trim(),
            backend = self.backend.backend_name(),
            images = request.images.len(),
            image_bytes,
            "searching for property videos"
        );
        let reply = self.backend.search(api_key, &request).await.map_err(|err| {
            error!(error = ?err, "video search failed");
            MediatorError::Search(err)
        })?;

        let candidates = extract::collect_candidates(&reply.citations, &reply.text);
        let found = candidates.len();
        let accepted: Vec<_> = candidates.into_iter().filter(rules::is_accepted).collect();
        let categorized = categorize::categorize(accepted);
        let videos =
            probe::retain_available(categorized, self.probe.as_ref(), self.probe_timeout).await;

        info!(candidates = found, kept = videos.len(), "video search finished");
        Ok(SearchResponse::new(reply.text, videos))
    }
}
