use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::models::VideoSearchResult;
use crate::search::platform::VideoPlatform;

const OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

/// Raw outcome of a metadata probe
#[derive(Debug, Clone)]
pub struct ProbeReply {
    pub status: u16,
    /// Parsed JSON body, `None` when it was not valid JSON
    pub body: Option<serde_json::Value>,
}

/// Out-of-band check that a video link still resolves to playable content
#[async_trait]
pub trait VideoProbe: Send + Sync {
    async fn probe(&self, video_url: &str) -> Result<ProbeReply>;
}

/// Probe backed by the YouTube oEmbed endpoint
pub struct OEmbedProbe {
    client: Client,
    endpoint: String,
}

impl OEmbedProbe {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: OEMBED_ENDPOINT.to_string(),
        }
    }
}

#[async_trait]
impl VideoProbe for OEmbedProbe {
    async fn probe(&self, video_url: &str) -> Result<ProbeReply> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", video_url), ("format", "json")])
            .send()
            .await
            .context("Failed to reach oEmbed endpoint")?;

        let status = response.status().as_u16();
        let text = response.text().await.context("Failed to read oEmbed body")?;
        let body = serde_json::from_str(&text).ok();
        Ok(ProbeReply { status, body })
    }
}

/// Only YouTube links are probed; everything else is assumed available
pub fn needs_probe(video: &VideoSearchResult) -> bool {
    Url::parse(&video.url)
        .ok()
        .and_then(|url| VideoPlatform::detect(&url))
        == Some(VideoPlatform::YouTube)
}

pub fn is_available(outcome: &Result<ProbeReply>) -> bool {
    match outcome {
        Ok(reply) => {
            (200..300).contains(&reply.status)
                && matches!(reply.body, Some(serde_json::Value::Object(_)))
        }
        Err(_) => false,
    }
}

/// Drop probed videos that are no longer available.
///
/// All probes run concurrently and each one is bounded by `timeout`.
pub async fn retain_available(
    videos: Vec<VideoSearchResult>,
    probe: &dyn VideoProbe,
    timeout: Duration,
) -> Vec<VideoSearchResult> {
    let checks = videos.iter().map(|video| async move {
        if !needs_probe(video) {
            return true;
        }
        let outcome = match tokio::time::timeout(timeout, probe.probe(&video.url)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(anyhow::anyhow!("probe timed out after {timeout:?}")),
        };
        let available = is_available(&outcome);
        match &outcome {
            Ok(reply) if !available => {
                debug!(url = %video.url, status = reply.status, "video unavailable");
            }
            Err(err) => warn!(url = %video.url, error = %err, "video probe failed"),
            _ => {}
        }
        available
    });
    let verdicts = join_all(checks).await;

    videos
        .into_iter()
        .zip(verdicts)
        .filter_map(|(video, available)| available.then_some(video))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    enum Scripted {
        Status(u16),
        Malformed,
        Fail,
        Hang,
    }

    struct ScriptedProbe {
        replies: HashMap<&'static str, Scripted>,
    }

    #[async_trait]
    impl VideoProbe for ScriptedProbe {
        async fn probe(&self, video_url: &str) -> Result<ProbeReply> {
            match self.replies.get(video_url) {
                Some(Scripted::Status(status)) => Ok(ProbeReply {
                    status: *status,
                    body: Some(json!({ "title": "Tour" })),
                }),
                Some(Scripted::Malformed) => Ok(ProbeReply {
                    status: 200,
                    body: None,
                }),
                Some(Scripted::Fail) | None => anyhow::bail!("connection reset"),
                Some(Scripted::Hang) => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    anyhow::bail!("unreachable")
                }
            }
        }
    }

    fn video(url: &str) -> VideoSearchResult {
        VideoSearchResult {
            title: "Tour".to_string(),
            url: url.to_string(),
            source: "youtube.com".to_string(),
        }
    }

    #[test]
    fn availability_rules() {
        let ok = Ok(ProbeReply { status: 200, body: Some(json!({})) });
        assert!(is_available(&ok));
        for status in [401, 403, 404, 500] {
            let reply = Ok(ProbeReply { status, body: Some(json!({})) });
            assert!(!is_available(&reply));
        }
        let malformed = Ok(ProbeReply { status: 200, body: Some(json!("Not Found")) });
        assert!(!is_available(&malformed));
        assert!(!is_available(&Err(anyhow::anyhow!("boom"))));
    }

    #[tokio::test]
    async fn drops_unavailable_youtube_links_only() {
        let probe = ScriptedProbe {
            replies: HashMap::from([
                ("https://youtube.com/watch?v=ok", Scripted::Status(200)),
                ("https://youtube.com/watch?v=gone", Scripted::Status(404)),
                ("https://youtube.com/watch?v=private", Scripted::Status(403)),
                ("https://youtube.com/watch?v=err", Scripted::Fail),
                ("https://youtube.com/watch?v=bad", Scripted::Malformed),
            ]),
        };
        let videos = vec![
            video("https://youtube.com/watch?v=ok"),
            video("https://youtube.com/watch?v=gone"),
            video("https://vimeo.com/12345"),
            video("https://youtube.com/watch?v=private"),
            video("https://youtube.com/watch?v=err"),
            video("https://youtube.com/watch?v=bad"),
        ];

        let kept = retain_available(videos, &probe, Duration::from_secs(1)).await;
        let urls: Vec<&str> = kept.iter().map(|v| v.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://youtube.com/watch?v=ok", "https://vimeo.com/12345"]
        );
    }

    #[tokio::test]
    async fn hanging_probe_is_bounded_by_timeout() {
        let probe = ScriptedProbe {
            replies: HashMap::from([
                ("https://youtube.com/watch?v=slow", Scripted::Hang),
                ("https://youtube.com/watch?v=ok", Scripted::Status(200)),
            ]),
        };
        let videos = vec![
            video("https://youtube.com/watch?v=slow"),
            video("https://youtube.com/watch?v=ok"),
        ];

        let kept = retain_available(videos, &probe, Duration::from_millis(50)).await;
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "https://youtube.com/watch?v=ok");
    }
}
