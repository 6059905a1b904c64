use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Credentials handed to the mediators at construction
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub search_api_key: Option<String>,
    pub video_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub keys: ApiKeys,
    pub api_base: String,
    pub search_model: String,
    pub video_model: String,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    pub poll_interval: Duration,
    pub poll_max: Duration,
    pub history_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid integer for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let search_api_key = read_optional_string("TOUR_SCOUT_SEARCH_API_KEY");
        let video_api_key =
            read_optional_string("TOUR_SCOUT_VIDEO_API_KEY").or_else(|| search_api_key.clone());

        let api_base = read_string(
            "TOUR_SCOUT_API_BASE",
            "https://generativelanguage.googleapis.com/v1beta",
        );
        if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
            return Err(ConfigError::InvalidValue("TOUR_SCOUT_API_BASE", api_base));
        }
        let api_base = api_base.trim_end_matches('/').to_string();

        let search_model = read_string("TOUR_SCOUT_SEARCH_MODEL", "gemini-2.5-flash");
        let video_model = read_string("TOUR_SCOUT_VIDEO_MODEL", "veo-3.1-fast-generate-preview");
        let request_timeout_secs = read_u64("TOUR_SCOUT_REQUEST_TIMEOUT_SECS", 60)?;
        let probe_timeout_secs = read_u64("TOUR_SCOUT_PROBE_TIMEOUT_SECS", 5)?;
        let poll_interval_secs = read_u64("TOUR_SCOUT_POLL_INTERVAL_SECS", 10)?;
        let poll_max_secs = read_u64("TOUR_SCOUT_POLL_MAX_SECS", 600)?;
        if poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "TOUR_SCOUT_POLL_INTERVAL_SECS",
                "0".to_string(),
            ));
        }
        let history_dir = PathBuf::from(read_string("TOUR_SCOUT_HISTORY_DIR", "./data/history"));

        Ok(Self {
            keys: ApiKeys {
                search_api_key,
                video_api_key,
            },
            api_base,
            search_model,
            video_model,
            request_timeout: Duration::from_secs(request_timeout_secs),
            probe_timeout: Duration::from_secs(probe_timeout_secs),
            poll_interval: Duration::from_secs(poll_interval_secs),
            poll_max: Duration::from_secs(poll_max_secs),
            history_dir,
        })
    }
}

fn read_string(key: &'static str, default: &'static str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn read_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse_u64(key, raw)
}

fn parse_u64(key: &'static str, raw: String) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber(key, raw))
}

fn read_optional_string(key: &'static str) -> Option<String> {
    let value = std::env::var(key).unwrap_or_default();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
