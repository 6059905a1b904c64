use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MediatorError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("no {0} API key configured")]
    MissingCredential(&'static str),
    #[error("failed to search for videos, please try again")]
    Search(#[source] anyhow::Error),
    #[error("failed to generate the video, please try again")]
    VideoGeneration(#[source] anyhow::Error),
    #[error("video generation finished without a video location")]
    MissingVideoUri,
    #[error("video generation did not finish within {0:?}")]
    PollTimeout(Duration),
    #[error("video generation was cancelled")]
    Cancelled,
    #[error("saved search {0} not found")]
    NotFound(Uuid),
    #[error("only the owner can change saved search {0}")]
    NotOwner(Uuid),
    #[error("invalid title: {0}")]
    InvalidTitle(String),
    #[error("failed to update saved searches: {0}")]
    Persistence(#[source] anyhow::Error),
}
