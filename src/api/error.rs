use reqwest::header::InvalidHeaderValue;
use std::time::Duration;
use thiserror::Error;

use super::Endpoint;

/// Errors raised by [`PatientApiClient`](super::PatientApiClient).
///
/// HTTP error statuses are not errors here; they come back as a normal
/// response and are classified by the calling task.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("subscription key is not a valid header value")]
    InvalidSubscriptionKey(#[from] InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("{endpoint} failed after {elapsed:?}: {source}")]
    Transport {
        endpoint: Endpoint,
        elapsed: Duration,
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    /// Time spent before a transport failure, if the request was sent at all.
    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            ClientError::Transport { elapsed, .. } => Some(*elapsed),
            _ => None,
        }
    }
}
