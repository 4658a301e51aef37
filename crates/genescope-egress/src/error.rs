//! Error types for the egress layer

use genescope_core::{FailureKind, SourceFailure};
use thiserror::Error;

/// Failure of a single HTTP fetch
#[derive(Debug, Error)]
pub enum FetchError {
    /// The remote answered with a 4xx or 5xx status
    #[error("Response error: {url} returned status {status}")]
    Response {
        status: u16,
        url: String,
        content_type: Option<String>,
    },

    /// Transport-level failure: connection, DNS, TLS, timeout
    #[error("Client error while fetching {url}: {source}")]
    Client {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Anything else raised at the fetch boundary
    #[error("Unexpected error while fetching {url}: {source}")]
    Unexpected {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl FetchError {
    /// Classify a reqwest error raised while sending or reading a request
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_builder() || err.is_decode() {
            FetchError::Unexpected {
                url: url.to_string(),
                source: Box::new(err),
            }
        } else {
            FetchError::Client {
                url: url.to_string(),
                source: err,
            }
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FetchError::Response { url, .. }
            | FetchError::Client { url, .. }
            | FetchError::Unexpected { url, .. } => url,
        }
    }

    /// HTTP status, only present for response errors
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Response { status, .. } => FailureKind::Response { status: *status },
            FetchError::Client { .. } => FailureKind::Client,
            FetchError::Unexpected { .. } => FailureKind::Unexpected,
        }
    }
}

/// Failure of an adapter
#[derive(Debug, Error)]
pub enum EgressError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Gene annotation lookup failed: {message}")]
    ThirdPartyLookup {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl EgressError {
    pub fn kind(&self) -> FailureKind {
        match self {
            EgressError::Fetch(e) => e.kind(),
            EgressError::ThirdPartyLookup { .. } => FailureKind::ThirdPartyLookup,
            EgressError::ConfigError(_) => FailureKind::Internal,
        }
    }

    /// Capture this error as data for a search outcome
    pub fn to_failure(&self) -> SourceFailure {
        SourceFailure::new(self.kind(), self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EgressError>;
