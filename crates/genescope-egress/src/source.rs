//! Source trait implemented by every adapter

use crate::{FetchClient, Result};
use async_trait::async_trait;
use genescope_core::{Query, SourceName, SourcePayload};

#[async_trait]
pub trait Source: Send + Sync {
    /// Key under which this source's result is stored
    fn name(&self) -> SourceName;

    /// Query the upstream service and normalize its answer
    ///
    /// A source with no data for the query returns an empty payload, not an error.
    async fn search(&self, client: &FetchClient, query: &Query) -> Result<SourcePayload>;
}

/// Append percent-encoded path segments to a base URL
pub(crate) fn endpoint_url(base_url: &str, segments: &[&str]) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(base_url).map_err(|e| {
        crate::EgressError::ConfigError(format!("Invalid base URL '{}': {}", base_url, e))
    })?;
    url.path_segments_mut()
        .map_err(|_| {
            crate::EgressError::ConfigError(format!("Base URL '{}' cannot take a path", base_url))
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
