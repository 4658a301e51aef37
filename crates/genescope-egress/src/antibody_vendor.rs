//! BenchSci connector
//!
//! The vendor API is not integrated. The adapter still takes part in every
//! search so the aggregator treats it like any other source; it always
//! reports no data and never touches the network.

use crate::{FetchClient, Result, Source};
use async_trait::async_trait;
use genescope_core::{Query, SourceName, SourcePayload};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://benchsci.com";

/// BenchSci adapter (stub)
#[derive(Debug, Clone)]
pub struct AntibodyVendorSource {
    base_url: String,
}

impl AntibodyVendorSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for AntibodyVendorSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl Source for AntibodyVendorSource {
    fn name(&self) -> SourceName {
        SourceName::AntibodyVendor
    }

    async fn search(&self, _client: &FetchClient, query: &Query) -> Result<SourcePayload> {
        debug!(
            "BenchSci at {} is not integrated, returning no data for '{}'",
            self.base_url, query
        );
        Ok(SourcePayload::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HttpClientConfig;

    #[tokio::test]
    async fn test_stub_returns_empty_payload() {
        let client = FetchClient::new(&HttpClientConfig::default()).unwrap();
        // Unroutable base URL: the stub must not reach the network
        let source = AntibodyVendorSource::new("http://127.0.0.1:1");
        let payload = source
            .search(&client, &Query::new("IL2RA").unwrap())
            .await
            .unwrap();

        assert_eq!(source.name(), SourceName::AntibodyVendor);
        assert!(payload.is_empty());
    }
}
