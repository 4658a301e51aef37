//! Shared HTTP fetch client

use crate::{EgressError, FetchError, Result};
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Per-request timeout in seconds; expiry is reported as a client error
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Maximum number of idle connections per host
    pub pool_max_idle_per_host: usize,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            pool_max_idle_per_host: 8,
            user_agent: format!("GeneScope/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a configured HTTP client with connection pooling
pub fn create_client(config: &HttpClientConfig) -> Result<Client> {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| EgressError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// Headers sent with every request unless the caller overrides them
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Session shared by every adapter of one search
///
/// Wraps a pooled client; dropping it releases the pooled connections.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    timeout: Duration,
}

impl FetchClient {
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Issue one GET request
    ///
    /// Caller headers are merged over [`default_headers`]; caller values win.
    /// 2xx responses are returned as-is, 4xx/5xx become
    /// [`FetchError::Response`]. No retries happen here.
    #[instrument(skip(self, params, headers))]
    pub async fn get(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: &HeaderMap,
    ) -> std::result::Result<FetchResponse, FetchError> {
        let parsed = Url::parse(url).map_err(|e| {
            let err = FetchError::Unexpected {
                url: url.to_string(),
                source: Box::new(e),
            };
            error!("Unexpected error while preparing request to {}: {}", url, err);
            err
        })?;

        let mut merged = default_headers();
        for (name, value) in headers {
            merged.insert(name.clone(), value.clone());
        }

        debug!("GET {} params={:?}", url, params);

        let response = self
            .client
            .get(parsed)
            .query(params)
            .headers(merged)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                let err = FetchError::from_reqwest(url, e);
                log_failure(&err);
                err
            })?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let err = FetchError::Response {
                status: status.as_u16(),
                url: url.to_string(),
                content_type,
            };
            log_failure(&err);
            return Err(err);
        }

        info!("Fetched {}", response.url());

        Ok(FetchResponse {
            requested_url: url.to_string(),
            inner: response,
        })
    }
}

fn log_failure(err: &FetchError) {
    match err {
        FetchError::Response { status, url, .. } => {
            error!("Response error: {} returned status {}", url, status)
        }
        FetchError::Client { url, source } => {
            error!("Client error while fetching {}: {}", url, source)
        }
        FetchError::Unexpected { url, source } => {
            error!("Unexpected error while fetching {}: {}", url, source)
        }
    }
}

/// Successful (non-error status) response
#[derive(Debug)]
pub struct FetchResponse {
    requested_url: String,
    inner: reqwest::Response,
}

impl FetchResponse {
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// URL actually fetched, after redirects
    pub fn url(&self) -> &Url {
        self.inner.url()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.inner
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub async fn json<T: DeserializeOwned>(self) -> std::result::Result<T, FetchError> {
        let url = self.requested_url;
        self.inner.json::<T>().await.map_err(|e| {
            let err = FetchError::from_reqwest(&url, e);
            log_failure(&err);
            err
        })
    }

    pub async fn bytes(self) -> std::result::Result<Bytes, FetchError> {
        let url = self.requested_url;
        self.inner.bytes().await.map_err(|e| {
            let err = FetchError::from_reqwest(&url, e);
            log_failure(&err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.pool_max_idle_per_host, 8);
        assert!(config.user_agent.starts_with("GeneScope/"));
    }

    #[test]
    fn test_create_client() {
        let config = HttpClientConfig::default();
        assert!(create_client(&config).is_ok());
    }

    #[test]
    fn test_default_headers_are_json() {
        let headers = default_headers();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: HttpClientConfig = serde_json::from_str(r#"{"timeout_secs": 5}"#).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[tokio::test]
    async fn test_invalid_url_is_unexpected_error() {
        let client = FetchClient::new(&HttpClientConfig::default()).unwrap();
        let err = client
            .get("not a url", &[], &HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Unexpected { .. }));
        assert_eq!(err.url(), "not a url");
    }
}
