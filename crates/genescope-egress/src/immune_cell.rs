//! DICE (Database of Immune Cell Expression) connector
//!
//! Gene pages: https://dice-database.org/genes/<gene>
//!
//! A found gene comes back as `200 text/csv`. An unknown gene comes back as
//! `500 text/html`, which this adapter reports as an empty result rather
//! than a failure.

use crate::source::endpoint_url;
use crate::{FetchClient, FetchError, Result, Source};
use async_trait::async_trait;
use genescope_core::{Query, SourceName, SourcePayload};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, error, info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://dice-database.org";

/// Whether an error response is DICE's way of saying "no such gene"
pub fn looks_like_not_found_response(status: u16, content_type: Option<&str>) -> bool {
    status == StatusCode::INTERNAL_SERVER_ERROR.as_u16()
        && content_type.is_some_and(|ct| media_type_is(ct, "text/html"))
}

fn media_type_is(content_type: &str, expected: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(expected))
}

/// DICE adapter
#[derive(Debug, Clone)]
pub struct ImmuneCellSource {
    base_url: String,
}

impl ImmuneCellSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for ImmuneCellSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl Source for ImmuneCellSource {
    fn name(&self) -> SourceName {
        SourceName::ImmuneCellExpression
    }

    #[instrument(skip(self, client), fields(query = %query))]
    async fn search(&self, client: &FetchClient, query: &Query) -> Result<SourcePayload> {
        let url = endpoint_url(
            &self.base_url,
            &["downloads", "genes", "expression", query.as_str()],
        )?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/csv"));

        match client.get(url.as_str(), &[], &headers).await {
            Ok(response) => {
                let is_csv = response
                    .content_type()
                    .is_some_and(|ct| media_type_is(ct, "text/csv"));
                if response.status() == StatusCode::OK && is_csv {
                    let body = response.bytes().await.map_err(|e| {
                        error!("Failed to read CSV body from {}: {}", url, e);
                        e
                    })?;
                    debug!("DICE returned {} bytes of CSV", body.len());
                    Ok(SourcePayload::Csv(body))
                } else {
                    debug!(
                        "DICE answered {} with content type {:?}, treating as no data",
                        response.status(),
                        response.content_type()
                    );
                    Ok(SourcePayload::Empty)
                }
            }
            Err(FetchError::Response {
                status,
                content_type,
                ..
            }) if looks_like_not_found_response(status, content_type.as_deref()) => {
                info!("Gene '{}' not found on DICE", query);
                Ok(SourcePayload::Empty)
            }
            Err(e) => {
                error!("Failed to fetch data from {}: {}", url, e);
                Err(e.into())
            }
        }
    }
}
