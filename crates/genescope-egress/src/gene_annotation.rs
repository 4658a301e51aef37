//! MyGene.info connector
//!
//! API docs: https://docs.mygene.info/en/latest/index.html
//!
//! Unlike the other adapters this one goes through a synchronous lookup
//! client. Each lookup runs on Tokio's blocking pool so it cannot stall the
//! sibling fetches of the same search.

use crate::{EgressError, FetchClient, HttpClientConfig, Result, Source};
use async_trait::async_trait;
use genescope_core::{Query, SourceName, SourcePayload};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://mygene.info";

/// Fields requested for every hit
pub const QUERY_FIELDS: &str = "symbol,taxid,name,alias,ensembl";

/// Comma-separated species filter
pub const TARGET_SPECIES: &str = "human";

/// Maximum number of hits returned per query
pub const MAX_HITS: usize = 100;

/// Body of a MyGene.info `/v3/query` response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub hits: Vec<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("lookup service returned status {0}")]
    Status(u16),
}

/// Synchronous gene annotation lookup
#[cfg_attr(test, mockall::automock)]
pub trait GeneAnnotationLookup: Send + Sync {
    fn query(
        &self,
        query: &str,
        fields: &str,
        species: &str,
        size: usize,
    ) -> std::result::Result<LookupResponse, LookupError>;
}

/// Blocking MyGene.info client
///
/// Must not be called from inside an async context; the adapter takes care
/// of moving calls onto the blocking pool.
#[derive(Debug, Clone)]
pub struct MyGeneInfoClient {
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl MyGeneInfoClient {
    pub fn new(base_url: impl Into<String>, config: &HttpClientConfig) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl GeneAnnotationLookup for MyGeneInfoClient {
    fn query(
        &self,
        query: &str,
        fields: &str,
        species: &str,
        size: usize,
    ) -> std::result::Result<LookupResponse, LookupError> {
        // Built per call: a blocking client must be created and dropped off the async runtime
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?;

        let size = size.to_string();
        let response = client
            .get(format!("{}/v3/query", self.base_url.trim_end_matches('/')))
            .query(&[
                ("q", query),
                ("fields", fields),
                ("species", species),
                ("size", size.as_str()),
            ])
            .send()?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        Ok(response.json::<LookupResponse>()?)
    }
}

/// Gene identifier used for ordering hits
fn gene_id(hit: &serde_json::Value) -> &str {
    hit.get("_id").and_then(|v| v.as_str()).unwrap_or_default()
}

/// Sort hits ascending by `_id` (NCBI Gene ID, occasionally an Ensembl ID)
pub fn sort_by_gene_id(hits: &mut [serde_json::Value]) {
    hits.sort_by(|a, b| gene_id(a).cmp(gene_id(b)));
}

/// MyGene.info adapter
pub struct GeneAnnotationSource {
    lookup: Arc<dyn GeneAnnotationLookup>,
}

impl GeneAnnotationSource {
    pub fn new(lookup: Arc<dyn GeneAnnotationLookup>) -> Self {
        Self { lookup }
    }

    /// Adapter backed by the real MyGene.info service
    pub fn mygene(base_url: impl Into<String>, config: &HttpClientConfig) -> Self {
        Self::new(Arc::new(MyGeneInfoClient::new(base_url, config)))
    }
}

#[async_trait]
impl Source for GeneAnnotationSource {
    fn name(&self) -> SourceName {
        SourceName::GeneAnnotation
    }

    #[instrument(skip(self, _client), fields(query = %query))]
    async fn search(&self, _client: &FetchClient, query: &Query) -> Result<SourcePayload> {
        info!("Querying MyGene.info for '{}'", query);

        let lookup = Arc::clone(&self.lookup);
        let q = query.as_str().to_string();
        let response = tokio::task::spawn_blocking(move || {
            lookup.query(&q, QUERY_FIELDS, TARGET_SPECIES, MAX_HITS)
        })
        .await
        .map_err(|e| {
            error!("MyGene.info lookup task failed: {}", e);
            EgressError::ThirdPartyLookup {
                message: format!("lookup task failed: {}", e),
                source: Some(Box::new(e)),
            }
        })?
        .map_err(|e| {
            error!("Failed to fetch data from MyGene.info: {}", e);
            EgressError::ThirdPartyLookup {
                message: e.to_string(),
                source: Some(Box::new(e)),
            }
        })?;

        if response.total == 0 || response.hits.is_empty() {
            return Ok(SourcePayload::Empty);
        }

        let mut hits = response.hits;
        sort_by_gene_id(&mut hits);
        info!("MyGene.info returned {} gene annotations", hits.len());

        Ok(SourcePayload::Records(hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use serde_json::json;

    fn client() -> FetchClient {
        FetchClient::new(&HttpClientConfig::default()).unwrap()
    }

    #[test]
    fn test_sort_by_gene_id_ascending() {
        let mut hits = vec![
            json!({"_id": "ENSG00000134460"}),
            json!({"_id": "3559"}),
            json!({"_id": "111"}),
        ];
        sort_by_gene_id(&mut hits);
        let ids: Vec<_> = hits.iter().map(gene_id).collect();
        assert_eq!(ids, vec!["111", "3559", "ENSG00000134460"]);
    }

    #[tokio::test]
    async fn test_hits_are_sorted() {
        let mut lookup = MockGeneAnnotationLookup::new();
        lookup
            .expect_query()
            .with(eq("IL2RA"), eq(QUERY_FIELDS), eq(TARGET_SPECIES), eq(MAX_HITS))
            .times(1)
            .returning(|_, _, _, _| {
                Ok(LookupResponse {
                    total: 2,
                    hits: vec![
                        json!({"_id": "3559", "symbol": "IL2RA"}),
                        json!({"_id": "100", "symbol": "IL2RA-AS"}),
                    ],
                })
            });

        let source = GeneAnnotationSource::new(Arc::new(lookup));
        let payload = source
            .search(&client(), &Query::new("IL2RA").unwrap())
            .await
            .unwrap();

        match payload {
            SourcePayload::Records(records) => {
                assert_eq!(records[0]["_id"], "100");
                assert_eq!(records[1]["_id"], "3559");
            }
            other => panic!("expected records, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_total_is_empty() {
        let mut lookup = MockGeneAnnotationLookup::new();
        lookup.expect_query().returning(|_, _, _, _| {
            Ok(LookupResponse {
                total: 0,
                hits: vec![],
            })
        });

        let source = GeneAnnotationSource::new(Arc::new(lookup));
        let payload = source
            .search(&client(), &Query::new("NOPE").unwrap())
            .await
            .unwrap();
        assert_eq!(payload, SourcePayload::Empty);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_wrapped() {
        let mut lookup = MockGeneAnnotationLookup::new();
        lookup
            .expect_query()
            .returning(|_, _, _, _| Err(LookupError::Status(503)));

        let source = GeneAnnotationSource::new(Arc::new(lookup));
        let err = source
            .search(&client(), &Query::new("IL2RA").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, EgressError::ThirdPartyLookup { .. }));
        assert!(err.to_string().contains("503"));
    }
}
