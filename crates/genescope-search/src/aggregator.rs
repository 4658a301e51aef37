//! Concurrent multi-source search
//!
//! One search opens a [`FetchClient`] session, polls every source's future
//! together on the calling task, and records each source's terminal state
//! (payload or captured error) under its name. A failing source never
//! cancels its siblings. The session is dropped once every source has
//! finished, on every path.

use futures::future::join_all;
use genescope_core::{Error, Query, Result, SearchOutcome, SourceName, SourcePayload, SourceResult};
use genescope_egress::antibody_vendor::AntibodyVendorSource;
use genescope_egress::dataset_expression::DatasetExpressionSource;
use genescope_egress::gene_annotation::GeneAnnotationSource;
use genescope_egress::immune_cell::ImmuneCellSource;
use genescope_egress::tissue_atlas::TissueAtlasSource;
use genescope_egress::{EgressError, FetchClient, HttpClientConfig, Source, SourcesConfig};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

pub struct Aggregator {
    client_config: HttpClientConfig,
    sources: Vec<Arc<dyn Source>>,
    dataset_source: Option<DatasetExpressionSource>,
}

impl Aggregator {
    /// Create an aggregator over `sources`, launched in the given order
    ///
    /// Source names must be unique since they key the outcome map. No
    /// dataset source is attached; see [`Aggregator::with_dataset_source`].
    pub fn new(client_config: HttpClientConfig, sources: Vec<Arc<dyn Source>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for source in &sources {
            if !seen.insert(source.name()) {
                return Err(Error::Config(format!(
                    "source {} configured more than once",
                    source.name()
                )));
            }
        }

        Ok(Self {
            client_config,
            sources,
            dataset_source: None,
        })
    }

    /// Aggregator wired to the four primary services plus BioGPS drill-down
    pub fn from_config(client_config: HttpClientConfig, sources: &SourcesConfig) -> Result<Self> {
        let primary: Vec<Arc<dyn Source>> = vec![
            Arc::new(TissueAtlasSource::new(&sources.tissue_atlas_url)),
            Arc::new(ImmuneCellSource::new(&sources.immune_cell_url)),
            Arc::new(GeneAnnotationSource::mygene(
                &sources.gene_annotation_url,
                &client_config,
            )),
            Arc::new(AntibodyVendorSource::new(&sources.antibody_vendor_url)),
        ];

        Ok(Self::new(client_config, primary)?.with_dataset_source(DatasetExpressionSource::new(
            &sources.dataset_expression_url,
        )))
    }

    pub fn with_dataset_source(mut self, dataset_source: DatasetExpressionSource) -> Self {
        self.dataset_source = Some(dataset_source);
        self
    }

    /// Configured primary sources, in launch order
    pub fn source_names(&self) -> Vec<SourceName> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Search every configured source for `query`
    ///
    /// Always returns one entry per configured source.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &Query) -> SearchOutcome {
        info!("Start searching across {} sources", self.sources.len());
        let start = Instant::now();

        let results = match FetchClient::new(&self.client_config) {
            Ok(client) => {
                let outcomes =
                    join_all(self.sources.iter().map(|source| source.search(&client, query))).await;
                collect(self.source_names().into_iter().zip(outcomes))
            }
            Err(e) => session_failure(self.source_names(), &e),
        };

        let elapsed = start.elapsed();
        info!(
            "End searching ({} failed, took {:.4} sec)",
            results.values().filter(|r| !r.is_success()).count(),
            elapsed.as_secs_f64()
        );

        SearchOutcome::new(results, elapsed)
    }

    /// Drill-down search of one BioGPS dataset for one gene
    ///
    /// Without a dataset source the outcome holds a single configuration failure.
    #[instrument(skip(self))]
    pub async fn search_dataset(&self, dataset_id: &str, gene_id: &str) -> SearchOutcome {
        info!("Start dataset search");
        let start = Instant::now();
        let results = match &self.dataset_source {
            Some(source) => match FetchClient::new(&self.client_config) {
                Ok(client) => {
                    let outcome = source.fetch(&client, dataset_id, gene_id).await;
                    collect([(source.name(), outcome)])
                }
                Err(e) => session_failure([source.name()], &e),
            },
            None => collect([(
                SourceName::DatasetExpression,
                Err(EgressError::ConfigError(
                    "no dataset source configured".to_string(),
                )),
            )]),
        };

        let elapsed = start.elapsed();
        info!("End dataset search (took {:.4} sec)", elapsed.as_secs_f64());

        SearchOutcome::new(results, elapsed)
    }
}

fn collect(
    outcomes: impl IntoIterator<Item = (SourceName, genescope_egress::Result<SourcePayload>)>,
) -> BTreeMap<SourceName, SourceResult> {
    outcomes
        .into_iter()
        .map(|(name, outcome)| {
            let result = match outcome {
                Ok(payload) => {
                    debug!("Add result from '{}' (empty: {})", name, payload.is_empty());
                    SourceResult::success(payload)
                }
                Err(e) => {
                    warn!("Source '{}' failed: {}", name, e);
                    SourceResult::failure(e.to_failure())
                }
            };
            (name, result)
        })
        .collect()
}

/// Every source fails with the same error when no session could be opened
fn session_failure(
    names: impl IntoIterator<Item = SourceName>,
    err: &EgressError,
) -> BTreeMap<SourceName, SourceResult> {
    warn!("Failed to open HTTP session: {}", err);
    names
        .into_iter()
        .map(|name| (name, SourceResult::failure(err.to_failure())))
        .collect()
}
