//! Cached search entry points

use crate::{Aggregator, ResultCache};
use genescope_core::{Error, Query, Result, SearchOutcome};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Memoizes aggregator outcomes by query and by (dataset, gene) pair
///
/// Failed sources are cached along with successful ones: a failure sticks
/// until its key is invalidated or the process restarts.
pub struct MemoizedSearch {
    aggregator: Arc<Aggregator>,
    by_query: ResultCache<Query, Arc<SearchOutcome>>,
    by_dataset: ResultCache<(String, String), Arc<SearchOutcome>>,
}

impl MemoizedSearch {
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        Self {
            aggregator,
            by_query: ResultCache::new(),
            by_dataset: ResultCache::new(),
        }
    }

    /// Search all primary sources, reusing a previous outcome for the same query
    ///
    /// An empty query is rejected before any source is contacted.
    #[instrument(skip(self))]
    pub async fn search(&self, raw_query: &str) -> Result<Arc<SearchOutcome>> {
        let query = Query::new(raw_query)?;

        let outcome = self
            .by_query
            .get_or_compute(query.clone(), || async {
                debug!("Cache miss for '{}'", query);
                Arc::new(self.aggregator.search(&query).await)
            })
            .await;

        Ok(outcome)
    }

    /// Drill-down search of one dataset for one gene, cached by the pair
    #[instrument(skip(self))]
    pub async fn search_dataset(
        &self,
        dataset_id: &str,
        gene_id: &str,
    ) -> Result<Arc<SearchOutcome>> {
        if dataset_id.trim().is_empty() || gene_id.trim().is_empty() {
            return Err(Error::InvalidDataset(
                "dataset id and gene id must both be set".to_string(),
            ));
        }

        let key = (dataset_id.to_string(), gene_id.to_string());
        let outcome = self
            .by_dataset
            .get_or_compute(key, || async {
                debug!("Cache miss for dataset {}/{}", dataset_id, gene_id);
                Arc::new(self.aggregator.search_dataset(dataset_id, gene_id).await)
            })
            .await;

        Ok(outcome)
    }

    /// Forget the cached outcome of `raw_query`
    pub fn invalidate(&self, raw_query: &str) -> bool {
        Query::new(raw_query)
            .map(|query| self.by_query.invalidate(&query))
            .unwrap_or(false)
    }

    pub fn cached_queries(&self) -> usize {
        self.by_query.len()
    }

    pub fn cached_datasets(&self) -> usize {
        self.by_dataset.len()
    }
}
