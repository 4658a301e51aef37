//! Synchronous facade over [`MemoizedSearch`]
//!
//! Owns a current-thread runtime and blocks on it for each call. Sources
//! still run concurrently within a call. Do not create, call or drop this
//! from inside an async context.

use crate::MemoizedSearch;
use genescope_core::{Result, SearchOutcome};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

pub struct BlockingSearch {
    runtime: Runtime,
    inner: MemoizedSearch,
}

impl BlockingSearch {
    pub fn new(inner: MemoizedSearch) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { runtime, inner })
    }

    pub fn search(&self, query: &str) -> Result<Arc<SearchOutcome>> {
        self.runtime.block_on(self.inner.search(query))
    }

    pub fn search_dataset(&self, dataset_id: &str, gene_id: &str) -> Result<Arc<SearchOutcome>> {
        self.runtime
            .block_on(self.inner.search_dataset(dataset_id, gene_id))
    }

    pub fn inner(&self) -> &MemoizedSearch {
        &self.inner
    }
}
