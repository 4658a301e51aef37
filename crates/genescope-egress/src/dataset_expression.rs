//! BioGPS dataset connector
//!
//! API docs: http://biogps.org/api/
//!
//! Drill-down fetch of one dataset's expression values for one NCBI gene ID:
//! `GET <base>/dataset/csv/<dataset ID>/gene/<NCBI gene ID>/`

use crate::source::endpoint_url;
use crate::{FetchClient, Result};
use genescope_core::{SourceName, SourcePayload};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::{debug, error, instrument};

pub const DEFAULT_BASE_URL: &str = "http://ds.biogps.org";

/// A BioGPS dataset offered for drill-down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub dataset_id: &'static str,
    pub name: &'static str,
}

pub static SUPPORTED_DATASETS: &[Dataset] = &[
    Dataset {
        dataset_id: "BDS_00011",
        name: "NCI60 on U133A, gcrma",
    },
    Dataset {
        dataset_id: "BDS_00014",
        name: "Primary Tumors (U95)",
    },
    Dataset {
        dataset_id: "BDS_00001",
        name: "Barcode on normal tissues",
    },
    Dataset {
        dataset_id: "BDS_00013",
        name: "Primary Cell Atlas",
    },
    Dataset {
        dataset_id: "GSE1133",
        name: "GeneAtlas U133A, gcrma",
    },
];

pub fn find_dataset(dataset_id: &str) -> Option<&'static Dataset> {
    SUPPORTED_DATASETS.iter().find(|d| d.dataset_id == dataset_id)
}

/// BioGPS adapter
#[derive(Debug, Clone)]
pub struct DatasetExpressionSource {
    base_url: String,
}

impl DatasetExpressionSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn name(&self) -> SourceName {
        SourceName::DatasetExpression
    }

    /// Fetch the raw CSV for one dataset and gene
    #[instrument(skip(self, client))]
    pub async fn fetch(
        &self,
        client: &FetchClient,
        dataset_id: &str,
        gene_id: &str,
    ) -> Result<SourcePayload> {
        let url = endpoint_url(
            &self.base_url,
            &["dataset", "csv", dataset_id, "gene", gene_id, ""],
        )?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/csv"));

        let body = async {
            let response = client.get(url.as_str(), &[], &headers).await?;
            response.bytes().await
        }
        .await
        .map_err(|e| {
            error!("Failed to fetch data from {}: {}", url, e);
            e
        })?;

        debug!("BioGPS returned {} bytes for {}/{}", body.len(), dataset_id, gene_id);
        Ok(SourcePayload::Csv(body))
    }
}

impl Default for DatasetExpressionSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_datasets() {
        assert_eq!(SUPPORTED_DATASETS.len(), 5);
        assert_eq!(find_dataset("GSE1133").unwrap().name, "GeneAtlas U133A, gcrma");
        assert!(find_dataset("GSE0000").is_none());
    }

    #[test]
    fn test_default_points_at_biogps() {
        let source = DatasetExpressionSource::default();
        assert_eq!(source.name(), SourceName::DatasetExpression);
        assert_eq!(source.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_dataset_url_has_trailing_slash() {
        let url = endpoint_url(
            "http://ds.biogps.org",
            &["dataset", "csv", "GSE1133", "gene", "3559", ""],
        )
        .unwrap();
        assert_eq!(url.as_str(), "http://ds.biogps.org/dataset/csv/GSE1133/gene/3559/");
    }
}
