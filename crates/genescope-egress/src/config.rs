//! Upstream endpoint configuration

use serde::{Deserialize, Serialize};

/// Base URLs of every upstream service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub tissue_atlas_url: String,
    pub immune_cell_url: String,
    pub gene_annotation_url: String,
    pub antibody_vendor_url: String,
    pub dataset_expression_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            tissue_atlas_url: crate::tissue_atlas::DEFAULT_BASE_URL.to_string(),
            immune_cell_url: crate::immune_cell::DEFAULT_BASE_URL.to_string(),
            gene_annotation_url: crate::gene_annotation::DEFAULT_BASE_URL.to_string(),
            antibody_vendor_url: crate::antibody_vendor::DEFAULT_BASE_URL.to_string(),
            dataset_expression_url: crate::dataset_expression::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl SourcesConfig {
    /// Point every source at the same base URL (used against mock servers)
    pub fn all_at(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            tissue_atlas_url: base_url.clone(),
            immune_cell_url: base_url.clone(),
            gene_annotation_url: base_url.clone(),
            antibody_vendor_url: base_url.clone(),
            dataset_expression_url: base_url,
        }
    }
}
