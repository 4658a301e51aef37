//! The Human Protein Atlas connector
//!
//! API docs: https://www.proteinatlas.org/about/help/dataaccess
//!
//! One GET to the search-download endpoint with a fixed column projection
//! returns a JSON array of gene records.

use crate::source::endpoint_url;
use crate::{FetchClient, Result, Source};
use async_trait::async_trait;
use genescope_core::{Query, SourceName, SourcePayload};
use reqwest::header::HeaderMap;
use tracing::{debug, error, instrument};

pub const DEFAULT_BASE_URL: &str = "https://www.proteinatlas.org";

/// General gene information: (response key, column code)
pub static GENERAL_INFO_COLUMNS: &[(&str, &str)] = &[
    ("Gene", "g"),
    ("Gene synonym", "gs"),
    ("Ensembl", "eg"),
    ("Gene description", "gd"),
];

/// Tissue panel summary columns: (response key, column code)
pub static ATLAS_COLUMNS: &[(&str, &str)] = &[
    ("Tissue expression cluster", "ectissue"),
    ("RNA tissue specificity", "rnats"),
    ("RNA tissue distribution", "rnatd"),
];

/// Tissues with a consensus RNA expression column
pub static RNA_TISSUES: &[&str] = &[
    "adipose tissue",
    "adrenal gland",
    "amygdala",
    "appendix",
    "basal ganglia",
    "bone marrow",
    "breast",
    "cerebellum",
    "cerebral cortex",
    "cervix",
    "choroid plexus",
    "colon",
    "duodenum",
    "endometrium 1",
    "epididymis",
    "esophagus",
    "fallopian tube",
    "gallbladder",
    "heart muscle",
    "hippocampal formation",
    "hypothalamus",
    "kidney",
    "liver",
    "lung",
    "lymph node",
    "midbrain",
    "ovary",
    "pancreas",
    "parathyroid gland",
    "pituitary gland",
    "placenta",
    "prostate",
    "rectum",
    "retina",
    "salivary gland",
    "seminal vesicle",
    "skeletal muscle",
    "skin 1",
    "small intestine",
    "smooth muscle",
    "spinal cord",
    "spleen",
    "stomach 1",
    "testis",
    "thymus",
    "thyroid gland",
    "tongue",
    "tonsil",
    "urinary bladder",
    "vagina",
];

const RNA_KEY_PREFIX: &str = "Tissue RNA - ";
const RNA_KEY_SUFFIX: &str = " [nTPM]";

/// Column code requested for a tissue, e.g. `t_RNA_heart_muscle`
pub fn rna_column_code(tissue: &str) -> String {
    format!("t_RNA_{}", tissue.replace(' ', "_"))
}

/// Key under which a tissue's value appears in a response record
pub fn rna_response_key(tissue: &str) -> String {
    format!("{}{}{}", RNA_KEY_PREFIX, tissue, RNA_KEY_SUFFIX)
}

pub fn is_rna_response_key(key: &str) -> bool {
    key.starts_with(RNA_KEY_PREFIX) && key.ends_with(RNA_KEY_SUFFIX)
}

/// Comma-joined projection: general info, then atlas panel, then RNA columns
pub fn column_projection() -> String {
    GENERAL_INFO_COLUMNS
        .iter()
        .chain(ATLAS_COLUMNS.iter())
        .map(|(_, code)| code.to_string())
        .chain(RNA_TISSUES.iter().map(|tissue| rna_column_code(tissue)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Human-readable tissue label from a response key
///
/// `"Tissue RNA - skin 1 [nTPM]"` becomes `"Skin"`.
pub fn tissue_display_name(key: &str) -> String {
    let name = key.strip_prefix(RNA_KEY_PREFIX).unwrap_or(key);
    let name = name.strip_suffix(RNA_KEY_SUFFIX).unwrap_or(name);

    let mut label = capitalize(name);
    if matches!(label.as_str(), "Endometrium 1" | "Skin 1" | "Stomach 1") {
        label.truncate(label.len() - 2);
    }
    label
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Human Protein Atlas adapter
#[derive(Debug, Clone)]
pub struct TissueAtlasSource {
    base_url: String,
}

impl TissueAtlasSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for TissueAtlasSource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl Source for TissueAtlasSource {
    fn name(&self) -> SourceName {
        SourceName::TissueAtlas
    }

    #[instrument(skip(self, client), fields(query = %query))]
    async fn search(&self, client: &FetchClient, query: &Query) -> Result<SourcePayload> {
        let url = endpoint_url(&self.base_url, &["api", "search_download.php"])?;
        let columns = column_projection();
        let params = [
            ("search", query.as_str()),
            ("format", "json"),
            ("columns", columns.as_str()),
            ("compress", "no"),
        ];

        let records = async {
            let response = client.get(url.as_str(), &params, &HeaderMap::new()).await?;
            response.json::<Vec<serde_json::Value>>().await
        }
        .await
        .map_err(|e| {
            error!("Failed to fetch data from {}: {}", url, e);
            e
        })?;

        debug!("Human Protein Atlas returned {} records", records.len());
        Ok(SourcePayload::Records(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_projection_order() {
        let columns = column_projection();
        assert!(columns.starts_with("g,gs,eg,gd,ectissue,rnats,rnatd,t_RNA_adipose_tissue,"));
        assert!(columns.ends_with(",t_RNA_vagina"));
        assert_eq!(
            columns.split(',').count(),
            GENERAL_INFO_COLUMNS.len() + ATLAS_COLUMNS.len() + RNA_TISSUES.len()
        );
    }

    #[test]
    fn test_rna_keys() {
        assert_eq!(rna_column_code("heart muscle"), "t_RNA_heart_muscle");
        assert_eq!(
            rna_response_key("heart muscle"),
            "Tissue RNA - heart muscle [nTPM]"
        );
    }

    #[test]
    fn test_tissue_display_name() {
        assert_eq!(
            tissue_display_name("Tissue RNA - heart muscle [nTPM]"),
            "Heart muscle"
        );
        assert_eq!(tissue_display_name("Tissue RNA - skin 1 [nTPM]"), "Skin");
        assert_eq!(tissue_display_name("Tissue RNA - stomach 1 [nTPM]"), "Stomach");
        assert_eq!(
            tissue_display_name("Tissue RNA - endometrium 1 [nTPM]"),
            "Endometrium"
        );
        assert_eq!(tissue_display_name("lymph node"), "Lymph node");
    }

    #[test]
    fn test_is_rna_response_key() {
        assert!(is_rna_response_key(&rna_response_key("lymph node")));
        assert!(!is_rna_response_key("Gene synonym"));
    }

    #[test]
    fn test_source_name() {
        assert_eq!(TissueAtlasSource::default().name(), SourceName::TissueAtlas);
    }
}
