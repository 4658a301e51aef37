//! Static catalogue of the data sources GeneScope reads from

use crate::SourceName;
use serde::Serialize;

/// Descriptive metadata for one upstream database
#[derive(Debug, Clone, Serialize)]
pub struct DataSourceInfo {
    /// Source this entry describes, if it is queried directly
    pub source: Option<SourceName>,
    pub name: &'static str,
    pub version: &'static str,
    pub url: &'static str,
    pub datasets: &'static [&'static str],
}

/// Every database shown to users, including Ensembl which is only referenced
/// through identifiers returned by the other sources
pub static DATA_SOURCES: &[DataSourceInfo] = &[
    DataSourceInfo {
        source: None,
        name: "Ensembl",
        version: "109",
        url: "https://www.ensembl.org",
        datasets: &[],
    },
    DataSourceInfo {
        source: Some(SourceName::TissueAtlas),
        name: "The Human Protein Atlas",
        version: "23.0",
        url: "https://www.proteinatlas.org",
        datasets: &["Tissue RNA expression (consensus nTPM)"],
    },
    DataSourceInfo {
        source: Some(SourceName::ImmuneCellExpression),
        name: "DICE",
        version: "unknown",
        url: "https://dice-database.org",
        datasets: &["Immune cell RNA expression (TPM)"],
    },
    DataSourceInfo {
        source: Some(SourceName::GeneAnnotation),
        name: "MyGene.info",
        version: "v3",
        url: "https://mygene.info",
        datasets: &[],
    },
    DataSourceInfo {
        source: Some(SourceName::DatasetExpression),
        name: "BioGPS",
        version: "unknown",
        url: "https://biogps.org",
        datasets: &[
            "NCI60 on U133A, gcrma",
            "Primary Tumors (U95)",
            "Barcode on normal tissues",
            "Primary Cell Atlas",
            "GeneAtlas U133A, gcrma",
        ],
    },
    DataSourceInfo {
        source: Some(SourceName::AntibodyVendor),
        name: "BenchSci",
        version: "unknown",
        url: "https://www.benchsci.com",
        datasets: &[],
    },
];

/// Look up the catalogue entry of a queried source
pub fn info_for(source: SourceName) -> Option<&'static DataSourceInfo> {
    DATA_SOURCES.iter().find(|info| info.source == Some(source))
}
