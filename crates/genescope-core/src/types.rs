//! Query, source and result types

use crate::{Error, Result};
use bytes::Bytes;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// A user-supplied gene query (symbol, synonym or accession)
///
/// The only validation is that the query is not empty. Case handling and
/// identifier formats are left to each source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    /// Create a query from trimmed input, rejecting empty or whitespace-only input
    ///
    /// Case is kept as given.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::EmptyQuery);
        }
        if trimmed.len() == raw.len() {
            Ok(Self(raw))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one external data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SourceName {
    /// The Human Protein Atlas
    TissueAtlas,
    /// DICE (Database of Immune Cell Expression)
    ImmuneCellExpression,
    /// MyGene.info
    GeneAnnotation,
    /// BenchSci
    AntibodyVendor,
    /// BioGPS dataset drill-down
    DatasetExpression,
}

impl SourceName {
    /// Sources queried by the primary search, in launch order
    pub const ALL_PRIMARY: [SourceName; 4] = [
        SourceName::TissueAtlas,
        SourceName::ImmuneCellExpression,
        SourceName::GeneAnnotation,
        SourceName::AntibodyVendor,
    ];

    /// Public name of the service behind this source
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceName::TissueAtlas => "The Human Protein Atlas",
            SourceName::ImmuneCellExpression => "DICE",
            SourceName::GeneAnnotation => "MyGene.info",
            SourceName::AntibodyVendor => "BenchSci",
            SourceName::DatasetExpression => "BioGPS",
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Successful payload of one source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SourcePayload {
    /// Structured records decoded from a JSON response
    Records(Vec<serde_json::Value>),
    /// Raw CSV body, left unparsed
    Csv(#[serde(serialize_with = "serialize_csv")] Bytes),
    /// The source has no data for the query
    Empty,
}

impl SourcePayload {
    /// True when the source legitimately returned nothing
    pub fn is_empty(&self) -> bool {
        match self {
            SourcePayload::Records(records) => records.is_empty(),
            SourcePayload::Csv(bytes) => bytes.is_empty(),
            SourcePayload::Empty => true,
        }
    }
}

fn serialize_csv<S: Serializer>(
    bytes: &Bytes,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

/// Category of a captured per-source failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// The remote answered with a 4xx/5xx status
    Response { status: u16 },
    /// Transport-level failure (connect, DNS, TLS, timeout)
    Client,
    /// Anything else caught at the fetch boundary
    Unexpected,
    /// The third-party gene annotation lookup failed
    ThirdPartyLookup,
    /// The search machinery itself failed for this source
    Internal,
}

/// A failure captured as data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFailure {
    #[serde(flatten)]
    pub kind: FailureKind,
    pub message: String,
}

impl SourceFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Terminal state of one source within a search
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceResult {
    Success { payload: SourcePayload },
    Failure { error: SourceFailure },
}

impl SourceResult {
    pub fn success(payload: SourcePayload) -> Self {
        SourceResult::Success { payload }
    }

    pub fn failure(error: SourceFailure) -> Self {
        SourceResult::Failure { error }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SourceResult::Success { .. })
    }

    pub fn payload(&self) -> Option<&SourcePayload> {
        match self {
            SourceResult::Success { payload } => Some(payload),
            SourceResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&SourceFailure> {
        match self {
            SourceResult::Success { .. } => None,
            SourceResult::Failure { error } => Some(error),
        }
    }
}

/// Aggregated per-source results of one search, with its wall-clock duration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    results: BTreeMap<SourceName, SourceResult>,
    elapsed_secs: f64,
}

impl SearchOutcome {
    pub fn new(results: BTreeMap<SourceName, SourceResult>, elapsed: Duration) -> Self {
        Self {
            results,
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }

    pub fn results(&self) -> &BTreeMap<SourceName, SourceResult> {
        &self.results
    }

    pub fn get(&self, source: SourceName) -> Option<&SourceResult> {
        self.results.get(&source)
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of sources that failed
    pub fn failure_count(&self) -> usize {
        self.results.values().filter(|r| !r.is_success()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_rejects_empty() {
        assert!(matches!(Query::new(""), Err(Error::EmptyQuery)));
        assert!(matches!(Query::new("   "), Err(Error::EmptyQuery)));
    }

    #[test]
    fn test_query_keeps_case() {
        let query = Query::new("il2ra").unwrap();
        assert_eq!(query.as_str(), "il2ra");
        assert_eq!(query.to_string(), "il2ra");
    }

    #[test]
    fn test_query_trims_surrounding_whitespace() {
        let query = Query::new(" IL2RA\n").unwrap();
        assert_eq!(query.as_str(), "IL2RA");
        assert_eq!(query, Query::new("IL2RA").unwrap());
        assert_eq!(Query::new("IL2 RA").unwrap().as_str(), "IL2 RA");
    }

    #[test]
    fn test_payload_emptiness() {
        assert!(SourcePayload::Empty.is_empty());
        assert!(SourcePayload::Records(vec![]).is_empty());
        assert!(SourcePayload::Csv(Bytes::new()).is_empty());
        assert!(!SourcePayload::Records(vec![json!({"Gene": "IL2RA"})]).is_empty());
        assert!(!SourcePayload::Csv(Bytes::from_static(b"a,b\n")).is_empty());
    }

    #[test]
    fn test_primary_sources_in_launch_order() {
        assert_eq!(SourceName::ALL_PRIMARY.len(), 4);
        assert_eq!(SourceName::ALL_PRIMARY[0], SourceName::TissueAtlas);
        assert!(!SourceName::ALL_PRIMARY.contains(&SourceName::DatasetExpression));
    }

    #[test]
    fn test_outcome_serializes_failures_and_csv() {
        let mut results = BTreeMap::new();
        results.insert(
            SourceName::ImmuneCellExpression,
            SourceResult::success(SourcePayload::Csv(Bytes::from_static(b"cell,tpm\n"))),
        );
        results.insert(
            SourceName::TissueAtlas,
            SourceResult::failure(SourceFailure::new(
                FailureKind::Response { status: 503 },
                "service unavailable",
            )),
        );
        let outcome = SearchOutcome::new(results, Duration::from_millis(250));

        assert_eq!(outcome.len(), 2);
        assert_eq!(outcome.failure_count(), 1);
        assert!((outcome.elapsed_secs() - 0.25).abs() < f64::EPSILON);

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value["results"]["ImmuneCellExpression"]["payload"]["data"],
            "cell,tpm\n"
        );
        assert_eq!(value["results"]["TissueAtlas"]["status"], "failure");
        assert_eq!(value["results"]["TissueAtlas"]["error"]["kind"], "response");
        assert_eq!(value["results"]["TissueAtlas"]["error"]["status"], 503);
    }
}
