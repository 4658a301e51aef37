//! GeneScope Core Types
//!
//! This crate provides the fundamental types shared across GeneScope:
//! - Query and source identifiers
//! - Per-source results and the aggregated search outcome
//! - The static data-source catalogue
//! - Core error types

pub mod catalogue;
pub mod error;
pub mod types;

pub use catalogue::{DATA_SOURCES, DataSourceInfo, info_for};
pub use error::{Error, Result};
pub use types::{
    FailureKind, Query, SearchOutcome, SourceFailure, SourceName, SourcePayload, SourceResult,
};
