//! GeneScope Egress Connectors
//!
//! This crate provides the outbound side of GeneScope:
//! - Shared fetch client with status-based error classification
//! - One adapter per upstream source (Human Protein Atlas, DICE,
//!   MyGene.info, BenchSci, BioGPS)

pub mod antibody_vendor;
pub mod client;
pub mod config;
pub mod dataset_expression;
pub mod error;
pub mod gene_annotation;
pub mod immune_cell;
pub mod source;
pub mod tissue_atlas;

pub use client::{FetchClient, FetchResponse, HttpClientConfig};
pub use config::SourcesConfig;
pub use error::{EgressError, FetchError, Result};
pub use source::Source;
