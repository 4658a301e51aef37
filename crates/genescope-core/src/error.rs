//! Error types for GeneScope Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Invalid dataset request: {0}")]
    InvalidDataset(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
