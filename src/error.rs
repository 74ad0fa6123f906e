//! Error types for the fetch and load pipelines
//!
//! Nothing here is recovered locally: every variant ends the run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    // Configuration
    #[error("Missing required configuration: {key}")]
    MissingConfig { key: String },

    #[error("Invalid value for '{key}': {message}")]
    InvalidConfig { key: String, message: String },

    // Remote listing endpoint
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {body}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Malformed response for page {page}: {message}")]
    MalformedResponse { page: u32, message: String },

    // Intermediate files
    #[error("{file:?} line {line}: field '{field}' has non-numeric value '{value}'")]
    Parse {
        file: PathBuf,
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Remote inserts
    #[error("Insert into {table} rejected: {message}")]
    Insert { table: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
