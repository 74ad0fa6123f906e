// Library module for the FDC fetch and load pipelines

pub mod config;
pub mod error;
pub mod ingestion;

pub use config::{DbTarget, FetchConfig, LoadConfig, PageLimit};
pub use error::{IngestError, Result};
