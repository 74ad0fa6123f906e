//! Data ingestion module - fetch/flatten/write and read/batch/insert pipelines for FDC data

pub mod fetch;
pub mod load;
pub mod parse;
pub mod sink;
pub mod types;
pub mod utils;
pub mod write;

pub use types::*;
