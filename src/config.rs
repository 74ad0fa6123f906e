//! Configuration loaded from environment variables
//!
//! Both configs are validated in full before any network call is made.

use crate::error::{IngestError, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_FDC_BASE_URL: &str = "https://api.nal.usda.gov/fdc/v1";
pub const DEFAULT_PAGE_COUNT: u32 = 5;
pub const DEFAULT_PAGE_SIZE: u32 = 200;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_DATA_TYPES: [&str; 2] = ["Foundation", "SR Legacy"];

/// How many listing pages a fetch run requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLimit {
    /// Exactly this many pages, numbered from 1
    Pages(u32),
    /// Keep going until the endpoint returns an empty page
    UntilEmpty,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub api_key: String,
    pub base_url: String,
    pub page_limit: PageLimit,
    pub page_size: u32,
    pub data_types: Vec<String>,
    pub data_dir: PathBuf,
}

/// Where the loader sends its batches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    /// Supabase PostgREST endpoint
    Rest { url: String, key: String },
    /// Direct Postgres connection
    Postgres { url: String },
}

#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub target: DbTarget,
    pub batch_size: usize,
    pub data_dir: PathBuf,
}

impl FetchConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = required(&lookup, "FDC_API_KEY")?;

        let page_limit = match parse_or(&lookup, "FDC_PAGE_COUNT", DEFAULT_PAGE_COUNT)? {
            0 => PageLimit::UntilEmpty,
            n => PageLimit::Pages(n),
        };

        let page_size = parse_or(&lookup, "FDC_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(invalid("FDC_PAGE_SIZE", "must be greater than zero"));
        }

        let data_types: Vec<String> = match non_empty(&lookup, "FDC_DATA_TYPES") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_DATA_TYPES.iter().map(|s| s.to_string()).collect(),
        };
        if data_types.is_empty() {
            return Err(invalid("FDC_DATA_TYPES", "no data types given"));
        }

        Ok(FetchConfig {
            api_key,
            base_url: non_empty(&lookup, "FDC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_FDC_BASE_URL.to_string()),
            page_limit,
            page_size,
            data_types,
            data_dir: data_dir(&lookup),
        })
    }
}

impl LoadConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let target = match (
            non_empty(&lookup, "SUPABASE_URL"),
            non_empty(&lookup, "SUPABASE_KEY"),
        ) {
            (Some(url), Some(key)) => DbTarget::Rest {
                url: url.trim_end_matches('/').to_string(),
                key,
            },
            (Some(_), None) => return Err(missing("SUPABASE_KEY")),
            (None, Some(_)) => return Err(missing("SUPABASE_URL")),
            (None, None) => match non_empty(&lookup, "DATABASE_URL") {
                Some(url) => DbTarget::Postgres { url },
                None => return Err(missing("SUPABASE_URL/SUPABASE_KEY or DATABASE_URL")),
            },
        };

        let batch_size = parse_or(&lookup, "BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(invalid("BATCH_SIZE", "must be greater than zero"));
        }

        Ok(LoadConfig {
            target,
            batch_size,
            data_dir: data_dir(&lookup),
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).ok_or_else(|| missing(key))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| invalid(key, &format!("'{}': {}", raw, e))),
        None => Ok(default),
    }
}

fn data_dir<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, "DATA_DIR")
        .unwrap_or_else(|| ".".to_string())
        .into()
}

fn missing(key: &str) -> IngestError {
    IngestError::MissingConfig {
        key: key.to_string(),
    }
}

fn invalid(key: &str, message: &str) -> IngestError {
    IngestError::InvalidConfig {
        key: key.to_string(),
        message: message.to_string(),
    }
}
