use std::env;
use std::str::FromStr;

use crate::errors::ConfigError;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_MAX_CORPUS_ROWS: usize = 50_000;
pub const DEFAULT_PROMOTED_DEVELOPER: &str = "emaar";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub bind_addr: String,
    pub max_workers: usize,
    pub log_filter: String,
    pub catalog: CatalogConfig,
}

/// Knobs the catalog engine itself reads.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub default_page_size: usize,
    /// Upper bound on rows pulled for a full-corpus fetch.
    pub max_corpus_rows: usize,
    pub promoted_developer: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_corpus_rows: DEFAULT_MAX_CORPUS_ROWS,
            promoted_developer: DEFAULT_PROMOTED_DEVELOPER.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, falling back to defaults
    /// for missing keys. Present-but-malformed numbers are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let catalog = CatalogConfig {
            default_page_size: parse_or(&lookup, "CATALOG_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            max_corpus_rows: parse_or(&lookup, "CATALOG_MAX_CORPUS_ROWS", DEFAULT_MAX_CORPUS_ROWS)?,
            promoted_developer: lookup("CATALOG_PROMOTED_DEVELOPER")
                .unwrap_or_else(|| DEFAULT_PROMOTED_DEVELOPER.to_string()),
        };

        if catalog.default_page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "CATALOG_PAGE_SIZE",
                value: "0".into(),
            });
        }

        Ok(Self {
            db_path: lookup("CATALOG_DB_PATH").unwrap_or_else(|| "catalog.sqlite3".to_string()),
            bind_addr: lookup("CATALOG_BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3000".to_string()),
            max_workers: parse_or(&lookup, "CATALOG_MAX_WORKERS", 8)?,
            log_filter: lookup("CATALOG_LOG").unwrap_or_else(|| "info".to_string()),
            catalog,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
