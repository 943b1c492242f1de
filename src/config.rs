//! Environment-driven settings. `.env` is loaded by the binary before
//! [`AppConfig::from_env`] runs.

use std::path::PathBuf;

use crate::loader::{DEFAULT_FALLBACK_PATH, DEFAULT_PRIMARY_PATH, DataSource};

pub const DATA_PATH_VAR: &str = "SALES_DATA_PATH";
pub const FALLBACK_PATH_VAR: &str = "SALES_DATA_FALLBACK_PATH";
pub const LOG_FILE_VAR: &str = "LOG_FILE_PATH";

pub const DEFAULT_LOG_FILE: &str = "logs/sales_dashboard.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub fallback_path: PathBuf,
    pub log_file_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: DEFAULT_PRIMARY_PATH.into(),
            fallback_path: DEFAULT_FALLBACK_PATH.into(),
            log_file_path: DEFAULT_LOG_FILE.into(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup; unset or empty
    /// variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            data_path: get(DATA_PATH_VAR).map_or(defaults.data_path, PathBuf::from),
            fallback_path: get(FALLBACK_PATH_VAR).map_or(defaults.fallback_path, PathBuf::from),
            log_file_path: get(LOG_FILE_VAR).map_or(defaults.log_file_path, PathBuf::from),
        }
    }

    /// The data source, with command-line paths taking precedence.
    pub fn data_source(&self, data: Option<PathBuf>, fallback: Option<PathBuf>) -> DataSource {
        DataSource::new(
            data.unwrap_or_else(|| self.data_path.clone()),
            fallback.unwrap_or_else(|| self.fallback_path.clone()),
        )
    }
}
