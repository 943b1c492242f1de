//! Error taxonomy for loading the sales dataset.
//!
//! Only load-time failures are fatal. Malformed cells are absorbed by the
//! cleaner (the record is dropped) and never surface here.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    /// Neither the primary nor the fallback source could be opened or read.
    #[error("sales data unavailable (tried {tried:?}): {reason}")]
    DataUnavailable { tried: Vec<PathBuf>, reason: String },

    /// A required column is missing after header normalization.
    #[error("required column '{column}' missing from {path}")]
    Schema { column: &'static str, path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub(crate) fn unavailable(tried: &[PathBuf], reason: impl ToString) -> Self {
        DashboardError::DataUnavailable {
            tried: tried.to_vec(),
            reason: reason.to_string(),
        }
    }
}
