//! Reads the sales file from disk and hands rows to the cleaner.
//!
//! The primary path is tried first and the fallback only when the primary
//! does not exist. Gzip input is recognized by its magic bytes.

use csv::ReaderBuilder;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::clean::{ColumnLayout, clean_rows};
use crate::error::{DashboardError, Result};
use crate::model::SalesDataset;

pub const DEFAULT_PRIMARY_PATH: &str = "9. Sales-Data-Analysis.csv.gz";
pub const DEFAULT_FALLBACK_PATH: &str = "9. Sales-Data-Analysis.csv";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Where to read the dataset from: a preferred (usually compressed) file and
/// a plain fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataSource {
    pub primary: PathBuf,
    pub fallback: Option<PathBuf>,
}

impl Default for DataSource {
    fn default() -> Self {
        Self::new(DEFAULT_PRIMARY_PATH, DEFAULT_FALLBACK_PATH)
    }
}

impl DataSource {
    pub fn new(primary: impl Into<PathBuf>, fallback: impl Into<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            fallback: Some(fallback.into()),
        }
    }

    /// A source with no fallback.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            primary: path.into(),
            fallback: None,
        }
    }

    fn candidates(&self) -> Vec<PathBuf> {
        std::iter::once(self.primary.clone())
            .chain(self.fallback.clone())
            .collect()
    }

    /// The first candidate path that exists on disk.
    pub fn resolve(&self) -> Result<PathBuf> {
        let candidates = self.candidates();
        for path in &candidates {
            if path.is_file() {
                return Ok(path.clone());
            }
            debug!(path = %path.display(), "Sales data candidate not found");
        }
        Err(DashboardError::unavailable(&candidates, "no such file"))
    }
}

/// Loads and cleans the dataset described by `source`.
///
/// # Errors
///
/// [`DashboardError::DataUnavailable`] when no candidate exists or the file
/// cannot be read, [`DashboardError::Schema`] when a required column is
/// missing.
#[tracing::instrument(skip(source), fields(primary = %source.primary.display()))]
pub fn load(source: &DataSource) -> Result<SalesDataset> {
    let path = source.resolve()?;
    let tried = source.candidates();

    let file = File::open(&path).map_err(|e| DashboardError::unavailable(&tried, e))?;
    let dataset = read_sales(file, &path).map_err(|e| match e {
        DashboardError::Io(io) => DashboardError::unavailable(&tried, io),
        other => other,
    })?;

    let report = dataset.report();
    info!(
        path = %path.display(),
        rows_read = report.rows_read,
        dropped_incomplete = report.dropped_incomplete,
        duplicates_removed = report.duplicates_removed,
        rows_kept = report.rows_kept,
        "Sales data loaded"
    );
    if report.rows_kept == 0 {
        warn!(path = %path.display(), "Sales data has no usable rows");
    }

    Ok(dataset)
}

/// Parses a delimited sales table from any reader, decompressing gzip
/// transparently. `path` is only used for error messages and provenance.
pub fn read_sales<R: Read>(reader: R, path: &Path) -> Result<SalesDataset> {
    let mut buffered = BufReader::new(reader);
    let compressed = buffered.fill_buf()?.starts_with(&GZIP_MAGIC);
    debug!(compressed, "Opening sales table");

    if compressed {
        parse_table(MultiGzDecoder::new(buffered), path)
    } else {
        parse_table(buffered, path)
    }
}

fn parse_table<R: Read>(input: R, path: &Path) -> Result<SalesDataset> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = rdr.headers().map_err(csv_to_io)?.clone();
    let layout = ColumnLayout::from_headers(&headers, path)?;

    let mut rows = Vec::new();
    for (row_no, result) in rdr.records().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => return Err(csv_to_io(e).into()),
            Err(e) => debug!(row = row_no + 1, error = %e, "Skipping unreadable row"),
        }
    }

    let (records, report) = clean_rows(&layout, rows);
    Ok(SalesDataset::new(
        records,
        layout.extra_columns(),
        path.to_path_buf(),
        report,
    ))
}

fn csv_to_io(e: csv::Error) -> std::io::Error {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => io,
        other => std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{other:?}")),
    }
}
