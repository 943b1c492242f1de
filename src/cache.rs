//! Load-once cache for cleaned datasets.
//!
//! Constructed at startup and handed to whoever needs the data. A source is
//! read from disk the first time it is requested; later requests share the
//! same [`Arc`].

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::loader::{DataSource, load};
use crate::model::SalesDataset;

#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<DataSource, Arc<SalesDataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached dataset for `source`, loading it on first use.
    ///
    /// Failed loads are not cached, so a later call retries the read.
    pub fn get_or_load(&mut self, source: &DataSource) -> Result<Arc<SalesDataset>> {
        if let Some(dataset) = self.entries.get(source) {
            debug!(primary = %source.primary.display(), "Sales data served from cache");
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load(source)?);
        self.entries.insert(source.clone(), Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Forgets a cached source; returns whether it was present.
    pub fn invalidate(&mut self, source: &DataSource) -> bool {
        self.entries.remove(source).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;

    const SAMPLE: &str = "\
Order_ID,Date,Product,Purchase_Type,Payment_Method,Manager,City,Price,Quantity
O1,01-01-2024,Widget,Retail,Cash,Alice,NYC,10,2
";

    #[test]
    fn test_second_call_returns_same_dataset_without_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        let source = DataSource::single(&path);

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&source).unwrap();

        // Removing the file proves the second call never touches the disk.
        std::fs::remove_file(&path).unwrap();
        let second = cache.get_or_load(&source).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.csv");
        let source = DataSource::single(&path);

        let mut cache = DatasetCache::new();
        assert!(matches!(
            cache.get_or_load(&source),
            Err(DashboardError::DataUnavailable { .. })
        ));
        assert!(cache.is_empty());

        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(cache.get_or_load(&source).unwrap().len(), 1);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        let source = DataSource::single(&path);

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&source).unwrap();
        assert!(cache.invalidate(&source));
        assert!(!cache.invalidate(&source));

        let second = cache.get_or_load(&source).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
