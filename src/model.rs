use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One cleaned transaction line.
///
/// Field names serialize to the normalized column names of the source file so
/// the raw-data dump reads like the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    #[serde(rename = "Order_ID")]
    pub order_id: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Purchase_Type")]
    pub purchase_type: String,
    #[serde(rename = "Payment_Method")]
    pub payment_method: String,
    #[serde(rename = "Manager")]
    pub manager: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    #[serde(rename = "Total_Sales")]
    pub total_sales: f64,

    /// Cells of non-schema columns, aligned with [`SalesDataset::extra_columns`].
    #[serde(skip)]
    pub extras: Vec<String>,
}

/// Counters describing what the cleaner did to the raw rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub dropped_incomplete: usize,
    pub duplicates_removed: usize,
    pub rows_kept: usize,
}

/// The immutable, cleaned full dataset.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    records: Vec<SaleRecord>,
    extra_columns: Vec<String>,
    source: PathBuf,
    report: LoadReport,
}

impl SalesDataset {
    pub(crate) fn new(
        records: Vec<SaleRecord>,
        extra_columns: Vec<String>,
        source: PathBuf,
        report: LoadReport,
    ) -> Self {
        Self {
            records,
            extra_columns,
            source,
            report,
        }
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Names of the columns carried beyond the fixed schema, in file order.
    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// The file the dataset was actually read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Earliest and latest sale dates, or `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    /// Distinct values of a text field in first-appearance order.
    pub fn distinct<F>(&self, field: F) -> Vec<String>
    where
        F: Fn(&SaleRecord) -> &str,
    {
        let mut seen = std::collections::HashSet::new();
        self.records
            .iter()
            .map(|r| field(r))
            .filter(|v| seen.insert(*v))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(
        order_id: &str,
        date: &str,
        product: &str,
        city: &str,
        manager: &str,
        price: f64,
        quantity: u32,
    ) -> SaleRecord {
        SaleRecord {
            order_id: order_id.to_string(),
            date: NaiveDate::parse_from_str(date, "%d-%m-%Y").unwrap(),
            product: product.to_string(),
            purchase_type: "Online".to_string(),
            payment_method: "Card".to_string(),
            manager: manager.to_string(),
            city: city.to_string(),
            price,
            quantity,
            total_sales: price * quantity as f64,
            extras: Vec::new(),
        }
    }

    pub(crate) fn dataset(records: Vec<SaleRecord>) -> SalesDataset {
        let report = LoadReport {
            rows_read: records.len(),
            rows_kept: records.len(),
            ..Default::default()
        };
        SalesDataset::new(records, Vec::new(), PathBuf::from("memory.csv"), report)
    }

    #[test]
    fn test_date_bounds_empty() {
        assert_eq!(dataset(vec![]).date_bounds(), None);
    }

    #[test]
    fn test_date_bounds() {
        let ds = dataset(vec![
            record("O1", "05-03-2024", "Widget", "NYC", "Alice", 1.0, 1),
            record("O2", "01-01-2024", "Widget", "NYC", "Alice", 1.0, 1),
            record("O3", "20-02-2024", "Widget", "NYC", "Alice", 1.0, 1),
        ]);
        let (min, max) = ds.date_bounds().unwrap();
        assert_eq!(min, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(max, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_distinct_keeps_first_appearance_order() {
        let ds = dataset(vec![
            record("O1", "01-01-2024", "Widget", "NYC", "Bob", 1.0, 1),
            record("O2", "01-01-2024", "Gadget", "LA", "Alice", 1.0, 1),
            record("O3", "01-01-2024", "Widget", "NYC", "Bob", 1.0, 1),
        ]);
        assert_eq!(ds.distinct(|r| &r.city), vec!["NYC", "LA"]);
        assert_eq!(ds.distinct(|r| &r.manager), vec!["Bob", "Alice"]);
    }

    #[test]
    fn test_record_serializes_with_column_names() {
        let r = record("O1", "01-01-2024", "Widget", "NYC", "Alice", 10.0, 2);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["Order_ID"], "O1");
        assert_eq!(json["Date"], "2024-01-01");
        assert_eq!(json["Total_Sales"], 20.0);
        assert!(json.get("extras").is_none());
    }
}
