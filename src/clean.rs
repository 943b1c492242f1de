//! Row-level cleaning rules: header normalization, cell coercion, null
//! dropping and Order_ID deduplication.

use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::error::{DashboardError, Result};
use crate::model::{LoadReport, SaleRecord};

pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Schema columns in their normalized form.
pub const ORDER_ID: &str = "Order_ID";
pub const DATE: &str = "Date";
pub const PRODUCT: &str = "Product";
pub const PURCHASE_TYPE: &str = "Purchase_Type";
pub const PAYMENT_METHOD: &str = "Payment_Method";
pub const MANAGER: &str = "Manager";
pub const CITY: &str = "City";
pub const PRICE: &str = "Price";
pub const QUANTITY: &str = "Quantity";

pub const SCHEMA: [&str; 9] = [
    ORDER_ID,
    DATE,
    PRODUCT,
    PURCHASE_TYPE,
    PAYMENT_METHOD,
    MANAGER,
    CITY,
    PRICE,
    QUANTITY,
];

/// Cell contents read as missing, on top of the empty string.
static NULL_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Strips surrounding whitespace and turns inner spaces into underscores.
pub fn normalize_header(name: &str) -> String {
    name.trim().replace(' ', "_")
}

pub fn is_null(cell: &str) -> bool {
    cell.is_empty() || NULL_MARKERS.contains(&cell)
}

/// Parses a `DD-MM-YYYY` date; anything else is treated as missing.
///
/// chrono's `%Y` takes years of any width, so the four-digit year is checked
/// here.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    let year = cell.rsplit('-').next()?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(cell, DATE_FORMAT).ok()
}

/// Parses a non-negative, finite price.
pub fn parse_price(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}

/// Parses a positive whole quantity. `3` and `3.0` are both accepted.
pub fn parse_quantity(cell: &str) -> Option<u32> {
    let cell = cell.trim();
    if let Ok(q) = cell.parse::<u32>() {
        return (q >= 1).then_some(q);
    }
    let q = cell.parse::<f64>().ok()?;
    if q.is_finite() && q.fract() == 0.0 && q >= 1.0 && q <= u32::MAX as f64 {
        Some(q as u32)
    } else {
        None
    }
}

fn parse_text(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Positions of every column within a source header row.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    schema: [usize; 9],
    extras: Vec<(usize, String)>,
}

impl ColumnLayout {
    /// Resolves the schema columns from a raw header row.
    ///
    /// When two headers normalize to the same name the first one wins and the
    /// later one is ignored.
    pub fn from_headers(headers: &StringRecord, path: &Path) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();

        let mut schema = [0usize; 9];
        for (slot, column) in schema.iter_mut().zip(SCHEMA) {
            *slot = normalized
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| DashboardError::Schema {
                    column,
                    path: path.to_path_buf(),
                })?;
        }

        let mut taken: HashSet<&str> = SCHEMA.iter().copied().collect();
        let mut extras = Vec::new();
        for (idx, name) in normalized.iter().enumerate() {
            if taken.insert(name.as_str()) {
                extras.push((idx, name.clone()));
            }
        }

        Ok(Self { schema, extras })
    }

    pub fn extra_columns(&self) -> Vec<String> {
        self.extras.iter().map(|(_, name)| name.clone()).collect()
    }

    /// Converts one raw row into a record, or `None` if any cell is missing
    /// or fails coercion.
    pub fn clean_row(&self, row: &StringRecord) -> Option<SaleRecord> {
        let cell = |idx: usize| row.get(idx).filter(|c| !is_null(c));
        let [
            order_id,
            date,
            product,
            purchase_type,
            payment_method,
            manager,
            city,
            price,
            quantity,
        ] = self.schema;

        let price = parse_price(cell(price)?);
        let quantity = parse_quantity(cell(quantity)?);
        let total_sales = price.zip(quantity).map(|(p, q)| p * q as f64);

        let extras = self
            .extras
            .iter()
            .map(|(idx, _)| cell(*idx).map(str::to_string))
            .collect::<Option<Vec<_>>>()?;

        Some(SaleRecord {
            order_id: parse_text(cell(order_id)?)?,
            date: parse_date(cell(date)?)?,
            product: parse_text(cell(product)?)?,
            purchase_type: parse_text(cell(purchase_type)?)?,
            payment_method: parse_text(cell(payment_method)?)?,
            manager: parse_text(cell(manager)?)?,
            city: parse_text(cell(city)?)?,
            price: price?,
            quantity: quantity?,
            total_sales: total_sales?,
            extras,
        })
    }
}

/// Drops repeated Order_IDs, keeping the first occurrence.
pub fn dedupe_orders(records: Vec<SaleRecord>) -> (Vec<SaleRecord>, usize) {
    let before = records.len();
    let mut seen = HashSet::new();
    let kept: Vec<SaleRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.order_id.clone()))
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

/// Runs the full cleaning pass over already-read rows.
pub fn clean_rows<I>(layout: &ColumnLayout, rows: I) -> (Vec<SaleRecord>, LoadReport)
where
    I: IntoIterator<Item = StringRecord>,
{
    let mut report = LoadReport::default();
    let mut complete = Vec::new();

    for (row_no, row) in rows.into_iter().enumerate() {
        report.rows_read += 1;
        match layout.clean_row(&row) {
            Some(record) => complete.push(record),
            None => {
                debug!(row = row_no + 1, "Dropping incomplete or malformed row");
                report.dropped_incomplete += 1;
            }
        }
    }

    let (records, duplicates_removed) = dedupe_orders(complete);
    report.duplicates_removed = duplicates_removed;
    report.rows_kept = records.len();

    (records, report)
}
