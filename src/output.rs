//! Output formatting and persistence for computed views.
//!
//! Supports logging a summary, JSON serialization, and CSV export of the
//! filtered raw table (optionally gzip-compressed).

use anyhow::{Context, Result};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::types::CategorySales;
use crate::clean::{DATE_FORMAT, SCHEMA};
use crate::model::SaleRecord;
use crate::view::ViewModel;

/// Groups digits in threes with commas: `1234567` → `1,234,567`.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats a money amount as `$1,234.56`.
///
/// Amounts too large for whole cents in a `u64` are printed without digit
/// grouping rather than clamped.
pub fn format_currency(value: f64) -> String {
    let scaled = (value.abs() * 100.0).round();
    if !(scaled < u64::MAX as f64) {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{sign}${:.2}", value.abs());
    }
    let cents = scaled as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", format_thousands(cents / 100), cents % 100)
}

pub fn format_count(value: usize) -> String {
    format_thousands(value as u64)
}

/// Logs the view using Rust's debug pretty-print format.
pub fn print_pretty(view: &ViewModel) {
    debug!("{:#?}", view);
}

/// Logs the headline metrics and every summary table.
pub fn log_summary(view: &ViewModel) {
    info!(
        total_sales = %format_currency(view.kpis.total_sales),
        total_orders = %format_count(view.kpis.total_orders),
        average_order_value = %format_currency(view.kpis.average_order_value),
        records = view.records.len(),
        "Key metrics"
    );

    for day in &view.daily_sales {
        info!(date = %day.date, total_sales = %format_currency(day.total_sales), "Daily sales");
    }
    for month in &view.monthly_sales {
        info!(
            month = month.period,
            total_sales = %format_currency(month.total_sales),
            "Monthly sales"
        );
    }
    for weekday in &view.weekday_sales {
        info!(
            weekday = weekday.period,
            total_sales = %format_currency(weekday.total_sales),
            "Day-of-week sales"
        );
    }
    log_categories("Top products by sales", &view.top_products_by_sales);
    for p in &view.top_products_by_quantity {
        info!(
            product = %p.product,
            quantity = %format_thousands(p.quantity),
            "Top products by quantity"
        );
    }
    log_categories("Sales by city", &view.sales_by_city);
    log_categories("Sales by manager", &view.sales_by_manager);
    log_categories("Sales by purchase type", &view.sales_by_purchase_type);
    log_categories("Sales by payment method", &view.sales_by_payment_method);
}

fn log_categories(title: &str, rows: &[CategorySales]) {
    for row in rows {
        info!(
            key = %row.key,
            total_sales = %format_currency(row.total_sales),
            "{}",
            title
        );
    }
}

/// Writes `value` as pretty JSON to `path`, or to stdout when `path` is `None`.
pub fn write_json(path: Option<&Path>, value: &impl Serialize) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            std::fs::write(path, body)
                .with_context(|| format!("writing JSON to {}", path.display()))?;
            info!(path = %path.display(), "JSON written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{body}")?;
        }
    }
    Ok(())
}

/// Writes records as CSV with the schema header plus `Total_Sales` and any
/// extra columns. Dates are written back in `DD-MM-YYYY`.
pub fn write_records<W: Write>(
    writer: W,
    records: &[&SaleRecord],
    extra_columns: &[String],
) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);

    let header = SCHEMA
        .iter()
        .copied()
        .chain(std::iter::once("Total_Sales"))
        .chain(extra_columns.iter().map(String::as_str));
    wtr.write_record(header)?;

    for r in records {
        let date = r.date.format(DATE_FORMAT).to_string();
        let price = r.price.to_string();
        let quantity = r.quantity.to_string();
        let total = r.total_sales.to_string();
        let row = [
            r.order_id.as_str(),
            date.as_str(),
            r.product.as_str(),
            r.purchase_type.as_str(),
            r.payment_method.as_str(),
            r.manager.as_str(),
            r.city.as_str(),
            price.as_str(),
            quantity.as_str(),
            total.as_str(),
        ];
        wtr.write_record(row.into_iter().chain(r.extras.iter().map(String::as_str)))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports records to `path`, gzip-compressing when `gzip` is set.
pub fn export_records(
    path: &Path,
    records: &[&SaleRecord],
    extra_columns: &[String],
    gzip: bool,
) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;

    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_records(&mut encoder, records, extra_columns)?;
        encoder.finish()?;
    } else {
        write_records(file, records, extra_columns)?;
    }

    info!(path = %path.display(), rows = records.len(), gzip, "Records exported");
    Ok(())
}
