use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashSet};

use crate::analyzers::types::{CategorySales, DailySales, PeriodSales, ProductQuantity, SalesKpis};
use crate::analyzers::utility::{MONTH_NAMES, WEEKDAY_NAMES, rank_descending, safe_div};
use crate::model::SaleRecord;

/// How many products the top-product charts show.
pub const TOP_PRODUCTS: usize = 10;

pub fn total_sales(records: &[&SaleRecord]) -> f64 {
    records.iter().map(|r| r.total_sales).sum()
}

/// Number of distinct order identifiers.
pub fn total_orders(records: &[&SaleRecord]) -> usize {
    records
        .iter()
        .map(|r| r.order_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

pub fn kpis(records: &[&SaleRecord]) -> SalesKpis {
    let total_sales = total_sales(records);
    let total_orders = total_orders(records);
    SalesKpis {
        total_sales,
        total_orders,
        average_order_value: safe_div(total_sales, total_orders),
    }
}

/// Sales per calendar day, ascending by date. Days without sales are absent.
pub fn daily_sales(records: &[&SaleRecord]) -> Vec<DailySales> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in records {
        *by_day.entry(r.date).or_default() += r.total_sales;
    }
    by_day
        .into_iter()
        .map(|(date, total_sales)| DailySales { date, total_sales })
        .collect()
}

/// Sales per month name, always twelve slots from January to December.
///
/// Records from different years that share a month are summed together.
pub fn monthly_sales(records: &[&SaleRecord]) -> Vec<PeriodSales> {
    let mut slots = [0.0f64; 12];
    for r in records {
        slots[r.date.month0() as usize] += r.total_sales;
    }
    MONTH_NAMES
        .iter()
        .zip(slots)
        .map(|(&period, total_sales)| PeriodSales {
            period,
            total_sales,
        })
        .collect()
}

/// Sales per weekday, always seven slots from Monday to Sunday.
pub fn weekday_sales(records: &[&SaleRecord]) -> Vec<PeriodSales> {
    let mut slots = [0.0f64; 7];
    for r in records {
        slots[r.date.weekday().num_days_from_monday() as usize] += r.total_sales;
    }
    WEEKDAY_NAMES
        .iter()
        .zip(slots)
        .map(|(&period, total_sales)| PeriodSales {
            period,
            total_sales,
        })
        .collect()
}

/// Sums `total_sales` grouped by `key`, largest group first.
pub fn sales_by<F>(records: &[&SaleRecord], key: F) -> Vec<CategorySales>
where
    F: Fn(&SaleRecord) -> &str,
{
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for r in records {
        let k = key(*r);
        match totals.get_mut(k) {
            Some(total) => *total += r.total_sales,
            None => {
                totals.insert(k.to_string(), r.total_sales);
            }
        }
    }
    rank_descending(totals)
        .into_iter()
        .map(|(key, total_sales)| CategorySales { key, total_sales })
        .collect()
}

pub fn top_products_by_sales(records: &[&SaleRecord], limit: usize) -> Vec<CategorySales> {
    let mut ranked = sales_by(records, |r| &r.product);
    ranked.truncate(limit);
    ranked
}

pub fn top_products_by_quantity(records: &[&SaleRecord], limit: usize) -> Vec<ProductQuantity> {
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    for r in records {
        *totals.entry(r.product.clone()).or_default() += u64::from(r.quantity);
    }
    rank_descending(totals)
        .into_iter()
        .take(limit)
        .map(|(product, quantity)| ProductQuantity { product, quantity })
        .collect()
}

pub fn sales_by_city(records: &[&SaleRecord]) -> Vec<CategorySales> {
    sales_by(records, |r| &r.city)
}

pub fn sales_by_manager(records: &[&SaleRecord]) -> Vec<CategorySales> {
    sales_by(records, |r| &r.manager)
}

pub fn sales_by_purchase_type(records: &[&SaleRecord]) -> Vec<CategorySales> {
    sales_by(records, |r| &r.purchase_type)
}

pub fn sales_by_payment_method(records: &[&SaleRecord]) -> Vec<CategorySales> {
    sales_by(records, |r| &r.payment_method)
}
