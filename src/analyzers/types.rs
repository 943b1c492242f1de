//! Summary tables produced by the aggregation set.

use chrono::NaiveDate;
use serde::Serialize;

/// Headline metrics for the current selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SalesKpis {
    pub total_sales: f64,
    pub total_orders: usize,
    /// `total_sales / total_orders`, or 0 when there are no orders.
    pub average_order_value: f64,
}

/// One point of the daily sales line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub total_sales: f64,
}

/// Sales for one slot of a fixed calendar axis (month or weekday).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSales {
    pub period: &'static str,
    pub total_sales: f64,
}

/// Sales attributed to one value of a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySales {
    pub key: String,
    pub total_sales: f64,
}

/// Units sold of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductQuantity {
    pub product: String,
    pub quantity: u64,
}
