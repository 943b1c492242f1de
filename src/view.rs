//! The single recomputation pass: filter, then every aggregation.

use serde::Serialize;
use tracing::debug;

use crate::analyzers::aggregate::{
    TOP_PRODUCTS, daily_sales, kpis, monthly_sales, sales_by_city, sales_by_manager,
    sales_by_payment_method, sales_by_purchase_type, top_products_by_quantity,
    top_products_by_sales, weekday_sales,
};
use crate::analyzers::types::{CategorySales, DailySales, PeriodSales, ProductQuantity, SalesKpis};
use crate::filter::{FilterParams, ResolvedFilter, apply};
use crate::model::{SaleRecord, SalesDataset};

/// Everything a presentation layer needs for one filter state.
///
/// Borrows the records from the dataset it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel<'a> {
    pub filter: ResolvedFilter,
    pub kpis: SalesKpis,
    pub daily_sales: Vec<DailySales>,
    pub monthly_sales: Vec<PeriodSales>,
    pub weekday_sales: Vec<PeriodSales>,
    pub top_products_by_sales: Vec<CategorySales>,
    pub top_products_by_quantity: Vec<ProductQuantity>,
    pub sales_by_city: Vec<CategorySales>,
    pub sales_by_manager: Vec<CategorySales>,
    pub sales_by_purchase_type: Vec<CategorySales>,
    pub sales_by_payment_method: Vec<CategorySales>,
    pub records: Vec<&'a SaleRecord>,
}

/// Filters `dataset` with `params` and computes every summary over the
/// result. Pure and synchronous; callers rerun it on each parameter change.
#[tracing::instrument(skip_all, fields(rows = dataset.len()))]
pub fn compute_view<'a>(dataset: &'a SalesDataset, params: &FilterParams) -> ViewModel<'a> {
    let subset = apply(dataset, params);
    let records = subset.records();
    debug!(selected = records.len(), "Filter applied");

    ViewModel {
        kpis: kpis(records),
        daily_sales: daily_sales(records),
        monthly_sales: monthly_sales(records),
        weekday_sales: weekday_sales(records),
        top_products_by_sales: top_products_by_sales(records, TOP_PRODUCTS),
        top_products_by_quantity: top_products_by_quantity(records, TOP_PRODUCTS),
        sales_by_city: sales_by_city(records),
        sales_by_manager: sales_by_manager(records),
        sales_by_purchase_type: sales_by_purchase_type(records),
        sales_by_payment_method: sales_by_payment_method(records),
        records: records.to_vec(),
        filter: subset.filter,
    }
}
