use flate2::Compression;
use flate2::write::GzEncoder;
use sales_dashboard::cache::DatasetCache;
use sales_dashboard::error::DashboardError;
use sales_dashboard::filter::{FilterParams, apply};
use sales_dashboard::loader::{DataSource, load};
use sales_dashboard::output::{export_records, format_currency};
use sales_dashboard::view::compute_view;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

const FIXTURE: &str = include_str!("fixtures/sample_sales.csv");

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn write_gzip(path: &Path, content: &str) {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    std::fs::write(path, encoder.finish().unwrap()).unwrap();
}

fn fixture_source(dir: &Path) -> DataSource {
    let fallback = dir.join("sales.csv");
    std::fs::write(&fallback, FIXTURE).unwrap();
    DataSource::new(dir.join("sales.csv.gz"), fallback)
}

#[test]
fn test_cleaning_pipeline_on_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let ds = load(&fixture_source(dir.path())).unwrap();

    assert_eq!(ds.source(), dir.path().join("sales.csv"));
    assert_eq!(ds.len(), 9);
    assert_eq!(ds.report().rows_read, 13);
    assert_eq!(ds.report().dropped_incomplete, 3);
    assert_eq!(ds.report().duplicates_removed, 1);

    let ids: HashSet<&str> = ds.records().iter().map(|r| r.order_id.as_str()).collect();
    assert_eq!(ids.len(), ds.len());

    for r in ds.records() {
        assert_eq!(r.total_sales, r.price * r.quantity as f64);
        assert_eq!(r.product, r.product.trim());
        assert_eq!(r.manager, r.manager.trim());
        assert_eq!(r.purchase_type, r.purchase_type.trim());
    }

    // The first 10452 row wins over the later duplicate.
    let first = &ds.records()[0];
    assert_eq!(first.order_id, "10452");
    assert_eq!(first.quantity, 573);
    assert_eq!(first.product, "Fries");
    assert_eq!(first.manager, "Tom Jackson");

    assert!(!ids.contains("10457"), "non-numeric quantity must drop the row");
    assert!(!ids.contains("10459"), "wrong date format must drop the row");
    assert!(!ids.contains("10461"), "missing quantity must drop the row");
}

#[test]
fn test_gzip_primary_matches_plain_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let source = fixture_source(dir.path());
    let plain = load(&source).unwrap();

    write_gzip(&source.primary, FIXTURE);
    let compressed = load(&source).unwrap();

    assert_eq!(compressed.source(), source.primary.as_path());
    assert_eq!(plain.records(), compressed.records());
}

#[test]
fn test_missing_column_aborts_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_city.csv");
    std::fs::write(
        &path,
        "Order ID,Date,Product,Purchase Type,Payment Method,Manager,Price,Quantity\n\
         1,01-01-2024,Widget,Retail,Cash,Alice,10,2\n",
    )
    .unwrap();

    let err = load(&DataSource::single(&path)).unwrap_err();
    match err {
        DashboardError::Schema { column, .. } => assert_eq!(column, "City"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_cache_shares_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let source = fixture_source(dir.path());
    let mut cache = DatasetCache::new();

    let a = cache.get_or_load(&source).unwrap();
    let b = cache.get_or_load(&source).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_view_over_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let ds = load(&fixture_source(dir.path())).unwrap();
    let view = compute_view(&ds, &FilterParams::default());

    assert!(close(view.kpis.total_sales, 19823.78));
    assert_eq!(view.kpis.total_orders, 9);
    assert!(close(view.kpis.average_order_value, 19823.78 / 9.0));
    assert_eq!(format_currency(view.kpis.total_sales), "$19,823.78");

    let cities: Vec<&str> = view.sales_by_city.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(cities, vec!["Berlin", "London", "Madrid", "Lisbon", "Paris"]);

    assert_eq!(view.top_products_by_quantity[0].product, "Beverages");
    assert_eq!(view.top_products_by_quantity[0].quantity, 1455);

    assert!(close(view.monthly_sales[10].total_sales, 17420.28));
    assert!(close(view.monthly_sales[11].total_sales, 2403.5));
    assert_eq!(view.monthly_sales[0].total_sales, 0.0);

    // 07-11-2022 and 05-12-2022 were Mondays.
    assert!(close(
        view.weekday_sales[0].total_sales,
        1999.77 + 2197.75 + 998.0 + 1209.5
    ));

    for groups in [
        &view.sales_by_city,
        &view.sales_by_manager,
        &view.sales_by_purchase_type,
        &view.sales_by_payment_method,
    ] {
        let sum: f64 = groups.iter().map(|g| g.total_sales).sum();
        assert!(close(sum, view.kpis.total_sales));
    }
}

#[test]
fn test_filter_conjunction_over_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let ds = load(&fixture_source(dir.path())).unwrap();
    let params = FilterParams::default()
        .with_cities(["London", "Madrid", "Lisbon"])
        .with_products(["Beverages", "Fries", "Chicken Sandwiches"]);

    let subset = apply(&ds, &params);
    let kept: HashSet<&str> = subset
        .records()
        .iter()
        .map(|r| r.order_id.as_str())
        .collect();
    assert_eq!(kept, HashSet::from(["10452", "10453", "10458", "10462", "10463"]));

    for r in ds.records() {
        let in_subset = kept.contains(r.order_id.as_str());
        let passes = ["London", "Madrid", "Lisbon"].contains(&r.city.as_str())
            && ["Beverages", "Fries", "Chicken Sandwiches"].contains(&r.product.as_str());
        assert_eq!(in_subset, passes, "order {}", r.order_id);
    }

    assert_eq!(apply(&ds, &params), apply(&ds, &params));
}

#[test]
fn test_empty_city_selection_gives_empty_view() {
    let dir = tempfile::tempdir().unwrap();
    let ds = load(&fixture_source(dir.path())).unwrap();
    let params = FilterParams::default().with_cities(Vec::<String>::new());
    let view = compute_view(&ds, &params);

    assert!(view.records.is_empty());
    assert_eq!(view.kpis.total_orders, 0);
    assert_eq!(view.kpis.average_order_value, 0.0);
    assert_eq!(view.monthly_sales.len(), 12);
}

#[test]
fn test_export_reloads_same_records() {
    let dir = tempfile::tempdir().unwrap();
    let ds = load(&fixture_source(dir.path())).unwrap();
    let params = FilterParams::default().with_managers(["Tom Jackson", "Walter Muller"]);
    let view = compute_view(&ds, &params);
    assert_eq!(view.records.len(), 4);

    let out = dir.path().join("export.csv.gz");
    export_records(&out, &view.records, ds.extra_columns(), true).unwrap();

    let reloaded = load(&DataSource::single(&out)).unwrap();
    assert_eq!(reloaded.len(), 4);
    assert_eq!(reloaded.extra_columns(), ["Total_Sales"]);
    for (a, b) in reloaded.records().iter().zip(&view.records) {
        assert_eq!(a.order_id, b.order_id);
        assert_eq!(a.date, b.date);
        assert_eq!(a.total_sales, b.total_sales);
    }
}
