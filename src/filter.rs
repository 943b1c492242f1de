//! Conjunctive filtering over date range, city, manager and product.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::{SaleRecord, SalesDataset};

/// User-supplied filter. `None` means "use the default" (the full date span,
/// or every distinct value); `Some` of an empty set selects nothing.
///
/// As JSON, dates use `YYYY-MM-DD`:
///
/// ```json
/// { "start": "2024-01-01", "cities": ["NYC", "LA"], "products": [] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterParams {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub cities: Option<BTreeSet<String>>,
    pub managers: Option<BTreeSet<String>>,
    pub products: Option<BTreeSet<String>>,
}

impl FilterParams {
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn with_cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cities = Some(cities.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_managers<I, S>(mut self, managers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.managers = Some(managers.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_products<I, S>(mut self, products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.products = Some(products.into_iter().map(Into::into).collect());
        self
    }

    /// Overlays every field that is set in `other` onto `self`.
    pub fn merged_with(self, other: FilterParams) -> Self {
        FilterParams {
            start: other.start.or(self.start),
            end: other.end.or(self.end),
            cities: other.cities.or(self.cities),
            managers: other.managers.or(self.managers),
            products: other.products.or(self.products),
        }
    }

    /// Fills the defaults from `dataset`.
    pub fn resolve(&self, dataset: &SalesDataset) -> ResolvedFilter {
        let bounds = dataset.date_bounds();
        ResolvedFilter {
            start: self.start.or(bounds.map(|(min, _)| min)),
            end: self.end.or(bounds.map(|(_, max)| max)),
            cities: selection(&self.cities, dataset, |r| &r.city),
            managers: selection(&self.managers, dataset, |r| &r.manager),
            products: selection(&self.products, dataset, |r| &r.product),
        }
    }
}

fn selection(
    chosen: &Option<BTreeSet<String>>,
    dataset: &SalesDataset,
    field: fn(&SaleRecord) -> &str,
) -> BTreeSet<String> {
    match chosen {
        Some(values) => values.clone(),
        None => dataset.distinct(field).into_iter().collect(),
    }
}

/// A filter with every default filled in.
///
/// Date bounds are `None` only when the dataset is empty and no bound was
/// given, in which case that side is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub cities: BTreeSet<String>,
    pub managers: BTreeSet<String>,
    pub products: BTreeSet<String>,
}

impl ResolvedFilter {
    pub fn matches(&self, record: &SaleRecord) -> bool {
        self.start.is_none_or(|start| record.date >= start)
            && self.end.is_none_or(|end| record.date <= end)
            && self.cities.contains(&record.city)
            && self.managers.contains(&record.manager)
            && self.products.contains(&record.product)
    }
}

/// Records of the full dataset that pass a [`ResolvedFilter`], in load order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredSubset<'a> {
    pub filter: ResolvedFilter,
    records: Vec<&'a SaleRecord>,
}

impl<'a> FilteredSubset<'a> {
    pub fn records(&self) -> &[&'a SaleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Applies `params` to `dataset`. Pure: the same inputs always yield the same
/// subset.
pub fn apply<'a>(dataset: &'a SalesDataset, params: &FilterParams) -> FilteredSubset<'a> {
    let filter = params.resolve(dataset);
    let records = dataset
        .records()
        .iter()
        .filter(|r| filter.matches(r))
        .collect();
    FilteredSubset { filter, records }
}

/// Choices offered to a filter widget: the date span and the distinct values
/// of each categorical dimension in first-appearance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub cities: Vec<String>,
    pub managers: Vec<String>,
    pub products: Vec<String>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &SalesDataset) -> Self {
        let bounds = dataset.date_bounds();
        FilterOptions {
            min_date: bounds.map(|(min, _)| min),
            max_date: bounds.map(|(_, max)| max),
            cities: dataset.distinct(|r| &r.city),
            managers: dataset.distinct(|r| &r.manager),
            products: dataset.distinct(|r| &r.product),
        }
    }
}
