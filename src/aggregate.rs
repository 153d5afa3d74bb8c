use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::record::SalesRecord;

/// Maximum number of bars in the top-products view
pub const TOP_PRODUCTS_LIMIT: usize = 10;

/// One month of the trend line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// Last day of the month the bucket covers
    pub month_end: NaiveDate,
    pub sales: f64,
}

/// Summed sales for one label (a product or a region)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelTotal {
    pub label: String,
    pub sales: f64,
}

/// Summed sales for one region together with its fraction of the filtered total
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionShare {
    pub region: String,
    pub sales: f64,
    /// In `0.0..=1.0` when all sales are non-negative; 0 when the total is 0
    pub share: f64,
}

/// Region × category sales pivot
///
/// `cells[r][c]` belongs to `regions[r]` and `categories[c]`. A `None` cell means no
/// filtered row had that combination.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub regions: Vec<String>,
    pub categories: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Pivot {
    /// Look a cell up by its labels
    pub fn get(&self, region: &str, category: &str) -> Option<f64> {
        let r = self.regions.iter().position(|x| x == region)?;
        let c = self.categories.iter().position(|x| x == category)?;
        self.cells[r][c]
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn month_end(start: NaiveDate) -> NaiveDate {
    start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(start)
}

/// Sales summed per calendar month
///
/// Every month from the earliest to the latest observed one is present, months
/// without rows carry 0.
pub fn monthly_trend(records: &[&SalesRecord]) -> Vec<MonthlyTotal> {
    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        *sums.entry(month_start(record.date.date())).or_insert(0.0) += record.sales_or_zero();
    }

    let (Some(&first), Some(&last)) = (sums.keys().next(), sums.keys().next_back()) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut cursor = first;
    while cursor <= last {
        out.push(MonthlyTotal {
            month_end: month_end(cursor),
            sales: sums.get(&cursor).copied().unwrap_or(0.0),
        });
        match cursor.checked_add_months(Months::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    out
}

/// The best-selling products, at most [`TOP_PRODUCTS_LIMIT`] of them
///
/// Sorted by summed sales descending; equal sums keep product-name order.
/// Rows without a product are skipped.
pub fn top_products(records: &[&SalesRecord]) -> Vec<LabelTotal> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for record in records {
        if let Some(product) = record.product.as_deref() {
            *sums.entry(product).or_insert(0.0) += record.sales_or_zero();
        }
    }

    let mut totals: Vec<LabelTotal> = sums
        .into_iter()
        .map(|(label, sales)| LabelTotal {
            label: label.to_string(),
            sales,
        })
        .collect();
    totals.sort_by(|a, b| b.sales.total_cmp(&a.sales));
    totals.truncate(TOP_PRODUCTS_LIMIT);
    totals
}

/// Sales per region with each region's share of the total, largest first
///
/// Equal sums keep the order in which the regions first appear.
pub fn region_share(records: &[&SalesRecord]) -> Vec<RegionShare> {
    let mut order: Vec<&str> = Vec::new();
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for record in records {
        let entry = sums.entry(record.region.as_str()).or_insert_with(|| {
            order.push(record.region.as_str());
            0.0
        });
        *entry += record.sales_or_zero();
    }

    let total: f64 = sums.values().sum();
    let mut shares: Vec<RegionShare> = order
        .into_iter()
        .map(|region| {
            let sales = sums[region];
            RegionShare {
                region: region.to_string(),
                sales,
                share: if total == 0.0 { 0.0 } else { sales / total },
            }
        })
        .collect();
    shares.sort_by(|a, b| b.sales.total_cmp(&a.sales));
    shares
}

/// Pivot of summed sales with regions as rows and categories as columns
///
/// Both axes are sorted ascending.
pub fn region_category_pivot(records: &[&SalesRecord]) -> Pivot {
    let regions: BTreeSet<&str> = records.iter().map(|r| r.region.as_str()).collect();
    let categories: BTreeSet<&str> = records.iter().map(|r| r.category.as_str()).collect();

    let mut sums: HashMap<(&str, &str), f64> = HashMap::new();
    for record in records {
        *sums
            .entry((record.region.as_str(), record.category.as_str()))
            .or_insert(0.0) += record.sales_or_zero();
    }

    let cells = regions
        .iter()
        .map(|region| {
            categories
                .iter()
                .map(|category| sums.get(&(*region, *category)).copied())
                .collect()
        })
        .collect();

    Pivot {
        regions: regions.into_iter().map(String::from).collect(),
        categories: categories.into_iter().map(String::from).collect(),
        cells,
    }
}
