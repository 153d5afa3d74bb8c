use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::{Dataset, SalesRecord};

/// The region, category and date-range constraints currently chosen on the page
///
/// Empty region or category lists mean "all". A missing bound leaves that side of
/// the date range open. Both bounds are calendar days and both are inclusive.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub regions: Vec<String>,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl FilterSelection {
    /// Selection with no region/category constraint over the given day range
    pub fn between(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Self::default()
        }
    }

    pub fn matches_region(&self, region: &str) -> bool {
        self.regions.is_empty() || self.regions.iter().any(|r| r == region)
    }

    pub fn matches_category(&self, category: &str) -> bool {
        self.categories.is_empty() || self.categories.iter().any(|c| c == category)
    }

    pub fn matches_date(&self, day: NaiveDate) -> bool {
        self.start_date.is_none_or(|start| start <= day)
            && self.end_date.is_none_or(|end| day <= end)
    }

    /// Conjunction of the three predicates for a single row
    pub fn matches(&self, record: &SalesRecord) -> bool {
        self.matches_region(&record.region)
            && self.matches_category(&record.category)
            && self.matches_date(record.date.date())
    }

    /// Rows of `dataset` that satisfy the selection, in upload order
    ///
    /// # Examples
    /// ```
    /// use sales_dashboard::filter::FilterSelection;
    /// use sales_dashboard::record::Dataset;
    ///
    /// let selection = FilterSelection::default();
    /// assert!(selection.apply(&Dataset::default()).is_empty());
    /// ```
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Vec<&'a SalesRecord> {
        dataset.records.iter().filter(|r| self.matches(r)).collect()
    }
}
