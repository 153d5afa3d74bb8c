use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::DatasetError;

/// Header names every uploaded file must carry, in export order
pub const REQUIRED_COLUMNS: [&str; 5] = ["Date", "Region", "Product", "Sales", "Category"];

/// One row of the uploaded sales table
///
/// Field names serialize with the same capitalised names the upload header uses,
/// so the JSON blob reads like the uploaded table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDateTime,

    #[serde(rename = "Region")]
    pub region: String,

    /// Absent when the cell was empty; such rows are skipped by product grouping
    #[serde(rename = "Product")]
    pub product: Option<String>,

    /// Absent when the cell was empty or not a number; contributes nothing to sums
    #[serde(rename = "Sales")]
    pub sales: Option<f64>,

    #[serde(rename = "Category")]
    pub category: String,
}

impl SalesRecord {
    /// Sales value as it contributes to a sum
    pub fn sales_or_zero(&self) -> f64 {
        self.sales.unwrap_or(0.0)
    }
}

/// The parsed sales table currently held by the page
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub records: Vec<SalesRecord>,
}

impl Dataset {
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct regions in first-appearance order
    pub fn regions(&self) -> Vec<String> {
        unique_in_order(self.records.iter().map(|r| r.region.as_str()))
    }

    /// Distinct categories in first-appearance order
    pub fn categories(&self) -> Vec<String> {
        unique_in_order(self.records.iter().map(|r| r.category.as_str()))
    }

    /// Serialize into the JSON blob handed to the browser
    pub fn to_json(&self) -> Result<String, DatasetError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rebuild a dataset from the blob the browser sends back
    pub fn from_json(blob: &str) -> Result<Self, DatasetError> {
        Ok(serde_json::from_str(blob)?)
    }
}

fn unique_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        if seen.insert(value) {
            out.push(value.to_string());
        }
    }
    out
}
