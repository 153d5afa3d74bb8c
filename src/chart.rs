use serde::{Deserialize, Serialize};

use crate::aggregate::{LabelTotal, MonthlyTotal, Pivot, RegionShare};

/// Data carried by a chart, tagged by the kind of chart that draws it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    /// Points joined in x order
    Line { x: Vec<String>, y: Vec<f64> },

    /// One bar per label
    Bar { x: Vec<String>, y: Vec<f64> },

    /// One slice per label; `values` are absolute, the renderer derives the angles
    Pie { labels: Vec<String>, values: Vec<f64> },

    /// `z[row][col]` is the value for `y[row]` and `x[col]`
    Heatmap {
        x: Vec<String>,
        y: Vec<String>,
        z: Vec<Vec<Option<f64>>>,
    },
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Line { x, .. } | ChartData::Bar { x, .. } => x.is_empty(),
            ChartData::Pie { labels, .. } => labels.is_empty(),
            ChartData::Heatmap { y, .. } => y.is_empty(),
        }
    }
}

/// Serializable description of one dashboard chart
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,

    #[serde(flatten)]
    pub data: ChartData,

    /// Server-rendered drawing; absent when rendering was skipped or failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
}

impl ChartSpec {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Monthly trend as a line chart, x labelled by month-end date
pub fn trend_chart(trend: &[MonthlyTotal]) -> ChartSpec {
    ChartSpec {
        title: "Monthly Sales Trend".to_string(),
        x_label: "Date".to_string(),
        y_label: "Sales".to_string(),
        data: ChartData::Line {
            x: trend
                .iter()
                .map(|m| m.month_end.format("%Y-%m-%d").to_string())
                .collect(),
            y: trend.iter().map(|m| m.sales).collect(),
        },
        svg: None,
    }
}

pub fn top_products_chart(products: &[LabelTotal]) -> ChartSpec {
    ChartSpec {
        title: "Top 10 Products by Sales".to_string(),
        x_label: "Product".to_string(),
        y_label: "Sales".to_string(),
        data: ChartData::Bar {
            x: products.iter().map(|p| p.label.clone()).collect(),
            y: products.iter().map(|p| p.sales).collect(),
        },
        svg: None,
    }
}

pub fn region_pie_chart(shares: &[RegionShare]) -> ChartSpec {
    ChartSpec {
        title: "Sales Distribution by Region".to_string(),
        x_label: "Region".to_string(),
        y_label: "Sales".to_string(),
        data: ChartData::Pie {
            labels: shares.iter().map(|s| s.region.clone()).collect(),
            values: shares.iter().map(|s| s.sales).collect(),
        },
        svg: None,
    }
}

pub fn heatmap_chart(pivot: &Pivot) -> ChartSpec {
    ChartSpec {
        title: "Sales Heatmap (Region vs Category)".to_string(),
        x_label: "Category".to_string(),
        y_label: "Region".to_string(),
        data: ChartData::Heatmap {
            x: pivot.categories.clone(),
            y: pivot.regions.clone(),
            z: pivot.cells.clone(),
        },
        svg: None,
    }
}
