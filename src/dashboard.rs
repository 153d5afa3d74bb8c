//! The two dashboard handlers: one turns an upload into a serialized dataset plus
//! filter options, the other turns a dataset plus a filter selection into charts.
//!
//! Both are plain synchronous functions. The web layer only moves bytes and JSON
//! in and out of them.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::aggregate;
use crate::chart::{self, ChartSpec};
use crate::filter::FilterSelection;
use crate::loader;
use crate::record::{Dataset, SalesRecord};

/// What the page receives after an upload
///
/// On failure `dataset` is absent so the page keeps whatever it already had, while
/// the option lists come back empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Serialized [`Dataset`] blob to hand back on every render request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    pub regions: Vec<String>,
    pub categories: Vec<String>,

    #[serde(default)]
    pub rows: usize,

    #[serde(default)]
    pub dropped_rows: usize,
}

impl UploadResponse {
    /// Error response with empty option lists and no dataset
    pub fn failed(message: String) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message),
            dataset: None,
            regions: Vec::new(),
            categories: Vec::new(),
            rows: 0,
            dropped_rows: 0,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Decode, validate and serialize an uploaded file
///
/// Never fails outright: every decode or validation problem is logged and folded
/// into an error response with empty option lists.
///
/// # Examples
/// ```
/// use sales_dashboard::dashboard::handle_upload;
///
/// let csv = b"Date,Region,Product,Sales,Category\n2023-02-01,East,Gadget,5,Toys\n";
/// let response = handle_upload(csv, "sales.csv");
/// assert!(response.is_ok());
/// assert_eq!(response.regions, vec!["East".to_string()]);
/// ```
pub fn handle_upload(bytes: &[u8], filename: &str) -> UploadResponse {
    let report = match loader::load_dataset(bytes, filename) {
        Ok(report) => report,
        Err(e) => {
            warn!("upload of {:?} rejected: {}", filename, e);
            return UploadResponse::failed(e.to_string());
        }
    };

    let dataset = report.dataset;
    let blob = match dataset.to_json() {
        Ok(blob) => blob,
        Err(e) => {
            warn!("upload of {:?} could not be serialized: {}", filename, e);
            return UploadResponse::failed(e.to_string());
        }
    };

    info!(
        "loaded {:?}: {} rows kept, {} dropped",
        filename,
        dataset.len(),
        report.dropped_rows
    );

    UploadResponse {
        status: "ok".to_string(),
        message: None,
        dataset: Some(blob),
        regions: dataset.regions(),
        categories: dataset.categories(),
        rows: dataset.len(),
        dropped_rows: report.dropped_rows,
    }
}

/// Body of a render or export request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Blob previously returned by [`handle_upload`]; absent before any upload
    #[serde(default)]
    pub dataset: Option<String>,

    #[serde(flatten)]
    pub selection: FilterSelection,
}

impl RenderRequest {
    /// Decode the carried dataset, treating an unreadable blob like a missing one
    pub fn dataset(&self) -> Option<Dataset> {
        let blob = self.dataset.as_deref()?;
        match Dataset::from_json(blob) {
            Ok(dataset) => Some(dataset),
            Err(e) => {
                warn!("ignoring unreadable dataset blob: {}", e);
                None
            }
        }
    }
}

/// The four charts the page shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardCharts {
    pub trend: ChartSpec,
    pub top_products: ChartSpec,
    pub region_share: ChartSpec,
    pub heatmap: ChartSpec,
}

impl DashboardCharts {
    /// Four charts with titles but no data, shown before anything is uploaded
    pub fn empty() -> Self {
        build_charts(&[])
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ChartSpec> {
        [
            &mut self.trend,
            &mut self.top_products,
            &mut self.region_share,
            &mut self.heatmap,
        ]
        .into_iter()
    }

    /// Fill in the `svg` field of every chart
    ///
    /// A chart that fails to draw keeps `svg: None`; the failure is logged.
    #[cfg(feature = "web")]
    pub fn attach_svg(&mut self, options: &crate::graph::GraphOptions) {
        for spec in self.iter_mut() {
            match crate::graph::create_graph(spec, options) {
                Ok(svg) => spec.svg = Some(svg),
                Err(e) => warn!("could not draw {:?}: {}", spec.title, e),
            }
        }
    }
}

/// Aggregate an already filtered row set into the four charts
pub fn build_charts(rows: &[&SalesRecord]) -> DashboardCharts {
    DashboardCharts {
        trend: chart::trend_chart(&aggregate::monthly_trend(rows)),
        top_products: chart::top_products_chart(&aggregate::top_products(rows)),
        region_share: chart::region_pie_chart(&aggregate::region_share(rows)),
        heatmap: chart::heatmap_chart(&aggregate::region_category_pivot(rows)),
    }
}

/// Filter the dataset and compute the four charts
///
/// A missing dataset yields [`DashboardCharts::empty`] rather than an error.
pub fn render_dashboard(dataset: Option<&Dataset>, selection: &FilterSelection) -> DashboardCharts {
    let Some(dataset) = dataset else {
        debug!("render requested without a dataset");
        return DashboardCharts::empty();
    };

    let rows = selection.apply(dataset);
    debug!(
        "render: {} of {} rows match {:?}",
        rows.len(),
        dataset.len(),
        selection
    );
    build_charts(&rows)
}
