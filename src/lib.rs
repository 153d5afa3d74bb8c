/*!
# Sales Dashboard

A browser-based sales dashboard served by a small Rust web server.

## Overview

The user uploads a CSV or Excel file of sales records, picks regions, categories
and a date range, and the page redraws four charts: a monthly sales trend, the top
ten products, the regional share of sales and a region × category heatmap.

## Architecture

### Frontend Layer
- **Technologies**: HTML, CSS, vanilla JavaScript
- **Key Components**:
  - Upload zone - sends the chosen file to the server
  - Filter controls - region and category multi-selects, date range picker
  - Chart panels - show the server-rendered SVG, or a table when drawing failed
  - Dataset holder - keeps the serialized dataset between calls

### Backend Layer
- **Technologies**: Rust, axum
- **Core Components**:
  - Loader - decodes CSV/workbook bytes, validates columns, coerces dates
  - Filter - conjunctive region/category/date predicate over the rows
  - Aggregates - monthly, per-product, per-region and pivot sums
  - Charts - serializable chart specifications, drawn to SVG with plotters
  - Downloader - CSV/XLSX export of the filtered rows

The server keeps no dataset between requests. Each upload answers with the
serialized dataset, and every chart request sends it back.

## Modules

- **record**: sales rows and the dataset with its JSON form
- **loader**: upload decoding and validation
- **filter**: the filter selection and its predicate
- **aggregate**: group-by sums behind the four charts
- **chart**: chart specifications
- **graph**: SVG rendering of chart specifications
- **dashboard**: the upload and render handlers
- **downloader**: filtered-view export
- **config**: server settings
- **error**: error types
- **app**: routing

## REST API Endpoints

- `GET /` - the dashboard page
- `POST /api/upload` - multipart upload, field `file`
- `POST /api/charts` - dataset plus filter selection, answers four charts
- `POST /api/export?format=csv|xlsx` - filtered rows as a download
*/

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod downloader;
pub mod error;
pub mod filter;
pub mod loader;
pub mod record;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod graph;

/// Re-export the types most callers need
pub use chart::{ChartData, ChartSpec};
pub use config::DashboardConfig;
pub use dashboard::{DashboardCharts, RenderRequest, UploadResponse, handle_upload, render_dashboard};
pub use error::{DatasetError, ExportError, UploadError};
pub use filter::FilterSelection;
pub use record::{Dataset, SalesRecord};
