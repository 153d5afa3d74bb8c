#![cfg(not(tarpaulin_include))]
#![cfg(feature = "web")]

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::config::DashboardConfig;
use crate::dashboard::{self, DashboardCharts, RenderRequest, UploadResponse};
use crate::downloader::{self, ExportFormat};
use crate::graph::GraphOptions;

/// Read-only state shared by every request
///
/// No dataset lives here: the page carries it between calls.
pub struct AppState {
    pub config: DashboardConfig,
    pub graph_options: GraphOptions,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            graph_options: GraphOptions::default(),
        }
    }
}

#[derive(Deserialize)]
struct ExportQuery {
    format: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: String,
}

fn error_response(code: StatusCode, message: String) -> Response {
    (
        code,
        Json(ErrorResponse {
            status: "error".to_string(),
            message,
        }),
    )
        .into_response()
}

/// Build the application router
///
/// Split out from [`run`] so the routes can be driven in-process.
pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_bytes;
    let dataset_limit = state.config.dataset_body_limit();
    let static_dir = state.config.static_dir.clone();

    // Chart and export bodies carry the serialized dataset, which outgrows the file.
    Router::new()
        .route("/", get(serve_dashboard))
        .route(
            "/api/upload",
            post(upload_data).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/charts",
            post(update_charts).layer(DefaultBodyLimit::max(dataset_limit)),
        )
        .route(
            "/api/export",
            post(export_filtered).layer(DefaultBodyLimit::max(dataset_limit)),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

pub async fn run(config: DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let address = config.bind_address();
    let app = router(Arc::new(AppState::new(config)));

    let listener = TcpListener::bind(&address).await?;
    info!("Listening on http://{}", address);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_dashboard(State(state): State<Arc<AppState>>) -> Html<String> {
    let defaults = serde_json::json!({
        "start_date": state.config.default_start,
        "end_date": state.config.default_end,
    });

    let template = include_str!("./static/dashboard.html");
    Html(template.replace(
        "</head>",
        &format!(
            "    <script>const DASHBOARD_DEFAULTS = {};</script>\n</head>",
            defaults
        ),
    ))
}

async fn upload_data(mut multipart: Multipart) -> Json<UploadResponse> {
    let mut file_data = Vec::new();
    let mut filename = String::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("malformed upload body: {}", e);
                return Json(UploadResponse::failed(e.to_string()));
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        filename = field.file_name().unwrap_or_default().to_string();
        match field.bytes().await {
            Ok(bytes) => file_data = bytes.to_vec(),
            Err(e) => {
                warn!("upload of {:?} could not be read: {}", filename, e);
                return Json(UploadResponse::failed(e.to_string()));
            }
        }
    }

    debug!("received {:?} ({} bytes)", filename, file_data.len());
    Json(dashboard::handle_upload(&file_data, &filename))
}

async fn update_charts(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RenderRequest>,
) -> Json<DashboardCharts> {
    let dataset = request.dataset();
    let mut charts = dashboard::render_dashboard(dataset.as_ref(), &request.selection);
    charts.attach_svg(&state.graph_options);
    Json(charts)
}

async fn export_filtered(
    Query(params): Query<ExportQuery>,
    Json(request): Json<RenderRequest>,
) -> Response {
    let format = match ExportFormat::parse(params.format.as_deref().unwrap_or("csv")) {
        Ok(format) => format,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let dataset = request.dataset().unwrap_or_default();
    let rows = request.selection.apply(&dataset);

    match downloader::export(&rows, format) {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, format.content_type().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", format.file_name()),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            warn!("export failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
