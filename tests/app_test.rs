#![cfg(feature = "web")]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use sales_dashboard::app::{AppState, router};
use sales_dashboard::config::DashboardConfig;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "dashboard-test-boundary";

const SALES_CSV: &str = "\
Date,Region,Product,Sales,Category
2023-01-05,North,Widget,100,Tools
2023-02-10,South,Gadget,40,Toys
2023-02-11,North,Gizmo,60,Tools
2024-03-01,South,Widget,5,Tools
";

fn app() -> Router {
    app_with(DashboardConfig::default())
}

fn app_with(config: DashboardConfig) -> Router {
    router(Arc::new(AppState::new(config)))
}

fn multipart_upload(filename: &str, contents: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n{c}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = filename,
        c = contents
    );
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn dashboard_page_carries_default_date_range() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("DASHBOARD_DEFAULTS"));
    assert!(page.contains("2023-01-01"));
    assert!(page.contains("2023-12-31"));
    assert!(page.contains("region-filter"));
}

#[tokio::test]
async fn upload_then_charts_round_trip() {
    let response = app()
        .oneshot(multipart_upload("sales.csv", SALES_CSV))
        .await
        .unwrap();
    let upload = body_json(response).await;
    assert_eq!(upload["status"], "ok");
    assert_eq!(upload["regions"], json!(["North", "South"]));
    assert_eq!(upload["categories"], json!(["Tools", "Toys"]));
    assert_eq!(upload["rows"], 4);

    let request = json!({
        "dataset": upload["dataset"],
        "regions": [],
        "categories": ["Tools"],
        "start_date": "2023-01-01",
        "end_date": "2023-12-31",
    });
    let response = app().oneshot(json_post("/api/charts", request)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let charts = body_json(response).await;

    assert_eq!(charts["top_products"]["kind"], "bar");
    assert_eq!(charts["top_products"]["x"], json!(["Widget", "Gizmo"]));
    assert_eq!(charts["trend"]["kind"], "line");
    assert_eq!(charts["trend"]["y"], json!([100.0, 60.0]));
    assert_eq!(charts["region_share"]["labels"], json!(["North"]));
    assert_eq!(charts["heatmap"]["z"], json!([[160.0]]));
}

#[tokio::test]
async fn bad_upload_clears_options_without_failing() {
    let csv = "Date,Region,Sales\n2023-01-05,North,1\n";
    let response = app().oneshot(multipart_upload("sales.csv", csv)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["regions"], json!([]));
    assert_eq!(body["categories"], json!([]));
    assert!(body.get("dataset").is_none());
    assert!(body["message"].as_str().unwrap().contains("Product"));
}

#[tokio::test]
async fn charts_without_dataset_are_empty() {
    let response = app()
        .oneshot(json_post("/api/charts", json!({ "regions": [], "categories": [] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let charts = body_json(response).await;
    for key in ["trend", "top_products"] {
        assert_eq!(charts[key]["x"], json!([]), "{} should be empty", key);
    }
    assert_eq!(charts["region_share"]["labels"], json!([]));
    assert_eq!(charts["heatmap"]["y"], json!([]));
}

#[tokio::test]
async fn export_returns_filtered_csv_download() {
    let response = app()
        .oneshot(multipart_upload("sales.csv", SALES_CSV))
        .await
        .unwrap();
    let upload = body_json(response).await;
    let request = json!({
        "dataset": upload["dataset"],
        "regions": ["South"],
        "start_date": "2023-01-01",
        "end_date": "2023-12-31",
    });

    let response = app()
        .oneshot(json_post("/api/export?format=csv", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("filtered_sales.csv")
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(
        csv,
        "Date,Region,Product,Sales,Category\n2023-02-10 00:00:00,South,Gadget,40,Toys\n"
    );
}

#[tokio::test]
async fn export_rejects_unknown_format() {
    let response = app()
        .oneshot(json_post("/api/export?format=pdf", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["status"], "error");
}

#[tokio::test]
async fn upload_near_the_limit_can_still_be_charted() {
    let config = DashboardConfig {
        max_upload_bytes: 8 * 1024,
        ..DashboardConfig::default()
    };

    let mut csv = String::from("Date,Region,Product,Sales,Category\n");
    for _ in 0..200 {
        csv.push_str("2023-01-05,North,Widget,1,Tools\n");
    }
    assert!(csv.len() > 6 * 1024);

    let response = app_with(config.clone())
        .oneshot(multipart_upload("sales.csv", &csv))
        .await
        .unwrap();
    let upload = body_json(response).await;
    assert_eq!(upload["status"], "ok");
    assert_eq!(upload["rows"], 200);
    assert!(upload["dataset"].as_str().unwrap().len() > config.max_upload_bytes);

    let request = json!({ "dataset": upload["dataset"], "regions": [], "categories": [] });
    let response = app_with(config.clone())
        .oneshot(json_post("/api/charts", request.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let charts = body_json(response).await;
    assert_eq!(charts["top_products"]["y"], json!([200.0]));

    let response = app_with(config)
        .oneshot(json_post("/api/export?format=csv", request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn upload_over_the_limit_is_refused() {
    let config = DashboardConfig {
        max_upload_bytes: 1024,
        ..DashboardConfig::default()
    };

    let mut csv = String::from("Date,Region,Product,Sales,Category\n");
    for _ in 0..100 {
        csv.push_str("2023-01-05,North,Widget,1,Tools\n");
    }

    let response = app_with(config)
        .oneshot(multipart_upload("sales.csv", &csv))
        .await
        .unwrap();
    if response.status() == StatusCode::OK {
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert!(body.get("dataset").is_none());
    } else {
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
