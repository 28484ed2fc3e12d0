use std::io::Cursor;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use tower::ServiceExt;

use disaster_vision::api::{create_app, AppState};
use disaster_vision::mocks::{create_mock_damage_scorer, create_mock_disaster_scorer};
use disaster_vision::{Axis, Classifier, Config, ScorerRegistry};

const BOUNDARY: &str = "disaster-vision-test-boundary";

struct Part<'a> {
    name: &'a str,
    filename: Option<&'a str>,
    content_type: Option<&'a str>,
    data: Vec<u8>,
}

fn file_part<'a>(name: &'a str, filename: &'a str, content_type: &'a str, data: Vec<u8>) -> Part<'a> {
    Part {
        name,
        filename: Some(filename),
        content_type: Some(content_type),
        data,
    }
}

fn text_part<'a>(name: &'a str, value: &str) -> Part<'a> {
    Part {
        name,
        filename: None,
        content_type: None,
        data: value.as_bytes().to_vec(),
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(filename) = part.filename {
            disposition.push_str(&format!("; filename=\"{filename}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn png_bytes() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([40, 80, 120])))
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

fn app(disaster: bool, damage: bool) -> Router {
    let registry = Arc::new(ScorerRegistry::new(0));
    if disaster {
        registry.install(Axis::Disaster, Arc::new(create_mock_disaster_scorer()));
    }
    if damage {
        registry.install(Axis::Damage, Arc::new(create_mock_damage_scorer()));
    }
    create_app(AppState::new(Classifier::new(registry), Config::default()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post_multipart(app: Router, uri: &str, parts: &[Part<'_>]) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_reports_loaded_axes() {
    let (status, body) = get(app(true, false), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["disaster_model_loaded"], true);
    assert_eq!(body["damage_model_loaded"], false);
    assert_eq!(body["disaster_model_input_size"], json!([64, 64]));
    assert_eq!(body["damage_model_input_size"], Value::Null);
    assert_eq!(
        body["supported_disaster_classes"],
        json!(["Cyclone", "Earthquake", "Flood", "Wildfire"])
    );
    assert_eq!(body["damage_device"], body["device"]);
}

#[tokio::test]
async fn test_root_and_classes() {
    let (status, body) = get(app(false, false), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disaster_model_loaded"], false);

    let (status, body) = get(app(false, false), "/classes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["damage"]["count"], 4);
    assert_eq!(body["damage"]["classes"][3], "Destroyed");
}

#[tokio::test]
async fn test_predict_disaster() {
    let parts = [file_part("file", "flood.png", "image/png", png_bytes())];
    let (status, body) = post_multipart(app(true, true), "/predict-disaster", &parts).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["filename"], "flood.png");
    assert_eq!(body["type"], "disaster_detection");
    assert_eq!(body["prediction"]["predicted_class"], "Flood");

    let keys: Vec<_> = body["prediction"]["probabilities"]
        .as_object()
        .unwrap()
        .keys()
        .cloned()
        .collect();
    assert_eq!(keys, vec!["Cyclone", "Earthquake", "Flood", "Wildfire"]);
}

#[tokio::test]
async fn test_legacy_predict_route() {
    let parts = [file_part("file", "a.png", "image/png", png_bytes())];
    let (status, body) = post_multipart(app(true, false), "/predict", &parts).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "disaster_detection");
}

#[tokio::test]
async fn test_predict_damage_without_model() {
    let parts = [file_part("file", "a.png", "image/png", png_bytes())];
    let (status, body) = post_multipart(app(true, false), "/predict-damage", &parts).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["error_type"], "model_not_loaded");
}

#[tokio::test]
async fn test_non_image_upload_is_rejected() {
    let parts = [file_part("file", "notes.txt", "text/plain", b"hello".to_vec())];
    let (status, body) = post_multipart(app(true, true), "/predict-damage", &parts).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "unsupported_content_type");
}

#[tokio::test]
async fn test_corrupt_image_is_rejected() {
    let parts = [file_part("file", "broken.png", "image/png", b"\x89PNG garbage".to_vec())];
    let (status, body) = post_multipart(app(true, true), "/predict-disaster", &parts).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "decode_error");
}

#[tokio::test]
async fn test_missing_file_field() {
    let parts = [text_part("comment", "no file here")];
    let (status, body) = post_multipart(app(true, true), "/predict-both", &parts).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_request");
}

#[tokio::test]
async fn test_predict_both_isolates_axes() {
    let parts = [file_part("file", "a.png", "image/png", png_bytes())];
    let (status, body) = post_multipart(app(true, false), "/predict-both", &parts).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "combined_analysis");
    assert_eq!(body["results"]["disaster_detection"]["success"], true);
    assert_eq!(
        body["results"]["disaster_detection"]["prediction"]["predicted_class"],
        "Flood"
    );
    assert_eq!(
        body["results"]["damage_assessment"],
        json!({"success": false, "error": "The damage model is not loaded"})
    );
}

#[tokio::test]
async fn test_batch_defaults_to_both() {
    let parts = [
        file_part("files", "a.png", "image/png", png_bytes()),
        file_part("files", "b.txt", "text/plain", b"hello".to_vec()),
        file_part("files", "c.png", "image/png", png_bytes()),
    ];
    let (status, body) = post_multipart(app(true, true), "/predict-batch", &parts).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["prediction_type"], "both");

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["filename"], "a.png");
    assert_eq!(results[0]["disaster_prediction"]["predicted_class"], "Flood");
    assert_eq!(results[0]["damage_prediction"]["predicted_class"], "Destroyed");
    assert_eq!(
        results[1],
        json!({"filename": "b.txt", "success": false, "error": "File must be an image"})
    );
    assert_eq!(results[2]["success"], true);
}

#[tokio::test]
async fn test_batch_single_axis_mode() {
    let parts = [
        file_part("files", "a.png", "image/png", png_bytes()),
        text_part("prediction_type", "damage"),
    ];
    let (status, body) = post_multipart(app(true, false), "/predict-batch", &parts).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction_type"], "damage");
    let item = &body["results"][0];
    assert_eq!(item["success"], false);
    assert_eq!(item["damage_error"], "The damage model is not loaded");
    assert!(item.get("disaster_prediction").is_none());
}

#[tokio::test]
async fn test_batch_limits() {
    let parts: Vec<_> = (0..11)
        .map(|_| file_part("files", "a.png", "image/png", png_bytes()))
        .collect();
    let (status, body) = post_multipart(app(true, true), "/predict-batch", &parts).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "batch_too_large");

    let parts = [
        file_part("files", "a.png", "image/png", png_bytes()),
        text_part("prediction_type", "everything"),
    ];
    let (status, body) = post_multipart(app(true, true), "/predict-batch", &parts).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_axis_selection");
}

#[tokio::test]
async fn test_load_model_failure_keeps_existing_scorer() {
    let app = app(true, true);
    let request = Request::builder()
        .method("POST")
        .uri("/load-model?axis=damage&model_path=/nonexistent/damage.onnx")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app.clone(), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_type"], "model_load_error");

    let (_, health) = get(app, "/health").await;
    assert_eq!(health["damage_model_loaded"], true);
}

#[tokio::test]
async fn test_load_model_rejects_unknown_axis() {
    let request = Request::builder()
        .method("POST")
        .uri("/load-model?axis=volcano")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(false, false), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
