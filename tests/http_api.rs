//! Route-level tests: request parsing, success payloads, and the
//! structured failure responses produced at the request boundary.

use exovet::artifact::{Artifact, Classifier, Mode, StandardScaler};
use exovet::{server, ServiceConfig, VettingService, REDUCED_FEATURES};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn batch_artifact() -> Artifact {
    Artifact {
        name: "exoplanet_or_not".to_string(),
        version: 1,
        columns: vec!["transit_depth".to_string(), "snr".to_string()],
        scaler: StandardScaler {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
        },
        classifier: Classifier::Logistic {
            coefficients: vec![2.0, 0.4],
            intercept: 0.0,
        },
    }
}

fn reduced_artifact() -> Artifact {
    Artifact {
        name: "simplified_exoplanet_or_not".to_string(),
        version: 1,
        columns: REDUCED_FEATURES.iter().map(|c| c.to_string()).collect(),
        scaler: StandardScaler {
            mean: vec![0.0; 12],
            scale: vec![1.0; 12],
        },
        classifier: Classifier::Logistic {
            coefficients: vec![0.1; 12],
            intercept: 0.5,
        },
    }
}

fn sample_record() -> serde_json::Value {
    json!({
        "log_planet_insol": 4.53,
        "planet_radius": 2.35,
        "signal_to_noise": 45.8,
        "planet_to_star_ratio": 0.021,
        "planet_teq": 880.0,
        "planet_insol": 93.2,
        "transit_duration": 3.4,
        "orbital_period": 10.52,
        "impact_parameter": 0.32,
        "orbital_velocity_proxy": 0.223,
        "log_orbital_period": 2.353,
        "temp_ratio": 0.152,
    })
}

fn service_fixture(with_full: bool) -> (TempDir, Arc<VettingService>) {
    let dir = TempDir::new().unwrap();
    let config = ServiceConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        artifact_dir: dir.path().join("model_files"),
        uploads_dir: dir.path().join("uploaded_files"),
        results_dir: dir.path().join("outputs"),
    };
    fs::create_dir_all(&config.artifact_dir).unwrap();
    if with_full {
        batch_artifact()
            .to_file(&config.artifact_dir.join(Mode::Full.artifact_file()))
            .unwrap();
    }
    reduced_artifact()
        .to_file(&config.artifact_dir.join(Mode::Reduced.artifact_file()))
        .unwrap();

    let service = Arc::new(VettingService::open(&config).unwrap());
    (dir, service)
}

fn multipart_body(boundary: &str, csv: &str) -> String {
    format!(
        "--{0}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"batch.csv\"\r\nContent-Type: text/csv\r\n\r\n{1}\r\n--{0}--\r\n",
        boundary, csv
    )
}

#[tokio::test]
async fn test_banner_and_health() {
    let (_dir, service) = service_fixture(true);
    let routes = server::routes(service);

    let response = warp::test::request().method("GET").path("/").reply(&routes).await;
    assert_eq!(response.status(), 200);

    let response = warp::test::request()
        .method("GET")
        .path("/health")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["service"], "exovet");
    assert_eq!(body["artifacts"]["full"], true);
    assert_eq!(body["artifacts"]["reduced"], true);
}

#[tokio::test]
async fn test_single_record_endpoint_and_download() {
    let (_dir, service) = service_fixture(true);
    let routes = server::routes(service);

    let response = warp::test::request()
        .method("POST")
        .path("/predictions/simplified_exoplanet_or_not")
        .json(&sample_record())
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    let id = body["id"].as_str().unwrap();
    assert_eq!(id.len(), 32);
    assert_eq!(body["results"][0]["row"], 0);
    let label = body["results"][0]["label"].as_str().unwrap();
    assert!(label == "Confirmed Planet" || label == "False Positive");
    assert!(body["results"][0]["confidence"]
        .as_str()
        .unwrap()
        .ends_with('%'));

    let response = warp::test::request()
        .method("GET")
        .path(&format!("/predictions/download?id={}", id))
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"predictions\""
    );
    assert_eq!(response.headers()["content-type"], "text/csv");
    let text = String::from_utf8(response.body().to_vec()).unwrap();
    assert!(text.contains("Predicted_Label"));
}

#[tokio::test]
async fn test_schema_failure_payload() {
    let (_dir, service) = service_fixture(true);
    let routes = server::routes(service);

    let mut record = sample_record();
    record.as_object_mut().unwrap().remove("planet_radius");

    let response = warp::test::request()
        .method("POST")
        .path("/predictions/simplified_exoplanet_or_not")
        .json(&record)
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 422);

    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["error"], "schema_validation");
    assert!(body["detail"].as_str().unwrap().contains("planet_radius"));
}

#[tokio::test]
async fn test_invalid_json_body_is_bad_request() {
    let (_dir, service) = service_fixture(true);
    let routes = server::routes(service);

    let response = warp::test::request()
        .method("POST")
        .path("/predictions/simplified_exoplanet_or_not")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["error"], "malformed_input");
}

#[tokio::test]
async fn test_batch_multipart_upload() {
    let (_dir, service) = service_fixture(true);
    let routes = server::routes(service);

    let boundary = "exovet-test-boundary";
    let body = multipart_body(boundary, "transit_depth,snr\n5.0,1.0\n-5.0,1.0\n");

    let response = warp::test::request()
        .method("POST")
        .path("/predictions/exoplanet_or_not")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(body)
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 200);

    let payload: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(payload["results"].as_array().unwrap().len(), 2);
    assert_eq!(payload["results"][0]["label"], "Confirmed Planet");
    assert_eq!(payload["results"][1]["label"], "False Positive");
}

#[tokio::test]
async fn test_batch_without_file_field_is_bad_request() {
    let (_dir, service) = service_fixture(true);
    let routes = server::routes(service);

    let boundary = "exovet-test-boundary";
    let body = format!(
        "--{0}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nhello\r\n--{0}--\r\n",
        boundary
    );

    let response = warp::test::request()
        .method("POST")
        .path("/predictions/exoplanet_or_not")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(body)
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 400);

    let payload: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(payload["error"], "malformed_input");
    assert!(payload["detail"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn test_unavailable_batch_mode_is_503() {
    let (_dir, service) = service_fixture(false);
    let routes = server::routes(service);

    let boundary = "exovet-test-boundary";
    let body = multipart_body(boundary, "transit_depth,snr\n5.0,1.0\n");

    let response = warp::test::request()
        .method("POST")
        .path("/predictions/exoplanet_or_not")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(body)
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 503);

    let payload: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(payload["error"], "artifact_unavailable");
    assert!(payload["detail"].as_str().unwrap().contains("full"));
}

#[tokio::test]
async fn test_download_unknown_id_is_404() {
    let (_dir, service) = service_fixture(true);
    let routes = server::routes(service);

    let response = warp::test::request()
        .method("GET")
        .path("/predictions/download?id=0123456789abcdef0123456789abcdef")
        .reply(&routes)
        .await;
    assert_eq!(response.status(), 404);

    let payload: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(payload["error"], "not_found");
}
