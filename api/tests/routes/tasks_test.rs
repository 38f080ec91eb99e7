use crate::helpers::app::make_test_app;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use serial_test::serial;
use tower::ServiceExt;
use util::config::AppConfig;

async fn get_tasks(uri: &str) -> (StatusCode, Value) {
    let app = make_test_app().await;
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
#[serial]
async fn catalog_is_listed_in_display_order() {
    AppConfig::set_task_manifest("");
    let (status, json) = get_tasks("/api/tasks").await;
    AppConfig::reset();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Tasks retrieved successfully");

    let tasks = json["data"].as_array().unwrap();
    assert_eq!(tasks.len(), 6);

    assert_eq!(tasks[0]["name"], "ResourceGroupExists");
    assert_eq!(tasks[0]["reward"], 10);
    assert_eq!(
        tasks[0]["filter"],
        "test==ProvQuest.Tests.ResourceGroupExists"
    );

    let orders: Vec<i64> = tasks.iter().map(|t| t["order"].as_i64().unwrap()).collect();
    let mut sorted = orders.clone();
    sorted.sort();
    assert_eq!(orders, sorted);

    let network = tasks
        .iter()
        .find(|t| t["name"] == "VirtualNetworkCreated+SubnetRangeValid")
        .expect("grouped descriptor is listed");
    assert_eq!(network["reward"], 30);
    assert_eq!(network["tests"].as_array().unwrap().len(), 2);
}

#[tokio::test]
#[serial]
async fn rephrase_flag_is_a_passthrough_without_an_api_key() {
    AppConfig::set_task_manifest("");
    let (status, json) = get_tasks("/api/tasks?rephrase=true").await;
    AppConfig::reset();

    assert_eq!(status, StatusCode::OK);
    let tasks = json["data"].as_array().unwrap();
    assert_eq!(
        tasks[0]["instruction"],
        "Create a resource group named rg-quest in the westeurope region."
    );
}

#[tokio::test]
#[serial]
async fn manifest_override_replaces_the_catalog() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("tasks.json");
    let manifest = serde_json::json!([
        {
            "name": "ManifestTask",
            "tests": ["Suite.Custom"],
            "filter": "test==Suite.Custom",
            "order": 1,
            "instruction": "do the custom thing",
            "reward": 42,
            "time_limit": 5
        }
    ]);
    std::fs::write(&path, manifest.to_string()).unwrap();
    AppConfig::set_task_manifest(path.to_string_lossy().to_string());

    let (status, json) = get_tasks("/api/tasks").await;
    AppConfig::reset();

    assert_eq!(status, StatusCode::OK);
    let tasks = json["data"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["name"], "ManifestTask");
    assert_eq!(tasks[0]["reward"], 42);
}

#[tokio::test]
#[serial]
async fn broken_manifest_degrades_to_the_builtin_catalog() {
    AppConfig::set_task_manifest("/definitely/not/here.json");

    let (status, json) = get_tasks("/api/tasks").await;
    AppConfig::reset();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"].as_array().unwrap().len(), 6);
}
