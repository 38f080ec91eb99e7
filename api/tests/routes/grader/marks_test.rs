use crate::helpers::app::{make_test_app, make_test_app_with_state};
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use db::store::SqlRewardStore;
use grader::RewardStore;
use serde_json::Value;
use serial_test::serial;
use tower::ServiceExt;
use util::config::AppConfig;

async fn get_marks(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
#[serial]
async fn missing_email_is_rejected_with_422() {
    let app = make_test_app().await;

    let (status, json) = get_marks(&app, "/api/grader/marks").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "email query parameter is required");
}

#[tokio::test]
#[serial]
async fn invalid_email_is_rejected_with_422() {
    let app = make_test_app().await;

    let (status, json) = get_marks(&app, "/api/grader/marks?email=not-an-email").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        json["message"]
            .as_str()
            .unwrap()
            .starts_with("Validation failed")
    );
}

#[tokio::test]
#[serial]
async fn totals_sum_the_best_mark_per_passed_test() {
    let storage = tempfile::tempdir().unwrap();
    AppConfig::set_storage_root(storage.path().to_string_lossy().to_string());

    let (app, state) = make_test_app_with_state().await;
    let store = SqlRewardStore::new(state.db_clone());
    let email = "alice@example.com";

    let artifact_id = store
        .save_artifact(email, "Task1", "<test-run/>")
        .await
        .unwrap();
    // Reruns append; the same pass twice must not double-count.
    store
        .record_pass(
            email,
            "Task1",
            "ProvQuest.Tests.ResourceGroupExists",
            10,
            artifact_id,
        )
        .await
        .unwrap();
    store
        .record_pass(
            email,
            "Task1",
            "ProvQuest.Tests.ResourceGroupExists",
            10,
            artifact_id,
        )
        .await
        .unwrap();
    store
        .record_pass(
            email,
            "Task2",
            "ProvQuest.Tests.StorageAccountCreated",
            15,
            artifact_id,
        )
        .await
        .unwrap();
    store
        .record_fail(email, "Task3", "ProvQuest.Tests.VmDeallocated", artifact_id)
        .await
        .unwrap();

    let (status, json) = get_marks(&app, "/api/grader/marks?email=alice@example.com").await;
    AppConfig::reset();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Marks retrieved successfully");
    assert_eq!(json["data"]["email"], "alice@example.com");
    assert_eq!(json["data"]["total"], 25);

    let marks = json["data"]["marks"].as_array().unwrap();
    assert_eq!(marks.len(), 2);
    assert_eq!(marks[0]["test"], "ProvQuest.Tests.ResourceGroupExists");
    assert_eq!(marks[0]["mark"], 10);
    assert_eq!(marks[1]["test"], "ProvQuest.Tests.StorageAccountCreated");
    assert_eq!(marks[1]["mark"], 15);
}

#[tokio::test]
#[serial]
async fn unknown_student_has_an_empty_ledger() {
    let app = make_test_app().await;

    let (status, json) = get_marks(&app, "/api/grader/marks?email=ghost@example.com").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 0);
    assert!(json["data"]["marks"].as_array().unwrap().is_empty());
}
