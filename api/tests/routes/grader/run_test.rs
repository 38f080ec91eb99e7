use crate::helpers::app::make_test_app;
use crate::helpers::suite::GraderSandbox;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use serial_test::serial;
use tower::ServiceExt;

async fn post_run(app: &Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/grader/run")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get_marks(app: &Router, email: &str) -> Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/grader/marks?email={email}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
#[serial]
async fn invalid_email_is_rejected_with_422() {
    let app = make_test_app().await;

    let (status, json) = post_run(
        &app,
        json!({ "email": "not-an-email", "credentials": "{}" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);
    assert!(
        json["message"]
            .as_str()
            .unwrap()
            .starts_with("Validation failed")
    );
}

#[tokio::test]
#[serial]
async fn empty_credentials_are_rejected_with_422() {
    let app = make_test_app().await;

    let (status, json) = post_run(
        &app,
        json!({ "email": "alice@example.com", "credentials": "" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);
    assert!(
        json["message"]
            .as_str()
            .unwrap()
            .contains("credentials must not be empty")
    );
}

#[tokio::test]
#[serial]
async fn missing_fields_are_rejected_by_the_extractor() {
    let app = make_test_app().await;
    let (status, _) = post_run(&app, json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[serial]
async fn grading_run_records_marks_and_returns_the_summary() {
    let sandbox = GraderSandbox::new(10_000);
    sandbox.install_suite(
        r#"printf '<test-run><test-case fullname="ProvQuest.Tests.ResourceGroupExists" result="Passed"/><test-case fullname="ProvQuest.Tests.StorageAccountCreated" result="Failed"/></test-run>' > "$work/TestResult.xml""#,
    );
    let app = make_test_app().await;

    let (status, json) = post_run(
        &app,
        json!({
            "email": "alice@example.com",
            "credentials": r#"{"clientId":"x","clientSecret":"y"}"#,
            "task": "ResourceGroupExists",
            "trace": "api-run-1"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Grading run completed");
    assert_eq!(json["data"]["trace"], "api-run-1");
    assert_eq!(json["data"]["task"], "ResourceGroupExists");
    assert_eq!(
        json["data"]["filter"],
        "test==ProvQuest.Tests.ResourceGroupExists"
    );

    let summary = &json["data"]["summary"];
    assert_eq!(summary["total"], 2);
    assert_eq!(summary["passed"], 1);
    assert_eq!(summary["failed"], 1);
    assert_eq!(summary["awarded"], 10);

    // The pass landed in the ledger.
    let marks = get_marks(&app, "alice@example.com").await;
    assert_eq!(marks["data"]["total"], 10);
    assert_eq!(
        marks["data"]["marks"][0]["test"],
        "ProvQuest.Tests.ResourceGroupExists"
    );

    // And the raw report landed in storage for audit.
    let reports: Vec<_> = std::fs::read_dir(
        sandbox
            .storage
            .path()
            .join("reports")
            .join("alice_example.com"),
    )
    .unwrap()
    .map(|e| e.unwrap().path())
    .collect();
    assert_eq!(reports.len(), 1);
    let document = std::fs::read_to_string(&reports[0]).unwrap();
    assert!(document.contains("ResourceGroupExists"));

    // The per-run workspace is gone once the response is out.
    let leftovers = std::fs::read_dir(sandbox.work.path()).unwrap().count();
    assert_eq!(leftovers, 0, "workspace should be cleaned up after the run");
}

#[tokio::test]
#[serial]
async fn empty_task_grades_the_default_suite() {
    let sandbox = GraderSandbox::new(10_000);
    sandbox.install_suite(r#"printf '<test-run/>' > "$work/TestResult.xml""#);
    let app = make_test_app().await;

    let (status, json) = post_run(
        &app,
        json!({ "email": "alice@example.com", "credentials": "{}" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["filter"], "cat == Graded");
    // No trace supplied, so one was generated.
    assert!(!json["data"]["trace"].as_str().unwrap().is_empty());
    assert_eq!(json["data"]["summary"]["total"], 0);
}

#[tokio::test]
#[serial]
async fn unknown_task_passes_the_expression_through() {
    let sandbox = GraderSandbox::new(10_000);
    sandbox.install_suite(r#"printf '<test-run/>' > "$work/TestResult.xml""#);
    let app = make_test_app().await;

    let (status, json) = post_run(
        &app,
        json!({
            "email": "alice@example.com",
            "credentials": "{}",
            "task": "cat == Smoke"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["filter"], "cat == Smoke");
}

#[tokio::test]
#[serial]
async fn run_without_a_report_maps_to_500() {
    let sandbox = GraderSandbox::new(10_000);
    sandbox.install_suite("exit 0");
    let app = make_test_app().await;

    let (status, json) = post_run(
        &app,
        json!({ "email": "alice@example.com", "credentials": "{}" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "No grading report was produced");

    // Nothing reached the ledger.
    let marks = get_marks(&app, "alice@example.com").await;
    assert_eq!(marks["data"]["total"], 0);
}

#[tokio::test]
#[serial]
async fn passes_outside_the_catalog_earn_no_marks() {
    let sandbox = GraderSandbox::new(10_000);
    sandbox.install_suite(
        r#"printf '<test-run><test-case fullname="ProvQuest.Tests.Setup" result="Passed"/></test-run>' > "$work/TestResult.xml""#,
    );
    let app = make_test_app().await;

    let (status, json) = post_run(
        &app,
        json!({ "email": "alice@example.com", "credentials": "{}" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let summary = &json["data"]["summary"];
    assert_eq!(summary["passed"], 1);
    assert_eq!(summary["awarded"], 0);

    let marks = get_marks(&app, "alice@example.com").await;
    assert_eq!(marks["data"]["total"], 0);
}
