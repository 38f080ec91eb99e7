use crate::response::ApiResponse;
use crate::routes::grader::common::{GradeRunResponse, RunGraderRequest};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use db::store::SqlRewardStore;
use grader::Catalog;
use test_runner::GradeInvocation;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use util::state::AppState;
use uuid::Uuid;
use validator::Validate;

/// POST /api/grader/run
///
/// Grades one submission: writes the submitted credentials into a fresh
/// working directory, runs the external suite with the resolved filter,
/// parses the report it leaves behind and reconciles the outcomes into the
/// reward ledger.
///
/// ### Request Body
/// ```json
/// {
///   "email": "u12345678@tuks.co.za",
///   "credentials": "{\"clientId\":\"...\",\"clientSecret\":\"...\"}",
///   "task": "ResourceGroupExists",
///   "trace": "optional-correlation-token"
/// }
/// ```
///
/// ### Request Body Fields
/// - `email` (string, required): the student's email; keys the ledger.
/// - `credentials` (string, required): opaque service-principal document the
///   suite reads to talk to the student's subscription.
/// - `task` (string, optional): catalog task name. Unknown names are treated
///   as raw filter expressions; empty grades the whole suite.
/// - `trace` (string, optional): correlation token for logs and the working
///   directory name. A UUID is generated when absent.
///
/// ### Success Response (200 OK)
/// ```json
/// {
///   "success": true,
///   "data": {
///     "trace": "b2f7c1e4-...",
///     "task": "ResourceGroupExists",
///     "filter": "test==ProvQuest.Tests.ResourceGroupExists",
///     "summary": {
///       "total": 1,
///       "passed": 1,
///       "failed": 0,
///       "awarded": 10,
///       "results": [
///         { "test": "ProvQuest.Tests.ResourceGroupExists", "passed": true, "mark": 10 }
///       ]
///     }
///   },
///   "message": "Grading run completed"
/// }
/// ```
///
/// ### Error Responses
///
/// **422 Unprocessable Entity** - Missing or invalid email/credentials
/// ```json
/// {
///   "success": false,
///   "message": "Validation failed: ..."
/// }
/// ```
///
/// **500 Internal Server Error** - The suite produced no report (launch
/// failure, timeout, or a run that exited without writing one)
/// ```json
/// {
///   "success": false,
///   "message": "No grading report was produced"
/// }
/// ```
///
/// ### Notes
/// - The response carries the parsed outcome even when ledger persistence
///   fails; those failures are logged server-side under the trace token.
/// - Concurrent submissions never interact: every run owns its working
///   directory and child process.
pub async fn run_grader(
    State(app_state): State<AppState>,
    Json(req): Json<RunGraderRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<()>::error(format!("Validation failed: {e}"))),
        )
            .into_response();
    }

    let trace = req
        .trace
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let task = req.task.trim().to_string();
    let filter = grader::resolve(&task);

    info!(
        "trace {trace}: grading '{task}' for {} with filter '{filter}'",
        req.email
    );

    // The run itself lives on its own task so an aborted request cancels the
    // suite (and its workspace gets cleaned) instead of leaking the child.
    let invocation = GradeInvocation::new(trace.clone(), req.credentials.clone(), filter.clone());
    let cancel = CancellationToken::new();
    let _abort_guard = cancel.clone().drop_guard();
    let runner = tokio::spawn(async move { test_runner::run(&invocation, cancel).await });

    let report = match runner.await {
        Ok(report) => report,
        Err(e) => {
            error!("trace {trace}: grading task failed to complete: {e}");
            None
        }
    };

    let Some(report) = report else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error("No grading report was produced")),
        )
            .into_response();
    };

    let outcomes = grader::parse_report(&report);

    let catalog = match Catalog::load() {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!("trace {trace}: task manifest unavailable, reconciling against the builtin catalog: {e}");
            Catalog::builtin()
        }
    };
    let store = SqlRewardStore::new(app_state.db_clone());
    let summary = grader::reconcile(&store, &catalog, &req.email, &task, &report, &outcomes).await;

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            GradeRunResponse {
                trace,
                task,
                filter,
                summary,
            },
            "Grading run completed",
        )),
    )
        .into_response()
}
