//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → liveness probe (public)
//! - `/tasks` → the ordered task catalog for the task-dispensing layer
//! - `/grader` → grading runs and accumulated marks
//!
//! There is no authentication surface: submissions are keyed by the student
//! email in the request, and the deployment fronts this service with its own
//! access control.

use crate::routes::{grader::grader_routes, health::health_routes, tasks::tasks_routes};
use ai::Rephraser;
use axum::{Extension, Router};
use std::sync::Arc;
use util::state::AppState;

pub mod grader;
pub mod health;
pub mod tasks;

/// Builds the complete application router for all HTTP endpoints.
///
/// The rephraser is constructed once in `main` (or the test harness) and
/// handed to the routes that dispense instruction text; it owns its response
/// cache, so there is deliberately no process-wide instance.
pub fn routes(app_state: AppState, rephraser: Arc<Rephraser>) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/tasks", tasks_routes())
        .nest("/grader", grader_routes())
        .layer(Extension(rephraser))
        .with_state(app_state)
}
