//! Grading routes.
//!
//! `POST /run` drives the whole pipeline for one submission: workspace
//! allocation, filter resolution, the external suite run, report parsing and
//! reward reconciliation. `GET /marks` reads the accumulated ledger back.

pub mod common;
pub mod get;
pub mod post;

use axum::{
    Router,
    routing::{get, post},
};
use util::state::AppState;

/// Registers the grading endpoints.
///
/// - `POST /run`: grade one submission against the external suite.
/// - `GET /marks`: best mark per passed test for one student.
pub fn grader_routes() -> Router<AppState> {
    Router::new()
        .route("/run", post(post::run_grader))
        .route("/marks", get(get::get_marks))
}
