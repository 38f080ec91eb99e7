//! Task catalog routes.
//!
//! The task-dispensing layer (the game front end's quest board) reads the
//! ordered catalog from here; grading itself lives under `/grader`.

pub mod common;
pub mod get;

use axum::{Router, routing::get};
use get::list_tasks;
use util::state::AppState;

/// Registers the task catalog endpoints.
///
/// - `GET /`: the ordered catalog, optionally with rephrased instructions.
pub fn tasks_routes() -> Router<AppState> {
    Router::new().route("/", get(list_tasks))
}
