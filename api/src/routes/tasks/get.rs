use crate::response::ApiResponse;
use crate::routes::tasks::common::TaskResponse;
use ai::Rephraser;
use axum::{Extension, Json, extract::Query, response::IntoResponse};
use grader::Catalog;
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Run each instruction through the AI collaborator before returning it.
    #[serde(default)]
    pub rephrase: bool,
}

/// GET /api/tasks
///
/// Returns the current task catalog in display order: one entry per gradable
/// task with its reward, time budget and the filter expression the grader
/// will run for it.
///
/// ### Query Parameters
/// - `rephrase` (bool, optional): when `true`, instructions are rewritten as
///   quest dialogue by the AI collaborator. Falls back to the stored text when
///   the collaborator is disabled or unreachable.
///
/// ### Success Response (200 OK)
/// ```json
/// {
///   "success": true,
///   "data": [
///     {
///       "name": "ResourceGroupExists",
///       "order": 1,
///       "instruction": "Create a resource group named rg-quest...",
///       "reward": 10,
///       "time_limit": 15,
///       "filter": "test==ProvQuest.Tests.ResourceGroupExists",
///       "tests": ["ProvQuest.Tests.ResourceGroupExists"]
///     }
///   ],
///   "message": "Tasks retrieved successfully"
/// }
/// ```
///
/// ### Notes
/// - A configured-but-broken task manifest degrades to the builtin catalog
///   with a logged warning; the quest board must keep working.
pub async fn list_tasks(
    Extension(rephraser): Extension<Arc<Rephraser>>,
    Query(params): Query<ListTasksQuery>,
) -> impl IntoResponse {
    let catalog = match Catalog::load() {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!("task manifest unavailable, serving the builtin catalog: {e}");
            Catalog::builtin()
        }
    };

    let mut tasks: Vec<TaskResponse> = catalog.tasks().iter().map(TaskResponse::from).collect();

    if params.rephrase {
        for task in &mut tasks {
            task.instruction = rephraser.rephrase(&task.instruction).await;
        }
    }

    Json(ApiResponse::success(tasks, "Tasks retrieved successfully"))
}
