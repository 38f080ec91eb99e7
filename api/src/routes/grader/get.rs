use crate::response::ApiResponse;
use crate::routes::grader::common::{MarkEntry, MarksQuery, MarksResponse};
use axum::{Json, extract::Query, extract::State, http::StatusCode, response::IntoResponse};
use db::store::SqlRewardStore;
use grader::RewardStore;
use tracing::error;
use util::state::AppState;
use validator::Validate;

/// GET /api/grader/marks?email=...
///
/// Returns the student's accumulated marks: the best mark per test they have
/// ever passed, with the sum the gamified score screen shows.
///
/// ### Query Parameters
/// - `email` (string, required): the student's email.
///
/// ### Success Response (200 OK)
/// ```json
/// {
///   "success": true,
///   "data": {
///     "email": "u12345678@tuks.co.za",
///     "total": 25,
///     "marks": [
///       { "test": "ProvQuest.Tests.ResourceGroupExists", "mark": 10 },
///       { "test": "ProvQuest.Tests.StorageAccountCreated", "mark": 15 }
///     ]
///   },
///   "message": "Marks retrieved successfully"
/// }
/// ```
///
/// ### Error Responses
///
/// **422 Unprocessable Entity** - Missing or invalid email
///
/// **500 Internal Server Error** - Ledger read failed
pub async fn get_marks(
    State(app_state): State<AppState>,
    Query(query): Query<MarksQuery>,
) -> impl IntoResponse {
    let Some(email) = query
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
    else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<()>::error("email query parameter is required")),
        )
            .into_response();
    };
    if let Err(e) = query.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<()>::error(format!("Validation failed: {e}"))),
        )
            .into_response();
    }

    let store = SqlRewardStore::new(app_state.db_clone());
    match store.passed_totals(&email).await {
        Ok(totals) => {
            let marks: Vec<MarkEntry> = totals
                .into_iter()
                .map(|(test, mark)| MarkEntry { test, mark })
                .collect();
            let total = marks.iter().map(|m| m.mark).sum();

            Json(ApiResponse::success(
                MarksResponse {
                    email,
                    total,
                    marks,
                },
                "Marks retrieved successfully",
            ))
            .into_response()
        }
        Err(e) => {
            error!("failed to read passed totals for {email}: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to read marks")),
            )
                .into_response()
        }
    }
}
