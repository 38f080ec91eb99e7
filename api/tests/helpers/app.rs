use ai::Rephraser;
use api::routes::routes;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use util::state::AppState;

/// Builds the full API router backed by a fresh in-memory database.
///
/// The rephraser carries no API key, so instruction text passes through
/// unchanged and tests never touch the network.
pub async fn make_test_app() -> Router {
    let (app, _state) = make_test_app_with_state().await;
    app
}

/// Same as [`make_test_app`], but also hands back the [`AppState`] so a test
/// can reach the database behind the router (seeding, direct assertions).
pub async fn make_test_app_with_state() -> (Router, AppState) {
    let db = db::test_utils::setup_test_db().await;
    let app_state = AppState::new(db);
    let rephraser = Arc::new(Rephraser::new(String::new(), Duration::from_secs(60)));
    let app = Router::new().nest("/api", routes(app_state.clone(), rephraser));
    (app, app_state)
}
