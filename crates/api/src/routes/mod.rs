pub mod health;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sessions/generate/preview        dry-run plan (POST)
/// /sessions/generate                plan + persist (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(sessions::router())
}
