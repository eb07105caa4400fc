use axum::{routing::post, Router};

use crate::handlers::generate;
use crate::state::AppState;

/// Mount the recurring session generation routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions/generate/preview", post(generate::preview))
        .route("/sessions/generate", post(generate::commit))
}
