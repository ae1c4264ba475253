use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::api::handlers::{
    AppState,
    admin::{admin_recompute, admin_release_penalty},
    challenges::{create_challenge, execute_command, get_challenge},
    seasons::{get_matches, get_standings},
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/challenges", post(create_challenge))
        .route("/api/challenges/:id", get(get_challenge))
        .route("/api/challenges/:id/commands", post(execute_command))
        .route("/api/seasons/:season/standings", get(get_standings))
        .route("/api/seasons/:season/matches", get(get_matches))
        .route("/api/admin/seasons/:season/recompute", post(admin_recompute))
        .route("/api/admin/teams/:id/release-penalty", post(admin_release_penalty))
        .with_state(state)
}
