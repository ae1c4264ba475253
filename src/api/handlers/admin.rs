use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{AppState, error_response, is_admin};
use crate::api::models::RecomputeResponse;
use crate::domain::{Actor, TeamId};

pub async fn admin_recompute(
    State(state): State<Arc<AppState>>,
    Path(season): Path<u32>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !is_admin(&headers, &state.config) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    log::info!("Admin triggered recompute of season {}", season);
    match state.recompute.run(season) {
        Ok(replay) => Json(RecomputeResponse::from(&replay)).into_response(),
        Err(e) => {
            log::error!("Recompute of season {} failed: {:?}", season, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Recompute failed").into_response()
        }
    }
}

pub async fn admin_release_penalty(
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<TeamId>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !is_admin(&headers, &state.config) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match state.challenges.release_penalty(&Actor::Admin, team_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}
