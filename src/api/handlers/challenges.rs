use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;

use super::{AppState, error_response, resolve_actor, unauthorized};
use crate::api::models::{ChallengeResponse, CommandRequest, CommandResponse};
use crate::domain::ChallengeId;
use crate::services::challenges::NewChallenge;

pub async fn get_challenge(
    State(state): State<Arc<AppState>>,
    Path(challenge_id): Path<ChallengeId>,
) -> impl IntoResponse {
    match state.challenges.find(challenge_id) {
        Ok(challenge) => Json(ChallengeResponse::from(challenge)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_challenge(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<NewChallenge>,
) -> impl IntoResponse {
    let Some(actor) = resolve_actor(&headers, &state.config) else {
        return unauthorized();
    };

    match state.challenges.create(&actor, &request) {
        Ok(challenge) => (StatusCode::CREATED, Json(ChallengeResponse::from(challenge))).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn execute_command(
    State(state): State<Arc<AppState>>,
    Path(challenge_id): Path<ChallengeId>,
    headers: HeaderMap,
    Json(request): Json<CommandRequest>,
) -> impl IntoResponse {
    let Some(actor) = resolve_actor(&headers, &state.config) else {
        return unauthorized();
    };

    let outcome = match state.challenges.execute(
        challenge_id,
        &actor,
        request.command,
        request.expected_version,
    ) {
        Ok(outcome) => outcome,
        Err(e) => return error_response(e),
    };

    let messages = outcome.events.iter().map(|e| e.describe()).collect();
    Json(CommandResponse {
        challenge: outcome.challenge.into(),
        events: outcome.events,
        messages,
        rematch: outcome.rematch.map(ChallengeResponse::from),
    })
    .into_response()
}
