use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use log::error;

use crate::api::models::ErrorBody;
use crate::config::settings::AppConfig;
use crate::database::DbPool;
use crate::domain::{Actor, ChallengeError};
use crate::errors::ServiceError;
use crate::services::challenges::ChallengeService;
use crate::services::recompute::RecomputeService;

pub mod admin;
pub mod challenges;
pub mod seasons;

pub struct AppState {
    pub pool: DbPool,
    pub config: AppConfig,
    pub challenges: ChallengeService,
    pub recompute: RecomputeService,
}

/// Header naming the team a request acts for. Team membership itself is
/// checked by the host in front of this API.
pub const TEAM_HEADER: &str = "x-team-id";

/// Admin when the bearer token matches, otherwise the team from
/// [`TEAM_HEADER`].
pub fn resolve_actor(headers: &HeaderMap, config: &AppConfig) -> Option<Actor> {
    if is_admin(headers, config) {
        return Some(Actor::Admin);
    }
    headers
        .get(TEAM_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|id| id.trim().parse().ok())
        .map(Actor::Team)
}

pub fn is_admin(headers: &HeaderMap, config: &AppConfig) -> bool {
    let Some(token) = config.server.admin_token.as_deref() else {
        return false;
    };
    let auth_header = headers.get("Authorization").and_then(|h| h.to_str().ok());
    auth_header == Some(format!("Bearer {token}").as_str())
}

pub fn error_response(err: ServiceError) -> Response {
    match err {
        ServiceError::Rejected(rejection) => {
            let status = rejection_status(&rejection);
            (
                status,
                Json(ErrorBody {
                    error: rejection.to_string(),
                }),
            )
                .into_response()
        }
        ServiceError::Storage(e) => {
            error!("Storage failure: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "Internal storage error".to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn rejection_status(rejection: &ChallengeError) -> StatusCode {
    match rejection {
        ChallengeError::ChallengeNotFound(_)
        | ChallengeError::TeamNotFound(_)
        | ChallengeError::StatNotFound { .. } => StatusCode::NOT_FOUND,
        ChallengeError::NotAuthorized
        | ChallengeError::NotInChallenge(_)
        | ChallengeError::TeamPenalized(_)
        | ChallengeError::MatchLocked => StatusCode::FORBIDDEN,
        _ => StatusCode::CONFLICT,
    }
}

pub fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody {
            error: "Missing admin token or team header".to_string(),
        }),
    )
        .into_response()
}
