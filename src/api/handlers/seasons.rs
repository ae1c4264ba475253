use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::collections::HashMap;
use std::sync::Arc;

use super::{AppState, error_response};
use crate::api::models::{MatchRow, StandingRow, StandingsResponse};
use crate::database;

pub async fn get_standings(
    State(state): State<Arc<AppState>>,
    Path(season): Path<u32>,
) -> impl IntoResponse {
    let replay = match state.recompute.standings(season) {
        Ok(replay) => replay,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, format!("Query Error: {}", e)).into_response(),
    };

    let conn = match state.pool.get() {
        Ok(conn) => conn,
        Err(_) => return (StatusCode::INTERNAL_SERVER_ERROR, "DB Connection Error").into_response(),
    };
    let teams = match database::teams::list_all(&conn) {
        Ok(teams) => teams,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, format!("Query Error: {}", e)).into_response(),
    };
    let teams: HashMap<_, _> = teams.into_iter().map(|t| (t.id, t)).collect();

    let items = replay
        .standings
        .into_iter()
        .enumerate()
        .map(|(i, standing)| {
            let team = teams.get(&standing.team_id);
            StandingRow {
                rank: i + 1,
                team_id: standing.team_id,
                name: team.map(|t| t.name.clone()).unwrap_or_default(),
                tag: team.map(|t| t.tag.clone()).unwrap_or_default(),
                rating: standing.rating,
                wins: standing.wins,
                losses: standing.losses,
                ties: standing.ties,
            }
        })
        .collect();

    Json(StandingsResponse { season, items }).into_response()
}

pub async fn get_matches(
    State(state): State<Arc<AppState>>,
    Path(season): Path<u32>,
) -> impl IntoResponse {
    let challenges = match state.challenges.season_challenges(season) {
        Ok(challenges) => challenges,
        Err(e) => return error_response(e),
    };
    let ratings = match state.recompute.stored_ratings(season) {
        Ok(ratings) => ratings,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, format!("Query Error: {}", e)).into_response(),
    };
    let ratings: HashMap<_, _> = ratings.into_iter().map(|r| (r.challenge_id, r)).collect();

    let rows: Vec<MatchRow> = challenges
        .iter()
        .map(|c| MatchRow::new(c, ratings.get(&c.id())))
        .collect();

    Json(rows).into_response()
}
