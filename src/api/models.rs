use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Challenge, ChallengeCommand, ChallengeId, ChallengeStatus, TeamId};
use crate::rating::{MatchRating, SeasonReplay};

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    #[serde(flatten)]
    pub command: ChallengeCommand,
    /// Version the client last saw; the command is refused if it is stale.
    pub expected_version: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub status: ChallengeStatus,
    #[serde(flatten)]
    pub challenge: Challenge,
}

impl From<Challenge> for ChallengeResponse {
    fn from(challenge: Challenge) -> Self {
        Self {
            status: challenge.status(),
            challenge,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub challenge: ChallengeResponse,
    pub events: Vec<crate::domain::ChallengeEvent>,
    pub messages: Vec<String>,
    pub rematch: Option<ChallengeResponse>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    pub rank: usize,
    pub team_id: TeamId,
    pub name: String,
    pub tag: String,
    pub rating: f64,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsResponse {
    pub season: u32,
    pub items: Vec<StandingRow>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRow {
    pub challenge_id: ChallengeId,
    pub challenging_team_id: TeamId,
    pub challenged_team_id: TeamId,
    pub status: ChallengeStatus,
    pub match_time: Option<DateTime<Utc>>,
    pub challenging_team_score: Option<i32>,
    pub challenged_team_score: Option<i32>,
    pub challenging_team_rating: Option<f64>,
    pub challenged_team_rating: Option<f64>,
    pub change: Option<f64>,
}

impl MatchRow {
    pub fn new(challenge: &Challenge, rating: Option<&MatchRating>) -> Self {
        let scores = challenge.scores();
        Self {
            challenge_id: challenge.id(),
            challenging_team_id: challenge.challenging_team_id(),
            challenged_team_id: challenge.challenged_team_id(),
            status: challenge.status(),
            match_time: challenge.match_time().value().copied(),
            challenging_team_score: scores.map(|(score, _)| score),
            challenged_team_score: scores.map(|(_, score)| score),
            challenging_team_rating: rating.map(|r| r.challenging_team_rating),
            challenged_team_rating: rating.map(|r| r.challenged_team_rating),
            change: rating.map(|r| r.change),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecomputeResponse {
    pub season: u32,
    pub matches: usize,
    pub teams: usize,
}

impl From<&SeasonReplay> for RecomputeResponse {
    fn from(replay: &SeasonReplay) -> Self {
        Self {
            season: replay.season,
            matches: replay.ratings.len(),
            teams: replay.standings.len(),
        }
    }
}
