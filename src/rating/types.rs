use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ChallengeId, GameType, TeamId};

pub type RatingValue = f64;

/// A confirmed result as the replay sees it
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub challenge_id: ChallengeId,
    pub season: u32,
    pub game_type: GameType,
    pub match_time: DateTime<Utc>,
    pub challenging_team_id: TeamId,
    pub challenged_team_id: TeamId,
    pub challenging_team_score: i32,
    pub challenged_team_score: i32,
}

/// Post-match ratings of one replayed match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRating {
    pub challenge_id: ChallengeId,
    pub season: u32,
    pub challenging_team_id: TeamId,
    pub challenged_team_id: TeamId,
    pub challenging_team_rating: RatingValue,
    pub challenged_team_rating: RatingValue,
    /// Net change for the challenging team; the challenged team moves by the
    /// negation.
    pub change: RatingValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStanding {
    pub team_id: TeamId,
    pub rating: RatingValue,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl TeamStanding {
    pub fn new(team_id: TeamId, rating: RatingValue) -> Self {
        Self {
            team_id,
            rating,
            wins: 0,
            losses: 0,
            ties: 0,
        }
    }

    pub fn matches_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeasonReplay {
    pub season: u32,
    pub ratings: Vec<MatchRating>,
    /// Highest rating first.
    pub standings: Vec<TeamStanding>,
}
