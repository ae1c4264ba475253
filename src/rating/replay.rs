use std::cmp::Ordering;
use std::collections::HashMap;

use log::{debug, info};

use super::actual::actual_result;
use super::elo::{expected_result, rating_change};
use super::types::{MatchOutcome, MatchRating, SeasonReplay, TeamStanding};
use crate::config::settings::RatingSettings;
use crate::domain::TeamId;

/// Replays a season's confirmed matches in match-time order.
///
/// Every team starts at the baseline the first time it appears. The result is
/// a pure function of the input set: order of `matches` does not matter, ties
/// on match time are broken by challenge id.
pub fn replay_season(season: u32, matches: &[MatchOutcome], config: &RatingSettings) -> SeasonReplay {
    info!("Replaying {} matches for season {}", matches.len(), season);

    // 1. Chronological order
    let mut ordered: Vec<&MatchOutcome> = matches.iter().filter(|m| m.season == season).collect();
    ordered.sort_by(|a, b| {
        a.match_time
            .cmp(&b.match_time)
            .then(a.challenge_id.cmp(&b.challenge_id))
    });

    // 2. Carry running ratings forward
    let mut standings: HashMap<TeamId, TeamStanding> = HashMap::new();
    let mut ratings = Vec::with_capacity(ordered.len());
    for outcome in ordered {
        ratings.push(apply_match(outcome, &mut standings, config));
    }

    // 3. Final table
    let mut standings: Vec<TeamStanding> = standings.into_values().collect();
    standings.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(Ordering::Equal)
            .then(a.team_id.cmp(&b.team_id))
    });

    SeasonReplay {
        season,
        ratings,
        standings,
    }
}

fn apply_match(
    outcome: &MatchOutcome,
    standings: &mut HashMap<TeamId, TeamStanding>,
    config: &RatingSettings,
) -> MatchRating {
    let baseline = config.baseline_rating;
    let challenging_rating = standings
        .entry(outcome.challenging_team_id)
        .or_insert_with(|| TeamStanding::new(outcome.challenging_team_id, baseline))
        .rating;
    let challenged_rating = standings
        .entry(outcome.challenged_team_id)
        .or_insert_with(|| TeamStanding::new(outcome.challenged_team_id, baseline))
        .rating;

    let actual = actual_result(
        outcome.game_type,
        outcome.season,
        outcome.challenging_team_score,
        outcome.challenged_team_score,
        config,
    );
    let expected = expected_result(challenging_rating, challenged_rating);
    let change = rating_change(config.k_factor, actual, expected);

    let challenging_team_rating = challenging_rating + change;
    let challenged_team_rating = challenged_rating - change;
    debug!(
        "Challenge {}: actual {:.3}, expected {:.3}, change {:+.2}",
        outcome.challenge_id, actual, expected, change
    );

    let score_order = outcome
        .challenging_team_score
        .cmp(&outcome.challenged_team_score);
    record(standings, outcome.challenging_team_id, challenging_team_rating, score_order);
    record(standings, outcome.challenged_team_id, challenged_team_rating, score_order.reverse());

    MatchRating {
        challenge_id: outcome.challenge_id,
        season: outcome.season,
        challenging_team_id: outcome.challenging_team_id,
        challenged_team_id: outcome.challenged_team_id,
        challenging_team_rating,
        challenged_team_rating,
        change,
    }
}

fn record(
    standings: &mut HashMap<TeamId, TeamStanding>,
    team: TeamId,
    rating: f64,
    result: Ordering,
) {
    if let Some(standing) = standings.get_mut(&team) {
        standing.rating = rating;
        match result {
            Ordering::Greater => standing.wins += 1,
            Ordering::Less => standing.losses += 1,
            Ordering::Equal => standing.ties += 1,
        }
    }
}
