use chrono::{DateTime, Utc};
use serde::Serialize;

use super::models::{ChallengeId, Field, GameType, MapSelection, PlayerId, TeamId};

/// What changed on a challenge; the host turns these into notifications
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ChallengeEvent {
    Created {
        challenging_team: TeamId,
        challenged_team: TeamId,
    },
    GameTypeSuggested { by: TeamId, game_type: GameType },
    GameTypeConfirmed { game_type: GameType },
    TeamSizeSuggested { by: TeamId, team_size: u8 },
    TeamSizeConfirmed { team_size: u8 },
    MapSuggested { by: TeamId, map: String },
    MapConfirmed { map: MapSelection },
    MapCleared { map: String },
    SuggestionDropped { field: Field },
    TimeSuggested { by: TeamId, time: DateTime<Utc> },
    TimeConfirmed { time: DateTime<Utc> },
    Clocked { by: TeamId, deadline: DateTime<Utc> },
    Unclocked,
    Extended,
    Penalized { team: TeamId },
    Voided { was_confirmed: bool },
    Unvoided,
    Reported {
        by: TeamId,
        challenging_team_score: i32,
        challenged_team_score: i32,
    },
    ResultConfirmed {
        challenging_team_score: i32,
        challenged_team_score: i32,
        forced: bool,
    },
    StatAdded { team: TeamId, player: PlayerId },
    StatRemoved { team: TeamId, player: PlayerId },
    StatsCleared,
    StatsImported {
        score_changed: bool,
        rated: bool,
        challenging_team_score: i32,
        challenged_team_score: i32,
    },
    RematchRequested { by: TeamId },
    RematchAgreed,
    RematchCreated {
        original: ChallengeId,
        rematch: ChallengeId,
    },
    Locked,
    Unlocked,
    CasterChanged { caster: Option<String> },
    VodSet { url: String },
    ColorsSwapped { blue_team: TeamId },
    OvertimeSet { periods: u32 },
    HomeMapTeamChanged { team: TeamId },
    PostseasonChanged { postseason: bool },
    Closed,
}

impl ChallengeEvent {
    /// Whether the season's ratings must be replayed after this event.
    pub fn affects_ratings(&self) -> bool {
        match self {
            ChallengeEvent::ResultConfirmed { .. } => true,
            ChallengeEvent::Voided { was_confirmed } => *was_confirmed,
            ChallengeEvent::StatsImported {
                score_changed,
                rated,
                ..
            } => *score_changed && *rated,
            _ => false,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ChallengeEvent::Created {
                challenging_team,
                challenged_team,
            } => format!("Team {challenging_team} has challenged team {challenged_team}."),
            ChallengeEvent::GameTypeSuggested { by, game_type } => {
                format!("Team {by} suggested playing {game_type}.")
            }
            ChallengeEvent::GameTypeConfirmed { game_type } => {
                format!("Game type confirmed as {game_type}.")
            }
            ChallengeEvent::TeamSizeSuggested { by, team_size } => {
                format!("Team {by} suggested a team size of {team_size}v{team_size}.")
            }
            ChallengeEvent::TeamSizeConfirmed { team_size } => {
                format!("Team size confirmed as {team_size}v{team_size}.")
            }
            ChallengeEvent::MapSuggested { by, map } => {
                format!("Team {by} suggested {map} as a neutral map.")
            }
            ChallengeEvent::MapConfirmed { map } => format!("Map confirmed as {}.", map.name),
            ChallengeEvent::MapCleared { map } => {
                format!("{map} is no longer valid for this match and has been cleared.")
            }
            ChallengeEvent::SuggestionDropped { field } => {
                format!("The pending {field} suggestion is no longer valid and was dropped.")
            }
            ChallengeEvent::TimeSuggested { by, time } => {
                format!("Team {by} suggested playing at {}.", time.to_rfc3339())
            }
            ChallengeEvent::TimeConfirmed { time } => {
                format!("Match time confirmed for {}.", time.to_rfc3339())
            }
            ChallengeEvent::Clocked { by, deadline } => format!(
                "Team {by} put this challenge on the clock, it must be scheduled by {}.",
                deadline.to_rfc3339()
            ),
            ChallengeEvent::Unclocked => "The clock has been removed from this challenge.".into(),
            ChallengeEvent::Extended => {
                "An administrator extended this challenge, scheduling is open again.".into()
            }
            ChallengeEvent::Penalized { team } => format!("Team {team} has been penalized."),
            ChallengeEvent::Voided { .. } => "This match has been voided.".into(),
            ChallengeEvent::Unvoided => "This match is no longer voided.".into(),
            ChallengeEvent::Reported {
                by,
                challenging_team_score,
                challenged_team_score,
            } => format!(
                "Team {by} reported the score {challenging_team_score} to {challenged_team_score}, awaiting confirmation."
            ),
            ChallengeEvent::ResultConfirmed {
                challenging_team_score,
                challenged_team_score,
                forced,
            } => {
                let how = if *forced { "recorded by an administrator" } else { "confirmed" };
                format!("Final score {challenging_team_score} to {challenged_team_score} {how}.")
            }
            ChallengeEvent::StatAdded { team, player } => {
                format!("Stats recorded for player {player} on team {team}.")
            }
            ChallengeEvent::StatRemoved { team, player } => {
                format!("Stats removed for player {player} on team {team}.")
            }
            ChallengeEvent::StatsCleared => "All stats for this match were cleared.".into(),
            ChallengeEvent::StatsImported {
                score_changed,
                challenging_team_score,
                challenged_team_score,
                ..
            } => {
                if *score_changed {
                    format!(
                        "Stats imported, score corrected to {challenging_team_score} to {challenged_team_score}."
                    )
                } else {
                    "Stats imported.".into()
                }
            }
            ChallengeEvent::RematchRequested { by } => format!("Team {by} requested a rematch."),
            ChallengeEvent::RematchAgreed => "Both teams agreed to a rematch.".into(),
            ChallengeEvent::RematchCreated { rematch, .. } => {
                format!("Rematch created as challenge {rematch}.")
            }
            ChallengeEvent::Locked => "This challenge is now locked to administrators.".into(),
            ChallengeEvent::Unlocked => "This challenge is unlocked.".into(),
            ChallengeEvent::CasterChanged { caster: Some(caster) } => {
                format!("{caster} will cast this match.")
            }
            ChallengeEvent::CasterChanged { caster: None } => "The caster has been removed.".into(),
            ChallengeEvent::VodSet { url } => format!("VoD available at {url}."),
            ChallengeEvent::ColorsSwapped { blue_team } => {
                format!("Colors swapped, team {blue_team} is now blue.")
            }
            ChallengeEvent::OvertimeSet { periods } => {
                format!("Overtime periods set to {periods}.")
            }
            ChallengeEvent::HomeMapTeamChanged { team } => {
                format!("Team {team} is now the home map team.")
            }
            ChallengeEvent::PostseasonChanged { postseason } => {
                if *postseason {
                    "This is now a postseason match.".into()
                } else {
                    "This is now a regular season match.".into()
                }
            }
            ChallengeEvent::Closed => "This challenge is closed.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_result_changes_affect_ratings() {
        assert!(ChallengeEvent::ResultConfirmed {
            challenging_team_score: 10,
            challenged_team_score: 5,
            forced: false,
        }
        .affects_ratings());
        assert!(ChallengeEvent::Voided { was_confirmed: true }.affects_ratings());
        assert!(!ChallengeEvent::Voided { was_confirmed: false }.affects_ratings());
        assert!(!ChallengeEvent::Extended.affects_ratings());
        assert!(!ChallengeEvent::StatsImported {
            score_changed: true,
            rated: false,
            challenging_team_score: 3,
            challenged_team_score: 1,
        }
        .affects_ratings());
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_value(ChallengeEvent::Penalized { team: 4 }).unwrap();
        assert_eq!(json["event"], "penalized");
        assert_eq!(json["team"], 4);
    }
}
