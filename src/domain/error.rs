use chrono::{DateTime, Utc};

use super::models::{ChallengeId, Field, GameType, TeamId};

/// Rejections raised by challenge operations.
///
/// These are expected, user-facing outcomes. The challenge is left untouched
/// whenever one of them is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChallengeError {
    #[error("challenge {0} does not exist")]
    ChallengeNotFound(ChallengeId),

    #[error("team {0} does not exist")]
    TeamNotFound(TeamId),

    #[error("only an administrator may do this")]
    NotAuthorized,

    #[error("team {0} is not part of this challenge")]
    NotInChallenge(TeamId),

    #[error("a team cannot challenge itself")]
    SameTeam,

    #[error("team {0} has been penalized and cannot act until staff clears the penalty")]
    TeamPenalized(TeamId),

    #[error("team {team} needs {required} home maps for {game_type}")]
    IncompleteHomeMaps {
        team: TeamId,
        game_type: GameType,
        required: usize,
    },

    #[error("team {team} has {roster} players, at least {required} are needed")]
    RosterTooSmall {
        team: TeamId,
        roster: usize,
        required: usize,
    },

    #[error("there is already an open challenge between these teams")]
    ChallengeAlreadyOpen,

    #[error("this match has been voided")]
    MatchVoided,

    #[error("this match is not voided")]
    MatchNotVoided,

    #[error("this match has been locked by an administrator")]
    MatchLocked,

    #[error("this match has already been confirmed")]
    MatchConfirmed,

    #[error("this match has not been confirmed yet")]
    MatchNotConfirmed,

    #[error("this match has already been closed")]
    MatchClosed,

    #[error("the {0} has already been confirmed")]
    AlreadyConfirmed(Field),

    #[error("nothing has been suggested for the {0}")]
    NothingSuggested(Field),

    #[error("a team cannot confirm its own suggestion")]
    SelfConfirmation,

    #[error("the {0} must be confirmed first")]
    NotConfirmed(Field),

    #[error("{0} is not a game type teams may choose")]
    GameTypeNotSelectable(GameType),

    #[error("team size must be between {min} and {max}")]
    InvalidTeamSize { min: u8, max: u8 },

    #[error("the home map team cannot pick from its own home maps")]
    HomeTeamCannotPick,

    #[error("'{0}' is not a valid home map letter")]
    InvalidMapLetter(char),

    #[error("map name cannot be empty")]
    EmptyMapName,

    #[error("{0} is one of the home maps and cannot be suggested as a neutral map")]
    MapIsHomeMap(String),

    #[error("the time {0} is in the past")]
    TimeInPast(DateTime<Utc>),

    #[error("the time {0} is too far in the future")]
    TimeTooFarAhead(DateTime<Utc>),

    #[error("this challenge has already been clocked")]
    AlreadyClocked,

    #[error("this challenge is not on the clock")]
    NotClocked,

    #[error("this match has already been scheduled")]
    AlreadyScheduled,

    #[error("team {0} is locked for a tournament")]
    TeamInTournament(TeamId),

    #[error("team {team} cannot clock another challenge until {until}")]
    ClockCooldownActive { team: TeamId, until: DateTime<Utc> },

    #[error("team {0} already has the maximum number of challenges on the clock")]
    ClockLimitReached(TeamId),

    #[error("team {team} has already clocked team {opponent} this season")]
    OpponentAlreadyClocked { team: TeamId, opponent: TeamId },

    #[error("this match cannot be adjudicated until its match time or clock deadline has passed")]
    NotYetAdjudicable,

    #[error("at least one team must be named to penalize")]
    NoTeamsToPenalize,

    #[error("the match has not started yet")]
    MatchNotStarted,

    #[error("no score has been reported")]
    NothingReported,

    #[error("stats must cover all {team_size} players of both teams or none (got {challenging} and {challenged})")]
    InsufficientOrMismatchedStats {
        team_size: u8,
        challenging: usize,
        challenged: usize,
    },

    #[error("team {0} already has stats for every player slot")]
    TeamStatsFull(TeamId),

    #[error("player {0} already has stats for the other team")]
    PlayerOnOtherTeam(i64),

    #[error("no stats recorded for player {player} on team {team}")]
    StatNotFound { team: TeamId, player: i64 },

    #[error("team {team} totals {total}, which is not a valid score")]
    ScoreOutOfRange { team: TeamId, total: i64 },

    #[error("a rematch has already been created for this challenge")]
    RematchAlreadyCreated,

    #[error("challenge {0} was modified concurrently, retry the command")]
    ConcurrentModification(ChallengeId),
}
