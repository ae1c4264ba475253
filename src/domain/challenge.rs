use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clock::ChallengeHistory;
use super::error::ChallengeError;
use super::events::ChallengeEvent;
use super::models::{
    Actor, ChallengeId, Field, GameType, MapSelection, StatLine, Team, TeamId,
};
use super::negotiation::NegotiationField;
use crate::config::settings::ChallengeSettings;

/// One negotiated match between two teams.
///
/// Confirmed attributes live in the negotiation fields' confirmed slots,
/// suggestions awaiting the other team live in their pending slots. Every
/// operation validates first and only mutates once nothing can fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub(crate) id: ChallengeId,
    pub(crate) season: u32,
    pub(crate) challenging_team_id: TeamId,
    pub(crate) challenged_team_id: TeamId,
    pub(crate) home_map_team_id: TeamId,
    pub(crate) blue_team_id: TeamId,

    pub(crate) game_type: NegotiationField<GameType>,
    pub(crate) team_size: NegotiationField<u8>,
    pub(crate) map: NegotiationField<MapSelection>,
    pub(crate) match_time: NegotiationField<DateTime<Utc>>,

    pub(crate) admin_created: bool,
    pub(crate) locked: bool,
    pub(crate) postseason: bool,
    pub(crate) date_created: DateTime<Utc>,

    pub(crate) clocked_by: Option<TeamId>,
    pub(crate) date_clocked: Option<DateTime<Utc>>,
    pub(crate) date_clock_deadline: Option<DateTime<Utc>>,

    pub(crate) reporting_team_id: Option<TeamId>,
    pub(crate) challenging_team_score: Option<i32>,
    pub(crate) challenged_team_score: Option<i32>,
    pub(crate) date_reported: Option<DateTime<Utc>>,
    pub(crate) date_confirmed: Option<DateTime<Utc>>,
    pub(crate) date_voided: Option<DateTime<Utc>>,
    pub(crate) date_closed: Option<DateTime<Utc>>,

    pub(crate) challenging_team_penalized: bool,
    pub(crate) challenged_team_penalized: bool,

    pub(crate) overtime_periods: Option<u32>,
    pub(crate) caster: Option<String>,
    pub(crate) vod: Option<String>,

    pub(crate) rematch_team_id: Option<TeamId>,
    pub(crate) date_rematch_requested: Option<DateTime<Utc>>,
    pub(crate) date_rematched: Option<DateTime<Utc>>,
    pub(crate) rematch_of: Option<ChallengeId>,
    pub(crate) rematch_id: Option<ChallengeId>,

    #[serde(default)]
    pub(crate) stats: Vec<StatLine>,
    pub(crate) version: u32,
}

/// Everything an operation may consult besides the challenge itself
pub struct ChallengeContext<'a> {
    pub now: DateTime<Utc>,
    pub challenging_team: &'a Team,
    pub challenged_team: &'a Team,
    pub history: &'a dyn ChallengeHistory,
    pub settings: &'a ChallengeSettings,
}

impl ChallengeContext<'_> {
    pub fn team(&self, id: TeamId) -> Result<&Team, ChallengeError> {
        if self.challenging_team.id == id {
            Ok(self.challenging_team)
        } else if self.challenged_team.id == id {
            Ok(self.challenged_team)
        } else {
            Err(ChallengeError::NotInChallenge(id))
        }
    }
}

/// Overall outcome state of a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChallengeStatus {
    Negotiating,
    Clocked,
    Reported,
    Confirmed,
    Closed,
    Voided,
}

impl Challenge {
    /// A team-initiated challenge.
    pub fn create(
        id: ChallengeId,
        challenging: &Team,
        challenged: &Team,
        game_type: GameType,
        history: &dyn ChallengeHistory,
        settings: &ChallengeSettings,
        now: DateTime<Utc>,
    ) -> Result<Self, ChallengeError> {
        if challenging.id == challenged.id {
            return Err(ChallengeError::SameTeam);
        }
        if !game_type.is_selectable() {
            return Err(ChallengeError::GameTypeNotSelectable(game_type));
        }
        for team in [challenging, challenged] {
            Self::ensure_eligible(team, settings)?;
        }
        if history.has_open_challenge_between(challenging.id, challenged.id) {
            return Err(ChallengeError::ChallengeAlreadyOpen);
        }

        let mut challenge = Self::blank(id, challenging.id, challenged.id, settings, now);
        challenge.game_type.suggest(challenging.id, game_type)?;
        Ok(challenge)
    }

    /// An administrator-created challenge. It skips eligibility checks and
    /// starts locked, so only administrators can drive it.
    pub fn create_by_admin(
        id: ChallengeId,
        challenging: &Team,
        challenged: &Team,
        game_type: GameType,
        settings: &ChallengeSettings,
        now: DateTime<Utc>,
    ) -> Result<Self, ChallengeError> {
        if challenging.id == challenged.id {
            return Err(ChallengeError::SameTeam);
        }

        let mut challenge = Self::blank(id, challenging.id, challenged.id, settings, now);
        challenge.game_type.set(game_type);
        challenge.admin_created = true;
        challenge.locked = true;
        Ok(challenge)
    }

    fn ensure_eligible(team: &Team, settings: &ChallengeSettings) -> Result<(), ChallengeError> {
        if team.penalized {
            return Err(ChallengeError::TeamPenalized(team.id));
        }
        if let Some(game_type) = team.missing_home_maps(settings.home_maps_per_game_type) {
            return Err(ChallengeError::IncompleteHomeMaps {
                team: team.id,
                game_type,
                required: settings.home_maps_per_game_type,
            });
        }
        let required = settings.min_team_size as usize;
        if team.roster_size < required {
            return Err(ChallengeError::RosterTooSmall {
                team: team.id,
                roster: team.roster_size,
                required,
            });
        }
        Ok(())
    }

    pub(crate) fn blank(
        id: ChallengeId,
        challenging_team_id: TeamId,
        challenged_team_id: TeamId,
        settings: &ChallengeSettings,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            season: settings.current_season,
            challenging_team_id,
            challenged_team_id,
            home_map_team_id: challenged_team_id,
            blue_team_id: challenging_team_id,
            game_type: NegotiationField::new(Field::GameType),
            team_size: NegotiationField::new(Field::TeamSize),
            map: NegotiationField::new(Field::Map),
            match_time: NegotiationField::new(Field::MatchTime),
            admin_created: false,
            locked: false,
            postseason: false,
            date_created: now,
            clocked_by: None,
            date_clocked: None,
            date_clock_deadline: None,
            reporting_team_id: None,
            challenging_team_score: None,
            challenged_team_score: None,
            date_reported: None,
            date_confirmed: None,
            date_voided: None,
            date_closed: None,
            challenging_team_penalized: false,
            challenged_team_penalized: false,
            overtime_periods: None,
            caster: None,
            vod: None,
            rematch_team_id: None,
            date_rematch_requested: None,
            date_rematched: None,
            rematch_of: None,
            rematch_id: None,
            stats: Vec::new(),
            version: 0,
        }
    }

    pub fn id(&self) -> ChallengeId {
        self.id
    }

    pub fn season(&self) -> u32 {
        self.season
    }

    pub fn challenging_team_id(&self) -> TeamId {
        self.challenging_team_id
    }

    pub fn challenged_team_id(&self) -> TeamId {
        self.challenged_team_id
    }

    pub fn home_map_team_id(&self) -> TeamId {
        self.home_map_team_id
    }

    pub fn game_type(&self) -> &NegotiationField<GameType> {
        &self.game_type
    }

    pub fn team_size(&self) -> &NegotiationField<u8> {
        &self.team_size
    }

    pub fn map(&self) -> &NegotiationField<MapSelection> {
        &self.map
    }

    pub fn match_time(&self) -> &NegotiationField<DateTime<Utc>> {
        &self.match_time
    }

    pub fn scores(&self) -> Option<(i32, i32)> {
        Some((self.challenging_team_score?, self.challenged_team_score?))
    }

    pub fn stats(&self) -> &[StatLine] {
        &self.stats
    }

    pub fn rematch_id(&self) -> Option<ChallengeId> {
        self.rematch_id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn is_confirmed(&self) -> bool {
        self.date_confirmed.is_some()
    }

    pub fn is_voided(&self) -> bool {
        self.date_voided.is_some()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Unconfirmed and not voided.
    pub fn is_open(&self) -> bool {
        !self.is_confirmed() && !self.is_voided()
    }

    pub fn is_clock_active(&self) -> bool {
        self.date_clock_deadline.is_some() && self.is_open()
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.challenging_team_id == team || self.challenged_team_id == team
    }

    pub fn opponent_of(&self, team: TeamId) -> Result<TeamId, ChallengeError> {
        if team == self.challenging_team_id {
            Ok(self.challenged_team_id)
        } else if team == self.challenged_team_id {
            Ok(self.challenging_team_id)
        } else {
            Err(ChallengeError::NotInChallenge(team))
        }
    }

    pub fn status(&self) -> ChallengeStatus {
        if self.is_voided() {
            ChallengeStatus::Voided
        } else if self.date_closed.is_some() {
            ChallengeStatus::Closed
        } else if self.is_confirmed() {
            ChallengeStatus::Confirmed
        } else if self.date_reported.is_some() {
            ChallengeStatus::Reported
        } else if self.date_clock_deadline.is_some() {
            ChallengeStatus::Clocked
        } else {
            ChallengeStatus::Negotiating
        }
    }

    pub(crate) fn is_penalized(&self, team: TeamId) -> bool {
        (team == self.challenging_team_id && self.challenging_team_penalized)
            || (team == self.challenged_team_id && self.challenged_team_penalized)
    }

    /// Resolves a team actor, rejecting admins, outsiders, penalized teams,
    /// voided matches and admin-locked challenges.
    pub(crate) fn authorize_team(
        &self,
        actor: &Actor,
        ctx: &ChallengeContext<'_>,
    ) -> Result<TeamId, ChallengeError> {
        let Actor::Team(team) = *actor else {
            return Err(ChallengeError::NotAuthorized);
        };
        if !self.involves(team) {
            return Err(ChallengeError::NotInChallenge(team));
        }
        if self.is_voided() {
            return Err(ChallengeError::MatchVoided);
        }
        if self.locked {
            return Err(ChallengeError::MatchLocked);
        }
        if self.is_penalized(team) || ctx.team(team)?.penalized {
            return Err(ChallengeError::TeamPenalized(team));
        }
        Ok(team)
    }

    pub(crate) fn authorize_admin(&self, actor: &Actor) -> Result<(), ChallengeError> {
        match actor {
            Actor::Admin => Ok(()),
            Actor::Team(_) => Err(ChallengeError::NotAuthorized),
        }
    }

    pub(crate) fn ensure_open(&self) -> Result<(), ChallengeError> {
        if self.is_voided() {
            return Err(ChallengeError::MatchVoided);
        }
        if self.is_confirmed() {
            return Err(ChallengeError::MatchConfirmed);
        }
        Ok(())
    }

    pub(crate) fn ensure_not_voided(&self) -> Result<(), ChallengeError> {
        if self.is_voided() {
            return Err(ChallengeError::MatchVoided);
        }
        Ok(())
    }

    pub(crate) fn set_id(&mut self, id: ChallengeId) {
        self.id = id;
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    pub(crate) fn created_event(&self) -> ChallengeEvent {
        ChallengeEvent::Created {
            challenging_team: self.challenging_team_id,
            challenged_team: self.challenged_team_id,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::HashMap;

    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    pub const CHALLENGER: TeamId = 1;
    pub const CHALLENGED: TeamId = 2;

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap()
    }

    pub fn team(id: TeamId, prefix: &str) -> Team {
        let maps = |mode: &str| {
            (1..=5)
                .map(|n| format!("{prefix} {mode} {n}"))
                .collect::<Vec<_>>()
        };
        let mut home_maps = HashMap::new();
        home_maps.insert(GameType::TeamAnarchy, maps("TA"));
        home_maps.insert(GameType::CaptureTheFlag, maps("CTF"));
        Team {
            id,
            name: format!("{prefix} Team"),
            tag: prefix.to_uppercase(),
            roster_size: 8,
            penalized: false,
            tournament_locked: false,
            home_maps,
        }
    }

    pub fn teams() -> (Team, Team) {
        (team(CHALLENGER, "Alpha"), team(CHALLENGED, "Bravo"))
    }

    pub fn context<'a>(
        teams: &'a (Team, Team),
        history: &'a Vec<Challenge>,
        settings: &'a ChallengeSettings,
        now: DateTime<Utc>,
    ) -> ChallengeContext<'a> {
        ChallengeContext {
            now,
            challenging_team: &teams.0,
            challenged_team: &teams.1,
            history,
            settings,
        }
    }

    pub fn challenge(teams: &(Team, Team), settings: &ChallengeSettings) -> Challenge {
        let history: Vec<Challenge> = Vec::new();
        Challenge::create(1, &teams.0, &teams.1, GameType::TeamAnarchy, &history, settings, now())
            .unwrap()
    }

    /// A challenge with game type, team size, map and time all confirmed.
    pub fn scheduled(teams: &(Team, Team), settings: &ChallengeSettings) -> Challenge {
        let mut challenge = challenge(teams, settings);
        challenge.game_type.confirm(CHALLENGED).unwrap();
        challenge.team_size.set(4);
        challenge.map.set(MapSelection::home("Bravo TA 1"));
        challenge.match_time.set(now() + chrono::Duration::days(2));
        challenge
    }
}
