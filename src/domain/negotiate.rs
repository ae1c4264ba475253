use chrono::{DateTime, Duration, Utc};

use super::challenge::{Challenge, ChallengeContext};
use super::error::ChallengeError;
use super::events::ChallengeEvent;
use super::models::{Actor, Field, GameType, MapKind, MapSelection, Team, TeamId};

const MAP_LETTERS: &str = "abcdefghij";

impl Challenge {
    pub fn suggest_game_type(
        &mut self,
        actor: &Actor,
        game_type: GameType,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        let team = self.authorize_team(actor, ctx)?;
        self.ensure_open()?;
        if !game_type.is_selectable() {
            return Err(ChallengeError::GameTypeNotSelectable(game_type));
        }
        self.game_type.suggest(team, game_type)?;
        Ok(vec![ChallengeEvent::GameTypeSuggested {
            by: team,
            game_type,
        }])
    }

    pub fn confirm_game_type(
        &mut self,
        actor: &Actor,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        let team = self.authorize_team(actor, ctx)?;
        self.ensure_open()?;
        let game_type = self.game_type.confirm(team)?;
        let mut events = vec![ChallengeEvent::GameTypeConfirmed { game_type }];
        events.extend(self.revalidate_map(ctx)?);
        Ok(events)
    }

    pub fn set_game_type(
        &mut self,
        actor: &Actor,
        game_type: GameType,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_open()?;
        self.game_type.set(game_type);
        let mut events = vec![ChallengeEvent::GameTypeConfirmed { game_type }];
        events.extend(self.revalidate_map(ctx)?);
        Ok(events)
    }

    pub fn suggest_team_size(
        &mut self,
        actor: &Actor,
        team_size: u8,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        let team = self.authorize_team(actor, ctx)?;
        self.ensure_open()?;
        self.validate_team_size(team_size, ctx)?;
        for roster_team in [ctx.challenging_team, ctx.challenged_team] {
            if roster_team.roster_size < team_size as usize {
                return Err(ChallengeError::RosterTooSmall {
                    team: roster_team.id,
                    roster: roster_team.roster_size,
                    required: team_size as usize,
                });
            }
        }
        self.team_size.suggest(team, team_size)?;
        Ok(vec![ChallengeEvent::TeamSizeSuggested { by: team, team_size }])
    }

    pub fn confirm_team_size(
        &mut self,
        actor: &Actor,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        let team = self.authorize_team(actor, ctx)?;
        self.ensure_open()?;
        let team_size = self.team_size.confirm(team)?;
        Ok(vec![ChallengeEvent::TeamSizeConfirmed { team_size }])
    }

    pub fn set_team_size(
        &mut self,
        actor: &Actor,
        team_size: u8,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_open()?;
        self.validate_team_size(team_size, ctx)?;
        self.team_size.set(team_size);
        Ok(vec![ChallengeEvent::TeamSizeConfirmed { team_size }])
    }

    fn validate_team_size(
        &self,
        team_size: u8,
        ctx: &ChallengeContext<'_>,
    ) -> Result<(), ChallengeError> {
        let (min, max) = (ctx.settings.min_team_size, ctx.settings.max_team_size);
        if !(min..=max).contains(&team_size) {
            return Err(ChallengeError::InvalidTeamSize { min, max });
        }
        Ok(())
    }

    /// One-sided pick of a home map by the away team; it confirms the map
    /// immediately.
    pub fn pick_map(
        &mut self,
        actor: &Actor,
        letter: char,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        let team = self.authorize_team(actor, ctx)?;
        self.ensure_open()?;
        if team == self.home_map_team_id {
            return Err(ChallengeError::HomeTeamCannotPick);
        }
        let game_type = *self.game_type.ensure_confirmed()?;
        self.map.ensure_unconfirmed()?;

        let home_maps = self.home_team(ctx)?.home_maps(game_type);
        let index = map_letter_index(letter, ctx.settings.home_maps_per_game_type)
            .ok_or(ChallengeError::InvalidMapLetter(letter))?;
        let name = home_maps
            .get(index)
            .ok_or(ChallengeError::InvalidMapLetter(letter))?
            .clone();

        let map = MapSelection::home(name);
        self.map.set(map.clone());
        Ok(vec![ChallengeEvent::MapConfirmed { map }])
    }

    pub fn suggest_map(
        &mut self,
        actor: &Actor,
        map: &str,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        let team = self.authorize_team(actor, ctx)?;
        self.ensure_open()?;
        let game_type = *self.game_type.ensure_confirmed()?;
        let map = map.trim();
        if map.is_empty() {
            return Err(ChallengeError::EmptyMapName);
        }
        if self.home_team(ctx)?.is_home_map(game_type, map) {
            return Err(ChallengeError::MapIsHomeMap(map.to_string()));
        }

        self.map.suggest(team, MapSelection::neutral(map))?;
        Ok(vec![ChallengeEvent::MapSuggested {
            by: team,
            map: map.to_string(),
        }])
    }

    pub fn confirm_map(
        &mut self,
        actor: &Actor,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        let team = self.authorize_team(actor, ctx)?;
        self.ensure_open()?;
        let map = self.map.confirm(team)?;
        Ok(vec![ChallengeEvent::MapConfirmed { map }])
    }

    pub fn set_map(
        &mut self,
        actor: &Actor,
        map: &str,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_open()?;
        let map = map.trim();
        if map.is_empty() {
            return Err(ChallengeError::EmptyMapName);
        }

        let is_home = match self.game_type.value() {
            Some(&game_type) => self.home_team(ctx)?.is_home_map(game_type, map),
            None => false,
        };
        let selection = if is_home {
            MapSelection::home(map)
        } else {
            MapSelection::neutral(map)
        };
        self.map.set(selection.clone());
        Ok(vec![ChallengeEvent::MapConfirmed { map: selection }])
    }

    pub fn suggest_time(
        &mut self,
        actor: &Actor,
        time: DateTime<Utc>,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        let team = self.authorize_team(actor, ctx)?;
        self.ensure_open()?;
        self.match_time.ensure_unconfirmed()?;
        ensure_schedulable(time, ctx)?;
        self.match_time.suggest(team, time)?;
        Ok(vec![ChallengeEvent::TimeSuggested { by: team, time }])
    }

    pub fn confirm_time(
        &mut self,
        actor: &Actor,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        let team = self.authorize_team(actor, ctx)?;
        self.ensure_open()?;
        let suggested = self.match_time.confirmable_by(team)?.value;
        if suggested < ctx.now {
            return Err(ChallengeError::TimeInPast(suggested));
        }
        let time = self.match_time.confirm(team)?;
        Ok(vec![ChallengeEvent::TimeConfirmed { time }])
    }

    /// Admin scheduling; unlike team suggestions the time may be in the past.
    pub fn set_time(
        &mut self,
        actor: &Actor,
        time: DateTime<Utc>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_open()?;
        self.match_time.set(time);
        Ok(vec![ChallengeEvent::TimeConfirmed { time }])
    }

    pub fn set_home_map_team(
        &mut self,
        actor: &Actor,
        team: TeamId,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_open()?;
        if !self.involves(team) {
            return Err(ChallengeError::NotInChallenge(team));
        }
        self.home_map_team_id = team;
        let mut events = vec![ChallengeEvent::HomeMapTeamChanged { team }];
        events.extend(self.revalidate_map(ctx)?);
        Ok(events)
    }

    pub(crate) fn home_team<'c>(
        &self,
        ctx: &'c ChallengeContext<'_>,
    ) -> Result<&'c Team, ChallengeError> {
        ctx.team(self.home_map_team_id)
    }

    /// Re-checks the map against the current home list after the game type
    /// or home map team changed. A confirmed home pick that is no longer on
    /// the list, or a neutral map that now collides with it, is cleared.
    fn revalidate_map(
        &mut self,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        let Some(&game_type) = self.game_type.value() else {
            return Ok(Vec::new());
        };
        let home_team = self.home_team(ctx)?;
        let mut events = Vec::new();

        if let Some(map) = self.map.value() {
            let on_list = home_team.is_home_map(game_type, &map.name);
            let invalid = match map.kind {
                MapKind::Home => !on_list,
                MapKind::Neutral => on_list,
            };
            if invalid {
                let name = map.name.clone();
                self.map.clear_confirmed();
                events.push(ChallengeEvent::MapCleared { map: name });
            }
        }

        let pending_collides = self
            .map
            .pending()
            .is_some_and(|s| home_team.is_home_map(game_type, &s.value.name));
        if pending_collides {
            self.map.clear_pending();
            events.push(ChallengeEvent::SuggestionDropped { field: Field::Map });
        }

        Ok(events)
    }
}

fn map_letter_index(letter: char, slots: usize) -> Option<usize> {
    let letter = letter.to_ascii_lowercase();
    MAP_LETTERS
        .chars()
        .take(slots)
        .position(|candidate| candidate == letter)
}

fn ensure_schedulable(time: DateTime<Utc>, ctx: &ChallengeContext<'_>) -> Result<(), ChallengeError> {
    if time < ctx.now {
        return Err(ChallengeError::TimeInPast(time));
    }
    if time > ctx.now + Duration::days(ctx.settings.max_schedule_ahead_days) {
        return Err(ChallengeError::TimeTooFarAhead(time));
    }
    Ok(())
}
