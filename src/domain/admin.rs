use chrono::{DateTime, Utc};

use super::challenge::Challenge;
use super::error::ChallengeError;
use super::events::ChallengeEvent;
use super::models::Actor;

impl Challenge {
    /// Voids the match. Voiding a confirmed result drops the confirmation,
    /// so the season must be replayed.
    pub fn void(
        &mut self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_not_voided()?;
        let was_confirmed = self.date_confirmed.take().is_some();
        self.date_voided = Some(now);
        Ok(vec![ChallengeEvent::Voided { was_confirmed }])
    }

    /// Reopens a voided match. An earlier confirmation is not restored.
    pub fn unvoid(&mut self, actor: &Actor) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        if self.date_voided.is_none() {
            return Err(ChallengeError::MatchNotVoided);
        }
        self.date_voided = None;
        Ok(vec![ChallengeEvent::Unvoided])
    }

    pub fn lock(&mut self, actor: &Actor) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_not_voided()?;
        if self.locked {
            return Err(ChallengeError::MatchLocked);
        }
        self.locked = true;
        Ok(vec![ChallengeEvent::Locked])
    }

    pub fn unlock(&mut self, actor: &Actor) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_not_voided()?;
        self.locked = false;
        Ok(vec![ChallengeEvent::Unlocked])
    }

    pub fn set_caster(
        &mut self,
        actor: &Actor,
        caster: Option<String>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_not_voided()?;
        let caster = caster
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        self.caster = caster.clone();
        Ok(vec![ChallengeEvent::CasterChanged { caster }])
    }

    pub fn unset_caster(&mut self, actor: &Actor) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.set_caster(actor, None)
    }

    pub fn set_vod(
        &mut self,
        actor: &Actor,
        url: &str,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        if !self.is_confirmed() {
            return Err(ChallengeError::MatchNotConfirmed);
        }
        let url = url.trim().to_string();
        self.vod = Some(url.clone());
        Ok(vec![ChallengeEvent::VodSet { url }])
    }

    pub fn swap_colors(&mut self, actor: &Actor) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_open()?;
        self.blue_team_id = if self.blue_team_id == self.challenging_team_id {
            self.challenged_team_id
        } else {
            self.challenging_team_id
        };
        Ok(vec![ChallengeEvent::ColorsSwapped {
            blue_team: self.blue_team_id,
        }])
    }

    pub fn set_overtime_periods(
        &mut self,
        actor: &Actor,
        periods: u32,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_not_voided()?;
        self.overtime_periods = Some(periods);
        Ok(vec![ChallengeEvent::OvertimeSet { periods }])
    }

    pub fn set_postseason(
        &mut self,
        actor: &Actor,
        postseason: bool,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_open()?;
        self.postseason = postseason;
        Ok(vec![ChallengeEvent::PostseasonChanged { postseason }])
    }

    /// Finalizes a confirmed match once its stats are in order.
    pub fn close(
        &mut self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_not_voided()?;
        if !self.is_confirmed() {
            return Err(ChallengeError::MatchNotConfirmed);
        }
        if self.date_closed.is_some() {
            return Err(ChallengeError::MatchClosed);
        }
        self.validate_stat_counts()?;
        self.date_closed = Some(now);
        Ok(vec![ChallengeEvent::Closed])
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::config::settings::ChallengeSettings;
    use crate::domain::challenge::{ChallengeStatus, fixtures::*};
    use crate::domain::models::StatLine;

    #[test]
    fn voiding_a_confirmed_match_clears_confirmation() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut challenge = scheduled(&teams, &settings);
        let history = Vec::new();
        let ctx = context(&teams, &history, &settings, now() + Duration::days(3));
        challenge.force_report(&Actor::Admin, 20, 10, &ctx).unwrap();

        let events = challenge.void(&Actor::Admin, ctx.now).unwrap();

        assert_eq!(events, vec![ChallengeEvent::Voided { was_confirmed: true }]);
        assert!(events[0].affects_ratings());
        assert!(challenge.is_voided());
        assert!(!challenge.is_confirmed());
        assert_eq!(challenge.status(), ChallengeStatus::Voided);

        assert_eq!(challenge.void(&Actor::Admin, ctx.now), Err(ChallengeError::MatchVoided));
    }

    #[test]
    fn unvoid_reopens_negotiation() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut challenge = challenge(&teams, &settings);
        assert_eq!(challenge.unvoid(&Actor::Admin), Err(ChallengeError::MatchNotVoided));

        challenge.void(&Actor::Admin, now()).unwrap();
        challenge.unvoid(&Actor::Admin).unwrap();

        assert!(challenge.is_open());
    }

    #[test]
    fn teams_cannot_use_admin_operations() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut challenge = challenge(&teams, &settings);
        let team = Actor::Team(CHALLENGER);

        assert_eq!(challenge.void(&team, now()), Err(ChallengeError::NotAuthorized));
        assert_eq!(challenge.lock(&team), Err(ChallengeError::NotAuthorized));
        assert_eq!(challenge.swap_colors(&team), Err(ChallengeError::NotAuthorized));
    }

    #[test]
    fn swap_colors_toggles_blue_team() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut challenge = challenge(&teams, &settings);

        challenge.swap_colors(&Actor::Admin).unwrap();
        assert_eq!(challenge.blue_team_id, CHALLENGED);
        challenge.swap_colors(&Actor::Admin).unwrap();
        assert_eq!(challenge.blue_team_id, CHALLENGER);
    }

    #[test]
    fn blank_caster_unsets() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut challenge = challenge(&teams, &settings);

        challenge
            .set_caster(&Actor::Admin, Some(" Kelvin ".into()))
            .unwrap();
        assert_eq!(challenge.caster.as_deref(), Some("Kelvin"));

        let events = challenge.set_caster(&Actor::Admin, Some("  ".into())).unwrap();
        assert_eq!(events, vec![ChallengeEvent::CasterChanged { caster: None }]);
    }

    #[test]
    fn close_requires_confirmation_and_consistent_stats() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut challenge = scheduled(&teams, &settings);
        let history = Vec::new();
        let ctx = context(&teams, &history, &settings, now() + Duration::days(3));

        assert_eq!(
            challenge.close(&Actor::Admin, ctx.now),
            Err(ChallengeError::MatchNotConfirmed)
        );

        challenge.force_report(&Actor::Admin, 20, 10, &ctx).unwrap();
        challenge
            .add_stat(
                &Actor::Admin,
                StatLine {
                    team_id: CHALLENGER,
                    player_id: 1,
                    ..StatLine::default()
                },
            )
            .unwrap();
        assert!(matches!(
            challenge.close(&Actor::Admin, ctx.now),
            Err(ChallengeError::InsufficientOrMismatchedStats { .. })
        ));

        challenge.clear_stats(&Actor::Admin).unwrap();
        challenge.close(&Actor::Admin, ctx.now).unwrap();
        assert_eq!(challenge.status(), ChallengeStatus::Closed);
        assert_eq!(
            challenge.close(&Actor::Admin, ctx.now),
            Err(ChallengeError::MatchClosed)
        );
    }
}
