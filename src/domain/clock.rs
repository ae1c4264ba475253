use chrono::{DateTime, Duration, Utc};

use super::challenge::{Challenge, ChallengeContext};
use super::error::ChallengeError;
use super::events::ChallengeEvent;
use super::models::{Actor, TeamId};
use crate::config::settings::ChallengeSettings;

/// Queries over a team's other challenges, used by the clock rules and by
/// challenge creation.
pub trait ChallengeHistory {
    /// Most recent time `team` clocked any challenge.
    fn last_clock_by(&self, team: TeamId) -> Option<DateTime<Utc>>;

    /// Open challenges involving `team` that currently have a clock deadline.
    fn active_clock_count(&self, team: TeamId) -> usize;

    fn has_clocked_opponent(&self, team: TeamId, opponent: TeamId, season: u32) -> bool;

    fn has_open_challenge_between(&self, first: TeamId, second: TeamId) -> bool;
}

impl ChallengeHistory for Vec<Challenge> {
    fn last_clock_by(&self, team: TeamId) -> Option<DateTime<Utc>> {
        self.iter()
            .filter(|c| c.clocked_by == Some(team))
            .filter_map(|c| c.date_clocked)
            .max()
    }

    fn active_clock_count(&self, team: TeamId) -> usize {
        self.iter()
            .filter(|c| c.involves(team) && c.is_clock_active())
            .count()
    }

    fn has_clocked_opponent(&self, team: TeamId, opponent: TeamId, season: u32) -> bool {
        self.iter().any(|c| {
            c.season == season && c.clocked_by == Some(team) && c.involves(opponent)
        })
    }

    fn has_open_challenge_between(&self, first: TeamId, second: TeamId) -> bool {
        self.iter()
            .any(|c| c.involves(first) && c.involves(second) && c.is_open())
    }
}

/// Rate limits on clocking: a cooldown between a team's own clocks, a cap
/// on simultaneously clocked challenges per team, and one clock per opponent
/// per season.
pub struct ClockPolicy<'a> {
    settings: &'a ChallengeSettings,
}

impl<'a> ClockPolicy<'a> {
    pub fn new(settings: &'a ChallengeSettings) -> Self {
        Self { settings }
    }

    pub fn check(
        &self,
        history: &dyn ChallengeHistory,
        team: TeamId,
        opponent: TeamId,
        season: u32,
        now: DateTime<Utc>,
    ) -> Result<(), ChallengeError> {
        if let Some(last) = history.last_clock_by(team) {
            let until = last + Duration::days(self.settings.clock_cooldown_days);
            if now < until {
                return Err(ChallengeError::ClockCooldownActive { team, until });
            }
        }

        for id in [team, opponent] {
            if history.active_clock_count(id) >= self.settings.max_clocked_challenges {
                return Err(ChallengeError::ClockLimitReached(id));
            }
        }

        if history.has_clocked_opponent(team, opponent, season) {
            return Err(ChallengeError::OpponentAlreadyClocked { team, opponent });
        }

        Ok(())
    }

    pub fn deadline(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(self.settings.clock_deadline_days)
    }
}

impl Challenge {
    pub fn clock(
        &mut self,
        actor: &Actor,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        let team = self.authorize_team(actor, ctx)?;
        self.ensure_open()?;
        if self.date_clocked.is_some() {
            return Err(ChallengeError::AlreadyClocked);
        }
        if self.match_time.is_confirmed() {
            return Err(ChallengeError::AlreadyScheduled);
        }

        let opponent = self.opponent_of(team)?;
        for id in [team, opponent] {
            if ctx.team(id)?.tournament_locked {
                return Err(ChallengeError::TeamInTournament(id));
            }
        }

        let policy = ClockPolicy::new(ctx.settings);
        policy.check(ctx.history, team, opponent, self.season, ctx.now)?;

        let deadline = policy.deadline(ctx.now);
        self.clocked_by = Some(team);
        self.date_clocked = Some(ctx.now);
        self.date_clock_deadline = Some(deadline);

        Ok(vec![ChallengeEvent::Clocked { by: team, deadline }])
    }

    /// Removes an active clock deadline. The clock record itself stays, so it
    /// still counts towards the clocking team's limits.
    pub fn unclock(&mut self, actor: &Actor) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_open()?;
        if self.date_clock_deadline.is_none() {
            return Err(ChallengeError::NotClocked);
        }
        self.date_clock_deadline = None;
        Ok(vec![ChallengeEvent::Unclocked])
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::challenge::fixtures::*;
    use crate::domain::models::Team;

    fn other_challenge(id: i64, first: &Team, second: &Team) -> Challenge {
        let settings = ChallengeSettings::default();
        Challenge::blank(id, first.id, second.id, &settings, now() - Duration::days(60))
    }

    #[test]
    fn clocking_sets_deadline() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut challenge = challenge(&teams, &settings);
        let history = Vec::new();
        let ctx = context(&teams, &history, &settings, now());

        let events = challenge.clock(&Actor::Team(CHALLENGER), &ctx).unwrap();

        let deadline = now() + Duration::days(28);
        assert_eq!(events, vec![ChallengeEvent::Clocked { by: CHALLENGER, deadline }]);
        assert_eq!(challenge.date_clock_deadline, Some(deadline));
        assert_eq!(challenge.clocked_by, Some(CHALLENGER));
    }

    #[test]
    fn recent_clock_triggers_cooldown() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let third = team(3, "Charlie");
        let mut earlier = other_challenge(5, &teams.0, &third);
        let clocked_at = now() - Duration::days(10);
        earlier.clocked_by = Some(CHALLENGER);
        earlier.date_clocked = Some(clocked_at);
        earlier.date_confirmed = Some(now() - Duration::days(5));
        let history = vec![earlier];

        let mut challenge = challenge(&teams, &settings);
        let ctx = context(&teams, &history, &settings, now());

        assert_eq!(
            challenge.clock(&Actor::Team(CHALLENGER), &ctx),
            Err(ChallengeError::ClockCooldownActive {
                team: CHALLENGER,
                until: clocked_at + Duration::days(28),
            })
        );
        assert!(challenge.date_clocked.is_none());
    }

    #[test]
    fn two_active_clocks_is_the_limit() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let history: Vec<Challenge> = [3, 4]
            .into_iter()
            .map(|id| {
                let opponent = team(id, "Other");
                let mut clocked = other_challenge(id + 10, &opponent, &teams.1);
                clocked.clocked_by = Some(id);
                clocked.date_clocked = Some(now() - Duration::days(3));
                clocked.date_clock_deadline = Some(now() + Duration::days(25));
                clocked
            })
            .collect();

        let mut challenge = challenge(&teams, &settings);
        let ctx = context(&teams, &history, &settings, now());

        assert_eq!(
            challenge.clock(&Actor::Team(CHALLENGER), &ctx),
            Err(ChallengeError::ClockLimitReached(CHALLENGED))
        );
    }

    #[test]
    fn clocking_team_at_its_own_limit_is_refused() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let history: Vec<Challenge> = [3, 4]
            .into_iter()
            .map(|id| {
                let opponent = team(id, "Other");
                let mut clocked = other_challenge(id + 10, &opponent, &teams.0);
                clocked.clocked_by = Some(id);
                clocked.date_clocked = Some(now() - Duration::days(3));
                clocked.date_clock_deadline = Some(now() + Duration::days(25));
                clocked
            })
            .collect();

        let mut challenge = challenge(&teams, &settings);
        let ctx = context(&teams, &history, &settings, now());

        assert_eq!(
            challenge.clock(&Actor::Team(CHALLENGER), &ctx),
            Err(ChallengeError::ClockLimitReached(CHALLENGER))
        );
        assert!(challenge.date_clock_deadline.is_none());
    }

    #[test]
    fn opponent_can_only_be_clocked_once_per_season() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut earlier = other_challenge(5, &teams.1, &teams.0);
        earlier.clocked_by = Some(CHALLENGER);
        earlier.date_clocked = Some(now() - Duration::days(50));
        earlier.date_voided = Some(now() - Duration::days(40));
        let history = vec![earlier];

        let mut challenge = challenge(&teams, &settings);
        let ctx = context(&teams, &history, &settings, now());

        assert_eq!(
            challenge.clock(&Actor::Team(CHALLENGER), &ctx),
            Err(ChallengeError::OpponentAlreadyClocked {
                team: CHALLENGER,
                opponent: CHALLENGED,
            })
        );
    }

    #[test]
    fn scheduled_match_cannot_be_clocked() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut challenge = scheduled(&teams, &settings);
        let history = Vec::new();
        let ctx = context(&teams, &history, &settings, now());

        assert_eq!(
            challenge.clock(&Actor::Team(CHALLENGED), &ctx),
            Err(ChallengeError::AlreadyScheduled)
        );
    }

    #[test]
    fn tournament_lock_blocks_clocking() {
        let (challenger, mut challenged) = teams();
        challenged.tournament_locked = true;
        let pair = (challenger, challenged);
        let settings = ChallengeSettings::default();
        let mut challenge = challenge(&pair, &settings);
        let history = Vec::new();
        let ctx = context(&pair, &history, &settings, now());

        assert_eq!(
            challenge.clock(&Actor::Team(CHALLENGER), &ctx),
            Err(ChallengeError::TeamInTournament(CHALLENGED))
        );
    }

    #[test]
    fn unclock_keeps_clock_record() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut challenge = challenge(&teams, &settings);
        let history = Vec::new();
        let ctx = context(&teams, &history, &settings, now());
        challenge.clock(&Actor::Team(CHALLENGED), &ctx).unwrap();

        assert_eq!(
            challenge.unclock(&Actor::Team(CHALLENGER)),
            Err(ChallengeError::NotAuthorized)
        );
        challenge.unclock(&Actor::Admin).unwrap();

        assert!(challenge.date_clock_deadline.is_none());
        assert_eq!(challenge.clocked_by, Some(CHALLENGED));
        assert_eq!(
            challenge.clock(&Actor::Team(CHALLENGER), &ctx),
            Err(ChallengeError::AlreadyClocked)
        );
    }
}
