use super::challenge::{Challenge, ChallengeContext};
use super::error::ChallengeError;
use super::events::ChallengeEvent;
use super::models::Actor;

impl Challenge {
    /// Files the result. The reporting team is the losing team, so it is
    /// credited with the lower of the two scores.
    pub fn report(
        &mut self,
        actor: &Actor,
        first_score: i32,
        second_score: i32,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        let team = self.authorize_team(actor, ctx)?;
        self.ensure_open()?;
        self.map.ensure_confirmed()?;
        self.team_size.ensure_confirmed()?;
        let match_time = *self.match_time.ensure_confirmed()?;
        if ctx.now < match_time {
            return Err(ChallengeError::MatchNotStarted);
        }

        let losing_score = first_score.min(second_score);
        let winning_score = first_score.max(second_score);
        let (challenging_team_score, challenged_team_score) = if team == self.challenging_team_id {
            (losing_score, winning_score)
        } else {
            (winning_score, losing_score)
        };

        self.reporting_team_id = Some(team);
        self.challenging_team_score = Some(challenging_team_score);
        self.challenged_team_score = Some(challenged_team_score);
        self.date_reported = Some(ctx.now);

        Ok(vec![ChallengeEvent::Reported {
            by: team,
            challenging_team_score,
            challenged_team_score,
        }])
    }

    /// Acceptance of the reported score by the team that did not file it.
    pub fn confirm_report(
        &mut self,
        actor: &Actor,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        let team = self.authorize_team(actor, ctx)?;
        self.ensure_open()?;
        let (Some(reporting_team), Some((challenging_team_score, challenged_team_score))) =
            (self.reporting_team_id, self.scores())
        else {
            return Err(ChallengeError::NothingReported);
        };
        if reporting_team == team {
            return Err(ChallengeError::SelfConfirmation);
        }
        self.validate_stat_counts()?;

        self.date_confirmed = Some(ctx.now);
        Ok(vec![ChallengeEvent::ResultConfirmed {
            challenging_team_score,
            challenged_team_score,
            forced: false,
        }])
    }

    /// Records a final score directly, skipping report and confirmation.
    /// Overwrites an earlier confirmed result.
    pub fn force_report(
        &mut self,
        actor: &Actor,
        challenging_team_score: i32,
        challenged_team_score: i32,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_not_voided()?;
        if self.date_closed.is_some() {
            return Err(ChallengeError::MatchClosed);
        }
        self.validate_stat_counts()?;

        if !self.match_time.is_confirmed() {
            self.match_time.set(ctx.now);
        }
        self.reporting_team_id = None;
        self.challenging_team_score = Some(challenging_team_score);
        self.challenged_team_score = Some(challenged_team_score);
        self.date_reported = Some(ctx.now);
        self.date_confirmed = Some(ctx.now);

        Ok(vec![ChallengeEvent::ResultConfirmed {
            challenging_team_score,
            challenged_team_score,
            forced: true,
        }])
    }

    /// Stats are all-or-nothing: each team has either no rows or exactly
    /// `team_size` rows, and both teams have the same count.
    pub fn validate_stat_counts(&self) -> Result<(), ChallengeError> {
        let challenging = self.stat_count(self.challenging_team_id);
        let challenged = self.stat_count(self.challenged_team_id);
        if challenging == 0 && challenged == 0 {
            return Ok(());
        }

        let team_size = self.team_size.value().copied().unwrap_or(0);
        if challenging != challenged || challenging != team_size as usize {
            return Err(ChallengeError::InsufficientOrMismatchedStats {
                team_size,
                challenging,
                challenged,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::config::settings::ChallengeSettings;
    use crate::domain::challenge::fixtures::*;
    use crate::domain::models::{Field, StatLine};

    fn played(
        teams: &(crate::domain::Team, crate::domain::Team),
        settings: &ChallengeSettings,
    ) -> crate::domain::Challenge {
        scheduled(teams, settings)
    }

    fn stat(team: i64, player: i64) -> StatLine {
        StatLine {
            team_id: team,
            player_id: player,
            kills: 5,
            ..StatLine::default()
        }
    }

    #[test]
    fn losing_team_reports_and_winner_confirms() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut challenge = played(&teams, &settings);
        let history = Vec::new();
        let ctx = context(&teams, &history, &settings, now() + Duration::days(3));

        challenge
            .report(&Actor::Team(CHALLENGER), 49, 27, &ctx)
            .unwrap();
        assert_eq!(challenge.scores(), Some((27, 49)));

        assert_eq!(
            challenge.confirm_report(&Actor::Team(CHALLENGER), &ctx),
            Err(ChallengeError::SelfConfirmation)
        );
        let events = challenge.confirm_report(&Actor::Team(CHALLENGED), &ctx).unwrap();

        assert!(challenge.is_confirmed());
        assert!(events[0].affects_ratings());
    }

    #[test]
    fn report_requires_confirmed_details() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut challenge = challenge(&teams, &settings);
        challenge.game_type.confirm(CHALLENGED).unwrap();
        let history = Vec::new();
        let ctx = context(&teams, &history, &settings, now());

        assert_eq!(
            challenge.report(&Actor::Team(CHALLENGER), 10, 20, &ctx),
            Err(ChallengeError::NotConfirmed(Field::Map))
        );
    }

    #[test]
    fn report_before_match_time_is_rejected() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut challenge = played(&teams, &settings);
        let history = Vec::new();
        let ctx = context(&teams, &history, &settings, now());

        assert_eq!(
            challenge.report(&Actor::Team(CHALLENGED), 10, 20, &ctx),
            Err(ChallengeError::MatchNotStarted)
        );
    }

    #[test]
    fn confirm_without_report_fails() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut challenge = played(&teams, &settings);
        let history = Vec::new();
        let ctx = context(&teams, &history, &settings, now() + Duration::days(3));

        assert_eq!(
            challenge.confirm_report(&Actor::Team(CHALLENGED), &ctx),
            Err(ChallengeError::NothingReported)
        );
    }

    #[test]
    fn forced_report_confirms_and_blocks_adjudication() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut challenge = challenge(&teams, &settings);
        let history = Vec::new();
        let ctx = context(&teams, &history, &settings, now());

        challenge.force_report(&Actor::Admin, 12, 30, &ctx).unwrap();

        assert!(challenge.is_confirmed());
        assert_eq!(challenge.scores(), Some((12, 30)));
        assert_eq!(challenge.match_time().value(), Some(&now()));

        let later = context(&teams, &history, &settings, now() + Duration::days(1));
        assert_eq!(
            challenge.adjudicate(&Actor::Admin, &crate::domain::Adjudication::Cancel, &later),
            Err(ChallengeError::MatchConfirmed)
        );
        assert!(challenge.is_confirmed());
    }

    #[test]
    fn mismatched_stat_counts_block_confirmation() {
        let teams = teams();
        let settings = ChallengeSettings::default();
        let mut challenge = played(&teams, &settings);
        challenge.team_size.set(5);
        let history = Vec::new();
        let ctx = context(&teams, &history, &settings, now() + Duration::days(3));

        for player in 1..=4 {
            challenge.add_stat(&Actor::Admin, stat(CHALLENGER, player)).unwrap();
        }
        assert_eq!(
            challenge.validate_stat_counts(),
            Err(ChallengeError::InsufficientOrMismatchedStats {
                team_size: 5,
                challenging: 4,
                challenged: 0,
            })
        );

        for player in 11..=13 {
            challenge.add_stat(&Actor::Admin, stat(CHALLENGED, player)).unwrap();
        }
        challenge.report(&Actor::Team(CHALLENGER), 10, 20, &ctx).unwrap();
        assert_eq!(
            challenge.confirm_report(&Actor::Team(CHALLENGED), &ctx),
            Err(ChallengeError::InsufficientOrMismatchedStats {
                team_size: 5,
                challenging: 4,
                challenged: 3,
            })
        );
        assert!(!challenge.is_confirmed());
    }
}
