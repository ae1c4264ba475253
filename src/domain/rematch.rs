use chrono::{DateTime, Utc};

use super::challenge::{Challenge, ChallengeContext};
use super::error::ChallengeError;
use super::events::ChallengeEvent;
use super::models::{Actor, ChallengeId};

impl Challenge {
    /// Double opt-in: the first request is recorded, a matching request from
    /// the other team agrees to the rematch. The successor challenge itself is
    /// built by [`Challenge::create_rematch`] once an id is allocated.
    pub fn request_rematch(
        &mut self,
        actor: &Actor,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        let team = self.authorize_team(actor, ctx)?;
        if !self.is_confirmed() {
            return Err(ChallengeError::MatchNotConfirmed);
        }
        if self.date_rematched.is_some() {
            return Err(ChallengeError::RematchAlreadyCreated);
        }

        match self.rematch_team_id {
            None => {
                self.rematch_team_id = Some(team);
                self.date_rematch_requested = Some(ctx.now);
                Ok(vec![ChallengeEvent::RematchRequested { by: team }])
            }
            Some(requested_by) if requested_by == team => Err(ChallengeError::SelfConfirmation),
            Some(_) => {
                self.date_rematched = Some(ctx.now);
                Ok(vec![ChallengeEvent::RematchAgreed])
            }
        }
    }

    pub fn is_rematch_pending(&self) -> bool {
        self.date_rematched.is_some() && self.rematch_id.is_none()
    }

    /// Builds the successor of an agreed rematch and links both ways.
    ///
    /// Roles, season, colors, home map team, game type and team size carry
    /// over confirmed. Map and time are negotiated again.
    pub fn create_rematch(
        &mut self,
        id: ChallengeId,
        now: DateTime<Utc>,
    ) -> Result<(Challenge, ChallengeEvent), ChallengeError> {
        if !self.is_rematch_pending() {
            return Err(ChallengeError::RematchAlreadyCreated);
        }

        let mut rematch = self.clone();
        rematch.id = id;
        rematch.map.clear();
        rematch.match_time.clear();
        rematch.game_type.clear_pending();
        rematch.team_size.clear_pending();
        rematch.admin_created = false;
        rematch.date_created = now;
        rematch.clocked_by = None;
        rematch.date_clocked = None;
        rematch.date_clock_deadline = None;
        rematch.reporting_team_id = None;
        rematch.challenging_team_score = None;
        rematch.challenged_team_score = None;
        rematch.date_reported = None;
        rematch.date_confirmed = None;
        rematch.date_voided = None;
        rematch.date_closed = None;
        rematch.challenging_team_penalized = false;
        rematch.challenged_team_penalized = false;
        rematch.overtime_periods = None;
        rematch.caster = None;
        rematch.vod = None;
        rematch.rematch_team_id = None;
        rematch.date_rematch_requested = None;
        rematch.date_rematched = None;
        rematch.rematch_of = Some(self.id);
        rematch.rematch_id = None;
        rematch.stats = Vec::new();
        rematch.version = 0;

        self.rematch_id = Some(id);
        let event = ChallengeEvent::RematchCreated {
            original: self.id,
            rematch: id,
        };
        Ok((rematch, event))
    }
}
