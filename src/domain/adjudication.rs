use serde::{Deserialize, Serialize};

use super::challenge::{Challenge, ChallengeContext};
use super::error::ChallengeError;
use super::events::ChallengeEvent;
use super::models::{Actor, TeamId};

/// Staff resolution of a stalled match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "teams", rename_all = "camelCase")]
pub enum Adjudication {
    /// Void without penalty.
    Cancel,
    /// Reopen scheduling.
    Extend,
    /// Void and penalize the named teams.
    Penalize(Vec<TeamId>),
}

impl Challenge {
    pub fn is_adjudicable(&self, ctx: &ChallengeContext<'_>) -> bool {
        let time_passed = self.match_time.value().is_some_and(|&time| time < ctx.now);
        let deadline_passed = self
            .date_clock_deadline
            .is_some_and(|deadline| deadline < ctx.now);
        time_passed || deadline_passed
    }

    pub fn adjudicate(
        &mut self,
        actor: &Actor,
        decision: &Adjudication,
        ctx: &ChallengeContext<'_>,
    ) -> Result<Vec<ChallengeEvent>, ChallengeError> {
        self.authorize_admin(actor)?;
        self.ensure_open()?;
        if !self.is_adjudicable(ctx) {
            return Err(ChallengeError::NotYetAdjudicable);
        }

        match decision {
            Adjudication::Cancel => {
                self.date_voided = Some(ctx.now);
                Ok(vec![ChallengeEvent::Voided {
                    was_confirmed: false,
                }])
            }
            Adjudication::Extend => {
                self.match_time.clear();
                self.date_clock_deadline = None;
                Ok(vec![ChallengeEvent::Extended])
            }
            Adjudication::Penalize(teams) => {
                if teams.is_empty() {
                    return Err(ChallengeError::NoTeamsToPenalize);
                }
                if let Some(&outsider) = teams.iter().find(|&&team| !self.involves(team)) {
                    return Err(ChallengeError::NotInChallenge(outsider));
                }

                let mut events = Vec::new();
                for &team in teams {
                    if team == self.challenging_team_id {
                        self.challenging_team_penalized = true;
                    } else {
                        self.challenged_team_penalized = true;
                    }
                    events.push(ChallengeEvent::Penalized { team });
                }
                self.date_voided = Some(ctx.now);
                events.push(ChallengeEvent::Voided {
                    was_confirmed: false,
                });
                Ok(events)
            }
        }
    }
}
