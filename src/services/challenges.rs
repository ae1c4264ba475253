use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};

use super::notify::{Notifier, announce};
use super::recompute::recompute_season;
use crate::config::settings::AppConfig;
use crate::database::{self, DbPool};
use crate::domain::{
    Actor, Challenge, ChallengeCommand, ChallengeContext, ChallengeError, ChallengeEvent,
    ChallengeId, GameType, Team, TeamId,
};
use crate::errors::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChallenge {
    pub challenging_team_id: TeamId,
    pub challenged_team_id: TeamId,
    pub game_type: GameType,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutcome {
    pub challenge: Challenge,
    pub events: Vec<ChallengeEvent>,
    /// Successor created when both teams agreed to a rematch.
    pub rematch: Option<Challenge>,
}

/// Runs challenge operations, one IMMEDIATE transaction per call.
pub struct ChallengeService {
    pool: DbPool,
    config: AppConfig,
    notifier: Arc<dyn Notifier>,
}

impl ChallengeService {
    pub fn new(pool: DbPool, config: AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            pool,
            config,
            notifier,
        }
    }

    pub fn create(&self, actor: &Actor, request: &NewChallenge) -> ServiceResult<Challenge> {
        self.create_at(actor, request, Utc::now())
    }

    pub fn create_at(
        &self,
        actor: &Actor,
        request: &NewChallenge,
        now: DateTime<Utc>,
    ) -> ServiceResult<Challenge> {
        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let challenging = load_team(&tx, request.challenging_team_id)?;
        let challenged = load_team(&tx, request.challenged_team_id)?;
        let id = database::challenges::next_id(&tx)?;
        let settings = &self.config.challenge;

        let result = match actor {
            Actor::Admin => Challenge::create_by_admin(
                id,
                &challenging,
                &challenged,
                request.game_type,
                settings,
                now,
            ),
            Actor::Team(team) if *team == challenging.id => {
                let history = database::challenges::list_involving(
                    &tx,
                    challenging.id,
                    challenged.id,
                    None,
                )?;
                Challenge::create(
                    id,
                    &challenging,
                    &challenged,
                    request.game_type,
                    &history,
                    settings,
                    now,
                )
            }
            Actor::Team(_) => Err(ChallengeError::NotAuthorized),
        };
        let challenge = result.inspect_err(|err| {
            warn!(
                "Challenge by {} against {} rejected: {}",
                challenging.id, challenged.id, err
            );
        })?;

        database::challenges::insert_challenge(&tx, &challenge)?;
        tx.commit()?;

        info!(
            "Challenge {} created: {} vs {}",
            challenge.id(),
            challenging.name,
            challenged.name
        );
        announce(self.notifier.as_ref(), challenge.id(), &[challenge.created_event()]);
        Ok(challenge)
    }

    pub fn execute(
        &self,
        id: ChallengeId,
        actor: &Actor,
        command: ChallengeCommand,
        expected_version: Option<u32>,
    ) -> ServiceResult<CommandOutcome> {
        self.execute_at(id, actor, command, expected_version, Utc::now())
    }

    /// Applies one command. Validation, the write, any rematch creation and
    /// the season recompute commit together or not at all.
    pub fn execute_at(
        &self,
        id: ChallengeId,
        actor: &Actor,
        command: ChallengeCommand,
        expected_version: Option<u32>,
        now: DateTime<Utc>,
    ) -> ServiceResult<CommandOutcome> {
        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut challenge = load_challenge(&tx, id)?;
        let stored_version = challenge.version();
        if expected_version.is_some_and(|version| version != stored_version) {
            warn!(
                "Challenge {} is at version {}, client expected {:?}",
                id, stored_version, expected_version
            );
            return Err(ChallengeError::ConcurrentModification(id).into());
        }

        let challenging = load_team(&tx, challenge.challenging_team_id())?;
        let challenged = load_team(&tx, challenge.challenged_team_id())?;
        let history = database::challenges::list_involving(
            &tx,
            challenging.id,
            challenged.id,
            Some(id),
        )?;
        let ctx = ChallengeContext {
            now,
            challenging_team: &challenging,
            challenged_team: &challenged,
            history: &history,
            settings: &self.config.challenge,
        };

        let name = command.name();
        let mut events = challenge.apply(actor, command, &ctx).inspect_err(|err| {
            warn!("{} on challenge {} by {:?} rejected: {}", name, id, actor, err);
        })?;

        for event in &events {
            if let ChallengeEvent::Penalized { team } = event {
                database::teams::set_penalized(&tx, *team, true)?;
            }
        }

        let mut rematch = None;
        if challenge.is_rematch_pending() {
            let rematch_id = database::challenges::next_id(&tx)?;
            let (successor, event) = challenge.create_rematch(rematch_id, now)?;
            database::challenges::insert_challenge(&tx, &successor)?;
            events.push(event);
            rematch = Some(successor);
        }

        challenge.bump_version();
        if !database::challenges::update_challenge(&tx, &challenge, stored_version)? {
            warn!("Challenge {} changed underneath {}", id, name);
            return Err(ChallengeError::ConcurrentModification(id).into());
        }

        if events.iter().any(ChallengeEvent::affects_ratings) {
            recompute_season(&tx, challenge.season(), &self.config.rating)?;
        }

        tx.commit()?;
        info!(
            "{} applied to challenge {} (version {})",
            name,
            id,
            challenge.version()
        );

        announce(self.notifier.as_ref(), id, &events);
        if let Some(successor) = &rematch {
            announce(self.notifier.as_ref(), successor.id(), &[successor.created_event()]);
        }

        Ok(CommandOutcome {
            challenge,
            events,
            rematch,
        })
    }

    pub fn find(&self, id: ChallengeId) -> ServiceResult<Challenge> {
        let conn = database::get_connection(&self.pool)?;
        load_challenge(&conn, id)
    }

    pub fn season_challenges(&self, season: u32) -> ServiceResult<Vec<Challenge>> {
        let conn = database::get_connection(&self.pool)?;
        Ok(database::challenges::list_by_season(&conn, season)?)
    }

    /// Lifts a team-level penalty so the team may act again.
    pub fn release_penalty(&self, actor: &Actor, team: TeamId) -> ServiceResult<()> {
        if *actor != Actor::Admin {
            return Err(ChallengeError::NotAuthorized.into());
        }
        let conn = database::get_connection(&self.pool)?;
        if !database::teams::set_penalized(&conn, team, false)? {
            return Err(ChallengeError::TeamNotFound(team).into());
        }
        info!("Penalty of team {} released", team);
        Ok(())
    }
}

fn load_team(conn: &Connection, id: TeamId) -> ServiceResult<Team> {
    database::teams::find_by_id(conn, id)?.ok_or(ServiceError::Rejected(ChallengeError::TeamNotFound(id)))
}

fn load_challenge(conn: &Connection, id: ChallengeId) -> ServiceResult<Challenge> {
    database::challenges::find_by_id(conn, id)?
        .ok_or(ServiceError::Rejected(ChallengeError::ChallengeNotFound(id)))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::challenge::fixtures::{self, CHALLENGED, CHALLENGER, now};
    use crate::domain::{Adjudication, MapSelection};
    use crate::services::notify::Recipient;
    use crate::services::notify::testing::RecordingNotifier;

    fn service() -> (ChallengeService, Arc<RecordingNotifier>) {
        let pool = database::create_memory_pool().unwrap();
        {
            let conn = database::get_connection(&pool).unwrap();
            database::initialize_database(&conn).unwrap();
            let (alpha, bravo) = fixtures::teams();
            database::teams::upsert_team(&conn, &alpha).unwrap();
            database::teams::upsert_team(&conn, &bravo).unwrap();
            database::teams::upsert_team(&conn, &fixtures::team(3, "Charlie")).unwrap();
        }
        let notifier = Arc::new(RecordingNotifier::default());
        let service = ChallengeService::new(pool, AppConfig::default(), notifier.clone());
        (service, notifier)
    }

    fn request(challenging: TeamId, challenged: TeamId) -> NewChallenge {
        NewChallenge {
            challenging_team_id: challenging,
            challenged_team_id: challenged,
            game_type: GameType::TeamAnarchy,
        }
    }

    fn run(service: &ChallengeService, id: ChallengeId, actor: Actor, command: ChallengeCommand) {
        service
            .execute_at(id, &actor, command, None, now())
            .unwrap();
    }

    /// Negotiates challenge `id` up to a scheduled match two days out.
    fn schedule(service: &ChallengeService, id: ChallengeId) {
        let time = now() + Duration::days(2);
        run(service, id, Actor::Team(CHALLENGED), ChallengeCommand::ConfirmGameType);
        run(service, id, Actor::Admin, ChallengeCommand::SetTeamSize { team_size: 4 });
        run(service, id, Actor::Team(CHALLENGER), ChallengeCommand::PickMap { letter: 'a' });
        run(service, id, Actor::Team(CHALLENGER), ChallengeCommand::SuggestTime { time });
        run(service, id, Actor::Team(CHALLENGED), ChallengeCommand::ConfirmTime);
    }

    fn stored_ratings(service: &ChallengeService, season: u32) -> Vec<crate::rating::MatchRating> {
        let conn = database::get_connection(&service.pool).unwrap();
        database::ratings::list_by_season(&conn, season).unwrap()
    }

    #[test]
    fn only_the_challenging_team_may_create() {
        let (service, _) = service();
        let result = service.create_at(&Actor::Team(CHALLENGED), &request(CHALLENGER, CHALLENGED), now());
        assert!(matches!(
            result,
            Err(ServiceError::Rejected(ChallengeError::NotAuthorized))
        ));

        let result = service.create_at(&Actor::Team(CHALLENGER), &request(CHALLENGER, 77), now());
        assert!(matches!(
            result,
            Err(ServiceError::Rejected(ChallengeError::TeamNotFound(77)))
        ));
    }

    #[test]
    fn confirmed_result_updates_season_ratings() {
        let (service, notifier) = service();
        let challenge = service
            .create_at(&Actor::Team(CHALLENGER), &request(CHALLENGER, CHALLENGED), now())
            .unwrap();
        schedule(&service, challenge.id());

        let after = now() + Duration::days(3);
        service
            .execute_at(
                challenge.id(),
                &Actor::Team(CHALLENGED),
                ChallengeCommand::Report {
                    first_score: 30,
                    second_score: 10,
                },
                None,
                after,
            )
            .unwrap();
        let outcome = service
            .execute_at(
                challenge.id(),
                &Actor::Team(CHALLENGER),
                ChallengeCommand::ConfirmReport,
                None,
                after,
            )
            .unwrap();

        assert!(outcome.challenge.is_confirmed());
        let ratings = stored_ratings(&service, 1);
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].challenging_team_rating, 1516.0);
        assert_eq!(ratings[0].challenged_team_rating, 1484.0);
        assert!(!notifier.messages.lock().unwrap().is_empty());
    }

    #[test]
    fn voiding_a_confirmed_match_removes_its_rating() {
        let (service, _) = service();
        let challenge = service
            .create_at(&Actor::Admin, &request(CHALLENGER, CHALLENGED), now())
            .unwrap();
        run(
            &service,
            challenge.id(),
            Actor::Admin,
            ChallengeCommand::ForceReport {
                challenging_team_score: 10,
                challenged_team_score: 20,
            },
        );
        assert_eq!(stored_ratings(&service, 1).len(), 1);

        run(&service, challenge.id(), Actor::Admin, ChallengeCommand::Void);
        assert!(stored_ratings(&service, 1).is_empty());
    }

    #[test]
    fn earlier_result_confirmed_later_rerates_following_matches() {
        let (service, _) = service();
        let force = |id: ChallengeId, at: DateTime<Utc>| {
            service
                .execute_at(
                    id,
                    &Actor::Admin,
                    ChallengeCommand::ForceReport {
                        challenging_team_score: 20,
                        challenged_team_score: 10,
                    },
                    None,
                    at,
                )
                .unwrap();
        };

        let later = service
            .create_at(&Actor::Admin, &request(CHALLENGER, 3), now())
            .unwrap();
        force(later.id(), now() + Duration::days(5));
        let rating_of = |ratings: &[crate::rating::MatchRating], id: ChallengeId| {
            ratings
                .iter()
                .find(|r| r.challenge_id == id)
                .cloned()
                .unwrap()
        };
        let before = rating_of(&stored_ratings(&service, 1), later.id());

        let earlier = service
            .create_at(&Actor::Admin, &request(CHALLENGER, CHALLENGED), now())
            .unwrap();
        force(earlier.id(), now() + Duration::days(1));

        let ratings = stored_ratings(&service, 1);
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0].challenge_id, earlier.id());
        let after = rating_of(&ratings, later.id());
        assert!(after.challenging_team_rating > before.challenging_team_rating);
        assert_ne!(after.change, before.change);
    }

    #[test]
    fn rejected_command_persists_nothing() {
        let (service, _) = service();
        let challenge = service
            .create_at(&Actor::Team(CHALLENGER), &request(CHALLENGER, CHALLENGED), now())
            .unwrap();

        let result = service.execute_at(
            challenge.id(),
            &Actor::Team(CHALLENGER),
            ChallengeCommand::ConfirmGameType,
            None,
            now(),
        );

        assert!(matches!(
            result,
            Err(ServiceError::Rejected(ChallengeError::SelfConfirmation))
        ));
        assert_eq!(service.find(challenge.id()).unwrap(), challenge);
    }

    #[test]
    fn stale_expected_version_is_rejected() {
        let (service, _) = service();
        let challenge = service
            .create_at(&Actor::Team(CHALLENGER), &request(CHALLENGER, CHALLENGED), now())
            .unwrap();
        run(&service, challenge.id(), Actor::Team(CHALLENGED), ChallengeCommand::ConfirmGameType);

        let result = service.execute_at(
            challenge.id(),
            &Actor::Team(CHALLENGER),
            ChallengeCommand::SuggestTeamSize { team_size: 3 },
            Some(0),
            now(),
        );
        assert!(matches!(
            result,
            Err(ServiceError::Rejected(ChallengeError::ConcurrentModification(_)))
        ));
        assert_eq!(service.find(challenge.id()).unwrap().version(), 1);
    }

    #[test]
    fn penalty_blocks_the_team_until_released() {
        let (service, notifier) = service();
        let challenge = service
            .create_at(&Actor::Team(CHALLENGER), &request(CHALLENGER, CHALLENGED), now())
            .unwrap();
        schedule(&service, challenge.id());

        let later = now() + Duration::days(3);
        service
            .execute_at(
                challenge.id(),
                &Actor::Admin,
                ChallengeCommand::Adjudicate {
                    adjudication: Adjudication::Penalize(vec![CHALLENGED]),
                },
                None,
                later,
            )
            .unwrap();
        assert!(
            notifier
                .messages
                .lock()
                .unwrap()
                .iter()
                .any(|(recipient, _)| *recipient == Recipient::Team(CHALLENGED))
        );

        let blocked = service.create_at(&Actor::Team(3), &request(3, CHALLENGED), later);
        assert!(matches!(
            blocked,
            Err(ServiceError::Rejected(ChallengeError::TeamPenalized(CHALLENGED)))
        ));

        service.release_penalty(&Actor::Admin, CHALLENGED).unwrap();
        service
            .create_at(&Actor::Team(3), &request(3, CHALLENGED), later)
            .unwrap();
    }

    #[test]
    fn agreed_rematch_creates_linked_challenge() {
        let (service, _) = service();
        let challenge = service
            .create_at(&Actor::Team(CHALLENGER), &request(CHALLENGER, CHALLENGED), now())
            .unwrap();
        schedule(&service, challenge.id());
        let after = now() + Duration::days(3);
        for (actor, command) in [
            (
                Actor::Team(CHALLENGER),
                ChallengeCommand::Report {
                    first_score: 12,
                    second_score: 20,
                },
            ),
            (Actor::Team(CHALLENGED), ChallengeCommand::ConfirmReport),
            (Actor::Team(CHALLENGED), ChallengeCommand::RequestRematch),
        ] {
            service
                .execute_at(challenge.id(), &actor, command, None, after)
                .unwrap();
        }

        let outcome = service
            .execute_at(
                challenge.id(),
                &Actor::Team(CHALLENGER),
                ChallengeCommand::RequestRematch,
                None,
                after,
            )
            .unwrap();

        let rematch = outcome.rematch.unwrap();
        assert_eq!(outcome.challenge.rematch_id(), Some(rematch.id()));
        assert_eq!(service.find(rematch.id()).unwrap(), rematch);
        assert_eq!(
            service.find(challenge.id()).unwrap().map().value(),
            Some(&MapSelection::home("Bravo TA 1"))
        );
        assert_eq!(service.season_challenges(1).unwrap().len(), 2);
    }
}
