use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use super::stats;
use crate::domain::{Challenge, ChallengeId, GameType, TeamId};
use crate::rating::MatchOutcome;

pub fn next_id(conn: &Connection) -> Result<ChallengeId> {
    conn.query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM challenges", [], |row| {
        row.get(0)
    })
    .context("Failed to allocate challenge id")
}

/// The negotiation state is kept as JSON; stats live in their own table.
fn state_json(challenge: &Challenge) -> Result<String> {
    let mut value = serde_json::to_value(challenge).context("Failed to serialize challenge")?;
    if let Some(object) = value.as_object_mut() {
        object.remove("stats");
    }
    Ok(value.to_string())
}

pub fn insert_challenge(conn: &Connection, challenge: &Challenge) -> Result<()> {
    let sql = "INSERT INTO challenges (id, season, challenging_team_id, challenged_team_id, game_type, match_time, challenging_team_score, challenged_team_score, date_confirmed, date_voided, state, version) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

    conn.execute(
        sql,
        params![
            challenge.id,
            challenge.season,
            challenge.challenging_team_id,
            challenge.challenged_team_id,
            challenge.game_type.value().map(|g| g.code()),
            challenge.match_time.value(),
            challenge.challenging_team_score,
            challenge.challenged_team_score,
            challenge.date_confirmed,
            challenge.date_voided,
            state_json(challenge)?,
            challenge.version
        ],
    )
    .with_context(|| format!("Failed to insert challenge {}", challenge.id))?;

    stats::replace_for_challenge(conn, challenge.id, &challenge.stats)
}

/// Writes `challenge` if the stored row is still at `expected_version`.
/// Returns false when another writer got there first.
pub fn update_challenge(
    conn: &Connection,
    challenge: &Challenge,
    expected_version: u32,
) -> Result<bool> {
    let sql = "UPDATE challenges SET game_type = ?1, match_time = ?2, challenging_team_score = ?3, challenged_team_score = ?4, date_confirmed = ?5, date_voided = ?6, state = ?7, version = ?8 WHERE id = ?9 AND version = ?10";

    let changed = conn
        .execute(
            sql,
            params![
                challenge.game_type.value().map(|g| g.code()),
                challenge.match_time.value(),
                challenge.challenging_team_score,
                challenge.challenged_team_score,
                challenge.date_confirmed,
                challenge.date_voided,
                state_json(challenge)?,
                challenge.version,
                challenge.id,
                expected_version
            ],
        )
        .with_context(|| format!("Failed to update challenge {}", challenge.id))?;

    if changed == 0 {
        return Ok(false);
    }
    stats::replace_for_challenge(conn, challenge.id, &challenge.stats)?;
    Ok(true)
}

fn load_state(conn: &Connection, state: &str) -> Result<Challenge> {
    let mut challenge: Challenge =
        serde_json::from_str(state).context("Failed to deserialize challenge state")?;
    challenge.stats = stats::list_for_challenge(conn, challenge.id)?;
    Ok(challenge)
}

fn query_challenges(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<Challenge>> {
    let mut stmt = conn.prepare(sql)?;
    let states = stmt
        .query_map(params, |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    states.iter().map(|state| load_state(conn, state)).collect()
}

pub fn find_by_id(conn: &Connection, id: ChallengeId) -> Result<Option<Challenge>> {
    let state: Option<String> = conn
        .query_row(
            "SELECT state FROM challenges WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()
        .context("Failed to query challenge by id")?;

    state.map(|state| load_state(conn, &state)).transpose()
}

/// Every challenge involving either team except `excluding`, the history the
/// clock and creation rules are checked against.
pub fn list_involving(
    conn: &Connection,
    first: TeamId,
    second: TeamId,
    excluding: Option<ChallengeId>,
) -> Result<Vec<Challenge>> {
    let sql = "SELECT state FROM challenges WHERE (challenging_team_id IN (?1, ?2) OR challenged_team_id IN (?1, ?2)) AND id != ?3 ORDER BY id";

    query_challenges(conn, sql, params![first, second, excluding.unwrap_or(0)])
}

pub fn list_by_season(conn: &Connection, season: u32) -> Result<Vec<Challenge>> {
    let sql = "SELECT state FROM challenges WHERE season = ?1 ORDER BY id";

    query_challenges(conn, sql, params![season])
}

struct OutcomeRow {
    challenge_id: ChallengeId,
    game_type: Option<String>,
    match_time: DateTime<Utc>,
    challenging_team_id: TeamId,
    challenged_team_id: TeamId,
    challenging_team_score: i32,
    challenged_team_score: i32,
}

fn parse_outcome_row(row: &rusqlite::Row) -> rusqlite::Result<OutcomeRow> {
    Ok(OutcomeRow {
        challenge_id: row.get(0)?,
        game_type: row.get(1)?,
        match_time: row.get(2)?,
        challenging_team_id: row.get(3)?,
        challenged_team_id: row.get(4)?,
        challenging_team_score: row.get(5)?,
        challenged_team_score: row.get(6)?,
    })
}

/// Confirmed, unvoided results of a season, the input of the rating replay.
pub fn confirmed_outcomes(conn: &Connection, season: u32) -> Result<Vec<MatchOutcome>> {
    let sql = "SELECT id, game_type, match_time, challenging_team_id, challenged_team_id, challenging_team_score, challenged_team_score FROM challenges WHERE season = ?1 AND date_confirmed IS NOT NULL AND date_voided IS NULL AND match_time IS NOT NULL AND challenging_team_score IS NOT NULL AND challenged_team_score IS NOT NULL ORDER BY match_time, id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![season], parse_outcome_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to load confirmed matches")?;

    rows.into_iter()
        .map(|row| {
            let game_type = match row.game_type.as_deref() {
                Some(code) => GameType::from_code(code).ok_or_else(|| {
                    anyhow!("Challenge {} has unknown game type {code}", row.challenge_id)
                })?,
                None => GameType::TeamAnarchy,
            };
            Ok(MatchOutcome {
                challenge_id: row.challenge_id,
                season,
                game_type,
                match_time: row.match_time,
                challenging_team_id: row.challenging_team_id,
                challenged_team_id: row.challenged_team_id,
                challenging_team_score: row.challenging_team_score,
                challenged_team_score: row.challenged_team_score,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::config::settings::ChallengeSettings;
    use crate::database::{setup::initialize_database, teams};
    use crate::domain::challenge::fixtures::{self, CHALLENGED, CHALLENGER};
    use crate::domain::{Actor, StatLine};

    fn seeded() -> (Connection, Challenge) {
        let conn = Connection::open_in_memory().unwrap();
        initialize_database(&conn).unwrap();
        let (alpha, bravo) = fixtures::teams();
        teams::upsert_team(&conn, &alpha).unwrap();
        teams::upsert_team(&conn, &bravo).unwrap();
        let challenge = fixtures::scheduled(&(alpha, bravo), &ChallengeSettings::default());
        insert_challenge(&conn, &challenge).unwrap();
        (conn, challenge)
    }

    #[test]
    fn challenge_round_trips_with_stats() {
        let (conn, mut challenge) = seeded();
        challenge
            .add_stat(
                &Actor::Admin,
                StatLine {
                    team_id: CHALLENGER,
                    player_id: 12,
                    kills: 9,
                    damage: Some(1520.5),
                    ..StatLine::default()
                },
            )
            .unwrap();
        challenge.bump_version();
        assert!(update_challenge(&conn, &challenge, 0).unwrap());

        let loaded = find_by_id(&conn, challenge.id()).unwrap().unwrap();
        assert_eq!(loaded, challenge);
        assert!(find_by_id(&conn, 99).unwrap().is_none());
    }

    #[test]
    fn stale_version_is_not_written() {
        let (conn, mut challenge) = seeded();
        challenge.bump_version();
        assert!(update_challenge(&conn, &challenge, 0).unwrap());

        challenge.bump_version();
        assert!(!update_challenge(&conn, &challenge, 0).unwrap());
        assert_eq!(find_by_id(&conn, challenge.id()).unwrap().unwrap().version(), 1);
    }

    #[test]
    fn outcomes_include_only_confirmed_unvoided_matches() {
        let (conn, mut challenge) = seeded();
        assert!(confirmed_outcomes(&conn, 1).unwrap().is_empty());

        let teams = fixtures::teams();
        let settings = ChallengeSettings::default();
        let history = Vec::new();
        let ctx = fixtures::context(&teams, &history, &settings, fixtures::now() + Duration::days(3));
        challenge.force_report(&Actor::Admin, 22, 11, &ctx).unwrap();
        challenge.bump_version();
        update_challenge(&conn, &challenge, 0).unwrap();

        let outcomes = confirmed_outcomes(&conn, 1).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].game_type, GameType::TeamAnarchy);
        assert_eq!(outcomes[0].challenging_team_score, 22);

        challenge.void(&Actor::Admin, ctx.now).unwrap();
        challenge.bump_version();
        update_challenge(&conn, &challenge, 1).unwrap();
        assert!(confirmed_outcomes(&conn, 1).unwrap().is_empty());
    }

    #[test]
    fn history_excludes_the_current_challenge() {
        let (conn, challenge) = seeded();
        assert!(list_involving(&conn, CHALLENGER, CHALLENGED, Some(challenge.id())).unwrap().is_empty());
        assert_eq!(list_involving(&conn, CHALLENGED, 42, None).unwrap().len(), 1);
        assert_eq!(next_id(&conn).unwrap(), 2);
    }
}
