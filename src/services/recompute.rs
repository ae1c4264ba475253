use anyhow::{Context, Result};
use log::info;
use rusqlite::{Connection, TransactionBehavior};

use crate::config::settings::{AppConfig, RatingSettings};
use crate::database::{self, DbPool};
use crate::rating::{self, MatchRating, SeasonReplay};

/// Replays the season and rewrites its stored ratings on `conn`.
///
/// Runs inside the caller's transaction so a failure anywhere leaves the
/// previous ratings in place.
pub fn recompute_season(
    conn: &Connection,
    season: u32,
    config: &RatingSettings,
) -> Result<SeasonReplay> {
    let outcomes = database::challenges::confirmed_outcomes(conn, season)?;
    let replay = rating::replay_season(season, &outcomes, config);
    database::ratings::replace_season(conn, season, &replay.ratings)?;
    info!(
        "Season {}: stored {} match ratings for {} teams",
        season,
        replay.ratings.len(),
        replay.standings.len()
    );
    Ok(replay)
}

pub struct RecomputeService {
    pool: DbPool,
    config: AppConfig,
}

impl RecomputeService {
    pub fn new(pool: DbPool, config: AppConfig) -> Self {
        Self { pool, config }
    }

    pub fn run(&self, season: u32) -> Result<SeasonReplay> {
        info!("=== Recomputing ratings for season {} ===", season);
        let mut conn = database::get_connection(&self.pool)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to start recompute transaction")?;

        let replay = recompute_season(&tx, season, &self.config.rating)?;

        tx.commit().context("Failed to commit season ratings")?;
        Ok(replay)
    }

    /// Current table for the season, computed without writing anything.
    pub fn standings(&self, season: u32) -> Result<SeasonReplay> {
        let conn = database::get_connection(&self.pool)?;
        let outcomes = database::challenges::confirmed_outcomes(&conn, season)?;
        Ok(rating::replay_season(season, &outcomes, &self.config.rating))
    }

    pub fn stored_ratings(&self, season: u32) -> Result<Vec<MatchRating>> {
        let conn = database::get_connection(&self.pool)?;
        database::ratings::list_by_season(&conn, season)
    }
}
