use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::rating::MatchRating;

/// Drops the season's stored ratings and writes the replayed ones.
pub fn replace_season(conn: &Connection, season: u32, ratings: &[MatchRating]) -> Result<()> {
    conn.execute("DELETE FROM match_ratings WHERE season = ?1", params![season])
        .context("Failed to clear season ratings")?;

    let sql = "INSERT INTO match_ratings (challenge_id, season, challenging_team_rating, challenged_team_rating, change) VALUES (?1, ?2, ?3, ?4, ?5)";
    let mut stmt = conn.prepare(sql)?;
    for rating in ratings {
        stmt.execute(params![
            rating.challenge_id,
            season,
            rating.challenging_team_rating,
            rating.challenged_team_rating,
            rating.change
        ])
        .with_context(|| format!("Failed to insert rating for challenge {}", rating.challenge_id))?;
    }
    Ok(())
}

fn parse_match_rating_row(row: &rusqlite::Row) -> rusqlite::Result<MatchRating> {
    Ok(MatchRating {
        challenge_id: row.get(0)?,
        season: row.get(1)?,
        challenging_team_id: row.get(2)?,
        challenged_team_id: row.get(3)?,
        challenging_team_rating: row.get(4)?,
        challenged_team_rating: row.get(5)?,
        change: row.get(6)?,
    })
}

/// Stored ratings of a season in replay order.
pub fn list_by_season(conn: &Connection, season: u32) -> Result<Vec<MatchRating>> {
    let sql = "SELECT r.challenge_id, r.season, c.challenging_team_id, c.challenged_team_id, r.challenging_team_rating, r.challenged_team_rating, r.change FROM match_ratings r JOIN challenges c ON c.id = r.challenge_id WHERE r.season = ?1 ORDER BY c.match_time, r.challenge_id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![season], parse_match_rating_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to load season ratings")?;

    Ok(rows)
}
