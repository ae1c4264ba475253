use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::domain::{ChallengeId, StatLine};

pub fn replace_for_challenge(
    conn: &Connection,
    challenge_id: ChallengeId,
    stats: &[StatLine],
) -> Result<()> {
    conn.execute("DELETE FROM stats WHERE challenge_id = ?1", params![challenge_id])
        .context("Failed to clear stats")?;

    let sql = "INSERT INTO stats (challenge_id, team_id, player_id, kills, assists, deaths, captures, pickups, carrier_kills, returns, damage) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";
    let mut stmt = conn.prepare(sql)?;
    for line in stats {
        stmt.execute(params![
            challenge_id,
            line.team_id,
            line.player_id,
            line.kills,
            line.assists,
            line.deaths,
            line.captures,
            line.pickups,
            line.carrier_kills,
            line.returns,
            line.damage
        ])
        .with_context(|| {
            format!(
                "Failed to insert stats for player {} in challenge {challenge_id}",
                line.player_id
            )
        })?;
    }
    Ok(())
}

fn parse_stat_row(row: &rusqlite::Row) -> rusqlite::Result<StatLine> {
    Ok(StatLine {
        team_id: row.get(0)?,
        player_id: row.get(1)?,
        kills: row.get(2)?,
        assists: row.get(3)?,
        deaths: row.get(4)?,
        captures: row.get(5)?,
        pickups: row.get(6)?,
        carrier_kills: row.get(7)?,
        returns: row.get(8)?,
        damage: row.get(9)?,
    })
}

pub fn list_for_challenge(conn: &Connection, challenge_id: ChallengeId) -> Result<Vec<StatLine>> {
    let sql = "SELECT team_id, player_id, kills, assists, deaths, captures, pickups, carrier_kills, returns, damage FROM stats WHERE challenge_id = ?1 ORDER BY rowid";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![challenge_id], parse_stat_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to load stats")?;

    Ok(rows)
}
