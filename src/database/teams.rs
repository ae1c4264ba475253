use std::collections::HashMap;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::{GameType, Team, TeamId};

/// Inserts or replaces a team together with its home-map lists.
pub fn upsert_team(conn: &Connection, team: &Team) -> Result<()> {
    let sql = "INSERT INTO teams (id, name, tag, roster_size, penalized, tournament_locked) VALUES (?1, ?2, ?3, ?4, ?5, ?6) ON CONFLICT(id) DO UPDATE SET name = excluded.name, tag = excluded.tag, roster_size = excluded.roster_size, penalized = excluded.penalized, tournament_locked = excluded.tournament_locked";

    conn.execute(
        sql,
        params![
            team.id,
            team.name,
            team.tag,
            team.roster_size as i64,
            team.penalized,
            team.tournament_locked
        ],
    )
    .with_context(|| format!("Failed to upsert team {}", team.id))?;

    replace_home_maps(conn, team)
}

fn replace_home_maps(conn: &Connection, team: &Team) -> Result<()> {
    conn.execute("DELETE FROM home_maps WHERE team_id = ?1", params![team.id])
        .context("Failed to clear home maps")?;

    let mut stmt = conn.prepare(
        "INSERT INTO home_maps (team_id, game_type, slot, map) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (game_type, maps) in &team.home_maps {
        for (slot, map) in maps.iter().enumerate() {
            stmt.execute(params![team.id, game_type.code(), slot as i64, map])
                .with_context(|| format!("Failed to insert home map {map} for team {}", team.id))?;
        }
    }
    Ok(())
}

fn parse_team_row(row: &rusqlite::Row) -> rusqlite::Result<Team> {
    let roster_size: i64 = row.get(3)?;
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        tag: row.get(2)?,
        roster_size: roster_size.max(0) as usize,
        penalized: row.get(4)?,
        tournament_locked: row.get(5)?,
        home_maps: HashMap::new(),
    })
}

fn load_home_maps(conn: &Connection, team: &mut Team) -> Result<()> {
    let sql = "SELECT game_type, map FROM home_maps WHERE team_id = ?1 ORDER BY game_type, slot";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![team.id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for (code, map) in rows {
        let Some(game_type) = GameType::from_code(&code) else {
            log::warn!("Skipping home map {map} of team {} with unknown game type {code}", team.id);
            continue;
        };
        team.home_maps.entry(game_type).or_default().push(map);
    }
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: TeamId) -> Result<Option<Team>> {
    let sql = "SELECT id, name, tag, roster_size, penalized, tournament_locked FROM teams WHERE id = ?1";

    let team = conn
        .query_row(sql, params![id], parse_team_row)
        .optional()
        .context("Failed to query team by id")?;

    match team {
        Some(mut team) => {
            load_home_maps(conn, &mut team)?;
            Ok(Some(team))
        }
        None => Ok(None),
    }
}

pub fn list_all(conn: &Connection) -> Result<Vec<Team>> {
    let sql = "SELECT id, name, tag, roster_size, penalized, tournament_locked FROM teams ORDER BY name";

    let mut stmt = conn.prepare(sql)?;
    let mut teams = stmt
        .query_map([], parse_team_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for team in &mut teams {
        load_home_maps(conn, team)?;
    }
    Ok(teams)
}

/// Returns false when no such team exists.
pub fn set_penalized(conn: &Connection, id: TeamId, penalized: bool) -> Result<bool> {
    let changed = conn
        .execute(
            "UPDATE teams SET penalized = ?1 WHERE id = ?2",
            params![penalized, id],
        )
        .context("Failed to update team penalty")?;
    Ok(changed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup::initialize_database;

    fn team() -> Team {
        let mut home_maps = HashMap::new();
        home_maps.insert(
            GameType::TeamAnarchy,
            vec!["Vault".to_string(), "Foundry".to_string(), "Sedna".to_string()],
        );
        Team {
            id: 4,
            name: "Night Owls".into(),
            tag: "OWL".into(),
            roster_size: 6,
            penalized: false,
            tournament_locked: false,
            home_maps,
        }
    }

    #[test]
    fn team_round_trips_with_ordered_home_maps() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_database(&conn).unwrap();
        upsert_team(&conn, &team()).unwrap();

        let loaded = find_by_id(&conn, 4).unwrap().unwrap();
        assert_eq!(loaded.name, "Night Owls");
        assert_eq!(loaded.roster_size, 6);
        assert_eq!(loaded.home_maps(GameType::TeamAnarchy), ["Vault", "Foundry", "Sedna"]);
        assert!(loaded.home_maps(GameType::CaptureTheFlag).is_empty());
    }

    #[test]
    fn upsert_replaces_home_maps() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_database(&conn).unwrap();
        let mut team = team();
        upsert_team(&conn, &team).unwrap();

        team.home_maps.insert(GameType::TeamAnarchy, vec!["Hangar".to_string()]);
        upsert_team(&conn, &team).unwrap();

        let loaded = find_by_id(&conn, 4).unwrap().unwrap();
        assert_eq!(loaded.home_maps(GameType::TeamAnarchy), ["Hangar"]);
        assert_eq!(list_all(&conn).unwrap().len(), 1);
    }

    #[test]
    fn penalty_flag_updates() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_database(&conn).unwrap();
        upsert_team(&conn, &team()).unwrap();

        assert!(set_penalized(&conn, 4, true).unwrap());
        assert!(find_by_id(&conn, 4).unwrap().unwrap().penalized);
        assert!(!set_penalized(&conn, 99, true).unwrap());
    }
}
