pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod rating;
pub mod services;

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use colored::Colorize;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::domain::Team;
use crate::services::recompute::RecomputeService;
use crate::services::server::ServerService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

fn open_pool(config: &AppConfig) -> Result<database::DbPool> {
    let pool = database::create_pool(&config.server.database_path)?;
    let conn = database::get_connection(&pool)?;
    database::initialize_database(&conn)?;
    Ok(pool)
}

pub fn handle_init() -> Result<()> {
    let config = AppConfig::from_env();
    open_pool(&config)?;
    log::info!("Database ready at {}", config.server.database_path);
    Ok(())
}

pub fn handle_import(file: &Path) -> Result<()> {
    let config = AppConfig::from_env();
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let teams: Vec<Team> = serde_json::from_str(&raw).context("Failed to parse teams JSON")?;

    let pool = open_pool(&config)?;
    let mut conn = database::get_connection(&pool)?;
    let tx = conn.transaction()?;
    for team in &teams {
        database::teams::upsert_team(&tx, team)?;
    }
    tx.commit()?;

    log::info!("Imported {} teams", teams.len());
    Ok(())
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::from_env();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_recompute(season: Option<u32>) -> Result<()> {
    let config = AppConfig::from_env();
    let season = season.unwrap_or(config.challenge.current_season);
    let pool = open_pool(&config)?;
    let replay = RecomputeService::new(pool, config).run(season)?;
    println!(
        "Season {}: {} rated matches, {} teams",
        season,
        replay.ratings.len(),
        replay.standings.len()
    );
    Ok(())
}

pub fn handle_standings(season: Option<u32>) -> Result<()> {
    let config = AppConfig::from_env();
    let season = season.unwrap_or(config.challenge.current_season);
    let baseline = config.rating.baseline_rating;
    let pool = open_pool(&config)?;

    let names: HashMap<_, _> = {
        let conn = database::get_connection(&pool)?;
        database::teams::list_all(&conn)?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect()
    };
    let replay = RecomputeService::new(pool, config).standings(season)?;

    println!("{}", format!("Season {season} standings").bold());
    println!(
        "{:>4}  {:<24} {:>8} {:>8} {:>4} {:>4} {:>4}",
        "#", "Team", "Rating", "+/-", "W", "L", "T"
    );
    for (i, standing) in replay.standings.iter().enumerate() {
        let name = names.get(&standing.team_id).map(String::as_str).unwrap_or("?");
        let delta = standing.rating - baseline;
        let delta_text = format!("{:+.0}", delta);
        let delta_text = if delta > 0.0 {
            delta_text.green()
        } else if delta < 0.0 {
            delta_text.red()
        } else {
            delta_text.normal()
        };
        println!(
            "{:>4}  {:<24} {:>8.0} {:>8} {:>4} {:>4} {:>4}",
            i + 1,
            name,
            standing.rating,
            delta_text,
            standing.wins,
            standing.losses,
            standing.ties
        );
    }
    Ok(())
}

pub fn handle_show(challenge_id: i64) -> Result<()> {
    let config = AppConfig::from_env();
    let pool = open_pool(&config)?;
    let conn = database::get_connection(&pool)?;
    let challenge = database::challenges::find_by_id(&conn, challenge_id)?
        .with_context(|| format!("Challenge {challenge_id} not found"))?;

    let response = api::models::ChallengeResponse::from(challenge);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
