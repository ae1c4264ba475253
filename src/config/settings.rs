use log::warn;

#[derive(Debug, Clone)]
pub struct RatingSettings {
    pub baseline_rating: f64,
    pub k_factor: f64,
    pub ratio_floor: f64,
    pub ratio_ceiling: f64,
    /// First season in which CTF capture margins are compressed before rating.
    pub ctf_compression_from_season: u32,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            baseline_rating: 1500.0,
            k_factor: 32.0,
            ratio_floor: 0.5,
            ratio_ceiling: 2.0,
            ctf_compression_from_season: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChallengeSettings {
    pub current_season: u32,
    pub home_maps_per_game_type: usize,
    pub min_team_size: u8,
    pub max_team_size: u8,
    pub clock_deadline_days: i64,
    pub clock_cooldown_days: i64,
    pub max_clocked_challenges: usize,
    pub max_schedule_ahead_days: i64,
}

impl Default for ChallengeSettings {
    fn default() -> Self {
        Self {
            current_season: 1,
            home_maps_per_game_type: 5,
            min_team_size: 2,
            max_team_size: 8,
            clock_deadline_days: 28,
            clock_cooldown_days: 28,
            max_clocked_challenges: 2,
            max_schedule_ahead_days: 28,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub database_path: String,
    pub admin_token: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            database_path: "ladder_challenges.db".to_string(),
            admin_token: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub rating: RatingSettings,
    pub challenge: ChallengeSettings,
    pub server: ServerSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `DATABASE_PATH`, `ADMIN_TOKEN`, `LADDER_SEASON`
    /// and `LADDER_K_FACTOR` when present.
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.server.database_path = path;
        }
        config.server.admin_token = std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());

        if let Some(season) = parse_env::<u32>("LADDER_SEASON") {
            config.challenge.current_season = season;
        }
        if let Some(k_factor) = parse_env::<f64>("LADDER_K_FACTOR") {
            config.rating.k_factor = k_factor;
        }

        config
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {key}={raw}: not a valid value");
            None
        }
    }
}
