use crate::config::settings::RatingSettings;
use crate::domain::GameType;

/// Challenging team's result against the challenged team, in `[0, 1]`.
pub fn actual_result(
    game_type: GameType,
    season: u32,
    challenging_score: i32,
    challenged_score: i32,
    config: &RatingSettings,
) -> f64 {
    match game_type {
        GameType::CaptureTheFlag if season >= config.ctf_compression_from_season => {
            capture_the_flag(challenging_score, challenged_score, config)
        }
        _ => team_anarchy(challenging_score, challenged_score, config),
    }
}

pub fn team_anarchy(a: i32, b: i32, config: &RatingSettings) -> f64 {
    if let Some(result) = forfeit_result(a, b) {
        return result;
    }
    log_ratio(a as f64, b as f64, config)
}

/// Same log-ratio as team anarchy, but the losing side's captures are first
/// averaged toward the winner's so blowouts swing ratings less.
pub fn capture_the_flag(a: i32, b: i32, config: &RatingSettings) -> f64 {
    if let Some(result) = forfeit_result(a, b) {
        return result;
    }
    let (mut a, mut b) = (a as f64, b as f64);
    if a > b {
        b = (a + b) / 2.0;
    } else if b > a {
        a = (a + b) / 2.0;
    }
    log_ratio(a, b, config)
}

/// Outcome when either score is zero or negative.
fn forfeit_result(a: i32, b: i32) -> Option<f64> {
    match (a <= 0, b <= 0) {
        (true, true) => Some(if a > b {
            1.0
        } else if b > a {
            0.0
        } else {
            0.5
        }),
        (true, false) => Some(0.0),
        (false, true) => Some(1.0),
        (false, false) => None,
    }
}

fn log_ratio(a: f64, b: f64, config: &RatingSettings) -> f64 {
    let ratio = (a / b).clamp(config.ratio_floor, config.ratio_ceiling);
    ((ratio.log2() + 1.0) / 2.0).clamp(0.0, 1.0)
}
