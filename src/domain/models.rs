use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type TeamId = i64;
pub type ChallengeId = i64;
pub type PlayerId = i64;

/// Game mode played in a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameType {
    TeamAnarchy,
    CaptureTheFlag,
    /// Only an administrator can put a challenge on this mode.
    Special,
}

impl GameType {
    /// Modes a team can suggest and must keep a home-map list for.
    pub const SELECTABLE: [GameType; 2] = [GameType::TeamAnarchy, GameType::CaptureTheFlag];

    pub fn is_selectable(self) -> bool {
        Self::SELECTABLE.contains(&self)
    }

    /// The home-map list that governs map selection for this mode.
    pub fn home_map_list(self) -> GameType {
        match self {
            GameType::CaptureTheFlag => GameType::CaptureTheFlag,
            GameType::TeamAnarchy | GameType::Special => GameType::TeamAnarchy,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            GameType::TeamAnarchy => "TA",
            GameType::CaptureTheFlag => "CTF",
            GameType::Special => "SP",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "TA" => Some(GameType::TeamAnarchy),
            "CTF" => Some(GameType::CaptureTheFlag),
            "SP" => Some(GameType::Special),
            _ => None,
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameType::TeamAnarchy => "Team Anarchy",
            GameType::CaptureTheFlag => "Capture the Flag",
            GameType::Special => "Special",
        };
        f.write_str(name)
    }
}

/// The four attributes negotiated between the two teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    GameType,
    TeamSize,
    Map,
    MatchTime,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::GameType => "game type",
            Field::TeamSize => "team size",
            Field::Map => "map",
            Field::MatchTime => "match time",
        };
        f.write_str(name)
    }
}

/// Who is invoking an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "teamId", rename_all = "camelCase")]
pub enum Actor {
    Team(TeamId),
    Admin,
}

/// Team data the challenge engine needs from the roster system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub tag: String,
    pub roster_size: usize,
    #[serde(default)]
    pub penalized: bool,
    #[serde(default)]
    pub tournament_locked: bool,
    #[serde(default)]
    pub home_maps: HashMap<GameType, Vec<String>>,
}

impl Team {
    pub fn home_maps(&self, game_type: GameType) -> &[String] {
        self.home_maps
            .get(&game_type.home_map_list())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_home_map(&self, game_type: GameType, map: &str) -> bool {
        self.home_maps(game_type)
            .iter()
            .any(|home| home.eq_ignore_ascii_case(map))
    }

    /// First selectable game type whose home-map list is not exactly `required` long.
    pub fn missing_home_maps(&self, required: usize) -> Option<GameType> {
        GameType::SELECTABLE
            .into_iter()
            .find(|&game_type| self.home_maps(game_type).len() != required)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapKind {
    Home,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSelection {
    pub name: String,
    pub kind: MapKind,
}

impl MapSelection {
    pub fn home(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MapKind::Home,
        }
    }

    pub fn neutral(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MapKind::Neutral,
        }
    }
}

/// Per-player stat row, keyed by (challenge, team, player)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatLine {
    pub team_id: TeamId,
    pub player_id: PlayerId,
    pub kills: u32,
    pub assists: u32,
    pub deaths: u32,
    // CTF only
    pub captures: u32,
    pub pickups: u32,
    pub carrier_kills: u32,
    pub returns: u32,
    pub damage: Option<f64>,
}

impl StatLine {
    /// Points this line contributes to its team's score in the given mode.
    pub fn score_contribution(&self, game_type: GameType) -> i64 {
        match game_type {
            GameType::CaptureTheFlag => i64::from(self.captures),
            GameType::TeamAnarchy | GameType::Special => i64::from(self.kills),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team_with_maps() -> Team {
        let mut home_maps = HashMap::new();
        home_maps.insert(
            GameType::TeamAnarchy,
            vec!["Vault".into(), "Foundry".into(), "Backbone".into(), "Sedna".into(), "Roundabout".into()],
        );
        Team {
            id: 1,
            name: "Pilots".into(),
            tag: "PLT".into(),
            roster_size: 4,
            penalized: false,
            tournament_locked: false,
            home_maps,
        }
    }

    #[test]
    fn game_type_codes_round_trip() {
        for game_type in [GameType::TeamAnarchy, GameType::CaptureTheFlag, GameType::Special] {
            assert_eq!(GameType::from_code(game_type.code()), Some(game_type));
        }
        assert_eq!(GameType::from_code("ctf"), Some(GameType::CaptureTheFlag));
        assert_eq!(GameType::from_code("mb"), None);
    }

    #[test]
    fn special_mode_uses_team_anarchy_home_maps() {
        let team = team_with_maps();
        assert_eq!(team.home_maps(GameType::Special).len(), 5);
        assert!(team.is_home_map(GameType::Special, "vault"));
    }

    #[test]
    fn missing_home_maps_reports_first_incomplete_mode() {
        let team = team_with_maps();
        assert_eq!(team.missing_home_maps(5), Some(GameType::CaptureTheFlag));
    }

    #[test]
    fn actor_serializes_with_role_tag() {
        let json = serde_json::to_string(&Actor::Team(7)).unwrap();
        assert_eq!(json, r#"{"role":"team","teamId":7}"#);
        let admin: Actor = serde_json::from_str(r#"{"role":"admin"}"#).unwrap();
        assert_eq!(admin, Actor::Admin);
    }
}
