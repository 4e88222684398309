use serde::Serialize;

use crate::config::game::{ARCHER_HIT_SCORE, PISTOL_HIT_SCORE, SHOTGUN_HIT_SCORE};

/// Opaque per-socket identifier handed out at connect time.
pub type ConnectionId = String;

/// Six-letter uppercase lobby code.
pub type LobbyCode = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Spectator,
    Player,
}

/// Weapon picked by a player; decides how much a hit is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponClass {
    #[default]
    Pistol,
    Shotgun,
    Archer,
}

impl WeaponClass {
    pub fn hit_score(self) -> u32 {
        match self {
            WeaponClass::Pistol => PISTOL_HIT_SCORE,
            WeaponClass::Shotgun => SHOTGUN_HIT_SCORE,
            WeaponClass::Archer => ARCHER_HIT_SCORE,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pistol" => Some(WeaponClass::Pistol),
            "shotgun" => Some(WeaponClass::Shotgun),
            "archer" => Some(WeaponClass::Archer),
            _ => None,
        }
    }
}

/// One row of a `lobby_members` message.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    pub user_id: ConnectionId,
    pub username: Option<String>,
    pub is_host: bool,
    pub is_ready: bool,
    pub class: WeaponClass,
}

/// One row of a `lobby_list` message.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LobbySummary {
    pub code: LobbyCode,
    pub host: ConnectionId,
    pub name: String,
    pub player_count: usize,
    pub max_players: usize,
}

/// One row of the process-wide `lobby_status` broadcast.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub user_id: ConnectionId,
    pub username: String,
    pub role: Role,
    pub ready: bool,
    pub score: u32,
    pub class: WeaponClass,
}

/// One row of a `lobby_status` reply for a single lobby.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ScoreEntry {
    pub id: ConnectionId,
    pub name: Option<String>,
    pub score: u32,
}

/// Player list carried by `lobby_status`, either process-wide or per lobby.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum StatusPlayers {
    Roster(Vec<RosterEntry>),
    Scores(Vec<ScoreEntry>),
}
