//! Wire messages exchanged with clients.
//!
//! Both directions use a JSON object with a `type` discriminator. Outbound
//! messages are a serde-tagged enum; inbound envelopes are read field by field
//! through the validation policy so a malformed optional field never rejects
//! the whole message.

use actix::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::identity::IdentityMap;
use super::types::{ConnectionId, LobbyCode, LobbySummary, MemberInfo, Role, StatusPlayers, WeaponClass};
use super::validation;

// Message serveur -> client
#[derive(Message, Serialize, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Welcome {
        user_id: ConnectionId,
    },
    #[serde(rename_all = "camelCase")]
    LobbyCreated {
        code: LobbyCode,
        max_players: usize,
        name: String,
        class: WeaponClass,
    },
    #[serde(rename_all = "camelCase")]
    LobbyJoined {
        code: LobbyCode,
        lobby_name: String,
        is_host: bool,
        class: WeaponClass,
    },
    LobbyError {
        message: String,
    },
    LobbyList {
        lobbies: Vec<LobbySummary>,
    },
    LobbyMembers {
        code: LobbyCode,
        members: Vec<MemberInfo>,
    },
    LobbyStatus {
        players: StatusPlayers,
    },
    GameStartCountdown {
        countdown: u32,
    },
    #[serde(rename_all = "camelCase")]
    GameStart {
        message: String,
        player_identities: IdentityMap,
        lobby_code: Option<LobbyCode>,
    },
    GameEnd {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    PlayerIdentities {
        player_identities: IdentityMap,
        lobby_code: Option<LobbyCode>,
    },
    #[serde(rename_all = "camelCase")]
    PlayerIdentitiesUpdated {
        player_identities: IdentityMap,
        lobby_code: LobbyCode,
    },
}

impl ServerMessage {
    pub fn error(message: &str) -> Self {
        Self::LobbyError { message: message.to_string() }
    }

    /// Value of the `type` field, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::LobbyCreated { .. } => "lobby_created",
            Self::LobbyJoined { .. } => "lobby_joined",
            Self::LobbyError { .. } => "lobby_error",
            Self::LobbyList { .. } => "lobby_list",
            Self::LobbyMembers { .. } => "lobby_members",
            Self::LobbyStatus { .. } => "lobby_status",
            Self::GameStartCountdown { .. } => "game_start_countdown",
            Self::GameStart { .. } => "game_start",
            Self::GameEnd { .. } => "game_end",
            Self::PlayerIdentities { .. } => "player_identities",
            Self::PlayerIdentitiesUpdated { .. } => "player_identities_updated",
        }
    }
}

/// Envelope-level failures; the frame is logged and dropped.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("envelope is not a JSON object")]
    NotAnObject,
    #[error("envelope has no string `type`")]
    MissingType,
}

/// A validated client request.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    CreateLobby {
        max_players: usize,
        name: String,
        class: WeaponClass,
        username: Option<String>,
    },
    JoinLobby {
        code: Option<LobbyCode>,
        username: Option<String>,
        class: WeaponClass,
    },
    ShowLobbies,
    Join {
        role: Role,
        username: Option<String>,
    },
    Ready,
    Score {
        score: u32,
    },
    GetLobbyMembers {
        code: Option<LobbyCode>,
    },
    SetReady {
        code: Option<LobbyCode>,
        ready: Option<bool>,
    },
    SetName {
        username: Option<String>,
    },
    Hit,
    Miss,
    GetLobbyStatus {
        code: Option<LobbyCode>,
    },
    StoreFaceData {
        face_data: Option<Value>,
        lobby_code: Option<LobbyCode>,
        user_id: Option<ConnectionId>,
        detection_data: Option<Value>,
    },
    GetPlayerIdentities {
        lobby_code: Option<LobbyCode>,
    },
    Unknown {
        kind: String,
    },
}

impl ClientCommand {
    /// Parse a text frame into a command.
    pub fn parse(text: &str) -> Result<Self, EnvelopeError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(fields) = value else {
            return Err(EnvelopeError::NotAnObject);
        };
        let kind = fields
            .get("type")
            .and_then(Value::as_str)
            .ok_or(EnvelopeError::MissingType)?;
        Ok(Self::from_fields(kind, &fields))
    }

    fn from_fields(kind: &str, fields: &Map<String, Value>) -> Self {
        let field = |name: &str| fields.get(name);
        match kind {
            "create_lobby" => Self::CreateLobby {
                max_players: validation::max_players(field("maxPlayers")),
                name: validation::lobby_name(field("name")),
                class: validation::weapon_class(field("class")),
                username: validation::display_name(field("username")),
            },
            "join_lobby" => Self::JoinLobby {
                code: validation::lobby_code(field("code")),
                username: validation::display_name(field("username")),
                class: validation::weapon_class(field("class")),
            },
            "show_lobbies" => Self::ShowLobbies,
            "join" => Self::Join {
                role: validation::role(field("role")),
                username: validation::display_name(field("username")),
            },
            "ready" => Self::Ready,
            "score" => Self::Score { score: validation::score(field("score")) },
            "get_lobby_members" => Self::GetLobbyMembers {
                code: validation::lobby_code(field("code")),
            },
            "set_ready" => Self::SetReady {
                code: validation::lobby_code(field("code")),
                ready: validation::ready(field("ready")),
            },
            "set_name" => Self::SetName {
                username: validation::display_name(field("username")),
            },
            "hit" => Self::Hit,
            "miss" => Self::Miss,
            "get_lobby_status" => Self::GetLobbyStatus {
                code: validation::lobby_code(field("gameId")),
            },
            "store_face_data" => Self::StoreFaceData {
                face_data: validation::face_data(field("faceData")),
                lobby_code: validation::lobby_code(field("lobbyCode")),
                user_id: validation::connection_id(field("userId")),
                detection_data: validation::detection_data(field("detectionData")),
            },
            "get_player_identities" => Self::GetPlayerIdentities {
                lobby_code: validation::lobby_code(field("lobbyCode")),
            },
            other => Self::Unknown { kind: other.to_string() },
        }
    }
}
