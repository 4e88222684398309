/// Errors reported back to a client as `lobby_error`.
///
/// Every rejected state-changing request maps to exactly one variant; its
/// display text is the `message` field the client receives.
use thiserror::Error;

use crate::server::coordinator::messages::ServerMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LobbyError {
    #[error("Lobby not found")]
    NotFound,
    #[error("Lobby is full")]
    Full,
    #[error("Lobby code is required")]
    MissingCode,
    #[error("You are not a member of this lobby")]
    NotAMember,
    #[error("Invalid ready value")]
    InvalidReady,
    #[error("Only players can ready up")]
    NotAPlayer,
    #[error("Missing face data fields")]
    MissingFaceData,
}

impl LobbyError {
    /// Wire message sent to the originating connection.
    pub fn to_message(self) -> ServerMessage {
        ServerMessage::error(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_client_expectations() {
        assert_eq!(LobbyError::NotFound.to_string(), "Lobby not found");
        assert_eq!(LobbyError::Full.to_string(), "Lobby is full");
    }

    #[test]
    fn serializes_as_lobby_error() {
        let json = serde_json::to_value(LobbyError::Full.to_message()).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "lobby_error", "message": "Lobby is full" }));
    }
}
