//! Per-command handling for the coordinator.
//!
//! Each inbound `ClientCommand` is routed to one method here. Rejections of
//! state-changing requests go back to the sender as `lobby_error`; read-only
//! requests with nothing to report are answered with an empty payload.

use actix::prelude::*;
use log::{debug, info, warn};
use serde_json::Value;

use super::identity::IdentityRecord;
use super::lobby::JoinOutcome;
use super::messages::{ClientCommand, ServerMessage};
use super::registry::ProfileUpdate;
use super::server::CoordinatorServer;
use super::types::{ConnectionId, LobbyCode, Role, StatusPlayers, WeaponClass};
use crate::server::ws_error::LobbyError;

impl CoordinatorServer {
    pub(super) fn dispatch(&mut self, id: &str, command: ClientCommand, ctx: &mut Context<Self>) {
        match command {
            ClientCommand::CreateLobby { max_players, name, class, username } => {
                self.handle_create_lobby(id, max_players, name, class, username)
            }
            ClientCommand::JoinLobby { code, username, class } => {
                self.handle_join_lobby(id, code, username, class, ctx)
            }
            ClientCommand::ShowLobbies => self.show_lobbies(),
            ClientCommand::Join { role, username } => self.handle_join(id, role, username),
            ClientCommand::Ready => self.handle_ready(id, ctx),
            ClientCommand::Score { score } => self.handle_score(id, score),
            ClientCommand::GetLobbyMembers { code } => self.handle_get_lobby_members(id, code),
            ClientCommand::SetReady { code, ready } => self.handle_set_ready(id, code, ready, ctx),
            ClientCommand::SetName { username } => self.handle_set_name(id, username),
            ClientCommand::Hit => self.handle_hit(id),
            ClientCommand::Miss => debug!("[Coordinator] Miss from {}", id),
            ClientCommand::GetLobbyStatus { code } => self.handle_get_lobby_status(id, code),
            ClientCommand::StoreFaceData { face_data, lobby_code, user_id, detection_data } => {
                self.handle_store_face_data(id, face_data, lobby_code, user_id, detection_data)
            }
            ClientCommand::GetPlayerIdentities { lobby_code } => {
                self.handle_get_player_identities(id, lobby_code)
            }
            ClientCommand::Unknown { kind } => {
                warn!("[Coordinator] Unknown message type '{}' from {}", kind, id)
            }
        }
    }

    fn reject(&self, id: &str, error: LobbyError) {
        debug!("[Coordinator] Rejecting request from {}: {}", id, error);
        self.broadcaster.send_to(id, error.to_message());
    }

    fn rename(&mut self, id: &str, username: Option<String>) {
        if username.is_some() {
            self.registry.set_profile(id, ProfileUpdate {
                display_name: username,
                ..Default::default()
            });
        }
    }

    /// Explicit code, or the lobby the connection is currently in.
    fn resolve_code(&self, id: &str, code: Option<LobbyCode>) -> Option<LobbyCode> {
        code.or_else(|| self.registry.get(id).and_then(|c| c.lobby_code.clone()))
    }

    fn handle_create_lobby(
        &mut self,
        id: &str,
        max_players: usize,
        name: String,
        class: WeaponClass,
        username: Option<String>,
    ) {
        self.rename(id, username);
        let (code, left) = self.lobbies.create_lobby(&mut self.registry, id, max_players, &name, class);
        if let Some(departure) = left {
            self.apply_departure(departure);
        }
        let max_players = self.lobbies.get(&code).map_or(max_players, |l| l.max_players);
        self.broadcaster.send_to(id, ServerMessage::LobbyCreated {
            code,
            max_players,
            name,
            class,
        });
        self.show_lobbies();
    }

    fn handle_join_lobby(
        &mut self,
        id: &str,
        code: Option<LobbyCode>,
        username: Option<String>,
        class: WeaponClass,
        ctx: &mut Context<Self>,
    ) {
        self.rename(id, username);
        let Some(code) = code else {
            return self.reject(id, LobbyError::MissingCode);
        };

        let outcome = match self.lobbies.join_lobby(&mut self.registry, id, &code, class) {
            Ok(outcome) => outcome,
            Err(error) => return self.reject(id, error),
        };
        if let JoinOutcome::Joined { left } = outcome {
            if let Some(departure) = left {
                self.apply_departure(departure);
            }
            self.send_lobby_members(&code);
            self.schedule_members_rebroadcast(code.clone(), ctx);
        }

        if let (Some(lobby), Some(connection)) = (self.lobbies.get(&code), self.registry.get(id)) {
            self.broadcaster.send_to(id, ServerMessage::LobbyJoined {
                code: code.clone(),
                lobby_name: lobby.name.clone(),
                is_host: connection.is_host,
                class: connection.weapon_class,
            });
        }
        self.schedule_lobby_list(ctx);
    }

    fn handle_join(&mut self, id: &str, role: Role, username: Option<String>) {
        if role == Role::Spectator {
            if let Some(departure) = self.lobbies.leave(&mut self.registry, id) {
                self.apply_departure(departure);
            }
        }
        self.registry.set_profile(id, ProfileUpdate {
            display_name: username,
            role: Some(role),
            ..Default::default()
        });
        if let Some(connection) = self.registry.get_mut(id) {
            connection.ready = false;
            connection.score = 0;
        }
        info!("[Coordinator] {} joined as {:?}", id, role);
        self.update_lobby_status();
    }

    fn handle_ready(&mut self, id: &str, ctx: &mut Context<Self>) {
        let Some(connection) = self.registry.get_mut(id) else {
            return;
        };
        if connection.role != Role::Player {
            return self.reject(id, LobbyError::NotAPlayer);
        }
        connection.ready = true;
        let lobby = connection.lobby_code.clone();
        self.update_lobby_status();
        if let Some(code) = &lobby {
            self.send_lobby_members(code);
        }
        self.try_start_match(lobby, ctx);
    }

    fn handle_score(&mut self, id: &str, score: u32) {
        match self.registry.get_mut(id) {
            Some(connection) if connection.role == Role::Player => connection.score = score,
            _ => {
                debug!("[Coordinator] Ignoring score from non-player {}", id);
                return;
            }
        }
        self.update_lobby_status();
    }

    fn handle_get_lobby_members(&self, id: &str, code: Option<LobbyCode>) {
        let Some(code) = self.resolve_code(id, code) else {
            return self.reject(id, LobbyError::MissingCode);
        };
        match self.lobbies.member_info(&self.registry, &code) {
            Some(members) => self.broadcaster.send_to(id, ServerMessage::LobbyMembers { code, members }),
            None => self.reject(id, LobbyError::NotFound),
        }
    }

    fn handle_set_ready(
        &mut self,
        id: &str,
        code: Option<LobbyCode>,
        ready: Option<bool>,
        ctx: &mut Context<Self>,
    ) {
        let Some(code) = self.resolve_code(id, code) else {
            return self.reject(id, LobbyError::MissingCode);
        };
        let Some(lobby) = self.lobbies.get(&code) else {
            return self.reject(id, LobbyError::NotFound);
        };
        let Some(ready) = ready else {
            return self.reject(id, LobbyError::InvalidReady);
        };
        if !lobby.contains(id) {
            return self.reject(id, LobbyError::NotAMember);
        }

        if let Some(connection) = self.registry.get_mut(id) {
            connection.ready = ready;
        }
        info!("[Lobby] {} set ready={} in lobby {}", id, ready, code);
        self.send_lobby_members(&code);
        self.maybe_begin_countdown(&code, ctx);
    }

    fn handle_set_name(&mut self, id: &str, username: Option<String>) {
        if username.is_none() {
            debug!("[Coordinator] Ignoring blank name from {}", id);
            return;
        }
        self.rename(id, username);
        if let Some(code) = self.registry.get(id).and_then(|c| c.lobby_code.clone()) {
            self.send_lobby_members(&code);
        }
        self.update_lobby_status();
    }

    fn handle_hit(&mut self, id: &str) {
        if let Some(score) = self.registry.record_hit(id) {
            debug!("[Coordinator] Hit from {}, score now {}", id, score);
            self.update_lobby_status();
        }
    }

    fn handle_get_lobby_status(&self, id: &str, code: Option<LobbyCode>) {
        let players = self
            .resolve_code(id, code)
            .and_then(|code| self.lobbies.scores(&self.registry, &code))
            .unwrap_or_default();
        self.broadcaster.send_to(id, ServerMessage::LobbyStatus {
            players: StatusPlayers::Scores(players),
        });
    }

    fn handle_store_face_data(
        &mut self,
        id: &str,
        face_data: Option<Value>,
        lobby_code: Option<LobbyCode>,
        user_id: Option<ConnectionId>,
        detection_data: Option<Value>,
    ) {
        let (Some(face_data), Some(code), Some(user_id)) = (face_data, lobby_code, user_id) else {
            return self.reject(id, LobbyError::MissingFaceData);
        };
        if !self.lobbies.contains(&code) {
            return self.reject(id, LobbyError::NotFound);
        }

        let username = self.registry.get(&user_id).and_then(|c| c.display_name.clone());
        let record = IdentityRecord::new(face_data, username.as_deref(), detection_data);
        self.identities.store(&code, &user_id, record);
        info!("[Identity] Stored identity for {} in lobby {}", user_id, code);

        let player_identities = self.identity_snapshot(&code);
        self.broadcast_to_lobby(&code, ServerMessage::PlayerIdentitiesUpdated {
            player_identities,
            lobby_code: code.clone(),
        });
    }

    fn handle_get_player_identities(&self, id: &str, lobby_code: Option<LobbyCode>) {
        let code = self.resolve_code(id, lobby_code);
        let player_identities = code
            .as_deref()
            .map(|code| self.identity_snapshot(code))
            .unwrap_or_default();
        self.broadcaster.send_to(id, ServerMessage::PlayerIdentities {
            player_identities,
            lobby_code: code,
        });
    }
}
