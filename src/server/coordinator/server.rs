/// Coordinator actor.
///
/// Single owner of the connection registry, lobby directory, identity store,
/// match state and broadcast fan-out. Sessions talk to it only through actor
/// messages, so every mutation runs to completion before the next one starts.
/// Deferred broadcasts are scheduled with `run_later` and re-check that their
/// lobby still exists when they fire.

use actix::prelude::*;
use log::{debug, info};

use super::broadcast::Broadcaster;
use super::identity::{IdentityMap, IdentityStore};
use super::lobby::{Departure, LobbyDirectory};
use super::match_state::{MatchPhase, MatchState};
use super::messages::{ClientCommand, ServerMessage};
use super::registry::{ConnectionRegistry, ProfileUpdate};
use super::types::{ConnectionId, LobbyCode, StatusPlayers};
use crate::config::game::{
    COUNTDOWN_STEPS, GAME_END_MESSAGE, GAME_START_MESSAGE, MIN_READY_PLAYERS, MatchTimings,
};

/// Main coordinator actor.
pub struct CoordinatorServer {
    pub(super) registry: ConnectionRegistry,
    pub(super) lobbies: LobbyDirectory,
    pub(super) identities: IdentityStore,
    pub(super) match_state: MatchState,
    pub(super) broadcaster: Broadcaster,
    pub(super) timings: MatchTimings,
}

impl CoordinatorServer {
    /// Create a coordinator with the given delays.
    pub fn new(timings: MatchTimings) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            lobbies: LobbyDirectory::new(),
            identities: IdentityStore::new(),
            match_state: MatchState::new(),
            broadcaster: Broadcaster::new(),
            timings,
        }
    }

    /// Broadcast the lobby list to every connection.
    pub(super) fn show_lobbies(&self) {
        self.broadcaster.broadcast_all(ServerMessage::LobbyList {
            lobbies: self.lobbies.list(),
        });
    }

    /// Broadcast the named-player roster to every connection.
    pub(super) fn update_lobby_status(&self) {
        self.broadcaster.broadcast_all(ServerMessage::LobbyStatus {
            players: StatusPlayers::Roster(self.registry.roster()),
        });
    }

    /// Send a message to every member of a lobby. Unknown lobbies are ignored.
    pub(super) fn broadcast_to_lobby(&self, code: &str, msg: ServerMessage) {
        if let Some(lobby) = self.lobbies.get(code) {
            self.broadcaster.send_to_many(&lobby.members, msg);
        }
    }

    pub(super) fn send_lobby_members(&self, code: &str) {
        if let Some(members) = self.lobbies.member_info(&self.registry, code) {
            self.broadcast_to_lobby(code, ServerMessage::LobbyMembers {
                code: code.to_string(),
                members,
            });
        }
    }

    pub(super) fn identity_snapshot(&self, code: &str) -> IdentityMap {
        let members = self.lobbies.members_of(code);
        self.identities.snapshot(code, &members, &self.registry)
    }

    /// Second roster broadcast after a join, for clients that were still
    /// processing the join confirmation.
    pub(super) fn schedule_members_rebroadcast(&self, code: LobbyCode, ctx: &mut Context<Self>) {
        ctx.run_later(self.timings.join_rebroadcast_delay, move |act, _| {
            if act.lobbies.contains(&code) {
                act.send_lobby_members(&code);
            }
        });
    }

    pub(super) fn schedule_lobby_list(&self, ctx: &mut Context<Self>) {
        ctx.run_later(self.timings.lobby_list_delay, |act, _| act.show_lobbies());
    }

    /// Follow-up after a connection left a lobby.
    pub(super) fn apply_departure(&mut self, departure: Departure) {
        match departure {
            Departure::Deleted { code } => {
                if self.identities.has_lobby(&code) {
                    debug!("[Identity] Dropping identities of deleted lobby {}", code);
                }
                self.identities.forget_lobby(&code);
                if self.match_state.cancel_countdown(&code) {
                    debug!("[Match] Dropped pending countdown of deleted lobby {}", code);
                }
            }
            Departure::Remaining { code, .. } => self.send_lobby_members(&code),
        }
    }

    /// Start the countdown for `code` once every member is ready.
    pub(super) fn maybe_begin_countdown(&mut self, code: &str, ctx: &mut Context<Self>) {
        if self.match_state.is_running() || !self.lobbies.all_ready(&self.registry, code) {
            return;
        }

        let (purged, departure) = self.lobbies.purge_unnamed(&mut self.registry, code);
        for id in &purged {
            self.broadcaster.unregister(id);
        }
        if let Some(departure) = departure {
            self.apply_departure(departure);
        }
        if !self.lobbies.all_ready(&self.registry, code) {
            debug!("[Match] Lobby {} no longer ready after purge", code);
            return;
        }
        let Some(ticket) = self.match_state.begin_countdown(code) else {
            return;
        };

        info!("[Match] All players ready in lobby {}, starting countdown", code);
        self.broadcast_to_lobby(code, ServerMessage::GameStartCountdown { countdown: COUNTDOWN_STEPS });

        let code = code.to_string();
        ctx.run_later(self.timings.countdown_duration(), move |act, ctx| {
            if !act.match_state.end_countdown(&code, ticket) {
                // Lobby was deleted while counting down.
                return;
            }
            let started = act.lobbies.contains(&code) && act.try_start_match(Some(code.clone()), ctx);
            if !started {
                debug!("[Match] Countdown for lobby {} ended without a start", code);
            }
        });
    }

    /// Start the match if none is running and at least two players are ready.
    /// Returns `true` only when this call started it.
    pub(super) fn try_start_match(&mut self, hint: Option<LobbyCode>, ctx: &mut Context<Self>) -> bool {
        if self.match_state.is_running() {
            debug!("[Match] Start requested while a match is running");
            return false;
        }
        let ready = self.registry.ready_players();
        if ready.len() < MIN_READY_PLAYERS {
            return false;
        }

        let lobby = hint
            .filter(|code| {
                self.lobbies
                    .get(code)
                    .is_some_and(|l| l.members.iter().any(|m| ready.contains(m)))
            })
            .or_else(|| self.lobbies.lobby_for(&ready));
        self.match_state.start(lobby.clone());

        match &lobby {
            Some(code) => {
                let player_identities = self.identity_snapshot(code);
                info!("[Match] Game starting in lobby {} with {} identities", code, player_identities.len());
                self.broadcast_to_lobby(code, ServerMessage::GameStart {
                    message: GAME_START_MESSAGE.to_string(),
                    player_identities,
                    lobby_code: Some(code.clone()),
                });
            }
            None => {
                info!("[Match] Game starting without a lobby, broadcasting to everyone");
                self.broadcaster.broadcast_all(ServerMessage::GameStart {
                    message: GAME_START_MESSAGE.to_string(),
                    player_identities: IdentityMap::new(),
                    lobby_code: None,
                });
            }
        }

        let handle = ctx.run_later(self.timings.match_duration, |act, ctx| act.end_match(ctx));
        self.match_state.arm_end_timer(handle);
        true
    }

    /// End the running match, if any.
    pub(super) fn end_match(&mut self, ctx: &mut Context<Self>) {
        let elapsed = match self.match_state.phase() {
            MatchPhase::Running { started_at, .. } => started_at.elapsed(),
            _ => return,
        };
        if let Some(Some(handle)) = self.match_state.finish() {
            ctx.cancel_future(handle);
        }
        info!("[Match] Game ended after {:?}", elapsed);
        for code in self.lobbies.codes() {
            self.broadcast_to_lobby(&code, ServerMessage::GameEnd {
                message: GAME_END_MESSAGE.to_string(),
            });
        }
        ctx.run_later(self.timings.post_end_refresh_delay, |act, _| act.update_lobby_status());
    }
}

impl Actor for CoordinatorServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("[Coordinator] Started");
    }
}

/// Message: a WebSocket session opened.
#[derive(Message)]
#[rtype(result = "ConnectionId")]
pub struct Connect {
    pub addr: Recipient<ServerMessage>,
    /// Display name supplied on the connect URL, if any.
    pub username: Option<String>,
}

/// Message: a WebSocket session closed or failed.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: ConnectionId,
}

/// Message: a parsed client request.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ClientRequest {
    pub id: ConnectionId,
    pub command: ClientCommand,
}

/// Message: end the running match now.
#[derive(Message)]
#[rtype(result = "()")]
pub struct EndMatch;

impl Handler<Connect> for CoordinatorServer {
    type Result = MessageResult<Connect>;

    fn handle(&mut self, msg: Connect, _ctx: &mut Self::Context) -> Self::Result {
        let id = self.registry.register();
        if msg.username.is_some() {
            self.registry.set_profile(&id, ProfileUpdate {
                display_name: msg.username,
                ..Default::default()
            });
        }
        self.broadcaster.register(id.clone(), msg.addr);
        info!("[Coordinator] Client {} connected ({} online)", id, self.registry.len());

        self.broadcaster.send_to(&id, ServerMessage::Welcome { user_id: id.clone() });
        if let Some(code) = self.lobbies.bootstrap(&mut self.registry, &id) {
            info!("[Coordinator] Bootstrap lobby {} created for {}", code, id);
            self.show_lobbies();
        }
        MessageResult(id)
    }
}

impl Handler<Disconnect> for CoordinatorServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _ctx: &mut Self::Context) -> Self::Result {
        self.broadcaster.unregister(&msg.id);
        if !self.registry.contains(&msg.id) {
            return;
        }
        let departure = self.lobbies.leave(&mut self.registry, &msg.id);
        if let Some(connection) = self.registry.unregister(&msg.id) {
            info!(
                "[Coordinator] Client {} disconnected after {:?} ({} online, {} lobbies)",
                msg.id,
                connection.connected_at.elapsed(),
                self.registry.len(),
                self.lobbies.len()
            );
        }
        if let Some(departure) = departure {
            self.apply_departure(departure);
        }
        self.update_lobby_status();
    }
}

impl Handler<ClientRequest> for CoordinatorServer {
    type Result = ();

    fn handle(&mut self, msg: ClientRequest, ctx: &mut Self::Context) -> Self::Result {
        if !self.registry.contains(&msg.id) {
            debug!("[Coordinator] Dropping request from unknown connection {}", msg.id);
            return;
        }
        self.dispatch(&msg.id, msg.command, ctx);
    }
}

impl Handler<EndMatch> for CoordinatorServer {
    type Result = ();

    fn handle(&mut self, _msg: EndMatch, ctx: &mut Self::Context) -> Self::Result {
        self.end_match(ctx);
    }
}
