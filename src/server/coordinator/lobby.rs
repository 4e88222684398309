//! Lobby directory.
//!
//! Owns every lobby and is the only writer of lobby membership. Connection
//! attributes that mirror membership (`lobby_code`, `is_host`, role, readiness)
//! are updated here too, through the registry passed in by the coordinator.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use rand::Rng;
use log::{debug, info};

use super::registry::{ConnectionRegistry, ProfileUpdate};
use super::types::{ConnectionId, LobbyCode, LobbySummary, MemberInfo, ScoreEntry, WeaponClass};
use crate::config::lobby::{
    BOOTSTRAP_LOBBY_NAME, CODE_GENERATION_ATTEMPTS, DEFAULT_MAX_PLAYERS, LOBBY_CODE_CHARS,
    LOBBY_CODE_LENGTH,
};
use crate::config::game::MIN_READY_PLAYERS;
use crate::server::coordinator::validation::clamp_max_players;
use crate::server::ws_error::LobbyError;

#[derive(Debug, Clone)]
pub struct Lobby {
    pub code: LobbyCode,
    pub host: ConnectionId,
    /// Members in join order; the first one inherits the host role.
    pub members: Vec<ConnectionId>,
    pub max_players: usize,
    pub name: String,
    /// Milliseconds since the Unix epoch, informational only.
    pub created_at: u64,
    seq: u64,
}

impl Lobby {
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_players
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m == id)
    }
}

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Newly added; `left` describes the lobby the connection had to leave first.
    Joined { left: Option<Departure> },
    /// Already a member, nothing changed.
    AlreadyMember,
}

/// What happened to a lobby after a connection left it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// The lobby became empty and was deleted.
    Deleted { code: LobbyCode },
    /// Members remain; `new_host` is set when the host role moved.
    Remaining { code: LobbyCode, new_host: Option<ConnectionId> },
}

#[derive(Debug, Default)]
pub struct LobbyDirectory {
    lobbies: HashMap<LobbyCode, Lobby>,
    next_seq: u64,
    bootstrapped: bool,
}

impl LobbyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: &str) -> Option<&Lobby> {
        self.lobbies.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.lobbies.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    /// Lobby codes in creation order.
    pub fn codes(&self) -> Vec<LobbyCode> {
        self.ordered().into_iter().map(|l| l.code.clone()).collect()
    }

    /// Members of a lobby, empty if it does not exist.
    pub fn members_of(&self, code: &str) -> Vec<ConnectionId> {
        self.lobbies.get(code).map(|l| l.members.clone()).unwrap_or_default()
    }

    fn ordered(&self) -> Vec<&Lobby> {
        let mut lobbies: Vec<&Lobby> = self.lobbies.values().collect();
        lobbies.sort_by_key(|l| l.seq);
        lobbies
    }

    /// Draw a code that no live lobby uses.
    fn generate_code(&self) -> LobbyCode {
        let mut rng = rand::rng();
        let mut draw = || -> LobbyCode {
            (0..LOBBY_CODE_LENGTH)
                .map(|_| LOBBY_CODE_CHARS[rng.random_range(0..LOBBY_CODE_CHARS.len())] as char)
                .collect()
        };
        for _ in 0..CODE_GENERATION_ATTEMPTS {
            let code = draw();
            if !self.lobbies.contains_key(&code) {
                return code;
            }
        }
        // 26^6 codes; only reachable with an absurd number of live lobbies.
        loop {
            let code = draw();
            if !self.lobbies.contains_key(&code) {
                return code;
            }
        }
    }

    /// Create the default lobby for the very first connection of the process.
    /// Returns `None` once a bootstrap lobby has already been created.
    pub fn bootstrap(&mut self, registry: &mut ConnectionRegistry, host: &str) -> Option<LobbyCode> {
        if self.bootstrapped {
            return None;
        }
        self.bootstrapped = true;
        let (code, _) = self.create_lobby(
            registry,
            host,
            DEFAULT_MAX_PLAYERS,
            BOOTSTRAP_LOBBY_NAME,
            WeaponClass::Pistol,
        );
        Some(code)
    }

    /// Create a lobby hosted by `host`, leaving any lobby the host was in.
    pub fn create_lobby(
        &mut self,
        registry: &mut ConnectionRegistry,
        host: &str,
        max_players: usize,
        name: &str,
        weapon_class: WeaponClass,
    ) -> (LobbyCode, Option<Departure>) {
        let left = self.leave(registry, host);
        let code = self.generate_code();
        let max_players = clamp_max_players(max_players);
        self.next_seq += 1;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        self.lobbies.insert(code.clone(), Lobby {
            code: code.clone(),
            host: host.to_string(),
            members: vec![host.to_string()],
            max_players,
            name: name.to_string(),
            created_at: now,
            seq: self.next_seq,
        });
        if let Some(connection) = registry.get_mut(host) {
            connection.enter_lobby(&code, true);
        }
        registry.set_profile(host, ProfileUpdate { weapon_class: Some(weapon_class), ..Default::default() });
        info!("[Lobby] Lobby created: code={}, host={}, maxPlayers={}, name={}", code, host, max_players, name);
        (code, left)
    }

    /// Add `id` to the lobby `code` (already normalized to uppercase).
    ///
    /// Nothing is mutated when the join is rejected.
    pub fn join_lobby(
        &mut self,
        registry: &mut ConnectionRegistry,
        id: &str,
        code: &str,
        weapon_class: WeaponClass,
    ) -> Result<JoinOutcome, LobbyError> {
        let lobby = self.lobbies.get(code).ok_or(LobbyError::NotFound)?;
        if lobby.contains(id) {
            debug!("[Lobby] {} is already in lobby {}", id, code);
            return Ok(JoinOutcome::AlreadyMember);
        }
        if lobby.is_full() {
            return Err(LobbyError::Full);
        }

        let left = self.leave(registry, id);
        if let Some(lobby) = self.lobbies.get_mut(code) {
            lobby.members.push(id.to_string());
        }
        if let Some(connection) = registry.get_mut(id) {
            connection.enter_lobby(code, false);
        }
        registry.set_profile(id, ProfileUpdate { weapon_class: Some(weapon_class), ..Default::default() });
        info!("[Lobby] {} joined lobby {} as {:?}", id, code, weapon_class);
        Ok(JoinOutcome::Joined { left })
    }

    /// Remove `id` from its lobby, deleting the lobby when it empties and
    /// handing the host role to the first remaining member otherwise.
    pub fn leave(&mut self, registry: &mut ConnectionRegistry, id: &str) -> Option<Departure> {
        let code = registry.get(id).and_then(|c| c.lobby_code.clone())?;
        if let Some(connection) = registry.get_mut(id) {
            connection.lobby_code = None;
            connection.is_host = false;
            connection.ready = false;
        }
        self.remove_member(registry, &code, id)
    }

    fn remove_member(&mut self, registry: &mut ConnectionRegistry, code: &str, id: &str) -> Option<Departure> {
        let lobby = self.lobbies.get_mut(code)?;
        lobby.members.retain(|m| m != id);

        if lobby.members.is_empty() {
            let created_at = lobby.created_at;
            self.lobbies.remove(code);
            info!("[Lobby] Deleted empty lobby {} (created_at={})", code, created_at);
            return Some(Departure::Deleted { code: code.to_string() });
        }

        let mut new_host = None;
        if lobby.host == id {
            let next = lobby.members[0].clone();
            lobby.host = next.clone();
            if let Some(connection) = registry.get_mut(&next) {
                connection.is_host = true;
            }
            info!("[Lobby] Assigned new host {} to lobby {}", next, code);
            new_host = Some(next);
        }
        Some(Departure::Remaining { code: code.to_string(), new_host })
    }

    /// Drop members without a display name from the lobby and the registry.
    /// Returns the removed identifiers and what became of the lobby.
    pub fn purge_unnamed(
        &mut self,
        registry: &mut ConnectionRegistry,
        code: &str,
    ) -> (Vec<ConnectionId>, Option<Departure>) {
        let unnamed: Vec<ConnectionId> = self.members_of(code)
            .into_iter()
            .filter(|id| !registry.get(id).is_some_and(|c| c.is_named()))
            .collect();

        let mut departure = None;
        for id in &unnamed {
            departure = self.remove_member(registry, code, id).or(departure);
            registry.unregister(id);
        }
        if !unnamed.is_empty() {
            info!("[Lobby] Purged {} unnamed member(s) from lobby {}", unnamed.len(), code);
        }
        (unnamed, departure)
    }

    /// True when the lobby has enough members and every one of them is ready.
    pub fn all_ready(&self, registry: &ConnectionRegistry, code: &str) -> bool {
        self.lobbies.get(code).is_some_and(|lobby| {
            lobby.members.len() >= MIN_READY_PLAYERS
                && lobby.members.iter().all(|id| registry.get(id).is_some_and(|c| c.ready))
        })
    }

    /// First lobby (creation order) containing any of the given connections.
    pub fn lobby_for(&self, ids: &[ConnectionId]) -> Option<LobbyCode> {
        self.ordered()
            .into_iter()
            .find(|lobby| lobby.members.iter().any(|m| ids.contains(m)))
            .map(|lobby| lobby.code.clone())
    }

    pub fn list(&self) -> Vec<LobbySummary> {
        self.ordered()
            .into_iter()
            .map(|lobby| LobbySummary {
                code: lobby.code.clone(),
                host: lobby.host.clone(),
                name: lobby.name.clone(),
                player_count: lobby.members.len(),
                max_players: lobby.max_players,
            })
            .collect()
    }

    pub fn member_info(&self, registry: &ConnectionRegistry, code: &str) -> Option<Vec<MemberInfo>> {
        let lobby = self.lobbies.get(code)?;
        Some(lobby.members
            .iter()
            .map(|id| {
                let connection = registry.get(id);
                MemberInfo {
                    user_id: id.clone(),
                    username: connection.and_then(|c| c.display_name.clone()),
                    is_host: &lobby.host == id,
                    is_ready: connection.is_some_and(|c| c.ready),
                    class: connection.map(|c| c.weapon_class).unwrap_or_default(),
                }
            })
            .collect())
    }

    pub fn scores(&self, registry: &ConnectionRegistry, code: &str) -> Option<Vec<ScoreEntry>> {
        let lobby = self.lobbies.get(code)?;
        Some(lobby.members
            .iter()
            .map(|id| {
                let connection = registry.get(id);
                ScoreEntry {
                    id: id.clone(),
                    name: connection.and_then(|c| c.display_name.clone()),
                    score: connection.map(|c| c.score).unwrap_or(0),
                }
            })
            .collect())
    }
}
