//! Connection registry.
//!
//! Stores the session attributes of every live connection, keyed by the
//! identifier handed out at connect time. Outbound handles live in the
//! broadcaster under the same identifier.

use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;
use log::debug;

use super::types::{ConnectionId, LobbyCode, Role, RosterEntry, WeaponClass};

/// Mutable attributes of one connected client.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub display_name: Option<String>,
    pub role: Role,
    pub ready: bool,
    pub score: u32,
    pub weapon_class: WeaponClass,
    /// Lobby this connection belongs to (lookup only, the directory owns membership).
    pub lobby_code: Option<LobbyCode>,
    pub is_host: bool,
    pub connected_at: Instant,
    /// Connect order, used wherever rosters must be listed deterministically.
    pub seq: u64,
}

impl Connection {
    fn new(id: ConnectionId, seq: u64) -> Self {
        Self {
            id,
            display_name: None,
            role: Role::Spectator,
            ready: false,
            score: 0,
            weapon_class: WeaponClass::Pistol,
            lobby_code: None,
            is_host: false,
            connected_at: Instant::now(),
            seq,
        }
    }

    /// True when the display name is set and non-blank.
    pub fn is_named(&self) -> bool {
        self.display_name.as_deref().is_some_and(|name| !name.trim().is_empty())
    }

    /// Put the connection in a lobby as a fresh, not-ready player with no score.
    pub fn enter_lobby(&mut self, code: &str, is_host: bool) {
        self.lobby_code = Some(code.to_string());
        self.is_host = is_host;
        self.role = Role::Player;
        self.ready = false;
        self.score = 0;
    }
}

/// Validated profile fields; `None` leaves the current value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub weapon_class: Option<WeaponClass>,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
    next_seq: u64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh identifier and create a spectator connection for it.
    pub fn register(&mut self) -> ConnectionId {
        let id = loop {
            let candidate = Uuid::new_v4().simple().to_string();
            if !self.connections.contains_key(&candidate) {
                break candidate;
            }
        };
        self.next_seq += 1;
        self.connections.insert(id.clone(), Connection::new(id.clone(), self.next_seq));
        debug!("[Registry] Registered connection {}", id);
        id
    }

    /// Apply a profile update. Unknown identifiers are ignored.
    pub fn set_profile(&mut self, id: &str, update: ProfileUpdate) -> bool {
        let Some(connection) = self.connections.get_mut(id) else {
            return false;
        };
        if let Some(name) = update.display_name {
            let name = name.trim();
            if !name.is_empty() {
                connection.display_name = Some(name.to_string());
            }
        }
        if let Some(role) = update.role {
            connection.role = role;
        }
        if let Some(weapon_class) = update.weapon_class {
            connection.weapon_class = weapon_class;
        }
        true
    }

    /// Remove a connection record. Lobby cleanup must already have happened.
    pub fn unregister(&mut self, id: &str) -> Option<Connection> {
        let removed = self.connections.remove(id);
        if removed.is_some() {
            debug!("[Registry] Unregistered connection {}", id);
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Connection> {
        self.connections.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Add the per-hit score of the connection's weapon. Returns the new score.
    pub fn record_hit(&mut self, id: &str) -> Option<u32> {
        let connection = self.connections.get_mut(id)?;
        connection.score = connection.score.saturating_add(connection.weapon_class.hit_score());
        Some(connection.score)
    }

    /// Identifiers of every player that is currently ready.
    pub fn ready_players(&self) -> Vec<ConnectionId> {
        let mut ready: Vec<&Connection> = self.connections
            .values()
            .filter(|c| c.role == Role::Player && c.ready)
            .collect();
        ready.sort_by_key(|c| c.seq);
        ready.into_iter().map(|c| c.id.clone()).collect()
    }

    /// Named connections in connect order, as broadcast in `lobby_status`.
    pub fn roster(&self) -> Vec<RosterEntry> {
        let mut named: Vec<&Connection> = self.connections.values().filter(|c| c.is_named()).collect();
        named.sort_by_key(|c| c.seq);
        named
            .into_iter()
            .map(|c| RosterEntry {
                user_id: c.id.clone(),
                username: c.display_name.clone().unwrap_or_default(),
                role: c.role,
                ready: c.ready,
                score: c.score,
                class: c.weapon_class,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_creates_spectator() {
        let mut registry = ConnectionRegistry::new();
        let id = registry.register();
        let connection = registry.get(&id).unwrap();
        assert_eq!(connection.role, Role::Spectator);
        assert!(!connection.ready);
        assert_eq!(connection.score, 0);
        assert_eq!(connection.weapon_class, WeaponClass::Pistol);
        assert!(connection.lobby_code.is_none());
    }

    #[test]
    fn entering_a_lobby_clears_score_and_readiness() {
        let mut registry = ConnectionRegistry::new();
        let id = registry.register();
        registry.record_hit(&id);
        registry.record_hit(&id);
        let connection = registry.get_mut(&id).unwrap();
        connection.ready = true;
        connection.enter_lobby("ABCDEF", false);
        assert_eq!(connection.score, 0);
        assert!(!connection.ready);
        assert_eq!(connection.role, Role::Player);
    }

    #[test]
    fn identifiers_are_unique() {
        let mut registry = ConnectionRegistry::new();
        let ids: std::collections::HashSet<_> = (0..200).map(|_| registry.register()).collect();
        assert_eq!(ids.len(), 200);
        assert_eq!(registry.len(), 200);
    }

    #[test]
    fn blank_display_name_is_ignored() {
        let mut registry = ConnectionRegistry::new();
        let id = registry.register();
        registry.set_profile(&id, ProfileUpdate { display_name: Some("  Ace  ".into()), ..Default::default() });
        registry.set_profile(&id, ProfileUpdate { display_name: Some("   ".into()), ..Default::default() });
        assert_eq!(registry.get(&id).unwrap().display_name.as_deref(), Some("Ace"));
    }

    #[test]
    fn profile_update_keeps_unset_fields() {
        let mut registry = ConnectionRegistry::new();
        let id = registry.register();
        registry.set_profile(&id, ProfileUpdate {
            display_name: Some("Ace".into()),
            role: Some(Role::Player),
            weapon_class: Some(WeaponClass::Archer),
        });
        registry.set_profile(&id, ProfileUpdate { weapon_class: Some(WeaponClass::Shotgun), ..Default::default() });
        let connection = registry.get(&id).unwrap();
        assert_eq!(connection.weapon_class, WeaponClass::Shotgun);
        assert_eq!(connection.role, Role::Player);
        assert_eq!(connection.display_name.as_deref(), Some("Ace"));
    }

    #[test]
    fn unknown_identifier_is_noop() {
        let mut registry = ConnectionRegistry::new();
        assert!(!registry.set_profile("ghost", ProfileUpdate::default()));
        assert!(registry.unregister("ghost").is_none());
        assert!(registry.record_hit("ghost").is_none());
    }

    #[test]
    fn hits_add_fixed_amount_per_class() {
        let mut registry = ConnectionRegistry::new();
        for (class, step) in [(WeaponClass::Pistol, 10), (WeaponClass::Shotgun, 40), (WeaponClass::Archer, 70)] {
            let id = registry.register();
            registry.get_mut(&id).unwrap().enter_lobby("ABCDEF", false);
            registry.set_profile(&id, ProfileUpdate { weapon_class: Some(class), ..Default::default() });
            registry.get_mut(&id).unwrap().score = 1234;
            let mut previous = 1234;
            for _ in 0..5 {
                let score = registry.record_hit(&id).unwrap();
                assert_eq!(score, previous + step);
                previous = score;
            }
        }
    }

    #[test]
    fn roster_skips_unnamed() {
        let mut registry = ConnectionRegistry::new();
        let named = registry.register();
        let _anonymous = registry.register();
        registry.set_profile(&named, ProfileUpdate { display_name: Some("Robin".into()), ..Default::default() });
        let roster = registry.roster();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].user_id, named);
    }

    #[test]
    fn ready_players_only_counts_players() {
        let mut registry = ConnectionRegistry::new();
        let player = registry.register();
        let spectator = registry.register();
        registry.get_mut(&player).unwrap().enter_lobby("ABCDEF", false);
        registry.get_mut(&player).unwrap().ready = true;
        registry.get_mut(&spectator).unwrap().ready = true;
        assert_eq!(registry.ready_players(), vec![player]);
    }
}
