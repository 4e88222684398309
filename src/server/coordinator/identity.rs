//! Per-lobby face-scan identities.
//!
//! Payloads are stored and relayed verbatim; the server never looks inside the
//! image or the detection metadata. Lookups on unknown lobbies yield an empty
//! map rather than an error.

use std::collections::{BTreeMap, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};
use log::debug;
use serde::Serialize;
use serde_json::Value;

use super::registry::ConnectionRegistry;
use super::types::{ConnectionId, LobbyCode};

const UNKNOWN_USERNAME: &str = "Unknown";

/// A stored face scan for one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityRecord {
    pub face_data: Value,
    /// Display name at capture time, used when the connection has since gone.
    pub username: String,
    /// Milliseconds since the Unix epoch.
    pub captured_at: u64,
    pub detection_data: Option<Value>,
}

impl IdentityRecord {
    pub fn new(face_data: Value, username: Option<&str>, detection_data: Option<Value>) -> Self {
        let captured_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self {
            face_data,
            username: username.unwrap_or(UNKNOWN_USERNAME).to_string(),
            captured_at,
            detection_data,
        }
    }
}

/// Identity entry as sent to clients.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerIdentity {
    pub username: String,
    pub face_data: Value,
    pub detection_data: Option<Value>,
}

/// Identities of a lobby keyed by connection identifier.
pub type IdentityMap = BTreeMap<ConnectionId, PlayerIdentity>;

#[derive(Debug, Default)]
pub struct IdentityStore {
    lobbies: HashMap<LobbyCode, HashMap<ConnectionId, IdentityRecord>>,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record of `id` in lobby `code`.
    pub fn store(&mut self, code: &str, id: &str, record: IdentityRecord) {
        let previous = self.lobbies
            .entry(code.to_string())
            .or_default()
            .insert(id.to_string(), record);
        if let Some(previous) = previous {
            debug!("[Identity] Replaced scan of {} in {} (captured_at={})", id, code, previous.captured_at);
        }
    }

    /// Identities of the current `members`, with live display names.
    pub fn snapshot(&self, code: &str, members: &[ConnectionId], registry: &ConnectionRegistry) -> IdentityMap {
        let Some(records) = self.lobbies.get(code) else {
            return IdentityMap::new();
        };
        members
            .iter()
            .filter_map(|id| {
                let record = records.get(id)?;
                let username = registry
                    .get(id)
                    .and_then(|c| c.display_name.clone())
                    .unwrap_or_else(|| record.username.clone());
                Some((id.clone(), PlayerIdentity {
                    username,
                    face_data: record.face_data.clone(),
                    detection_data: record.detection_data.clone(),
                }))
            })
            .collect()
    }

    /// Wipe everything stored for a deleted lobby.
    pub fn forget_lobby(&mut self, code: &str) {
        self.lobbies.remove(code);
    }

    pub fn has_lobby(&self, code: &str) -> bool {
        self.lobbies.contains_key(code)
    }
}
