//! Field validation policy.
//!
//! Every inbound field goes through one of these functions, so each field has
//! the same rule at every entry point. Optional fields fall back to a safe
//! default instead of rejecting the message.

use serde_json::Value;

use super::types::{LobbyCode, Role, WeaponClass};
use crate::config::lobby::{DEFAULT_LOBBY_NAME, DEFAULT_MAX_PLAYERS, MAX_PLAYERS, MIN_PLAYERS};

/// Clamp a requested capacity into `[MIN_PLAYERS, MAX_PLAYERS]`.
pub fn clamp_max_players(requested: usize) -> usize {
    requested.clamp(MIN_PLAYERS, MAX_PLAYERS)
}

/// `maxPlayers`: any JSON number, clamped; anything else gives the default.
pub fn max_players(value: Option<&Value>) -> usize {
    let Some(number) = value.and_then(Value::as_f64) else {
        return DEFAULT_MAX_PLAYERS;
    };
    if number.is_nan() {
        return DEFAULT_MAX_PLAYERS;
    }
    let clamped = number.clamp(MIN_PLAYERS as f64, MAX_PLAYERS as f64);
    clamp_max_players(clamped as usize)
}

/// Non-empty trimmed string, if any.
fn trimmed(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `name` of a new lobby.
pub fn lobby_name(value: Option<&Value>) -> String {
    trimmed(value).unwrap_or_else(|| DEFAULT_LOBBY_NAME.to_string())
}

/// `username`: only a non-blank string is applied.
pub fn display_name(value: Option<&Value>) -> Option<String> {
    trimmed(value)
}

/// `class`: one of the known weapons, otherwise pistol.
pub fn weapon_class(value: Option<&Value>) -> WeaponClass {
    value
        .and_then(Value::as_str)
        .and_then(WeaponClass::from_name)
        .unwrap_or_default()
}

/// `role`: `"player"` selects the player role, anything else spectator.
pub fn role(value: Option<&Value>) -> Role {
    match value.and_then(Value::as_str) {
        Some("player") => Role::Player,
        _ => Role::Spectator,
    }
}

/// Lobby codes are matched case-insensitively and stored uppercase.
pub fn normalize_code(code: &str) -> LobbyCode {
    code.trim().to_uppercase()
}

/// `code` / `lobbyCode` / `gameId`: a non-blank string, normalized.
pub fn lobby_code(value: Option<&Value>) -> Option<LobbyCode> {
    trimmed(value).map(|code| normalize_code(&code))
}

/// `score`: a non-negative integer, otherwise zero.
pub fn score(value: Option<&Value>) -> u32 {
    let Some(value) = value else {
        return 0;
    };
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).unwrap_or(u32::MAX);
    }
    match value.as_f64() {
        Some(n) if n.is_finite() && n > 0.0 => n.min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

/// `ready`: must be a JSON boolean.
pub fn ready(value: Option<&Value>) -> Option<bool> {
    value.and_then(Value::as_bool)
}

/// `faceData`: any payload except null, `false` or an empty string.
pub fn face_data(value: Option<&Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(other) => Some(other.clone()),
    }
}

/// `userId` on identity messages.
pub fn connection_id(value: Option<&Value>) -> Option<String> {
    trimmed(value)
}

/// Optional opaque metadata; null counts as absent.
pub fn detection_data(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn max_players_policy() {
        assert_eq!(max_players(None), 8);
        assert_eq!(max_players(Some(&json!("six"))), 8);
        assert_eq!(max_players(Some(&json!(3))), 3);
        assert_eq!(max_players(Some(&json!(1))), 2);
        assert_eq!(max_players(Some(&json!(-5))), 2);
        assert_eq!(max_players(Some(&json!(12))), 8);
        assert_eq!(max_players(Some(&json!(4.7))), 4);
    }

    #[test]
    fn names_are_trimmed() {
        assert_eq!(lobby_name(Some(&json!("  Arena "))), "Arena");
        assert_eq!(lobby_name(Some(&json!("   "))), "Lobby");
        assert_eq!(lobby_name(Some(&json!(7))), "Lobby");
        assert_eq!(display_name(Some(&json!(" Ace "))), Some("Ace".into()));
        assert_eq!(display_name(Some(&json!(""))), None);
    }

    #[test]
    fn weapon_class_defaults_to_pistol() {
        assert_eq!(weapon_class(Some(&json!("archer"))), WeaponClass::Archer);
        assert_eq!(weapon_class(Some(&json!("shotgun"))), WeaponClass::Shotgun);
        assert_eq!(weapon_class(Some(&json!("bazooka"))), WeaponClass::Pistol);
        assert_eq!(weapon_class(None), WeaponClass::Pistol);
    }

    #[test]
    fn codes_are_case_insensitive() {
        assert_eq!(lobby_code(Some(&json!("abcdef"))), Some("ABCDEF".into()));
        assert_eq!(lobby_code(Some(&json!(" AbCdEf "))), lobby_code(Some(&json!("ABCDEF"))));
        assert_eq!(lobby_code(Some(&json!(""))), None);
        assert_eq!(lobby_code(Some(&json!(123))), None);
    }

    #[test]
    fn score_is_non_negative() {
        assert_eq!(score(Some(&json!(42))), 42);
        assert_eq!(score(Some(&json!(-3))), 0);
        assert_eq!(score(Some(&json!("12"))), 0);
        assert_eq!(score(None), 0);
    }

    #[test]
    fn ready_requires_boolean() {
        assert_eq!(ready(Some(&json!(true))), Some(true));
        assert_eq!(ready(Some(&json!("true"))), None);
        assert_eq!(ready(None), None);
    }

    #[test]
    fn face_data_rejects_empty_payloads() {
        assert_eq!(face_data(Some(&json!("x"))), Some(json!("x")));
        assert_eq!(face_data(Some(&json!(""))), None);
        assert_eq!(face_data(Some(&Value::Null)), None);
        assert_eq!(face_data(None), None);
    }
}
