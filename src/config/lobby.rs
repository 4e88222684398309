/// Lobby configuration constants.
/// 
/// This module defines the lobby code format, capacity bounds and the defaults
/// applied when a client leaves a field out.
pub const LOBBY_CODE_LENGTH: usize = 6;

/// Alphabet used for lobby codes (uppercase letters only).
pub const LOBBY_CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Minimum number of players a lobby can be sized for.
pub const MIN_PLAYERS: usize = 2;

/// Maximum number of players a lobby can be sized for.
pub const MAX_PLAYERS: usize = 8;

/// Capacity used when `create_lobby` carries no usable `maxPlayers`.
pub const DEFAULT_MAX_PLAYERS: usize = 8;

/// Name used when `create_lobby` carries no usable `name`.
pub const DEFAULT_LOBBY_NAME: &str = "Lobby";

/// Name of the lobby created for the very first connection of the process.
pub const BOOTSTRAP_LOBBY_NAME: &str = "BBDefault";

/// Attempts at drawing an unused lobby code before widening the search.
pub const CODE_GENERATION_ATTEMPTS: usize = 64;
