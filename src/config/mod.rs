/// Main configuration module.
/// 
/// Re-exports submodules for lobby rules, match timing and process settings.
pub mod lobby;
pub mod game;
pub mod server;
