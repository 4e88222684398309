//! Lobby and match coordination.
//!
//! `CoordinatorServer` owns all session state and is the only writer of it.
//! `WsSession` actors relay client frames to it and its broadcasts back.

pub mod broadcast;
pub mod dispatcher;
pub mod identity;
pub mod lobby;
pub mod match_state;
pub mod messages;
pub mod registry;
pub mod server;
pub mod session;
pub mod types;
pub mod validation;
