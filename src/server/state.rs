// src/server/state.rs

//! Application state for the server.
//!
//! Holds the coordinator actor address shared by the WebSocket handlers.

use actix::Addr;
use crate::server::coordinator::server::CoordinatorServer;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Address of the coordinator actor (connections, lobbies, matches).
    pub coordinator_addr: Addr<CoordinatorServer>,
}

impl AppState {
    pub fn new(coordinator_addr: Addr<CoordinatorServer>) -> Self {
        AppState { coordinator_addr }
    }
}
