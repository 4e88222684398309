// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the main server components, including:
//! - Application state management
//! - HTTP/WebSocket routing
//! - Lobby and match coordination
//! - Client-facing error messages

pub mod state;
pub mod router;
pub mod coordinator;
pub mod ws_error;
