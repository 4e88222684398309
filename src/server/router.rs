//! HTTP and WebSocket routing configuration.
//!
//! The WebSocket endpoint is served both at the root path and at `/ws`.

use actix_web::web;
use crate::server::coordinator::session::ws_connect;

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .to(ws_connect)
    )
    .service(
        web::resource("/ws")
            .to(ws_connect)
    );
}
