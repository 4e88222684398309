//! Main entry point for the coordinator server.
//!
//! Loads settings, starts the coordinator actor and launches the HTTP server
//! with the WebSocket endpoint.

use actix::Actor;
use actix_web::{web, App, HttpServer};
use log::info;

use config::game::MatchTimings;
use config::server::ServerSettings;
use server::coordinator::server::CoordinatorServer;

pub mod config;
mod server;


#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // A missing .env file is fine; the process environment still applies.
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = ServerSettings::from_env();

    // Start the coordinator actor (connections, lobbies, matches).
    let coordinator_addr = CoordinatorServer::new(MatchTimings::default()).start();

    let state = web::Data::new(server::state::AppState::new(coordinator_addr));

    info!("[Server] Listening on {}:{}", settings.host, settings.port);
    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*"))
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind(settings.bind_addr())?
    .run()
    .await
}
