/// Process settings read from the environment.
use std::env;
use std::net::{IpAddr, Ipv4Addr};

use log::warn;

/// Port used when `PORT` is unset or invalid.
pub const DEFAULT_PORT: u16 = 8080;

/// Address used when `HOST` is unset or invalid.
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Network settings for the HTTP/WebSocket listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
}

impl ServerSettings {
    /// Load settings from `HOST` and `PORT`, falling back to the defaults.
    pub fn from_env() -> Self {
        Self::from_values(env::var("HOST").ok(), env::var("PORT").ok())
    }

    fn from_values(host: Option<String>, port: Option<String>) -> Self {
        let host = match host {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("[Config] Invalid HOST '{}', using {}", raw, DEFAULT_HOST);
                DEFAULT_HOST
            }),
            None => DEFAULT_HOST,
        };
        let port = match port {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("[Config] Invalid PORT '{}', using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };
        Self { host, port }
    }

    /// Address tuple accepted by `HttpServer::bind`.
    pub fn bind_addr(&self) -> (IpAddr, u16) {
        (self.host, self.port)
    }
}
