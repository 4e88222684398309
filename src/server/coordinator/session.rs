/// WebSocket session for one client.
///
/// This actor registers with the coordinator when the socket opens, forwards
/// every parsed text frame as a `ClientRequest`, and writes each server message
/// back as a JSON text frame. Closing the socket (cleanly or not) unregisters
/// the connection.
use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{error, warn};

use super::messages::{ClientCommand, ServerMessage};
use super::server::{ClientRequest, Connect, CoordinatorServer, Disconnect};
use super::types::ConnectionId;

pub struct WsSession {
    /// Assigned by the coordinator once `Connect` has been handled.
    pub id: Option<ConnectionId>,
    pub username: Option<String>,
    pub coordinator_addr: Addr<CoordinatorServer>,
}

impl WsSession {
    pub fn new(coordinator_addr: Addr<CoordinatorServer>, username: Option<String>) -> Self {
        Self {
            id: None,
            username,
            coordinator_addr,
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    /// Registers with the coordinator. Frames are held back until the
    /// identifier comes back.
    fn started(&mut self, ctx: &mut Self::Context) {
        self.coordinator_addr
            .send(Connect {
                addr: ctx.address().recipient(),
                username: self.username.take(),
            })
            .into_actor(self)
            .then(|res, act, ctx| {
                match res {
                    Ok(id) => act.id = Some(id),
                    Err(e) => {
                        error!("[Session] Coordinator unavailable: {}", e);
                        ctx.stop();
                    }
                }
                fut::ready(())
            })
            .wait(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(id) = self.id.take() {
            self.coordinator_addr.do_send(Disconnect { id });
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => {
                let Some(id) = self.id.clone() else {
                    return;
                };
                match ClientCommand::parse(&text) {
                    Ok(command) => self.coordinator_addr.do_send(ClientRequest { id, command }),
                    // Malformed frames are dropped; the connection stays open.
                    Err(e) => warn!("[Session] Dropping frame from {}: {}", id, e),
                }
            }
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(_) => (),
            Err(e) => {
                warn!("[Session] Protocol error on {:?}: {}", self.id, e);
                ctx.stop();
            }
        }
    }
}

impl Handler<ServerMessage> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: ServerMessage, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg) {
            Ok(text) => ctx.text(text),
            Err(e) => error!("[Session] Failed to serialize {}: {}", msg.kind(), e),
        }
    }
}

/// WebSocket endpoint.
///
/// Accepts an optional `username` query parameter, percent-decoded.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    let username = username_from_query(req.query_string());
    ws::start(
        WsSession::new(data.coordinator_addr.clone(), username),
        &req,
        stream,
    )
}

/// Extract a non-blank `username` from a raw query string.
fn username_from_query(query: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .find(|(key, _)| *key == "username")
        .and_then(|(_, value)| urlencoding::decode(&value.replace('+', " ")).ok().map(|v| v.into_owned()))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}
