/// Broadcast fan-out.
///
/// Holds the outbound handle of every live connection and delivers server
/// messages to one connection, a list of connections, or everybody. Delivery
/// is fire-and-forget; a closed session simply drops what it is sent.
use std::collections::HashMap;
use actix::Recipient;
use log::debug;

use super::messages::ServerMessage;
use super::types::ConnectionId;

#[derive(Default)]
pub struct Broadcaster {
    recipients: HashMap<ConnectionId, Recipient<ServerMessage>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ConnectionId, recipient: Recipient<ServerMessage>) {
        self.recipients.insert(id, recipient);
    }

    pub fn unregister(&mut self, id: &str) {
        self.recipients.remove(id);
    }

    /// Send to a single connection.
    pub fn send_to(&self, id: &str, msg: ServerMessage) {
        if let Some(recipient) = self.recipients.get(id) {
            recipient.do_send(msg);
        }
    }

    /// Send to each of `ids` that is still connected, in the given order.
    pub fn send_to_many(&self, ids: &[ConnectionId], msg: ServerMessage) {
        debug!("[Broadcast] {} -> {} connection(s)", msg.kind(), ids.len());
        for id in ids {
            if let Some(recipient) = self.recipients.get(id) {
                recipient.do_send(msg.clone());
            }
        }
    }

    /// Send to every live connection.
    pub fn broadcast_all(&self, msg: ServerMessage) {
        debug!("[Broadcast] {} -> all ({})", msg.kind(), self.recipients.len());
        for recipient in self.recipients.values() {
            recipient.do_send(msg.clone());
        }
    }
}
