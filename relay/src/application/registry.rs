use std::collections::HashMap;

use actix::prelude::*;
use relay_socket::message::{Payload, Role};
use tracing::{debug, info};

use super::ConnectionId;

/// Everything the registry pushes into a session's mailbox.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
#[rtype(result = "()")]
pub enum Outbound {
    /// Role announcement, always the first thing a session receives.
    Init(Role),
    /// Payload relayed from another peer.
    Payload(Payload),
}

/// Admits a connection and returns the role it was assigned.
#[derive(Message)]
#[rtype(result = "Role")]
pub struct Admit {
    pub id: ConnectionId,
    pub addr: Recipient<Outbound>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Remove {
    pub id: ConnectionId,
}

/// Forward `payload` to every connection except `from`.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Relay {
    pub from: ConnectionId,
    pub payload: Payload,
}

/// Number of currently registered connections.
#[cfg(test)]
#[derive(Message)]
#[rtype(result = "usize")]
pub struct Count;

/// The set of live connections, keyed by connection id.
///
/// Roles depend only on how many members the set has at admission time, so a
/// role freed by a disconnect is handed to the next arrival.
#[derive(Debug)]
pub struct ConnectionSet<T> {
    members: HashMap<ConnectionId, T>,
}

impl<T> Default for ConnectionSet<T> {
    fn default() -> Self {
        Self {
            members: HashMap::new(),
        }
    }
}

impl<T> ConnectionSet<T> {
    pub fn admit(&mut self, id: ConnectionId, handle: T) -> Role {
        self.members.insert(id, handle);
        if self.members.len() == 1 {
            Role::Host
        } else {
            Role::Guest
        }
    }

    /// Returns whether `id` was still registered.
    pub fn remove(&mut self, id: &ConnectionId) -> bool {
        self.members.remove(id).is_some()
    }

    pub fn others<'a>(&'a self, id: &'a ConnectionId) -> impl Iterator<Item = &'a T> + 'a {
        self.members
            .iter()
            .filter(move |(member, _)| *member != id)
            .map(|(_, handle)| handle)
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&T> {
        self.members.get(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Owns the connection set. Every admission, removal and fan-out goes through
/// this actor's mailbox, so each one sees the set either before or after any
/// concurrent change, never halfway.
#[derive(Default)]
pub struct Registry {
    connections: ConnectionSet<Recipient<Outbound>>,
}

impl Registry {
    fn notify(&self, id: &ConnectionId, role: Role) {
        if let Some(addr) = self.connections.get(id) {
            addr.do_send(Outbound::Init(role));
        }
    }
}

impl Actor for Registry {
    type Context = Context<Self>;
}

impl Handler<Admit> for Registry {
    type Result = MessageResult<Admit>;

    fn handle(&mut self, msg: Admit, _: &mut Self::Context) -> Self::Result {
        let role = self.connections.admit(msg.id, msg.addr);
        // Queued before anything another peer can relay to this connection.
        self.notify(&msg.id, role);
        info!(id = %msg.id, %role, total = self.connections.len(), "Client connected");
        MessageResult(role)
    }
}

impl Handler<Remove> for Registry {
    type Result = ();

    fn handle(&mut self, msg: Remove, _: &mut Self::Context) -> Self::Result {
        if self.connections.remove(&msg.id) {
            info!(id = %msg.id, total = self.connections.len(), "Client disconnected");
        }
    }
}

impl Handler<Relay> for Registry {
    type Result = ();

    fn handle(&mut self, msg: Relay, _: &mut Self::Context) -> Self::Result {
        let mut recipients = 0;
        for addr in self.connections.others(&msg.from) {
            if !addr.connected() {
                debug!(from = %msg.from, "skipping recipient whose session is gone");
                continue;
            }
            addr.do_send(Outbound::Payload(msg.payload.clone()));
            recipients += 1;
        }
        if recipients == 0 {
            debug!(from = %msg.from, "no other peer connected, dropping message");
        }
    }
}

#[cfg(test)]
impl Handler<Count> for Registry {
    type Result = usize;

    fn handle(&mut self, _: Count, _: &mut Self::Context) -> Self::Result {
        self.connections.len()
    }
}
