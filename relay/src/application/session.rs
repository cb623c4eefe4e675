use std::time::Instant;

use actix::prelude::*;
use actix_web_actors::ws;
use relay_socket::{
    fragments::Fragments,
    message::{Message, Payload},
};
use tracing::{debug, error, info, warn};

pub use ws::start;

use super::{
    registry::{self, Registry},
    ConnectionId,
};
use crate::settings::HeartbeatSettings;

/// One websocket peer. Reads frames from its own connection and hands every
/// data frame to the registry for fan-out; writes whatever the registry
/// queues for it.
#[derive(Debug)]
pub struct WsSession {
    id: ConnectionId,
    heartbeat: Instant,
    heartbeat_settings: Option<HeartbeatSettings>,
    registry: Addr<Registry>,
    fragments: Fragments,
}

impl WsSession {
    pub fn new(
        id: ConnectionId,
        registry: Addr<Registry>,
        heartbeat_settings: Option<HeartbeatSettings>,
    ) -> Self {
        Self {
            id,
            heartbeat: Instant::now(),
            heartbeat_settings,
            registry,
            fragments: Fragments::default(),
        }
    }

    /// helper method that sends ping to client every `interval`.
    ///
    /// also this method checks heartbeats from client
    fn heartbeat(&self, ctx: &mut <Self as Actor>::Context) {
        let Some(HeartbeatSettings {
            interval,
            client_timeout,
        }) = self.heartbeat_settings
        else {
            return;
        };
        ctx.run_interval(interval, move |act, ctx| {
            // check client heartbeats
            if Instant::now().duration_since(act.heartbeat) > client_timeout {
                // heartbeat timed out
                error!(id = %act.id, "Websocket Client heartbeat failed, disconnecting!");

                // stop actor
                ctx.stop();

                return;
            }

            ctx.ping(b"");
        });
    }

    fn relay(&self, payload: Payload) {
        self.registry.do_send(registry::Relay {
            from: self.id,
            payload,
        });
    }
}

impl Handler<registry::Outbound> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: registry::Outbound, ctx: &mut Self::Context) -> Self::Result {
        match msg {
            registry::Outbound::Init(role) => {
                match serde_json::to_string(&Message::Init { role }) {
                    Ok(text) => ctx.text(text),
                    Err(e) => {
                        error!(?e, "Failed to encode role announcement");
                        ctx.stop();
                    }
                }
            }
            registry::Outbound::Payload(Payload::Text(text)) => ctx.text(text),
            registry::Outbound::Payload(Payload::Binary(bin)) => ctx.binary(bin),
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    /// Method is called on actor start. We start the heartbeat process here.
    fn started(&mut self, ctx: &mut Self::Context) {
        self.heartbeat(ctx);

        let addr = ctx.address();
        self.registry
            .send(registry::Admit {
                id: self.id,
                addr: addr.recipient(),
            })
            .into_actor(self)
            .then(|res, act, ctx| {
                match res {
                    Ok(role) => info!(id = %act.id, %role, "WsSession admitted"),
                    Err(e) => {
                        error!(?e, "Registry unreachable. Stopping.");
                        ctx.stop();
                    }
                }
                fut::ready(())
            })
            .wait(ctx);
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.registry.do_send(registry::Remove { id: self.id });
        Running::Stop
    }
}

/// Handler for ws::Message message
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.heartbeat = Instant::now();
                self.relay(Payload::Text(text.to_string()));
            }
            Ok(ws::Message::Binary(bin)) => {
                self.heartbeat = Instant::now();
                self.relay(Payload::Binary(bin));
            }
            Ok(ws::Message::Close(reason)) => {
                debug!(id = %self.id, ?reason, "Client closed connection");
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(item)) => {
                self.heartbeat = Instant::now();
                match self.fragments.push(item) {
                    Ok(Some(payload)) => self.relay(payload),
                    Ok(None) => {}
                    Err(e) => {
                        warn!(id = %self.id, %e, "Malformed fragmented message, disconnecting");
                        ctx.close(Some(ws::CloseCode::Protocol.into()));
                        ctx.stop();
                    }
                }
            }
            Ok(ws::Message::Nop) => {}
            Err(e) => {
                debug!(id = %self.id, ?e, "Connection errored");
                ctx.stop();
            }
        }
    }
}
