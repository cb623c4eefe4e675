use anyhow::anyhow;
pub use awc::ws;
use awc::{ws::Codec, BoxedSocket, ClientResponse};
use futures_util::{SinkExt, StreamExt};
use tokio::{
    select,
    sync::mpsc::{UnboundedReceiver, UnboundedSender},
};
use tracing::{debug, info};

pub mod blocking;
pub mod fragments;
pub mod message;

use crate::{
    fragments::Fragments,
    message::{Message, Payload, Role},
};

/// What a single websocket frame amounted to.
enum Inbound {
    Payload(Payload),
    Closed,
    Control,
}

/// One peer's connection to the relay.
pub struct RelaySocket {
    role: Role,
    address: String,
    ws: actix_codec::Framed<BoxedSocket, Codec>,
    fragments: Fragments,
}

impl std::fmt::Debug for RelaySocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelaySocket")
            .field("role", &self.role)
            .field("address", &self.address)
            .finish()
    }
}

impl RelaySocket {
    /// Connects to `address` (e.g. `ws://127.0.0.1:8765/ws`) and waits for
    /// the role announcement, which the relay always sends first.
    pub async fn connect<S: AsRef<str>>(address: S) -> anyhow::Result<Self> {
        let address = address.as_ref().to_string();
        let (_res, mut ws) = RelaySocket::open(&address).await?;
        let role = loop {
            match ws.next().await {
                Some(Ok(ws::Frame::Text(text))) => {
                    let Message::Init { role } = serde_json::from_slice::<Message>(&text)
                        .map_err(|e| anyhow!("First message must be init: {e}"))?;
                    break role;
                }
                Some(Ok(ws::Frame::Ping(msg))) => ws.send(ws::Message::Pong(msg)).await?,
                Some(Ok(frame)) => return Err(anyhow!("First message must be init, got {frame:?}")),
                Some(Err(e)) => return Err(e.into()),
                None => return Err(anyhow!("Error with Ws connection!")),
            }
        };
        info!(%role, %address, "joined relay");
        Ok(Self {
            role,
            address,
            ws,
            fragments: Fragments::default(),
        })
    }

    pub async fn open(
        address: &str,
    ) -> Result<(ClientResponse, actix_codec::Framed<BoxedSocket, Codec>), anyhow::Error> {
        awc::Client::new()
            .ws(address)
            .connect()
            .await
            .map_err(|e| anyhow::anyhow!("Client error: {}", e))
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub async fn send(&mut self, payload: impl Into<Payload>) -> anyhow::Result<()> {
        let msg = match payload.into() {
            Payload::Text(text) => ws::Message::Text(text.into()),
            Payload::Binary(bin) => ws::Message::Binary(bin),
        };
        Ok(self.ws.send(msg).await?)
    }

    /// Next payload relayed from another peer. `None` once the relay closed
    /// the connection.
    pub async fn next(&mut self) -> anyhow::Result<Option<Payload>> {
        while let Some(frame) = self.ws.next().await {
            match self.on_frame(frame?).await? {
                Inbound::Payload(payload) => return Ok(Some(payload)),
                Inbound::Closed => return Ok(None),
                Inbound::Control => {}
            }
        }
        Ok(None)
    }

    /// Sends a close frame and shuts the connection down.
    pub async fn close(&mut self) -> anyhow::Result<()> {
        self.ws.send(ws::Message::Close(None)).await?;
        self.ws.close().await?;
        Ok(())
    }

    /// Pumps `outgoing` onto the relay and relayed payloads into `incoming`
    /// until either side goes away.
    pub async fn run(
        mut self,
        mut outgoing: UnboundedReceiver<Payload>,
        incoming: UnboundedSender<Payload>,
    ) -> Result<(), anyhow::Error> {
        loop {
            select! {
                payload = outgoing.recv() => match payload {
                    Some(payload) => self.send(payload).await?,
                    None => {
                        self.close().await?;
                        break;
                    }
                },
                frame = self.ws.next() => {
                    let Some(frame) = frame else { break };
                    match self.on_frame(frame?).await? {
                        Inbound::Payload(payload) => {
                            if incoming.send(payload).is_err() {
                                self.close().await?;
                                break;
                            }
                        }
                        Inbound::Closed => break,
                        Inbound::Control => {}
                    }
                }
            }
        }
        debug!(address = %self.address, "relay socket stopped");
        Ok(())
    }

    async fn on_frame(&mut self, frame: ws::Frame) -> anyhow::Result<Inbound> {
        let inbound = match frame {
            ws::Frame::Text(text) => Inbound::Payload(Payload::Text(String::from_utf8(text.to_vec())?)),
            ws::Frame::Binary(bin) => Inbound::Payload(Payload::Binary(bin)),
            ws::Frame::Ping(msg) => {
                self.ws.send(ws::Message::Pong(msg)).await?;
                Inbound::Control
            }
            ws::Frame::Pong(_) => Inbound::Control,
            ws::Frame::Close(reason) => {
                debug!(?reason, "relay closed connection");
                Inbound::Closed
            }
            ws::Frame::Continuation(item) => match self.fragments.push(item)? {
                Some(payload) => Inbound::Payload(payload),
                None => Inbound::Control,
            },
        };
        Ok(inbound)
    }
}
