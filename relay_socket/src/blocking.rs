use std::thread;

use actix_rt::System;
use anyhow::anyhow;
use tokio::sync::{
    mpsc::{self, error::TryRecvError},
    oneshot,
};
use tracing::error;

use crate::{
    message::{Payload, Role},
    RelaySocket,
};

/// Synchronous handle on a [`RelaySocket`] that runs on its own actix system
/// thread. Meant for game loops that poll once per frame.
pub struct BlockingRelaySocket {
    role: Role,
    outgoing: mpsc::UnboundedSender<Payload>,
    incoming: mpsc::UnboundedReceiver<Payload>,
}

/// Cloneable sending half, usable from other threads.
#[derive(Debug, Clone)]
pub struct RelaySender {
    outgoing: mpsc::UnboundedSender<Payload>,
}

impl RelaySender {
    pub fn send(&self, payload: impl Into<Payload>) -> anyhow::Result<()> {
        self.outgoing
            .send(payload.into())
            .map_err(|_| anyhow!("relay connection is closed"))
    }
}

impl BlockingRelaySocket {
    /// Connects and blocks until the relay announced this peer's role.
    pub fn connect(address: impl Into<String>) -> anyhow::Result<Self> {
        let address = address.into();
        let (outgoing, out_rx) = mpsc::unbounded_channel();
        let (in_tx, incoming) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        thread::spawn(move || {
            let system = System::new();
            system.block_on(async move {
                match RelaySocket::connect(&address).await {
                    Ok(socket) => {
                        let _ = ready_tx.send(Ok(socket.role()));
                        if let Err(e) = socket.run(out_rx, in_tx).await {
                            error!(?e, "relay socket failed");
                        }
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                    }
                }
            });
        });

        let role = ready_rx
            .blocking_recv()
            .map_err(|_| anyhow!("relay socket thread exited"))??;
        Ok(Self {
            role,
            outgoing,
            incoming,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn send(&self, payload: impl Into<Payload>) -> anyhow::Result<()> {
        self.sender().send(payload)
    }

    pub fn sender(&self) -> RelaySender {
        RelaySender {
            outgoing: self.outgoing.clone(),
        }
    }

    /// Blocks until the next payload arrives. `None` once the connection is gone.
    pub fn recv(&mut self) -> Option<Payload> {
        self.incoming.blocking_recv()
    }

    /// Everything that arrived since the last call, without blocking.
    pub fn receive_all(&mut self) -> anyhow::Result<Vec<Payload>> {
        let mut payloads = vec![];
        loop {
            match self.incoming.try_recv() {
                Ok(payload) => payloads.push(payload),
                Err(TryRecvError::Empty) => return Ok(payloads),
                Err(TryRecvError::Disconnected) if !payloads.is_empty() => return Ok(payloads),
                Err(TryRecvError::Disconnected) => return Err(anyhow!("relay connection is closed")),
            }
        }
    }
}
