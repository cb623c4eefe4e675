use std::{
    io::{self, BufRead},
    thread,
};

use relay_socket::{blocking::BlockingRelaySocket, message::Payload};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDRESS: &str = "ws://127.0.0.1:8765/ws";

fn setup() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
}

/// Joins the relay, sends every stdin line to the other peer and prints
/// whatever the other peer sends back.
fn main() -> anyhow::Result<()> {
    setup();

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
    let mut socket = BlockingRelaySocket::connect(address)?;
    info!("Joined as {}", socket.role());

    let sender = socket.sender();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let sent = line
                .map_err(anyhow::Error::from)
                .and_then(|line| sender.send(line));
            if let Err(e) = sent {
                error!(?e, "Stopped reading stdin");
                break;
            }
        }
    });

    while let Some(payload) = socket.recv() {
        match payload {
            Payload::Text(text) => println!("{text}"),
            Payload::Binary(bin) => println!("<{} bytes>", bin.len()),
        }
    }
    info!("Relay closed the connection");
    Ok(())
}
