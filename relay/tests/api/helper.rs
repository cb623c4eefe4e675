use std::{path::PathBuf, time::Duration};

use once_cell::sync::Lazy;

use relay::{
    application,
    settings::{ApplicationSettings, HeartbeatSettings, Settings},
};
use relay_socket::{message::Payload, RelaySocket};

static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "debug")
    }
    tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
});

pub fn enable_tracing() {
    Lazy::force(&TRACING);
}

/// How long a removal needs to travel from a closed session to the registry.
pub const SETTLE: Duration = Duration::from_millis(200);

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    pub fn base_address(&self) -> String {
        format!("http://{}:{}", &self.address, self.port)
    }

    pub fn path(&self, path: &str) -> String {
        format!("{}/{}", &self.base_address(), path)
    }

    pub fn ws_address(&self) -> String {
        format!("ws://{}:{}/ws", &self.address, self.port)
    }

    pub async fn connect(&self) -> RelaySocket {
        RelaySocket::connect(self.ws_address())
            .await
            .expect("Failed to join relay")
    }
}

pub async fn spawn_app() -> TestApp {
    TestAppBuilder::new().spawn().await
}

#[derive(Default)]
pub struct TestAppBuilder {
    static_dir: Option<PathBuf>,
    heartbeat: Option<HeartbeatSettings>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    pub fn heartbeat(mut self, heartbeat: HeartbeatSettings) -> Self {
        self.heartbeat = Some(heartbeat);
        self
    }

    pub async fn spawn(self) -> TestApp {
        enable_tracing();
        let settings = Settings {
            application: ApplicationSettings {
                host: "127.0.0.1".to_string(),
                port: 0,
                static_dir: self.static_dir,
            },
            heartbeat: self.heartbeat,
        };
        let app = application::Application::build(settings)
            .await
            .expect("Failed to build application");
        let port = app.port();
        let _ = actix_web::rt::spawn(app.run_until_stopped());
        TestApp {
            address: "127.0.0.1".to_string(),
            port,
        }
    }
}

/// Fails if anything arrives on `socket` within a short window.
pub async fn assert_silent(socket: &mut RelaySocket) {
    let received = tokio::time::timeout(Duration::from_millis(300), socket.next()).await;
    assert!(received.is_err(), "unexpected delivery: {received:?}");
}

pub async fn next_payload(socket: &mut RelaySocket) -> Payload {
    tokio::time::timeout(Duration::from_secs(5), socket.next())
        .await
        .expect("Timed out waiting for a relayed message")
        .expect("Relay connection failed")
        .expect("Relay closed the connection")
}
