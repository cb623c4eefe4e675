use actix::*;
use actix_files::Files;
use actix_web::{dev::Server, web, App, HttpServer};
use std::net::TcpListener;
use tracing::info;

use crate::settings::Settings;

use self::registry::Registry;

pub mod registry;
mod services;
mod session;
use services::{health_check, relay};

/// Identity of one websocket connection.
pub type ConnectionId = uuid::Uuid;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        info!("Running on port: {port}");

        let server = create_server(listener, configuration)?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn create_server(listener: TcpListener, settings: Settings) -> Result<Server, anyhow::Error> {
    let registry = web::Data::new(Registry::default().start());
    let heartbeat = web::Data::new(settings.heartbeat);
    let static_dir = settings.application.static_dir;
    if let Some(dir) = &static_dir {
        info!("Serving client assets from {}", dir.display());
    }
    Ok(HttpServer::new(move || {
        let app = App::new()
            .app_data(registry.clone())
            .app_data(heartbeat.clone())
            .service(health_check)
            .service(relay);
        // Registered last, it claims every path under `/`.
        match &static_dir {
            Some(dir) => app.service(Files::new("/", dir.clone()).index_file("index.html")),
            None => app,
        }
    })
    .listen(listener)?
    .run())
}

