use actix::*;
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use uuid::Uuid;

use super::{registry::Registry, session};
use crate::settings::HeartbeatSettings;

#[get("/health_check")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// Upgrades to a websocket; the connection becomes one relay peer.
#[get("/ws")]
pub async fn relay(
    req: HttpRequest,
    stream: web::Payload,
    registry: web::Data<Addr<Registry>>,
    heartbeat: web::Data<Option<HeartbeatSettings>>,
) -> Result<HttpResponse, Error> {
    let websocket = session::WsSession::new(
        Uuid::new_v4(),
        registry.get_ref().clone(),
        *heartbeat.get_ref(),
    );
    session::start(websocket, &req, stream)
}
