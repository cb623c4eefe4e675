use std::time::Duration;

use futures_util::{SinkExt as _, StreamExt as _};
use relay::settings::HeartbeatSettings;
use relay_socket::{ws, RelaySocket};

use crate::helper::{spawn_app, TestAppBuilder};

#[actix_web::test]
async fn spawn_test_app() {
    let app = spawn_app().await;
    let path = app.path("health_check");
    let response = reqwest::Client::new()
        .get(&path)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status(), 200);
    assert_eq!(response.content_length(), Some(0));
}

#[actix_web::test]
async fn client_ping_pong() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let (_res, mut ws) = RelaySocket::open(&app.ws_address()).await?;

    match ws.next().await {
        Some(Ok(ws::Frame::Text(text))) => {
            assert_eq!(&text[..], br#"{"type":"init","role":"host"}"#)
        }
        other => panic!("expected role announcement, got {other:?}"),
    }

    let mut got_pong = false;
    ws.send(ws::Message::Ping(actix_web::web::Bytes::new()))
        .await
        .unwrap();
    if let Some(msg) = ws.next().await {
        match msg {
            Ok(ws::Frame::Pong(_)) => {
                got_pong = true;
            }
            _ => {}
        }
    }
    assert!(got_pong);
    Ok(())
}

#[actix_web::test]
async fn server_pings_when_heartbeat_enabled() -> anyhow::Result<()> {
    let app = TestAppBuilder::new()
        .heartbeat(HeartbeatSettings {
            interval: Duration::from_millis(100),
            client_timeout: Duration::from_secs(10),
        })
        .spawn()
        .await;
    let (_res, mut ws) = RelaySocket::open(&app.ws_address()).await?;
    let _ = ws.next().await; // role announcement

    let frame = tokio::time::timeout(Duration::from_secs(2), ws.next()).await?;
    assert!(matches!(frame, Some(Ok(ws::Frame::Ping(_)))));
    Ok(())
}

#[actix_web::test]
async fn serves_client_assets() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<canvas id=\"game\"></canvas>").unwrap();
    std::fs::write(dir.path().join("script.js"), "// game").unwrap();
    let app = TestAppBuilder::new().static_dir(dir.path()).spawn().await;
    let client = reqwest::Client::new();

    let index = client.get(app.base_address() + "/").send().await.unwrap();
    assert_eq!(index.status(), 200);
    assert_eq!(index.text().await.unwrap(), "<canvas id=\"game\"></canvas>");

    let script = client.get(app.path("script.js")).send().await.unwrap();
    assert_eq!(script.status(), 200);
    assert_eq!(script.text().await.unwrap(), "// game");

    // relay endpoints still win over the file tree
    let health = client.get(app.path("health_check")).send().await.unwrap();
    assert_eq!(health.status(), 200);
}

#[actix_web::test]
async fn no_assets_without_static_dir() {
    let app = spawn_app().await;
    let response = reqwest::Client::new()
        .get(app.path("index.html"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
