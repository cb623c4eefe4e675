use tracing::info;
use tracing_subscriber::EnvFilter;

use relay::{address::local_ip, application::Application, settings::Settings};

fn setup() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "debug")
    }
    tracing_subscriber::fmt::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    setup();

    let app = Application::build(settings).await?;
    let ip = local_ip();
    info!("Share this address with the other player: http://{ip}:{}", app.port());
    info!("Relay running on ws://{ip}:{}/ws", app.port());
    app.run_until_stopped().await?;
    info!("Stopping server...");
    Ok(())
}
