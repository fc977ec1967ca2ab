use anyhow::Result;
use axum::Router;
use solar_forecast::{api, config::Config, sync, telemetry};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let cfg = Config::load()?;

    if cfg.auth.jwt_secret.is_empty() || cfg.auth.jwt_secret.starts_with("__SET_VIA_ENV") {
        anyhow::bail!(
            "SOLAR__AUTH__JWT_SECRET must be set to a secure random value (min 32 chars). \
            Generate one with: openssl rand -base64 32"
        );
    }

    if cfg.provider.api_key.starts_with("__SET_VIA_ENV") {
        warn!("provider API key not configured - forecast sync will fail until SOLAR__PROVIDER__API_KEY is set");
    }

    let state = sync::AppState::new(cfg.clone()).await?;

    let app: Router = api::router(state.clone(), &cfg);
    let addr = cfg.server.socket_addr()?;

    if cfg.server.host == "0.0.0.0" {
        warn!(
            "server binding to 0.0.0.0 - service will be accessible from the network; \
            bind to 127.0.0.1 unless behind a reverse proxy"
        );
    }

    info!(%addr, "starting solar forecast service");

    sync::spawn_sync_tasks(state.clone(), cfg.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}
