use anyhow::Result;
use pxweb_viewer::{
    server::{self, AppState},
    Config, StatsClient,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) config ───────────────────────────────────────────────────
    let config = Config::from_env()?;

    // ─── 2) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_directive()));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!(debug = config.debug, "startup");

    // ─── 3) one client for the whole process ─────────────────────────
    let client = StatsClient::new(
        config.base_url.clone(),
        config.language.clone(),
        config.timeout,
    )?;
    let state = AppState::new(client, &config);

    // ─── 4) serve ────────────────────────────────────────────────────
    server::serve(&config, state).await;

    Ok(())
}
