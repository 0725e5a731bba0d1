use anyhow::Context;

use nzg_claims_api::database::manager::StoreManager;
use nzg_claims_api::state::AppState;
use nzg_claims_api::{app, config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, PORT, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting NZG claims API in {:?} mode", config.environment);

    let store = StoreManager::from_env();
    store.init().await.context("failed to initialize claims store")?;

    let state = AppState::new(store);
    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("CLAIMS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("NZG claims API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
