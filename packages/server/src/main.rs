use anyhow::Context;
use tracing::info;

use partvault_server::config::AppConfig;
use partvault_server::database::init_db;
use partvault_server::seed::{ensure_indexes, seed_principals};
use partvault_server::state::AppState;
use partvault_server::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database)
        .await
        .context("Failed to initialize database")?;
    ensure_indexes(&db)
        .await
        .context("Failed to ensure indexes")?;
    seed_principals(&db, &config.seed.principals)
        .await
        .context("Failed to seed principals")?;

    let blob_store = common::storage::from_config(&config.storage)
        .await
        .context("Failed to initialize blob store")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        blob_store,
        config,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
