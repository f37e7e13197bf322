//! Hangar server - multi-tenant record-keeper for drones, parts and repairs.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hangar_server::config::Config;
use hangar_server::persistence::Db;
use hangar_server::state::AppState;
use hangar_server::api;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("hangar_server=debug".parse()?))
        .init();

    tracing::info!("Starting hangar server...");

    let config = Config::from_env()?;
    let port = config.port;

    let db = Db::connect(&config).await?;
    let state = Arc::new(AppState::new(db, config));

    let app = api::routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
