//! Opinion reference server.
//!
//! `GET /opinion?url=<pdf>&citation=<own citation>` fetches an opinion,
//! renders it to text and returns the other opinions it cites.

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use oag_references::{router, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();
    tracing::info!(allowed_domains = ?config.allowed_domains, "loaded configuration");

    let state = Arc::new(AppState::new(config)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
