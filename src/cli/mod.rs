use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::{app, AppState};
use crate::auth::Authorizer;
use crate::config::AppConfig;
use crate::database;

#[derive(Parser, Debug)]
#[command(name = "drinks-api")]
#[command(about = "Coffee shop menu API: drinks gated by bearer-token permissions")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Port to listen on (overrides DRINKS_API_PORT / PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Address to bind (overrides DRINKS_API_HOST)")]
    pub host: Option<String>,

    #[arg(
        long,
        help = "Drop and recreate the drinks table, seeding a single drink. Destroys all records"
    )]
    pub reset_db: bool,
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("drinks_api=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load configuration, wire the store and authorizer, and serve until ctrl-c
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    tracing::info!("Starting Drinks API in {:?} mode", config.environment);

    let store = database::connect(&config.database)
        .await
        .context("failed to open drink store")?;

    if cli.reset_db {
        tracing::warn!("Resetting drinks table");
        store.reset().await.context("failed to reset drink store")?;
    }

    let authorizer = Authorizer::from_config(&config.auth).context("failed to configure token verification")?;
    let state = AppState::new(store.clone(), Arc::new(authorizer));
    let router = app(state, &config.security);

    let bind_addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.server.host, config.server.port))?;
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Drinks API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    tracing::info!("Drinks API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
