use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use devops_control_plane::config;
use devops_control_plane::database::{DatabaseManager, MemoryToolRepository, PgToolRepository, ToolRepository};
use devops_control_plane::server::{app, AppState};

#[derive(Parser, Debug)]
#[command(name = "devops-control-plane", version, about = "DevOps Control Plane tool catalog API")]
struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Serve the in-memory sample catalog instead of Postgres
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = config::config();
    tracing::info!("Starting DevOps Control Plane in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; every /api request will be rejected");
    }

    let repository: Arc<dyn ToolRepository> = if args.memory {
        tracing::info!("Using in-memory tool catalog");
        Arc::new(MemoryToolRepository::with_sample_tools().await?)
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to Postgres")?;
        Arc::new(PgToolRepository::new(pool, config.database.clone()))
    };

    let router = app(AppState::new(repository, config.query), &config.security);

    let bind_addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
