//! Serves the user and task collections over HTTP.
//!
//! Configuration is read from the environment (and an optional `.env` file);
//! see [`taskroster::config`] for the recognised variables. Log verbosity is
//! controlled through `RUST_LOG`.

use std::sync::Arc;

use taskroster::config::{AppConfig, ConfigurationError, StorageMode};
use taskroster::http::{AppState, build_router};
use taskroster::store::{build_pool, ensure_schema};
use taskroster::task::adapters::{
    memory::InMemoryTaskRepository, postgres::PostgresTaskRepository,
};
use taskroster::user::adapters::{
    memory::InMemoryUserRepository, postgres::PostgresUserRepository,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "taskroster=info,tower_http=debug";

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort start-up.
#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration failed: {0}")]
    Config(#[from] ConfigurationError),
    #[error("database pool failed: {0}")]
    Pool(#[source] diesel::r2d2::PoolError),
    #[error("schema bootstrap failed: {0}")]
    Schema(#[source] BoxError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        return Err(err.into());
    }
    init_tracing();

    run().await.map_err(|err| {
        error!(error = %err, "taskroster stopped");
        err.into()
    })
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;
    let state = build_state(&config).await?;

    let addr = config.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;
    info!(%addr, storage = %config.storage, "listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;
    info!("shutdown complete");
    Ok(())
}

async fn build_state(config: &AppConfig) -> Result<AppState, StartupError> {
    let StorageMode::Postgres = config.storage else {
        return Ok(AppState::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryTaskRepository::new()),
        ));
    };
    let database_url = config
        .database_url
        .clone()
        .ok_or(ConfigurationError::Missing {
            variable: "DATABASE_URL",
            mode: config.storage,
        })?;

    let pool = build_pool(&database_url, config.pool_size).map_err(StartupError::Pool)?;
    let schema_pool = pool.clone();
    tokio::task::spawn_blocking(move || -> Result<(), BoxError> {
        let mut connection = schema_pool.get()?;
        ensure_schema(&mut connection)?;
        Ok(())
    })
    .await
    .map_err(|err| StartupError::Schema(err.into()))?
    .map_err(StartupError::Schema)?;

    Ok(AppState::new(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresTaskRepository::new(pool)),
    ))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c; shutting down");
    }
}
