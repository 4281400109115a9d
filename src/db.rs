//! Document store connection.
//!
//! Opens a SeaORM pool for `GHDAYS_DATABASE_URL` and brings the
//! `day_documents` schema up to date through the `migration` crate.

use std::time::Duration;

use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::{info, warn};

use crate::config::AppConfig;

const MAX_CONNECT_ATTEMPTS: u32 = 5;
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(100);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("document store unreachable after {attempts} attempts: {source}")]
    Unreachable {
        attempts: u32,
        source: sea_orm::DbErr,
    },
    #[error("invalid document store configuration: {message}")]
    InvalidConfiguration { message: String },
}

fn connect_options(cfg: &AppConfig) -> Result<ConnectOptions, DatabaseError> {
    if cfg.database_url.trim().is_empty() {
        return Err(DatabaseError::InvalidConfiguration {
            message: "database url is empty".to_string(),
        });
    }

    let mut options = ConnectOptions::new(cfg.database_url.clone());
    options
        .max_connections(cfg.db_max_connections)
        .acquire_timeout(Duration::from_millis(cfg.db_acquire_timeout_ms))
        .idle_timeout(IDLE_TIMEOUT)
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);
    Ok(options)
}

/// Opens the connection pool, retrying transient failures with doubling delays.
///
/// # Examples
///
/// ```no_run
/// use gharchive_days::{config::AppConfig, db::init_pool};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = AppConfig {
///         database_url: "sqlite::memory:".to_string(),
///         ..AppConfig::default()
///     };
///     let db = init_pool(&config).await?;
///     Ok(())
/// }
/// ```
pub async fn init_pool(cfg: &AppConfig) -> Result<DatabaseConnection> {
    let options = connect_options(cfg)?;
    let mut delay = INITIAL_RETRY_DELAY;
    let mut attempt = 1;

    loop {
        match Database::connect(options.clone()).await {
            Ok(conn) => {
                info!(attempt, "Connected to document store");
                return Ok(conn);
            }
            Err(source) if attempt >= MAX_CONNECT_ATTEMPTS => {
                return Err(DatabaseError::Unreachable {
                    attempts: attempt,
                    source,
                }
                .into());
            }
            Err(err) => {
                warn!(attempt, error = %err, retry_in_ms = delay.as_millis() as u64, "Document store connection failed");
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
        }
    }
}

/// Applies all pending migrations.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .context("applying day_documents migrations")
}

/// Connects and brings the schema up to date.
pub async fn connect_and_migrate(cfg: &AppConfig) -> Result<DatabaseConnection> {
    let db = init_pool(cfg).await?;
    run_migrations(&db).await?;
    Ok(db)
}

/// Round-trips `SELECT 1`.
pub async fn health_check(db: &DatabaseConnection) -> Result<()> {
    let probe = Statement::from_string(db.get_database_backend(), "SELECT 1");
    db.query_one(probe)
        .await
        .context("document store health check failed")?;
    Ok(())
}
