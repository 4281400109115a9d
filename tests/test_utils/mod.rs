//! Test utilities for database testing.
//!
//! This module provides utilities for setting up in-memory SQLite databases
//! with migrations for testing purposes.

use anyhow::Result;
use gharchive_days::aggregation::DayDocument;
use gharchive_days::models::NormalizedRow;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// The pool is capped at one connection; every new SQLite memory connection
/// would otherwise open its own empty database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1);
    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Sets up an in-memory SQLite database with all migrations applied and returns an Arc.
#[allow(dead_code)]
pub async fn setup_test_db_arc() -> Result<Arc<DatabaseConnection>> {
    let db = setup_test_db().await?;
    Ok(Arc::new(db))
}

/// Builds a document with `count` watch rows for `date`.
#[allow(dead_code)]
pub fn sample_document(date: &str, id: u32, count: usize) -> DayDocument {
    let registers = (0..count)
        .map(|i| NormalizedRow {
            created_at: format!("{date}T10:{i:02}:00Z"),
            kind: "WatchEvent".to_string(),
            actor_login: Some(format!("user{i}")),
            actor_id: Some(i as i64),
            repo_name: Some("octo/repo".to_string()),
            repo_id: Some(7),
            ..Default::default()
        })
        .collect();

    DayDocument {
        date: date.to_string(),
        dia: "Jueves".to_string(),
        id,
        registers,
    }
}
