use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::infra::repositories::{
    memory_store::InMemoryStore,
    sqlite_booking_repo::SqliteBookingRepo,
    sqlite_session_repo::SqliteSessionRepo,
    sqlite_user_repo::SqliteUserRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    if config.uses_memory_store() {
        info!("Initializing in-memory store (data is lost on restart)...");
        let store = Arc::new(InMemoryStore::new());
        return AppState::new(config.clone(), store.clone(), store.clone(), store);
    }

    info!("Initializing SQLite connection with WAL Mode...");

    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .expect("Invalid SQLite connection string")
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(config.storage_timeout_ms))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_millis(config.storage_timeout_ms))
        .connect_with(opts)
        .await
        .expect("Failed to connect to SQLite");

    run_sqlite_migrations(&pool).await;

    sqlite_state(config, pool)
}

/// Wires the SQLite repositories onto an already-migrated pool.
pub fn sqlite_state(config: &Config, pool: SqlitePool) -> AppState {
    AppState::new(
        config.clone(),
        Arc::new(SqliteSessionRepo::new(pool.clone())),
        Arc::new(SqliteBookingRepo::new(pool.clone())),
        Arc::new(SqliteUserRepo::new(pool)),
    )
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
