use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub storage_timeout_ms: u64,
    pub reconcile_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://session_booking.db".to_string()),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            storage_timeout_ms: env::var("STORAGE_TIMEOUT_MS").unwrap_or_else(|_| "5000".to_string()).parse().expect("STORAGE_TIMEOUT_MS must be a number"),
            reconcile_interval_secs: env::var("RECONCILE_INTERVAL_SECS").unwrap_or_else(|_| "300".to_string()).parse().expect("RECONCILE_INTERVAL_SECS must be a number"),
        }
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == "memory"
    }

    pub fn ledger_options(&self) -> LedgerOptions {
        LedgerOptions {
            storage_timeout: Duration::from_millis(self.storage_timeout_ms),
        }
    }
}

/// Bounds applied by the booking ledger to every storage round trip.
#[derive(Clone, Copy, Debug)]
pub struct LedgerOptions {
    pub storage_timeout: Duration,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            storage_timeout: Duration::from_secs(5),
        }
    }
}
