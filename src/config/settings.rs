//! Runtime settings read from environment variables.
//!
//! `.env` is loaded by the binary before this runs, so values may come from either
//! source. Every setting has a default; only malformed values are errors.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::core::ledger::{DEFAULT_MAX_LIST_LIMIT, LedgerSettings, NegativeStockPolicy};
use crate::errors::{Error, Result};

/// Default listen address for the HTTP API.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Default location of the movement type seed file.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Application configuration assembled at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Database connection URL (`DATABASE_URL`)
    pub database_url: String,
    /// HTTP listen address (`BIND_ADDR`)
    pub bind_addr: String,
    /// Path of the movement type seed file (`LEDGER_CONFIG_PATH`)
    pub config_path: String,
    /// Ledger behavior knobs
    pub ledger: LedgerSettings,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_list_limit = match lookup("LEDGER_MAX_LIST_LIMIT") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(Error::Config {
                        message: format!(
                            "LEDGER_MAX_LIST_LIMIT must be a positive integer, got '{raw}'"
                        ),
                    });
                }
            },
            None => DEFAULT_MAX_LIST_LIMIT,
        };

        let negative_stock = lookup("LEDGER_NEGATIVE_STOCK")
            .map(|raw| raw.parse::<NegativeStockPolicy>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            config_path: lookup("LEDGER_CONFIG_PATH")
                .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string()),
            ledger: LedgerSettings {
                negative_stock,
                max_list_limit,
            },
        })
    }
}
