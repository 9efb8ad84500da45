//! Daemon configuration resolved from `PAYABLES_*` environment variables

use payables_api_rpc::server::{DEFAULT_RPC_HOST, DEFAULT_RPC_PORT};
use payables_core::application::worker::constants::{
    DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_WORKER_ACTOR,
};
use payables_core::error::{AppError, Result};
use std::str::FromStr;

pub const DEFAULT_DB_PATH: &str = "~/.payables/payables.db";
pub const DEFAULT_ACTOR: &str = "api";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(AppError::Config(format!(
                "PAYABLES_LOG_FORMAT must be 'pretty' or 'json' (got {})",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// SQLite file, tilde-expanded
    pub db_path: String,
    pub rpc_host: String,
    pub rpc_port: u16,
    /// Author of synchronous writes
    pub actor: String,
    /// Author of batch-ingested rows
    pub worker_actor: String,
    pub retry_base_delay_ms: i64,
    pub log_format: LogFormat,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("PAYABLES_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        Ok(Self {
            db_path: shellexpand::tilde(&db_path).into_owned(),
            rpc_host: lookup("PAYABLES_RPC_HOST").unwrap_or_else(|| DEFAULT_RPC_HOST.to_string()),
            rpc_port: parse_or(&lookup, "PAYABLES_RPC_PORT", DEFAULT_RPC_PORT)?,
            actor: lookup("PAYABLES_ACTOR").unwrap_or_else(|| DEFAULT_ACTOR.to_string()),
            worker_actor: lookup("PAYABLES_WORKER_ACTOR")
                .unwrap_or_else(|| DEFAULT_WORKER_ACTOR.to_string()),
            retry_base_delay_ms: parse_or(
                &lookup,
                "PAYABLES_RETRY_BASE_DELAY_MS",
                DEFAULT_RETRY_BASE_DELAY_MS,
            )?,
            log_format: parse_or(&lookup, "PAYABLES_LOG_FORMAT", LogFormat::Pretty)?,
        })
    }

    /// sqlx connection URL for `db_path`
    pub fn database_url(&self) -> String {
        if self.db_path.starts_with("sqlite:") {
            self.db_path.clone()
        } else {
            format!("sqlite://{}", self.db_path)
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("invalid {} value {:?}: {}", key, raw, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<DaemonConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DaemonConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert!(config.db_path.ends_with(".payables/payables.db"));
        assert!(!config.db_path.starts_with('~'));
        assert_eq!(config.rpc_host, "127.0.0.1");
        assert_eq!(config.rpc_port, 9630);
        assert_eq!(config.actor, "api");
        assert_eq!(config.worker_actor, "batch-worker");
        assert_eq!(config.retry_base_delay_ms, 1_000);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PAYABLES_DB_PATH", "/tmp/p.db"),
            ("PAYABLES_RPC_PORT", "9000"),
            ("PAYABLES_ACTOR", "ops"),
            ("PAYABLES_RETRY_BASE_DELAY_MS", "250"),
            ("PAYABLES_LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.database_url(), "sqlite:///tmp/p.db");
        assert_eq!(config.rpc_port, 9000);
        assert_eq!(config.actor, "ops");
        assert_eq!(config.retry_base_delay_ms, 250);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let err = config(&[("PAYABLES_RPC_PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("PAYABLES_RPC_PORT")));
    }

    #[test]
    fn test_invalid_log_format() {
        assert!(config(&[("PAYABLES_LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn test_sqlite_url_passes_through() {
        let config = config(&[("PAYABLES_DB_PATH", "sqlite::memory:")]).unwrap();
        assert_eq!(config.database_url(), "sqlite::memory:");
    }
}
