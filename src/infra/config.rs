//! Centralized configuration (environment variables + defaults).

use crate::domain::DEFAULT_LOW_STOCK_FALLBACK;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Database URL must be provided (no default) for safety.
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    /// Interval between keep-alive comments on push connections.
    pub keep_alive: Duration,
    /// Dashboard low-stock threshold for items without a reorder point.
    pub low_stock_fallback: f64,
    pub frontend_build_dir: PathBuf,
    pub seed_catalogs: bool,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let port = parse_or(&get, "PORT", 5000u16)?;
        let db_max_connections = parse_or(&get, "DB_MAX_CONNECTIONS", 5u32)?.max(1);
        let keep_alive_secs = parse_or(&get, "SSE_KEEP_ALIVE_SECS", 20u64)?;
        if keep_alive_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "SSE_KEEP_ALIVE_SECS",
                reason: "must be at least 1".to_string(),
            });
        }
        let low_stock_fallback = parse_or(&get, "LOW_STOCK_FALLBACK", DEFAULT_LOW_STOCK_FALLBACK)?;
        if !low_stock_fallback.is_finite() || low_stock_fallback < 0.0 {
            return Err(ConfigError::Invalid {
                var: "LOW_STOCK_FALLBACK",
                reason: "must be a non-negative number".to_string(),
            });
        }
        let frontend_build_dir = get("FRONTEND_BUILD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("frontend/build"));
        let seed_catalogs = parse_bool(&get, "SEED_CATALOGS")?;
        let log_format = match get("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("pretty") | Some("text") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    reason: format!("expected 'json' or 'pretty', got '{}'", other),
                })
            }
        };

        Ok(Self {
            database_url,
            port,
            db_max_connections,
            keep_alive: Duration::from_secs(keep_alive_secs),
            low_stock_fallback,
            frontend_build_dir,
            seed_catalogs,
            log_format,
        })
    }
}

fn parse_or<G, T>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(var) {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
            var,
            reason: format!("'{}': {}", raw, e),
        }),
    }
}

fn parse_bool<G>(get: &G, var: &'static str) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(var).map(|v| v.to_ascii_lowercase()).as_deref() {
        None | Some("false") | Some("0") | Some("no") => Ok(false),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some(other) => Err(ConfigError::Invalid {
            var,
            reason: format!("expected a boolean, got '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/inventory")]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.keep_alive, Duration::from_secs(20));
        assert_eq!(config.low_stock_fallback, 10.0);
        assert_eq!(config.frontend_build_dir, PathBuf::from("frontend/build"));
        assert!(!config.seed_catalogs);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn database_url_is_required() {
        assert_eq!(load(&[]), Err(ConfigError::Missing("DATABASE_URL")));
        assert_eq!(
            load(&[("DATABASE_URL", "  ")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("DATABASE_URL", "postgres://db/inv"),
            ("PORT", "8080"),
            ("SSE_KEEP_ALIVE_SECS", "5"),
            ("LOW_STOCK_FALLBACK", "2.5"),
            ("SEED_CATALOGS", "TRUE"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.keep_alive, Duration::from_secs(5));
        assert_eq!(config.low_stock_fallback, 2.5);
        assert!(config.seed_catalogs);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = load(&[("DATABASE_URL", "x"), ("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));

        let err = load(&[("DATABASE_URL", "x"), ("SSE_KEEP_ALIVE_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "SSE_KEEP_ALIVE_SECS", .. }));
    }
}
