pub mod config;
pub mod observability;

pub use config::{AppConfig, ConfigError, LogFormat};
