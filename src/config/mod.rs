//! Application configuration
//!
//! Configuration is layered: `config/default.*`, then `config/local.*`,
//! then `APP__`-prefixed environment variables.

mod app_config;

pub use app_config::{
    AppConfig, Environment, LogFormat, LoggingConfig, ServerConfig, StorageBackend, StorageConfig,
};
