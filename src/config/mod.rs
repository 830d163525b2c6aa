//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AppEnvironment, AuthConfig, DatabaseConfig, LogFormat, LoggingConfig, ServerConfig,
};
