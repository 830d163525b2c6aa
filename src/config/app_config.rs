use std::net::SocketAddr;

use chrono::Duration;
use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::auth::{
    DEFAULT_TOKEN_LIFETIME_HOURS, JwtConfig, MAX_TOKEN_LIFETIME_HOURS, SigningAlgorithm,
};
use crate::infrastructure::storage::{PostgresConfig, RetryPolicy};

/// Secrets that ship in examples and must never sign production tokens
const PLACEHOLDER_SECRETS: &[&str] = &["secret", "changeme", "change-me", "change-me-in-production"];

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: AppEnvironment,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Deployment environment the process runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    #[serde(alias = "dev")]
    Development,
    Test,
    #[default]
    #[serde(alias = "prod")]
    Production,
}

impl AppEnvironment {
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Token signing settings as read from configuration sources
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default = "default_token_lifetime_hours")]
    pub token_lifetime_hours: u64,
    #[serde(default)]
    pub algorithm: SigningAlgorithm,
}

fn default_token_lifetime_hours() -> u64 {
    DEFAULT_TOKEN_LIFETIME_HOURS
}

/// Optional PostgreSQL user directory; the in-memory directory is used when
/// no URL is set
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_ping_retries")]
    pub ping_retries: u32,
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_ping_retries() -> u32 {
    3
}

fn default_ping_interval_secs() -> u64 {
    4
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
            ping_retries: default_ping_retries(),
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "[hidden]"))
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("ping_retries", &self.ping_retries)
            .field("ping_interval_secs", &self.ping_interval_secs)
            .finish()
    }
}

impl DatabaseConfig {
    /// Connection settings, or `None` when no database is configured
    pub fn postgres_config(&self) -> Option<PostgresConfig> {
        let url = self.url.as_deref().map(str::trim).filter(|s| !s.is_empty())?;

        Some(PostgresConfig {
            url: url.to_string(),
            max_connections: self.max_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            retry: RetryPolicy::new(
                self.ping_retries,
                std::time::Duration::from_secs(self.ping_interval_secs),
            ),
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            token_lifetime_hours: DEFAULT_TOKEN_LIFETIME_HOURS,
            algorithm: SigningAlgorithm::default(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &self.secret.as_ref().map(|_| "[hidden]"))
            .field("token_lifetime_hours", &self.token_lifetime_hours)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, DomainError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| DomainError::configuration(format!("Invalid server address: {}", e)))
    }
}

impl AuthConfig {
    /// Build signing configuration, refusing unset or placeholder secrets.
    ///
    /// Placeholders are tolerated (with a warning) only in development.
    pub fn jwt_config(&self, environment: AppEnvironment) -> Result<JwtConfig, DomainError> {
        let secret = self
            .secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                DomainError::configuration(
                    "Auth secret is not set. Provide AUTH_SECRET or APP__AUTH__SECRET",
                )
            })?;

        if PLACEHOLDER_SECRETS.contains(&secret.to_ascii_lowercase().as_str()) {
            if !environment.is_development() {
                return Err(DomainError::configuration(format!(
                    "Auth secret is a placeholder value; refusing to start in {} environment",
                    environment.as_str()
                )));
            }

            tracing::warn!("Using a placeholder auth secret; acceptable in development only");
        }

        if self.token_lifetime_hours == 0 {
            return Err(DomainError::configuration("Token lifetime must be at least one hour"));
        }

        if self.token_lifetime_hours > MAX_TOKEN_LIFETIME_HOURS {
            return Err(DomainError::configuration(format!(
                "Token lifetime of {} hours exceeds the maximum of {} hours",
                self.token_lifetime_hours, MAX_TOKEN_LIFETIME_HOURS
            )));
        }

        let token_lifetime = i64::try_from(self.token_lifetime_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| DomainError::configuration("Token lifetime is too large"))?;

        Ok(JwtConfig::new(secret, token_lifetime).with_algorithm(self.algorithm))
    }
}

impl AppConfig {
    /// Load from `config/default`, `config/local`, `APP__*` variables and the
    /// plain `ENV`, `PORT`, `AUTH_SECRET`, `DATABASE_URL`, `DB_PING_RETRIES`
    /// and `DB_PING_INTERVAL_SECS` variables, in increasing priority
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("environment", std::env::var("ENV").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("auth.secret", std::env::var("AUTH_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option(
                "database.ping_retries",
                std::env::var("DB_PING_RETRIES").ok(),
            )?
            .set_override_option(
                "database.ping_interval_secs",
                std::env::var("DB_PING_INTERVAL_SECS").ok(),
            )?
            .build()?;

        Self::from_config(config)
    }

    pub fn from_config(config: config::Config) -> Result<Self, config::ConfigError> {
        config.try_deserialize()
    }
}
