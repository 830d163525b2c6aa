use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingConfig};

/// Build the level filter; `RUST_LOG` takes precedence over the configured level
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_from(env_directives.as_deref(), config)
}

/// Directives from the environment win when present and parseable; anything
/// else falls back to the configured level
fn filter_from(env_directives: Option<&str>, config: &LoggingConfig) -> EnvFilter {
    env_directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(&config.level))
}

pub fn init_logging(config: &LoggingConfig) {
    let filter = build_filter(config);

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .init();
        }
    }

    tracing::info!("Logging initialized with level: {}", config.level);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            format: LogFormat::Pretty,
        }
    }

    #[test]
    fn test_configured_level_without_env() {
        assert_eq!(filter_from(None, &config("debug")).to_string(), "debug");
        assert_eq!(filter_from(Some("  "), &config("warn")).to_string(), "warn");
    }

    #[test]
    fn test_env_directives_take_precedence() {
        let filter = filter_from(Some("token_auth=trace"), &config("info"));
        assert_eq!(filter.to_string(), "token_auth=trace");
    }

    #[test]
    fn test_unparseable_env_falls_back() {
        let filter = filter_from(Some("token_auth=notalevel"), &config("error"));
        assert_eq!(filter.to_string(), "error");
    }
}
