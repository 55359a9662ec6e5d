//! Log setup for the rating engine and its HTTP/CLI front end.
//!
//! `APP_LOG_LEVEL` may be a bare level (`debug`) or a full directive list. A
//! bare level applies to the engine crates only; dependencies such as hyper
//! stay at `warn` so rate-resolution traces are not drowned out.

use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

const ENGINE_TARGETS: [&str; 2] = ["premium_engine", "premium_engine_api"];
const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("APP_LOG_LEVEL '{value}' is not a valid log filter")]
    InvalidFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("rating engine logging was already initialised: {0}")]
    AlreadyInstalled(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Installs the global fmt subscriber. `RUST_LOG` wins over `APP_LOG_LEVEL`.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => engine_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}

fn engine_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    let directives = scoped_directives(log_level);
    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::InvalidFilter {
        value: log_level.to_string(),
        source,
    })
}

fn scoped_directives(log_level: &str) -> String {
    let level = log_level.trim().to_ascii_lowercase();
    if !LEVELS.contains(&level.as_str()) {
        return log_level.to_string();
    }
    let mut directives = String::from("warn");
    for target in ENGINE_TARGETS {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_is_scoped_to_engine_crates() {
        assert_eq!(
            scoped_directives("DEBUG"),
            "warn,premium_engine=debug,premium_engine_api=debug"
        );
        assert!(engine_filter("info").is_ok());
    }

    #[test]
    fn directive_lists_pass_through() {
        assert_eq!(
            scoped_directives("info,premium_engine::rating=trace"),
            "info,premium_engine::rating=trace"
        );
        assert!(engine_filter("info,premium_engine::rating=trace").is_ok());
    }

    #[test]
    fn malformed_filter_names_the_setting() {
        let err = engine_filter("premium_engine=loud").expect_err("unknown level");
        assert!(matches!(&err, TelemetryError::InvalidFilter { value, .. } if value == "premium_engine=loud"));
        assert_eq!(
            err.to_string(),
            "APP_LOG_LEVEL 'premium_engine=loud' is not a valid log filter"
        );
    }
}
