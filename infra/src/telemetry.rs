//! Tracing subscriber setup for the lending binaries

use lending_shared::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

use crate::InfrastructureError;

/// Install the global subscriber described by `config`
///
/// `RUST_LOG`, when set, overrides the configured level.
pub fn init(config: &LoggingConfig) -> Result<(), InfrastructureError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_filter(&config.level)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.colored)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    installed.map_err(|e| InfrastructureError::Telemetry(e.to_string()))
}

/// Parse a level or directive list such as `info,sqlx=warn`
pub fn parse_filter(directives: &str) -> Result<EnvFilter, InfrastructureError> {
    EnvFilter::try_new(directives).map_err(|e| {
        InfrastructureError::Telemetry(format!("Invalid log filter '{}': {}", directives, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter_accepts_levels_and_directives() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("debug,sqlx=warn,lending_core=trace").is_ok());
    }

    #[test]
    fn test_parse_filter_rejects_garbage() {
        let result = parse_filter("lending_core=loud");
        assert!(matches!(result, Err(InfrastructureError::Telemetry(_))));
    }
}
