//! tracing subscriber setup
//!
//! the library only emits `tracing` events; whoever runs it decides level,
//! format and destination by installing a subscriber here.

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::error::{Error, Result};

/// environment variable holding an `EnvFilter` directive, overriding everything else
pub const LOG_ENV: &str = "BENCH_LOG";

/// logging configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// trace, debug, info, warn, error, off
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// install the global subscriber, writing to stderr
///
/// priority: `BENCH_LOG`, then `verbose` (info), then `config.level`.
pub fn init_logging(config: &LogConfig, verbose: bool) -> Result<()> {
    let filter = build_filter(config, verbose, std::env::var(LOG_ENV).ok().as_deref())?;
    let base = Registry::default().with(filter);

    let installed = match config.format {
        LogFormat::Json => base
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => base
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    installed.map_err(|e| Error::Logging(e.to_string()))
}

fn build_filter(config: &LogConfig, verbose: bool, env: Option<&str>) -> Result<EnvFilter> {
    if let Some(directive) = env.filter(|d| !d.trim().is_empty()) {
        return EnvFilter::try_new(directive)
            .map_err(|e| Error::Logging(format!("invalid {}: {}", LOG_ENV, e)));
    }

    let level = if verbose {
        LevelFilter::INFO
    } else {
        parse_level(&config.level)?
    };
    EnvFilter::try_new(level.to_string()).map_err(|e| Error::Logging(e.to_string()))
}

/// parse a level name
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" | "warning" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        "off" => Ok(LevelFilter::OFF),
        _ => Err(Error::InvalidConfigValue {
            key: "log.level",
            value: level.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("info").unwrap(), LevelFilter::INFO);
        assert_eq!(parse_level(" WARN ").unwrap(), LevelFilter::WARN);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::OFF);
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn test_build_filter_priority() {
        let config = LogConfig {
            level: "error".to_string(),
            ..LogConfig::default()
        };

        let from_config = build_filter(&config, false, None).unwrap();
        assert_eq!(from_config.max_level_hint(), Some(LevelFilter::ERROR));

        let verbose = build_filter(&config, true, None).unwrap();
        assert_eq!(verbose.max_level_hint(), Some(LevelFilter::INFO));

        let env = build_filter(&config, true, Some("debug")).unwrap();
        assert_eq!(env.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_build_filter_bad_level() {
        let config = LogConfig {
            level: "chatty".to_string(),
            ..LogConfig::default()
        };
        assert!(build_filter(&config, false, None).is_err());
        // verbose does not look at the configured level
        assert!(build_filter(&config, true, None).is_ok());
    }
}
