// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Logging setup: compact `LEVEL message` lines on stderr.
//!
//! The level is `debug` with `--verbose`, otherwise whatever `RACCOON_LOG`
//! names, otherwise `warn`.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

/// Environment variable holding the log level.
pub const LOG_ENV: &str = "RACCOON_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// The level to log at given the `--verbose` flag and the environment.
pub fn level_from(verbose: bool, env: Option<&str>) -> LogLevel {
    if verbose {
        return LogLevel::Debug;
    }
    env.and_then(LogLevel::parse).unwrap_or(LogLevel::Warn)
}

pub fn init(verbose: bool) {
    let env = std::env::var(LOG_ENV).ok();
    init_with_level(level_from(verbose, env.as_deref()));
}

pub fn init_with_level(level: LogLevel) {
    let filter = LevelFilter::from_level(level.into());

    let layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_filter(filter);

    // A second init (tests) keeps the first subscriber.
    let _ = Registry::default().with(layer).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_wins_over_environment() {
        assert_eq!(level_from(true, Some("error")), LogLevel::Debug);
    }

    #[test]
    fn environment_sets_the_level() {
        assert_eq!(level_from(false, Some("TRACE")), LogLevel::Trace);
        assert_eq!(level_from(false, Some("info")), LogLevel::Info);
    }

    #[test]
    fn unknown_or_missing_falls_back_to_warn() {
        assert_eq!(level_from(false, Some("loud")), LogLevel::Warn);
        assert_eq!(level_from(false, None), LogLevel::Warn);
    }
}
