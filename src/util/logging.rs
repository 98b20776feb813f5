//! Structured logging setup for toolscout
//!
//! Initialization and configuration for structured logging on the `tracing`
//! ecosystem. Output goes to stderr so resolution results on stdout stay
//! machine-readable, `RUST_LOG` directives are respected, and initialization
//! is idempotent.
//!
//! # Example
//!
//! ```no_run
//! use toolscout::util::logging;
//!
//! // Initialize from TOOLSCOUT_LOG_LEVEL / TOOLSCOUT_LOG_JSON
//! logging::init_from_env();
//!
//! use tracing::{debug, info};
//! info!("starting");
//! debug!(descriptor = "gcc", "loading descriptor");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's events
    pub level: Level,
    /// Emit JSON records instead of human-readable lines
    pub use_json: bool,
    /// Include the event's module path
    pub include_target: bool,
    /// Include source file and line number
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }
}

/// Initializes the global tracing subscriber.
///
/// Safe to call more than once; only the first call takes effect. `RUST_LOG`
/// directives are layered on top of the configured crate level.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env()
            .add_directive(format!("toolscout={}", config.level).parse().unwrap());

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}

/// Initializes logging with default settings.
pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initializes logging from `TOOLSCOUT_LOG_LEVEL` and `TOOLSCOUT_LOG_JSON`.
pub fn init_from_env() {
    let level = env::var("TOOLSCOUT_LOG_LEVEL")
        .map(|s| parse_level(&s))
        .unwrap_or(Level::INFO);
    let use_json = env::var("TOOLSCOUT_LOG_JSON")
        .map(|s| s.eq_ignore_ascii_case("true") || s == "1")
        .unwrap_or(false);

    init_logging(LoggingConfig {
        level,
        use_json,
        ..LoggingConfig::default()
    });
}

/// Parses a level name, falling back to INFO with a note on stderr.
pub fn parse_level(s: &str) -> Level {
    match s.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        other => {
            eprintln!("Unknown log level '{}', using 'info'", other);
            Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_accepts_all_names() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("info"), Level::INFO);
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
    }

    #[test]
    fn parse_level_falls_back_to_info() {
        assert_eq!(parse_level("chatty"), Level::INFO);
    }

    #[test]
    fn default_config_is_info_pretty() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.use_json);
        assert!(config.include_target);
    }

    #[test]
    fn with_level_overrides_only_level() {
        let config = LoggingConfig::with_level(Level::DEBUG);
        assert_eq!(config.level, Level::DEBUG);
        assert!(!config.use_json);
    }

    #[test]
    fn repeated_initialization_is_harmless() {
        init_default();
        init_default();
        init_logging(LoggingConfig::with_level(Level::TRACE));
    }
}
