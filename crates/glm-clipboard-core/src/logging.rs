//! Structured logging configuration.
//!
//! Uses `tracing` with `tracing-subscriber`. Output always goes to stderr:
//! the hook bridge writes the rewritten message to stdout.
//!
//! ## Environment Variables
//!
//! - `GLM_CLIPBOARD_LOG` or `RUST_LOG`: Set log level (e.g., `debug`, `glm_clipboard_core=debug,warn`)
//! - `GLM_CLIPBOARD_LOG_FORMAT`: Set output format (`pretty`, `compact`, `json`)
//!
//! ## Examples
//!
//! ```bash
//! # Trace every sweep and persisted file
//! GLM_CLIPBOARD_LOG=glm_clipboard_core=debug glm-clipboard-hook < message.json
//!
//! # JSON output for log aggregation
//! GLM_CLIPBOARD_LOG_FORMAT=json glm-clipboard-hook < message.json
//! ```

use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

pub const LOG_ENV: &str = "GLM_CLIPBOARD_LOG";
pub const LOG_FORMAT_ENV: &str = "GLM_CLIPBOARD_LOG_FORMAT";

const DEFAULT_FILTER: &str = "glm_clipboard=info,opencode_glm_clipboard=info,warn";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable with colors and indentation
    #[default]
    Pretty,
    /// Compact single-line output
    Compact,
    /// JSON output for log aggregation
    Json,
}

impl LogFormat {
    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log filter directive (e.g., "debug", "glm_clipboard_core=debug,warn")
    pub filter: String,
    /// Output format
    pub format: LogFormat,
    /// Include file/line in logs
    pub with_file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Pretty,
            with_file: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let filter = lookup(LOG_ENV)
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let format = lookup(LOG_FORMAT_ENV)
            .map(|s| LogFormat::parse(&s))
            .unwrap_or_default();

        Self {
            filter,
            format,
            ..Default::default()
        }
    }

    /// Create a debug configuration
    pub fn debug() -> Self {
        Self {
            filter: "glm_clipboard=debug,opencode_glm_clipboard=debug,info".to_string(),
            with_file: true,
            ..Default::default()
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// This should be called once at the start of the program.
/// Subsequent calls will be ignored.
pub fn init(config: LogConfig) {
    let env_filter =
        EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.with_file)
        .with_line_number(config.with_file);
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(layer).with(env_filter);
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Initialize logging with environment-based configuration.
pub fn init_from_env() {
    init(LogConfig::from_env());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("unknown"), LogFormat::Pretty);
    }

    #[test]
    fn test_config_from_lookup_defaults() {
        let config = LogConfig::from_lookup(|_| None);
        assert_eq!(config.filter, DEFAULT_FILTER);
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn test_own_variable_wins_over_rust_log() {
        let config = LogConfig::from_lookup(|key| match key {
            LOG_ENV => Some("glm_clipboard_core=trace".to_string()),
            "RUST_LOG" => Some("error".to_string()),
            LOG_FORMAT_ENV => Some("json".to_string()),
            _ => None,
        });
        assert_eq!(config.filter, "glm_clipboard_core=trace");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_debug_config() {
        let config = LogConfig::debug();
        assert!(config.filter.contains("debug"));
        assert!(config.with_file);
    }
}
