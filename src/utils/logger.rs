//! Logging utilities
//!
//! Log output goes to stderr so stdout carries only the run report.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log level configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Pick the level from CLI flags, falling back to `Warn`
    pub fn resolve(explicit: Option<&str>, verbose: bool) -> Self {
        if let Some(level) = explicit.and_then(LogLevel::from_str) {
            return level;
        }
        if verbose {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        }
    }
}

/// Build the filter for `level`.
///
/// A plain level applies to this crate only; anything else is treated as a
/// full `RUST_LOG`-style directive string.
pub fn build_filter(level: LogLevel, directives: Option<&str>) -> EnvFilter {
    match directives.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) if LogLevel::from_str(d).is_none() => {
            EnvFilter::try_new(d).unwrap_or_else(|_| crate_filter(level))
        }
        Some(d) => crate_filter(LogLevel::from_str(d).unwrap_or(level)),
        None => crate_filter(level),
    }
}

fn crate_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::new(format!("feature_dispatch={}", level.to_tracing_level()))
}

/// Initialize the logger
pub fn init_logger(level: LogLevel, directives: Option<&str>) {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level, directives))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!(LogLevel::from_str("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_str("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_str("unknown"), None);
    }

    #[test]
    fn test_resolve_prefers_explicit_level() {
        assert_eq!(LogLevel::resolve(Some("error"), true), LogLevel::Error);
        assert_eq!(LogLevel::resolve(None, true), LogLevel::Debug);
        assert_eq!(LogLevel::resolve(Some("bogus"), false), LogLevel::Warn);
    }

    #[test]
    fn test_build_filter() {
        let plain = build_filter(LogLevel::Info, None).to_string();
        assert_eq!(plain, "feature_dispatch=info");

        let from_level = build_filter(LogLevel::Warn, Some("trace")).to_string();
        assert_eq!(from_level, "feature_dispatch=trace");

        let directive = build_filter(LogLevel::Warn, Some("tokio=debug")).to_string();
        assert_eq!(directive, "tokio=debug");
    }
}
