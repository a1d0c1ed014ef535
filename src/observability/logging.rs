//! Logging configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Filter directive used when neither `LITESTORE_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "warn";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable multi-line output.
    #[default]
    Pretty,
}

impl LogFormat {
    /// Returns the format name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }

    /// Parses a format name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" | "text" => Some(Self::Pretty),
            _ => None,
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s).ok_or_else(|| crate::Error::Config(format!("unknown log format '{s}'")))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `litestore=debug`.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
    /// Append to this file instead of writing to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Builds a configuration from the process environment.
    ///
    /// | Variable | Effect |
    /// |----------|--------|
    /// | `LITESTORE_LOG` | filter directive (wins over `RUST_LOG`) |
    /// | `RUST_LOG` | filter directive |
    /// | `LITESTORE_LOG_FORMAT` | `json` or `pretty` |
    /// | `LITESTORE_LOG_FILE` | log file path |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let filter = non_empty("LITESTORE_LOG")
            .or_else(|| non_empty("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let format = match non_empty("LITESTORE_LOG_FORMAT") {
            Some(raw) => LogFormat::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "ignoring invalid LITESTORE_LOG_FORMAT");
                LogFormat::default()
            }),
            None => LogFormat::default(),
        };

        Self {
            filter,
            format,
            file: non_empty("LITESTORE_LOG_FILE").map(PathBuf::from),
        }
    }

    /// Sets the filter directive.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Sets the output format.
    #[must_use]
    pub const fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the log file.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test_case("json", Some(LogFormat::Json) ; "json")]
    #[test_case(" PRETTY ", Some(LogFormat::Pretty) ; "padded upper")]
    #[test_case("text", Some(LogFormat::Pretty) ; "text alias")]
    #[test_case("xml", None ; "unknown")]
    fn test_log_format_parse(input: &str, expected: Option<LogFormat>) {
        assert_eq!(LogFormat::parse(input), expected);
    }

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::from_lookup(lookup(&[]));
        assert_eq!(config, LoggingConfig::default());
        assert_eq!(config.filter, "warn");
    }

    #[test]
    fn test_litestore_log_wins() {
        let config = LoggingConfig::from_lookup(lookup(&[
            ("RUST_LOG", "info"),
            ("LITESTORE_LOG", "litestore=debug"),
        ]));
        assert_eq!(config.filter, "litestore=debug");

        let config = LoggingConfig::from_lookup(lookup(&[("RUST_LOG", "info")]));
        assert_eq!(config.filter, "info");
    }

    #[test]
    fn test_format_and_file() {
        let config = LoggingConfig::from_lookup(lookup(&[
            ("LITESTORE_LOG_FORMAT", "json"),
            ("LITESTORE_LOG_FILE", "/tmp/litestore.log"),
        ]));
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/litestore.log")));
    }

    #[test]
    fn test_invalid_format_falls_back() {
        let config = LoggingConfig::from_lookup(lookup(&[("LITESTORE_LOG_FORMAT", "xml")]));
        assert_eq!(config.format, LogFormat::Pretty);
    }
}
