use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// # Log Level
///
/// Numeric severity scale shared by every sink of `LoggerLocal`.
/// `Silly` (0) is the most verbose, `Fatal` (6) the most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Silly = 0,
    Trace = 1,
    Debug = 2,
    Info = 3,
    Warn = 4,
    Error = 5,
    Fatal = 6,
}

impl LogLevel {
    /// All levels from the given one up to `Fatal`, as numeric values.
    ///
    /// Used to build the level lists of `LoggerLocalOptions` from a minimum
    /// threshold such as the CLI's `--log-level`.
    pub fn and_above(self) -> Vec<i64> {
        (self as i64..=LogLevel::Fatal as i64).collect()
    }

    /// Maps a numeric level back to a `LogLevel`. Out-of-range values clamp.
    pub fn from_i64(level: i64) -> Self {
        match level {
            i64::MIN..=0 => LogLevel::Silly,
            1 => LogLevel::Trace,
            2 => LogLevel::Debug,
            3 => LogLevel::Info,
            4 => LogLevel::Warn,
            5 => LogLevel::Error,
            _ => LogLevel::Fatal,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Silly => "silly",
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "silly" => Ok(LogLevel::Silly),
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// # Logrecord
///
/// A single log entry as produced by `LoggerLocal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logrecord {
    /// The severity level of the log (0 for Silly up to 6 for Fatal).
    pub loglevel: i64,
    /// Name of the application that emitted the record.
    pub app: String,
    /// The message text.
    pub message: String,
    /// Flexible JSON value for arbitrary tags or additional metadata.
    pub tags: Value,
    /// RFC 3339 / RFC 9557 compatible UTC timestamp.
    pub rfc9557: String,
}

impl Default for Logrecord {
    /// Creates an empty record stamped with the current UTC time.
    fn default() -> Self {
        Self {
            loglevel: 0,
            app: String::new(),
            message: String::new(),
            tags: serde_json::json!([]),
            rfc9557: current_datetime_rfc9557(),
        }
    }
}

impl Logrecord {
    /// Returns `true` when extra tags were attached to the record.
    pub fn has_tags(&self) -> bool {
        self.tags != serde_json::json!([]) && !self.tags.is_null()
    }
}

/// Current UTC time with millisecond precision, e.g. `2024-12-22T09:15:02.114Z`.
pub fn current_datetime_rfc9557() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
