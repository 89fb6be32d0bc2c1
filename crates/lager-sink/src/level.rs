// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Severity of a structured log record.
//!
//! Levels are carried as their raw ordinal so that values produced by a newer
//! facade (outside the four known levels) survive the trip to the event and
//! render as `"UNKNOWN"` instead of failing.
//!
//! # Ordering
//!
//! ```text
//! DEBUG (0) < INFO (1) < ERROR (2) < FATAL (3)
//! ```
//!
//! Filtering compares raw ordinals, so unknown values order naturally against
//! the known ones.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::error;

/// Log level of a record, stored as the facade's raw ordinal.
///
/// ```
/// use lager_sink::level::LogLevel;
/// use std::str::FromStr;
///
/// assert!(LogLevel::DEBUG < LogLevel::ERROR);
/// assert_eq!(LogLevel::from_str("fatal").unwrap(), LogLevel::FATAL);
/// assert_eq!(LogLevel::from_raw(42).as_str(), "UNKNOWN");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct LogLevel(i32);

impl LogLevel {
    /// Lower priority information useful while debugging.
    pub const DEBUG: LogLevel = LogLevel(0);
    /// Useful information about normal operations.
    pub const INFO: LogLevel = LogLevel(1);
    /// Errors the application recovered from.
    pub const ERROR: LogLevel = LogLevel(2);
    /// Errors the application cannot recover from.
    pub const FATAL: LogLevel = LogLevel(3);

    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        LogLevel(raw)
    }

    /// Raw ordinal, forwarded as `lager_log_level_iota`.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Uppercase rendering, forwarded as `lager_log_level`.
    ///
    /// Any ordinal outside the four known levels renders as `"UNKNOWN"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self.0 {
            0 => "DEBUG",
            1 => "INFO",
            2 => "ERROR",
            3 => "FATAL",
            _ => "UNKNOWN",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for LogLevel {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Case-insensitive parsing of the four known level names.
impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(LogLevel::DEBUG),
            "info" => Ok(LogLevel::INFO),
            "error" => Ok(LogLevel::ERROR),
            "fatal" => Ok(LogLevel::FATAL),
            _ => Err(format!(
                "Invalid log level: '{s}'. Valid levels are: debug, info, error, fatal",
            )),
        }
    }
}

/// Accepts either a level name or a raw ordinal.
///
/// Invalid names are logged and fall back to `DEBUG`, so a bad configuration
/// value never stops the sink from starting.
impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        match value {
            Value::String(s) => match LogLevel::from_str(&s) {
                Ok(level) => Ok(level),
                Err(e) => {
                    error!("LAGER_SINK | {}", e);
                    Ok(LogLevel::DEBUG)
                }
            },
            Value::Number(n) => match n.as_i64().and_then(|raw| i32::try_from(raw).ok()) {
                Some(raw) => Ok(LogLevel(raw)),
                None => {
                    error!("LAGER_SINK | Log level ordinal out of range: {}", n);
                    Ok(LogLevel::DEBUG)
                }
            },
            other => {
                error!("LAGER_SINK | Expected a string or number for log level, got {:?}", other);
                Ok(LogLevel::DEBUG)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_levels_render() {
        assert_eq!(LogLevel::DEBUG.as_str(), "DEBUG");
        assert_eq!(LogLevel::INFO.as_str(), "INFO");
        assert_eq!(LogLevel::ERROR.as_str(), "ERROR");
        assert_eq!(LogLevel::FATAL.as_str(), "FATAL");
    }

    #[test]
    fn test_unknown_levels_render() {
        assert_eq!(LogLevel::from_raw(4).as_str(), "UNKNOWN");
        assert_eq!(LogLevel::from_raw(-1).as_str(), "UNKNOWN");
        assert_eq!(LogLevel::from_raw(i32::MAX).to_string(), "UNKNOWN");
    }

    #[test]
    fn test_ordering_follows_ordinals() {
        assert!(LogLevel::DEBUG < LogLevel::INFO);
        assert!(LogLevel::INFO < LogLevel::ERROR);
        assert!(LogLevel::ERROR < LogLevel::FATAL);
        assert!(LogLevel::from_raw(-1) < LogLevel::DEBUG);
        assert_eq!(LogLevel::FATAL.raw(), 3);
    }

    #[test]
    fn test_from_str_case_insensitive() {
        assert_eq!(LogLevel::from_str("INFO").unwrap(), LogLevel::INFO);
        assert_eq!(LogLevel::from_str(" Error ").unwrap(), LogLevel::ERROR);
        assert!(LogLevel::from_str("warn").is_err());
    }

    #[test]
    fn test_deserialize_lenient() {
        let level: LogLevel = serde_json::from_value(json!("fatal")).unwrap();
        assert_eq!(level, LogLevel::FATAL);

        let level: LogLevel = serde_json::from_value(json!(2)).unwrap();
        assert_eq!(level, LogLevel::ERROR);

        let level: LogLevel = serde_json::from_value(json!("nope")).unwrap();
        assert_eq!(level, LogLevel::DEBUG);

        let level: LogLevel = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(level, LogLevel::DEBUG);
    }

    #[test]
    fn test_serializes_as_ordinal() {
        assert_eq!(serde_json::to_value(LogLevel::ERROR).unwrap(), json!(2));
    }
}
