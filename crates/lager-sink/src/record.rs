// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::level::LogLevel;

/// Free-form key/value payload attached to a record.
pub type Data = serde_json::Map<String, serde_json::Value>;

/// A structured log record as handed over by the logging facade.
///
/// `timestamp` is the facade's textual epoch time with fractional seconds,
/// e.g. `"1504804895.094333887"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub source: String,
    pub message: String,
    #[serde(rename = "log_level")]
    pub level: LogLevel,
    #[serde(default)]
    pub data: Data,
    pub timestamp: String,
    /// Name of the function that issued the log call, when the facade knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
}

impl LogRecord {
    /// Builds a record stamped with the current time.
    #[must_use]
    pub fn new(source: impl Into<String>, message: impl Into<String>, level: LogLevel) -> Self {
        LogRecord {
            source: source.into(),
            message: message.into(),
            level,
            data: Data::new(),
            timestamp: now_epoch_seconds(),
            caller: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    #[must_use]
    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }
}

/// Current time formatted the way the facade formats record timestamps.
fn now_epoch_seconds() -> String {
    let elapsed = std::time::UNIX_EPOCH.elapsed().unwrap_or_default();
    format!("{}.{:09}", elapsed.as_secs(), elapsed.subsec_nanos())
}
