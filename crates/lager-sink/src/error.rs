// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::num::ParseFloatError;

/// Errors raised while loading or validating the sink configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Synchronous rejection of an event by the transport, before any network I/O.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("transport is closed")]
    Closed,

    #[error("no write key configured")]
    MissingWriteKey,

    #[error("no dataset configured")]
    MissingDataset,

    #[error("event has no fields")]
    NoFields,

    #[error("transport queue is closed")]
    QueueClosed,
}

/// Failure to resolve a record's fractional epoch-seconds timestamp.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimestampError {
    #[error("invalid timestamp: {0}")]
    Parse(#[from] ParseFloatError),

    #[error("timestamp is not a finite number: '{0}'")]
    NonFinite(String),

    #[error("timestamp out of range: '{0}'")]
    OutOfRange(String),
}

/// Why a delivery outcome could not be reconciled as a success.
///
/// Delivery failures (`BadStatus`) are kept apart from contract violations on
/// the returned metadata so the two show up differently in the logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutcomeError {
    #[error("bad status code: '{status}', err: '{}', response body: '{body}'", .error.as_deref().unwrap_or("<nil>"))]
    BadStatus {
        status: u16,
        error: Option<String>,
        body: String,
    },

    #[error("metadata was missing")]
    MissingMetadata,

    #[error("metadata was not an object with an integer 'id', metadata: {0}")]
    MalformedMetadata(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::Invalid("missing write key".to_string());
        assert_eq!(error.to_string(), "Invalid configuration: missing write key");
    }

    #[test]
    fn test_bad_status_display() {
        let error = OutcomeError::BadStatus {
            status: 500,
            error: None,
            body: "oops".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "bad status code: '500', err: '<nil>', response body: 'oops'"
        );
    }

    #[test]
    fn test_timestamp_error_from_parse() {
        let parse_err = "abc".parse::<f64>().unwrap_err();
        let error: TimestampError = parse_err.into();
        assert!(error.to_string().starts_with("invalid timestamp"));
    }
}
