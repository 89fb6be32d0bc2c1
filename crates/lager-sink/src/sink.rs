// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Translation of log records into outbound events.
//!
//! [`Sink::log`] is called once per record, from any number of tasks. It never
//! blocks on delivery and never returns an error: records below the minimum
//! level are dropped silently, submission failures are reported through
//! `tracing` and the record is dropped.
//!
//! # Field mapping
//!
//! | Event field                    | Source                                     |
//! |--------------------------------|--------------------------------------------|
//! | `lager_source`                 | `record.source`                            |
//! | `lager_message`                | `record.message`                           |
//! | `lager_log_level_iota`         | raw level ordinal                          |
//! | `lager_log_level`              | `DEBUG`, `INFO`, `ERROR`, `FATAL`, `UNKNOWN` |
//! | `function`                     | `record.caller`, omitted when absent       |
//! | `lager_session`                | `data["session"]`, removed from the data   |
//! | `lager_timestamp_parse_error`  | set only when the timestamp is invalid     |
//! | every other `data` key         | copied verbatim                            |

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error};

use crate::builder::EventBuilder;
use crate::config::SinkConfig;
use crate::error::ConfigError;
use crate::event::OutboundEvent;
use crate::level::LogLevel;
use crate::reconciler::ResponseReconciler;
use crate::record::LogRecord;
use crate::timestamp::parse_timestamp;
use crate::transport::{HttpTransport, Transport};

pub const FIELD_SOURCE: &str = "lager_source";
pub const FIELD_MESSAGE: &str = "lager_message";
pub const FIELD_LOG_LEVEL_IOTA: &str = "lager_log_level_iota";
pub const FIELD_LOG_LEVEL: &str = "lager_log_level";
pub const FIELD_FUNCTION: &str = "function";
pub const FIELD_SESSION: &str = "lager_session";
pub const FIELD_TIMESTAMP_PARSE_ERROR: &str = "lager_timestamp_parse_error";

const SESSION_KEY: &str = "session";

/// Log sink forwarding records to the ingestion API.
///
/// Call [`Sink::close`] once when done; events logged afterwards are dropped.
pub struct Sink {
    minimum_level: LogLevel,
    builder: EventBuilder,
    transport: Arc<dyn Transport>,
    closed: AtomicBool,
}

impl Sink {
    #[must_use]
    pub fn new(config: &SinkConfig, transport: Arc<dyn Transport>) -> Self {
        Self::with_builder(config.minimum_level, EventBuilder::new(), transport)
    }

    #[must_use]
    pub fn with_builder(
        minimum_level: LogLevel,
        builder: EventBuilder,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Sink {
            minimum_level,
            builder,
            transport,
            closed: AtomicBool::new(false),
        }
    }

    /// Validates `config`, starts an [`HttpTransport`] and wires a sink to it.
    ///
    /// The returned reconciler is not started; spawn
    /// [`ResponseReconciler::run`] to consume delivery outcomes.
    pub fn start(config: &SinkConfig) -> Result<(Self, ResponseReconciler), ConfigError> {
        config.validate()?;
        let (transport, outcomes) = HttpTransport::start(config)?;
        let sink = Self::new(config, Arc::new(transport));
        Ok((sink, ResponseReconciler::new(outcomes)))
    }

    #[must_use]
    pub fn minimum_level(&self) -> LogLevel {
        self.minimum_level
    }

    pub fn log(&self, record: LogRecord) {
        if record.level < self.minimum_level {
            return;
        }
        if self.closed.load(Ordering::Acquire) {
            debug!("LAGER_SINK | Sink is closed, dropping record '{}'", record.message);
            return;
        }

        let event = self.translate(record);
        if let Err(e) = self.transport.send(event) {
            error!("LAGER_SINK | Failed to submit event: {e}");
        }
    }

    /// Builds the outbound event for `record`, without the level filter.
    #[must_use]
    pub fn translate(&self, record: LogRecord) -> OutboundEvent {
        let LogRecord {
            source,
            message,
            level,
            mut data,
            timestamp,
            caller,
        } = record;

        let mut event = self.builder.new_event();

        if let Some(caller) = caller {
            event.add_field(FIELD_FUNCTION, caller);
        }

        event.set_correlation_token(fastrand::i32(0..i32::MAX));
        event.add_field(FIELD_SOURCE, source);
        event.add_field(FIELD_MESSAGE, message);
        event.add_field(FIELD_LOG_LEVEL_IOTA, level.raw());
        event.add_field(FIELD_LOG_LEVEL, level.as_str());

        // `session` is forwarded under its namespaced key only
        if let Some(session) = data.remove(SESSION_KEY) {
            event.add_field(FIELD_SESSION, session);
        }
        event.add(data);

        match parse_timestamp(&timestamp) {
            Ok(ts) => event.timestamp = ts,
            Err(e) => event.add_field(FIELD_TIMESTAMP_PARSE_ERROR, e.to_string()),
        }

        event
    }

    /// Flushes and closes the transport. Later calls are no-ops.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.transport.close().await;
    }
}
