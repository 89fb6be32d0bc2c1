// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Tracing formatter for the sink's own diagnostics.
//!
//! ```text
//! LAGER_SINK | LEVEL | [span_name{span_fields}:] message {event_fields}
//! ```
//!
//! Messages emitted by this crate already start with `LAGER_SINK |`; the
//! formatter strips that duplicate so each line carries the prefix once.

use std::fmt;

use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext, FormattedFields,
};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

pub const LOG_PREFIX: &str = "LAGER_SINK";

#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(&mut writer, "{LOG_PREFIX} | {} | ", metadata.level())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;

                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        let mut fields = String::new();
        ctx.field_format()
            .format_fields(format::Writer::new(&mut fields), event)?;
        writeln!(writer, "{}", strip_prefix(&fields))
    }
}

fn strip_prefix(message: &str) -> &str {
    message
        .strip_prefix(LOG_PREFIX)
        .and_then(|rest| rest.strip_prefix(" | "))
        .unwrap_or(message)
}

/// Installs a global `fmt` subscriber using [`Formatter`].
///
/// `log_level` is an `EnvFilter` directive such as `"info"` or
/// `"lager_sink=debug"`; HTTP client internals are silenced.
pub fn init(log_level: &str) -> Result<(), String> {
    let env_filter = EnvFilter::try_new(format!("h2=off,hyper=off,rustls=off,{log_level}"))
        .map_err(|e| format!("could not parse log level '{log_level}': {e}"))?;

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .event_format(Formatter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("could not install tracing subscriber: {e}"))
}
