// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Consumption of delivery outcomes.
//!
//! The reconciler is the single consumer of the transport's outcome stream.
//! It runs as its own task, shares nothing with the logging path except the
//! correlation token carried in each event's metadata, and keeps draining
//! after every per-event failure until the stream closes at shutdown.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::OutcomeError;
use crate::event::METADATA_KEY_ID;
use crate::transport::DeliveryOutcome;

/// A successfully delivered event.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivered {
    /// The correlation token, as returned by the transport
    pub token: i32,
    pub duration: Duration,
}

/// Classifies one outcome.
///
/// Checks run in order: status code in `[200, 300)`, metadata present,
/// metadata is an object holding an `i32` token under the id key.
pub fn reconcile(outcome: DeliveryOutcome) -> Result<Delivered, OutcomeError> {
    if !(200..300).contains(&outcome.status_code) {
        return Err(OutcomeError::BadStatus {
            status: outcome.status_code,
            error: outcome.error,
            body: String::from_utf8_lossy(&outcome.body).into_owned(),
        });
    }

    let Some(metadata) = outcome.metadata else {
        return Err(OutcomeError::MissingMetadata);
    };

    match metadata {
        Value::Object(map) => match map
            .get(METADATA_KEY_ID)
            .and_then(Value::as_i64)
            .and_then(|id| i32::try_from(id).ok())
        {
            Some(token) => Ok(Delivered {
                token,
                duration: outcome.duration,
            }),
            None => Err(OutcomeError::MalformedMetadata(Value::Object(map).to_string())),
        },
        other => Err(OutcomeError::MalformedMetadata(other.to_string())),
    }
}

/// Running totals kept by [`ResponseReconciler::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub delivered: u64,
    pub failed: u64,
    pub malformed: u64,
}

pub struct ResponseReconciler {
    outcomes: mpsc::UnboundedReceiver<DeliveryOutcome>,
}

impl ResponseReconciler {
    #[must_use]
    pub fn new(outcomes: mpsc::UnboundedReceiver<DeliveryOutcome>) -> Self {
        ResponseReconciler { outcomes }
    }

    /// Drains outcomes until the stream closes, reporting each one.
    ///
    /// Spawn this on its own task; it only returns once the transport has
    /// been closed.
    pub async fn run(mut self) -> ReconcileStats {
        debug!("LAGER_SINK | Response reconciler started");
        let mut stats = ReconcileStats::default();

        while let Some(outcome) = self.outcomes.recv().await {
            match reconcile(outcome) {
                Ok(delivered) => {
                    stats.delivered += 1;
                    info!(
                        "LAGER_SINK | Successfully sent event {} in {:?}",
                        delivered.token, delivered.duration
                    );
                }
                Err(e @ OutcomeError::BadStatus { .. }) => {
                    stats.failed += 1;
                    error!("LAGER_SINK | Delivery failed: {e}");
                }
                Err(e) => {
                    stats.malformed += 1;
                    error!("LAGER_SINK | Malformed outcome: {e}");
                }
            }
        }

        debug!(
            "LAGER_SINK | Response reconciler stopped: {} delivered, {} failed, {} malformed",
            stats.delivered, stats.failed, stats.malformed
        );
        stats
    }
}
