// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Event transport to the ingestion API.
//!
//! The sink only sees the [`Transport`] trait: a synchronous, non-blocking
//! `send` and an async `close`. Delivery results come back separately as a
//! stream of [`DeliveryOutcome`]s, one per accepted event.
//!
//! # Architecture
//!
//! ```text
//!   Sink::log ──send()──> unbounded queue ──> worker task
//!                                                  │
//!                                          (≤ N requests in flight)
//!                                                  │
//!                                                  v
//!                                     POST /1/events/{dataset}
//!                                                  │
//!                                                  v
//!                          outcome stream ──> ResponseReconciler
//! ```
//!
//! On `close()` the queue stops accepting events, the worker drains what is
//! already queued, waits for in-flight requests and then drops the outcome
//! sender, which ends the reconciler loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::config::SinkConfig;
use crate::error::{ConfigError, SendError};
use crate::event::OutboundEvent;

const WRITE_KEY_HEADER: &str = "X-Honeycomb-Team";
const EVENT_TIME_HEADER: &str = "X-Honeycomb-Event-Time";

/// Result of delivering one event, as reported by the transport.
///
/// `status_code` is 0 when the request failed before any response arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryOutcome {
    pub status_code: u16,
    pub error: Option<String>,
    pub body: Vec<u8>,
    pub duration: Duration,
    /// The event's metadata, returned unchanged
    pub metadata: Option<Value>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Queues an event for delivery without waiting on the network.
    ///
    /// Errors are validation failures; the event is not queued.
    fn send(&self, event: OutboundEvent) -> Result<(), SendError>;

    /// Flushes queued events and stops the transport. Safe to call twice.
    async fn close(&self);
}

/// HTTP client posting one event per request to the ingestion API.
pub struct HttpTransport {
    write_key: String,
    dataset: String,
    tx: mpsc::UnboundedSender<OutboundEvent>,
    closed: AtomicBool,
    cancel_token: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl HttpTransport {
    /// Spawns the delivery worker on the current tokio runtime.
    ///
    /// Returns the transport and the outcome stream, which must have a single
    /// consumer. Fails when called outside a runtime.
    pub fn start(
        config: &SinkConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<DeliveryOutcome>), ConfigError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            ConfigError::Invalid(format!("no tokio runtime to run the transport on: {e}"))
        })?;
        let url = events_url(&config.api_host, &config.dataset)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("Failed to build HTTP client: {e}")))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();

        let worker = Worker {
            client,
            url,
            write_key: Arc::from(config.write_key.as_str()),
            rx,
            outcome_tx,
            in_flight: Arc::new(Semaphore::new(config.max_concurrent_requests)),
            cancel_token: cancel_token.clone(),
        };
        let handle = runtime.spawn(worker.run());

        let transport = HttpTransport {
            write_key: config.write_key.clone(),
            dataset: config.dataset.clone(),
            tx,
            closed: AtomicBool::new(false),
            cancel_token,
            worker: Mutex::new(Some(handle)),
        };

        Ok((transport, outcome_rx))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn send(&self, event: OutboundEvent) -> Result<(), SendError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SendError::Closed);
        }
        if self.write_key.is_empty() {
            return Err(SendError::MissingWriteKey);
        }
        if self.dataset.is_empty() {
            return Err(SendError::MissingDataset);
        }
        if event.fields.is_empty() {
            return Err(SendError::NoFields);
        }

        self.tx.send(event).map_err(|_| SendError::QueueClosed)
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.cancel_token.cancel();

        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("LAGER_SINK | Transport worker failed: {e}");
            }
        }
        debug!("LAGER_SINK | Transport closed");
    }
}

impl Drop for HttpTransport {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

/// Builds `{api_host}/1/events/{dataset}` with the dataset percent-encoded.
fn events_url(api_host: &str, dataset: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(api_host)
        .map_err(|e| ConfigError::Invalid(format!("Invalid API host '{api_host}': {e}")))?;
    url.path_segments_mut()
        .map_err(|()| ConfigError::Invalid(format!("API host '{api_host}' cannot be a base URL")))?
        .pop_if_empty()
        .extend(["1", "events", dataset]);
    Ok(url)
}

struct Worker {
    client: reqwest::Client,
    url: Url,
    write_key: Arc<str>,
    rx: mpsc::UnboundedReceiver<OutboundEvent>,
    outcome_tx: mpsc::UnboundedSender<DeliveryOutcome>,
    in_flight: Arc<Semaphore>,
    cancel_token: CancellationToken,
}

impl Worker {
    async fn run(mut self) {
        debug!("LAGER_SINK | Transport worker started");
        let mut requests = JoinSet::new();

        loop {
            tokio::select! {
                Some(event) = self.rx.recv() => {
                    self.dispatch(event, &mut requests).await;
                }
                () = self.cancel_token.cancelled() => {
                    debug!("LAGER_SINK | Received shutdown signal, draining queued events");
                    self.rx.close();
                    while let Some(event) = self.rx.recv().await {
                        self.dispatch(event, &mut requests).await;
                    }
                    break;
                }
            }
            // Reap finished requests so the set stays bounded
            while requests.try_join_next().is_some() {}
        }

        while let Some(result) = requests.join_next().await {
            if let Err(e) = result {
                error!("LAGER_SINK | Delivery task failed: {e}");
            }
        }
        debug!("LAGER_SINK | Transport worker stopped");
    }

    async fn dispatch(&self, event: OutboundEvent, requests: &mut JoinSet<()>) {
        let Ok(permit) = Arc::clone(&self.in_flight).acquire_owned().await else {
            error!("LAGER_SINK | Request limiter closed, dropping event");
            return;
        };

        let client = self.client.clone();
        let url = self.url.clone();
        let write_key = Arc::clone(&self.write_key);
        let outcome_tx = self.outcome_tx.clone();

        requests.spawn(async move {
            let outcome = deliver(&client, url, &write_key, event).await;
            drop(permit);
            if outcome_tx.send(outcome).is_err() {
                debug!("LAGER_SINK | Outcome stream has no consumer, dropping outcome");
            }
        });
    }
}

async fn deliver(
    client: &reqwest::Client,
    url: Url,
    write_key: &str,
    event: OutboundEvent,
) -> DeliveryOutcome {
    let start = Instant::now();
    let event_time =
        DateTime::<Utc>::from(event.timestamp).to_rfc3339_opts(SecondsFormat::Nanos, true);
    let body = Value::Object(event.fields);

    let result = client
        .post(url)
        .header(WRITE_KEY_HEADER, write_key)
        .header(EVENT_TIME_HEADER, event_time)
        .json(&body)
        .send()
        .await;

    match result {
        Ok(resp) => {
            let status_code = resp.status().as_u16();
            let (body, error) = match resp.bytes().await {
                Ok(bytes) => (bytes.to_vec(), None),
                Err(e) => (Vec::new(), Some(e.to_string())),
            };
            DeliveryOutcome {
                status_code,
                error,
                body,
                duration: start.elapsed(),
                metadata: event.metadata,
            }
        }
        Err(e) => DeliveryOutcome {
            status_code: e.status().map_or(0, |s| s.as_u16()),
            error: Some(e.to_string()),
            body: Vec::new(),
            duration: start.elapsed(),
            metadata: event.metadata,
        },
    }
}
