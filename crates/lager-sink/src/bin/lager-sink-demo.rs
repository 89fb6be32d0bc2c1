// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use std::env;

use serde_json::json;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

use lager_sink::{logger, Data, LogLevel, LogRecord, Sink, SinkConfig};

const SOURCE: &str = "my-component";

#[tokio::main]
pub async fn main() {
    let log_level = env::var("LAGER_SINK_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or_else(|_| "info".to_string());
    if let Err(e) = logger::init(&log_level) {
        eprintln!("{e}");
        return;
    }

    let config = match SinkConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}. Shutting down.");
            return;
        }
    };

    let (sink, reconciler) = match Sink::start(&config) {
        Ok(started) => started,
        Err(e) => {
            error!("Unable to start sink: {e}");
            return;
        }
    };
    let reconciler = tokio::spawn(reconciler.run());

    sink.log(record("example-starting", LogLevel::INFO, Data::new()));
    for _ in 0..10 {
        let data = object(json!({
            "duration_ms": fastrand::f64() * 100.0 + 100.0,
            "method": "get",
            "hostname": "appserver15",
            "payload_length": fastrand::u32(0..45) * 50 + 5,
        }));
        sink.log(record("some-action", LogLevel::DEBUG, data));

        sleep(Duration::from_millis(100)).await;
    }

    let data = object(json!({"error": "This is an example error"}));
    sink.log(record("example-error", LogLevel::ERROR, data));
    sink.log(record("example-complete", LogLevel::INFO, Data::new()));

    sleep(Duration::from_millis(500)).await;
    sink.close().await;

    match reconciler.await {
        Ok(stats) => info!(
            "complete: {} delivered, {} failed, {} malformed",
            stats.delivered, stats.failed, stats.malformed
        ),
        Err(e) => error!("Response reconciler failed: {e}"),
    }
}

fn record(action: &str, level: LogLevel, data: Data) -> LogRecord {
    LogRecord::new(SOURCE, format!("{SOURCE}.{action}"), level)
        .with_data(data)
        .with_caller(format!("{}::main", module_path!()))
}

fn object(value: serde_json::Value) -> Data {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Data::new(),
    }
}
