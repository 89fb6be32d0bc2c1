// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use lager_sink::{
    reconciler::ReconcileStats, sink::FIELD_SESSION, Data, LogLevel, LogRecord, Sink, SinkConfig,
};
use mockito::{Matcher, Server};
use serde_json::json;
use tokio::time::{timeout, Duration};

fn test_config(api_host: String, minimum_level: LogLevel) -> SinkConfig {
    SinkConfig {
        api_host,
        ..SinkConfig::new("mock-write-key", "test-dataset", minimum_level)
    }
}

fn object(value: serde_json::Value) -> Data {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

#[cfg(test)]
#[tokio::test]
async fn sink_ships_events_and_reconciles_outcomes() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("POST", "/1/events/test-dataset")
        .match_header("X-Honeycomb-Team", "mock-write-key")
        .match_header("X-Honeycomb-Event-Time", "2017-09-07T17:21:35.000000000Z")
        .match_header("Content-Type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "lager_source": "my-component",
            "lager_message": "my-component.some-action",
            "lager_log_level": "DEBUG",
            "lager_log_level_iota": 0,
            "lager_session": "3",
            "method": "get",
        })))
        .with_status(202)
        .expect(2)
        .create_async()
        .await;

    let (sink, reconciler) =
        Sink::start(&test_config(server.url(), LogLevel::DEBUG)).expect("failed to start sink");
    let reconciler = tokio::spawn(reconciler.run());

    for _ in 0..2 {
        let record = LogRecord::new("my-component", "my-component.some-action", LogLevel::DEBUG)
            .with_data(object(json!({"session": "3", "method": "get"})))
            .with_timestamp("1504804895");
        sink.log(record);
    }

    sink.close().await;
    let stats = timeout(Duration::from_secs(5), reconciler)
        .await
        .expect("timed out waiting for reconciler")
        .expect("reconciler task failed");

    assert_eq!(
        stats,
        ReconcileStats {
            delivered: 2,
            failed: 0,
            malformed: 0,
        }
    );
    mock.assert_async().await;
}

#[cfg(test)]
#[tokio::test]
async fn reconciler_keeps_draining_after_server_errors() {
    let mut server = Server::new_async().await;

    let failing = server
        .mock("POST", "/1/events/test-dataset")
        .match_body(Matcher::PartialJson(json!({"lager_message": "fails"})))
        .with_status(500)
        .with_body("Internal Server Error")
        .expect(1)
        .create_async()
        .await;
    let succeeding = server
        .mock("POST", "/1/events/test-dataset")
        .match_body(Matcher::PartialJson(json!({"lager_message": "succeeds"})))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let (sink, reconciler) =
        Sink::start(&test_config(server.url(), LogLevel::INFO)).expect("failed to start sink");
    let reconciler = tokio::spawn(reconciler.run());

    sink.log(LogRecord::new("my-component", "fails", LogLevel::ERROR));
    sink.log(LogRecord::new("my-component", "filtered", LogLevel::DEBUG));
    sink.log(LogRecord::new("my-component", "succeeds", LogLevel::INFO));

    sink.close().await;
    let stats = timeout(Duration::from_secs(5), reconciler)
        .await
        .expect("timed out waiting for reconciler")
        .expect("reconciler task failed");

    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.malformed, 0);
    failing.assert_async().await;
    succeeding.assert_async().await;
}

#[cfg(test)]
#[tokio::test]
async fn caller_data_is_not_mutated() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/1/events/test-dataset")
        .with_status(200)
        .create_async()
        .await;

    let (sink, reconciler) =
        Sink::start(&test_config(server.url(), LogLevel::DEBUG)).expect("failed to start sink");
    let reconciler = tokio::spawn(reconciler.run());

    let data = object(json!({"session": "7", "user": "alice"}));
    let record = LogRecord::new("my-component", "login", LogLevel::INFO).with_data(data.clone());
    sink.log(record.clone());

    let event = sink.translate(record.clone());
    assert_eq!(event.fields[FIELD_SESSION], json!("7"));
    assert_eq!(record.data, data);
    assert!(record.data.contains_key("session"));

    sink.close().await;
    reconciler.await.expect("reconciler task failed");
}

#[cfg(test)]
#[tokio::test]
async fn start_rejects_invalid_config() {
    let config = SinkConfig::new("", "test-dataset", LogLevel::DEBUG);
    assert!(Sink::start(&config).is_err());
}
