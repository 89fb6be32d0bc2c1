// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::SystemTime;

use serde_json::{Map, Value};

/// Key under which the correlation token is stored in an event's metadata.
pub const METADATA_KEY_ID: &str = "id";

/// An event on its way to the ingestion service.
///
/// `metadata` is never sent; the transport hands it back untouched on the
/// matching [`DeliveryOutcome`](crate::transport::DeliveryOutcome).
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEvent {
    pub fields: Map<String, Value>,
    pub timestamp: SystemTime,
    pub metadata: Option<Value>,
}

impl OutboundEvent {
    #[must_use]
    pub fn new() -> Self {
        OutboundEvent {
            fields: Map::new(),
            timestamp: SystemTime::now(),
            metadata: None,
        }
    }

    pub fn add_field(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Merges every entry of `data` into the event, overwriting existing keys.
    pub fn add(&mut self, data: Map<String, Value>) {
        self.fields.extend(data);
    }

    /// Stores `token` as the event's correlation metadata.
    pub fn set_correlation_token(&mut self, token: i32) {
        let mut metadata = Map::new();
        metadata.insert(METADATA_KEY_ID.to_string(), Value::from(token));
        self.metadata = Some(Value::Object(metadata));
    }

    #[must_use]
    pub fn correlation_token(&self) -> Option<i32> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(METADATA_KEY_ID))
            .and_then(Value::as_i64)
            .and_then(|id| i32::try_from(id).ok())
    }
}

impl Default for OutboundEvent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_overwrites() {
        let mut event = OutboundEvent::new();
        event.add_field("method", "get");

        let mut data = Map::new();
        data.insert("method".to_string(), json!("post"));
        data.insert("hostname".to_string(), json!("appserver15"));
        event.add(data);

        assert_eq!(event.fields.len(), 2);
        assert_eq!(event.fields["method"], json!("post"));
    }

    #[test]
    fn test_correlation_token() {
        let mut event = OutboundEvent::new();
        assert_eq!(event.correlation_token(), None);

        event.set_correlation_token(1234);
        assert_eq!(event.correlation_token(), Some(1234));
        assert_eq!(event.metadata, Some(json!({"id": 1234})));
    }
}
