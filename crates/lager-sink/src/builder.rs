// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Debug;
use std::sync::Arc;

use crate::dynamic_field::{DynamicField, MemoryUsage, TaskCount};
use crate::event::OutboundEvent;

/// Produces events pre-populated with the registered dynamic fields.
#[derive(Clone)]
pub struct EventBuilder {
    dynamic_fields: Vec<Arc<dyn DynamicField>>,
}

impl EventBuilder {
    /// Builder with the process-health providers: task count and memory usage.
    #[must_use]
    pub fn new() -> Self {
        let mut builder = Self::empty();
        builder.add_dynamic_field(Arc::new(TaskCount));
        builder.add_dynamic_field(Arc::new(MemoryUsage::new()));
        builder
    }

    #[must_use]
    pub fn empty() -> Self {
        EventBuilder {
            dynamic_fields: Vec::new(),
        }
    }

    pub fn add_dynamic_field(&mut self, field: Arc<dyn DynamicField>) {
        self.dynamic_fields.push(field);
    }

    /// Returns an event holding only the dynamic fields, evaluated now.
    #[must_use]
    pub fn new_event(&self) -> OutboundEvent {
        let mut event = OutboundEvent::new();
        for field in &self.dynamic_fields {
            if let Some(value) = field.value() {
                event.add_field(field.name(), value);
            }
        }
        event
    }
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for EventBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.dynamic_fields.iter().map(|f| f.name()).collect();
        f.debug_struct("EventBuilder")
            .field("dynamic_fields", &names)
            .finish()
    }
}
