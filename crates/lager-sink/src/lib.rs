// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log sink that forwards structured log records to Honeycomb as events.
//!
//! ```text
//!   application ──> Sink::log ──> EventBuilder::new_event ──> Transport::send
//!                                                                  │
//!   ResponseReconciler::run <──────── outcome stream <─────────────┘
//! ```
//!
//! The logging path and the reconciler share nothing but the correlation
//! token stored in each event's metadata.
//!
//! ```rust,ignore
//! let config = SinkConfig::from_env()?;
//! let (sink, reconciler) = Sink::start(&config)?;
//! let reconciler = tokio::spawn(reconciler.run());
//!
//! sink.log(LogRecord::new("my-component", "example-starting", LogLevel::INFO));
//!
//! sink.close().await;
//! reconciler.await?;
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod builder;
pub mod config;
pub mod dynamic_field;
pub mod error;
pub mod event;
pub mod level;
pub mod logger;
pub mod reconciler;
pub mod record;
pub mod sink;
pub mod timestamp;
pub mod transport;

pub use config::SinkConfig;
pub use level::LogLevel;
pub use reconciler::ResponseReconciler;
pub use record::{Data, LogRecord};
pub use sink::Sink;
