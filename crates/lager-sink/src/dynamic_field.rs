// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Process-health fields recomputed for every event.
//!
//! Each provider is evaluated when an event is built, never when the sink is
//! configured, so every event reflects the process state at the moment the
//! record was logged.
//!
//! # Sources
//!
//! - **Task count**: live tasks on the current tokio runtime, or the number of
//!   OS threads from `/proc/self/status` when called outside a runtime
//! - **Memory usage**: resident set size from `/proc/self/status`, in bytes
//!
//! A provider that cannot read its source returns `None` and the field is
//! left off the event.

use std::fs::File;
use std::io::{self, BufRead};

use serde_json::Value;
use tracing::debug;

const PROC_SELF_STATUS_PATH: &str = "/proc/self/status";

/// A named field whose value is computed on demand.
pub trait DynamicField: Send + Sync {
    fn name(&self) -> &str;

    fn value(&self) -> Option<Value>;
}

/// Number of concurrently schedulable tasks in the process.
///
/// Emitted as `num_tasks`; the value counts tokio tasks, not OS threads,
/// whenever a runtime is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskCount;

impl TaskCount {
    pub const FIELD_NAME: &'static str = "num_tasks";
}

impl DynamicField for TaskCount {
    fn name(&self) -> &str {
        Self::FIELD_NAME
    }

    fn value(&self) -> Option<Value> {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            return Some(Value::from(handle.metrics().num_alive_tasks()));
        }

        match read_status_value(PROC_SELF_STATUS_PATH, "Threads:") {
            Ok(Some(threads)) => Some(Value::from(threads)),
            Ok(None) => {
                debug!("LAGER_SINK | Thread count not found in {PROC_SELF_STATUS_PATH}");
                None
            }
            Err(e) => {
                debug!("LAGER_SINK | Could not read {PROC_SELF_STATUS_PATH}: {e}");
                None
            }
        }
    }
}

/// Current memory footprint of the process in bytes.
///
/// This is the resident set size (`VmRSS`), not live heap allocation: it
/// includes stacks, mapped binaries and freed pages the allocator has kept.
/// Tracking heap bytes exactly would need a counting global allocator.
#[derive(Debug, Clone)]
pub struct MemoryUsage {
    status_path: String,
}

impl MemoryUsage {
    pub const FIELD_NAME: &'static str = "memory_allocation";

    #[must_use]
    pub fn new() -> Self {
        Self::from_path(PROC_SELF_STATUS_PATH)
    }

    /// Reads from a `status`-formatted file other than `/proc/self/status`.
    #[must_use]
    pub fn from_path(status_path: impl Into<String>) -> Self {
        MemoryUsage {
            status_path: status_path.into(),
        }
    }
}

impl Default for MemoryUsage {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicField for MemoryUsage {
    fn name(&self) -> &str {
        Self::FIELD_NAME
    }

    fn value(&self) -> Option<Value> {
        match read_status_value(&self.status_path, "VmRSS:") {
            // Reported in kB
            Ok(Some(kb)) => Some(Value::from(kb.saturating_mul(1024))),
            Ok(None) => {
                debug!("LAGER_SINK | VmRSS not found in {}", self.status_path);
                None
            }
            Err(e) => {
                debug!("LAGER_SINK | Could not read {}: {e}", self.status_path);
                None
            }
        }
    }
}

/// Returns the first numeric column of the line starting with `key`.
///
/// ```text
/// Threads:        4
/// VmRSS:      12345 kB
/// ```
fn read_status_value(path: &str, key: &str) -> Result<Option<u64>, io::Error> {
    let file = File::open(path)?;
    let reader = io::BufReader::new(file);

    for line in reader.lines().map_while(Result::ok) {
        if let Some(rest) = line.strip_prefix(key) {
            return Ok(rest
                .split_whitespace()
                .next()
                .and_then(|v| v.parse::<u64>().ok()));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_status(contents: &str) -> (std::path::PathBuf, File) {
        let path = std::env::temp_dir().join(format!(
            "lager_sink_status_{}_{}",
            std::process::id(),
            fastrand::u64(..)
        ));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (path, file)
    }

    #[test]
    fn test_read_status_value() {
        let (path, _file) = write_status("Name:\tcat\nThreads:\t7\nVmRSS:\t  2048 kB\n");
        let path = path.to_str().unwrap();

        assert_eq!(read_status_value(path, "Threads:").unwrap(), Some(7));
        assert_eq!(read_status_value(path, "VmRSS:").unwrap(), Some(2048));
        assert_eq!(read_status_value(path, "VmSwap:").unwrap(), None);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_memory_usage_from_path_in_bytes() {
        let (path, _file) = write_status("VmRSS:\t     3 kB\n");
        let usage = MemoryUsage::from_path(path.to_str().unwrap());

        assert_eq!(usage.name(), "memory_allocation");
        assert_eq!(usage.value(), Some(Value::from(3072u64)));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_memory_usage_missing_file() {
        let usage = MemoryUsage::from_path("/nonexistent/lager-sink/status");
        assert_eq!(usage.value(), None);
    }

    #[tokio::test]
    async fn test_task_count_inside_runtime() {
        let value = TaskCount.value().expect("runtime metrics available");
        assert!(value.as_u64().is_some());
    }
}
