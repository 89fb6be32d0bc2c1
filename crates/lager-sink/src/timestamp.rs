// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Resolution of facade timestamps into event instants.
//!
//! The facade writes timestamps as decimal seconds since the epoch with a
//! fractional part, e.g. `"1504804895.094333887"`. The integer part becomes the
//! seconds component (truncated toward zero) and the fractional part the
//! nanoseconds component, also truncated. An `f64` only carries about seven
//! significant fractional digits at current epoch magnitudes, so the last
//! nanosecond digits are approximate.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::TimestampError;

const NANOS_PER_SEC: f64 = 1e9;

/// Parses a fractional epoch-seconds string into a [`SystemTime`].
///
/// Non-numeric input, surrounding whitespace, NaN and infinities are rejected.
pub fn parse_timestamp(ts: &str) -> Result<SystemTime, TimestampError> {
    let value = ts.parse::<f64>()?;
    if !value.is_finite() {
        return Err(TimestampError::NonFinite(ts.to_string()));
    }

    let (seconds, nanos) = split_seconds(value);
    let out_of_range = || TimestampError::OutOfRange(ts.to_string());

    if value >= 0.0 {
        let secs = u64::try_from(seconds).map_err(|_| out_of_range())?;
        let offset = Duration::new(secs, 0) + Duration::from_nanos(nanos.unsigned_abs());
        UNIX_EPOCH.checked_add(offset).ok_or_else(out_of_range)
    } else {
        // Both components are negative for pre-epoch instants
        let offset = Duration::new(seconds.unsigned_abs(), 0)
            + Duration::from_nanos(nanos.unsigned_abs());
        UNIX_EPOCH.checked_sub(offset).ok_or_else(out_of_range)
    }
}

/// Splits `value` into whole seconds and nanoseconds, both truncated toward zero.
fn split_seconds(value: f64) -> (i64, i64) {
    // `as` saturates for values beyond i64
    let seconds = value.trunc() as i64;
    let nanos = ((value - value.trunc()) * NANOS_PER_SEC) as i64;
    (seconds, nanos)
}
