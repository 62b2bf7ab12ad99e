//! Timestamp conversion utilities.
//!
//! The engine works in two units: chrono `DateTime<Utc>` for anything that
//! crosses the wire, and `f64` seconds for projection math. This module owns
//! the conversions so rounding behaves the same everywhere.

#![allow(clippy::missing_const_for_fn)]

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Convert epoch seconds (as found in commit metadata) to a UTC instant.
///
/// Returns `None` for values chrono cannot represent.
#[inline]
#[must_use]
pub fn epoch_seconds_to_datetime(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

/// Length of a chrono duration in fractional seconds.
#[inline]
#[must_use]
pub fn duration_secs(d: Duration) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let micros = d.num_microseconds().unwrap_or(i64::MAX) as f64;
    micros / 1_000_000.0
}

/// Build a chrono duration from fractional seconds (rounded to microseconds).
///
/// Non-finite and negative inputs collapse to zero.
#[inline]
#[must_use]
pub fn secs_to_duration(secs: f64) -> Duration {
    if !secs.is_finite() || secs <= 0.0 {
        return Duration::zero();
    }
    #[allow(clippy::cast_possible_truncation)]
    let micros = (secs * 1_000_000.0).round().min(9.0e15) as i64;
    Duration::microseconds(micros)
}

/// Fractional seconds between `start` and `t` (negative when `t < start`).
#[inline]
#[must_use]
pub fn seconds_between(start: DateTime<Utc>, t: DateTime<Utc>) -> f64 {
    duration_secs(t - start)
}

/// Offset an instant by fractional seconds, saturating at chrono's bounds.
#[must_use]
pub fn offset_by_secs(t: DateTime<Utc>, secs: f64) -> DateTime<Utc> {
    if !secs.is_finite() || secs == 0.0 {
        return t;
    }
    let magnitude = secs_to_duration(secs.abs());
    let shifted = if secs > 0.0 {
        t.checked_add_signed(magnitude)
    } else {
        t.checked_sub_signed(magnitude)
    };
    shifted.unwrap_or(if secs > 0.0 {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    })
}
