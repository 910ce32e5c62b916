//! Column timestamps.
//!
//! The store resolves conflicting writes by timestamp, so every column is
//! stamped with the wall-clock time (in microseconds) at which it was built.
//! A process-wide high-water mark keeps the sequence strictly increasing even
//! when the clock stalls or steps backwards.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

static LAST_TIMESTAMP: AtomicI64 = AtomicI64::new(i64::MIN);

/// Returns a new microsecond timestamp, greater than any previously returned.
pub fn create_timestamp() -> i64 {
    let now = Utc::now().timestamp_micros();
    let prev = LAST_TIMESTAMP
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| Some(next_after(last, now)))
        .unwrap_or_else(|last| last);
    next_after(prev, now)
}

fn next_after(last: i64, now: i64) -> i64 {
    now.max(last.saturating_add(1))
}
