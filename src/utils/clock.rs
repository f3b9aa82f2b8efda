//! Monotonic millisecond clock
//!
//! Timestamps for cache `last_use` tracking and eviction cutoffs,
//! measured from first use within the process.

use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Milliseconds elapsed since the process-local epoch.
pub fn millis() -> u64 {
    let epoch = EPOCH.get_or_init(Instant::now);
    epoch.elapsed().as_millis() as u64
}
