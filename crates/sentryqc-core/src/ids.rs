//! ID and timestamp utilities: monotonic counters, wall-clock millis, and
//! unguessable random identifiers for approval tickets.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a new monotonic identifier (starts at 1). Useful for ordering
/// audit records and test assertions within a single process.
pub fn next_monotonic_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Milliseconds since the UNIX epoch.
pub fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock before epoch").as_millis()
        as u64
}

/// Generate an unguessable, URL-safe 128-bit ticket identifier.
///
/// Backed by UUID v4 (122 bits of randomness), which satisfies the
/// unguessable random 128-bit, URL-safe requirement for `ApprovalTicket.id`
/// without pulling in a dedicated CSPRNG-token crate this workspace doesn't
/// already carry.
pub fn new_ticket_id() -> String {
    Uuid::new_v4().simple().to_string()
}
