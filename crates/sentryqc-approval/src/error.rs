//! Approval operation failures. Never propagated past the store's own
//! boundary — callers turn these into a structured `{success: false,
//! message}` result, consistent with this workspace's fail-open-on-
//! tooling-error policy.

use thiserror::Error;

/// Why an approval operation (`approve`/`deny`) could not complete.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApprovalError {
    /// No ticket exists with the given id.
    #[error("no approval ticket found with id {0:?}")]
    NotFound(String),
    /// The ticket exists but is not in `pending` status.
    #[error("ticket {id:?} is already {status} and cannot be resolved again")]
    WrongStatus {
        /// The ticket id.
        id: String,
        /// The status it was already in.
        status: &'static str,
    },
    /// The ticket exists, was pending, but has passed its wall-clock
    /// expiry — lazily promoted to `expired` as part of this check.
    #[error("ticket {0:?} has expired")]
    Expired(String),
}
