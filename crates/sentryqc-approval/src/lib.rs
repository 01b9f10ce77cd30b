//! Approval ticket store and agent-confirm fast path.
//!
//! The shared vocabulary crate defines the client-facing `PendingApproval`
//! view; this crate defines and stores the full server-side
//! `ApprovalTicket`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod fast_path;
pub mod store;
pub mod sweep;
pub mod types;

pub use error::ApprovalError;
pub use fast_path::{check as check_fast_path, FastPathOutcome};
pub use store::ApprovalStore;
pub use sweep::{spawn as spawn_sweep, SweepHandle, DEFAULT_SWEEP_INTERVAL};
pub use types::{ApprovalTicket, TicketStatus};
