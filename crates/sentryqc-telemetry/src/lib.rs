//! Structured logging init, the audit sink, and the notification-sender
//! interface.
//!
//! `init_json_logging` follows the common approach of a JSON
//! `tracing-subscriber` layer plus `EnvFilter`. OTel tracer/metrics wiring is
//! dropped here — this workspace has no budget/span concept for it to
//! instrument (see `DESIGN.md`).

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
pub mod events;
pub mod notify;

pub use audit::AuditSink;
pub use events::{AuditEvent, NotificationEvent};
pub use notify::{NoopSender, NotificationSender};

use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Initialize structured JSON logging with an env filter.
///
/// Set `RUST_LOG`, e.g. `"info,sentryqc_engine=debug"`. Idempotent in
/// practice: a second call fails silently (`set_global_default` returns
/// `Err` if a subscriber is already installed); that failure mode is
/// deliberately swallowed with `.ok()` rather than propagated.
pub fn init_json_logging() {
    let fmt_layer = fmt::layer().json().with_current_span(true).with_span_list(true);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber).ok();
}
