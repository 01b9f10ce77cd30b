//! The `OracleClient` capability interface.
//!
//! Object-safe and `Send + Sync`, so implementations can be stored behind
//! `Arc<dyn OracleClient>` inside the engine, in the same trait-object shape
//! used for other pluggable observer-style dependencies in this workspace.

use crate::types::{OracleRequest, OracleResponse};
use async_trait::async_trait;
use std::time::Duration;

/// A replaceable second opinion for ambiguous tool calls.
///
/// The engine uses this interface only; response parsing, prompt
/// construction, and retries are each implementation's concern.
#[async_trait]
pub trait OracleClient: Send + Sync {
    /// Analyze `request`, honoring `deadline` as a soft budget. Infallible:
    /// implementations must fold any internal failure into
    /// [`OracleResponse::uncertain`] rather than returning an error.
    async fn analyze(&self, request: OracleRequest, deadline: Duration) -> OracleResponse;

    /// Whether this client is currently able to serve requests at all.
    fn is_available(&self) -> bool;
}
