//! A deterministic oracle for tests: always returns a fixed response,
//! optionally after a configurable delay (to exercise timeout behavior).

use crate::client::OracleClient;
use crate::types::{OracleRequest, OracleResponse};
use async_trait::async_trait;
use std::time::Duration;

/// Deterministic test double for [`OracleClient`].
#[derive(Clone)]
pub struct MockOracle {
    response: OracleResponse,
    delay: Duration,
    available: bool,
}

impl MockOracle {
    /// Construct a mock that always returns `response` immediately.
    #[must_use]
    pub fn new(response: OracleResponse) -> Self {
        Self { response, delay: Duration::ZERO, available: true }
    }

    /// Make this mock wait `delay` before responding, to exercise the
    /// caller's timeout-wrapping behavior.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make `is_available` report `false`.
    #[must_use]
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

#[async_trait]
impl OracleClient for MockOracle {
    async fn analyze(&self, _request: OracleRequest, _deadline: Duration) -> OracleResponse {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response.clone()
    }

    fn is_available(&self) -> bool {
        self.available
    }
}
