//! A stub oracle that is never available — for configurations with
//! `llm.enabled = false`.

use crate::client::OracleClient;
use crate::types::{OracleRequest, OracleResponse};
use async_trait::async_trait;
use std::time::Duration;

/// Always reports `is_available() == false`; `analyze` still returns the
/// uncertain fallback if called anyway, rather than panicking.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableOracle;

#[async_trait]
impl OracleClient for UnavailableOracle {
    async fn analyze(&self, _request: OracleRequest, _deadline: Duration) -> OracleResponse {
        OracleResponse::uncertain("oracle is disabled")
    }

    fn is_available(&self) -> bool {
        false
    }
}
