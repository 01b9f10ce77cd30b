//! Timeout-enforcing decorator: wraps any [`OracleClient`] and guarantees
//! that `analyze` returns within the caller-supplied deadline, mapping a
//! timeout to the canonical `{uncertain, 0.5, confirm}` fallback.

use crate::client::OracleClient;
use crate::types::{OracleRequest, OracleResponse};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Enforces a hard deadline on an inner [`OracleClient`].
pub struct TimeoutWrappingOracle<T> {
    inner: Arc<T>,
}

impl<T> TimeoutWrappingOracle<T> {
    /// Wrap `inner`.
    #[must_use]
    pub fn new(inner: Arc<T>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: OracleClient + 'static> OracleClient for TimeoutWrappingOracle<T> {
    async fn analyze(&self, request: OracleRequest, deadline: Duration) -> OracleResponse {
        match tokio::time::timeout(deadline, self.inner.analyze(request, deadline)).await {
            Ok(response) => response,
            Err(_) => OracleResponse::uncertain("oracle call exceeded its deadline"),
        }
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockOracle;
    use crate::types::{Determination, OracleResponse};
    use sentryqc_core::Action;

    #[tokio::test]
    async fn fast_inner_response_passes_through() {
        let inner = Arc::new(MockOracle::new(OracleResponse {
            determination: Determination::Threat,
            confidence: 0.95,
            reasoning: "clear threat".into(),
            suggested_action: Action::Block,
        }));
        let wrapped = TimeoutWrappingOracle::new(inner);
        let response = wrapped
            .analyze(
                crate::types::OracleRequest { tool_name: "bash".into(), tool_input: serde_json::json!({}), detections: vec![] },
                Duration::from_millis(500),
            )
            .await;
        assert_eq!(response.determination, Determination::Threat);
    }

    #[tokio::test]
    async fn slow_inner_response_falls_back_to_uncertain() {
        let inner = Arc::new(
            MockOracle::new(OracleResponse {
                determination: Determination::Threat,
                confidence: 0.95,
                reasoning: "too slow to matter".into(),
                suggested_action: Action::Block,
            })
            .with_delay(Duration::from_millis(200)),
        );
        let wrapped = TimeoutWrappingOracle::new(inner);
        let response = wrapped
            .analyze(
                crate::types::OracleRequest { tool_name: "bash".into(), tool_input: serde_json::json!({}), detections: vec![] },
                Duration::from_millis(20),
            )
            .await;
        assert_eq!(response.determination, Determination::Uncertain);
        assert_eq!(response.suggested_action, Action::Confirm);
        assert!((response.confidence - 0.5).abs() < 1e-9);
    }
}
