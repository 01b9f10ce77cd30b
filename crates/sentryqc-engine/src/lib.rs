//! The decision engine: dispatches the five pattern detectors, resolves an
//! action, gates oracle escalation, and caches decisions by call
//! fingerprint.
//!
//! `Engine` is the only public entrypoint most callers need; `resolver` and
//! `cache` are exposed for testing and for hosts that want to reason about
//! resolution independent of a live `Engine`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod engine;
pub mod resolver;

pub use cache::DecisionCache;
pub use engine::{AnalyzeOutcome, AnalysisResultView, Engine, DEFAULT_CACHE_SIZE, DEFAULT_CACHE_TTL};
pub use resolver::{apply_oracle_override, gate_escalation, is_fallback_response, resolve, Resolution};

#[cfg(test)]
mod tests {
    use super::*;
    use sentryqc_approval::ApprovalStore;
    use sentryqc_config::EngineConfig;
    use sentryqc_core::CallContext;
    use sentryqc_oracle::MockOracle;
    use serde_json::json;
    use std::sync::Arc;

    fn engine_with(config: EngineConfig) -> Engine {
        Engine::new(Arc::new(config), ApprovalStore::new(), None)
    }

    #[tokio::test]
    async fn benign_call_allows_with_no_detections() {
        let engine = engine_with(EngineConfig::default());
        let ctx = CallContext::new("read_file", json!({"path": "/tmp/notes.txt"}));
        let outcome = engine.analyze(ctx).await;
        assert_eq!(outcome.result.action, sentryqc_core::Action::Allow);
        assert!(outcome.result.detections.is_empty());
    }

    #[tokio::test]
    async fn globally_disabled_engine_allows_everything() {
        let mut config = EngineConfig::default();
        config.global_enabled = false;
        let engine = engine_with(config);
        let ctx = CallContext::new("bash", json!({"command": "rm -rf /"}));
        let outcome = engine.analyze(ctx).await;
        assert_eq!(outcome.result.action, sentryqc_core::Action::Allow);
    }

    #[tokio::test]
    async fn destructive_command_blocks() {
        let engine = engine_with(EngineConfig::default());
        let ctx = CallContext::new("bash", json!({"command": "rm -rf /"}));
        let outcome = engine.analyze(ctx).await;
        assert_eq!(outcome.result.action, sentryqc_core::Action::Block);
        assert!(!outcome.result.detections.is_empty());
    }

    #[tokio::test]
    async fn repeated_identical_call_is_served_from_cache() {
        let engine = engine_with(EngineConfig::default());
        let ctx = || CallContext::new("bash", json!({"command": "rm -rf /"}));
        let first = engine.analyze(ctx()).await;
        assert!(!first.result.cached);
        let second = engine.analyze(ctx()).await;
        assert!(second.result.cached);
        assert_eq!(second.result.action, first.result.action);
    }

    #[tokio::test]
    async fn confirm_action_creates_an_approval_ticket() {
        let mut config = EngineConfig::default();
        config.rule_action_overrides.insert(sentryqc_core::ThreatCategory::Destructive, sentryqc_core::Action::Confirm);
        let engine = engine_with(config);
        let ctx = CallContext::new("bash", json!({"command": "rm -rf /var/lib/data"}));
        let outcome = engine.analyze(ctx).await;
        assert_eq!(outcome.result.action, sentryqc_core::Action::Confirm);
        let pending = outcome.result.pending_approval.expect("expected a pending approval");
        assert!(!pending.id.is_empty());
        assert_eq!(engine.approval_store().len(), 1);
    }

    #[tokio::test]
    async fn cached_confirm_result_regenerates_the_ticket() {
        let mut config = EngineConfig::default();
        config.rule_action_overrides.insert(sentryqc_core::ThreatCategory::Destructive, sentryqc_core::Action::Confirm);
        let engine = engine_with(config);
        let ctx = || CallContext::new("bash", json!({"command": "rm -rf /var/lib/data"}));

        let first = engine.analyze(ctx()).await;
        let first_ticket = first.result.pending_approval.unwrap().id;

        let second = engine.analyze(ctx()).await;
        assert!(second.result.cached);
        let second_ticket = second.result.pending_approval.unwrap().id;

        assert_ne!(first_ticket, second_ticket);
        assert_eq!(engine.approval_store().len(), 2);
    }

    #[tokio::test]
    async fn agent_confirm_fast_path_allows_and_strips_parameter() {
        let engine = engine_with(EngineConfig::default());
        let ticket = engine.approval_store().create(
            sentryqc_core::Detection::new(
                sentryqc_core::ThreatCategory::Destructive,
                sentryqc_core::Severity::High,
                0.9,
                "rm -rf /var/lib/data",
            ),
            json!({"command": "rm -rf /var/lib/data"}),
            std::time::Duration::from_secs(60),
        );
        let ctx = CallContext::new(
            "bash",
            json!({"command": "rm -rf /var/lib/data", "_clawsec_confirm": ticket.id}),
        );
        let outcome = engine.analyze(ctx).await;
        assert_eq!(outcome.result.action, sentryqc_core::Action::Allow);
        assert_eq!(outcome.effective_input, json!({"command": "rm -rf /var/lib/data"}));
    }

    #[tokio::test]
    async fn invalid_agent_confirm_ticket_blocks() {
        let engine = engine_with(EngineConfig::default());
        let ctx = CallContext::new("bash", json!({"command": "ls", "_clawsec_confirm": "bogus"}));
        let outcome = engine.analyze(ctx).await;
        assert_eq!(outcome.result.action, sentryqc_core::Action::Block);
    }

    #[tokio::test]
    async fn oracle_escalation_can_downgrade_an_ambiguous_call() {
        let mut config = EngineConfig::default();
        config.llm.enabled = true;
        let oracle: Arc<dyn sentryqc_oracle::OracleClient> = Arc::new(MockOracle::new(sentryqc_oracle::OracleResponse {
            determination: sentryqc_oracle::Determination::Safe,
            confidence: 0.95,
            reasoning: "looks benign on review".into(),
            suggested_action: sentryqc_core::Action::Allow,
        }));
        let engine = Engine::new(Arc::new(config), ApprovalStore::new(), Some(oracle));
        // `confirm_purchase` matches the checkout-keyword pattern at medium
        // severity / 0.7 confidence — squarely in the resolver's
        // oracle-escalation band for medium severity.
        let ctx = CallContext::new("confirm_purchase", json!({"item": "office supplies"}));
        let outcome = engine.analyze(ctx).await;
        // The escalation flag is always cleared synchronously once oracle
        // escalation completes; what matters is that the oracle's strong
        // "safe" opinion won out over the pattern-based warn.
        assert!(!outcome.result.requires_oracle);
        assert_eq!(outcome.result.action, sentryqc_core::Action::Allow);
    }
}
