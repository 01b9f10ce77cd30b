//! The three hook implementations, each fail-open at its own boundary.
//!
//! Follows the same hook-boundary discipline used elsewhere in this workspace: every
//! `Orchestrator` RPC method maps internal errors to a `Status` rather than
//! panicking. The analogous boundary here maps a panic to the hook's no-op
//! allow/empty result, since the hook methods are themselves infallible by
//! contract — there is no error variant to return, only the no-op result.
//!
//! `before_tool_call` is `async` (it may await the oracle inside
//! `Engine::analyze`); a panic inside it is caught by spawning the work on
//! a `tokio` task and inspecting the resulting `JoinError`, since
//! `std::panic::catch_unwind` cannot wrap a `Future` directly.
//! `before_agent_start` and `tool_result_persist` are synchronous and use
//! `catch_unwind` directly.

use crate::session::SeenSessions;
use crate::types::{
    action_requires_block, BeforeAgentStartContext, BeforeAgentStartResult, BeforeToolCallContext,
    BeforeToolCallMetadata, BeforeToolCallResult, PersistedMessage, ToolResultPersistContext,
    ToolResultPersistResult,
};
use sentryqc_core::ThreatCategory;
use sentryqc_engine::Engine;
use sentryqc_sanitizer::SanitizerConfig;
use sentryqc_telemetry::{AuditEvent, AuditSink, NoopSender, NotificationSender};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// The consumer-facing hook surface. Owns nothing the engine doesn't
/// already own except session tracking, the audit sink, and the
/// notification sender — all three are explicit constructor arguments,
/// keeping approval store, engine, and oracle wiring visible at the call
/// site rather than hidden behind a global singleton.
pub struct Host {
    engine: Arc<Engine>,
    sanitizer: SanitizerConfig,
    sessions: SeenSessions,
    audit: AuditSink,
    notifier: Arc<dyn NotificationSender>,
}

impl Host {
    /// Construct a host around an already-built `engine`, using `engine`'s
    /// own configuration's sanitizer tuning.
    #[must_use]
    pub fn new(engine: Arc<Engine>, audit: AuditSink) -> Self {
        let sanitizer = engine.config().sanitizer.clone();
        Self { engine, sanitizer, sessions: SeenSessions::new(), audit, notifier: Arc::new(NoopSender) }
    }

    /// Replace the notification sender (default: [`NoopSender`]).
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSender>) -> Self {
        self.notifier = notifier;
        self
    }

    /// `beforeAgentStart`: emit the system-prompt addition at most once per
    /// session id.
    pub fn before_agent_start(&self, ctx: BeforeAgentStartContext) -> BeforeAgentStartResult {
        let sessions = self.sessions.clone();
        let config = self.engine.config().clone();
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            if !sessions.mark_first_seen(&ctx.session_id) {
                return BeforeAgentStartResult::default();
            }
            BeforeAgentStartResult { system_prompt_addition: Some(summarize_rules(&config)) }
        }));
        outcome.unwrap_or_else(|panic| {
            tracing::error!(session_id = %ctx.session_id, panic = %panic_message(&panic), "beforeAgentStart panicked");
            BeforeAgentStartResult::default()
        })
    }

    /// `beforeToolCall`: run the decision engine and translate its result
    /// into the host-facing shape, emitting an audit event for whatever
    /// fired.
    pub async fn before_tool_call(&self, ctx: BeforeToolCallContext) -> BeforeToolCallResult {
        let engine = Arc::clone(&self.engine);
        let audit = self.audit.clone();
        let notifier = Arc::clone(&self.notifier);
        let tool_name = ctx.tool_name.clone();
        let tool_input = ctx.tool_input.clone();

        let call_ctx = sentryqc_core::CallContext::new(tool_name.clone(), tool_input.clone());
        let spawned = tokio::spawn(async move {
            let outcome = engine.analyze(call_ctx).await;
            for detection in &outcome.result.detections {
                let event = AuditEvent::Detection {
                    tool_name: tool_name.clone(),
                    detection: detection.clone(),
                    action: outcome.result.action,
                };
                audit.emit(event.clone());
                notifier.send(&event);
            }
            outcome
        });

        match spawned.await {
            Ok(outcome) => {
                let action = outcome.result.action;
                let primary = outcome.result.primary_detection().cloned();
                let params =
                    (outcome.effective_input != ctx.tool_input).then_some(outcome.effective_input);
                let block = action_requires_block(action);
                let block_reason = if block {
                    Some(block_reason_for(action, &outcome.result))
                } else {
                    None
                };
                let metadata = primary.map(|d| BeforeToolCallMetadata {
                    category: d.category,
                    severity: d.severity,
                    rule: Some(category_rule_name(d.category)),
                    reason: d.reason,
                });
                BeforeToolCallResult { block, block_reason, params, metadata }
            }
            Err(join_err) => {
                tracing::error!(
                    tool = %ctx.tool_name,
                    panicked = join_err.is_panic(),
                    "beforeToolCall failed; failing open"
                );
                BeforeToolCallResult::allow()
            }
        }
    }

    /// `toolResultPersist`: sanitize the output and report what changed.
    pub fn tool_result_persist(&self, ctx: ToolResultPersistContext) -> ToolResultPersistResult {
        let sanitizer = self.sanitizer.clone();
        let audit = self.audit.clone();
        let tool_name = ctx.tool_name.clone();
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let result = sentryqc_sanitizer::sanitize(&ctx.output, &sanitizer);
            if !result.was_redacted {
                return ToolResultPersistResult::default();
            }
            audit.emit(AuditEvent::SanitizerHit {
                tool_name: tool_name.clone(),
                redaction_types: result.redactions.iter().map(|r| r.r#type.clone()).collect(),
            });
            ToolResultPersistResult {
                message: Some(PersistedMessage {
                    content: Some(result.filtered_value),
                    redactions: Some(result.redactions),
                }),
            }
        }));
        outcome.unwrap_or_else(|panic| {
            tracing::error!(tool = %ctx.tool_name, panic = %panic_message(&panic), "toolResultPersist panicked");
            ToolResultPersistResult::default()
        })
    }
}

fn block_reason_for(action: sentryqc_core::Action, result: &sentryqc_engine::AnalysisResultView) -> String {
    if action == sentryqc_core::Action::Confirm {
        let ticket = result.pending_approval.as_ref();
        let id = ticket.map_or("<none>", |p| p.id.as_str());
        return format!("confirmation required; ticket {id} pending approval");
    }
    result
        .primary_detection()
        .map_or_else(|| "blocked".to_string(), |d| d.reason.clone())
}

fn category_rule_name(category: ThreatCategory) -> String {
    match category {
        ThreatCategory::Purchase => "rules.purchase",
        ThreatCategory::Website => "rules.website",
        ThreatCategory::Destructive => "rules.destructive",
        ThreatCategory::Secrets => "rules.secrets",
        ThreatCategory::Exfiltration => "rules.exfiltration",
        ThreatCategory::Unknown => "rules.unknown",
    }
    .to_string()
}

fn summarize_rules(config: &sentryqc_config::EngineConfig) -> String {
    let mut lines = vec![
        "This session is governed by an automated tool-call policy.".to_string(),
        format!(
            "A reserved parameter named `{}` carries approval ticket ids; include it verbatim to resume a confirmed call.",
            config.approval.agent_confirm.parameter_name
        ),
    ];
    if !config.detectors.destructive.enabled {
        lines.push("Destructive-operation detection is disabled for this session.".to_string());
    }
    if !config.detectors.secrets.enabled {
        lines.push("Secret-material detection is disabled for this session.".to_string());
    }
    lines.join(" ")
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentryqc_approval::ApprovalStore;
    use sentryqc_config::EngineConfig;
    use serde_json::json;

    fn host() -> Host {
        let engine = Arc::new(Engine::new(Arc::new(EngineConfig::default()), ApprovalStore::new(), None));
        Host::new(engine, AuditSink::new())
    }

    #[test]
    fn before_agent_start_fires_once_per_session() {
        let host = host();
        let ctx = || BeforeAgentStartContext { session_id: "s1".to_string() };
        let first = host.before_agent_start(ctx());
        assert!(first.system_prompt_addition.is_some());
        let second = host.before_agent_start(ctx());
        assert!(second.system_prompt_addition.is_none());
    }

    #[test]
    fn before_agent_start_fires_independently_per_session() {
        let host = host();
        let first = host.before_agent_start(BeforeAgentStartContext { session_id: "s1".to_string() });
        let second = host.before_agent_start(BeforeAgentStartContext { session_id: "s2".to_string() });
        assert!(first.system_prompt_addition.is_some());
        assert!(second.system_prompt_addition.is_some());
    }

    #[tokio::test]
    async fn before_tool_call_allows_benign_calls() {
        let host = host();
        let ctx = BeforeToolCallContext {
            session_id: "s1".to_string(),
            tool_name: "read_file".to_string(),
            tool_input: json!({"path": "/tmp/a.txt"}),
        };
        let result = host.before_tool_call(ctx).await;
        assert!(!result.block);
        assert!(result.metadata.is_none());
    }

    #[tokio::test]
    async fn before_tool_call_blocks_destructive_commands() {
        let host = host();
        let ctx = BeforeToolCallContext {
            session_id: "s1".to_string(),
            tool_name: "bash".to_string(),
            tool_input: json!({"command": "rm -rf /"}),
        };
        let result = host.before_tool_call(ctx).await;
        assert!(result.block);
        assert!(result.block_reason.is_some());
        let metadata = result.metadata.expect("expected metadata");
        assert_eq!(metadata.category, ThreatCategory::Destructive);
    }

    #[test]
    fn tool_result_persist_passes_through_benign_output() {
        let host = host();
        let ctx = ToolResultPersistContext {
            session_id: "s1".to_string(),
            tool_name: "read_file".to_string(),
            output: json!({"content": "nothing sensitive here"}),
        };
        let result = host.tool_result_persist(ctx);
        assert!(result.message.is_none());
    }

    #[test]
    fn tool_result_persist_redacts_secrets() {
        let host = host();
        let ctx = ToolResultPersistContext {
            session_id: "s1".to_string(),
            tool_name: "read_file".to_string(),
            output: json!({"content": "AWS_SECRET_ACCESS_KEY=wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY"}),
        };
        let result = host.tool_result_persist(ctx);
        let message = result.message.expect("expected a redacted message");
        assert!(!message.redactions.unwrap_or_default().is_empty());
    }
}
