//! The decision engine: `Engine::analyze` is the single entrypoint. Pure
//! with respect to external mutation except for cache writes and
//! approval-ticket creation.

use crate::cache::DecisionCache;
use crate::resolver;
use sentryqc_approval::{ApprovalStore, FastPathOutcome};
use sentryqc_config::EngineConfig;
use sentryqc_core::{
    fingerprint, Action, ApprovalMethod, CallContext, Detection, PendingApproval, Severity,
    ThreatCategory,
};
use sentryqc_oracle::{OracleClient, OracleRequest};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex as AsyncMutex;

/// Default soft cap on the number of cached decisions.
pub const DEFAULT_CACHE_SIZE: usize = 10_000;

/// Default time-to-live for a cached decision. Not a persisted config
/// option — cache TTL stays an engine-internal tuning constant, distinct
/// from approval-ticket or oracle-response TTLs, which *are* configurable.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Bits of an `AnalyzeOutcome` the host layer needs beyond the
/// `AnalysisResult` envelope itself: the effective tool input after any
/// agent-confirm parameter stripping. `sentryqc-host::before_tool_call`
/// surfaces this as `params`.
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    /// The resolved analysis result.
    pub result: AnalysisResultView,
    /// The tool input the call should actually proceed with — identical to
    /// the input passed in, except on the agent-confirm fast path, where
    /// the confirm parameter has been stripped.
    pub effective_input: Value,
}

/// Re-exported for callers that only need the core type; kept as a
/// type alias so this crate's public API reads as "engine vocabulary"
/// without forcing every caller to depend on `sentryqc-core` directly.
pub type AnalysisResultView = sentryqc_core::AnalysisResult;

/// Dispatches the five pattern detectors, resolves an action, gates oracle
/// escalation, and caches decisions by call fingerprint.
///
/// Constructed from an `Arc<EngineConfig>`; detector configuration is
/// immutable for the engine's lifetime — a caller that wants to
/// reconfigure builds a new `Engine` and swaps the `Arc<Engine>` at the
/// call site.
pub struct Engine {
    config: Arc<EngineConfig>,
    cache: DecisionCache,
    approval_store: ApprovalStore,
    oracle: Option<Arc<dyn OracleClient>>,
    daily_spent_cents: AtomicU64,
    daily_spent_guard: AsyncMutex<()>,
}

impl Engine {
    /// Construct an engine from `config`, an `approval_store` (owned by the
    /// caller so it can be shared with a host's approval HTTP surface), and
    /// an optional oracle client.
    #[must_use]
    pub fn new(
        config: Arc<EngineConfig>,
        approval_store: ApprovalStore,
        oracle: Option<Arc<dyn OracleClient>>,
    ) -> Self {
        Self {
            config,
            cache: DecisionCache::new(DEFAULT_CACHE_SIZE),
            approval_store,
            oracle,
            daily_spent_cents: AtomicU64::new(0),
            daily_spent_guard: AsyncMutex::new(()),
        }
    }

    /// The approval store this engine creates tickets in. Exposed so a host
    /// can wire up native/webhook approval resolution against the same
    /// store the engine reads from.
    #[must_use]
    pub fn approval_store(&self) -> &ApprovalStore {
        &self.approval_store
    }

    /// Number of entries currently in the decision cache.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// The configuration this engine was constructed from. Exposed so a
    /// host can build a human-readable summary of active rules without
    /// duplicating the engine's own config.
    #[must_use]
    pub fn config(&self) -> &Arc<EngineConfig> {
        &self.config
    }

    fn daily_spent(&self) -> f64 {
        self.daily_spent_cents.load(Ordering::Relaxed) as f64 / 100.0
    }

    async fn record_spend(&self, amount: f64) {
        if amount <= 0.0 {
            return;
        }
        let _guard = self.daily_spent_guard.lock().await;
        let cents = (amount * 100.0).round() as u64;
        self.daily_spent_cents.fetch_add(cents, Ordering::Relaxed);
    }

    /// Analyze one tool call end to end: agent-confirm fast path, cache
    /// probe, detector dispatch, action resolution, oracle escalation, and
    /// (on `confirm`) approval-ticket creation.
    pub async fn analyze(&self, ctx: CallContext) -> AnalyzeOutcome {
        let started = Instant::now();

        if !self.config.global_enabled {
            return AnalyzeOutcome {
                result: allow_result(Vec::new(), false, started),
                effective_input: ctx.tool_input,
            };
        }

        // Agent-confirm fast path. Runs before the cache probe and, on
        // success, skips detection entirely — presenting a valid ticket is
        // authorization, not identity.
        if self.config.approval.agent_confirm.enabled {
            let parameter_name = &self.config.approval.agent_confirm.parameter_name;
            match sentryqc_approval::check_fast_path(&self.approval_store, &ctx.tool_input, parameter_name) {
                FastPathOutcome::NotPresent => {}
                FastPathOutcome::Allowed { stripped_input } => {
                    return AnalyzeOutcome {
                        result: allow_result(Vec::new(), false, started),
                        effective_input: stripped_input,
                    };
                }
                FastPathOutcome::Blocked { reason } => {
                    let detection = Detection::new(
                        ThreatCategory::Unknown,
                        Severity::High,
                        1.0,
                        format!("agent-confirm parameter rejected: {reason}"),
                    );
                    return AnalyzeOutcome {
                        result: block_result(vec![detection], started),
                        effective_input: ctx.tool_input,
                    };
                }
            }
        }

        // The fingerprint is computed on the input with the confirm
        // parameter stripped, whether or not it was present — presenting a
        // ticket is authorization, not identity.
        let fingerprint_input = strip_confirm_parameter(
            &ctx.tool_input,
            &self.config.approval.agent_confirm.parameter_name,
        );
        let call_fingerprint = fingerprint::compute(&ctx.tool_name, &fingerprint_input);

        if let Some(mut cached) = self.cache.get(call_fingerprint) {
            // A cached `confirm` result carries a ticket id from whatever
            // call first produced it; that ticket may since have expired or
            // been resolved. Rather than cache a mutable ticket reference, a
            // fresh ticket is minted on every cache hit, so the ticket id is
            // regenerated on every replay of a cached `confirm`.
            if cached.action == Action::Confirm {
                if let Some(detection) = cached.primary_detection().cloned() {
                    let ticket = self.approval_store.create(
                        detection,
                        ctx.tool_input.clone(),
                        self.config.approval.native.timeout,
                    );
                    cached.pending_approval = Some(self.pending_view(&ticket));
                }
            }
            return AnalyzeOutcome { result: cached, effective_input: ctx.tool_input };
        }

        let daily_spent = self.daily_spent();
        let detections = self.dispatch_detectors(&ctx, daily_spent).await;
        let sorted = sort_detections(detections);

        let resolution = resolver::resolve(&sorted, &self.config);
        let oracle_available = self.oracle.as_ref().is_some_and(|o| o.is_available());
        let gated = resolver::gate_escalation(resolution, self.config.llm.enabled, oracle_available);

        let mut final_action = gated.action;
        if gated.requires_oracle {
            if let Some(oracle) = &self.oracle {
                let primary = sorted.first().cloned();
                let request = OracleRequest {
                    tool_name: ctx.tool_name.clone(),
                    tool_input: ctx.tool_input.clone(),
                    detections: primary.into_iter().collect(),
                };
                let response = oracle.analyze(request, self.config.llm.timeout).await;
                if resolver::is_fallback_response(&response) {
                    tracing::warn!(tool = %ctx.tool_name, "oracle escalation fell back to pattern action");
                }
                final_action = resolver::apply_oracle_override(gated.action, &response);
            }
        }

        // Explicit config action always wins over the oracle: the engine
        // never downgrades a `block` produced by explicit configuration,
        // even if the oracle says "safe".
        if let Some(primary) = sorted.first() {
            if let Some(explicit) = self.config.action_override_for(primary.category) {
                if explicit == Action::Block {
                    final_action = Action::Block;
                }
            }
        }

        if final_action == Action::Allow {
            if let Some(amount) = purchase_amount(&ctx.tool_input) {
                self.record_spend(amount).await;
            }
        }

        let mut result = AnalysisResultView {
            action: final_action,
            detections: sorted,
            requires_oracle: false,
            cached: false,
            duration_ms: elapsed_ms(started),
            pending_approval: None,
        };

        if final_action == Action::Confirm {
            let detection = result.primary_detection().cloned().unwrap_or_else(|| {
                Detection::new(ThreatCategory::Unknown, Severity::Medium, 0.5, "confirmation required")
            });
            let ticket = self.approval_store.create(
                detection,
                ctx.tool_input.clone(),
                self.config.approval.native.timeout,
            );
            tracing::info!(tool = %ctx.tool_name, ticket = %ticket.id, "created approval ticket");
            result.pending_approval = Some(self.pending_view(&ticket));
        } else if final_action == Action::Block {
            tracing::warn!(tool = %ctx.tool_name, "blocked tool call");
        }

        self.cache.set(call_fingerprint, result.clone(), DEFAULT_CACHE_TTL);

        AnalyzeOutcome { result, effective_input: ctx.tool_input }
    }

    /// Rebuild a fresh client-facing [`PendingApproval`] view for an
    /// existing ticket, regenerating `expiresInSeconds` from the wall
    /// clock. Used both when a `confirm` result is first produced and when
    /// a cached `confirm` result is re-served, so the remaining-time figure
    /// always reflects the moment the view is served rather than the moment
    /// the ticket was minted.
    #[must_use]
    pub fn pending_view(&self, ticket: &sentryqc_approval::ApprovalTicket) -> PendingApproval {
        let mut methods = vec![ApprovalMethod::Native];
        if self.config.approval.agent_confirm.enabled {
            methods.push(ApprovalMethod::AgentConfirm);
        }
        if self.config.approval.webhook.is_available() {
            methods.push(ApprovalMethod::Webhook);
        }
        ticket.pending_view(sentryqc_core::ids::now_ms(), methods)
    }

    async fn dispatch_detectors(&self, ctx: &CallContext, daily_spent: f64) -> Vec<Detection> {
        let cfg = &self.config.detectors;
        let (purchase, website, destructive, secrets, exfiltration) = tokio::join!(
            async { sentryqc_detectors::purchase::detect(ctx, &cfg.purchase, daily_spent) },
            async { sentryqc_detectors::website::detect(ctx, &cfg.website) },
            async { sentryqc_detectors::destructive::detect(ctx, &cfg.destructive) },
            async { sentryqc_detectors::secrets::detect(ctx, &cfg.secrets) },
            async { sentryqc_detectors::exfiltration::detect(ctx, &cfg.exfiltration) },
        );
        [purchase, website, destructive, secrets, exfiltration].into_iter().flatten().collect()
    }
}

fn sort_detections(mut detections: Vec<Detection>) -> Vec<Detection> {
    detections.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| category_name(a.category).cmp(category_name(b.category)))
    });
    detections
}

fn category_name(category: ThreatCategory) -> &'static str {
    match category {
        ThreatCategory::Purchase => "purchase",
        ThreatCategory::Website => "website",
        ThreatCategory::Destructive => "destructive",
        ThreatCategory::Secrets => "secrets",
        ThreatCategory::Exfiltration => "exfiltration",
        ThreatCategory::Unknown => "unknown",
    }
}

fn strip_confirm_parameter(input: &Value, parameter_name: &str) -> Value {
    let mut stripped = input.clone();
    if let Some(map) = stripped.as_object_mut() {
        map.remove(parameter_name);
    }
    stripped
}

fn purchase_amount(input: &Value) -> Option<f64> {
    input.get("amount").and_then(Value::as_f64)
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

fn allow_result(detections: Vec<Detection>, cached: bool, started: Instant) -> AnalysisResultView {
    AnalysisResultView {
        action: Action::Allow,
        detections,
        requires_oracle: false,
        cached,
        duration_ms: elapsed_ms(started),
        pending_approval: None,
    }
}

fn block_result(detections: Vec<Detection>, started: Instant) -> AnalysisResultView {
    AnalysisResultView {
        action: Action::Block,
        detections,
        requires_oracle: false,
        cached: false,
        duration_ms: elapsed_ms(started),
        pending_approval: None,
    }
}
