//! Purchase / financial-transaction detector.
//!
//! Four independent sub-checks, tried in priority order (first match wins):
//! a spend-limit evaluator for amount-bearing calls, a domain matcher over
//! `ctx.url` (known payment domains plus the configured allow/blocklist), a
//! URL-path matcher (checkout/order/billing/api paths, tiered confidence),
//! a form-field matcher for payment-shaped input fields, and finally a
//! checkout-keyword fallback over the whole call.

use crate::config::{PurchaseConfig, WebsiteMode};
use crate::website::{build_globset, extract_host};
use regex::Regex;
use sentryqc_core::{CallContext, Detection, Severity, ThreatCategory};
use std::sync::OnceLock;

fn checkout_keywords() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(place[_\s-]?order|confirm[_\s-]?purchase|checkout|buy[_\s-]?now|add[_\s-]?to[_\s-]?cart|submit[_\s-]?payment|pay[_\s-]?now)\b")
            .expect("static pattern is valid")
    })
}

fn amount_field(input: &serde_json::Value) -> Option<f64> {
    for key in ["amount", "total", "price", "cost", "value"] {
        if let Some(v) = input.get(key) {
            if let Some(n) = v.as_f64() {
                return Some(n);
            }
            if let Some(s) = v.as_str() {
                if let Ok(n) = s.trim_start_matches('$').replace(',', "").parse::<f64>() {
                    return Some(n);
                }
            }
        }
    }
    None
}

/// Hosts recognized as payment processors/checkout flows regardless of
/// user configuration. Merged into the blocklist check alongside
/// `cfg.domain_blocklist`; a real deployment would keep this list alongside
/// a feed rather than hardcoded, but the shape (glob patterns checked with
/// the same matcher `website` uses) is the same either way.
const KNOWN_PAYMENT_DOMAINS: &[&str] = &[
    "checkout.stripe.com",
    "*.stripe.com",
    "*.paypal.com",
    "paypal.me",
    "checkout.shopify.com",
    "*.myshopify.com",
    "buy.itunes.apple.com",
    "pay.google.com",
    "*.squareup.com",
    "*.braintreegateway.com",
];

/// Match `ctx.url`'s host against the domain matcher. In `Allowlist` mode,
/// any host not on `cfg.domain_allowlist` matches; in `Blocklist` mode, the
/// built-in known-payment-domain list plus `cfg.domain_blocklist` matches.
fn domain_match(ctx: &CallContext, cfg: &PurchaseConfig) -> Option<(String, f64)> {
    let url = ctx.url.as_ref()?;
    let host = extract_host(url)?;
    match cfg.domain_mode {
        WebsiteMode::Allowlist => {
            let set = build_globset(&cfg.domain_allowlist);
            (!set.is_match(&host)).then_some((host, 0.9))
        }
        WebsiteMode::Blocklist => {
            let mut patterns: Vec<String> = KNOWN_PAYMENT_DOMAINS.iter().map(|p| (*p).to_string()).collect();
            patterns.extend(cfg.domain_blocklist.iter().cloned());
            let set = build_globset(&patterns);
            set.is_match(&host).then_some((host, 0.9))
        }
    }
}

fn extract_path(url: &str) -> Option<String> {
    let without_scheme = url.split("://").nth(1).unwrap_or(url);
    let path = without_scheme.splitn(2, '/').nth(1)?;
    Some(format!("/{}", path.to_lowercase()))
}

/// Tiered URL-path matcher: checkout/billing/order/api/cart paths, each
/// with its own confidence.
fn path_match(ctx: &CallContext) -> Option<(&'static str, f64)> {
    let url = ctx.url.as_ref()?;
    let path = extract_path(url)?;
    if path.contains("checkout") {
        Some(("checkout", 0.9))
    } else if path.contains("billing") {
        Some(("billing", 0.8))
    } else if path.contains("order") {
        Some(("order", 0.75))
    } else if path.contains("/api/") && (path.contains("pay") || path.contains("charge")) {
        Some(("api", 0.7))
    } else if path.contains("cart") {
        Some(("cart", 0.6))
    } else {
        None
    }
}

const SENSITIVE_FORM_FIELDS: &[&str] =
    &["card_number", "cvv", "cvc", "card_expiry", "cardholder_name", "routing_number", "account_number"];

/// Payment-shaped form fields present in the call's input (e.g.
/// `card_number`, `cvv`).
fn form_field_match(input: &serde_json::Value) -> Option<Vec<&'static str>> {
    let obj = input.as_object()?;
    let matched: Vec<&'static str> =
        SENSITIVE_FORM_FIELDS.iter().copied().filter(|field| obj.contains_key(*field)).collect();
    (!matched.is_empty()).then_some(matched)
}

/// Run the purchase detector against `ctx`.
///
/// `daily_spent` is the caller-tracked running total already spent today;
/// the detector itself is stateless and does not persist it.
#[must_use]
pub fn detect(ctx: &CallContext, cfg: &PurchaseConfig, daily_spent: f64) -> Option<Detection> {
    if !cfg.enabled {
        return None;
    }

    let haystack = format!("{} {}", ctx.tool_name, ctx.tool_input);
    let keyword_hit = checkout_keywords().is_match(&haystack);
    let amount = amount_field(&ctx.tool_input);
    let url_hit = ctx.url.is_some();
    let form_hit = form_field_match(&ctx.tool_input).is_some();

    if !keyword_hit && amount.is_none() && !url_hit && !form_hit {
        return None;
    }

    let severity = cfg.severity_override.unwrap_or(Severity::Medium);

    if let Some(amount) = amount {
        if let Some(limit) = cfg.per_transaction_limit {
            if amount > limit {
                return Some(
                    Detection::new(
                        ThreatCategory::Purchase,
                        cfg.severity_override.unwrap_or(Severity::High),
                        0.9,
                        format!("transaction amount {amount:.2} exceeds per-transaction limit {limit:.2}"),
                    )
                    .with_metadata("amount", amount)
                    .with_metadata("limit", limit)
                    .with_metadata("limitKind", "perTransaction"),
                );
            }
        }
        if let Some(limit) = cfg.daily_limit {
            if daily_spent + amount > limit {
                return Some(
                    Detection::new(
                        ThreatCategory::Purchase,
                        cfg.severity_override.unwrap_or(Severity::High),
                        0.9,
                        format!(
                            "cumulative daily spend {:.2} would exceed daily limit {limit:.2}",
                            daily_spent + amount
                        ),
                    )
                    .with_metadata("amount", amount)
                    .with_metadata("dailySpent", daily_spent)
                    .with_metadata("limit", limit)
                    .with_metadata("limitKind", "daily"),
                );
            }
        }
    }

    if let Some((domain, confidence)) = domain_match(ctx, cfg) {
        return Some(
            Detection::new(
                ThreatCategory::Purchase,
                severity,
                confidence,
                format!("call targets payment domain {domain}"),
            )
            .with_metadata("domain", domain),
        );
    }

    if let Some((path_kind, confidence)) = path_match(ctx) {
        return Some(
            Detection::new(
                ThreatCategory::Purchase,
                severity,
                confidence,
                format!("call URL path matches a {path_kind} pattern"),
            )
            .with_metadata("pathKind", path_kind),
        );
    }

    if let Some(fields) = form_field_match(&ctx.tool_input) {
        return Some(
            Detection::new(
                ThreatCategory::Purchase,
                severity,
                0.8,
                "call input contains payment-shaped form fields",
            )
            .with_metadata("fields", fields),
        );
    }

    if keyword_hit {
        return Some(
            Detection::new(ThreatCategory::Purchase, severity, 0.7, "call matches a checkout/purchase pattern")
                .with_metadata("toolName", ctx.tool_name.clone()),
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_match_on_unrelated_call() {
        let ctx = CallContext::new("read_file", json!({"path": "/tmp/a.txt"}));
        assert!(detect(&ctx, &PurchaseConfig::default(), 0.0).is_none());
    }

    #[test]
    fn matches_checkout_keyword() {
        let ctx = CallContext::new("http_post", json!({"path": "/checkout"}));
        let d = detect(&ctx, &PurchaseConfig::default(), 0.0).unwrap();
        assert_eq!(d.category, ThreatCategory::Purchase);
    }

    #[test]
    fn flags_over_per_transaction_limit() {
        let ctx = CallContext::new("place_order", json!({"amount": 500.0}));
        let cfg = PurchaseConfig { per_transaction_limit: Some(100.0), ..Default::default() };
        let d = detect(&ctx, &cfg, 0.0).unwrap();
        assert_eq!(d.severity, Severity::High);
    }

    #[test]
    fn flags_over_daily_limit() {
        let ctx = CallContext::new("place_order", json!({"amount": 50.0}));
        let cfg = PurchaseConfig { daily_limit: Some(100.0), ..Default::default() };
        let d = detect(&ctx, &cfg, 80.0).unwrap();
        assert!(d.reason.contains("daily"));
    }

    #[test]
    fn disabled_never_fires() {
        let ctx = CallContext::new("place_order", json!({"amount": 99999.0}));
        let cfg = PurchaseConfig { enabled: false, ..Default::default() };
        assert!(detect(&ctx, &cfg, 0.0).is_none());
    }

    fn ctx_with_url(url: &str) -> CallContext {
        let mut ctx = CallContext::new("http_get", json!({}));
        ctx.url = Some(url.to_string());
        ctx
    }

    #[test]
    fn known_payment_domain_is_flagged_with_domain_in_metadata() {
        let ctx = ctx_with_url("https://checkout.stripe.com/pay");
        let d = detect(&ctx, &PurchaseConfig::default(), 0.0).unwrap();
        assert_eq!(d.category, ThreatCategory::Purchase);
        assert_eq!(d.metadata.get("domain"), Some(&json!("checkout.stripe.com")));
    }

    #[test]
    fn domain_allowlist_mode_flags_anything_not_listed() {
        let cfg = PurchaseConfig {
            domain_mode: WebsiteMode::Allowlist,
            domain_allowlist: vec!["*.trusted-merchant.com".to_string()],
            ..Default::default()
        };
        assert!(detect(&ctx_with_url("https://pay.trusted-merchant.com"), &cfg, 0.0).is_none());
        let d = detect(&ctx_with_url("https://random-shop.example"), &cfg, 0.0).unwrap();
        assert_eq!(d.metadata.get("domain"), Some(&json!("random-shop.example")));
    }

    #[test]
    fn configured_domain_blocklist_entry_is_flagged() {
        let cfg = PurchaseConfig { domain_blocklist: vec!["*.sketchy-pay.example".to_string()], ..Default::default() };
        let d = detect(&ctx_with_url("https://checkout.sketchy-pay.example/order"), &cfg, 0.0).unwrap();
        assert_eq!(d.metadata.get("domain"), Some(&json!("checkout.sketchy-pay.example")));
    }

    #[test]
    fn url_path_matcher_flags_billing_path_with_tiered_confidence() {
        let ctx = ctx_with_url("https://unrelated-host.example/account/billing/invoice");
        let d = detect(&ctx, &PurchaseConfig::default(), 0.0).unwrap();
        assert_eq!(d.metadata.get("pathKind"), Some(&json!("billing")));
        assert!((d.confidence - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn form_field_matcher_flags_card_number_field() {
        let ctx = CallContext::new("submit_form", json!({"card_number": "4111111111111111", "cvv": "123"}));
        let d = detect(&ctx, &PurchaseConfig::default(), 0.0).unwrap();
        assert_eq!(d.reason, "call input contains payment-shaped form fields");
    }

    #[test]
    fn url_without_any_special_match_falls_back_to_none() {
        let ctx = ctx_with_url("https://example.com/about");
        assert!(detect(&ctx, &PurchaseConfig::default(), 0.0).is_none());
    }
}
