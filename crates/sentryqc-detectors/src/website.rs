//! Website navigation / domain allow-blocklist detector.
//!
//! `*.example.com` matches any subdomain of `example.com` but not the apex
//! itself; `example.com` matches only the exact host (no subdomains).

use crate::config::{WebsiteConfig, WebsiteMode};
use globset::{Glob, GlobSet, GlobSetBuilder};
use sentryqc_core::{CallContext, Detection, Severity, ThreatCategory};

pub(crate) fn build_globset(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(err) => {
                tracing::warn!(pattern = %pattern, error = %err, "skipping invalid website glob pattern");
            }
        }
    }
    builder.build().unwrap_or_else(|_| GlobSetBuilder::new().build().expect("empty globset always builds"))
}

pub(crate) fn extract_host(url: &str) -> Option<String> {
    let without_scheme = url.split("://").nth(1).unwrap_or(url);
    let host_and_rest = without_scheme.split(['/', '?', '#']).next().unwrap_or(without_scheme);
    let host = host_and_rest.rsplit('@').next().unwrap_or(host_and_rest);
    let host = host.split(':').next().unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}

/// A host category recognized independently of the configured allow/block
/// lists — malware and phishing always escalate regardless of mode;
/// gambling and adult only carry a warning, and only in blocklist mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostCategory {
    Malware,
    Phishing,
    Gambling,
    Adult,
}

impl HostCategory {
    fn label(self) -> &'static str {
        match self {
            Self::Malware => "malware",
            Self::Phishing => "phishing",
            Self::Gambling => "gambling",
            Self::Adult => "adult",
        }
    }
}

/// Keyword-based host classification. A real deployment would back this
/// with a threat-intel feed; absent one, hostnames are classified by the
/// same kind of keyword heuristic the other detectors in this crate use
/// (e.g. `purchase`'s checkout-keyword match).
fn classify_host(host: &str) -> Option<HostCategory> {
    const MALWARE: &[&str] = &["malware", "trojan", "botnet", "ransomware"];
    const PHISHING: &[&str] = &["phish", "credential-verify", "secure-login-update"];
    const GAMBLING: &[&str] = &["casino", "sportsbook", "poker", "betting", "wager"];
    const ADULT: &[&str] = &["xxx", "porn", "adult-content"];

    if MALWARE.iter().any(|k| host.contains(k)) {
        Some(HostCategory::Malware)
    } else if PHISHING.iter().any(|k| host.contains(k)) {
        Some(HostCategory::Phishing)
    } else if GAMBLING.iter().any(|k| host.contains(k)) {
        Some(HostCategory::Gambling)
    } else if ADULT.iter().any(|k| host.contains(k)) {
        Some(HostCategory::Adult)
    } else {
        None
    }
}

/// Run the website detector against `ctx`. Only fires when `ctx.url` is
/// present — a call with no URL has nothing to evaluate.
#[must_use]
pub fn detect(ctx: &CallContext, cfg: &WebsiteConfig) -> Option<Detection> {
    if !cfg.enabled {
        return None;
    }
    let url = ctx.url.as_ref()?;
    let host = extract_host(url)?;

    if let Some(category) = classify_host(&host) {
        match category {
            HostCategory::Malware | HostCategory::Phishing => {
                return Some(
                    Detection::new(
                        ThreatCategory::Website,
                        Severity::Critical,
                        0.97,
                        format!("host {host} is classified as {}", category.label()),
                    )
                    .with_metadata("host", host)
                    .with_metadata("category", category.label()),
                );
            }
            HostCategory::Gambling | HostCategory::Adult if cfg.mode == WebsiteMode::Blocklist => {
                return Some(
                    Detection::new(
                        ThreatCategory::Website,
                        Severity::Medium,
                        0.7,
                        format!("host {host} is classified as {}", category.label()),
                    )
                    .with_metadata("host", host)
                    .with_metadata("category", category.label()),
                );
            }
            HostCategory::Gambling | HostCategory::Adult => {}
        }
    }

    let severity = cfg.severity_override.unwrap_or(Severity::Medium);

    match cfg.mode {
        WebsiteMode::Allowlist => {
            let set = build_globset(&cfg.allowlist);
            if set.is_match(&host) {
                None
            } else {
                Some(
                    Detection::new(
                        ThreatCategory::Website,
                        severity,
                        0.85,
                        format!("host {host} is not on the configured allowlist"),
                    )
                    .with_metadata("host", host)
                    .with_metadata("mode", "allowlist"),
                )
            }
        }
        WebsiteMode::Blocklist => {
            let set = build_globset(&cfg.blocklist);
            if set.is_match(&host) {
                Some(
                    Detection::new(
                        ThreatCategory::Website,
                        severity,
                        0.85,
                        format!("host {host} matches the configured blocklist"),
                    )
                    .with_metadata("host", host)
                    .with_metadata("mode", "blocklist"),
                )
            } else {
                None
            }
        }
    }
}
