//! Secret filter: the same provider/PEM catalogue the `secrets` detector
//! uses (imported, not duplicated — see [`sentryqc_detectors::provider_patterns`]),
//! plus JWTs, bearer tokens, SSNs, credit cards, and generic
//! `password=`/`api_key=` assignments. Matches are replaced in-place by
//! `[REDACTED:<type>]`; each distinct type produces exactly one redaction
//! record per invocation regardless of hit count.

use regex::Regex;
use sentryqc_detectors::provider_patterns;
use std::sync::OnceLock;

/// One redacted secret type, deduplicated by `type` for the sanitizer's
/// redaction manifest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SecretRedaction {
    /// Short tag identifying the kind of secret.
    pub r#type: String,
    /// Human-readable description.
    pub description: String,
}

fn generic_assignment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(password|passwd|api[_-]?key|secret)\s*[:=]\s*['"]?[^\s'"]{6,}['"]?"#)
            .expect("static pattern is valid")
    })
}

fn ssn_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("static pattern is valid"))
}

fn card_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:\d[ -]?){13,19}\b").expect("static pattern is valid"))
}

/// Apply the secret filter to `text`, returning the redacted text and the
/// set of distinct secret types found.
#[must_use]
pub fn filter(text: &str) -> (String, Vec<SecretRedaction>) {
    let mut out = text.to_string();
    let mut found = std::collections::BTreeSet::new();

    for pattern in provider_patterns() {
        if pattern.regex().is_match(&out) {
            found.insert(pattern.name.to_string());
            out = pattern.regex().replace_all(&out, format!("[REDACTED:{}]", pattern.name)).into_owned();
        }
    }

    if sentryqc_detectors::secrets::providers::contains_bearer_like_token(&out) {
        found.insert("bearer_token".to_string());
        out = sentryqc_detectors::secrets::providers::bearer_like()
            .replace_all(&out, "[REDACTED:bearer_token]")
            .into_owned();
    }
    for segment in out.split_whitespace().map(str::to_string).collect::<Vec<_>>() {
        if sentryqc_detectors::secrets::providers::is_jwt_shaped(&segment) {
            found.insert("jwt".to_string());
            out = out.replace(&segment, "[REDACTED:jwt]");
        }
    }

    if ssn_pattern().is_match(&out)
        && sentryqc_detectors::secrets::pii::find_valid_ssns(&out).into_iter().next().is_some()
    {
        found.insert("ssn".to_string());
        out = ssn_pattern().replace_all(&out, "[REDACTED:ssn]").into_owned();
    }

    if !sentryqc_detectors::secrets::pii::find_valid_cards(&out).is_empty() {
        found.insert("credit_card".to_string());
        out = card_pattern().replace_all(&out, "[REDACTED:credit_card]").into_owned();
    }

    if generic_assignment().is_match(&out) {
        found.insert("generic_assignment".to_string());
        out = generic_assignment().replace_all(&out, "[REDACTED:generic_assignment]").into_owned();
    }

    let redactions = found
        .into_iter()
        .map(|r#type| {
            let description = describe(&r#type);
            SecretRedaction { r#type, description }
        })
        .collect();

    (out, redactions)
}

fn describe(kind: &str) -> String {
    match kind {
        "jwt" => "JSON Web Token".to_string(),
        "ssn" => "Social Security Number".to_string(),
        "credit_card" => "credit card number".to_string(),
        "bearer_token" => "bearer/session/refresh token".to_string(),
        "generic_assignment" => "generic password/API key assignment".to_string(),
        "pem_private_key" => "PEM-encoded private key".to_string(),
        other => format!("{other} credential"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_openai_key() {
        let (out, redactions) = filter("key: sk-abcdefghijklmnopqrstuvwx1234");
        assert!(out.contains("[REDACTED:openai_api_key]"));
        assert_eq!(redactions.len(), 1);
    }

    #[test]
    fn redacts_ssn() {
        let (out, redactions) = filter("ssn is 123-45-6789");
        assert!(out.contains("[REDACTED:ssn]"));
        assert!(redactions.iter().any(|r| r.r#type == "ssn"));
    }

    #[test]
    fn repeated_same_type_yields_one_redaction_record() {
        let (_out, redactions) = filter("key1: sk-aaaaaaaaaaaaaaaaaaaaaaaa key2: sk-bbbbbbbbbbbbbbbbbbbbbbbb");
        let openai_count = redactions.iter().filter(|r| r.r#type == "openai_api_key").count();
        assert_eq!(openai_count, 1);
    }

    #[test]
    fn redacts_bearer_token_text() {
        let (out, redactions) = filter("Authorization: Bearer abcdef1234567890xyz");
        assert!(out.contains("[REDACTED:bearer_token]"));
        assert!(!out.contains("abcdef1234567890xyz"));
        assert!(redactions.iter().any(|r| r.r#type == "bearer_token"));
    }

    #[test]
    fn benign_text_untouched() {
        let (out, redactions) = filter("just a normal sentence");
        assert_eq!(out, "just a normal sentence");
        assert!(redactions.is_empty());
    }
}
