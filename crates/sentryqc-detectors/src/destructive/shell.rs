//! Shell sub-detector: `rm` with dangerous flags, SQL drops/truncates,
//! filesystem wipes, fork bombs, and writes to a fixed dangerous-path list.

use crate::merge::SubHit;
use regex::Regex;
use std::sync::OnceLock;

const DANGEROUS_PATHS: &[&str] =
    &["/", "/etc", "/boot", "/bin", "/sbin", "/usr", "/var", "/lib", "/root", "~", "$HOME"];

fn rm_dangerous() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\brm\s+(-[a-z]*r[a-z]*f[a-z]*|-[a-z]*f[a-z]*r[a-z]*|--recursive\s+--force|--force\s+--recursive)\b")
            .expect("static pattern is valid")
    })
}

fn sql_destructive() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(drop\s+(table|database|schema)|truncate\s+table)\b").expect("static pattern is valid")
    })
}

fn fork_bomb() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":\(\)\s*\{\s*:\|\s*:\s*&\s*\}\s*;\s*:").expect("static pattern is valid"))
}

fn fs_wipe() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(mkfs(\.\w+)?|dd\s+if=/dev/(zero|urandom)\s+of=/dev/sd\w*)\b")
            .expect("static pattern is valid")
    })
}

fn matches_dangerous_path(text: &str) -> Option<&'static str> {
    DANGEROUS_PATHS
        .iter()
        .find(|path| {
            let needle = format!("rm -rf {path}");
            text.to_lowercase().contains(&needle.to_lowercase()) || text.trim_end() == format!("rm -rf {path}")
        })
        .copied()
}

/// Evaluate the shell sub-detector over `command` plus any configured user
/// regex extensions.
#[must_use]
pub fn detect(command: &str, user_patterns: &[Regex]) -> Vec<SubHit> {
    let mut hits = Vec::new();

    if let Some(path) = matches_dangerous_path(command) {
        hits.push(SubHit {
            name: "shell",
            confidence: 0.97,
            reason: format!("recursive force-delete targeting protected path {path}"),
        });
    } else if rm_dangerous().is_match(command) {
        hits.push(SubHit { name: "shell", confidence: 0.85, reason: "recursive force-delete (rm -rf)".into() });
    }

    if sql_destructive().is_match(command) {
        hits.push(SubHit { name: "shell", confidence: 0.9, reason: "destructive SQL statement (drop/truncate)".into() });
    }

    if fork_bomb().is_match(command) {
        hits.push(SubHit { name: "shell", confidence: 0.95, reason: "fork bomb pattern".into() });
    }

    if fs_wipe().is_match(command) {
        hits.push(SubHit { name: "shell", confidence: 0.95, reason: "direct filesystem wipe (mkfs/dd to block device)".into() });
    }

    for pattern in user_patterns {
        if pattern.is_match(command) {
            hits.push(SubHit {
                name: "shell",
                confidence: 0.8,
                reason: format!("matched user-configured pattern {:?}", pattern.as_str()),
            });
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_rm_rf_root() {
        let hits = detect("rm -rf /", &[]);
        assert!(!hits.is_empty());
        assert!(hits[0].confidence >= 0.95);
    }

    #[test]
    fn flags_rm_rf_non_root_path_lower_confidence() {
        let hits = detect("rm -rf /tmp/x", &[]);
        assert!(!hits.is_empty());
        assert!(hits[0].confidence < 0.95);
    }

    #[test]
    fn flags_drop_table() {
        let hits = detect("psql -c 'DROP TABLE users;'", &[]);
        assert!(!hits.is_empty());
    }

    #[test]
    fn benign_command_no_hits() {
        let hits = detect("ls -la", &[]);
        assert!(hits.is_empty());
    }
}
