//! Code sub-detector: per-language recursive-delete and process-kill
//! idioms embedded in generated/executed source snippets.

use crate::merge::SubHit;
use regex::Regex;
use std::sync::OnceLock;

struct CodePattern {
    regex: OnceLock<Regex>,
    source: &'static str,
    confidence: f64,
    reason: &'static str,
}

macro_rules! code_pattern {
    ($source:expr, $confidence:expr, $reason:expr) => {
        CodePattern { regex: OnceLock::new(), source: $source, confidence: $confidence, reason: $reason }
    };
}

impl CodePattern {
    fn regex(&self) -> &Regex {
        self.regex.get_or_init(|| Regex::new(self.source).expect("static code pattern is valid"))
    }
}

static PATTERNS: &[CodePattern] = &[
    // Python
    code_pattern!(r"shutil\.rmtree\s*\(", 0.85, "Python: recursive directory delete (shutil.rmtree)"),
    code_pattern!(r"os\.(kill|system)\s*\(.*\bSIGKILL\b", 0.8, "Python: sending SIGKILL"),
    // Node / JS
    code_pattern!(r"fs\.rmSync\s*\(.*\{\s*recursive:\s*true", 0.85, "Node: recursive directory delete (fs.rmSync)"),
    code_pattern!(r"child_process\.exec(Sync)?\s*\(\s*['\"]rm\s+-rf", 0.9, "Node: shelling out to rm -rf"),
    code_pattern!(r"process\.kill\s*\(", 0.7, "Node: killing a process by pid"),
    // Rust
    code_pattern!(r"std::fs::remove_dir_all\s*\(", 0.85, "Rust: recursive directory delete (remove_dir_all)"),
    // Go
    code_pattern!(r"os\.RemoveAll\s*\(", 0.85, "Go: recursive directory delete (os.RemoveAll)"),
    // Java
    code_pattern!(r"FileUtils\.deleteDirectory\s*\(", 0.85, "Java: recursive directory delete (FileUtils.deleteDirectory)"),
    code_pattern!(r"Runtime\.getRuntime\(\)\.exec\s*\(\s*\"kill\s+-9", 0.8, "Java: shelling out to kill -9"),
];

/// Evaluate the code sub-detector over a snippet of generated/executed
/// source plus any configured user regex extensions.
#[must_use]
pub fn detect(snippet: &str, user_patterns: &[Regex]) -> Vec<SubHit> {
    let mut hits = Vec::new();
    for pattern in PATTERNS {
        if pattern.regex().is_match(snippet) {
            hits.push(SubHit { name: "code", confidence: pattern.confidence, reason: pattern.reason.to_string() });
        }
    }
    for pattern in user_patterns {
        if pattern.is_match(snippet) {
            hits.push(SubHit {
                name: "code",
                confidence: 0.75,
                reason: format!("matched user-configured pattern {:?}", pattern.as_str()),
            });
        }
    }
    hits
}
