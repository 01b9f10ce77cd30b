//! Cloud sub-detector: destructive CLI invocations across AWS, GCP, Azure,
//! Kubernetes, Terraform, and Git. Each category carries a baseline
//! confidence: critical variants 0.95, others 0.8-0.9.

use crate::merge::SubHit;
use regex::Regex;
use std::sync::OnceLock;

struct CloudPattern {
    regex: OnceLock<Regex>,
    source: &'static str,
    confidence: f64,
    reason: &'static str,
}

macro_rules! cloud_pattern {
    ($source:expr, $confidence:expr, $reason:expr) => {
        CloudPattern { regex: OnceLock::new(), source: $source, confidence: $confidence, reason: $reason }
    };
}

impl CloudPattern {
    fn regex(&self) -> &Regex {
        self.regex.get_or_init(|| Regex::new(self.source).expect("static cloud pattern is valid"))
    }
}

static PATTERNS: &[CloudPattern] = &[
    // AWS
    cloud_pattern!(r"(?i)aws\s+s3\s+rb\b.*--force", 0.9, "AWS: force-remove an S3 bucket"),
    cloud_pattern!(r"(?i)aws\s+ec2\s+terminate-instances", 0.85, "AWS: terminate EC2 instances"),
    cloud_pattern!(r"(?i)aws\s+rds\s+delete-db-instance", 0.9, "AWS: delete an RDS instance"),
    cloud_pattern!(r"(?i)aws\s+iam\s+delete-(user|role|policy)", 0.85, "AWS: delete an IAM principal"),
    // GCP
    cloud_pattern!(r"(?i)gcloud\s+(compute\s+instances|sql\s+instances)\s+delete", 0.9, "GCP: delete a compute/SQL instance"),
    cloud_pattern!(r"(?i)gcloud\s+projects\s+delete", 0.95, "GCP: delete an entire project"),
    cloud_pattern!(r"(?i)gsutil\s+rm\s+-r", 0.85, "GCP: recursive delete of GCS bucket contents"),
    // Azure
    cloud_pattern!(r"(?i)az\s+group\s+delete", 0.95, "Azure: delete a resource group"),
    cloud_pattern!(r"(?i)az\s+vm\s+delete", 0.85, "Azure: delete a virtual machine"),
    // Kubernetes
    cloud_pattern!(r"(?i)kubectl\s+delete\s+namespace", 0.9, "Kubernetes: delete an entire namespace"),
    cloud_pattern!(r"(?i)kubectl\s+delete\s+(pv|pvc|persistentvolume)", 0.85, "Kubernetes: delete persistent storage"),
    // Terraform
    cloud_pattern!(r"(?i)terraform\s+destroy", 0.9, "Terraform: destroy managed infrastructure"),
    cloud_pattern!(r"(?i)terraform\s+state\s+rm", 0.8, "Terraform: remove a resource from state"),
    // Git
    cloud_pattern!(r"(?i)git\s+push\s+.*--force", 0.8, "Git: force-push (history rewrite)"),
    cloud_pattern!(r"(?i)git\s+branch\s+-D\b", 0.8, "Git: force-delete a branch"),
    cloud_pattern!(r"(?i)git\s+reset\s+--hard", 0.8, "Git: hard reset (discards local work)"),
];

/// Evaluate the cloud sub-detector over `command` plus any configured user
/// regex extensions.
#[must_use]
pub fn detect(command: &str, user_patterns: &[Regex]) -> Vec<SubHit> {
    let mut hits = Vec::new();
    for pattern in PATTERNS {
        if pattern.regex().is_match(command) {
            hits.push(SubHit { name: "cloud", confidence: pattern.confidence, reason: pattern.reason.to_string() });
        }
    }
    for pattern in user_patterns {
        if pattern.is_match(command) {
            hits.push(SubHit {
                name: "cloud",
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
    fn flags_terraform_destroy() {
        let hits = detect("terraform destroy -auto-approve", &[]);
        assert!(!hits.is_empty());
    }

    #[test]
    fn flags_kubectl_delete_namespace() {
        let hits = detect("kubectl delete namespace production", &[]);
        assert!(!hits.is_empty());
    }

    #[test]
    fn benign_command_no_hits() {
        let hits = detect("kubectl get pods", &[]);
        assert!(hits.is_empty());
    }
}
