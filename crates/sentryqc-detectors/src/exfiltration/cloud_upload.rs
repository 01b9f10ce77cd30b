//! Cloud-upload sub-detector: S3/GCS/Azure Blob upload verbs and rclone.

use crate::merge::SubHit;
use regex::Regex;
use std::sync::OnceLock;

fn cloud_upload() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(aws\s+s3\s+cp\b.*\bs3://|aws\s+s3\s+sync\b.*\bs3://|gsutil\s+cp\b.*\bgs://|az\s+storage\s+blob\s+upload|rclone\s+(copy|sync|move)\b)",
        )
        .expect("static pattern is valid")
    })
}

/// Evaluate the cloud-upload sub-detector.
#[must_use]
pub fn detect(text: &str) -> Vec<SubHit> {
    if cloud_upload().is_match(text) {
        vec![SubHit { name: "cloud_upload", confidence: 0.8, reason: "upload to external cloud storage".into() }]
    } else {
        Vec::new()
    }
}
