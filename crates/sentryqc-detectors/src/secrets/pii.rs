//! PII sub-detectors: SSNs with area-group-serial validity rules, credit
//! card numbers with Luhn validation (rejecting all-same-digit and pure
//! ascending sequences), and optional domain-preserving email redaction.

use regex::Regex;
use std::sync::OnceLock;

fn ssn_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("static pattern is valid"))
}

fn card_candidate() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:\d[ -]?){13,19}\b").expect("static pattern is valid"))
}

fn email_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("static pattern is valid")
    })
}

/// Is `ssn` (in `AAA-GG-SSSS` shape) a structurally valid Social Security
/// Number? Area must not be `000`, `666`, or in `900..=999`; group must not
/// be `00`; serial must not be `0000`.
#[must_use]
pub fn is_valid_ssn(ssn: &str) -> bool {
    let digits: Vec<&str> = ssn.split('-').collect();
    if digits.len() != 3 {
        return false;
    }
    let Ok(area) = digits[0].parse::<u32>() else { return false };
    let Ok(group) = digits[1].parse::<u32>() else { return false };
    let Ok(serial) = digits[2].parse::<u32>() else { return false };
    if area == 0 || area == 666 || (900..=999).contains(&area) {
        return false;
    }
    if group == 0 {
        return false;
    }
    if serial == 0 {
        return false;
    }
    true
}

/// Find all SSN-shaped candidates in `text` that also pass
/// [`is_valid_ssn`].
#[must_use]
pub fn find_valid_ssns(text: &str) -> Vec<String> {
    ssn_shape().find_iter(text).map(|m| m.as_str().to_string()).filter(|s| is_valid_ssn(s)).collect()
}

/// Luhn checksum validity for a digit string.
#[must_use]
pub fn luhn_valid(digits: &str) -> bool {
    let digits: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| if i % 2 == 1 { let doubled = d * 2; if doubled > 9 { doubled - 9 } else { doubled } } else { d })
        .sum();
    sum % 10 == 0
}

fn is_all_same_digit(digits: &str) -> bool {
    let mut chars = digits.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => false,
    }
}

fn is_monotonic_ascending(digits: &str) -> bool {
    let values: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    values.windows(2).all(|w| w[1] == w[0] + 1 || (w[0] == 9 && w[1] == 0))
}

/// Is `candidate` a plausible credit-card PAN: Luhn-valid, 13-19 digits,
/// and not an all-same-digit or pure ascending sequence (both of which pass
/// Luhn by construction often enough to need an explicit reject rule)?
#[must_use]
pub fn is_valid_card_number(candidate: &str) -> bool {
    let digits: String = candidate.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }
    if is_all_same_digit(&digits) || is_monotonic_ascending(&digits) {
        return false;
    }
    luhn_valid(&digits)
}

/// Find all card-shaped candidates in `text` that also pass
/// [`is_valid_card_number`].
#[must_use]
pub fn find_valid_cards(text: &str) -> Vec<String> {
    card_candidate().find_iter(text).map(|m| m.as_str().to_string()).filter(|s| is_valid_card_number(s)).collect()
}

/// Find email addresses in `text`.
#[must_use]
pub fn find_emails(text: &str) -> Vec<String> {
    email_shape().find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Redact an email's local part while preserving the domain, e.g.
/// `jane.doe@example.com` -> `j***@example.com`.
#[must_use]
pub fn redact_email_preserving_domain(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(|c| c.to_string()).unwrap_or_default();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ssn_accepted() {
        assert!(is_valid_ssn("123-45-6789"));
    }

    #[test]
    fn ssn_area_000_rejected() {
        assert!(!is_valid_ssn("000-45-6789"));
    }

    #[test]
    fn ssn_area_666_rejected() {
        assert!(!is_valid_ssn("666-45-6789"));
    }

    #[test]
    fn ssn_area_900_plus_rejected() {
        assert!(!is_valid_ssn("901-45-6789"));
    }

    #[test]
    fn ssn_group_00_rejected() {
        assert!(!is_valid_ssn("123-00-6789"));
    }

    #[test]
    fn ssn_serial_0000_rejected() {
        assert!(!is_valid_ssn("123-45-0000"));
    }

    #[test]
    fn known_luhn_valid_card_accepted() {
        assert!(is_valid_card_number("4111111111111111"));
    }

    #[test]
    fn all_same_digit_rejected_even_if_luhn_valid() {
        assert!(!is_valid_card_number("0000000000000000"));
    }

    #[test]
    fn ascending_sequence_rejected() {
        assert!(!is_valid_card_number("1234567890123"));
    }

    #[test]
    fn email_redaction_preserves_domain() {
        assert_eq!(redact_email_preserving_domain("jane.doe@example.com"), "j***@example.com");
    }
}
