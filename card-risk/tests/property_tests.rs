//! Property-based tests for card risk invariants
//!
//! - Risk score always within 0..=100
//! - Identical input → identical verdict
//! - Luhn detects every single-digit substitution
//! - `is_valid` ⇔ no errors

use card_risk::{
    classify_card, luhn_check_digit, validate_card_number, validate_cvv, CardNetwork,
    PaymentAttempt, RiskAggregator,
};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating Luhn-valid 16-digit Visa numbers
fn visa_strategy() -> impl Strategy<Value = String> {
    "4[0-9]{14}".prop_map(|payload| {
        let check = luhn_check_digit(&payload).unwrap();
        format!("{}{}", payload, check)
    })
}

/// Strategy for generating arbitrary amounts, including extreme ones
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2)),
        Just(Decimal::MAX),
        Just(Decimal::MIN),
        Just(Decimal::ZERO),
    ]
}

/// Strategy for generating origin addresses
fn ip_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>())
            .prop_map(|(a, b, c, d)| format!("{}.{}.{}.{}", a, b, c, d)),
        Just("::1".to_string()),
        Just("fe80::1".to_string()),
        ".{0,20}",
    ]
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

proptest! {
    #[test]
    fn prop_generated_visa_numbers_are_valid(number in visa_strategy()) {
        prop_assert!(validate_card_number(&number));
        prop_assert_eq!(classify_card(&number).network, CardNetwork::Visa);
    }

    #[test]
    fn prop_single_digit_substitution_detected(
        number in visa_strategy(),
        position in 0usize..16,
        shift in 1u8..10,
    ) {
        let mut digits = number.into_bytes();
        digits[position] = b'0' + (digits[position] - b'0' + shift) % 10;
        let mutated = String::from_utf8(digits).unwrap();

        prop_assert!(!validate_card_number(&mutated));
    }

    #[test]
    fn prop_amex_requires_four_digit_cvv(
        second in prop_oneof![Just('4'), Just('7')],
        rest in "[0-9]{12}",
        cvv3 in "[0-9]{3}",
        cvv4 in "[0-9]{4}",
    ) {
        let number = format!("3{}{}", second, rest);
        prop_assert!(!validate_cvv(&cvv3, &number));
        prop_assert!(validate_cvv(&cvv4, &number));
    }

    #[test]
    fn prop_risk_score_is_bounded(
        card in ".{0,24}",
        cvv in ".{0,6}",
        month in ".{0,3}",
        year in ".{0,5}",
        ip in ip_strategy(),
        amount in amount_strategy(),
        previous_attempts in any::<u32>(),
    ) {
        let aggregator = RiskAggregator::default();
        let result = aggregator.evaluate_at(
            &PaymentAttempt {
                card_number: &card,
                cvv: &cvv,
                expiry_month: &month,
                expiry_year: &year,
                ip: &ip,
                amount,
                previous_attempts,
            },
            today(),
        );

        prop_assert!(result.risk_score.score() <= 100);
        prop_assert_eq!(result.is_valid, result.errors.is_empty());
    }

    #[test]
    fn prop_evaluation_is_idempotent(
        card in visa_strategy(),
        cvv in "[0-9]{3,4}",
        month in 1u32..=12,
        year in 20u32..50,
        ip in ip_strategy(),
        amount in amount_strategy(),
        previous_attempts in 0u32..10,
    ) {
        let aggregator = RiskAggregator::default();
        let month = month.to_string();
        let year = year.to_string();
        let attempt = PaymentAttempt {
            card_number: &card,
            cvv: &cvv,
            expiry_month: &month,
            expiry_year: &year,
            ip: &ip,
            amount,
            previous_attempts,
        };

        let first = aggregator.evaluate_at(&attempt, today());
        let second = aggregator.evaluate_at(&attempt, today());
        prop_assert_eq!(first, second);
    }
}
