//! Instrument validators: Luhn checksum, CVV length, expiry window
//!
//! Every check is a stateless predicate. Failures are turned into
//! [`CheckFailure`](crate::CheckFailure) entries by the aggregator.

use crate::bin_directory::{detect_network, normalize_card_number};
use crate::config::ExpiryConfig;
use chrono::{Datelike, NaiveDate, Utc};

/// Shortest accepted card number
pub const MIN_CARD_LENGTH: usize = 13;

/// Longest accepted card number
pub const MAX_CARD_LENGTH: usize = 19;

/// Card number is 13-19 digits (separators allowed) and passes Luhn
pub fn validate_card_number(raw: &str) -> bool {
    let digits = normalize_card_number(raw);
    if !(MIN_CARD_LENGTH..=MAX_CARD_LENGTH).contains(&digits.len()) || !is_all_digits(&digits) {
        return false;
    }
    luhn_sum(&digits) % 10 == 0
}

/// Check digit that makes `payload` followed by it Luhn-valid
pub fn luhn_check_digit(payload: &str) -> Option<u8> {
    if payload.is_empty() || !is_all_digits(payload) {
        return None;
    }
    let sum = luhn_sum(&format!("{}0", payload));
    Some(((10 - sum % 10) % 10) as u8)
}

/// CVV is all digits and has the length required by the card's network
///
/// No padding is stripped: `" 123 "` is rejected.
pub fn validate_cvv(cvv: &str, card_number: &str) -> bool {
    is_all_digits(cvv) && detect_network(card_number).cvv_lengths().contains(&cvv.len())
}

/// Expiry is neither past nor beyond the default window, as of today (UTC)
pub fn validate_expiry(month: &str, year: &str) -> bool {
    ExpiryValidator::default().validate(month, year)
}

/// Expiry window check
#[derive(Debug, Clone)]
pub struct ExpiryValidator {
    max_years_ahead: u32,
}

impl ExpiryValidator {
    /// Create new expiry validator
    pub fn new(config: &ExpiryConfig) -> Self {
        Self {
            max_years_ahead: config.max_years_ahead,
        }
    }

    /// Validate against today's UTC date
    pub fn validate(&self, month: &str, year: &str) -> bool {
        self.validate_at(month, year, Utc::now().date_naive())
    }

    /// Validate against an explicit date
    ///
    /// Two-digit years are read in the century of `today`; four-digit years
    /// are taken as is. The card is valid through its whole expiry month.
    pub fn validate_at(&self, month: &str, year: &str, today: NaiveDate) -> bool {
        let Some(month) = parse_month(month) else {
            return false;
        };
        let Some(year) = parse_year(year, today.year()) else {
            return false;
        };

        let current = (today.year(), today.month());
        if (year, month) < current {
            return false;
        }
        let years_ahead = i32::try_from(self.max_years_ahead).unwrap_or(i32::MAX);
        year <= today.year().saturating_add(years_ahead)
    }
}

impl Default for ExpiryValidator {
    fn default() -> Self {
        Self::new(&ExpiryConfig::default())
    }
}

fn parse_month(month: &str) -> Option<u32> {
    let month = month.trim();
    if month.is_empty() || month.len() > 2 || !is_all_digits(month) {
        return None;
    }
    month.parse().ok().filter(|m| (1..=12).contains(m))
}

fn parse_year(year: &str, current_year: i32) -> Option<i32> {
    let year = year.trim();
    if !is_all_digits(year) {
        return None;
    }
    let value: i32 = year.parse().ok()?;
    match year.len() {
        2 => Some(current_year - current_year.rem_euclid(100) + value),
        4 => Some(value),
        _ => None,
    }
}

// Right-to-left, doubling every second digit
fn luhn_sum(digits: &str) -> u32 {
    digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum()
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_known_valid_numbers() {
        for number in [
            "4242424242424242",
            "4111111111111111",
            "5555555555554444",
            "378282246310005",
            "6011111111111117",
            "4222222222222",
        ] {
            assert!(validate_card_number(number), "{} should be valid", number);
        }
    }

    #[test]
    fn test_separators_are_stripped() {
        assert!(validate_card_number("4242 4242 4242 4242"));
        assert!(validate_card_number("4242-4242-4242-4242"));
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(!validate_card_number("4242424242424241"));
        assert!(!validate_card_number("1234"));
        assert!(!validate_card_number(""));
        assert!(!validate_card_number("4242a24242424242"));
        assert!(!validate_card_number("42424242424242424242"));
    }

    #[test]
    fn test_all_zero_number_passes_checksum() {
        assert!(validate_card_number("0000000000000"));
    }

    #[test]
    fn test_luhn_check_digit() {
        assert_eq!(luhn_check_digit("424242424242424"), Some(2));
        assert_eq!(luhn_check_digit("411111111111111"), Some(1));
        assert_eq!(luhn_check_digit(""), None);
        assert_eq!(luhn_check_digit("41x"), None);
    }

    #[test]
    fn test_cvv_by_network() {
        assert!(validate_cvv("123", "4242424242424242"));
        assert!(!validate_cvv("1234", "4242424242424242"));
        assert!(validate_cvv("1234", "378282246310005"));
        assert!(!validate_cvv("123", "378282246310005"));
        assert!(validate_cvv("123", "5555555555554444"));
        assert!(validate_cvv("123", "6011111111111117"));
        assert!(!validate_cvv("12a", "4242424242424242"));
        assert!(!validate_cvv("", "4242424242424242"));
    }

    #[test]
    fn test_padded_cvv_rejected() {
        assert!(!validate_cvv(" 123 ", "4242424242424242"));
        assert!(!validate_cvv("1234\n", "378282246310005"));
    }

    #[test]
    fn test_cvv_unknown_network_accepts_three_or_four() {
        assert!(validate_cvv("123", "9999999999999995"));
        assert!(validate_cvv("1234", "9999999999999995"));
        assert!(!validate_cvv("12", "9999999999999995"));
    }

    #[test]
    fn test_expiry_current_month_is_valid() {
        let validator = ExpiryValidator::default();
        assert!(validator.validate_at("10", "26", date(2026, 10, 18)));
        assert!(validator.validate_at("10", "2026", date(2026, 10, 31)));
    }

    #[test]
    fn test_expiry_previous_month_is_invalid() {
        let validator = ExpiryValidator::default();
        assert!(!validator.validate_at("9", "26", date(2026, 10, 1)));
        assert!(!validator.validate_at("12", "25", date(2026, 1, 1)));
    }

    #[test]
    fn test_expiry_window_upper_bound() {
        let validator = ExpiryValidator::default();
        let today = date(2026, 10, 18);
        assert!(validator.validate_at("12", "46", today));
        assert!(!validator.validate_at("01", "47", today));
    }

    #[test]
    fn test_expiry_malformed() {
        let validator = ExpiryValidator::default();
        let today = date(2026, 10, 18);
        assert!(!validator.validate_at("0", "30", today));
        assert!(!validator.validate_at("13", "30", today));
        assert!(!validator.validate_at("ab", "30", today));
        assert!(!validator.validate_at("12", "3", today));
        assert!(!validator.validate_at("12", "300", today));
        assert!(!validator.validate_at("", "", today));
    }

    #[test]
    fn test_expiry_huge_window_does_not_overflow() {
        let validator = ExpiryValidator::new(&ExpiryConfig {
            max_years_ahead: u32::MAX,
        });
        let today = date(2026, 10, 18);
        assert!(validator.validate_at("12", "30", today));
        assert!(validator.validate_at("12", "9999", today));
        assert!(!validator.validate_at("09", "26", today));
    }

    #[test]
    fn test_expiry_custom_window() {
        let validator = ExpiryValidator::new(&ExpiryConfig { max_years_ahead: 5 });
        let today = date(2026, 10, 18);
        assert!(validator.validate_at("12", "31", today));
        assert!(!validator.validate_at("01", "32", today));
    }
}
