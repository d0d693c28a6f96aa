//! Card Risk
//!
//! Pre-flight validation and risk scoring for card payments. Given a card
//! number, CVV, expiry, origin address and amount, the crate classifies the
//! card, runs the hard validators and produces a bounded risk score. The
//! caller decides whether the charge goes to the payment gateway.
//!
//! # Invariants
//!
//! - `is_valid` is true exactly when `errors` is empty
//! - The risk score is clamped to 0..=100
//! - No state is kept between calls; the BIN table is read-only

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod activity;
pub mod aggregator;
pub mod bin_directory;
pub mod config;
pub mod error;
pub mod ip_risk;
pub mod types;
pub mod validators;

pub use activity::ActivityHeuristics;
pub use aggregator::{PaymentAttempt, RiskAggregator};
pub use bin_directory::{BinDirectory, BinEntry};
pub use config::Config;
pub use error::{CheckFailure, Error, Result};
pub use ip_risk::IpRiskAnalyzer;
pub use types::*;
pub use validators::{luhn_check_digit, validate_card_number, validate_cvv, validate_expiry};

use lazy_static::lazy_static;
use rust_decimal::Decimal;

lazy_static! {
    static ref DEFAULT_AGGREGATOR: RiskAggregator = RiskAggregator::default();
}

/// Classify a card against the embedded BIN table
pub fn classify_card(card_number: &str) -> CardInfo {
    DEFAULT_AGGREGATOR.classify(card_number)
}

/// Run every check with the default policy
pub fn evaluate_security(
    card_number: &str,
    cvv: &str,
    expiry_month: &str,
    expiry_year: &str,
    ip: &str,
    amount: Decimal,
    previous_attempts: u32,
) -> SecurityCheckResult {
    DEFAULT_AGGREGATOR.evaluate(&PaymentAttempt {
        card_number,
        cvv,
        expiry_month,
        expiry_year,
        ip,
        amount,
        previous_attempts,
    })
}
