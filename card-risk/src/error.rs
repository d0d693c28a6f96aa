//! Error types for card risk checks

use crate::config::RiskWeights;
use thiserror::Error;

/// Operational error (table or configuration loading).
///
/// Expected validation failures never surface as this type; they are
/// reported through [`CheckFailure`] entries in a
/// [`SecurityCheckResult`](crate::SecurityCheckResult).
#[derive(Debug, Error)]
pub enum Error {
    /// BIN table content is malformed
    #[error("Invalid BIN table: {0}")]
    InvalidBinTable(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Hard validation failure for a payment instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CheckFailure {
    /// Card number is malformed or fails the Luhn checksum
    #[error("Invalid card number")]
    InvalidCardNumber,

    /// CVV has the wrong length for the card network
    #[error("Invalid CVV")]
    InvalidCvv,

    /// Expiry date is malformed, in the past or too far ahead
    #[error("Invalid expiry date")]
    InvalidExpiry,
}

impl CheckFailure {
    /// Risk score contribution of this failure
    pub fn weight(&self, weights: &RiskWeights) -> u32 {
        match self {
            CheckFailure::InvalidCardNumber => weights.invalid_card_number,
            CheckFailure::InvalidCvv => weights.invalid_cvv,
            CheckFailure::InvalidExpiry => weights.invalid_expiry,
        }
    }
}
