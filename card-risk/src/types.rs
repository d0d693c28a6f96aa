//! Core types for card risk checks

use serde::{Deserialize, Serialize};
use std::fmt;

/// Card network derived from the leading digits of a card number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardNetwork {
    /// Visa (leading 4)
    Visa,
    /// Mastercard (leading 51-55)
    Mastercard,
    /// American Express (leading 34 or 37)
    Amex,
    /// Discover (leading 6)
    Discover,
    /// No rule matched
    Unknown,
}

impl CardNetwork {
    /// Required CVV lengths for this network
    pub fn cvv_lengths(&self) -> &'static [usize] {
        match self {
            CardNetwork::Amex => &[4],
            CardNetwork::Visa | CardNetwork::Mastercard | CardNetwork::Discover => &[3],
            CardNetwork::Unknown => &[3, 4],
        }
    }

    /// Upper-case network name
    pub fn as_str(&self) -> &'static str {
        match self {
            CardNetwork::Visa => "VISA",
            CardNetwork::Mastercard => "MASTERCARD",
            CardNetwork::Amex => "AMEX",
            CardNetwork::Discover => "DISCOVER",
            CardNetwork::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CardNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    /// Card network
    pub network: CardNetwork,

    /// Issuing bank name
    pub issuer_name: String,

    /// Card belongs to a processor sandbox range
    pub is_test_instrument: bool,
}

/// Coarse classification of an origin address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpClass {
    /// Loopback or home/office private range (development environments)
    Trusted,
    /// Other private or link-local range
    Private,
    /// Any routable address
    Public,
    /// Not an IP address
    Unparseable,
}

/// Risk profile of the request origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRiskProfile {
    /// Risk contribution (0-100)
    pub risk_contribution: u8,

    /// Best-effort country code
    pub country_guess: String,

    /// Reserved for a future proxy detector; always false today
    pub is_proxy_suspected: bool,

    /// Address class the contribution was derived from
    pub class: IpClass,
}

/// Outcome of the suspicious-activity rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityReport {
    /// At least one rule fired
    pub is_suspicious: bool,

    /// One reason per fired rule
    pub reasons: Vec<String>,
}

/// Bounded risk score
///
/// Always within `0..=RiskScore::MAX`, including when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct RiskScore(u8);

impl RiskScore {
    /// Upper bound of every score
    pub const MAX: u8 = 100;

    /// Clamp an accumulated total into a score
    pub fn from_total(total: u32) -> Self {
        Self(total.min(u32::from(Self::MAX)) as u8)
    }

    /// Raw value
    pub fn score(&self) -> u8 {
        self.0
    }

    /// Band the score falls in
    pub fn level(&self) -> RiskLevel {
        match self.0 {
            s if s >= RiskLevel::HIGH_FLOOR => RiskLevel::High,
            s if s >= RiskLevel::MEDIUM_FLOOR => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

impl From<u8> for RiskScore {
    fn from(score: u8) -> Self {
        Self(score.min(Self::MAX))
    }
}

impl From<RiskScore> for u8 {
    fn from(score: RiskScore) -> Self {
        score.0
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

/// Score band, ordered from least to most risky
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Below [`RiskLevel::MEDIUM_FLOOR`]
    Low,
    /// From [`RiskLevel::MEDIUM_FLOOR`] up to [`RiskLevel::HIGH_FLOOR`]
    Medium,
    /// [`RiskLevel::HIGH_FLOOR`] and above
    High,
}

impl RiskLevel {
    /// Lowest medium score
    pub const MEDIUM_FLOOR: u8 = 50;

    /// Lowest high score
    pub const HIGH_FLOOR: u8 = 75;
}

/// Verdict of a pre-flight security check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityCheckResult {
    /// No hard validator failed
    pub is_valid: bool,

    /// Hard validation failures
    pub errors: Vec<String>,

    /// Soft findings that only raise the score
    pub warnings: Vec<String>,

    /// Clamped risk score
    pub risk_score: RiskScore,
}

impl SecurityCheckResult {
    /// Risk level of the score
    pub fn risk_level(&self) -> RiskLevel {
        self.risk_score.level()
    }

    /// Caller policy: reject invalid instruments or scores above `threshold`
    pub fn should_reject(&self, threshold: u8) -> bool {
        !self.is_valid || self.risk_score.score() > threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_score_clamps() {
        assert_eq!(RiskScore::from(250).score(), 100);
        assert_eq!(RiskScore::from_total(u32::MAX).score(), 100);
        assert_eq!(RiskScore::from_total(42).score(), 42);
    }

    #[test]
    fn test_risk_levels() {
        assert_eq!(RiskScore::from(10).level(), RiskLevel::Low);
        assert_eq!(RiskScore::from(49).level(), RiskLevel::Low);
        assert_eq!(RiskScore::from(50).level(), RiskLevel::Medium);
        assert_eq!(RiskScore::from(74).level(), RiskLevel::Medium);
        assert_eq!(RiskScore::from(75).level(), RiskLevel::High);
        assert!(RiskLevel::Low < RiskLevel::High);
    }

    #[test]
    fn test_cvv_lengths() {
        assert_eq!(CardNetwork::Amex.cvv_lengths(), &[4]);
        assert_eq!(CardNetwork::Visa.cvv_lengths(), &[3]);
        assert_eq!(CardNetwork::Unknown.cvv_lengths(), &[3, 4]);
    }

    #[test]
    fn test_should_reject() {
        let mut result = SecurityCheckResult {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            risk_score: RiskScore::from(70),
        };
        assert!(!result.should_reject(70));

        result.risk_score = RiskScore::from(71);
        assert!(result.should_reject(70));

        result.risk_score = RiskScore::from(0);
        result.is_valid = false;
        assert!(result.should_reject(70));
    }

    #[test]
    fn test_risk_score_serde_clamps() {
        assert_eq!(serde_json::to_string(&RiskScore::from(42)).unwrap(), "42");
        let score: RiskScore = serde_json::from_str("250").unwrap();
        assert_eq!(score.score(), RiskScore::MAX);
        assert_eq!(score.to_string(), "100/100");
    }

    #[test]
    fn test_network_serializes_upper_case() {
        let json = serde_json::to_string(&CardNetwork::Mastercard).unwrap();
        assert_eq!(json, "\"MASTERCARD\"");
    }
}
