//! Configuration for card risk checks

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Card risk configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Score contributions
    pub weights: RiskWeights,

    /// Origin address heuristic
    pub ip: IpRiskConfig,

    /// Suspicious activity thresholds
    pub activity: ActivityConfig,

    /// Expiry window
    pub expiry: ExpiryConfig,

    /// BIN table source and matching
    pub bins: BinConfig,

    /// Caller-side decision policy
    pub policy: PolicyConfig,
}

/// Risk score contributions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    /// Card number fails format or Luhn
    pub invalid_card_number: u32,

    /// CVV has the wrong length
    pub invalid_cvv: u32,

    /// Expiry outside the accepted window
    pub invalid_expiry: u32,

    /// Card is from a sandbox range
    pub test_instrument: u32,

    /// Per suspicious-activity reason
    pub suspicious_reason: u32,

    /// Network could not be determined
    pub unknown_network: u32,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            invalid_card_number: 30,
            invalid_cvv: 25,
            invalid_expiry: 20,
            test_instrument: 5,
            suspicious_reason: 10,
            unknown_network: 10,
        }
    }
}

/// Origin address risk contributions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpRiskConfig {
    /// Loopback, 10.x and 192.168.x
    pub trusted_network_risk: u8,

    /// 172.x, 169.254.x and IPv6 local ranges
    pub private_network_risk: u8,

    /// Everything else, including unparseable input
    pub public_risk: u8,

    /// Country assumed for trusted networks
    pub home_country: String,
}

impl Default for IpRiskConfig {
    fn default() -> Self {
        Self {
            trusted_network_risk: 5,
            private_network_risk: 15,
            public_risk: 10,
            home_country: "US".to_string(),
        }
    }
}

/// Suspicious activity thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Attempts allowed before flagging
    pub max_previous_attempts: u32,

    /// Amount above which a charge is flagged
    pub high_amount: Decimal,

    /// Amount above which a test card charge is flagged
    pub test_instrument_high_amount: Decimal,

    /// IP contribution above which the origin is flagged
    pub high_ip_risk: u8,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            max_previous_attempts: 3,
            high_amount: Decimal::from(10_000),
            test_instrument_high_amount: Decimal::from(1_000),
            high_ip_risk: 50,
        }
    }
}

/// Largest accepted `max_years_ahead`
pub const MAX_EXPIRY_YEARS_AHEAD: u32 = 100;

/// Expiry window configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiryConfig {
    /// Latest accepted expiry, in years from today
    pub max_years_ahead: u32,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self { max_years_ahead: 20 }
    }
}

/// How issuer prefixes are matched against a card number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinMatchPolicy {
    /// First table entry that matches, in table order
    #[default]
    FirstMatch,
    /// Longest matching prefix, ties resolved by table order
    LongestPrefix,
}

impl std::str::FromStr for BinMatchPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first_match" => Ok(BinMatchPolicy::FirstMatch),
            "longest_prefix" => Ok(BinMatchPolicy::LongestPrefix),
            other => Err(Error::InvalidConfig(format!("Unknown BIN match policy: {}", other))),
        }
    }
}

/// BIN table configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinConfig {
    /// Issuer matching policy
    pub match_policy: BinMatchPolicy,

    /// External table replacing the embedded one
    pub table_path: Option<PathBuf>,
}

/// Caller-side policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Scores above this are rejected
    pub rejection_threshold: u8,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            rejection_threshold: 70,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse TOML content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(threshold) = std::env::var("CARD_RISK_REJECTION_THRESHOLD") {
            config.policy.rejection_threshold = threshold.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!("CARD_RISK_REJECTION_THRESHOLD: {}", threshold))
            })?;
        }

        if let Ok(country) = std::env::var("CARD_RISK_HOME_COUNTRY") {
            config.ip.home_country = country.trim().to_uppercase();
        }

        if let Ok(path) = std::env::var("CARD_RISK_BIN_TABLE") {
            config.bins.table_path = Some(PathBuf::from(path));
        }

        if let Ok(policy) = std::env::var("CARD_RISK_BIN_MATCH_POLICY") {
            config.bins.match_policy = policy.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.policy.rejection_threshold > 100 {
            return Err(Error::InvalidConfig(format!(
                "rejection_threshold {} exceeds 100",
                self.policy.rejection_threshold
            )));
        }

        for (name, risk) in [
            ("trusted_network_risk", self.ip.trusted_network_risk),
            ("private_network_risk", self.ip.private_network_risk),
            ("public_risk", self.ip.public_risk),
            ("high_ip_risk", self.activity.high_ip_risk),
        ] {
            if risk > 100 {
                return Err(Error::InvalidConfig(format!("{} {} exceeds 100", name, risk)));
            }
        }

        if self.activity.high_amount <= Decimal::ZERO
            || self.activity.test_instrument_high_amount <= Decimal::ZERO
        {
            return Err(Error::InvalidConfig(
                "amount thresholds must be positive".to_string(),
            ));
        }

        if self.expiry.max_years_ahead > MAX_EXPIRY_YEARS_AHEAD {
            return Err(Error::InvalidConfig(format!(
                "max_years_ahead {} exceeds {}",
                self.expiry.max_years_ahead, MAX_EXPIRY_YEARS_AHEAD
            )));
        }

        if self.ip.home_country.trim().is_empty() {
            return Err(Error::InvalidConfig("home_country is empty".to_string()));
        }

        Ok(())
    }
}
