//! Suspicious activity rules

use crate::config::ActivityConfig;
use crate::{ActivityReport, CardInfo, IpRiskProfile};
use rust_decimal::Decimal;
use tracing::debug;

/// Rule-based suspicious activity detector
#[derive(Debug, Clone)]
pub struct ActivityHeuristics {
    config: ActivityConfig,
}

impl ActivityHeuristics {
    /// Create new detector
    pub fn new(config: ActivityConfig) -> Self {
        Self { config }
    }

    /// Evaluate every rule independently
    pub fn detect(
        &self,
        card: &CardInfo,
        ip: &IpRiskProfile,
        amount: Decimal,
        previous_attempts: u32,
    ) -> ActivityReport {
        let mut reasons = Vec::new();

        if previous_attempts > self.config.max_previous_attempts {
            reasons.push(format!("Too many failed attempts ({})", previous_attempts));
        }

        if amount > self.config.high_amount {
            reasons.push(format!(
                "High amount: {} exceeds {}",
                amount, self.config.high_amount
            ));
        }

        if card.is_test_instrument && amount > self.config.test_instrument_high_amount {
            reasons.push("Test instrument used for a high-value charge".to_string());
        }

        if ip.risk_contribution > self.config.high_ip_risk {
            reasons.push(format!("High-risk origin IP ({})", ip.risk_contribution));
        }

        if !reasons.is_empty() {
            debug!(count = reasons.len(), "Suspicious activity detected");
        }

        ActivityReport {
            is_suspicious: !reasons.is_empty(),
            reasons,
        }
    }
}

impl Default for ActivityHeuristics {
    fn default() -> Self {
        Self::new(ActivityConfig::default())
    }
}
