//! Risk aggregation: merges every check into one verdict

use crate::activity::ActivityHeuristics;
use crate::bin_directory::BinDirectory;
use crate::config::{BinMatchPolicy, Config};
use crate::ip_risk::IpRiskAnalyzer;
use crate::validators::{validate_card_number, validate_cvv, ExpiryValidator};
use crate::{CardInfo, CardNetwork, CheckFailure, Result, RiskScore, SecurityCheckResult};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// Warning pushed for sandbox cards
pub const TEST_INSTRUMENT_WARNING: &str = "Test card detected";

/// Warning pushed when no network rule matched
pub const UNKNOWN_NETWORK_WARNING: &str = "Unknown card network";

/// Raw input of one charge attempt
#[derive(Debug, Clone, Copy)]
pub struct PaymentAttempt<'a> {
    /// Card number, separators allowed
    pub card_number: &'a str,
    /// Card verification value
    pub cvv: &'a str,
    /// Expiry month (1-12)
    pub expiry_month: &'a str,
    /// Expiry year, two or four digits
    pub expiry_year: &'a str,
    /// Origin address of the request
    pub ip: &'a str,
    /// Charge amount in currency units
    pub amount: Decimal,
    /// Failed attempts preceding this one
    pub previous_attempts: u32,
}

/// Risk aggregator
#[derive(Debug, Clone)]
pub struct RiskAggregator {
    config: Config,
    directory: Arc<BinDirectory>,
    expiry: ExpiryValidator,
    ip: IpRiskAnalyzer,
    activity: ActivityHeuristics,
}

impl RiskAggregator {
    /// Create new aggregator, loading the configured BIN table
    pub fn new(config: Config) -> Result<Self> {
        let policy = config.bins.match_policy;
        let directory = match &config.bins.table_path {
            Some(path) => {
                let directory = BinDirectory::from_file(path).map_err(|e| {
                    warn!(path = %path.display(), error = %e, "Failed to load BIN table");
                    e
                })?;
                info!(
                    version = directory.version(),
                    entries = directory.len(),
                    "Loaded external BIN table"
                );
                Arc::new(directory.with_policy(policy))
            }
            None if policy == BinMatchPolicy::FirstMatch => BinDirectory::embedded(),
            None => Arc::new(BinDirectory::embedded().as_ref().clone().with_policy(policy)),
        };
        Self::with_directory(config, directory)
    }

    /// Create new aggregator over an already loaded BIN table
    pub fn with_directory(config: Config, directory: Arc<BinDirectory>) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, directory))
    }

    // Callers must have validated `config`
    fn assemble(config: Config, directory: Arc<BinDirectory>) -> Self {
        Self {
            expiry: ExpiryValidator::new(&config.expiry),
            ip: IpRiskAnalyzer::new(config.ip.clone()),
            activity: ActivityHeuristics::new(config.activity.clone()),
            directory,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Active BIN table
    pub fn directory(&self) -> &BinDirectory {
        &self.directory
    }

    /// Classify a card number against the active table
    pub fn classify(&self, card_number: &str) -> CardInfo {
        self.directory.classify(card_number)
    }

    /// Evaluate an attempt as of today (UTC)
    pub fn evaluate(&self, attempt: &PaymentAttempt<'_>) -> SecurityCheckResult {
        self.evaluate_at(attempt, Utc::now().date_naive())
    }

    /// Evaluate an attempt as of `today`
    pub fn evaluate_at(&self, attempt: &PaymentAttempt<'_>, today: NaiveDate) -> SecurityCheckResult {
        let weights = &self.config.weights;
        let card = self.directory.classify(attempt.card_number);

        let mut failures = Vec::new();
        if !validate_card_number(attempt.card_number) {
            failures.push(CheckFailure::InvalidCardNumber);
        }
        if !validate_cvv(attempt.cvv, attempt.card_number) {
            failures.push(CheckFailure::InvalidCvv);
        }
        if !self
            .expiry
            .validate_at(attempt.expiry_month, attempt.expiry_year, today)
        {
            failures.push(CheckFailure::InvalidExpiry);
        }

        let ip = self.ip.analyze(attempt.ip);
        let activity = self
            .activity
            .detect(&card, &ip, attempt.amount, attempt.previous_attempts);

        let mut total = failures
            .iter()
            .fold(0u32, |acc, failure| acc.saturating_add(failure.weight(weights)));
        total = total.saturating_add(u32::from(ip.risk_contribution));

        let mut warnings = Vec::new();
        if card.is_test_instrument {
            total = total.saturating_add(weights.test_instrument);
            warnings.push(TEST_INSTRUMENT_WARNING.to_string());
        }
        for reason in activity.reasons {
            total = total.saturating_add(weights.suspicious_reason);
            warnings.push(reason);
        }
        if card.network == CardNetwork::Unknown {
            total = total.saturating_add(weights.unknown_network);
            warnings.push(UNKNOWN_NETWORK_WARNING.to_string());
        }

        let result = SecurityCheckResult {
            is_valid: failures.is_empty(),
            errors: failures.iter().map(ToString::to_string).collect(),
            warnings,
            risk_score: RiskScore::from_total(total),
        };

        info!(
            network = %card.network,
            is_test = card.is_test_instrument,
            is_valid = result.is_valid,
            risk_score = result.risk_score.score(),
            warnings = result.warnings.len(),
            "Security check completed"
        );

        result
    }
}

impl Default for RiskAggregator {
    fn default() -> Self {
        // Config::default() passes validate(), see config::tests
        Self::assemble(Config::default(), BinDirectory::embedded())
    }
}
