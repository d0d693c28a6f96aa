//! BIN directory: card network and issuer classification
//!
//! The directory is an ordered list of `(prefix, issuer)` rules plus a list
//! of sandbox prefixes. The default table ships inside the crate
//! (`data/bin_table.toml`) and is parsed once per process; alternative
//! tables can be loaded from disk.

use crate::config::BinMatchPolicy;
use crate::{CardInfo, CardNetwork, Error, Result};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Number of leading digits forming the candidate BIN
pub const BIN_LENGTH: usize = 6;

/// Issuer name reported when no table entry matches
pub const UNKNOWN_ISSUER: &str = "Unknown Issuer";

const MAX_TEST_PREFIX_LENGTH: usize = 19;

const EMBEDDED_TABLE: &str = include_str!("../data/bin_table.toml");

lazy_static! {
    static ref EMBEDDED: Arc<BinDirectory> = Arc::new(
        BinDirectory::from_toml_str(EMBEDDED_TABLE).expect("embedded BIN table is valid")
    );
}

/// Issuer rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinEntry {
    /// Leading digits (1-6)
    pub prefix: String,

    /// Issuing bank name
    pub issuer: String,
}

impl BinEntry {
    /// Create new entry
    pub fn new(prefix: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            issuer: issuer.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BinTableFile {
    version: String,
    #[serde(default)]
    test_prefixes: Vec<String>,
    #[serde(default)]
    bins: Vec<BinEntry>,
}

/// Read-only BIN reference data
#[derive(Debug, Clone)]
pub struct BinDirectory {
    version: String,
    entries: Vec<BinEntry>,
    test_prefixes: Vec<String>,
    policy: BinMatchPolicy,
}

impl BinDirectory {
    /// Build a directory, validating every rule
    pub fn new(
        version: impl Into<String>,
        entries: Vec<BinEntry>,
        test_prefixes: Vec<String>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !is_digit_prefix(&entry.prefix, BIN_LENGTH) {
                return Err(Error::InvalidBinTable(format!(
                    "prefix {:?} must be 1-{} digits",
                    entry.prefix, BIN_LENGTH
                )));
            }
            if entry.issuer.trim().is_empty() {
                return Err(Error::InvalidBinTable(format!(
                    "prefix {} has an empty issuer",
                    entry.prefix
                )));
            }
            if !seen.insert(entry.prefix.as_str()) {
                return Err(Error::InvalidBinTable(format!(
                    "duplicate prefix {}",
                    entry.prefix
                )));
            }
        }

        for prefix in &test_prefixes {
            if !is_digit_prefix(prefix, MAX_TEST_PREFIX_LENGTH) {
                return Err(Error::InvalidBinTable(format!(
                    "test prefix {:?} must be 1-{} digits",
                    prefix, MAX_TEST_PREFIX_LENGTH
                )));
            }
        }

        Ok(Self {
            version: version.into(),
            entries,
            test_prefixes,
            policy: BinMatchPolicy::default(),
        })
    }

    /// Table compiled into the crate, shared process-wide
    pub fn embedded() -> Arc<BinDirectory> {
        Arc::clone(&EMBEDDED)
    }

    /// Parse a TOML table
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: BinTableFile = toml::from_str(content)
            .map_err(|e| Error::Parse(format!("Failed to parse BIN table: {}", e)))?;
        Self::new(file.version, file.bins, file.test_prefixes)
    }

    /// Load a TOML table from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Use a different issuer matching policy
    pub fn with_policy(mut self, policy: BinMatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Issuer matching policy
    pub fn policy(&self) -> BinMatchPolicy {
        self.policy
    }

    /// Table version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Number of issuer rules
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Table has no issuer rules
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Issuer rules in table order
    pub fn entries(&self) -> &[BinEntry] {
        &self.entries
    }

    /// Classify a card number
    pub fn classify(&self, card_number: &str) -> CardInfo {
        let digits = normalize_card_number(card_number);
        let info = CardInfo {
            network: detect_network(&digits),
            issuer_name: self
                .issuer_for(&digits)
                .unwrap_or(UNKNOWN_ISSUER)
                .to_string(),
            is_test_instrument: self.is_test_instrument(&digits),
        };

        debug!(
            network = %info.network,
            issuer = %info.issuer_name,
            is_test = info.is_test_instrument,
            "Card classified"
        );

        info
    }

    /// Issuer of the rule matching the candidate BIN of `digits`
    pub fn issuer_for(&self, digits: &str) -> Option<&str> {
        let candidate = candidate_bin(digits);
        let mut matching = self
            .entries
            .iter()
            .filter(|entry| candidate.starts_with(entry.prefix.as_str()));

        let entry = match self.policy {
            BinMatchPolicy::FirstMatch => matching.next(),
            // max_by_key keeps the last maximum; reverse so table order breaks ties
            BinMatchPolicy::LongestPrefix => matching
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .max_by_key(|entry| entry.prefix.len()),
        };

        entry.map(|entry| entry.issuer.as_str())
    }

    /// Number falls in a sandbox range
    pub fn is_test_instrument(&self, digits: &str) -> bool {
        self.test_prefixes
            .iter()
            .any(|prefix| digits.starts_with(prefix.as_str()))
    }
}

/// Strip whitespace and dash separators
pub fn normalize_card_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Network from leading-digit rules, independent of the table
pub fn detect_network(card_number: &str) -> CardNetwork {
    let digits = normalize_card_number(card_number);
    let mut chars = digits.chars();
    match (chars.next(), chars.next()) {
        (Some('4'), _) => CardNetwork::Visa,
        (Some('5'), Some('1'..='5')) => CardNetwork::Mastercard,
        (Some('3'), Some('4' | '7')) => CardNetwork::Amex,
        (Some('6'), _) => CardNetwork::Discover,
        _ => CardNetwork::Unknown,
    }
}

fn candidate_bin(digits: &str) -> &str {
    match digits.char_indices().nth(BIN_LENGTH) {
        Some((idx, _)) => &digits[..idx],
        None => digits,
    }
}

fn is_digit_prefix(prefix: &str, max_len: usize) -> bool {
    !prefix.is_empty() && prefix.len() <= max_len && prefix.bytes().all(|b| b.is_ascii_digit())
}
