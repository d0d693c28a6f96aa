//! Origin address risk heuristic
//!
//! No geolocation is performed. The address is bucketed into trusted,
//! private and public ranges and each bucket carries a fixed contribution.

use crate::config::IpRiskConfig;
use crate::{IpClass, IpRiskProfile};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::debug;

/// Country reported for addresses outside the trusted ranges
pub const UNKNOWN_COUNTRY: &str = "UNKNOWN";

/// Origin address analyzer
#[derive(Debug, Clone)]
pub struct IpRiskAnalyzer {
    config: IpRiskConfig,
}

impl IpRiskAnalyzer {
    /// Create new analyzer
    pub fn new(config: IpRiskConfig) -> Self {
        Self { config }
    }

    /// Build the risk profile of `ip`
    pub fn analyze(&self, ip: &str) -> IpRiskProfile {
        let class = classify(ip);
        let (risk_contribution, country_guess) = match class {
            IpClass::Trusted => (
                self.config.trusted_network_risk,
                self.config.home_country.clone(),
            ),
            IpClass::Private => (self.config.private_network_risk, UNKNOWN_COUNTRY.to_string()),
            IpClass::Public | IpClass::Unparseable => {
                (self.config.public_risk, UNKNOWN_COUNTRY.to_string())
            }
        };

        debug!(?class, risk = risk_contribution, "Origin address analyzed");

        IpRiskProfile {
            risk_contribution: risk_contribution.min(100),
            country_guess,
            is_proxy_suspected: false,
            class,
        }
    }
}

impl Default for IpRiskAnalyzer {
    fn default() -> Self {
        Self::new(IpRiskConfig::default())
    }
}

/// Bucket an address string
pub fn classify(ip: &str) -> IpClass {
    match ip.trim().parse::<IpAddr>() {
        Ok(IpAddr::V4(addr)) => classify_v4(addr),
        Ok(IpAddr::V6(addr)) => match addr.to_ipv4_mapped() {
            Some(mapped) => classify_v4(mapped),
            None => classify_v6(addr),
        },
        Err(_) => IpClass::Unparseable,
    }
}

fn classify_v4(addr: Ipv4Addr) -> IpClass {
    let octets = addr.octets();
    match octets {
        [127, ..] | [10, ..] | [192, 168, ..] => IpClass::Trusted,
        [172, ..] | [169, 254, ..] => IpClass::Private,
        _ => IpClass::Public,
    }
}

fn classify_v6(addr: Ipv6Addr) -> IpClass {
    let first = addr.segments()[0];
    if addr.is_loopback() {
        IpClass::Trusted
    } else if first & 0xffc0 == 0xfe80 || first & 0xfe00 == 0xfc00 {
        // fe80::/10 link-local, fc00::/7 unique local
        IpClass::Private
    } else {
        IpClass::Public
    }
}
