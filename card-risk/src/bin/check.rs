//! Card risk check command line tool

use anyhow::Context;
use card_risk::{Config, PaymentAttempt, RiskAggregator, SecurityCheckResult};
use clap::Parser;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "card-risk-check", about = "Pre-flight card validation and risk scoring")]
struct Args {
    /// Card number, spaces and dashes allowed
    #[arg(long)]
    card: String,

    /// Card verification value
    #[arg(long)]
    cvv: String,

    /// Expiry month (1-12)
    #[arg(long)]
    month: String,

    /// Expiry year (two or four digits)
    #[arg(long)]
    year: String,

    /// Origin IP address of the request
    #[arg(long)]
    ip: String,

    /// Charge amount
    #[arg(long)]
    amount: Decimal,

    /// Failed attempts preceding this one
    #[arg(long, default_value_t = 0)]
    previous_attempts: u32,

    /// TOML configuration file (defaults to environment overrides)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Decision {
    Proceed,
    Reject,
}

#[derive(Serialize)]
struct Report<'a> {
    decision: Decision,
    rejection_threshold: u8,
    #[serde(flatten)]
    result: &'a SecurityCheckResult,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::from_env().context("loading config from environment")?,
    };
    let threshold = config.policy.rejection_threshold;
    let aggregator = RiskAggregator::new(config).context("initialising risk aggregator")?;

    let result = aggregator.evaluate(&PaymentAttempt {
        card_number: &args.card,
        cvv: &args.cvv,
        expiry_month: &args.month,
        expiry_year: &args.year,
        ip: &args.ip,
        amount: args.amount,
        previous_attempts: args.previous_attempts,
    });

    let rejected = result.should_reject(threshold);
    let report = Report {
        decision: if rejected { Decision::Reject } else { Decision::Proceed },
        rejection_threshold: threshold,
        result: &result,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if rejected { ExitCode::from(2) } else { ExitCode::SUCCESS })
}
