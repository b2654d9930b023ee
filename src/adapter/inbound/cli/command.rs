//! Command-line interface definitions.
//!
//! `quote` prices a hypothetical buy, `simulate` replays a scenario file
//! and `config` inspects the configuration.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use crate::domain::Side;

/// LMSR binary prediction market engine
#[derive(Parser, Debug)]
#[command(name = "lmsr-markets")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Price a buy against given market quantities
    Quote(QuoteArgs),

    /// Replay a scenario file against a fresh engine
    Simulate(SimulateArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `lmsr-markets config`.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show,
    /// Validate the configuration file; exits non-zero when invalid.
    Validate,
}

/// Arguments for `quote`.
#[derive(Args, Debug, Clone)]
pub struct QuoteArgs {
    /// Liquidity parameter b
    #[arg(long)]
    pub liquidity: Decimal,

    /// Outstanding YES shares
    #[arg(long = "yes", default_value = "0")]
    pub q_yes: Decimal,

    /// Outstanding NO shares
    #[arg(long = "no", default_value = "0")]
    pub q_no: Decimal,

    /// Side to buy [yes, no]
    #[arg(long)]
    pub side: Side,

    /// Number of shares to buy
    #[arg(long)]
    pub shares: Decimal,
}

/// Arguments for `simulate`.
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Scenario TOML file
    pub scenario: PathBuf,
}
