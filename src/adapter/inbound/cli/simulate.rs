//! Handler for `simulate`.

use std::path::Path;

use anyhow::Context;
use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::output;
use crate::application::EngineSettings;
use crate::domain::money::format_tokens;
use crate::infrastructure::scenario::{MarketSummary, Scenario, SimulationReport};

#[derive(Tabled)]
struct MarketRow {
    #[tabled(rename = "Market")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "P(yes)")]
    price_yes: String,
    #[tabled(rename = "Escrow")]
    balance: String,
    #[tabled(rename = "Fees")]
    fees: String,
    #[tabled(rename = "Paid out")]
    paid_out: String,
}

#[derive(Tabled)]
struct TraderRow {
    #[tabled(rename = "Trader")]
    trader: String,
    #[tabled(rename = "YES")]
    yes_shares: String,
    #[tabled(rename = "NO")]
    no_shares: String,
    #[tabled(rename = "Stake")]
    stake: String,
    #[tabled(rename = "Payout")]
    payout: String,
    #[tabled(rename = "Claimed")]
    claimed: &'static str,
}

impl From<&MarketSummary> for MarketRow {
    fn from(market: &MarketSummary) -> Self {
        Self {
            name: market.name.clone(),
            status: market.status.to_string(),
            outcome: market
                .outcome
                .map_or_else(|| "-".to_string(), |outcome| outcome.to_string()),
            price_yes: market.price_yes.to_string(),
            balance: format_tokens(market.balance_net),
            fees: format_tokens(market.fees),
            paid_out: format_tokens(market.paid_out),
        }
    }
}

/// Execute `simulate`.
///
/// # Errors
///
/// Fails when the scenario cannot be loaded or a market in it cannot be
/// created. Failed steps are reported, not returned.
pub fn execute(path: &Path, settings: EngineSettings) -> anyhow::Result<SimulationReport> {
    let scenario = Scenario::load(path)
        .with_context(|| format!("failed to load scenario {}", path.display()))?;
    let report = scenario
        .replay(settings)
        .with_context(|| format!("failed to replay scenario {}", path.display()))?;

    if output::is_json() {
        output::json_output(json!({ "command": "simulate", "report": report }));
        return Ok(report);
    }

    render(path, &report);
    Ok(report)
}

fn render(path: &Path, report: &SimulationReport) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Scenario", path.display());

    output::section("Steps");
    for step in &report.steps {
        output::step(step.index, step.time, step.action, step.ok, &step.detail);
    }

    output::section("Markets");
    let rows: Vec<MarketRow> = report.markets.iter().map(MarketRow::from).collect();
    output::lines(&Table::new(rows).to_string());

    for market in &report.markets {
        if market.traders.is_empty() {
            continue;
        }
        output::section(&format!("Positions in {}", market.name));
        if output::verbosity() > 0 {
            output::field("Quantities", format!("{} yes / {} no", market.q_yes, market.q_no));
            output::field("Winning shares", market.winning_shares);
            output::field("Total stake", format_tokens(market.total_stake));
        }
        let rows: Vec<TraderRow> = market
            .traders
            .iter()
            .map(|trader| TraderRow {
                trader: trader.trader.to_string(),
                yes_shares: trader.yes_shares.to_string(),
                no_shares: trader.no_shares.to_string(),
                stake: format_tokens(trader.stake),
                payout: format_tokens(trader.payout),
                claimed: if trader.claimed { "yes" } else { "no" },
            })
            .collect();
        output::lines(&Table::new(rows).to_string());
    }

    output::section("Totals");
    output::field("Platform fees", format_tokens(report.total_fees));
    output::field("End time", report.end_time);
    match report.failures() {
        0 => output::success("All steps succeeded"),
        failed => output::warning(&format!("{failed} step(s) failed")),
    }
}
