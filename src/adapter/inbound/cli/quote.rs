//! Handler for `quote`.

use anyhow::Context;
use serde::Serialize;
use serde_json::json;

use crate::adapter::inbound::cli::command::QuoteArgs;
use crate::adapter::inbound::cli::output;
use crate::application::ledger::quantities_after;
use crate::domain::money::{fee_for, format_tokens};
use crate::domain::{lmsr, Amount, Fixed, Side};

/// A priced buy against explicit market quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteSummary {
    pub liquidity: Fixed,
    pub q_yes: Fixed,
    pub q_no: Fixed,
    pub side: Side,
    pub shares: Fixed,
    pub fee_bps: u32,
    pub cost: Amount,
    pub fee: Amount,
    pub net: Amount,
    pub price_yes_before: Fixed,
    pub price_no_before: Fixed,
    pub price_yes_after: Fixed,
    pub price_no_after: Fixed,
}

/// Price `args` at `fee_bps`.
///
/// # Errors
///
/// Fails for values that do not fit the fixed-point range, `b <= 0`, or
/// negative and oversized share quantities.
pub fn compute(args: &QuoteArgs, fee_bps: u32) -> anyhow::Result<QuoteSummary> {
    let liquidity = Fixed::from_decimal(args.liquidity).context("invalid --liquidity")?;
    let q_yes = Fixed::from_decimal(args.q_yes).context("invalid --yes")?;
    let q_no = Fixed::from_decimal(args.q_no).context("invalid --no")?;
    let shares = Fixed::from_decimal(args.shares).context("invalid --shares")?;

    let (price_yes_before, price_no_before) = lmsr::prices(q_yes, q_no, liquidity)?;
    let cost = lmsr::purchase_cost(q_yes, q_no, args.side, shares, liquidity)?.to_amount()?;
    let fee = fee_for(cost, fee_bps)?;

    let (after_yes, after_no) = quantities_after(q_yes, q_no, args.side, shares)?;
    let (price_yes_after, price_no_after) = lmsr::prices(after_yes, after_no, liquidity)?;

    Ok(QuoteSummary {
        liquidity,
        q_yes,
        q_no,
        side: args.side,
        shares,
        fee_bps,
        cost,
        fee,
        net: cost - fee,
        price_yes_before,
        price_no_before,
        price_yes_after,
        price_no_after,
    })
}

/// Execute `quote`.
pub fn execute(args: &QuoteArgs, fee_bps: u32) -> anyhow::Result<()> {
    let quote = compute(args, fee_bps)?;

    if output::is_json() {
        output::json_output(json!({ "command": "quote", "quote": quote }));
        return Ok(());
    }

    output::section("Quote");
    output::field("Liquidity (b)", quote.liquidity);
    output::field("Buy", format!("{} {}", quote.shares, quote.side));
    output::field("Cost", output::highlight(format_tokens(quote.cost)));
    output::field(
        "Fee",
        format!("{} ({} bp)", format_tokens(quote.fee), quote.fee_bps),
    );
    output::field("To escrow", format_tokens(quote.net));

    output::section("Prices");
    output::field(
        "YES",
        format!("{} -> {}", quote.price_yes_before, quote.price_yes_after),
    );
    output::field(
        "NO",
        format!("{} -> {}", quote.price_no_before, quote.price_no_after),
    );
    Ok(())
}
