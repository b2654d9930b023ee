//! Scenario files: scripted market histories replayed against a fresh engine.
//!
//! A scenario declares markets, created at `start_time`, and an ordered list
//! of steps. Replays run on a [`ManualClock`] with in-memory value sources,
//! so they are fully deterministic. A failing step is recorded and the
//! replay moves on to the next one.
//!
//! ```toml
//! start_time = 1700000000
//!
//! [[markets]]
//! name = "eth"
//! description = "ETH above 4000 at close"
//! deadline = 1700003600
//! liquidity = 10
//! target = { kind = "reference_price", feed_id = "0x11..11", target_price = 4000 }
//!
//! [[steps]]
//! action = "buy"
//! market = "eth"
//! trader = "alice"
//! side = "yes"
//! shares = 1
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::adapter::outbound::{InMemoryPoolBook, InMemoryPriceFeed, ManualClock};
use crate::application::{BuyOrder, EngineSettings, MarketEngine};
use crate::domain::money::format_tokens;
use crate::domain::{
    Amount, FeedId, Fixed, MarketConfig, MarketId, MarketStatus, Outcome, PoolId,
    ResolutionTarget, Side, TraderId,
};
use crate::error::{ConfigError, Result};
use crate::port::{Clock, PriceObservation, PriceUpdate};

/// A complete scenario file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Clock value when the markets are created.
    pub start_time: i64,

    /// Fee per submitted price update, in base units.
    #[serde(default)]
    pub price_update_fee: u64,

    #[serde(default)]
    pub markets: Vec<ScenarioMarket>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A market declared by a scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioMarket {
    /// Label steps use to refer to the market.
    pub name: String,
    pub description: String,
    pub deadline: i64,
    pub liquidity: Fixed,
    #[serde(default = "default_creator")]
    pub creator: String,
    pub target: ScenarioTarget,
}

fn default_creator() -> String {
    "scenario".to_string()
}

/// Resolution target as written in a scenario.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScenarioTarget {
    ReferencePrice { feed_id: FeedId, target_price: i64 },
    PoolLiquidity { pool: PoolId, target_liquidity: u64 },
}

impl From<&ScenarioTarget> for ResolutionTarget {
    fn from(target: &ScenarioTarget) -> Self {
        match target {
            ScenarioTarget::ReferencePrice {
                feed_id,
                target_price,
            } => Self::ReferencePrice {
                feed_id: *feed_id,
                target_price: *target_price,
            },
            ScenarioTarget::PoolLiquidity {
                pool,
                target_liquidity,
            } => Self::PoolLiquidity {
                pool: *pool,
                target_liquidity: u128::from(*target_liquidity),
            },
        }
    }
}

/// One scripted action.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Buy shares. Without `payment` the trader pays the quoted cost exactly.
    Buy {
        market: String,
        trader: String,
        side: Side,
        shares: Fixed,
        /// Payment in tokens.
        #[serde(default)]
        payment: Option<Fixed>,
    },
    /// Move the clock forward.
    Advance { secs: i64 },
    /// Submit a price update; `publish_time` defaults to the current time.
    PublishPrice {
        feed_id: FeedId,
        price: i64,
        #[serde(default)]
        confidence: u64,
        #[serde(default)]
        exponent: i32,
        #[serde(default)]
        publish_time: Option<i64>,
        #[serde(default)]
        fee: u64,
    },
    SetLiquidity { pool: PoolId, liquidity: u64 },
    /// Make a pool unreadable (`down = true`) or readable again.
    PoolOutage {
        pool: PoolId,
        #[serde(default = "default_down")]
        down: bool,
    },
    Resolve { market: String },
    Claim { market: String, trader: String },
}

fn default_down() -> bool {
    true
}

impl Step {
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Buy { .. } => "buy",
            Self::Advance { .. } => "advance",
            Self::PublishPrice { .. } => "publish_price",
            Self::SetLiquidity { .. } => "set_liquidity",
            Self::PoolOutage { .. } => "pool_outage",
            Self::Resolve { .. } => "resolve",
            Self::Claim { .. } => "claim",
        }
    }
}

/// Outcome of one replayed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub time: i64,
    pub action: &'static str,
    pub ok: bool,
    pub detail: String,
}

/// Final state of one trader in one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraderSummary {
    pub trader: TraderId,
    pub yes_shares: Fixed,
    pub no_shares: Fixed,
    pub stake: Amount,
    pub payout: Amount,
    pub claimed: bool,
}

/// Final state of one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketSummary {
    pub name: String,
    pub market_id: MarketId,
    pub status: MarketStatus,
    pub outcome: Option<Outcome>,
    pub q_yes: Fixed,
    pub q_no: Fixed,
    pub price_yes: Fixed,
    pub price_no: Fixed,
    pub balance_net: Amount,
    pub fees: Amount,
    pub total_stake: Amount,
    pub paid_out: Amount,
    pub winning_shares: Fixed,
    pub traders: Vec<TraderSummary>,
}

/// Everything a replay produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub steps: Vec<StepRecord>,
    pub markets: Vec<MarketSummary>,
    pub total_fees: Amount,
    pub end_time: i64,
}

impl SimulationReport {
    /// Number of steps that failed.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.steps.iter().filter(|step| !step.ok).count()
    }

    #[must_use]
    pub fn market(&self, name: &str) -> Option<&MarketSummary> {
        self.markets.iter().find(|market| market.name == name)
    }
}

impl Scenario {
    /// Parse a scenario from TOML content.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed content, or
    /// [`ConfigError::InvalidValue`] for duplicate market names.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        let mut seen = std::collections::HashSet::new();
        for market in &scenario.markets {
            if !seen.insert(market.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "markets.name",
                    reason: format!("duplicate market name '{}'", market.name),
                }
                .into());
            }
        }
        Ok(scenario)
    }

    /// Load a scenario file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Replay the scenario on a fresh engine.
    ///
    /// # Errors
    ///
    /// Fails only if a declared market cannot be created; step failures are
    /// part of the report.
    pub fn replay(&self, settings: EngineSettings) -> Result<SimulationReport> {
        let clock = Arc::new(ManualClock::new(self.start_time));
        let prices = Arc::new(InMemoryPriceFeed::new(u128::from(self.price_update_fee)));
        let pools = Arc::new(InMemoryPoolBook::new());
        let engine = MarketEngine::new(settings, clock.clone(), prices, pools.clone());

        let mut replay = Replay {
            engine,
            clock,
            pools,
            markets: HashMap::new(),
        };
        let mut order = Vec::with_capacity(self.markets.len());
        for entry in &self.markets {
            let id = replay.engine.create_market(MarketConfig {
                description: entry.description.clone(),
                deadline: entry.deadline,
                liquidity: entry.liquidity,
                target: ResolutionTarget::from(&entry.target),
                creator: TraderId::new(entry.creator.as_str()),
            })?;
            replay.markets.insert(entry.name.clone(), id);
            order.push((entry.name.clone(), id));
        }

        let mut steps = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            let record = match replay.run(step) {
                Ok(detail) => StepRecord {
                    index,
                    time: replay.clock.now(),
                    action: step.action(),
                    ok: true,
                    detail,
                },
                Err(err) => {
                    warn!(step = index, action = step.action(), error = %err, "Scenario step failed");
                    StepRecord {
                        index,
                        time: replay.clock.now(),
                        action: step.action(),
                        ok: false,
                        detail: err.to_string(),
                    }
                }
            };
            steps.push(record);
        }

        let markets = order
            .into_iter()
            .map(|(name, id)| replay.summarize(name, id))
            .collect::<Result<Vec<_>>>()?;
        let report = SimulationReport {
            steps,
            markets,
            total_fees: replay.engine.total_platform_fees(),
            end_time: replay.clock.now(),
        };
        info!(
            steps = report.steps.len(),
            failures = report.failures(),
            "Scenario replayed"
        );
        Ok(report)
    }
}

struct Replay {
    engine: MarketEngine,
    clock: Arc<ManualClock>,
    pools: Arc<InMemoryPoolBook>,
    markets: HashMap<String, MarketId>,
}

impl Replay {
    fn market(&self, name: &str) -> Result<MarketId> {
        self.markets.get(name).copied().ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "market",
                reason: format!("unknown market '{name}'"),
            }
            .into()
        })
    }

    fn run(&mut self, step: &Step) -> Result<String> {
        match step {
            Step::Buy {
                market,
                trader,
                side,
                shares,
                payment,
            } => {
                let market_id = self.market(market)?;
                let payment = match payment {
                    Some(tokens) => tokens.to_amount()?,
                    None => self.engine.quote(market_id, *side, *shares)?.cost,
                };
                let receipt = self.engine.buy(&BuyOrder {
                    market_id,
                    trader: TraderId::new(trader.as_str()),
                    side: *side,
                    shares: *shares,
                    payment,
                })?;
                Ok(format!(
                    "{trader} bought {shares} {side} in {market} for {} (fee {}, refund {}); yes now {}",
                    format_tokens(receipt.cost),
                    format_tokens(receipt.fee),
                    format_tokens(receipt.refund),
                    receipt.price_yes_after,
                ))
            }
            Step::Advance { secs } => {
                let now = self.clock.advance(*secs);
                Ok(format!("clock advanced {secs}s to {now}"))
            }
            Step::PublishPrice {
                feed_id,
                price,
                confidence,
                exponent,
                publish_time,
                fee,
            } => {
                let publish_time = publish_time.unwrap_or_else(|| self.clock.now());
                let update = PriceUpdate {
                    feed_id: *feed_id,
                    observation: PriceObservation {
                        price: *price,
                        confidence: *confidence,
                        exponent: *exponent,
                        publish_time,
                    },
                    payload: Vec::new(),
                };
                self.engine
                    .submit_price_updates(&[update], u128::from(*fee))?;
                Ok(format!("published {price} for {feed_id} at {publish_time}"))
            }
            Step::SetLiquidity { pool, liquidity } => {
                self.pools.set_liquidity(*pool, u128::from(*liquidity));
                Ok(format!("pool {pool} liquidity set to {liquidity}"))
            }
            Step::PoolOutage { pool, down } => {
                self.pools.set_unavailable(*pool, *down);
                let state = if *down { "down" } else { "back up" };
                Ok(format!("pool {pool} {state}"))
            }
            Step::Resolve { market } => {
                let report = self.engine.resolve_market(self.market(market)?)?;
                Ok(format!(
                    "{market} resolved {} with {} winning shares",
                    report.outcome, report.winning_shares
                ))
            }
            Step::Claim { market, trader } => {
                let amount = self
                    .engine
                    .claim_payout(self.market(market)?, &TraderId::new(trader.as_str()))?;
                Ok(format!("{trader} claimed {} from {market}", format_tokens(amount)))
            }
        }
    }

    fn summarize(&self, name: String, market_id: MarketId) -> Result<MarketSummary> {
        let book = self.engine.book(market_id)?;
        let market = book.market();
        let (price_yes, price_no) = self.engine.prices(market_id)?;

        let mut traders: Vec<TraderSummary> = book
            .positions()
            .map(|(trader, position)| TraderSummary {
                trader: trader.clone(),
                yes_shares: position.yes_shares(),
                no_shares: position.no_shares(),
                stake: position.stake(),
                payout: self.engine.payout(market_id, trader),
                claimed: position.is_claimed(),
            })
            .collect();
        traders.sort_by(|a, b| a.trader.cmp(&b.trader));

        Ok(MarketSummary {
            name,
            market_id,
            status: market.status(self.engine.now()),
            outcome: market.outcome(),
            q_yes: market.q_yes(),
            q_no: market.q_no(),
            price_yes,
            price_no,
            balance_net: market.balance_net(),
            fees: market.fees_accrued(),
            total_stake: market.total_stake(),
            paid_out: market.paid_out(),
            winning_shares: self.engine.winning_shares(market_id),
            traders,
        })
    }
}
