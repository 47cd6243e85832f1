use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{CopyDecision, Market, Side, Trade, TradeSignal, Trader};

/// Bonus per additional agreeing whale, and its cap.
const CONSENSUS_BONUS: f64 = 10.0;
const MAX_CONSENSUS_BONUS: f64 = 30.0;

/// Adjusted score required to accept a copy.
const MIN_SCORE_TO_COPY: f64 = 50.0;

/// Score tiers for sizing an accepted copy.
const HIGH_CONFIDENCE_SCORE: f64 = 90.0;
const MEDIUM_CONFIDENCE_SCORE: f64 = 70.0;

/// Markets with less liquidity than this cap the adjusted score at 60.
const LOW_LIQUIDITY_FLOOR: i64 = 1_000;
const LOW_LIQUIDITY_SCORE_CAP: f64 = 60.0;

#[derive(Debug, Clone)]
pub struct DeciderConfig {
    /// Whale score below this is rejected outright.
    pub min_whale_score: f64,
    /// Max fraction of balance committed to a single trade.
    pub max_trade_percent: Decimal,
    /// How long a market stays gated after a copy.
    pub cooldown_minutes: i64,
}

impl Default for DeciderConfig {
    fn default() -> Self {
        Self {
            min_whale_score: 50.0,
            max_trade_percent: Decimal::new(50, 2), // 0.50
            cooldown_minutes: 30,
        }
    }
}

/// Gating state machine for copy decisions.
///
/// Owns per-market cooldown timestamps and an open-position registry of
/// trade ids. The registry is a gate only — the paper trader owns the
/// `Trade` objects themselves, and the execution layer must call
/// `register_position` / `close_position` explicitly.
pub struct CopyDecider {
    config: DeciderConfig,
    cooldowns: HashMap<String, DateTime<Utc>>,
    open_positions: HashMap<String, Uuid>,
}

impl CopyDecider {
    pub fn new(config: DeciderConfig) -> Self {
        Self {
            config,
            cooldowns: HashMap::new(),
            open_positions: HashMap::new(),
        }
    }

    /// Evaluate a signal against the gate chain, in order, short-circuiting
    /// at the first failure. Always returns a fully populated decision.
    pub fn decide(
        &mut self,
        signal: &mut TradeSignal,
        whale: &Trader,
        balance: Decimal,
        market: Option<&Market>,
        other_signals: &[TradeSignal],
    ) -> CopyDecision {
        signal.whale_score = whale.score;
        signal.whale_name = whale.name.clone();

        // Gate 1: whale score floor.
        if whale.score < self.config.min_whale_score {
            return CopyDecision::reject(
                format!(
                    "whale score below minimum: {:.0} < {:.0}",
                    whale.score, self.config.min_whale_score
                ),
                whale.score,
            );
        }

        // Gate 2: hard balance minimum.
        if balance < Decimal::ONE {
            return CopyDecision::reject("insufficient balance (min $1)", whale.score);
        }

        // Gate 3: market cooldown.
        if self.cooldown_active(&signal.market_id) {
            return CopyDecision::reject("market in cooldown after a recent copy", whale.score);
        }

        // Gate 4: one open position per market.
        if self.open_positions.contains_key(&signal.market_id) {
            return CopyDecision::reject("open position already exists on this market", whale.score);
        }

        // Gate 5: consensus bonus from other whales on the same market+side.
        let consensus_count = 1 + other_signals
            .iter()
            .filter(|other| {
                other.market_id == signal.market_id
                    && other.side == signal.side
                    && other.whale_address != signal.whale_address
            })
            .count() as u32;

        let bonus = (f64::from(consensus_count - 1) * CONSENSUS_BONUS).min(MAX_CONSENSUS_BONUS);
        let mut final_score = (whale.score + bonus).min(100.0);

        if let Some(market) = market {
            if market.liquidity < Decimal::from(LOW_LIQUIDITY_FLOOR) {
                final_score = final_score.min(LOW_LIQUIDITY_SCORE_CAP);
            }
        }

        // Gate 6: adjusted score threshold.
        if final_score < MIN_SCORE_TO_COPY {
            let mut decision = CopyDecision::reject(
                format!(
                    "adjusted score below copy threshold: {final_score:.0} < {MIN_SCORE_TO_COPY:.0}"
                ),
                final_score,
            );
            decision.consensus_count = consensus_count;
            return decision;
        }

        // Accept: size the copy and record the cooldown.
        let amount = self.copy_amount(balance, final_score, consensus_count);

        let mut reason_parts = vec![format!("score: {final_score:.0}")];
        if consensus_count > 1 {
            reason_parts.push(format!("{consensus_count} whales agree"));
        }
        reason_parts.push(format!("${amount:.2} trade"));

        self.cooldowns.insert(signal.market_id.clone(), Utc::now());

        CopyDecision {
            should_copy: true,
            amount,
            reason: reason_parts.join(" | "),
            confidence: final_score,
            consensus_count,
        }
    }

    /// Size an accepted copy by confidence tier.
    fn copy_amount(&self, balance: Decimal, score: f64, consensus: u32) -> Decimal {
        let max_percent = self.config.max_trade_percent;

        let percent = if score >= HIGH_CONFIDENCE_SCORE && consensus >= 3 {
            max_percent
        } else if score >= MEDIUM_CONFIDENCE_SCORE {
            max_percent * Decimal::new(5, 1) // × 0.5
        } else {
            max_percent * Decimal::new(2, 1) // × 0.2
        };

        let amount = balance * percent;
        let amount = amount.max(Decimal::ONE);
        let amount = amount.min(balance * max_percent);
        let amount = amount.min(balance);

        amount.round_dp(2)
    }

    fn cooldown_active(&self, market_id: &str) -> bool {
        let Some(last) = self.cooldowns.get(market_id) else {
            return false;
        };
        Utc::now() - *last < Duration::minutes(self.config.cooldown_minutes)
    }

    /// Record an open position. Must be called by the execution layer once
    /// a trade actually opened — the decider cannot infer it.
    pub fn register_position(&mut self, market_id: impl Into<String>, trade_id: Uuid) {
        self.open_positions.insert(market_id.into(), trade_id);
    }

    /// Release a market's position gate after the trade closed or cancelled.
    pub fn close_position(&mut self, market_id: &str) {
        self.open_positions.remove(market_id);
    }

    pub fn open_position_for(&self, market_id: &str) -> Option<Uuid> {
        self.open_positions.get(market_id).copied()
    }

    pub fn clear_cooldowns(&mut self) {
        self.cooldowns.clear();
    }

    /// Re-register every OPEN trade recovered by the paper trader, so a
    /// restarted process cannot immediately re-open a market it already
    /// holds a position in.
    pub fn hydrate_open_positions(&mut self, open_trades: &[Trade]) {
        for trade in open_trades {
            self.open_positions.insert(trade.market_id.clone(), trade.id);
        }
        if !open_trades.is_empty() {
            tracing::info!(
                count = open_trades.len(),
                "Hydrated decider position registry from recovered trades"
            );
        }
    }

    /// Read-only consensus aggregation for a market.
    pub fn consensus_for_market(market_id: &str, signals: &[TradeSignal]) -> MarketConsensus {
        let mut yes_whales = Vec::new();
        let mut no_whales = Vec::new();

        for signal in signals.iter().filter(|s| s.market_id == market_id) {
            match signal.side {
                Side::Yes => yes_whales.push(signal.whale_address.clone()),
                Side::No => no_whales.push(signal.whale_address.clone()),
            }
        }

        let yes_count = yes_whales.len() as u32;
        let no_count = no_whales.len() as u32;
        let total = yes_count + no_count;

        let (consensus, strength) = if total == 0 {
            (ConsensusSide::None, 0.0)
        } else if yes_count > no_count {
            (ConsensusSide::Yes, f64::from(yes_count) / f64::from(total) * 100.0)
        } else if no_count > yes_count {
            (ConsensusSide::No, f64::from(no_count) / f64::from(total) * 100.0)
        } else {
            (ConsensusSide::Mixed, 50.0)
        };

        MarketConsensus {
            market_id: market_id.to_string(),
            consensus,
            strength,
            yes_count,
            no_count,
            yes_whales,
            no_whales,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConsensusSide {
    Yes,
    No,
    Mixed,
    None,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarketConsensus {
    pub market_id: String,
    pub consensus: ConsensusSide,
    /// Majority share of signals, as a percentage (50 for a tie).
    pub strength: f64,
    pub yes_count: u32,
    pub no_count: u32,
    pub yes_whales: Vec<String>,
    pub no_whales: Vec<String>,
}
