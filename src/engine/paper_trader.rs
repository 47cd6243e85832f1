use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    BalanceSample, CopyDecision, Side, Trade, TradeSignal, TradeStatus, TradingStats,
};

use super::slippage::{SlippageSource, UniformSlippage};

/// Size impact: one percentage point of slippage per $100 of stake.
const SIZE_IMPACT_DIVISOR: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
/// Size impact cap, as a fraction.
const SIZE_IMPACT_CAP: Decimal = Decimal::from_parts(2, 0, 0, false, 2); // 0.02
/// Fills deviating more than this from the signal price are missed.
const MAX_PRICE_DEVIATION: Decimal = Decimal::from_parts(10, 0, 0, false, 2); // 0.10

const PRICE_MIN: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01
const PRICE_MAX: Decimal = Decimal::from_parts(99, 0, 0, false, 2); // 0.99

/// Paper trading engine.
///
/// Owns the simulated balance, every open and closed position, and the
/// aggregate stats. Balance never goes negative: the stake is debited the
/// instant a position opens and only returned (with profit or loss) on
/// close, or in full on cancel. Each operation applies atomically from
/// the caller's point of view.
pub struct PaperTrader {
    initial_balance: Decimal,
    balance: Decimal,
    positions: HashMap<Uuid, Trade>,
    history: Vec<Trade>,
    stats: TradingStats,
    balance_history: Vec<BalanceSample>,
    slippage: Box<dyn SlippageSource>,
}

/// Read-only summary for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct TradingSummary {
    pub mode: &'static str,
    pub initial_balance: Decimal,
    pub current_balance: Decimal,
    pub total_value: Decimal,
    pub pnl: Decimal,
    pub pnl_percent: Decimal,
    pub total_trades: u32,
    pub open_trades: u32,
    pub closed_trades: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub best_trade: Decimal,
    pub worst_trade: Decimal,
    pub avg_profit: Decimal,
}

impl PaperTrader {
    pub fn new(initial_balance: Decimal) -> Self {
        Self::with_slippage(initial_balance, Box::new(UniformSlippage::new()))
    }

    pub fn with_slippage(initial_balance: Decimal, slippage: Box<dyn SlippageSource>) -> Self {
        let mut trader = Self {
            initial_balance,
            balance: initial_balance,
            positions: HashMap::new(),
            history: Vec::new(),
            stats: TradingStats::default(),
            balance_history: Vec::new(),
            slippage,
        };
        trader.record_sample();
        tracing::info!(balance = %initial_balance, "Paper trader initialized");
        trader
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Balance plus capital committed to open positions.
    pub fn total_value(&self) -> Decimal {
        let committed: Decimal = self.positions.values().map(|t| t.amount).sum();
        self.balance + committed
    }

    pub fn pnl(&self) -> Decimal {
        self.total_value() - self.initial_balance
    }

    pub fn pnl_percent(&self) -> Decimal {
        if self.initial_balance.is_zero() {
            return Decimal::ZERO;
        }
        self.pnl() / self.initial_balance * Decimal::ONE_HUNDRED
    }

    pub fn stats(&self) -> &TradingStats {
        &self.stats
    }

    pub fn open_positions(&self) -> Vec<&Trade> {
        self.positions.values().collect()
    }

    pub fn history(&self) -> &[Trade] {
        &self.history
    }

    pub fn position_by_market(&self, market_id: &str) -> Option<&Trade> {
        self.positions.values().find(|t| t.market_id == market_id)
    }

    /// Open a simulated position for an accepted decision.
    ///
    /// Applies the slippage model before committing any balance: the entry
    /// price moves against us by a base rate plus a size impact, and fills
    /// deviating more than 10% from the signal price are missed entirely.
    /// Returns `None` for rejected decisions, insufficient balance, and
    /// missed fills.
    pub fn execute(&mut self, signal: &TradeSignal, decision: &CopyDecision) -> Option<Trade> {
        if !decision.should_copy {
            tracing::debug!(reason = %decision.reason, "Trade not copied");
            return None;
        }

        let amount = decision.amount;
        if amount > self.balance {
            tracing::warn!(
                required = %amount,
                available = %self.balance,
                "Insufficient paper balance — trade skipped"
            );
            return None;
        }

        let base = self.slippage.base_rate();
        let size_impact = (amount / SIZE_IMPACT_DIVISOR).min(SIZE_IMPACT_CAP);
        let total_slippage = base + size_impact;

        // Slippage always moves the entry against the position.
        let adjusted = match signal.side {
            Side::Yes => signal.price * (Decimal::ONE + total_slippage),
            Side::No => signal.price * (Decimal::ONE - total_slippage),
        };

        let deviation = (adjusted - signal.price).abs() / signal.price.max(PRICE_MIN);
        if deviation > MAX_PRICE_DEVIATION {
            tracing::warn!(
                market = %signal.market_id,
                signal_price = %signal.price,
                adjusted = %adjusted,
                "Slippage exceeded 10% — fill missed"
            );
            return None;
        }

        let entry_price = adjusted.clamp(PRICE_MIN, PRICE_MAX);

        let trade = Trade {
            id: Uuid::new_v4(),
            is_paper: true,
            whale_address: signal.whale_address.clone(),
            whale_name: signal.whale_name.clone(),
            market_id: signal.market_id.clone(),
            market_question: signal.market_question.clone(),
            category: signal.category.clone(),
            side: signal.side,
            amount,
            entry_price,
            exit_price: None,
            status: TradeStatus::Open,
            profit: None,
            profit_percent: None,
            whale_score_at_entry: signal.whale_score,
            consensus_count: decision.consensus_count,
            decision_reason: Some(decision.reason.clone()),
            opened_at: Utc::now(),
            closed_at: None,
        };

        self.balance -= amount;
        self.positions.insert(trade.id, trade.clone());
        self.stats.total_trades += 1;
        self.stats.open_trades += 1;

        tracing::info!(
            trade_id = %trade.id,
            market = %trade.market_id,
            side = %trade.side,
            amount = %amount,
            entry_price = %entry_price,
            "Paper trade opened"
        );

        self.record_sample();

        Some(trade)
    }

    /// Close an open position at a final price or declared outcome.
    ///
    /// An outcome of YES settles at 1.0, NO at 0.0; otherwise the price is
    /// used verbatim. Returns `None` when the id is not an open position.
    pub fn close(
        &mut self,
        trade_id: Uuid,
        final_price: Decimal,
        outcome: Option<Side>,
    ) -> Option<Trade> {
        let mut trade = match self.positions.remove(&trade_id) {
            Some(t) => t,
            None => {
                tracing::warn!(trade_id = %trade_id, "Close requested for unknown position");
                return None;
            }
        };

        let exit_price = match outcome {
            Some(Side::Yes) => Decimal::ONE,
            Some(Side::No) => Decimal::ZERO,
            None => final_price,
        };

        trade.settle(exit_price);
        trade.status = TradeStatus::Closed;
        trade.closed_at = Some(Utc::now());

        let profit = trade.profit.unwrap_or(Decimal::ZERO);
        self.balance += trade.amount + profit;

        self.stats.record_close(&trade);
        self.stats.open_trades = self.stats.open_trades.saturating_sub(1);

        tracing::info!(
            trade_id = %trade.id,
            market = %trade.market_id,
            profit = %profit,
            balance = %self.balance,
            outcome = if profit > Decimal::ZERO { "win" } else { "loss" },
            "Paper trade closed"
        );

        self.history.push(trade.clone());
        self.record_sample();

        Some(trade)
    }

    /// Cancel an open position and refund the stake in full.
    /// No payout math applies; profit is forced to zero.
    pub fn cancel(&mut self, trade_id: Uuid) -> Option<Trade> {
        let mut trade = self.positions.remove(&trade_id)?;

        trade.status = TradeStatus::Cancelled;
        trade.closed_at = Some(Utc::now());
        trade.profit = Some(Decimal::ZERO);
        trade.profit_percent = Some(Decimal::ZERO);

        self.balance += trade.amount;
        self.stats.open_trades = self.stats.open_trades.saturating_sub(1);

        tracing::info!(trade_id = %trade.id, market = %trade.market_id, "Paper trade cancelled");

        self.history.push(trade.clone());
        Some(trade)
    }

    /// Restore everything to the initial state.
    pub fn reset(&mut self) {
        self.balance = self.initial_balance;
        self.positions.clear();
        self.history.clear();
        self.stats = TradingStats::default();
        self.balance_history.clear();
        self.record_sample();
        tracing::info!("Paper trader reset");
    }

    /// Hydrate from persisted state after a restart.
    ///
    /// The persisted balance snapshot was taken after stakes were debited,
    /// so recovered positions are re-registered without touching the
    /// balance again. Duplicate or non-open trades are skipped.
    pub fn restore(&mut self, last_balance: Option<Decimal>, open_trades: Vec<Trade>) {
        if let Some(balance) = last_balance {
            self.balance = balance;
        }

        let mut recovered = 0u32;
        for trade in open_trades {
            if trade.status != TradeStatus::Open || self.positions.contains_key(&trade.id) {
                continue;
            }
            self.positions.insert(trade.id, trade);
            recovered += 1;
        }

        self.stats.total_trades += recovered;
        self.stats.open_trades += recovered;

        if recovered > 0 || last_balance.is_some() {
            tracing::info!(
                balance = %self.balance,
                recovered_positions = recovered,
                "Paper trader state restored from persistence"
            );
        }
    }

    pub fn summary(&self) -> TradingSummary {
        TradingSummary {
            mode: "paper",
            initial_balance: self.initial_balance,
            current_balance: self.balance,
            total_value: self.total_value(),
            pnl: self.pnl(),
            pnl_percent: self.pnl_percent().round_dp(2),
            total_trades: self.stats.total_trades,
            open_trades: self.stats.open_trades,
            closed_trades: self.stats.closed_trades,
            wins: self.stats.wins,
            losses: self.stats.losses,
            win_rate: self.stats.win_rate * 100.0,
            best_trade: self.stats.best_trade_profit,
            worst_trade: self.stats.worst_trade_loss,
            avg_profit: self.stats.avg_profit_per_trade.round_dp(2),
        }
    }

    /// Balance history, oldest first.
    pub fn balance_history(&self) -> &[BalanceSample] {
        &self.balance_history
    }

    /// Historical trades, most recently opened first.
    pub fn recent_trades(&self, limit: usize) -> Vec<&Trade> {
        let mut trades: Vec<&Trade> = self.history.iter().collect();
        trades.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        trades.truncate(limit);
        trades
    }

    fn record_sample(&mut self) {
        self.balance_history.push(BalanceSample {
            timestamp: Utc::now(),
            balance: self.balance,
            pnl: self.pnl(),
            trade_count: self.history.len() as u32,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::slippage::FixedSlippage;

    fn trader_with_fixed_slippage(balance: i64, rate: Decimal) -> PaperTrader {
        PaperTrader::with_slippage(Decimal::from(balance), Box::new(FixedSlippage(rate)))
    }

    fn signal(market: &str, side: Side, price: Decimal) -> TradeSignal {
        TradeSignal::new("0xwhale", market, side, Decimal::from(5_000), price)
    }

    fn accept(amount: i64) -> CopyDecision {
        CopyDecision {
            should_copy: true,
            amount: Decimal::from(amount),
            reason: "test".into(),
            confidence: 80.0,
            consensus_count: 1,
        }
    }

    #[test]
    fn test_execute_debits_exact_amount() {
        let mut pt = trader_with_fixed_slippage(1_000, Decimal::new(1, 2));
        let trade = pt
            .execute(&signal("m1", Side::Yes, Decimal::new(60, 2)), &accept(100))
            .expect("trade should open");

        assert_eq!(pt.balance(), Decimal::from(900));
        assert_eq!(trade.status, TradeStatus::Open);
        assert!(trade.profit.is_none());
        assert!(trade.profit_percent.is_none());
    }

    #[test]
    fn test_execute_rejects_overdraft() {
        let mut pt = trader_with_fixed_slippage(50, Decimal::new(1, 2));
        let result = pt.execute(&signal("m1", Side::Yes, Decimal::new(60, 2)), &accept(100));
        assert!(result.is_none());
        assert_eq!(pt.balance(), Decimal::from(50));
    }

    #[test]
    fn test_missed_fill_leaves_balance_untouched() {
        // 15% fixed slippage > 10% deviation limit → fill is missed
        let mut pt = trader_with_fixed_slippage(1_000, Decimal::new(15, 2));
        let result = pt.execute(&signal("m1", Side::Yes, Decimal::new(60, 2)), &accept(100));
        assert!(result.is_none());
        assert_eq!(pt.balance(), Decimal::from(1_000));
        assert_eq!(pt.stats().total_trades, 0);
    }

    #[test]
    fn test_cancel_refunds_in_full() {
        let mut pt = trader_with_fixed_slippage(1_000, Decimal::new(1, 2));
        let trade = pt
            .execute(&signal("m1", Side::No, Decimal::new(40, 2)), &accept(250))
            .unwrap();

        let cancelled = pt.cancel(trade.id).expect("cancel should succeed");
        assert_eq!(cancelled.status, TradeStatus::Cancelled);
        assert_eq!(cancelled.profit, Some(Decimal::ZERO));
        assert_eq!(pt.balance(), Decimal::from(1_000));
        assert_eq!(pt.stats().wins, 0);
        assert_eq!(pt.stats().losses, 0);
    }

    #[test]
    fn test_close_unknown_id_is_noop() {
        let mut pt = trader_with_fixed_slippage(1_000, Decimal::new(1, 2));
        assert!(pt.close(Uuid::new_v4(), Decimal::ONE, None).is_none());
    }

    #[test]
    fn test_restore_skips_duplicates_and_keeps_balance() {
        let mut pt = trader_with_fixed_slippage(1_000, Decimal::new(1, 2));
        let trade = pt
            .execute(&signal("m1", Side::Yes, Decimal::new(60, 2)), &accept(100))
            .unwrap();

        // Re-hydrating the same open trade must not double-register it.
        pt.restore(Some(Decimal::from(900)), vec![trade.clone()]);
        assert_eq!(pt.open_positions().len(), 1);
        assert_eq!(pt.balance(), Decimal::from(900));
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut pt = trader_with_fixed_slippage(1_000, Decimal::new(1, 2));
        pt.execute(&signal("m1", Side::Yes, Decimal::new(60, 2)), &accept(100));
        pt.reset();

        assert_eq!(pt.balance(), Decimal::from(1_000));
        assert!(pt.open_positions().is_empty());
        assert_eq!(pt.stats().total_trades, 0);
        assert_eq!(pt.balance_history().len(), 1);
    }
}
