use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Side;

// ---------------------------------------------------------------------------
// TradeStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Open,
    Closed,
    Cancelled,
}

impl std::fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeStatus::Open => write!(f, "OPEN"),
            TradeStatus::Closed => write!(f, "CLOSED"),
            TradeStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl TradeStatus {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(TradeStatus::Open),
            "CLOSED" => Some(TradeStatus::Closed),
            "CANCELLED" => Some(TradeStatus::Cancelled),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// CopyDecision
// ---------------------------------------------------------------------------

/// Outcome of the decider's gate chain. Always fully populated; a rejection
/// is a normal value, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyDecision {
    pub should_copy: bool,
    /// Meaningful only when `should_copy` is true.
    pub amount: Decimal,
    pub reason: String,
    /// Score behind the decision, in [0, 100].
    pub confidence: f64,
    pub consensus_count: u32,
}

impl CopyDecision {
    pub fn reject(reason: impl Into<String>, confidence: f64) -> Self {
        Self {
            should_copy: false,
            amount: Decimal::ZERO,
            reason: reason.into(),
            confidence,
            consensus_count: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Trade
// ---------------------------------------------------------------------------

/// A simulated position. Owned exclusively by the paper trader from open
/// to archival; the decider only holds the id as a gate back-reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub is_paper: bool,

    pub whale_address: String,
    pub whale_name: Option<String>,

    pub market_id: String,
    pub market_question: Option<String>,
    pub category: Option<String>,

    pub side: Side,
    /// Capital committed, fixed at open.
    pub amount: Decimal,
    /// Entry price after slippage adjustment, in [0.01, 0.99].
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,

    pub status: TradeStatus,
    /// Unset until the trade leaves OPEN. Once CLOSED, always set.
    pub profit: Option<Decimal>,
    pub profit_percent: Option<Decimal>,

    pub whale_score_at_entry: f64,
    pub consensus_count: u32,
    pub decision_reason: Option<String>,

    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Trade {
    /// Binary payout settlement. A YES position pays `amount·(1/entry − 1)`
    /// when the market resolves YES (exit ≥ 0.99) and loses the full stake
    /// otherwise; symmetric for NO against `1 − entry`.
    pub fn settle(&mut self, exit_price: Decimal) {
        let won_threshold_hi = Decimal::new(99, 2); // 0.99
        let won_threshold_lo = Decimal::new(1, 2); // 0.01

        let profit = match self.side {
            Side::Yes => {
                if exit_price >= won_threshold_hi {
                    self.amount * (Decimal::ONE / self.entry_price - Decimal::ONE)
                } else {
                    -self.amount
                }
            }
            Side::No => {
                if exit_price <= won_threshold_lo {
                    self.amount * (Decimal::ONE / (Decimal::ONE - self.entry_price) - Decimal::ONE)
                } else {
                    -self.amount
                }
            }
        };

        self.exit_price = Some(exit_price);
        self.profit = Some(profit);
        if self.amount > Decimal::ZERO {
            self.profit_percent = Some(profit / self.amount * Decimal::ONE_HUNDRED);
        }
    }
}

// ---------------------------------------------------------------------------
// TradingStats
// ---------------------------------------------------------------------------

/// Aggregate performance. Recomputed incrementally on each close,
/// never on open.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradingStats {
    pub total_trades: u32,
    pub open_trades: u32,
    pub closed_trades: u32,

    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,

    pub total_profit: Decimal,
    pub total_invested: Decimal,
    pub roi: Decimal,

    pub best_trade_profit: Decimal,
    pub worst_trade_loss: Decimal,
    pub avg_profit_per_trade: Decimal,
}

impl TradingStats {
    /// Fold a closed trade into the running aggregates.
    pub fn record_close(&mut self, trade: &Trade) {
        let Some(profit) = trade.profit else { return };
        if trade.status != TradeStatus::Closed {
            return;
        }

        self.closed_trades += 1;
        self.total_invested += trade.amount;
        self.total_profit += profit;

        if profit > Decimal::ZERO {
            self.wins += 1;
            if profit > self.best_trade_profit {
                self.best_trade_profit = profit;
            }
        } else {
            self.losses += 1;
            if profit < self.worst_trade_loss {
                self.worst_trade_loss = profit;
            }
        }

        if self.closed_trades > 0 {
            self.win_rate = f64::from(self.wins) / f64::from(self.closed_trades);
            self.avg_profit_per_trade = self.total_profit / Decimal::from(self.closed_trades);
        }
        if self.total_invested > Decimal::ZERO {
            self.roi = self.total_profit / self.total_invested;
        }
    }
}

// ---------------------------------------------------------------------------
// BalanceSample
// ---------------------------------------------------------------------------

/// One point in the balance history (append-only, oldest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSample {
    pub timestamp: DateTime<Utc>,
    pub balance: Decimal,
    pub pnl: Decimal,
    pub trade_count: u32,
}
