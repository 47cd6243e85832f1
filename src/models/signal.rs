use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Side;

/// A whale trade detected by the feed. Ephemeral: produced by the feed,
/// consumed once by the decider, never persisted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSignal {
    pub whale_address: String,
    /// Filled in by the decider from the tracked trader.
    pub whale_name: Option<String>,
    /// Filled in by the decider from the tracked trader.
    pub whale_score: f64,

    pub market_id: String,
    pub market_question: Option<String>,
    pub category: Option<String>,

    pub side: Side,
    /// Notional the whale committed, in USD.
    pub amount: Decimal,
    /// YES price at detection, in [0, 1].
    pub price: Decimal,

    pub detected_at: DateTime<Utc>,
}

impl TradeSignal {
    pub fn new(
        whale_address: impl Into<String>,
        market_id: impl Into<String>,
        side: Side,
        amount: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            whale_address: whale_address.into(),
            whale_name: None,
            whale_score: 0.0,
            market_id: market_id.into(),
            market_question: None,
            category: None,
            side,
            amount,
            price,
            detected_at: Utc::now(),
        }
    }
}
