pub mod market;
pub mod signal;
pub mod trade;
pub mod trader;

pub use market::Market;
pub use signal::TradeSignal;
pub use trade::{BalanceSample, CopyDecision, Trade, TradeStatus, TradingStats};
pub use trader::{HeatLevel, Trader, TraderStats};

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Which side of a binary market a trade is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "YES" | "BUY" => Some(Side::Yes),
            "NO" | "SELL" => Some(Side::No),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Yes => write!(f, "YES"),
            Side::No => write!(f, "NO"),
        }
    }
}
