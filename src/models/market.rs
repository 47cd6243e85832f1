use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Side;

/// Snapshot of a binary market, as far as the decider cares about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub id: String,
    pub question: String,
    pub category: Option<String>,

    pub yes_price: Decimal,
    pub no_price: Decimal,
    pub volume_24h: Decimal,
    pub liquidity: Decimal,

    pub is_resolved: bool,
    /// Winning side once resolved.
    pub outcome: Option<Side>,
    pub end_date: Option<DateTime<Utc>>,
}
