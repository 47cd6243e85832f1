use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Market, Side, Trader, TradeSignal};

// ---------------------------------------------------------------------------
// Raw wire types (Data API / Gamma)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiLeaderboardRow {
    #[serde(rename = "proxyWallet", default)]
    pub proxy_wallet: Option<String>,
    #[serde(rename = "userName", default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub pnl: Option<Decimal>,
    #[serde(default)]
    pub vol: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiUserTrade {
    #[serde(rename = "conditionId", default)]
    pub condition_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub size: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Epoch seconds; the API sends this as a number or a string.
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiToken {
    pub token_id: String,
    pub outcome: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub winner: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiMarket {
    pub condition_id: String,
    pub question: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tokens: Vec<ApiToken>,
    #[serde(default)]
    pub volume_24h: Option<Decimal>,
    #[serde(default)]
    pub liquidity: Option<Decimal>,
    #[serde(default)]
    pub closed: Option<bool>,
    #[serde(default)]
    pub end_date_iso: Option<String>,
}

// ---------------------------------------------------------------------------
// Per-record parse results
// ---------------------------------------------------------------------------

/// Why a single feed record was dropped. One bad row never fails a batch.
#[derive(Debug, Error)]
pub enum FeedParseError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("unrecognized side `{0}`")]
    BadSide(String),

    #[error("price {0} outside (0, 1)")]
    BadPrice(Decimal),
}

/// Valid records plus the errors for the rows that did not parse.
#[derive(Debug, Default)]
pub struct FeedBatch<T> {
    pub records: Vec<T>,
    pub skipped: Vec<FeedParseError>,
}

impl<T> FeedBatch<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn push(&mut self, result: Result<T, FeedParseError>) {
        match result {
            Ok(record) => self.records.push(record),
            Err(err) => self.skipped.push(err),
        }
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

// ---------------------------------------------------------------------------
// Leaderboard row -> Trader
// ---------------------------------------------------------------------------

/// Turn a leaderboard row into an unscored trader.
///
/// The leaderboard only carries profit and volume, so the per-trader stats
/// are estimated: a base win rate lifted by leaderboard position and ROI,
/// and coarse consistency/drawdown buckets by profit sign. The scorer runs
/// on these estimates downstream.
pub fn parse_leaderboard_row(
    index: usize,
    row: &ApiLeaderboardRow,
) -> Result<Trader, FeedParseError> {
    let address = match row.proxy_wallet.as_deref() {
        Some(addr) if !addr.is_empty() => addr.to_string(),
        _ => return Err(FeedParseError::MissingField("proxyWallet")),
    };

    let profit = row.pnl.unwrap_or_default();
    let volume = row.vol.unwrap_or_default();
    let roi = (profit / volume.max(Decimal::ONE)).to_f64().unwrap_or(0.0);

    let rank_boost = if index < 5 {
        0.15
    } else if index < 10 {
        0.10
    } else if index < 20 {
        0.05
    } else {
        0.0
    };
    let win_rate = (0.55 + rank_boost + (roi * 0.5).min(0.15)).min(0.85);

    let profitable = profit > Decimal::ZERO;

    let mut trader = Trader::new(address);
    trader.name = Some(display_name(row));
    trader.rank = Some(index as u32 + 1);
    trader.profit = profit;
    trader.volume = volume;
    trader.stats.win_rate = win_rate;
    trader.stats.roi_30d = roi;
    trader.stats.trade_count = (50u32).saturating_sub(index as u32 * 2).max(10);
    trader.stats.max_drawdown = if profitable { 0.15 } else { 0.30 };
    trader.stats.consistency = if profitable { 0.7 } else { 0.3 };
    trader.stats.diversity_score = 0.5;

    Ok(trader)
}

/// Username if it looks like one, otherwise a shortened address.
fn display_name(row: &ApiLeaderboardRow) -> String {
    match row.user_name.as_deref() {
        Some(name) if !name.is_empty() && !name.chars().all(|c| c.is_ascii_digit()) => {
            name.to_string()
        }
        _ => short_address(row.proxy_wallet.as_deref().unwrap_or_default()),
    }
}

fn short_address(address: &str) -> String {
    if address.len() > 10 {
        format!("{}...{}", &address[..6], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}

// ---------------------------------------------------------------------------
// User trade row -> TradeSignal
// ---------------------------------------------------------------------------

/// Turn a raw user trade into a signal attributed to `address`.
pub fn parse_trade_row(address: &str, row: &ApiUserTrade) -> Result<TradeSignal, FeedParseError> {
    let market_id = match row.condition_id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return Err(FeedParseError::MissingField("conditionId")),
    };

    let side_raw = row
        .side
        .as_deref()
        .ok_or(FeedParseError::MissingField("side"))?;
    let side =
        Side::from_api_str(side_raw).ok_or_else(|| FeedParseError::BadSide(side_raw.into()))?;

    let size = row.size.ok_or(FeedParseError::MissingField("size"))?;
    // Half is the neutral prior when the feed omits the fill price.
    let price = row.price.unwrap_or_else(|| Decimal::new(5, 1));
    if price <= Decimal::ZERO || price >= Decimal::ONE {
        return Err(FeedParseError::BadPrice(price));
    }

    let mut signal = TradeSignal::new(address, market_id, side, (size * price).round_dp(2), price);
    signal.market_question = row.title.clone();
    if let Some(ts) = row.timestamp.as_ref().and_then(parse_epoch) {
        signal.detected_at = ts;
    }
    Ok(signal)
}

/// Epoch seconds as either a JSON number or a string.
fn parse_epoch(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    let secs = match value {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.parse::<i64>().ok()?,
        _ => return None,
    };
    Utc.timestamp_opt(secs, 0).single()
}

// ---------------------------------------------------------------------------
// ApiMarket -> Market
// ---------------------------------------------------------------------------

impl From<ApiMarket> for Market {
    fn from(api: ApiMarket) -> Self {
        let token_price = |outcome: &str| {
            api.tokens
                .iter()
                .find(|t| t.outcome.eq_ignore_ascii_case(outcome))
                .and_then(|t| t.price)
        };
        let yes_price = token_price("Yes").unwrap_or_else(|| Decimal::new(5, 1));

        let is_resolved = api.closed.unwrap_or(false);
        let outcome = if is_resolved {
            api.tokens
                .iter()
                .find(|t| t.winner == Some(true))
                .and_then(|t| Side::from_api_str(&t.outcome))
        } else {
            None
        };

        Market {
            id: api.condition_id,
            question: api.question,
            category: api.category,
            yes_price,
            no_price: token_price("No").unwrap_or_else(|| Decimal::ONE - yes_price),
            volume_24h: api.volume_24h.unwrap_or_default(),
            liquidity: api.liquidity.unwrap_or_default(),
            is_resolved,
            outcome,
            end_date: api
                .end_date_iso
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
