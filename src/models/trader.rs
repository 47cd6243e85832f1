use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// HeatLevel
// ---------------------------------------------------------------------------

/// Coarse copy-worthiness bucket derived from a trader's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatLevel {
    Cold,
    Warm,
    Hot,
}

impl HeatLevel {
    /// Hot ≥ 70, warm ≥ 50, cold otherwise.
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            HeatLevel::Hot
        } else if score >= 50.0 {
            HeatLevel::Warm
        } else {
            HeatLevel::Cold
        }
    }
}

impl fmt::Display for HeatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeatLevel::Cold => write!(f, "cold"),
            HeatLevel::Warm => write!(f, "warm"),
            HeatLevel::Hot => write!(f, "hot"),
        }
    }
}

// ---------------------------------------------------------------------------
// TraderStats
// ---------------------------------------------------------------------------

/// Immutable statistics snapshot for a trader, supplied by the feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraderStats {
    /// Fraction of resolved trades that were wins, in [0, 1].
    pub win_rate: f64,
    /// 30-day return on investment as a signed fraction.
    pub roi_30d: f64,
    pub trade_count: u32,
    /// Largest observed equity drop, in [0, 1]. Lower is better.
    pub max_drawdown: f64,
    pub consistency: f64,
    pub diversity_score: f64,
}

// ---------------------------------------------------------------------------
// Trader
// ---------------------------------------------------------------------------

/// A tracked whale. Identity is the address; the ranker upserts by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trader {
    pub address: String,
    pub name: Option<String>,

    // From the leaderboard
    pub rank: Option<u32>,
    pub profit: Decimal,
    pub volume: Decimal,

    pub stats: TraderStats,

    // Derived by the scorer. `heat_level` always follows `score`;
    // use `apply_score` instead of writing the fields directly.
    pub score: f64,
    pub heat_level: HeatLevel,

    pub is_active: bool,
    pub last_trade_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trader {
    pub fn new(address: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            address: address.into(),
            name: None,
            rank: None,
            profit: Decimal::ZERO,
            volume: Decimal::ZERO,
            stats: TraderStats::default(),
            score: 0.0,
            heat_level: HeatLevel::Cold,
            is_active: true,
            last_trade_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the score and recompute the heat level in one step.
    pub fn apply_score(&mut self, score: f64) {
        self.score = score;
        self.heat_level = HeatLevel::from_score(score);
        self.updated_at = Utc::now();
    }
}
