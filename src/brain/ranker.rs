use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{HeatLevel, Trader};

use super::scorer;

/// Owns the set of tracked whales and a materialized ranking view.
///
/// Ranking is sorted by score descending; ties keep insertion order.
/// The sort runs once per mutating batch, not per element.
pub struct TraderRanker {
    traders: HashMap<String, Trader>,
    /// Addresses in rank order (best first).
    rankings: Vec<String>,
    /// Insertion sequence per address, for stable tie-breaks.
    arrival: HashMap<String, u64>,
    next_seq: u64,
    last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingsSummary {
    pub total_tracked: usize,
    pub hot_count: usize,
    pub warm_count: usize,
    pub cold_count: usize,
    pub top_score: f64,
    pub avg_score: f64,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Presentation row for the dashboard leaderboard. Formatting happens
/// here so the core stays free of display concerns.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub address: String,
    pub name: String,
    pub score: f64,
    pub heat_level: HeatLevel,
    pub win_rate: String,
    pub profit: String,
    pub trade_count: u32,
    pub is_active: bool,
}

impl TraderRanker {
    pub fn new() -> Self {
        Self {
            traders: HashMap::new(),
            rankings: Vec::new(),
            arrival: HashMap::new(),
            next_seq: 0,
            last_updated: None,
        }
    }

    /// Add or update a trader. Scores it first when still unscored.
    pub fn add(&mut self, mut trader: Trader) {
        if trader.score == 0.0 {
            scorer::score_trader(&mut trader);
        }
        self.upsert(trader);
        self.rebuild_rankings();
    }

    /// Batch upsert with a single re-sort at the end.
    pub fn add_all(&mut self, traders: Vec<Trader>) {
        for mut trader in traders {
            if trader.score == 0.0 {
                scorer::score_trader(&mut trader);
            }
            self.upsert(trader);
        }
        self.rebuild_rankings();
    }

    pub fn remove(&mut self, address: &str) -> bool {
        if self.traders.remove(address).is_some() {
            self.arrival.remove(address);
            self.rebuild_rankings();
            true
        } else {
            false
        }
    }

    pub fn get(&self, address: &str) -> Option<&Trader> {
        self.traders.get(address)
    }

    pub fn len(&self) -> usize {
        self.traders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traders.is_empty()
    }

    /// Top n traders by rank. Never more than the tracked count.
    pub fn top(&self, n: usize) -> Vec<&Trader> {
        self.rankings
            .iter()
            .take(n)
            .filter_map(|addr| self.traders.get(addr))
            .collect()
    }

    pub fn by_heat_level(&self, level: HeatLevel) -> Vec<&Trader> {
        self.rankings
            .iter()
            .filter_map(|addr| self.traders.get(addr))
            .filter(|t| t.heat_level == level)
            .collect()
    }

    pub fn hot_traders(&self) -> Vec<&Trader> {
        self.by_heat_level(HeatLevel::Hot)
    }

    /// Traders whose last trade falls within the rolling window.
    pub fn active_within(&self, window: Duration) -> Vec<&Trader> {
        let cutoff = Utc::now() - window;
        self.traders
            .values()
            .filter(|t| t.last_trade_at.is_some_and(|at| at > cutoff))
            .collect()
    }

    /// Recompute every tracked trader's score, then re-sort once.
    pub fn rescan_scores(&mut self) {
        for trader in self.traders.values_mut() {
            scorer::score_trader(trader);
        }
        self.rebuild_rankings();
        self.last_updated = Some(Utc::now());

        tracing::info!(count = self.traders.len(), "Rescanned whale scores");
    }

    pub fn summary(&self) -> RankingsSummary {
        let hot = self.by_heat_level(HeatLevel::Hot).len();
        let warm = self.by_heat_level(HeatLevel::Warm).len();
        let cold = self.by_heat_level(HeatLevel::Cold).len();

        let top_score = self
            .rankings
            .first()
            .and_then(|addr| self.traders.get(addr))
            .map_or(0.0, |t| t.score);
        let avg_score = if self.traders.is_empty() {
            0.0
        } else {
            self.traders.values().map(|t| t.score).sum::<f64>() / self.traders.len() as f64
        };

        RankingsSummary {
            total_tracked: self.traders.len(),
            hot_count: hot,
            warm_count: warm,
            cold_count: cold,
            top_score,
            avg_score,
            last_updated: self.last_updated,
        }
    }

    pub fn export_leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.rankings
            .iter()
            .filter_map(|addr| self.traders.get(addr))
            .enumerate()
            .map(|(i, t)| LeaderboardEntry {
                rank: i + 1,
                address: t.address.clone(),
                name: t.name.clone().unwrap_or_else(|| format!("Whale #{}", i + 1)),
                score: (t.score * 10.0).round() / 10.0,
                heat_level: t.heat_level,
                win_rate: format!("{:.1}%", t.stats.win_rate * 100.0),
                profit: format!("${:.0}", t.profit),
                trade_count: t.stats.trade_count,
                is_active: t.is_active,
            })
            .collect()
    }

    fn upsert(&mut self, trader: Trader) {
        if !self.arrival.contains_key(&trader.address) {
            self.arrival.insert(trader.address.clone(), self.next_seq);
            self.next_seq += 1;
        }
        self.traders.insert(trader.address.clone(), trader);
    }

    fn rebuild_rankings(&mut self) {
        let mut entries: Vec<(&String, f64, u64)> = self
            .traders
            .values()
            .map(|t| {
                let seq = self.arrival.get(&t.address).copied().unwrap_or(u64::MAX);
                (&t.address, t.score, seq)
            })
            .collect();

        entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.2.cmp(&b.2))
        });

        self.rankings = entries.into_iter().map(|(addr, _, _)| addr.clone()).collect();
    }
}

impl Default for TraderRanker {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
