use crate::models::{Trader, TraderStats};

// Factor weights, sum to 1.0.
const WEIGHT_WIN_RATE: f64 = 0.25;
const WEIGHT_ROI: f64 = 0.20;
const WEIGHT_TRADE_COUNT: f64 = 0.15;
const WEIGHT_DRAWDOWN: f64 = 0.15;
const WEIGHT_CONSISTENCY: f64 = 0.15;
const WEIGHT_DIVERSITY: f64 = 0.10;

const WIN_RATE_EXCELLENT: f64 = 0.65;
const WIN_RATE_GOOD: f64 = 0.55;
const WIN_RATE_MIN: f64 = 0.45;

const ROI_EXCELLENT: f64 = 0.30;
const ROI_GOOD: f64 = 0.15;
const ROI_MIN: f64 = 0.05;

const TRADES_EXCELLENT: f64 = 100.0;
const TRADES_GOOD: f64 = 50.0;
const TRADES_MIN: f64 = 20.0;

const DRAWDOWN_EXCELLENT: f64 = 0.10;
const DRAWDOWN_GOOD: f64 = 0.20;
const DRAWDOWN_MAX: f64 = 0.40;

/// Heat-map score for a trader's stats, in [0, 100].
///
/// Six sub-scores are mapped to 0–100 by piecewise-linear interpolation
/// between the named breakpoints, then combined by the fixed weights.
pub fn score_stats(stats: &TraderStats) -> f64 {
    let total = score_win_rate(stats.win_rate) * WEIGHT_WIN_RATE
        + score_roi(stats.roi_30d) * WEIGHT_ROI
        + score_trade_count(stats.trade_count) * WEIGHT_TRADE_COUNT
        + score_drawdown(stats.max_drawdown) * WEIGHT_DRAWDOWN
        + stats.consistency * 100.0 * WEIGHT_CONSISTENCY
        + stats.diversity_score * 100.0 * WEIGHT_DIVERSITY;

    total.clamp(0.0, 100.0)
}

/// Score a trader and write the derived `score` / `heat_level` fields.
pub fn score_trader(trader: &mut Trader) -> f64 {
    let score = score_stats(&trader.stats);
    trader.apply_score(score);

    tracing::debug!(
        address = %trader.address,
        score = format!("{score:.1}"),
        heat = %trader.heat_level,
        "Trader scored"
    );

    score
}

/// Linear interpolation of `value` over [lo, hi] onto [out_lo, out_hi].
/// A degenerate interval maps to the lower output bound.
fn lerp(value: f64, lo: f64, hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    if hi <= lo {
        return out_lo;
    }
    out_lo + (value - lo) / (hi - lo) * (out_hi - out_lo)
}

fn score_win_rate(win_rate: f64) -> f64 {
    if win_rate >= WIN_RATE_EXCELLENT {
        100.0
    } else if win_rate >= WIN_RATE_GOOD {
        lerp(win_rate, WIN_RATE_GOOD, WIN_RATE_EXCELLENT, 60.0, 100.0)
    } else if win_rate >= WIN_RATE_MIN {
        lerp(win_rate, WIN_RATE_MIN, WIN_RATE_GOOD, 30.0, 60.0)
    } else {
        lerp(win_rate, 0.0, WIN_RATE_MIN, 0.0, 30.0)
    }
}

fn score_roi(roi: f64) -> f64 {
    if roi <= 0.0 {
        (20.0 + roi * 100.0).max(0.0)
    } else if roi >= ROI_EXCELLENT {
        100.0
    } else if roi >= ROI_GOOD {
        lerp(roi, ROI_GOOD, ROI_EXCELLENT, 70.0, 100.0)
    } else if roi >= ROI_MIN {
        lerp(roi, ROI_MIN, ROI_GOOD, 40.0, 70.0)
    } else {
        lerp(roi, 0.0, ROI_MIN, 20.0, 40.0)
    }
}

fn score_trade_count(count: u32) -> f64 {
    let count = f64::from(count);
    if count >= TRADES_EXCELLENT {
        100.0
    } else if count >= TRADES_GOOD {
        lerp(count, TRADES_GOOD, TRADES_EXCELLENT, 60.0, 100.0)
    } else if count >= TRADES_MIN {
        lerp(count, TRADES_MIN, TRADES_GOOD, 30.0, 60.0)
    } else {
        lerp(count, 0.0, TRADES_MIN, 0.0, 30.0)
    }
}

/// Drawdown scores inversely: lower drawdown, higher score.
fn score_drawdown(drawdown: f64) -> f64 {
    if drawdown <= DRAWDOWN_EXCELLENT {
        100.0
    } else if drawdown <= DRAWDOWN_GOOD {
        lerp(DRAWDOWN_GOOD - drawdown, 0.0, DRAWDOWN_GOOD - DRAWDOWN_EXCELLENT, 70.0, 100.0)
    } else if drawdown <= DRAWDOWN_MAX {
        lerp(DRAWDOWN_MAX - drawdown, 0.0, DRAWDOWN_MAX - DRAWDOWN_GOOD, 30.0, 70.0)
    } else {
        (30.0 - (drawdown - DRAWDOWN_MAX) * 100.0).max(0.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HeatLevel;

    fn stats(win_rate: f64, roi: f64, trades: u32, dd: f64, cons: f64, div: f64) -> TraderStats {
        TraderStats {
            win_rate,
            roi_30d: roi,
            trade_count: trades,
            max_drawdown: dd,
            consistency: cons,
            diversity_score: div,
        }
    }

    #[test]
    fn test_score_always_in_range() {
        let cases = [
            stats(0.0, -5.0, 0, 1.0, 0.0, 0.0),
            stats(1.0, 5.0, 10_000, 0.0, 1.0, 1.0),
            stats(0.5, 0.0, 50, 0.2, 0.5, 0.5),
        ];
        for s in &cases {
            let score = score_stats(s);
            assert!((0.0..=100.0).contains(&score), "score {score} out of range");
        }
    }

    #[test]
    fn test_perfect_trader_scores_100() {
        let s = stats(0.70, 0.50, 200, 0.05, 1.0, 1.0);
        assert!((score_stats(&s) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_monotone_in_win_rate() {
        let mut prev = -1.0;
        for i in 0..=100 {
            let wr = i as f64 / 100.0;
            let score = score_stats(&stats(wr, 0.1, 60, 0.15, 0.5, 0.5));
            assert!(score >= prev, "score decreased at win_rate={wr}");
            prev = score;
        }
    }

    #[test]
    fn test_monotone_decreasing_in_drawdown() {
        let mut prev = f64::INFINITY;
        for i in 0..=100 {
            let dd = i as f64 / 100.0;
            let score = score_stats(&stats(0.6, 0.1, 60, dd, 0.5, 0.5));
            assert!(score <= prev, "score increased at drawdown={dd}");
            prev = score;
        }
    }

    #[test]
    fn test_monotone_in_roi() {
        // Sweep across both the loss branch and every positive breakpoint.
        let mut prev = -1.0;
        for i in -50..=50 {
            let roi = i as f64 / 100.0;
            let score = score_stats(&stats(0.6, roi, 60, 0.15, 0.5, 0.5));
            assert!(score >= prev, "score decreased at roi={roi}");
            prev = score;
        }
    }

    #[test]
    fn test_monotone_in_trade_count() {
        let mut prev = -1.0;
        for count in 0..=150 {
            let score = score_stats(&stats(0.6, 0.1, count, 0.15, 0.5, 0.5));
            assert!(score >= prev, "score decreased at trade_count={count}");
            prev = score;
        }
    }

    #[test]
    fn test_monotone_in_consistency() {
        let mut prev = -1.0;
        for i in 0..=100 {
            let cons = i as f64 / 100.0;
            let score = score_stats(&stats(0.6, 0.1, 60, 0.15, cons, 0.5));
            assert!(score >= prev, "score decreased at consistency={cons}");
            prev = score;
        }
    }

    #[test]
    fn test_monotone_in_diversity() {
        let mut prev = -1.0;
        for i in 0..=100 {
            let div = i as f64 / 100.0;
            let score = score_stats(&stats(0.6, 0.1, 60, 0.15, 0.5, div));
            assert!(score >= prev, "score decreased at diversity={div}");
            prev = score;
        }
    }

    #[test]
    fn test_negative_roi_floors_at_zero_subscore() {
        // roi = -0.5 → sub-score max(0, 20 - 50) = 0
        let low = score_stats(&stats(0.6, -0.5, 60, 0.15, 0.5, 0.5));
        let flat = score_stats(&stats(0.6, -0.2, 60, 0.15, 0.5, 0.5));
        assert_eq!(low, flat, "both deep-negative ROIs bottom out at sub-score 0");
    }

    #[test]
    fn test_breakpoint_boundaries() {
        assert_eq!(score_win_rate(0.65), 100.0);
        assert_eq!(score_win_rate(0.55), 60.0);
        assert_eq!(score_win_rate(0.45), 30.0);
        assert_eq!(score_trade_count(100), 100.0);
        assert_eq!(score_trade_count(50), 60.0);
        assert_eq!(score_trade_count(20), 30.0);
        assert_eq!(score_drawdown(0.10), 100.0);
        assert_eq!(score_drawdown(0.20), 70.0);
        assert_eq!(score_drawdown(0.40), 30.0);
    }

    #[test]
    fn test_lerp_degenerate_interval_returns_lower_bound() {
        assert_eq!(lerp(5.0, 3.0, 3.0, 10.0, 20.0), 10.0);
    }

    #[test]
    fn test_heat_level_follows_score() {
        let mut trader = Trader::new("0xabc");
        trader.stats = stats(0.70, 0.50, 200, 0.05, 1.0, 1.0);
        score_trader(&mut trader);
        assert_eq!(trader.heat_level, HeatLevel::Hot);

        trader.stats = stats(0.0, -1.0, 0, 1.0, 0.0, 0.0);
        score_trader(&mut trader);
        assert_eq!(trader.heat_level, HeatLevel::Cold);
        assert_eq!(trader.heat_level, HeatLevel::from_score(trader.score));
    }
}
