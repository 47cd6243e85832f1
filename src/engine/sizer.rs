use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Side;

/// Score tiers shared by the sizing rules.
const HIGH_CONFIDENCE: f64 = 90.0;
const MEDIUM_CONFIDENCE: f64 = 70.0;
const LOW_CONFIDENCE: f64 = 50.0;

/// Smallest trade worth placing.
const MIN_AMOUNT: Decimal = Decimal::ONE;

/// Confidence-tiered position size.
///
/// Base percent of the allowed maximum by score tier, scaled by a consensus
/// multiplier capped at 1.5×, then clamped to the configured max fraction
/// of balance and to the balance itself. Floors at $1, rounds to cents.
pub fn confidence_tiered(
    balance: Decimal,
    score: f64,
    consensus: u32,
    max_trade_percent: Decimal,
) -> Decimal {
    let base_percent = if score >= HIGH_CONFIDENCE {
        Decimal::new(40, 2) // 0.40 of max
    } else if score >= MEDIUM_CONFIDENCE {
        Decimal::new(25, 2)
    } else if score >= LOW_CONFIDENCE {
        Decimal::new(10, 2)
    } else {
        Decimal::new(5, 2)
    };

    let extra = (Decimal::from(consensus.saturating_sub(1)) * Decimal::new(25, 2))
        .min(Decimal::new(50, 2));
    let multiplier = Decimal::ONE + extra;

    let percent = (base_percent * multiplier).min(max_trade_percent);

    let amount = balance * percent;
    let amount = amount.max(MIN_AMOUNT);
    let amount = amount.min(balance * max_trade_percent);
    let amount = amount.min(balance);

    amount.round_dp(2)
}

/// Potential profit/loss estimate for a binary position.
#[derive(Debug, Clone, Serialize)]
pub struct RiskReward {
    pub potential_profit_percent: Decimal,
    pub potential_loss_percent: Decimal,
    pub risk_reward_ratio: Decimal,
    pub entry_price: Decimal,
    pub side: Side,
}

/// Risk/reward at a given entry price. The loss leg is always 100% — a
/// losing binary position forfeits the full stake.
pub fn risk_reward(entry_price: Decimal, side: Side) -> RiskReward {
    // Degenerate prices would divide by zero; report a zeroed estimate.
    if entry_price <= Decimal::ZERO || entry_price >= Decimal::ONE {
        return RiskReward {
            potential_profit_percent: Decimal::ZERO,
            potential_loss_percent: Decimal::ONE_HUNDRED,
            risk_reward_ratio: Decimal::ZERO,
            entry_price,
            side,
        };
    }

    let profit_percent = match side {
        Side::Yes => (Decimal::ONE / entry_price - Decimal::ONE) * Decimal::ONE_HUNDRED,
        Side::No => {
            (Decimal::ONE / (Decimal::ONE - entry_price) - Decimal::ONE) * Decimal::ONE_HUNDRED
        }
    };
    let loss_percent = Decimal::ONE_HUNDRED;

    RiskReward {
        potential_profit_percent: profit_percent.round_dp(1),
        potential_loss_percent: loss_percent,
        risk_reward_ratio: (profit_percent / loss_percent).round_dp(2),
        entry_price,
        side,
    }
}

/// Fractional Kelly bet fraction.
///
/// Quarter-Kelly of `(wr·avg_win − (1−wr)·avg_loss) / avg_win`, clamped
/// to [0.05, 0.25]. Degenerate averages fall back to a 10% default.
pub fn fractional_kelly(win_rate: Decimal, avg_win: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_win <= Decimal::ZERO || avg_loss <= Decimal::ZERO {
        return Decimal::new(10, 2); // 0.10
    }

    let kelly = (win_rate * avg_win - (Decimal::ONE - win_rate) * avg_loss) / avg_win;
    let quarter = kelly * Decimal::new(25, 2);

    quarter.clamp(Decimal::new(5, 2), Decimal::new(25, 2))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_tiers() {
        let balance = Decimal::from(1_000);
        let max = Decimal::new(50, 2); // 50%

        // score 95, no consensus → 40% of max = 20% of balance
        assert_eq!(confidence_tiered(balance, 95.0, 1, max), Decimal::from(200));
        // score 75 → 25% of max = 12.5%
        assert_eq!(confidence_tiered(balance, 75.0, 1, max), Decimal::from(125));
        // score 55 → 10% of max = 5%
        assert_eq!(confidence_tiered(balance, 55.0, 1, max), Decimal::from(50));
        // score 30 → 5% of max = 2.5%
        assert_eq!(confidence_tiered(balance, 30.0, 1, max), Decimal::from(25));
    }

    #[test]
    fn test_consensus_multiplier_caps_at_1_5x() {
        let balance = Decimal::from(1_000);
        let max = Decimal::new(50, 2);

        // score 55 base 5%; consensus 3 → ×1.5 → 7.5%
        assert_eq!(confidence_tiered(balance, 55.0, 3, max), Decimal::from(75));
        // consensus 10 still ×1.5
        assert_eq!(confidence_tiered(balance, 55.0, 10, max), Decimal::from(75));
    }

    #[test]
    fn test_size_never_exceeds_max_percent_or_balance() {
        let balance = Decimal::from(100);
        let max = Decimal::new(10, 2); // 10%

        let amount = confidence_tiered(balance, 99.0, 5, max);
        assert!(amount <= balance * max);
        assert!(amount <= balance);
    }

    #[test]
    fn test_minimum_one_dollar() {
        let amount = confidence_tiered(Decimal::from(10), 30.0, 1, Decimal::new(50, 2));
        assert!(amount >= Decimal::ONE);
    }

    #[test]
    fn test_risk_reward_yes_side() {
        let rr = risk_reward(Decimal::new(50, 2), Side::Yes);
        // 1/0.5 - 1 = 100% upside against 100% downside
        assert_eq!(rr.potential_profit_percent, Decimal::ONE_HUNDRED);
        assert_eq!(rr.potential_loss_percent, Decimal::ONE_HUNDRED);
        assert_eq!(rr.risk_reward_ratio, Decimal::ONE);
    }

    #[test]
    fn test_risk_reward_no_side() {
        let rr = risk_reward(Decimal::new(75, 2), Side::No);
        // 1/(1-0.75) - 1 = 300%
        assert_eq!(rr.potential_profit_percent, Decimal::from(300));
        assert_eq!(rr.risk_reward_ratio, Decimal::from(3));
    }

    #[test]
    fn test_risk_reward_degenerate_price() {
        let rr = risk_reward(Decimal::ZERO, Side::Yes);
        assert_eq!(rr.potential_profit_percent, Decimal::ZERO);
        assert_eq!(rr.risk_reward_ratio, Decimal::ZERO);
    }

    #[test]
    fn test_kelly_clamped() {
        // Strong edge → clamps to 0.25
        let f = fractional_kelly(Decimal::new(90, 2), Decimal::from(100), Decimal::from(10));
        assert_eq!(f, Decimal::new(25, 2));

        // No edge → clamps to 0.05
        let f = fractional_kelly(Decimal::new(10, 2), Decimal::from(10), Decimal::from(100));
        assert_eq!(f, Decimal::new(5, 2));
    }

    #[test]
    fn test_kelly_default_on_degenerate_input() {
        assert_eq!(
            fractional_kelly(Decimal::new(60, 2), Decimal::ZERO, Decimal::from(50)),
            Decimal::new(10, 2)
        );
        assert_eq!(
            fractional_kelly(Decimal::new(60, 2), Decimal::from(50), Decimal::ZERO),
            Decimal::new(10, 2)
        );
    }
}
