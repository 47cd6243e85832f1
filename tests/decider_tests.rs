use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use copybot::brain::{ConsensusSide, CopyDecider, DeciderConfig};
use copybot::models::{Market, Side, Trade, TradeSignal, TradeStatus, Trader};

fn make_whale(address: &str, score: f64) -> Trader {
    let mut whale = Trader::new(address);
    whale.name = Some(format!("whale-{address}"));
    whale.apply_score(score);
    whale
}

fn make_signal(address: &str, market: &str, side: Side) -> TradeSignal {
    TradeSignal::new(
        address,
        market,
        side,
        Decimal::from(25_000),
        Decimal::new(60, 2),
    )
}

fn make_market(id: &str, liquidity: i64) -> Market {
    Market {
        id: id.into(),
        question: "test market".into(),
        category: None,
        yes_price: Decimal::new(60, 2),
        no_price: Decimal::new(40, 2),
        volume_24h: Decimal::from(100_000),
        liquidity: Decimal::from(liquidity),
        is_resolved: false,
        outcome: None,
        end_date: None,
    }
}

fn make_open_trade(market: &str) -> Trade {
    Trade {
        id: Uuid::new_v4(),
        is_paper: true,
        whale_address: "0xwhale".into(),
        whale_name: None,
        market_id: market.into(),
        market_question: None,
        category: None,
        side: Side::Yes,
        amount: Decimal::from(100),
        entry_price: Decimal::new(55, 2),
        exit_price: None,
        status: TradeStatus::Open,
        profit: None,
        profit_percent: None,
        whale_score_at_entry: 80.0,
        consensus_count: 1,
        decision_reason: None,
        opened_at: Utc::now(),
        closed_at: None,
    }
}

#[test]
fn test_low_score_whale_rejected() {
    let mut decider = CopyDecider::new(DeciderConfig::default());
    let whale = make_whale("0xa", 30.0);
    let mut signal = make_signal("0xa", "m1", Side::Yes);

    let decision = decider.decide(&mut signal, &whale, Decimal::from(1_000), None, &[]);

    assert!(!decision.should_copy);
    assert!(decision.reason.contains("whale score below minimum"));
    assert_eq!(decision.amount, Decimal::ZERO);
}

#[test]
fn test_insufficient_balance_rejected() {
    let mut decider = CopyDecider::new(DeciderConfig::default());
    let whale = make_whale("0xa", 80.0);
    let mut signal = make_signal("0xa", "m1", Side::Yes);

    let decision = decider.decide(&mut signal, &whale, Decimal::new(50, 2), None, &[]);

    assert!(!decision.should_copy);
    assert!(decision.reason.contains("insufficient balance"));
}

#[test]
fn test_cooldown_blocks_immediate_second_copy() {
    let mut decider = CopyDecider::new(DeciderConfig::default());
    let whale = make_whale("0xa", 80.0);
    let balance = Decimal::from(1_000);

    let mut first = make_signal("0xa", "m1", Side::Yes);
    assert!(decider.decide(&mut first, &whale, balance, None, &[]).should_copy);

    let mut second = make_signal("0xb", "m1", Side::Yes);
    let whale_b = make_whale("0xb", 80.0);
    let decision = decider.decide(&mut second, &whale_b, balance, None, &[]);

    assert!(!decision.should_copy);
    assert!(decision.reason.contains("cooldown"));
}

#[test]
fn test_cooldown_expiry_allows_new_copy() {
    // Zero-minute cooldown expires immediately.
    let config = DeciderConfig {
        cooldown_minutes: 0,
        ..DeciderConfig::default()
    };
    let mut decider = CopyDecider::new(config);
    let whale = make_whale("0xa", 80.0);
    let balance = Decimal::from(1_000);

    let mut first = make_signal("0xa", "m1", Side::Yes);
    assert!(decider.decide(&mut first, &whale, balance, None, &[]).should_copy);

    let mut second = make_signal("0xa", "m1", Side::Yes);
    // Position never registered, so only the cooldown gate could block.
    assert!(decider.decide(&mut second, &whale, balance, None, &[]).should_copy);
}

#[test]
fn test_open_position_blocks_copy() {
    let mut decider = CopyDecider::new(DeciderConfig::default());
    decider.register_position("m1", Uuid::new_v4());

    let whale = make_whale("0xa", 80.0);
    let mut signal = make_signal("0xa", "m1", Side::Yes);
    let decision = decider.decide(&mut signal, &whale, Decimal::from(1_000), None, &[]);

    assert!(!decision.should_copy);
    assert!(decision.reason.contains("open position"));
}

#[test]
fn test_closing_position_releases_gate() {
    let mut decider = CopyDecider::new(DeciderConfig {
        cooldown_minutes: 0,
        ..DeciderConfig::default()
    });
    decider.register_position("m1", Uuid::new_v4());
    decider.close_position("m1");

    let whale = make_whale("0xa", 80.0);
    let mut signal = make_signal("0xa", "m1", Side::Yes);
    assert!(decider
        .decide(&mut signal, &whale, Decimal::from(1_000), None, &[])
        .should_copy);
}

#[test]
fn test_consensus_bonus_lifts_borderline_whale() {
    // Score 55 alone sizes at the lowest tier; four agreeing whales add
    // the capped +30 bonus and lift it to the medium tier.
    let mut decider = CopyDecider::new(DeciderConfig::default());
    let whale = make_whale("0xa", 55.0);
    let mut signal = make_signal("0xa", "m1", Side::Yes);

    let others = vec![
        make_signal("0xb", "m1", Side::Yes),
        make_signal("0xc", "m1", Side::Yes),
        make_signal("0xd", "m1", Side::Yes),
        make_signal("0xe", "m1", Side::Yes),
    ];

    let decision = decider.decide(&mut signal, &whale, Decimal::from(1_000), None, &others);

    assert!(decision.should_copy);
    assert_eq!(decision.consensus_count, 5);
    // 55 + min(4·10, 30) = 85
    assert!((decision.confidence - 85.0).abs() < 1e-9);
    // 85 ≥ 70 → half the 50% max → $250
    assert_eq!(decision.amount, Decimal::from(250));
    assert!(decision.reason.contains("5 whales agree"));
}

#[test]
fn test_confidence_caps_at_100() {
    let mut decider = CopyDecider::new(DeciderConfig::default());
    let whale = make_whale("0xa", 95.0);
    let mut signal = make_signal("0xa", "m1", Side::Yes);

    let others = vec![
        make_signal("0xb", "m1", Side::Yes),
        make_signal("0xc", "m1", Side::Yes),
        make_signal("0xd", "m1", Side::Yes),
    ];

    let decision = decider.decide(&mut signal, &whale, Decimal::from(1_000), None, &others);

    assert!(decision.should_copy);
    assert!((decision.confidence - 100.0).abs() < 1e-9);
    // ≥90 with consensus ≥3 → full 50% max
    assert_eq!(decision.amount, Decimal::from(500));
}

#[test]
fn test_opposite_side_signals_do_not_count_as_consensus() {
    let mut decider = CopyDecider::new(DeciderConfig::default());
    let whale = make_whale("0xa", 80.0);
    let mut signal = make_signal("0xa", "m1", Side::Yes);

    let others = vec![
        make_signal("0xb", "m1", Side::No),
        make_signal("0xa", "m1", Side::Yes), // same whale, not consensus
    ];

    let decision = decider.decide(&mut signal, &whale, Decimal::from(1_000), None, &others);

    assert!(decision.should_copy);
    assert_eq!(decision.consensus_count, 1);
}

#[test]
fn test_low_liquidity_caps_score() {
    let mut decider = CopyDecider::new(DeciderConfig::default());
    let whale = make_whale("0xa", 92.0);
    let mut signal = make_signal("0xa", "m1", Side::Yes);
    let market = make_market("m1", 500);

    let decision = decider.decide(
        &mut signal,
        &whale,
        Decimal::from(1_000),
        Some(&market),
        &[],
    );

    assert!(decision.should_copy);
    assert!((decision.confidence - 60.0).abs() < 1e-9);
    // Capped below the medium tier → 20% of the 50% max → $100
    assert_eq!(decision.amount, Decimal::from(100));
}

#[test]
fn test_adjusted_score_threshold_rejects() {
    // Floor lowered so gate 1 passes, but the adjusted score still
    // misses the fixed copy threshold.
    let config = DeciderConfig {
        min_whale_score: 20.0,
        ..DeciderConfig::default()
    };
    let mut decider = CopyDecider::new(config);
    let whale = make_whale("0xa", 40.0);
    let mut signal = make_signal("0xa", "m1", Side::Yes);

    let decision = decider.decide(&mut signal, &whale, Decimal::from(1_000), None, &[]);

    assert!(!decision.should_copy);
    assert!(decision.reason.contains("adjusted score below copy threshold"));
}

#[test]
fn test_decide_stamps_signal_with_whale_identity() {
    let mut decider = CopyDecider::new(DeciderConfig::default());
    let whale = make_whale("0xa", 80.0);
    let mut signal = make_signal("0xa", "m1", Side::Yes);

    decider.decide(&mut signal, &whale, Decimal::from(1_000), None, &[]);

    assert_eq!(signal.whale_score, 80.0);
    assert_eq!(signal.whale_name, whale.name);
}

#[test]
fn test_hydrated_positions_block_reopening() {
    let mut decider = CopyDecider::new(DeciderConfig::default());
    let recovered = vec![make_open_trade("m1"), make_open_trade("m2")];
    decider.hydrate_open_positions(&recovered);

    assert_eq!(decider.open_position_for("m1"), Some(recovered[0].id));

    let whale = make_whale("0xa", 90.0);
    let mut signal = make_signal("0xa", "m1", Side::Yes);
    let decision = decider.decide(&mut signal, &whale, Decimal::from(1_000), None, &[]);

    assert!(!decision.should_copy);
    assert!(decision.reason.contains("open position"));
}

#[test]
fn test_market_consensus_aggregation() {
    let signals = vec![
        make_signal("0xa", "m1", Side::Yes),
        make_signal("0xb", "m1", Side::Yes),
        make_signal("0xc", "m1", Side::No),
        make_signal("0xd", "m2", Side::No),
    ];

    let consensus = CopyDecider::consensus_for_market("m1", &signals);
    assert_eq!(consensus.consensus, ConsensusSide::Yes);
    assert_eq!(consensus.yes_count, 2);
    assert_eq!(consensus.no_count, 1);
    assert!((consensus.strength - 200.0 / 3.0).abs() < 1e-9);

    let empty = CopyDecider::consensus_for_market("m3", &signals);
    assert_eq!(empty.consensus, ConsensusSide::None);
    assert!((empty.strength - 0.0).abs() < 1e-9);
}
