use rust_decimal::Decimal;

use copybot::brain::{ConsensusSide, CopyDecider, DeciderConfig};
use copybot::engine::{FixedSlippage, PaperTrader};
use copybot::models::{Side, TradeSignal, TradeStatus, Trader};

fn make_whale(address: &str, score: f64) -> Trader {
    let mut whale = Trader::new(address);
    whale.name = Some(format!("whale-{address}"));
    whale.apply_score(score);
    whale
}

fn make_signal(address: &str, market: &str, side: Side, price: Decimal) -> TradeSignal {
    TradeSignal::new(address, market, side, Decimal::from(25_000), price)
}

/// Paper trader with zero base slippage so only the deterministic size
/// impact moves the fill price.
fn paper_trader(balance: i64) -> PaperTrader {
    PaperTrader::with_slippage(
        Decimal::from(balance),
        Box::new(FixedSlippage(Decimal::ZERO)),
    )
}

#[test]
fn test_full_copy_flow_yes_win() {
    let mut decider = CopyDecider::new(DeciderConfig::default());
    let mut trader = paper_trader(1_000);
    let whale = make_whale("0xa", 95.0);

    let price = Decimal::new(60, 2);
    let mut signal = make_signal("0xa", "m1", Side::Yes, price);
    let others = vec![
        make_signal("0xb", "m1", Side::Yes, price),
        make_signal("0xc", "m1", Side::Yes, price),
    ];

    let decision = decider.decide(&mut signal, &whale, trader.balance(), None, &others);
    assert!(decision.should_copy);
    // score 95 + 20 bonus caps at 100, consensus 3 → full 50% of $1000
    assert_eq!(decision.amount, Decimal::from(500));

    let trade = trader.execute(&signal, &decision).expect("fill");
    decider.register_position(&trade.market_id, trade.id);

    // $500 stake → 2pp size impact; YES entry 0.60 × 1.02 = 0.612
    assert_eq!(trade.entry_price, Decimal::new(612, 3));
    assert_eq!(trader.balance(), Decimal::from(500));
    assert_eq!(trade.consensus_count, 3);

    // Market resolves YES.
    let closed = trader
        .close(trade.id, Decimal::ONE, Some(Side::Yes))
        .expect("close");
    decider.close_position(&closed.market_id);

    let expected_profit =
        Decimal::from(500) * (Decimal::ONE / Decimal::new(612, 3) - Decimal::ONE);
    assert_eq!(closed.profit, Some(expected_profit));
    assert_eq!(closed.status, TradeStatus::Closed);
    assert_eq!(
        trader.balance(),
        Decimal::from(500) + Decimal::from(500) + expected_profit
    );
    assert_eq!(trader.stats().wins, 1);
    assert_eq!(trader.stats().losses, 0);

    // Gate released; the market can be decided on again after cooldown.
    assert_eq!(decider.open_position_for("m1"), None);
}

#[test]
fn test_full_copy_flow_no_side_loss() {
    let mut decider = CopyDecider::new(DeciderConfig::default());
    let mut trader = paper_trader(1_000);
    let whale = make_whale("0xa", 75.0);

    let mut signal = make_signal("0xa", "m1", Side::No, Decimal::new(40, 2));
    let decision = decider.decide(&mut signal, &whale, trader.balance(), None, &[]);
    assert!(decision.should_copy);
    // 75 → medium tier → half of the 50% max → $250
    assert_eq!(decision.amount, Decimal::from(250));

    let trade = trader.execute(&signal, &decision).expect("fill");
    // NO fills below the detected price: 0.40 × (1 − 0.02) = 0.392
    assert_eq!(trade.entry_price, Decimal::new(392, 3));

    // Market resolves YES — the NO position forfeits the full stake.
    let closed = trader
        .close(trade.id, Decimal::ONE, Some(Side::Yes))
        .expect("close");

    assert_eq!(closed.profit, Some(Decimal::from(-250)));
    assert_eq!(trader.balance(), Decimal::from(750));
    assert_eq!(trader.stats().losses, 1);
    assert!(trader.balance() >= Decimal::ZERO);
}

#[test]
fn test_cooldown_spans_markets_independently() {
    let mut decider = CopyDecider::new(DeciderConfig::default());
    let mut trader = paper_trader(1_000);
    let whale = make_whale("0xa", 80.0);

    let mut first = make_signal("0xa", "m1", Side::Yes, Decimal::new(50, 2));
    let decision = decider.decide(&mut first, &whale, trader.balance(), None, &[]);
    assert!(decision.should_copy);
    let trade = trader.execute(&first, &decision).expect("fill");
    decider.register_position(&trade.market_id, trade.id);

    // Same market is gated.
    let mut same = make_signal("0xb", "m1", Side::Yes, Decimal::new(50, 2));
    let whale_b = make_whale("0xb", 80.0);
    assert!(!decider
        .decide(&mut same, &whale_b, trader.balance(), None, &[])
        .should_copy);

    // A different market is not.
    let mut other = make_signal("0xb", "m2", Side::Yes, Decimal::new(50, 2));
    assert!(decider
        .decide(&mut other, &whale_b, trader.balance(), None, &[])
        .should_copy);
}

#[test]
fn test_restart_recovers_balance_and_blocks_reopen() {
    // First life: open a position.
    let mut decider = CopyDecider::new(DeciderConfig::default());
    let mut trader = paper_trader(1_000);
    let whale = make_whale("0xa", 90.0);

    let mut signal = make_signal("0xa", "m1", Side::Yes, Decimal::new(50, 2));
    let decision = decider.decide(&mut signal, &whale, trader.balance(), None, &[]);
    let trade = trader.execute(&signal, &decision).expect("fill");
    let balance_before_restart = trader.balance();
    let open: Vec<_> = trader.open_positions().into_iter().cloned().collect();

    // Second life: hydrate from what the first process persisted.
    let mut decider2 = CopyDecider::new(DeciderConfig::default());
    let mut trader2 = paper_trader(1_000);
    trader2.restore(Some(balance_before_restart), open.clone());
    decider2.hydrate_open_positions(&open);

    assert_eq!(trader2.balance(), balance_before_restart);
    assert_eq!(trader2.open_positions().len(), 1);
    assert_eq!(decider2.open_position_for("m1"), Some(trade.id));

    // The recovered position still gates new copies on its market.
    let mut again = make_signal("0xa", "m1", Side::Yes, Decimal::new(50, 2));
    let decision = decider2.decide(&mut again, &whale, trader2.balance(), None, &[]);
    assert!(!decision.should_copy);

    // And it can still be settled normally.
    let closed = trader2
        .close(trade.id, Decimal::ONE, Some(Side::Yes))
        .expect("close");
    assert!(closed.profit.unwrap() > Decimal::ZERO);
}

#[test]
fn test_non_binary_close_settles_against_payout_thresholds() {
    let mut decider = CopyDecider::new(DeciderConfig {
        cooldown_minutes: 0,
        ..DeciderConfig::default()
    });
    let mut trader = paper_trader(1_000);
    let whale = make_whale("0xa", 80.0);

    // First position closed at a price past the YES threshold wins.
    let mut signal = make_signal("0xa", "m1", Side::Yes, Decimal::new(50, 2));
    let decision = decider.decide(&mut signal, &whale, trader.balance(), None, &[]);
    let trade = trader.execute(&signal, &decision).expect("fill");

    let closed = trader
        .close(trade.id, Decimal::new(995, 3), None)
        .expect("close");
    let expected = trade.amount * (Decimal::ONE / trade.entry_price - Decimal::ONE);
    assert_eq!(closed.profit, Some(expected));

    // Second position closed mid-range (no resolution) forfeits the stake.
    let mut signal = make_signal("0xa", "m2", Side::Yes, Decimal::new(50, 2));
    let decision = decider.decide(&mut signal, &whale, trader.balance(), None, &[]);
    let trade = trader.execute(&signal, &decision).expect("fill");

    let closed = trader
        .close(trade.id, Decimal::new(75, 2), None)
        .expect("close");
    assert_eq!(closed.profit, Some(-trade.amount));
}

#[test]
fn test_missed_fill_leaves_cooldown_without_position() {
    let mut decider = CopyDecider::new(DeciderConfig::default());
    // 15% base slippage pushes every fill past the 10% deviation limit.
    let mut trader = PaperTrader::with_slippage(
        Decimal::from(1_000),
        Box::new(FixedSlippage(Decimal::new(15, 2))),
    );
    let whale = make_whale("0xa", 80.0);

    let mut signal = make_signal("0xa", "m1", Side::Yes, Decimal::new(50, 2));
    let decision = decider.decide(&mut signal, &whale, trader.balance(), None, &[]);
    assert!(decision.should_copy);

    // The fill is missed: nothing debited, no position registered.
    assert!(trader.execute(&signal, &decision).is_none());
    assert_eq!(trader.balance(), Decimal::from(1_000));
    assert_eq!(trader.stats().total_trades, 0);
    assert_eq!(decider.open_position_for("m1"), None);

    // The cooldown recorded at decide still blocks an immediate retry.
    let mut retry = make_signal("0xa", "m1", Side::Yes, Decimal::new(50, 2));
    let decision = decider.decide(&mut retry, &whale, trader.balance(), None, &[]);
    assert!(!decision.should_copy);
}

#[test]
fn test_opposing_whales_produce_mixed_consensus() {
    let price = Decimal::new(50, 2);
    let signals = vec![
        make_signal("0xa", "m1", Side::Yes, price),
        make_signal("0xb", "m1", Side::No, price),
    ];

    let consensus = CopyDecider::consensus_for_market("m1", &signals);
    assert_eq!(consensus.consensus, ConsensusSide::Mixed);
    assert!((consensus.strength - 50.0).abs() < 1e-9);
    assert_eq!(consensus.yes_count, 1);
    assert_eq!(consensus.no_count, 1);
}

#[test]
fn test_rejected_signal_leaves_book_untouched() {
    let mut decider = CopyDecider::new(DeciderConfig::default());
    let mut trader = paper_trader(1_000);
    let whale = make_whale("0xa", 30.0);

    let mut signal = make_signal("0xa", "m1", Side::Yes, Decimal::new(50, 2));
    let decision = decider.decide(&mut signal, &whale, trader.balance(), None, &[]);
    assert!(!decision.should_copy);

    // Executing a rejection is a no-op.
    assert!(trader.execute(&signal, &decision).is_none());
    assert_eq!(trader.balance(), Decimal::from(1_000));
    assert_eq!(trader.stats().total_trades, 0);
}
