use std::sync::atomic::Ordering;

use chrono::{Duration as ChronoDuration, Utc};
use metrics::{counter, gauge};
use rust_decimal::prelude::ToPrimitive;
use tokio::time::{interval, Duration};

use crate::api::ws_types::{ScanInfo, WsMessage};
use crate::db::{balance_repo, trade_repo, whale_repo};
use crate::AppState;

/// How often the tracked whale set is re-pulled from the leaderboard.
const WHALE_REFRESH_SECS: u64 = 3600;

/// Rebuild in-memory state from the database after a restart.
///
/// Open trades go back into the paper trader and the decider's position
/// registry, so a restarted process cannot double-open a market it
/// already holds.
pub async fn hydrate_state(state: &AppState) -> anyhow::Result<()> {
    let last_balance = balance_repo::load_last_balance(&state.db, true).await?;
    let open_trades = trade_repo::load_open_trades(&state.db, true).await?;

    {
        let mut decider = state.decider.lock().await;
        decider.hydrate_open_positions(&open_trades);
    }
    {
        let mut trader = state.paper_trader.lock().await;
        trader.restore(last_balance, open_trades);
    }

    let whales = whale_repo::get_active_whales(&state.db).await?;
    if !whales.is_empty() {
        let mut ranker = state.ranker.lock().await;
        ranker.add_all(whales);
        tracing::info!(count = ranker.len(), "Restored tracked whales from database");
    }

    Ok(())
}

/// Pull the leaderboard, score the rows, and swap them into the ranker.
/// Returns the number of whales now tracked.
pub async fn refresh_whales(state: &AppState) -> anyhow::Result<usize> {
    let batch = state
        .data_client
        .list_leaderboard(state.config.max_whales)
        .await?;
    counter!("feed_rows_skipped_total").increment(batch.skipped_count() as u64);

    let addresses: Vec<String> = batch.records.iter().map(|t| t.address.clone()).collect();

    let count = {
        let mut ranker = state.ranker.lock().await;
        ranker.add_all(batch.records);
        ranker.rescan_scores();
        ranker.len()
    };
    gauge!("tracked_whales").set(count as f64);

    // Persist the refreshed set; a failed write never blocks tracking.
    {
        let ranker = state.ranker.lock().await;
        for trader in ranker.top(count) {
            if let Err(e) = whale_repo::upsert_whale(&state.db, trader).await {
                tracing::error!(wallet = %trader.address, error = %e, "Whale upsert failed");
            }
        }
    }
    if !addresses.is_empty() {
        if let Err(e) = whale_repo::deactivate_missing(&state.db, &addresses).await {
            tracing::error!(error = %e, "Failed to deactivate dropped whales");
        }
    }

    tracing::info!(count, "Whale leaderboard refreshed");
    Ok(count)
}

/// Periodic leaderboard refresh, hourly.
pub async fn run_whale_refresher(state: AppState) {
    let mut ticker = interval(Duration::from_secs(WHALE_REFRESH_SECS));

    loop {
        ticker.tick().await;
        if let Err(e) = refresh_whales(&state).await {
            tracing::error!(error = %e, "Whale refresh failed");
        }
    }
}

/// Main scan loop: poll tracked whales for fresh trades, run each signal
/// through the decision chain, and execute accepted copies.
pub async fn run_whale_monitor(state: AppState) {
    let mut ticker = interval(Duration::from_secs(state.config.refresh_interval_secs));
    let lookback = ChronoDuration::minutes(state.config.signal_lookback_minutes);

    loop {
        ticker.tick().await;

        if state.pause_flag.load(Ordering::Relaxed) {
            continue;
        }

        // Scan every tracked whale above the score floor.
        let addresses: Vec<String> = {
            let ranker = state.ranker.lock().await;
            ranker
                .top(state.config.max_whales as usize)
                .into_iter()
                .filter(|t| t.score >= state.config.min_whale_score)
                .map(|t| t.address.clone())
                .collect()
        };

        if addresses.is_empty() {
            tracing::debug!("No whales above score floor to scan");
            continue;
        }

        let since = Utc::now() - lookback;
        let batch = state.data_client.detect_recent_trades(&addresses, since).await;
        counter!("feed_rows_skipped_total").increment(batch.skipped_count() as u64);
        counter!("signals_detected_total").increment(batch.records.len() as u64);

        let _ = state.ws_tx.send(WsMessage::Scanning(ScanInfo {
            whales_scanned: addresses.len(),
            signals_found: batch.records.len(),
            timestamp: Utc::now(),
        }));

        if batch.records.is_empty() {
            continue;
        }

        let signals = batch.records;
        for mut signal in signals.clone() {
            if let Err(e) = process_signal(&state, &mut signal, &signals).await {
                tracing::error!(
                    wallet = %signal.whale_address,
                    market = %signal.market_id,
                    error = %e,
                    "Signal processing failed"
                );
            }
        }

        update_gauges(&state).await;

        let summary = state.paper_trader.lock().await.summary();
        let _ = state.ws_tx.send(WsMessage::StatusUpdate(summary));
    }
}

/// Decide and, when accepted, execute one signal. The full signal batch
/// feeds the consensus count.
async fn process_signal(
    state: &AppState,
    signal: &mut crate::models::TradeSignal,
    all_signals: &[crate::models::TradeSignal],
) -> anyhow::Result<()> {
    let Some(whale) = ({
        let ranker = state.ranker.lock().await;
        ranker.get(&signal.whale_address).cloned()
    }) else {
        tracing::debug!(wallet = %signal.whale_address, "Signal from untracked whale dropped");
        return Ok(());
    };

    // Market context is best-effort; the decider treats a miss as unknown.
    let market = state.data_client.fetch_market(&signal.market_id).await.ok();

    let decision = {
        let balance = state.paper_trader.lock().await.balance();
        let mut decider = state.decider.lock().await;
        decider.decide(signal, &whale, balance, market.as_ref(), all_signals)
    };

    if !decision.should_copy {
        counter!("signals_rejected_total").increment(1);
        tracing::debug!(
            wallet = %signal.whale_address,
            market = %signal.market_id,
            reason = %decision.reason,
            "Signal rejected"
        );
        return Ok(());
    }

    let trade = {
        let mut trader = state.paper_trader.lock().await;
        trader.execute(signal, &decision)
    };
    let Some(trade) = trade else {
        // Missed fill or overdraft; nothing was debited and no position
        // registered. The cooldown recorded at decide stands.
        return Ok(());
    };

    {
        let mut decider = state.decider.lock().await;
        decider.register_position(&trade.market_id, trade.id);
    }
    counter!("trades_opened_total").increment(1);

    // Persistence is log-and-swallow; the in-memory trade is authoritative.
    if let Err(e) = trade_repo::insert_trade(&state.db, &trade).await {
        tracing::error!(trade_id = %trade.id, error = %e, "Trade insert failed");
    }
    let sample = {
        let trader = state.paper_trader.lock().await;
        trader.balance_history().last().cloned()
    };
    if let Some(sample) = sample {
        if let Err(e) = balance_repo::insert_sample(&state.db, true, &sample).await {
            tracing::error!(error = %e, "Balance sample insert failed");
        }
    }
    if let Err(e) =
        whale_repo::touch_last_trade(&state.db, &signal.whale_address, signal.detected_at).await
    {
        tracing::error!(wallet = %signal.whale_address, error = %e, "last_trade_at update failed");
    }

    let _ = state.ws_tx.send(WsMessage::TradeOpened(trade));

    Ok(())
}

async fn update_gauges(state: &AppState) {
    let trader = state.paper_trader.lock().await;
    gauge!("open_positions").set(trader.open_positions().len() as f64);
    gauge!("paper_balance").set(trader.balance().to_f64().unwrap_or(0.0));
}
