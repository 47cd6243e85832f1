use metrics::{counter, gauge};
use rust_decimal::prelude::ToPrimitive;
use tokio::time::{interval, Duration};
use uuid::Uuid;

use crate::api::ws_types::WsMessage;
use crate::db::{balance_repo, trade_repo};
use crate::AppState;

/// Periodically poll the markets behind open positions and settle the
/// ones that resolved.
pub async fn run_resolution_poller(state: AppState) {
    let mut ticker = interval(Duration::from_secs(state.config.resolution_interval_secs));

    loop {
        ticker.tick().await;

        let open: Vec<(Uuid, String)> = {
            let trader = state.paper_trader.lock().await;
            trader
                .open_positions()
                .iter()
                .map(|t| (t.id, t.market_id.clone()))
                .collect()
        };

        if open.is_empty() {
            tracing::debug!("No open positions to check for resolution");
            continue;
        }

        for (trade_id, market_id) in open {
            let market = match state.data_client.fetch_market(&market_id).await {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(market = %market_id, error = %e, "Market fetch failed; will retry");
                    continue;
                }
            };

            if !market.is_resolved {
                continue;
            }
            let Some(outcome) = market.outcome else {
                // Closed but no winner declared yet.
                continue;
            };

            let closed = {
                let mut trader = state.paper_trader.lock().await;
                trader.close(trade_id, market.yes_price, Some(outcome))
            };
            let Some(trade) = closed else { continue };

            {
                let mut decider = state.decider.lock().await;
                decider.close_position(&market_id);
            }
            counter!("trades_closed_total").increment(1);

            tracing::info!(
                trade_id = %trade.id,
                market = %market_id,
                outcome = %outcome,
                profit = %trade.profit.unwrap_or_default(),
                "Position settled on market resolution"
            );

            if let Err(e) = trade_repo::settle_trade(&state.db, &trade).await {
                tracing::error!(trade_id = %trade.id, error = %e, "Trade settle write failed");
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

            let _ = state.ws_tx.send(WsMessage::TradeClosed(trade));
        }

        let trader = state.paper_trader.lock().await;
        gauge!("open_positions").set(trader.open_positions().len() as f64);
        gauge!("paper_balance").set(trader.balance().to_f64().unwrap_or(0.0));
    }
}
