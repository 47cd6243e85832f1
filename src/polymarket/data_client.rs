use chrono::{DateTime, Utc};
use reqwest::Client;
use thiserror::Error;

use super::types::{
    parse_leaderboard_row, parse_trade_row, ApiLeaderboardRow, ApiMarket, ApiUserTrade, FeedBatch,
};
use crate::models::{Market, Trader, TradeSignal};

const DATA_API_BASE: &str = "https://data-api.polymarket.com";
const GAMMA_API_BASE: &str = "https://gamma-api.polymarket.com";

/// Trades pulled per wallet when scanning for fresh signals.
const TRADES_PER_WALLET: u32 = 10;

#[derive(Debug, Error)]
pub enum DataClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone)]
pub struct DataClient {
    http: Client,
    data_base: String,
    gamma_base: String,
}

impl DataClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            data_base: DATA_API_BASE.into(),
            gamma_base: GAMMA_API_BASE.into(),
        }
    }

    /// Point the client at alternate hosts (tests, mirrors).
    pub fn with_bases(
        http: Client,
        data_base: impl Into<String>,
        gamma_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            data_base: data_base.into(),
            gamma_base: gamma_base.into(),
        }
    }

    // -----------------------------------------------------------------------
    // Raw endpoints
    // -----------------------------------------------------------------------

    /// Fetch the all-time profit leaderboard.
    pub async fn get_leaderboard(
        &self,
        limit: u32,
    ) -> Result<Vec<ApiLeaderboardRow>, DataClientError> {
        let url = format!("{}/v1/leaderboard", self.data_base);
        let resp = self
            .http
            .get(&url)
            .query(&[("window", "all".to_string()), ("limit", limit.to_string())])
            .send()
            .await?
            .error_for_status()?;

        let rows: Vec<ApiLeaderboardRow> = resp.json().await?;
        Ok(rows)
    }

    /// Fetch recent trades for a specific wallet address.
    pub async fn get_user_trades(
        &self,
        address: &str,
        limit: u32,
    ) -> Result<Vec<ApiUserTrade>, DataClientError> {
        let url = format!("{}/v1/trades", self.data_base);
        let resp = self
            .http
            .get(&url)
            .query(&[("maker", address.to_string()), ("limit", limit.to_string())])
            .send()
            .await?
            .error_for_status()?;

        let trades: Vec<ApiUserTrade> = resp.json().await?;
        Ok(trades)
    }

    /// Fetch a single market by condition ID.
    pub async fn get_market(&self, condition_id: &str) -> Result<ApiMarket, DataClientError> {
        let url = format!("{}/markets/{}", self.gamma_base, condition_id);
        let resp = self.http.get(&url).send().await?.error_for_status()?;

        let market: ApiMarket = resp.json().await?;
        Ok(market)
    }

    // -----------------------------------------------------------------------
    // High-level feeds
    // -----------------------------------------------------------------------

    /// Leaderboard as unscored traders. Rows that fail validation are
    /// collected in the batch instead of failing the call.
    pub async fn list_leaderboard(&self, limit: u32) -> Result<FeedBatch<Trader>, DataClientError> {
        let rows = self.get_leaderboard(limit).await?;

        let mut batch = FeedBatch::new();
        for (index, row) in rows.iter().enumerate() {
            batch.push(parse_leaderboard_row(index, row));
        }

        if batch.skipped_count() > 0 {
            tracing::warn!(
                skipped = batch.skipped_count(),
                total = rows.len(),
                "dropped malformed leaderboard rows"
            );
        }
        Ok(batch)
    }

    /// Scan the given wallets for trades placed after `since`.
    ///
    /// A wallet whose fetch fails is logged and skipped so one flaky
    /// address does not blank out the whole scan.
    pub async fn detect_recent_trades(
        &self,
        addresses: &[String],
        since: DateTime<Utc>,
    ) -> FeedBatch<TradeSignal> {
        let mut batch = FeedBatch::new();

        for address in addresses {
            let rows = match self.get_user_trades(address, TRADES_PER_WALLET).await {
                Ok(rows) => rows,
                Err(err) => {
                    tracing::warn!(wallet = %address, error = %err, "trade fetch failed");
                    continue;
                }
            };

            for row in &rows {
                match parse_trade_row(address, row) {
                    Ok(signal) if signal.detected_at >= since => batch.push(Ok(signal)),
                    Ok(_) => {} // stale, outside the scan window
                    Err(err) => batch.push(Err(err)),
                }
            }
        }

        if batch.skipped_count() > 0 {
            tracing::warn!(
                skipped = batch.skipped_count(),
                "dropped malformed trade rows"
            );
        }
        batch
    }

    /// Market snapshot in core terms.
    pub async fn fetch_market(&self, condition_id: &str) -> Result<Market, DataClientError> {
        let api = self.get_market(condition_id).await?;
        if api.condition_id.is_empty() {
            return Err(DataClientError::Unexpected(
                "market response missing condition_id".into(),
            ));
        }
        Ok(api.into())
    }
}
