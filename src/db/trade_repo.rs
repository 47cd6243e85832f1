use anyhow::Context;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Side, Trade, TradeStatus};

/// Row shape as stored; enums live as text in the table.
#[derive(Debug, sqlx::FromRow)]
struct TradeRow {
    id: Uuid,
    is_paper: bool,
    whale_address: String,
    whale_name: Option<String>,
    market_id: String,
    market_question: Option<String>,
    category: Option<String>,
    side: String,
    amount: Decimal,
    entry_price: Decimal,
    exit_price: Option<Decimal>,
    status: String,
    profit: Option<Decimal>,
    profit_percent: Option<Decimal>,
    whale_score_at_entry: f64,
    consensus_count: i32,
    decision_reason: Option<String>,
    opened_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
}

impl TryFrom<TradeRow> for Trade {
    type Error = anyhow::Error;

    fn try_from(row: TradeRow) -> Result<Self, Self::Error> {
        let side = Side::from_api_str(&row.side)
            .with_context(|| format!("trade {}: bad side {:?}", row.id, row.side))?;
        let status = TradeStatus::from_db_str(&row.status)
            .with_context(|| format!("trade {}: bad status {:?}", row.id, row.status))?;

        Ok(Trade {
            id: row.id,
            is_paper: row.is_paper,
            whale_address: row.whale_address,
            whale_name: row.whale_name,
            market_id: row.market_id,
            market_question: row.market_question,
            category: row.category,
            side,
            amount: row.amount,
            entry_price: row.entry_price,
            exit_price: row.exit_price,
            status,
            profit: row.profit,
            profit_percent: row.profit_percent,
            whale_score_at_entry: row.whale_score_at_entry,
            consensus_count: row.consensus_count.max(0) as u32,
            decision_reason: row.decision_reason,
            opened_at: row.opened_at,
            closed_at: row.closed_at,
        })
    }
}

/// Persist a freshly opened trade.
pub async fn insert_trade(pool: &PgPool, trade: &Trade) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO trades (
            id, is_paper, whale_address, whale_name, market_id, market_question,
            category, side, amount, entry_price, status, whale_score_at_entry,
            consensus_count, decision_reason, opened_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(trade.id)
    .bind(trade.is_paper)
    .bind(&trade.whale_address)
    .bind(&trade.whale_name)
    .bind(&trade.market_id)
    .bind(&trade.market_question)
    .bind(&trade.category)
    .bind(trade.side.to_string())
    .bind(trade.amount)
    .bind(trade.entry_price)
    .bind(trade.status.to_string())
    .bind(trade.whale_score_at_entry)
    .bind(trade.consensus_count as i32)
    .bind(&trade.decision_reason)
    .bind(trade.opened_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Write the settlement fields of a closed or cancelled trade.
pub async fn settle_trade(pool: &PgPool, trade: &Trade) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE trades
        SET exit_price = $2,
            status = $3,
            profit = $4,
            profit_percent = $5,
            closed_at = $6
        WHERE id = $1
        "#,
    )
    .bind(trade.id)
    .bind(trade.exit_price)
    .bind(trade.status.to_string())
    .bind(trade.profit)
    .bind(trade.profit_percent)
    .bind(trade.closed_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// All OPEN trades for one mode, oldest first. Used to rebuild state at boot.
pub async fn load_open_trades(pool: &PgPool, is_paper: bool) -> anyhow::Result<Vec<Trade>> {
    let rows: Vec<TradeRow> = sqlx::query_as(
        "SELECT * FROM trades WHERE status = 'OPEN' AND is_paper = $1 ORDER BY opened_at ASC",
    )
    .bind(is_paper)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Trade::try_from).collect()
}

/// The N most recent trades for one mode, newest first.
pub async fn recent_trades(pool: &PgPool, is_paper: bool, limit: i64) -> anyhow::Result<Vec<Trade>> {
    let rows: Vec<TradeRow> = sqlx::query_as(
        "SELECT * FROM trades WHERE is_paper = $1 ORDER BY opened_at DESC LIMIT $2",
    )
    .bind(is_paper)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Trade::try_from).collect()
}

/// Wipe trade history for one mode. Backs the reset endpoint.
pub async fn delete_all(pool: &PgPool, is_paper: bool) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM trades WHERE is_paper = $1")
        .bind(is_paper)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
