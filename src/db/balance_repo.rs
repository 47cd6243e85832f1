use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::BalanceSample;

#[derive(Debug, sqlx::FromRow)]
struct BalanceRow {
    sampled_at: DateTime<Utc>,
    balance: Decimal,
    pnl: Decimal,
    trade_count: i32,
}

impl From<BalanceRow> for BalanceSample {
    fn from(row: BalanceRow) -> Self {
        BalanceSample {
            timestamp: row.sampled_at,
            balance: row.balance,
            pnl: row.pnl,
            trade_count: row.trade_count.max(0) as u32,
        }
    }
}

/// Append one balance point.
pub async fn insert_sample(
    pool: &PgPool,
    is_paper: bool,
    sample: &BalanceSample,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO balance_history (is_paper, sampled_at, balance, pnl, trade_count)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(is_paper)
    .bind(sample.timestamp)
    .bind(sample.balance)
    .bind(sample.pnl)
    .bind(sample.trade_count as i32)
    .execute(pool)
    .await?;

    Ok(())
}

/// Latest recorded balance for one mode, if any history exists.
pub async fn load_last_balance(pool: &PgPool, is_paper: bool) -> anyhow::Result<Option<Decimal>> {
    let row: Option<(Decimal,)> = sqlx::query_as(
        "SELECT balance FROM balance_history WHERE is_paper = $1 ORDER BY sampled_at DESC LIMIT 1",
    )
    .bind(is_paper)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(balance,)| balance))
}

/// The N most recent samples, oldest first for charting.
pub async fn recent_samples(
    pool: &PgPool,
    is_paper: bool,
    limit: i64,
) -> anyhow::Result<Vec<BalanceSample>> {
    let rows: Vec<BalanceRow> = sqlx::query_as(
        r#"
        SELECT sampled_at, balance, pnl, trade_count
        FROM (
            SELECT sampled_at, balance, pnl, trade_count
            FROM balance_history
            WHERE is_paper = $1
            ORDER BY sampled_at DESC
            LIMIT $2
        ) recent
        ORDER BY sampled_at ASC
        "#,
    )
    .bind(is_paper)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(BalanceSample::from).collect())
}

/// Wipe balance history for one mode. Backs the reset endpoint.
pub async fn delete_all(pool: &PgPool, is_paper: bool) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM balance_history WHERE is_paper = $1")
        .bind(is_paper)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
