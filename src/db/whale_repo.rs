use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::{HeatLevel, Trader, TraderStats};

#[derive(Debug, sqlx::FromRow)]
struct WhaleRow {
    address: String,
    name: Option<String>,
    rank: Option<i32>,
    profit: Decimal,
    volume: Decimal,
    win_rate: f64,
    roi_30d: f64,
    trade_count: i32,
    max_drawdown: f64,
    consistency: f64,
    diversity_score: f64,
    score: f64,
    is_active: bool,
    last_trade_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WhaleRow> for Trader {
    fn from(row: WhaleRow) -> Self {
        Trader {
            address: row.address,
            name: row.name,
            rank: row.rank.map(|r| r.max(0) as u32),
            profit: row.profit,
            volume: row.volume,
            stats: TraderStats {
                win_rate: row.win_rate,
                roi_30d: row.roi_30d,
                trade_count: row.trade_count.max(0) as u32,
                max_drawdown: row.max_drawdown,
                consistency: row.consistency,
                diversity_score: row.diversity_score,
            },
            score: row.score,
            heat_level: HeatLevel::from_score(row.score),
            is_active: row.is_active,
            last_trade_at: row.last_trade_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insert or refresh a whale by address, stats and score included.
pub async fn upsert_whale(pool: &PgPool, trader: &Trader) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO whales (
            address, name, rank, profit, volume, win_rate, roi_30d, trade_count,
            max_drawdown, consistency, diversity_score, score, is_active, last_trade_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        ON CONFLICT (address) DO UPDATE SET
            name = EXCLUDED.name,
            rank = EXCLUDED.rank,
            profit = EXCLUDED.profit,
            volume = EXCLUDED.volume,
            win_rate = EXCLUDED.win_rate,
            roi_30d = EXCLUDED.roi_30d,
            trade_count = EXCLUDED.trade_count,
            max_drawdown = EXCLUDED.max_drawdown,
            consistency = EXCLUDED.consistency,
            diversity_score = EXCLUDED.diversity_score,
            score = EXCLUDED.score,
            is_active = EXCLUDED.is_active,
            last_trade_at = EXCLUDED.last_trade_at,
            updated_at = NOW()
        "#,
    )
    .bind(&trader.address)
    .bind(&trader.name)
    .bind(trader.rank.map(|r| r as i32))
    .bind(trader.profit)
    .bind(trader.volume)
    .bind(trader.stats.win_rate)
    .bind(trader.stats.roi_30d)
    .bind(trader.stats.trade_count as i32)
    .bind(trader.stats.max_drawdown)
    .bind(trader.stats.consistency)
    .bind(trader.stats.diversity_score)
    .bind(trader.score)
    .bind(trader.is_active)
    .bind(trader.last_trade_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// All active whales, best score first.
pub async fn get_active_whales(pool: &PgPool) -> anyhow::Result<Vec<Trader>> {
    let rows: Vec<WhaleRow> =
        sqlx::query_as("SELECT * FROM whales WHERE is_active = true ORDER BY score DESC")
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(Trader::from).collect())
}

/// Mark whales absent from the latest leaderboard pull as inactive.
pub async fn deactivate_missing(pool: &PgPool, keep_addresses: &[String]) -> anyhow::Result<u64> {
    let result = sqlx::query(
        "UPDATE whales SET is_active = false, updated_at = NOW() WHERE address <> ALL($1)",
    )
    .bind(keep_addresses)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Stamp the most recent trade seen from a whale.
pub async fn touch_last_trade(
    pool: &PgPool,
    address: &str,
    traded_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE whales SET last_trade_at = $2, updated_at = NOW() WHERE address = $1")
        .bind(address)
        .bind(traded_at)
        .execute(pool)
        .await?;

    Ok(())
}
