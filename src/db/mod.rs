pub mod balance_repo;
pub mod trade_repo;
pub mod whale_repo;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn init_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    // Verify connectivity
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

/// Create the tables on first run. Idempotent.
pub async fn ensure_schema(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS whales (
            address         TEXT PRIMARY KEY,
            name            TEXT,
            rank            INTEGER,
            profit          NUMERIC NOT NULL DEFAULT 0,
            volume          NUMERIC NOT NULL DEFAULT 0,
            win_rate        DOUBLE PRECISION NOT NULL DEFAULT 0,
            roi_30d         DOUBLE PRECISION NOT NULL DEFAULT 0,
            trade_count     INTEGER NOT NULL DEFAULT 0,
            max_drawdown    DOUBLE PRECISION NOT NULL DEFAULT 0,
            consistency     DOUBLE PRECISION NOT NULL DEFAULT 0,
            diversity_score DOUBLE PRECISION NOT NULL DEFAULT 0,
            score           DOUBLE PRECISION NOT NULL DEFAULT 0,
            is_active       BOOLEAN NOT NULL DEFAULT true,
            last_trade_at   TIMESTAMPTZ,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS trades (
            id                   UUID PRIMARY KEY,
            is_paper             BOOLEAN NOT NULL DEFAULT true,
            whale_address        TEXT NOT NULL,
            whale_name           TEXT,
            market_id            TEXT NOT NULL,
            market_question      TEXT,
            category             TEXT,
            side                 TEXT NOT NULL,
            amount               NUMERIC NOT NULL,
            entry_price          NUMERIC NOT NULL,
            exit_price           NUMERIC,
            status               TEXT NOT NULL DEFAULT 'OPEN',
            profit               NUMERIC,
            profit_percent       NUMERIC,
            whale_score_at_entry DOUBLE PRECISION NOT NULL DEFAULT 0,
            consensus_count      INTEGER NOT NULL DEFAULT 1,
            decision_reason      TEXT,
            opened_at            TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            closed_at            TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS balance_history (
            id          BIGSERIAL PRIMARY KEY,
            is_paper    BOOLEAN NOT NULL DEFAULT true,
            sampled_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            balance     NUMERIC NOT NULL,
            pnl         NUMERIC NOT NULL,
            trade_count INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_trades_status ON trades (status)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_trades_market ON trades (market_id)")
        .execute(pool)
        .await?;

    Ok(())
}
