use rust_decimal::Decimal;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    // Admin token for mutating endpoints (optional — disables auth when unset)
    pub api_token: Option<String>,

    // Whale tracking
    pub max_whales: u32,
    pub min_whale_score: f64,
    pub refresh_interval_secs: u64,
    pub signal_lookback_minutes: i64,
    pub resolution_interval_secs: u64,

    // Paper trading
    pub paper_initial_balance: Decimal,
    pub max_trade_percent: Decimal,
    pub cooldown_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT").unwrap_or_else(|_| "8080".into()).parse()?,

            api_token: env::var("API_TOKEN").ok(),

            max_whales: env::var("MAX_WHALES")
                .unwrap_or_else(|_| "20".into())
                .parse()
                .unwrap_or(20),
            min_whale_score: env::var("MIN_WHALE_SCORE")
                .unwrap_or_else(|_| "50".into())
                .parse()
                .unwrap_or(50.0),
            refresh_interval_secs: env::var("REFRESH_INTERVAL_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
            signal_lookback_minutes: env::var("SIGNAL_LOOKBACK_MINUTES")
                .unwrap_or_else(|_| "5".into())
                .parse()
                .unwrap_or(5),
            resolution_interval_secs: env::var("RESOLUTION_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".into())
                .parse()
                .unwrap_or(60),

            paper_initial_balance: env::var("PAPER_INITIAL_BALANCE")
                .unwrap_or_else(|_| "1000".into())
                .parse()
                .unwrap_or(Decimal::from(1_000)),
            // Stored as a fraction; the env var is a percentage.
            max_trade_percent: env::var("MAX_TRADE_PERCENT")
                .unwrap_or_else(|_| "50".into())
                .parse()
                .map(|p: Decimal| p / Decimal::ONE_HUNDRED)
                .unwrap_or(Decimal::new(50, 2)),
            cooldown_minutes: env::var("COOLDOWN_MINUTES")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),
        })
    }
}
