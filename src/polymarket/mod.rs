pub mod data_client;
pub mod types;

pub use data_client::{DataClient, DataClientError};
pub use types::{ApiLeaderboardRow, ApiMarket, ApiUserTrade, FeedBatch, FeedParseError};
