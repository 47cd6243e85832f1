pub mod decider;
pub mod ranker;
pub mod scorer;

pub use decider::{ConsensusSide, CopyDecider, DeciderConfig, MarketConsensus};
pub use ranker::{LeaderboardEntry, RankingsSummary, TraderRanker};
pub use scorer::{score_stats, score_trader};
