pub mod paper_trader;
pub mod sizer;
pub mod slippage;

pub use paper_trader::{PaperTrader, TradingSummary};
pub use slippage::{FixedSlippage, SlippageSource, UniformSlippage};
