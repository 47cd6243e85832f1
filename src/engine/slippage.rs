use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Base slippage range for simulated fills, as fractions.
const BASE_SLIPPAGE_MIN: f64 = 0.005;
const BASE_SLIPPAGE_MAX: f64 = 0.03;

/// Source of the base slippage rate applied to simulated fills.
///
/// Injected into the paper trader so tests can pin exact rates and
/// assert exact payout arithmetic.
pub trait SlippageSource: Send {
    /// Base slippage as a fraction (0.01 = 1%).
    fn base_rate(&mut self) -> Decimal;
}

/// Production source: uniform draw from [0.5%, 3%].
pub struct UniformSlippage {
    rng: StdRng,
}

impl UniformSlippage {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for UniformSlippage {
    fn default() -> Self {
        Self::new()
    }
}

impl SlippageSource for UniformSlippage {
    fn base_rate(&mut self) -> Decimal {
        let rate = self.rng.gen_range(BASE_SLIPPAGE_MIN..=BASE_SLIPPAGE_MAX);
        Decimal::from_f64(rate).unwrap_or_else(|| Decimal::new(1, 2))
    }
}

/// Deterministic source for tests.
pub struct FixedSlippage(pub Decimal);

impl SlippageSource for FixedSlippage {
    fn base_rate(&mut self) -> Decimal {
        self.0
    }
}
