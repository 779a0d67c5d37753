//! Stochastic Oscillator indicator.

use crate::services::signals::{mean, Indicator};
use crate::types::Candle;

/// Latest %K and %D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticOutput {
    pub k: f64,
    pub d: f64,
}

/// Stochastic Oscillator indicator.
///
/// Compares the close to its range over a period:
/// - %K = (Close - Lowest) / (Highest - Lowest) * 100
/// - %D = SMA(3) of %K
///
/// The range is taken over closes, not highs and lows. A flat window
/// gives %K = 50.
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

impl Stochastic {
    fn percent_k(window: &[Candle]) -> Option<f64> {
        let close = window.last()?.close;
        let highest = window.iter().map(|c| c.close).fold(f64::MIN, f64::max);
        let lowest = window.iter().map(|c| c.close).fold(f64::MAX, f64::min);

        let range = highest - lowest;
        if range == 0.0 {
            return Some(50.0);
        }

        Some((close - lowest) / range * 100.0)
    }
}

impl Indicator for Stochastic {
    type Output = StochasticOutput;

    fn id(&self) -> &'static str {
        "stochastic"
    }

    fn min_periods(&self) -> usize {
        self.k_period + self.d_period
    }

    fn calculate(&self, candles: &[Candle]) -> Option<StochasticOutput> {
        if self.k_period == 0 || self.d_period == 0 || candles.len() < self.min_periods() {
            return None;
        }

        let k_values = candles
            .windows(self.k_period)
            .rev()
            .take(self.d_period)
            .map(Self::percent_k)
            .collect::<Option<Vec<f64>>>()?;

        Some(StochasticOutput {
            k: *k_values.first()?,
            d: mean(&k_values),
        })
    }
}
