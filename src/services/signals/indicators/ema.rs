//! Exponential Moving Average (EMA) indicator.

use crate::services::signals::{closes, Indicator};
use crate::types::Candle;

/// EMA of `values` at every point, seeded with the first value.
///
/// `alpha = 2 / (period + 1)`, updated as `ema += alpha * (x - ema)` so a
/// constant input stays exactly constant. MACD and the EMA cross use this
/// same recursion.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());

    let mut iter = values.iter();
    if let Some(&first) = iter.next() {
        let mut ema = first;
        result.push(ema);
        for &value in iter {
            ema += (value - ema) * multiplier;
            result.push(ema);
        }
    }

    result
}

/// EMA (Exponential Moving Average) indicator.
///
/// Like SMA but gives more weight to recent prices.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn id(&self) -> &'static str {
        match self.period {
            9 => "ema9",
            12 => "ema12",
            21 => "ema21",
            26 => "ema26",
            _ => "ema",
        }
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, candles: &[Candle]) -> Option<f64> {
        if self.period == 0 || candles.len() < self.period {
            return None;
        }

        ema_series(&closes(candles), self.period).last().copied()
    }
}
