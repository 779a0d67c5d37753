//! Simple Moving Average (SMA) indicator.

use crate::services::signals::Indicator;
use crate::types::Candle;

/// SMA (Simple Moving Average) indicator.
///
/// Mean of the last `period` closes.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn id(&self) -> &'static str {
        match self.period {
            20 => "sma20",
            50 => "sma50",
            200 => "sma200",
            _ => "sma",
        }
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, candles: &[Candle]) -> Option<f64> {
        if self.period == 0 || candles.len() < self.period {
            return None;
        }

        let sma = candles
            .iter()
            .rev()
            .take(self.period)
            .map(|c| c.close)
            .sum::<f64>()
            / self.period as f64;

        Some(sma)
    }
}
