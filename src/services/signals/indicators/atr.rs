//! Average True Range (ATR) indicator.

use crate::services::signals::Indicator;
use crate::types::Candle;

/// True Range of a candle given its predecessor.
pub fn true_range(current: &Candle, previous: &Candle) -> f64 {
    let hl = current.high - current.low;
    let hc = (current.high - previous.close).abs();
    let lc = (current.low - previous.close).abs();
    hl.max(hc).max(lc)
}

/// ATR (Average True Range) indicator.
///
/// Measures market volatility by averaging true ranges:
/// TR = max(High-Low, |High-PrevClose|, |Low-PrevClose|)
///
/// Rolling mean over the last `period` true ranges, each with a prior close.
pub struct Atr {
    period: usize,
}

impl Default for Atr {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Indicator for Atr {
    type Output = f64;

    fn id(&self) -> &'static str {
        "atr"
    }

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, candles: &[Candle]) -> Option<f64> {
        if self.period == 0 || candles.len() < self.min_periods() {
            return None;
        }

        let window = &candles[candles.len() - self.min_periods()..];
        let total: f64 = window
            .windows(2)
            .map(|pair| true_range(&pair[1], &pair[0]))
            .sum();

        Some(total / self.period as f64)
    }
}
