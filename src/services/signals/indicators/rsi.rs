//! Relative Strength Index (RSI) indicator.

use crate::services::signals::Indicator;
use crate::types::Candle;

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the magnitude of recent gains to recent losses.
/// Values range from 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
///
/// Averages are plain means over the last `period` close-to-close deltas.
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn id(&self) -> &'static str {
        "rsi"
    }

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, candles: &[Candle]) -> Option<f64> {
        if self.period == 0 || candles.len() < self.min_periods() {
            return None;
        }

        let window = &candles[candles.len() - self.min_periods()..];
        let mut gains = 0.0;
        let mut losses = 0.0;

        for pair in window.windows(2) {
            let change = pair[1].close - pair[0].close;
            if change > 0.0 {
                gains += change;
            } else {
                losses -= change;
            }
        }

        let avg_gain = gains / self.period as f64;
        let avg_loss = losses / self.period as f64;

        if avg_loss == 0.0 {
            return Some(100.0);
        }

        let rs = avg_gain / avg_loss;
        Some(100.0 - (100.0 / (1.0 + rs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::test_support::{
        create_downtrend_candles, create_flat_candles, create_uptrend_candles, from_closes,
    };

    #[test]
    fn test_rsi_min_periods() {
        assert_eq!(Rsi::default().min_periods(), 15);
        assert_eq!(Rsi::new(7).min_periods(), 8);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let candles = create_uptrend_candles(14);
        assert!(Rsi::default().calculate(&candles).is_none());
    }

    #[test]
    fn test_rsi_exact_minimum_is_available() {
        let candles = create_uptrend_candles(15);
        assert!(Rsi::default().calculate(&candles).is_some());
    }

    #[test]
    fn test_rsi_flat_series_is_100() {
        let candles = create_flat_candles(30, 100.0, 10.0);
        assert_eq!(Rsi::default().calculate(&candles), Some(100.0));
    }

    #[test]
    fn test_rsi_downtrend_is_zero() {
        let candles = create_downtrend_candles(30);
        assert_eq!(Rsi::default().calculate(&candles), Some(0.0));
    }

    #[test]
    fn test_rsi_balanced_moves_is_50() {
        let closes: Vec<f64> = (0..15)
            .map(|i| if i % 2 == 0 { 100.0 } else { 102.0 })
            .collect();
        let candles = from_closes(&closes);
        let rsi = Rsi::default().calculate(&candles).unwrap();
        assert!((rsi - 50.0).abs() < 1e-9, "got {}", rsi);
    }

    #[test]
    fn test_rsi_only_reads_last_window() {
        // A crash far in the past must not affect the value.
        let mut closes = vec![1000.0, 1.0];
        closes.extend((0..15).map(|i| 100.0 + i as f64));
        let candles = from_closes(&closes);
        assert_eq!(Rsi::default().calculate(&candles), Some(100.0));
    }
}
