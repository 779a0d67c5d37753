//! MACD (Moving Average Convergence Divergence) indicator.

use crate::services::signals::indicators::ema_series;
use crate::services::signals::{closes, Indicator};
use crate::types::Candle;

/// Latest MACD values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
/// - Histogram = MACD Line - Signal Line
///
/// All three EMAs run over the whole series from its first value.
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Indicator for Macd {
    type Output = MacdOutput;

    fn id(&self) -> &'static str {
        "macd"
    }

    fn min_periods(&self) -> usize {
        self.slow_period + self.signal_period
    }

    fn calculate(&self, candles: &[Candle]) -> Option<MacdOutput> {
        if candles.len() < self.min_periods() {
            return None;
        }

        let closes = closes(candles);
        let fast_ema = ema_series(&closes, self.fast_period);
        let slow_ema = ema_series(&closes, self.slow_period);

        let macd_line: Vec<f64> = fast_ema
            .iter()
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect();
        let signal_line = ema_series(&macd_line, self.signal_period);

        let macd = *macd_line.last()?;
        let signal = *signal_line.last()?;

        Some(MacdOutput {
            macd,
            signal,
            histogram: macd - signal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::test_support::{
        create_downtrend_candles, create_flat_candles, create_uptrend_candles, from_closes,
    };

    #[test]
    fn test_macd_min_periods() {
        assert_eq!(Macd::default().min_periods(), 35);
    }

    #[test]
    fn test_macd_insufficient_data() {
        let candles = create_uptrend_candles(34);
        assert!(Macd::default().calculate(&candles).is_none());
    }

    #[test]
    fn test_macd_flat_series_is_zero() {
        let candles = create_flat_candles(100, 100.0, 10.0);
        let output = Macd::default().calculate(&candles).unwrap();
        assert_eq!(output.macd, 0.0);
        assert_eq!(output.signal, 0.0);
        assert_eq!(output.histogram, 0.0);
    }

    #[test]
    fn test_macd_line_sign_follows_trend() {
        let up = Macd::default().calculate(&create_uptrend_candles(60)).unwrap();
        assert!(up.macd > 0.0);
        let down = Macd::default()
            .calculate(&create_downtrend_candles(60))
            .unwrap();
        assert!(down.macd < 0.0);
    }

    #[test]
    fn test_macd_histogram_positive_on_acceleration() {
        // Flat, then a sharp rally: the MACD line outruns its signal line.
        let mut closes = vec![100.0; 60];
        closes.extend((1..=10).map(|i| 100.0 + i as f64 * 5.0));
        let output = Macd::default().calculate(&from_closes(&closes)).unwrap();
        assert!(output.histogram > 0.0, "got {}", output.histogram);
    }
}
