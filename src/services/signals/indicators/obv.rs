//! On-Balance Volume (OBV) indicator.

use crate::services::signals::Indicator;
use crate::types::Candle;

/// OBV (On-Balance Volume) indicator.
///
/// Cumulative volume indicator:
/// - If close > previous close: OBV += volume
/// - If close < previous close: OBV -= volume
///
/// Accumulated over the whole series, starting from zero.
#[derive(Default)]
pub struct Obv;

impl Indicator for Obv {
    type Output = f64;

    fn id(&self) -> &'static str {
        "obv"
    }

    fn min_periods(&self) -> usize {
        2
    }

    fn calculate(&self, candles: &[Candle]) -> Option<f64> {
        if candles.len() < self.min_periods() {
            return None;
        }

        let obv = candles.windows(2).fold(0.0, |obv, pair| {
            if pair[1].close > pair[0].close {
                obv + pair[1].volume
            } else if pair[1].close < pair[0].close {
                obv - pair[1].volume
            } else {
                obv
            }
        });

        Some(obv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::test_support::{candle, create_flat_candles};

    #[test]
    fn test_obv_single_candle_unavailable() {
        let candles = create_flat_candles(1, 10.0, 5.0);
        assert!(Obv.calculate(&candles).is_none());
    }

    #[test]
    fn test_obv_accumulates_signed_volume() {
        let candles = vec![
            candle(0, 10.0, 100.0),
            candle(1, 11.0, 50.0),
            candle(2, 9.0, 20.0),
            candle(3, 9.0, 999.0),
            candle(4, 12.0, 5.0),
        ];
        assert_eq!(Obv.calculate(&candles), Some(35.0));
    }

    #[test]
    fn test_obv_flat_is_zero() {
        let candles = create_flat_candles(50, 10.0, 5.0);
        assert_eq!(Obv.calculate(&candles), Some(0.0));
    }
}
