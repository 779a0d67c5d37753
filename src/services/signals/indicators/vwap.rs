//! Volume Weighted Average Price (VWAP) indicator.

use crate::services::signals::Indicator;
use crate::types::Candle;

/// VWAP (Volume Weighted Average Price) indicator.
///
/// VWAP = Sum(Typical Price * Volume) / Sum(Volume)
/// Typical Price = (High + Low + Close) / 3
///
/// Cumulative over every candle given, with no session reset.
#[derive(Default)]
pub struct Vwap;

impl Indicator for Vwap {
    type Output = f64;

    fn id(&self) -> &'static str {
        "vwap"
    }

    fn min_periods(&self) -> usize {
        1
    }

    fn calculate(&self, candles: &[Candle]) -> Option<f64> {
        if candles.is_empty() {
            return None;
        }

        let (weighted, volume) = candles.iter().fold((0.0, 0.0), |(pv, v), c| {
            (pv + c.typical_price() * c.volume, v + c.volume)
        });

        if volume == 0.0 {
            return None;
        }

        Some(weighted / volume)
    }
}
