//! Volume spike detection.

use crate::services::signals::Indicator;
use crate::types::Candle;

/// Flags the current candle when its volume exceeds `multiplier` times the
/// mean volume of the last `period` candles, the current one included.
///
/// Short history yields `false` rather than nothing.
pub struct VolumeSpike {
    period: usize,
    multiplier: f64,
}

impl Default for VolumeSpike {
    fn default() -> Self {
        Self {
            period: 20,
            multiplier: 1.5,
        }
    }
}

impl VolumeSpike {
    pub fn new(period: usize, multiplier: f64) -> Self {
        Self { period, multiplier }
    }
}

impl Indicator for VolumeSpike {
    type Output = bool;

    fn id(&self) -> &'static str {
        "volume_spike"
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, candles: &[Candle]) -> Option<bool> {
        if self.period == 0 || candles.len() < self.period {
            return Some(false);
        }

        let window = &candles[candles.len() - self.period..];
        let avg_volume = window.iter().map(|c| c.volume).sum::<f64>() / self.period as f64;
        let current = candles.last()?.volume;

        Some(current > self.multiplier * avg_volume)
    }
}
