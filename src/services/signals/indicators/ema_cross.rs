//! Short/long EMA crossover state.

use crate::services::signals::indicators::ema_series;
use crate::services::signals::{closes, Indicator};
use crate::types::{Candle, Crossover};

/// EMA crossover: short EMA(9) against long EMA(21).
///
/// Always yields a value. With less history than the long period the state
/// is `Crossover::Neutral`.
pub struct EmaCross {
    short_period: usize,
    long_period: usize,
}

impl Default for EmaCross {
    fn default() -> Self {
        Self {
            short_period: 9,
            long_period: 21,
        }
    }
}

impl EmaCross {
    pub fn new(short_period: usize, long_period: usize) -> Self {
        Self {
            short_period,
            long_period,
        }
    }
}

impl Indicator for EmaCross {
    type Output = Crossover;

    fn id(&self) -> &'static str {
        "ema_cross"
    }

    fn min_periods(&self) -> usize {
        self.long_period
    }

    fn calculate(&self, candles: &[Candle]) -> Option<Crossover> {
        if candles.len() < self.long_period.max(self.short_period) {
            return Some(Crossover::Neutral);
        }

        let closes = closes(candles);
        let short = ema_series(&closes, self.short_period).last().copied();
        let long = ema_series(&closes, self.long_period).last().copied();

        Some(match (short, long) {
            (Some(short), Some(long)) => Crossover::classify(short, long),
            _ => Crossover::Neutral,
        })
    }
}
