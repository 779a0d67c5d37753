//! Average Directional Index (ADX) indicator.

use crate::services::signals::indicators::atr::true_range;
use crate::services::signals::{mean, Indicator};
use crate::types::Candle;

/// Latest ADX value with its directional indicators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdxOutput {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// ADX (Average Directional Index) indicator.
///
/// Measures trend strength (not direction):
/// - Below 20: Weak trend / ranging market
/// - Above 25: Strong trend
///
/// +DM/-DM and TR are averaged with a rolling mean over `period` bars, and
/// ADX is the mean of the last `period` DX values.
pub struct Adx {
    period: usize,
}

impl Default for Adx {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Adx {
    /// Directional movement between two consecutive candles as (+DM, -DM).
    fn directional_movement(current: &Candle, previous: &Candle) -> (f64, f64) {
        let up_move = current.high - previous.high;
        let down_move = previous.low - current.low;

        let plus_dm = if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        };
        let minus_dm = if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        };

        (plus_dm, minus_dm)
    }
}

impl Indicator for Adx {
    type Output = AdxOutput;

    fn id(&self) -> &'static str {
        "adx"
    }

    fn min_periods(&self) -> usize {
        self.period * 2
    }

    fn calculate(&self, candles: &[Candle]) -> Option<AdxOutput> {
        if self.period == 0 || candles.len() < self.min_periods() {
            return None;
        }

        let mut tr_values = Vec::with_capacity(candles.len() - 1);
        let mut plus_dm_values = Vec::with_capacity(candles.len() - 1);
        let mut minus_dm_values = Vec::with_capacity(candles.len() - 1);

        for pair in candles.windows(2) {
            let (plus_dm, minus_dm) = Self::directional_movement(&pair[1], &pair[0]);
            tr_values.push(true_range(&pair[1], &pair[0]));
            plus_dm_values.push(plus_dm);
            minus_dm_values.push(minus_dm);
        }

        let mut dx_values = Vec::with_capacity(tr_values.len() + 1 - self.period);
        let mut plus_di = 0.0;
        let mut minus_di = 0.0;

        for end in self.period..=tr_values.len() {
            let start = end - self.period;
            let avg_tr = mean(&tr_values[start..end]);

            (plus_di, minus_di) = if avg_tr == 0.0 {
                (0.0, 0.0)
            } else {
                (
                    100.0 * mean(&plus_dm_values[start..end]) / avg_tr,
                    100.0 * mean(&minus_dm_values[start..end]) / avg_tr,
                )
            };

            let di_sum = plus_di + minus_di;
            let dx = if di_sum == 0.0 {
                0.0
            } else {
                100.0 * (plus_di - minus_di).abs() / di_sum
            };
            dx_values.push(dx);
        }

        if dx_values.len() < self.period {
            return None;
        }

        let adx = mean(&dx_values[dx_values.len() - self.period..]);

        Some(AdxOutput {
            adx,
            plus_di,
            minus_di,
        })
    }
}
