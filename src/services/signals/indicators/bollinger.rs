//! Bollinger Bands indicator.

use crate::services::signals::{mean, Indicator};
use crate::types::{BandPosition, Candle};

/// Latest band values and where the close sits relative to them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerOutput {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
    pub position: BandPosition,
}

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(20)
/// - Upper band: SMA + 2 * StdDev
/// - Lower band: SMA - 2 * StdDev
///
/// StdDev is the sample standard deviation (n - 1) of the window.
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period,
            std_dev_multiplier,
        }
    }

    /// Sample standard deviation.
    fn std_dev(values: &[f64], mean: f64) -> f64 {
        if values.len() < 2 {
            return 0.0;
        }
        let variance: f64 =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
        variance.sqrt()
    }
}

impl Indicator for BollingerBands {
    type Output = BollingerOutput;

    fn id(&self) -> &'static str {
        "bollinger"
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn calculate(&self, candles: &[Candle]) -> Option<BollingerOutput> {
        if self.period < 2 || candles.len() < self.period {
            return None;
        }

        let closes: Vec<f64> = candles[candles.len() - self.period..]
            .iter()
            .map(|c| c.close)
            .collect();

        let middle = mean(&closes);
        let std_dev = Self::std_dev(&closes, middle);
        let upper = middle + self.std_dev_multiplier * std_dev;
        let lower = middle - self.std_dev_multiplier * std_dev;
        let price = candles.last()?.close;

        // Zero-width bands carry no breakout information.
        let position = if std_dev == 0.0 {
            BandPosition::Inside
        } else {
            BandPosition::classify(price, upper, lower)
        };

        Some(BollingerOutput {
            middle,
            upper,
            lower,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::test_support::{create_flat_candles, from_closes};

    #[test]
    fn test_bollinger_min_periods() {
        assert_eq!(BollingerBands::default().min_periods(), 20);
    }

    #[test]
    fn test_bollinger_insufficient_data() {
        let candles = create_flat_candles(19, 100.0, 10.0);
        assert!(BollingerBands::default().calculate(&candles).is_none());
    }

    #[test]
    fn test_bollinger_flat_is_inside() {
        let candles = create_flat_candles(20, 100.0, 10.0);
        let output = BollingerBands::default().calculate(&candles).unwrap();
        assert_eq!(output.position, BandPosition::Inside);
        assert_eq!(output.upper, output.lower);
    }

    #[test]
    fn test_bollinger_breakout_above() {
        let mut closes = vec![100.0; 19];
        closes.push(130.0);
        let output = BollingerBands::default()
            .calculate(&from_closes(&closes))
            .unwrap();
        assert_eq!(output.position, BandPosition::AboveUpper);
    }

    #[test]
    fn test_bollinger_breakdown_below() {
        let mut closes = vec![100.0; 19];
        closes.push(70.0);
        let output = BollingerBands::default()
            .calculate(&from_closes(&closes))
            .unwrap();
        assert_eq!(output.position, BandPosition::BelowLower);
    }

    #[test]
    fn test_bollinger_sample_std_dev() {
        // closes 1..=4: mean 2.5, sample variance 5/3
        let output = BollingerBands::new(4, 1.0)
            .calculate(&from_closes(&[1.0, 2.0, 3.0, 4.0]))
            .unwrap();
        let expected = (5.0f64 / 3.0).sqrt();
        assert!((output.upper - output.middle - expected).abs() < 1e-12);
    }
}
