//! Candle series input model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single OHLCV candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    /// Open time (Unix milliseconds).
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Typical price: (high + low + close) / 3.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ]
    }
}

/// Reasons a candle series is rejected before any indicator runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("candle series is empty")]
    Empty,

    #[error("timestamp at index {index} is not after the previous candle ({time} <= {previous})")]
    NonMonotonicTime {
        index: usize,
        time: i64,
        previous: i64,
    },

    #[error("{field} at index {index} is not a finite non-negative number ({value})")]
    InvalidValue {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("high/low range at index {index} does not contain open and close")]
    InconsistentRange { index: usize },
}

/// A validated, oldest-first sequence of candles. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Validate and wrap a candle vector.
    pub fn new(candles: Vec<Candle>) -> Result<Self, SeriesError> {
        if candles.is_empty() {
            return Err(SeriesError::Empty);
        }

        for (index, candle) in candles.iter().enumerate() {
            for (field, value) in candle.fields() {
                if !value.is_finite() || value < 0.0 {
                    return Err(SeriesError::InvalidValue {
                        index,
                        field,
                        value,
                    });
                }
            }

            let body_high = candle.open.max(candle.close);
            let body_low = candle.open.min(candle.close);
            if candle.high < body_high.max(candle.low) || candle.low > body_low {
                return Err(SeriesError::InconsistentRange { index });
            }

            if index > 0 {
                let previous = candles[index - 1].time;
                if candle.time <= previous {
                    return Err(SeriesError::NonMonotonicTime {
                        index,
                        time: candle.time,
                        previous,
                    });
                }
            }
        }

        Ok(Self { candles })
    }

    /// All candles, oldest first.
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// The most recent candle.
    pub fn current(&self) -> &Candle {
        &self.candles[self.candles.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn into_inner(self) -> Vec<Candle> {
        self.candles
    }
}

impl TryFrom<Vec<Candle>> for CandleSeries {
    type Error = SeriesError;

    fn try_from(candles: Vec<Candle>) -> Result<Self, Self::Error> {
        Self::new(candles)
    }
}
