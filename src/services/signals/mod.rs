//! Signal engine.
//!
//! Indicator calculations, synthesis of categorical sub-signals into a
//! comparable summary, and the change-detection memory that gates
//! notifications.

pub mod indicators;
pub mod memory;
pub mod synthesizer;

pub use memory::{Observation, SignalMemory};
pub use synthesizer::SignalSynthesizer;

use crate::types::Candle;

/// Trait for implementing technical indicators.
pub trait Indicator: Send + Sync {
    /// Value produced when enough history is available.
    type Output;

    /// Unique identifier for this indicator.
    fn id(&self) -> &'static str;

    /// Minimum number of candles required for calculation.
    fn min_periods(&self) -> usize;

    /// Calculate the indicator from oldest-first candles.
    /// Returns None when the history is too short to produce a value.
    fn calculate(&self, candles: &[Candle]) -> Option<Self::Output>;
}

/// Close prices, oldest first.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Arithmetic mean. Callers guarantee a non-empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
