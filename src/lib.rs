//! Candle Sentinel - technical-indicator signal monitor for crypto candles

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

pub use config::{Config, SignalThresholds};
pub use error::{AppError, Result};
pub use services::{Monitor, Observation, PassOutcome, SignalMemory, SignalSynthesizer};
pub use types::*;
