//! Technical indicator implementations.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod ema_cross;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod volume_spike;
pub mod vwap;

pub use adx::{Adx, AdxOutput};
pub use atr::Atr;
pub use bollinger::{BollingerBands, BollingerOutput};
pub use ema::{ema_series, Ema};
pub use ema_cross::EmaCross;
pub use macd::{Macd, MacdOutput};
pub use obv::Obv;
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::{Stochastic, StochasticOutput};
pub use volume_spike::VolumeSpike;
pub use vwap::Vwap;
