pub mod binance;

pub use binance::BinanceClient;

use std::future::Future;

use crate::error::Result;
use crate::types::Candle;

/// Anything that can supply oldest-first candles for a symbol.
pub trait CandleSource: Send + Sync {
    /// Fetch up to `limit` candles of `interval` for `symbol`.
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Candle>>> + Send;
}
