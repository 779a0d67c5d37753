use crate::error::{AppError, Result};
use crate::sources::CandleSource;
use crate::types::Candle;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://api.binance.com/api/v3";

/// One kline row. Binance sends a JSON array of mixed types.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RawKline(
    i64,    // 0: Open time
    String, // 1: Open
    String, // 2: High
    String, // 3: Low
    String, // 4: Close
    String, // 5: Volume
    i64,    // 6: Close time
    String, // 7: Quote asset volume
    i64,    // 8: Number of trades
    String, // 9: Taker buy base asset volume
    String, // 10: Taker buy quote asset volume
    String, // 11: Ignore
);

fn parse_field(value: &str, field: &str, open_time: i64) -> Result<f64> {
    value.parse().map_err(|_| {
        AppError::ExternalApi(format!(
            "Binance kline {} has unparseable {}: {:?}",
            open_time, field, value
        ))
    })
}

impl RawKline {
    fn into_candle(self) -> Result<Candle> {
        let time = self.0;
        Ok(Candle {
            time,
            open: parse_field(&self.1, "open", time)?,
            high: parse_field(&self.2, "high", time)?,
            low: parse_field(&self.3, "low", time)?,
            close: parse_field(&self.4, "close", time)?,
            volume: parse_field(&self.5, "volume", time)?,
        })
    }
}

/// Decode a klines response body into candles.
///
/// A Binance error object (`{"code": .., "msg": ..}`) becomes an
/// `ExternalApi` error.
pub fn parse_klines(body: &str) -> Result<Vec<Candle>> {
    let raw: Vec<RawKline> = serde_json::from_str(body).map_err(|e| {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            if let Some(code) = value.get("code").and_then(Value::as_i64) {
                let msg = value.get("msg").and_then(Value::as_str).unwrap_or("");
                return AppError::ExternalApi(format!("Binance error {}: {}", code, msg));
            }
        }
        AppError::SerdeJson(e)
    })?;

    raw.into_iter().map(RawKline::into_candle).collect()
}

/// Binance REST client for klines.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BinanceClient {
    /// Create a new Binance client.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent("CandleSentinel/1.0")
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch klines, oldest first. The last row may be the still-open candle.
    pub async fn fetch_klines(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>> {
        let url = format!("{}/klines", self.base_url);
        let limit = limit.to_string();

        let mut request = self.client.get(&url).query(&[
            ("symbol", symbol),
            ("interval", interval),
            ("limit", limit.as_str()),
        ]);
        if let Some(ref key) = self.api_key {
            request = request.header("X-MBX-APIKEY", key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                "Binance API returned {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            );
            return Err(AppError::ExternalApi(format!(
                "Binance API error: {}",
                status
            )));
        }

        let body = response.text().await?;
        let candles = parse_klines(&body)?;
        debug!("Binance returned {} {} candles for {}", candles.len(), interval, symbol);

        Ok(candles)
    }
}

impl CandleSource for BinanceClient {
    async fn fetch_candles(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>> {
        self.fetch_klines(symbol, interval, limit).await
    }
}
