//! Signal synthesizer: runs every indicator over a series and folds the
//! results into categorical tokens, a comparable summary and a report.

use chrono::{TimeZone, Utc};
use tracing::debug;

use crate::config::SignalThresholds;
use crate::services::signals::indicators::{
    Adx, Atr, BollingerBands, EmaCross, Macd, Obv, Rsi, Sma, Stochastic, VolumeSpike, Vwap,
};
use crate::services::signals::Indicator;
use crate::types::{
    Candle, CandleSeries, IndicatorSnapshot, MacdBias, ObvFlow, OscillatorZone, SignalTokens,
    SmaTrend, Synthesis, SynthesisResult, TrendStrength, VolumeActivity, VwapPosition,
};

/// Turns a validated candle series into a [`SynthesisResult`].
///
/// Holds no state between calls: the same series always yields the same
/// result.
pub struct SignalSynthesizer {
    thresholds: SignalThresholds,
    rsi: Rsi,
    stochastic: Stochastic,
    macd: Macd,
    ema_cross: EmaCross,
    sma_fast: Sma,
    sma_slow: Sma,
    adx: Adx,
    bollinger: BollingerBands,
    atr: Atr,
    volume_spike: VolumeSpike,
    obv: Obv,
    vwap: Vwap,
}

impl Default for SignalSynthesizer {
    fn default() -> Self {
        Self::new(SignalThresholds::default())
    }
}

/// Run an indicator, recording its id when it has no value.
fn require<I: Indicator>(
    indicator: &I,
    candles: &[Candle],
    unavailable: &mut Vec<&'static str>,
) -> Option<I::Output> {
    let value = indicator.calculate(candles);
    if value.is_none() {
        unavailable.push(indicator.id());
    }
    value
}

impl SignalSynthesizer {
    pub fn new(thresholds: SignalThresholds) -> Self {
        Self {
            thresholds,
            rsi: Rsi::default(),
            stochastic: Stochastic::default(),
            macd: Macd::default(),
            ema_cross: EmaCross::default(),
            sma_fast: Sma::new(50),
            sma_slow: Sma::new(200),
            adx: Adx::default(),
            bollinger: BollingerBands::default(),
            atr: Atr::default(),
            volume_spike: VolumeSpike::new(20, thresholds.volume_spike_multiplier),
            obv: Obv,
            vwap: Vwap,
        }
    }

    pub fn thresholds(&self) -> &SignalThresholds {
        &self.thresholds
    }

    /// Minimum series length for a full synthesis.
    pub fn min_periods(&self) -> usize {
        [
            self.rsi.min_periods(),
            self.stochastic.min_periods(),
            self.macd.min_periods(),
            self.sma_fast.min_periods(),
            self.sma_slow.min_periods(),
            self.adx.min_periods(),
            self.bollinger.min_periods(),
            self.atr.min_periods(),
            self.obv.min_periods(),
            self.vwap.min_periods(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// Synthesize the current signal state of a series.
    pub fn synthesize(&self, series: &CandleSeries) -> SynthesisResult {
        let candles = series.candles();
        let current = series.current();
        let t = &self.thresholds;

        let mut unavailable = Vec::new();
        let rsi = require(&self.rsi, candles, &mut unavailable);
        let stochastic = require(&self.stochastic, candles, &mut unavailable);
        let macd = require(&self.macd, candles, &mut unavailable);
        let sma_fast = require(&self.sma_fast, candles, &mut unavailable);
        let sma_slow = require(&self.sma_slow, candles, &mut unavailable);
        let adx = require(&self.adx, candles, &mut unavailable);
        let bollinger = require(&self.bollinger, candles, &mut unavailable);
        let atr = require(&self.atr, candles, &mut unavailable);
        let obv = require(&self.obv, candles, &mut unavailable);
        let vwap = require(&self.vwap, candles, &mut unavailable);

        let (
            Some(rsi),
            Some(stochastic),
            Some(macd),
            Some(sma_fast),
            Some(sma_slow),
            Some(adx),
            Some(bollinger),
            Some(atr),
            Some(obv),
            Some(vwap),
        ) = (
            rsi, stochastic, macd, sma_fast, sma_slow, adx, bollinger, atr, obv, vwap,
        )
        else {
            debug!(
                "Insufficient data ({} candles): unavailable {:?}",
                candles.len(),
                unavailable
            );
            return SynthesisResult::InsufficientData { unavailable };
        };

        // These two never go unavailable; short history maps to a default token.
        let ema_cross = self.ema_cross.calculate(candles).unwrap_or_default();
        let volume_spike = self.volume_spike.calculate(candles).unwrap_or(false);

        let price = current.close;
        let tokens = SignalTokens {
            rsi: OscillatorZone::classify(rsi, t.rsi_overbought, t.rsi_oversold),
            stochastic: OscillatorZone::classify(
                stochastic.k,
                t.stoch_overbought,
                t.stoch_oversold,
            ),
            macd: MacdBias::classify(macd.histogram),
            ema_cross,
            sma_trend: SmaTrend::classify(sma_fast, sma_slow),
            adx: TrendStrength::classify(adx.adx, t.adx_strong, t.adx_weak),
            bollinger: bollinger.position,
            volume: VolumeActivity::from_spike(volume_spike),
            obv: ObvFlow::classify(obv),
            vwap: VwapPosition::classify(price, vwap),
        };

        let snapshot = IndicatorSnapshot {
            time: current.time,
            price,
            rsi,
            stochastic_k: stochastic.k,
            stochastic_d: stochastic.d,
            macd_histogram: macd.histogram,
            sma_fast,
            sma_slow,
            adx: adx.adx,
            atr,
            bollinger_upper: bollinger.upper,
            bollinger_lower: bollinger.lower,
            obv,
            vwap,
        };

        let summary = tokens.summary();
        debug!("Synthesized {} candles: {}", candles.len(), summary);

        SynthesisResult::Signal(Synthesis {
            summary,
            report: render_report(&tokens, &snapshot),
            tokens,
            snapshot,
        })
    }
}

fn format_time(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => format!("{} ms", millis),
    }
}

/// Human-readable report. Not used for equality.
fn render_report(tokens: &SignalTokens, s: &IndicatorSnapshot) -> String {
    format!(
        "Current price: {price:.2} USDT\n\
         Candle time: {time}\n\
         \n\
         --- Trend & momentum ---\n\
         - RSI (14): {rsi:.1} - {rsi_label}\n\
         - Stochastic: K={k:.1}, D={d:.1} - {stoch_label}\n\
         - MACD histogram: {hist:.4} - {macd_label}\n\
         - EMA cross (9/21): {ema_label}\n\
         - SMA50: {sma_fast:.2}\n\
         - SMA200: {sma_slow:.2} - {sma_label}\n\
         - ADX (trend strength): {adx:.1} - {adx_label}\n\
         \n\
         --- Volatility & volume ---\n\
         - Bollinger Bands: {bb_label}\n\
         - ATR (volatility): {atr:.4}\n\
         - Volume: {volume_label}\n\
         - OBV: {obv:.2} - {obv_label}\n\
         - VWAP: {vwap:.2} - {vwap_label}",
        price = s.price,
        time = format_time(s.time),
        rsi = s.rsi,
        rsi_label = tokens.rsi.label(),
        k = s.stochastic_k,
        d = s.stochastic_d,
        stoch_label = tokens.stochastic.label(),
        hist = s.macd_histogram,
        macd_label = tokens.macd.label(),
        ema_label = tokens.ema_cross.label(),
        sma_fast = s.sma_fast,
        sma_slow = s.sma_slow,
        sma_label = tokens.sma_trend.label(),
        adx = s.adx,
        adx_label = tokens.adx.label(),
        bb_label = tokens.bollinger.label(),
        atr = s.atr,
        volume_label = tokens.volume.label(),
        obv = s.obv,
        obv_label = tokens.obv.label(),
        vwap = s.vwap,
        vwap_label = tokens.vwap.label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::test_support::{create_flat_candles, from_closes};
    use crate::types::{BandPosition, Crossover};

    fn series(candles: Vec<Candle>) -> CandleSeries {
        CandleSeries::new(candles).unwrap()
    }

    #[test]
    fn test_min_periods_is_sma200() {
        assert_eq!(SignalSynthesizer::default().min_periods(), 200);
    }

    #[test]
    fn test_short_series_lists_unavailable() {
        let result = SignalSynthesizer::default().synthesize(&series(create_flat_candles(
            60, 100.0, 10.0,
        )));
        match result {
            SynthesisResult::InsufficientData { unavailable } => {
                assert_eq!(unavailable, vec!["sma200"]);
            }
            other => panic!("expected insufficient data, got {:?}", other),
        }
    }

    #[test]
    fn test_flat_series_tokens() {
        let result = SignalSynthesizer::default()
            .synthesize(&series(create_flat_candles(250, 100.0, 10.0)));
        let synthesis = result.into_synthesis().unwrap();
        let tokens = synthesis.tokens;

        assert_eq!(tokens.rsi, OscillatorZone::Overbought);
        assert_eq!(tokens.stochastic, OscillatorZone::Neutral);
        assert_eq!(tokens.macd, MacdBias::Bearish);
        assert_eq!(tokens.ema_cross, Crossover::Neutral);
        assert_eq!(tokens.sma_trend, SmaTrend::Neutral);
        assert_eq!(tokens.adx, TrendStrength::Weak);
        assert_eq!(tokens.bollinger, BandPosition::Inside);
        assert_eq!(tokens.volume, VolumeActivity::Normal);
        assert_eq!(tokens.obv, ObvFlow::Neutral);
        assert_eq!(tokens.vwap, VwapPosition::BelowOrEqual);
    }

    #[test]
    fn test_report_sections_and_precision() {
        let closes: Vec<f64> = (0..300).map(|i| 100.0 + i as f64).collect();
        let synthesis = SignalSynthesizer::default()
            .synthesize(&series(from_closes(&closes)))
            .into_synthesis()
            .unwrap();

        let report = &synthesis.report;
        assert!(report.contains("Current price: 399.00 USDT"));
        assert!(report.contains("--- Trend & momentum ---"));
        assert!(report.contains("--- Volatility & volume ---"));
        assert!(report.contains("RSI (14): 100.0 - Overbought"));
        assert!(report.contains("UTC"));
    }

    #[test]
    fn test_report_layout() {
        let closes: Vec<f64> = (0..300).map(|i| 100.0 + i as f64).collect();
        let report = SignalSynthesizer::default()
            .synthesize(&series(from_closes(&closes)))
            .into_synthesis()
            .unwrap()
            .report;

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 18);
        assert_eq!(lines[0], "Current price: 399.00 USDT");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "--- Trend & momentum ---");
        assert_eq!(lines[11], "");
        assert_eq!(lines[12], "--- Volatility & volume ---");
        assert!(lines[17].starts_with("- VWAP: "));
        assert!(!report.ends_with('\n'));
        assert!(lines.iter().all(|line| !line.starts_with(' ')));
    }

    #[test]
    fn test_volume_spike_threshold_is_configurable() {
        let mut candles = create_flat_candles(249, 100.0, 100.0);
        candles.push(Candle {
            time: candles[248].time + 60_000,
            volume: 200.0,
            ..candles[248]
        });

        // mean = (19 * 100 + 200) / 20 = 105
        let default = SignalSynthesizer::default()
            .synthesize(&series(candles.clone()))
            .into_synthesis()
            .unwrap();
        assert_eq!(default.tokens.volume, VolumeActivity::Spike);

        let strict = SignalSynthesizer::new(SignalThresholds {
            volume_spike_multiplier: 3.0,
            ..SignalThresholds::default()
        })
        .synthesize(&series(candles))
        .into_synthesis()
        .unwrap();
        assert_eq!(strict.tokens.volume, VolumeActivity::Normal);
    }

    #[test]
    fn test_format_time_utc() {
        assert_eq!(format_time(0), "1970-01-01 00:00 UTC");
    }
}
