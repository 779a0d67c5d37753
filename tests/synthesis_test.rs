//! Signal synthesis tests

use candle_sentinel::config::SignalThresholds;
use candle_sentinel::services::SignalSynthesizer;
use candle_sentinel::types::*;

fn candles_from_closes(closes: &[f64], volume: f64) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            time: 1_700_000_000_000 + i as i64 * 3_600_000,
            open: close,
            high: close + 1.0,
            low: (close - 1.0).max(0.0),
            close,
            volume,
        })
        .collect()
}

fn flat_series(len: usize) -> CandleSeries {
    let candles = (0..len)
        .map(|i| Candle {
            time: 1_700_000_000_000 + i as i64 * 3_600_000,
            open: 100.0,
            high: 100.0,
            low: 100.0,
            close: 100.0,
            volume: 10.0,
        })
        .collect();
    CandleSeries::new(candles).unwrap()
}

fn rising_series() -> CandleSeries {
    let closes: Vec<f64> = (0..300).map(|i| 100.0 + i as f64).collect();
    CandleSeries::new(candles_from_closes(&closes, 1000.0)).unwrap()
}

fn sma(closes: &[f64], period: usize) -> f64 {
    closes.iter().rev().take(period).sum::<f64>() / period as f64
}

// =========================================================================
// Reference examples
// =========================================================================

#[test]
fn test_flat_250_example() {
    let synthesis = SignalSynthesizer::default()
        .synthesize(&flat_series(250))
        .into_synthesis()
        .expect("flat series has enough data");

    assert_eq!(synthesis.snapshot.rsi, 100.0);
    assert_eq!(synthesis.snapshot.macd_histogram, 0.0);
    assert_eq!(synthesis.snapshot.obv, 0.0);
    assert_eq!(synthesis.tokens.bollinger, BandPosition::Inside);
    assert_eq!(synthesis.tokens.volume, VolumeActivity::Normal);
    assert_eq!(
        synthesis.summary.as_str(),
        "RSI=Overbought | STOCH=Neutral | MACD=Bearish | EMA=Neutral | SMA=Neutral | \
         ADX=Weak | BB=Inside | VOL=Normal | OBV=Neutral | VWAP=BelowOrEqual"
    );
}

#[test]
fn test_rising_300_example() {
    let synthesis = SignalSynthesizer::default()
        .synthesize(&rising_series())
        .into_synthesis()
        .expect("rising series has enough data");

    assert_eq!(synthesis.tokens.ema_cross, Crossover::Bullish);
    assert_eq!(synthesis.tokens.sma_trend, SmaTrend::GoldenCross);
    assert_eq!(synthesis.tokens.obv, ObvFlow::Confirms);
    assert!(synthesis.snapshot.obv > 0.0);
    assert_eq!(synthesis.tokens.vwap, VwapPosition::Above);
    assert_eq!(synthesis.snapshot.price, 399.0);
}

#[test]
fn test_length_10_is_insufficient() {
    let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
    let series = CandleSeries::new(candles_from_closes(&closes, 10.0)).unwrap();
    let result = SignalSynthesizer::default().synthesize(&series);

    assert!(result.is_insufficient());
    if let SynthesisResult::InsufficientData { unavailable } = result {
        for id in ["rsi", "stochastic", "macd", "sma50", "sma200", "adx", "bollinger", "atr"] {
            assert!(unavailable.contains(&id), "missing {}", id);
        }
        assert!(!unavailable.contains(&"obv"));
        assert!(!unavailable.contains(&"vwap"));
    }
}

#[test]
fn test_199_candles_is_insufficient() {
    let result = SignalSynthesizer::default().synthesize(&flat_series(199));
    assert_eq!(
        result,
        SynthesisResult::InsufficientData {
            unavailable: vec!["sma200"]
        }
    );
}

// =========================================================================
// Properties
// =========================================================================

#[test]
fn test_synthesize_is_pure() {
    let synthesizer = SignalSynthesizer::default();
    let series = rising_series();
    let first = synthesizer.synthesize(&series);
    let second = synthesizer.synthesize(&series);
    assert_eq!(first, second);
}

#[test]
fn test_golden_cross_flips_at_crossing() {
    // Slow decline, then a sharp rally that pulls SMA50 above SMA200.
    let mut closes: Vec<f64> = (0..200).map(|i| 100.0 - i as f64 * 0.1).collect();
    closes.extend((0..100).map(|j| 80.0 + j as f64 * 2.0));

    let synthesizer = SignalSynthesizer::default();
    let mut seen_death = false;
    let mut seen_golden = false;

    for end in 200..=closes.len() {
        let series = CandleSeries::new(candles_from_closes(&closes[..end], 100.0)).unwrap();
        let synthesis = synthesizer.synthesize(&series).into_synthesis().unwrap();

        let fast = sma(&closes[..end], 50);
        let slow = sma(&closes[..end], 200);
        let expected = if fast > slow {
            SmaTrend::GoldenCross
        } else if fast < slow {
            SmaTrend::DeathCross
        } else {
            SmaTrend::Neutral
        };
        assert_eq!(synthesis.tokens.sma_trend, expected, "at length {}", end);

        seen_death |= expected == SmaTrend::DeathCross;
        seen_golden |= expected == SmaTrend::GoldenCross;
    }

    assert!(seen_death && seen_golden);
}

#[test]
fn test_thresholds_change_tokens() {
    // RSI on the rising series is 100: overbought by default, neutral when
    // the cut-point is 100.
    let lenient = SignalSynthesizer::new(SignalThresholds {
        rsi_overbought: 100.0,
        ..SignalThresholds::default()
    });
    let synthesis = lenient
        .synthesize(&rising_series())
        .into_synthesis()
        .unwrap();
    assert_eq!(synthesis.tokens.rsi, OscillatorZone::Neutral);

    let default = SignalSynthesizer::default()
        .synthesize(&rising_series())
        .into_synthesis()
        .unwrap();
    assert_eq!(default.tokens.rsi, OscillatorZone::Overbought);
    assert_ne!(default.summary, synthesis.summary);
}

#[test]
fn test_report_is_not_part_of_summary() {
    let synthesis = SignalSynthesizer::default()
        .synthesize(&rising_series())
        .into_synthesis()
        .unwrap();
    assert!(!synthesis.summary.as_str().contains('\n'));
    assert!(synthesis.report.contains("SMA200"));
    assert!(synthesis.report.contains("GoldenCross"));
}
