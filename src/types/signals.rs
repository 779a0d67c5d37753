use serde::Serialize;
use std::fmt;

/// Oscillator zone, shared by RSI and Stochastic %K.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OscillatorZone {
    Overbought,
    Oversold,
    Neutral,
}

impl OscillatorZone {
    /// Classify an oscillator value against strict upper/lower cut-points.
    pub fn classify(value: f64, overbought: f64, oversold: f64) -> Self {
        if value > overbought {
            Self::Overbought
        } else if value < oversold {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Overbought => "Overbought",
            Self::Oversold => "Oversold",
            Self::Neutral => "Neutral",
        }
    }
}

/// MACD histogram bias. There is no neutral zone: zero counts as bearish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdBias {
    Bullish,
    Bearish,
}

impl MacdBias {
    pub fn classify(histogram: f64) -> Self {
        if histogram > 0.0 {
            Self::Bullish
        } else {
            Self::Bearish
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Bullish => "Bullish",
            Self::Bearish => "Bearish",
        }
    }
}

/// Short vs long EMA state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Crossover {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl Crossover {
    pub fn classify(short: f64, long: f64) -> Self {
        if short > long {
            Self::Bullish
        } else if short < long {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Bullish => "Bullish",
            Self::Bearish => "Bearish",
            Self::Neutral => "Neutral",
        }
    }
}

/// ADX trend strength, a three-way split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStrength {
    Strong,
    Weak,
    /// Between the weak and strong cut-points: a trend exists but is not classified.
    Unclassified,
}

impl TrendStrength {
    pub fn classify(adx: f64, strong: f64, weak: f64) -> Self {
        if adx > strong {
            Self::Strong
        } else if adx < weak {
            Self::Weak
        } else {
            Self::Unclassified
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Weak => "Weak",
            Self::Unclassified => "Unclassified",
        }
    }
}

/// SMA50 vs SMA200 relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SmaTrend {
    GoldenCross,
    DeathCross,
    Neutral,
}

impl SmaTrend {
    pub fn classify(fast: f64, slow: f64) -> Self {
        if fast > slow {
            Self::GoldenCross
        } else if fast < slow {
            Self::DeathCross
        } else {
            Self::Neutral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::GoldenCross => "GoldenCross",
            Self::DeathCross => "DeathCross",
            Self::Neutral => "Neutral",
        }
    }
}

/// Close relative to the Bollinger bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BandPosition {
    AboveUpper,
    BelowLower,
    Inside,
}

impl BandPosition {
    pub fn classify(price: f64, upper: f64, lower: f64) -> Self {
        if price > upper {
            Self::AboveUpper
        } else if price < lower {
            Self::BelowLower
        } else {
            Self::Inside
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AboveUpper => "AboveUpper",
            Self::BelowLower => "BelowLower",
            Self::Inside => "Inside",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeActivity {
    Spike,
    Normal,
}

impl VolumeActivity {
    pub fn from_spike(spike: bool) -> Self {
        if spike {
            Self::Spike
        } else {
            Self::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Spike => "Spike",
            Self::Normal => "Normal",
        }
    }
}

/// OBV sign relative to the trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObvFlow {
    Confirms,
    Diverges,
    Neutral,
}

impl ObvFlow {
    pub fn classify(obv: f64) -> Self {
        if obv > 0.0 {
            Self::Confirms
        } else if obv < 0.0 {
            Self::Diverges
        } else {
            Self::Neutral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Confirms => "Confirms",
            Self::Diverges => "Diverges",
            Self::Neutral => "Neutral",
        }
    }
}

/// Price relative to VWAP. Equality folds into `BelowOrEqual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VwapPosition {
    Above,
    BelowOrEqual,
}

impl VwapPosition {
    pub fn classify(price: f64, vwap: f64) -> Self {
        if price > vwap {
            Self::Above
        } else {
            Self::BelowOrEqual
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Above => "Above",
            Self::BelowOrEqual => "BelowOrEqual",
        }
    }
}

/// All categorical sub-signals of one analysis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalTokens {
    pub rsi: OscillatorZone,
    pub stochastic: OscillatorZone,
    pub macd: MacdBias,
    pub ema_cross: Crossover,
    pub sma_trend: SmaTrend,
    pub adx: TrendStrength,
    pub bollinger: BandPosition,
    pub volume: VolumeActivity,
    pub obv: ObvFlow,
    pub vwap: VwapPosition,
}

impl SignalTokens {
    /// Separator between summary fields.
    pub const SEPARATOR: &'static str = " | ";

    /// Fields in summary order.
    pub fn fields(&self) -> [(&'static str, &'static str); 10] {
        [
            ("RSI", self.rsi.label()),
            ("STOCH", self.stochastic.label()),
            ("MACD", self.macd.label()),
            ("EMA", self.ema_cross.label()),
            ("SMA", self.sma_trend.label()),
            ("ADX", self.adx.label()),
            ("BB", self.bollinger.label()),
            ("VOL", self.volume.label()),
            ("OBV", self.obv.label()),
            ("VWAP", self.vwap.label()),
        ]
    }

    /// Build the comparable summary.
    pub fn summary(&self) -> Summary {
        let text = self
            .fields()
            .iter()
            .map(|(field, label)| format!("{}={}", field, label))
            .collect::<Vec<_>>()
            .join(Self::SEPARATOR);
        Summary(text)
    }
}

/// Equality-comparable composite signal. Compared byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Summary(String);

impl Summary {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Summary {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Summary {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Raw indicator values behind one synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    /// Open time of the current candle (Unix milliseconds).
    pub time: i64,
    pub price: f64,
    pub rsi: f64,
    pub stochastic_k: f64,
    pub stochastic_d: f64,
    pub macd_histogram: f64,
    pub sma_fast: f64,
    pub sma_slow: f64,
    pub adx: f64,
    pub atr: f64,
    pub bollinger_upper: f64,
    pub bollinger_lower: f64,
    pub obv: f64,
    pub vwap: f64,
}

/// A complete synthesis: tokens, their summary, and the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Synthesis {
    pub summary: Summary,
    pub report: String,
    pub tokens: SignalTokens,
    pub snapshot: IndicatorSnapshot,
}

/// Result of synthesizing one series.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisResult {
    /// At least one composite indicator was unavailable. Holds their ids.
    InsufficientData { unavailable: Vec<&'static str> },
    Signal(Synthesis),
}

impl SynthesisResult {
    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }

    pub fn synthesis(&self) -> Option<&Synthesis> {
        match self {
            Self::Signal(synthesis) => Some(synthesis),
            Self::InsufficientData { .. } => None,
        }
    }

    pub fn into_synthesis(self) -> Option<Synthesis> {
        match self {
            Self::Signal(synthesis) => Some(synthesis),
            Self::InsufficientData { .. } => None,
        }
    }
}
