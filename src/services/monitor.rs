//! Polling monitor: fetch, synthesize, gate on change, notify.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::services::chart::ChartRenderer;
use crate::services::notifier::Notifier;
use crate::services::signals::{Observation, SignalMemory, SignalSynthesizer};
use crate::sources::CandleSource;
use crate::types::{CandleSeries, Summary, SynthesisResult};

/// What happened to one symbol during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The summary changed and the report was delivered.
    Emitted { summary: Summary },
    /// Same summary as last time. Nothing sent.
    Unchanged,
    /// Not enough history for a full synthesis. Memory untouched.
    InsufficientData { unavailable: Vec<&'static str> },
}

/// Monitor settings taken from [`Config`].
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub symbols: Vec<String>,
    pub interval: String,
    pub candle_limit: u32,
    pub poll_interval: Duration,
}

impl From<&Config> for MonitorSettings {
    fn from(config: &Config) -> Self {
        Self {
            symbols: config.symbols.clone(),
            interval: config.interval.clone(),
            candle_limit: config.candle_limit,
            poll_interval: config.poll_interval(),
        }
    }
}

/// Runs analysis passes over the configured symbols.
pub struct Monitor<S, N> {
    source: S,
    notifier: N,
    synthesizer: SignalSynthesizer,
    memory: Arc<SignalMemory>,
    settings: MonitorSettings,
    charts: Option<ChartRenderer>,
}

impl<S: CandleSource, N: Notifier> Monitor<S, N> {
    pub fn new(
        source: S,
        notifier: N,
        synthesizer: SignalSynthesizer,
        memory: Arc<SignalMemory>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            source,
            notifier,
            synthesizer,
            memory,
            settings,
            charts: None,
        }
    }

    /// Attach a chart renderer. Emitted alerts then carry a PNG chart.
    pub fn with_charts(mut self, renderer: ChartRenderer) -> Self {
        self.charts = Some(renderer);
        self
    }

    pub fn memory(&self) -> &Arc<SignalMemory> {
        &self.memory
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Analyze one symbol and notify when its summary changed.
    ///
    /// A failed delivery rolls the memory back so the change is retried on
    /// the next pass.
    pub async fn analyze_symbol(&self, symbol: &str) -> Result<PassOutcome> {
        let candles = self
            .source
            .fetch_candles(symbol, &self.settings.interval, self.settings.candle_limit)
            .await?;
        let series = CandleSeries::new(candles)?;

        let synthesis = match self.synthesizer.synthesize(&series) {
            SynthesisResult::InsufficientData { unavailable } => {
                warn!(
                    "Not enough data for {} ({} candles): {:?}",
                    symbol,
                    series.len(),
                    unavailable
                );
                return Ok(PassOutcome::InsufficientData { unavailable });
            }
            SynthesisResult::Signal(synthesis) => synthesis,
        };

        let previous = match self.memory.observe(symbol, &synthesis.summary) {
            Observation::Unchanged => {
                info!("{} no change", symbol);
                return Ok(PassOutcome::Unchanged);
            }
            Observation::Changed { previous } => previous,
        };

        let chart = self.render_chart(symbol, &series);
        if let Err(e) = self
            .notifier
            .notify(symbol, &synthesis.report, chart.as_deref())
            .await
        {
            self.memory.rollback(symbol, &synthesis.summary, previous);
            return Err(e);
        }

        info!("Sent {} update: {}", symbol, synthesis.summary);
        Ok(PassOutcome::Emitted {
            summary: synthesis.summary,
        })
    }

    /// A failed render only drops the chart; the alert still goes out.
    fn render_chart(&self, symbol: &str, series: &CandleSeries) -> Option<Vec<u8>> {
        let renderer = self.charts.as_ref()?;
        match renderer.render(series) {
            Ok(png) => Some(png),
            Err(e) => {
                warn!("Chart for {} failed, sending text only: {}", symbol, e);
                None
            }
        }
    }

    /// One pass over every symbol, in order. A failing symbol never stops
    /// the others.
    pub async fn run_pass(&self) -> Vec<(String, Result<PassOutcome>)> {
        let mut outcomes = Vec::with_capacity(self.settings.symbols.len());

        for symbol in &self.settings.symbols {
            let outcome = self.analyze_symbol(symbol).await;
            if let Err(ref e) = outcome {
                error!("Error for {}: {}", symbol, e);
            }
            outcomes.push((symbol.clone(), outcome));
        }

        outcomes
    }

    /// Run passes every poll interval until Ctrl-C.
    pub async fn run(&self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run passes every poll interval until `shutdown` completes.
    ///
    /// `shutdown` is watched during passes as well as sleeps; completing it
    /// mid-pass drops the rest of that pass.
    pub async fn run_until<F: Future>(&self, shutdown: F) {
        info!(
            "Monitoring {} symbols every {}s on {} candles",
            self.settings.symbols.len(),
            self.settings.poll_interval.as_secs(),
            self.settings.interval
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = self.run_pass() => {}
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
        }

        info!("Shutdown signal received, stopping monitor");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::notifier::LogNotifier;
    use crate::services::signals::test_support::create_flat_candles;
    use crate::types::Candle;

    struct FixedSource(Vec<Candle>);

    impl CandleSource for FixedSource {
        async fn fetch_candles(&self, _: &str, _: &str, _: u32) -> Result<Vec<Candle>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl CandleSource for FailingSource {
        async fn fetch_candles(&self, _: &str, _: &str, _: u32) -> Result<Vec<Candle>> {
            Err(AppError::ExternalApi("down".to_string()))
        }
    }

    fn settings() -> MonitorSettings {
        MonitorSettings {
            symbols: vec!["BTCUSDT".to_string(), "SOLUSDT".to_string()],
            interval: "1h".to_string(),
            candle_limit: 250,
            poll_interval: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_first_pass_emits_then_unchanged() {
        let monitor = Monitor::new(
            FixedSource(create_flat_candles(250, 100.0, 10.0)),
            LogNotifier,
            SignalSynthesizer::default(),
            SignalMemory::new(),
            settings(),
        );

        let outcome = monitor.analyze_symbol("BTCUSDT").await.unwrap();
        assert!(matches!(outcome, PassOutcome::Emitted { .. }));

        let outcome = monitor.analyze_symbol("BTCUSDT").await.unwrap();
        assert_eq!(outcome, PassOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_empty_series_is_degenerate() {
        let monitor = Monitor::new(
            FixedSource(Vec::new()),
            LogNotifier,
            SignalSynthesizer::default(),
            SignalMemory::new(),
            settings(),
        );

        let result = monitor.analyze_symbol("BTCUSDT").await;
        assert!(matches!(result, Err(AppError::DegenerateInput(_))));
        assert!(monitor.memory().is_empty());
    }

    #[tokio::test]
    async fn test_source_failure_reported_per_symbol() {
        let monitor = Monitor::new(
            FailingSource,
            LogNotifier,
            SignalSynthesizer::default(),
            SignalMemory::new(),
            settings(),
        );

        let outcomes = monitor.run_pass().await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|(_, r)| r.is_err()));
    }

    /// Fires the shutdown channel during its second fetch, then stalls.
    struct InterruptingSource {
        candles: Vec<Candle>,
        fetches: std::sync::atomic::AtomicUsize,
        shutdown: std::sync::Mutex<Option<tokio::sync::oneshot::Sender<()>>>,
    }

    impl CandleSource for InterruptingSource {
        async fn fetch_candles(&self, _: &str, _: &str, _: u32) -> Result<Vec<Candle>> {
            let fetch = self
                .fetches
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if fetch == 1 {
                if let Some(tx) = self.shutdown.lock().unwrap().take() {
                    let _ = tx.send(());
                }
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            Ok(self.candles.clone())
        }
    }

    #[tokio::test]
    async fn test_run_until_ready_shutdown_skips_passes() {
        let monitor = Monitor::new(
            FixedSource(create_flat_candles(250, 100.0, 10.0)),
            LogNotifier,
            SignalSynthesizer::default(),
            SignalMemory::new(),
            settings(),
        );

        monitor.run_until(async {}).await;
        assert!(monitor.memory().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_during_pass_stops_loop() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let source = InterruptingSource {
            candles: create_flat_candles(250, 100.0, 10.0),
            fetches: Default::default(),
            shutdown: std::sync::Mutex::new(Some(tx)),
        };
        let mut settings = settings();
        settings.symbols = vec!["BTCUSDT".to_string()];
        settings.poll_interval = Duration::from_millis(50);

        let monitor = Monitor::new(
            source,
            LogNotifier,
            SignalSynthesizer::default(),
            SignalMemory::new(),
            settings,
        );

        let stopped =
            tokio::time::timeout(Duration::from_secs(3), monitor.run_until(rx)).await;
        assert!(stopped.is_ok());
        assert_eq!(
            monitor
                .source
                .fetches
                .load(std::sync::atomic::Ordering::SeqCst),
            2
        );
    }
}
