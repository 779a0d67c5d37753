use candle_sentinel::config::Config;
use candle_sentinel::services::{
    ChartRenderer, LogNotifier, Monitor, MonitorSettings, Notifier, SignalMemory,
    SignalSynthesizer, TelegramNotifier,
};
use candle_sentinel::sources::CandleSource;
use candle_sentinel::sources::BinanceClient;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "candle_sentinel=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    config.validate()?;
    info!(
        "Starting Candle Sentinel for {} on {} candles",
        config.symbols.join(", "),
        config.interval
    );

    let source = BinanceClient::new(
        config.binance_api_url.clone(),
        config.binance_api_key.clone(),
        config.request_timeout(),
    );
    let synthesizer = SignalSynthesizer::new(config.thresholds);
    let memory = SignalMemory::new();
    let settings = MonitorSettings::from(&config);

    match config.telegram.clone() {
        Some(telegram) => {
            info!("Telegram configured, alerts go to chat {}", telegram.chat_id);
            let notifier = TelegramNotifier::new(telegram, config.request_timeout());
            let monitor = Monitor::new(source, notifier, synthesizer, memory, settings);
            run(monitor, config.send_charts).await;
        }
        None => {
            warn!("TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID not set, alerts go to the log");
            let monitor = Monitor::new(source, LogNotifier, synthesizer, memory, settings);
            run(monitor, config.send_charts).await;
        }
    }

    Ok(())
}

async fn run<S: CandleSource, N: Notifier>(monitor: Monitor<S, N>, send_charts: bool) {
    if send_charts {
        monitor.with_charts(ChartRenderer::default()).run().await;
    } else {
        monitor.run().await;
    }
}
