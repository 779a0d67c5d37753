pub mod chart;
pub mod monitor;
pub mod notifier;
pub mod signals;

pub use chart::ChartRenderer;
pub use monitor::{Monitor, MonitorSettings, PassOutcome};
pub use notifier::{LogNotifier, Notifier, TelegramNotifier};
pub use signals::{Observation, SignalMemory, SignalSynthesizer};
