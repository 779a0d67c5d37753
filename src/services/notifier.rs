//! Alert delivery.

use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::TelegramConfig;
use crate::error::{AppError, Result};

/// Delivers a rendered report for a symbol, with an optional PNG chart.
pub trait Notifier: Send + Sync {
    fn notify(
        &self,
        symbol: &str,
        report: &str,
        chart: Option<&[u8]>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Characters Telegram MarkdownV2 treats as markup.
const MARKDOWN_V2_SPECIAL: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Escape text for Telegram's MarkdownV2 parse mode.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        if MARKDOWN_V2_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Bold header with the symbol, followed by the escaped report.
pub fn compose_message(symbol: &str, report: &str) -> String {
    format!(
        "*{} signal update*\n\n{}",
        escape_markdown_v2(symbol),
        escape_markdown_v2(report)
    )
}

/// Longest caption Telegram accepts on a photo.
pub const CAPTION_LIMIT: usize = 1024;

/// Whether a composed message fits as a photo caption.
pub fn fits_caption(text: &str) -> bool {
    text.chars().count() <= CAPTION_LIMIT
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Text fields of a `sendPhoto` call. The image goes in as a multipart part.
#[derive(Debug)]
struct SendPhotoRequest<'a> {
    chat_id: &'a str,
    caption: &'a str,
    parse_mode: &'a str,
}

impl SendPhotoRequest<'_> {
    fn into_form(self, png: Vec<u8>) -> Result<Form> {
        let photo = Part::bytes(png)
            .file_name("chart.png")
            .mime_str("image/png")?;

        Ok(Form::new()
            .text("chat_id", self.chat_id.to_string())
            .text("caption", self.caption.to_string())
            .text("parse_mode", self.parse_mode.to_string())
            .part("photo", photo))
    }
}

#[derive(Debug, Deserialize)]
struct BotResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl BotResponse {
    fn into_result(self) -> Result<()> {
        if self.ok {
            Ok(())
        } else {
            Err(AppError::Notification(
                self.description
                    .unwrap_or_else(|| "Telegram returned ok=false".to_string()),
            ))
        }
    }
}

/// Telegram Bot API notifier.
///
/// Sends the chart as a photo with the report as caption. Falls back to a
/// plain text message when there is no chart or the caption is too long.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent("CandleSentinel/1.0")
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }

    async fn send_message(&self, text: &str) -> Result<Response> {
        let body = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text,
            parse_mode: "MarkdownV2",
        };

        Ok(self
            .client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?)
    }

    async fn send_photo(&self, caption: &str, png: &[u8]) -> Result<Response> {
        let form = SendPhotoRequest {
            chat_id: &self.config.chat_id,
            caption,
            parse_mode: "MarkdownV2",
        }
        .into_form(png.to_vec())?;

        Ok(self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?)
    }
}

impl Notifier for TelegramNotifier {
    async fn notify(&self, symbol: &str, report: &str, chart: Option<&[u8]>) -> Result<()> {
        let text = compose_message(symbol, report);

        let response = match chart {
            Some(png) if fits_caption(&text) => self.send_photo(&text, png).await?,
            Some(_) => {
                debug!(
                    "Caption for {} exceeds {} chars, sending text only",
                    symbol, CAPTION_LIMIT
                );
                self.send_message(&text).await?
            }
            None => self.send_message(&text).await?,
        };

        let status = response.status();
        let parsed: BotResponse = response.json().await.map_err(|e| {
            AppError::Notification(format!("Telegram returned {}: {}", status, e))
        })?;
        parsed.into_result()?;

        debug!("Telegram alert sent for {}", symbol);
        Ok(())
    }
}

/// Writes reports to the log. Used when Telegram is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, symbol: &str, report: &str, chart: Option<&[u8]>) -> Result<()> {
        match chart {
            Some(png) => info!(
                "Signal update for {} ({} byte chart)\n{}",
                symbol,
                png.len(),
                report
            ),
            None => info!("Signal update for {}\n{}", symbol, report),
        }
        Ok(())
    }
}
