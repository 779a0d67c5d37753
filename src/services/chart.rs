//! Candlestick chart rendering for alerts.

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{AppError, Result};
use crate::types::{Candle, CandleSeries};

const BACKGROUND: RGBColor = RGBColor(0, 0, 0);
const CANDLE_UP: RGBColor = RGBColor(0, 255, 153);
const CANDLE_DOWN: RGBColor = RGBColor(255, 77, 77);
const SMA_FAST_COLOR: RGBColor = RGBColor(255, 165, 0);
const SMA_SLOW_COLOR: RGBColor = RGBColor(0, 255, 255);

/// Moving averages overlaid on the price panel, with their colors.
const OVERLAYS: [(usize, RGBColor); 2] = [(50, SMA_FAST_COLOR), (200, SMA_SLOW_COLOR)];

/// Renders a candle series as a PNG: candles with SMA50/SMA200 on top,
/// volume bars below, on a black background.
#[derive(Debug, Clone, Copy)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
    max_candles: usize,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            max_candles: 200,
        }
    }
}

/// A moving-average line in window coordinates.
type Overlay = (Vec<(f64, f64)>, RGBColor);

impl ChartRenderer {
    pub fn new(width: u32, height: u32, max_candles: usize) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            max_candles: max_candles.max(1),
        }
    }

    /// Render the most recent `max_candles` of `series` to PNG bytes.
    pub fn render(&self, series: &CandleSeries) -> Result<Vec<u8>> {
        let candles = series.candles();
        let offset = candles.len().saturating_sub(self.max_candles);
        let visible = &candles[offset..];
        let overlays: Vec<Overlay> = OVERLAYS
            .iter()
            .map(|&(period, color)| (sma_line(candles, offset, period), color))
            .filter(|(line, _)| !line.is_empty())
            .collect();

        let mut pixels = vec![0u8; self.width as usize * self.height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut pixels, (self.width, self.height))
                .into_drawing_area();
            root.fill(&BACKGROUND).map_err(chart_error)?;

            let (price_area, volume_area) = root.split_vertically(self.height * 3 / 4);
            draw_prices(&price_area, visible, &overlays)?;
            draw_volume(&volume_area, visible)?;

            root.present().map_err(chart_error)?;
        }

        encode_png(&pixels, self.width, self.height)
    }
}

/// SMA points whose bar falls inside the visible window starting at `offset`.
fn sma_line(candles: &[Candle], offset: usize, period: usize) -> Vec<(f64, f64)> {
    if period == 0 || candles.len() < period {
        return Vec::new();
    }

    (offset.max(period - 1)..candles.len())
        .map(|end| {
            let sum: f64 = candles[end + 1 - period..=end].iter().map(|c| c.close).sum();
            ((end - offset) as f64, sum / period as f64)
        })
        .collect()
}

fn x_range(len: usize) -> std::ops::Range<f64> {
    -1.0..len as f64
}

fn draw_prices<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    candles: &[Candle],
    overlays: &[Overlay],
) -> Result<()> {
    let (mut low, mut high) = candles
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), c| (lo.min(c.low), hi.max(c.high)));
    for (_, value) in overlays.iter().flat_map(|(line, _)| line.iter()) {
        low = low.min(*value);
        high = high.max(*value);
    }
    let pad = ((high - low) * 0.05).max(high.abs() * 0.001).max(1e-6);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .build_cartesian_2d(x_range(candles.len()), (low - pad)..(high + pad))
        .map_err(chart_error)?;

    let (plot_width, _) = chart.plotting_area().dim_in_pixel();
    let body_width = ((plot_width as f64 / (candles.len() + 1) as f64) * 0.7).max(1.0) as u32;

    chart
        .draw_series(candles.iter().enumerate().map(|(i, c)| {
            CandleStick::new(
                i as f64,
                c.open,
                c.high,
                c.low,
                c.close,
                CANDLE_UP.filled(),
                CANDLE_DOWN.filled(),
                body_width,
            )
        }))
        .map_err(chart_error)?;

    for (line, color) in overlays {
        chart
            .draw_series(LineSeries::new(line.iter().copied(), color.stroke_width(2)))
            .map_err(chart_error)?;
    }

    Ok(())
}

fn draw_volume<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, candles: &[Candle]) -> Result<()> {
    let max_volume = candles.iter().map(|c| c.volume).fold(0.0, f64::max).max(1e-6);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .build_cartesian_2d(x_range(candles.len()), 0.0..max_volume * 1.1)
        .map_err(chart_error)?;

    chart
        .draw_series(candles.iter().enumerate().map(|(i, c)| {
            let style = if c.close >= c.open {
                CANDLE_UP.filled()
            } else {
                CANDLE_DOWN.filled()
            };
            let x = i as f64;
            Rectangle::new([(x - 0.35, 0.0), (x + 0.35, c.volume)], style)
        }))
        .map_err(chart_error)?;

    Ok(())
}

fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(pixels, width, height, ColorType::Rgb8)
        .map_err(chart_error)?;
    Ok(png)
}

fn chart_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Chart(e.to_string())
}
