//! Sentiment charts rendered from the results CSV.
//!
//! Three PNGs come out of one results file: a bar chart and a pie chart of
//! the sentiment labels, and a bar chart of the ten most common words.

pub mod canvas;
pub mod font;
pub mod stats;

use std::path::Path;

use ab_glyph::InvalidFont;
use image::{ImageError, Rgb};
use tracing::info;

use crate::results::{self, ResultRecord, ResultsError};
use canvas::{Canvas, BLACK, GRID};
use font::{LABEL_SIZE, TITLE_SIZE};

const BAR_SIZE: (u32, u32) = (1200, 600);
const PIE_SIZE: (u32, u32) = (800, 800);
const PIE_START_DEG: f64 = 140.0;

// viridis / magma samples, dark to light
const VIRIDIS: [Rgb<u8>; 10] = [
    Rgb([68, 1, 84]),
    Rgb([72, 40, 120]),
    Rgb([62, 74, 137]),
    Rgb([49, 104, 142]),
    Rgb([38, 130, 142]),
    Rgb([31, 158, 137]),
    Rgb([53, 183, 121]),
    Rgb([110, 206, 88]),
    Rgb([181, 222, 43]),
    Rgb([253, 231, 37]),
];
const MAGMA: [Rgb<u8>; 10] = [
    Rgb([0, 0, 4]),
    Rgb([24, 15, 61]),
    Rgb([68, 15, 118]),
    Rgb([114, 31, 129]),
    Rgb([158, 47, 127]),
    Rgb([205, 64, 113]),
    Rgb([241, 96, 93]),
    Rgb([253, 150, 104]),
    Rgb([254, 201, 141]),
    Rgb([252, 253, 191]),
];
const PIE_COLORS: [Rgb<u8>; 10] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
    Rgb([148, 103, 189]),
    Rgb([140, 86, 75]),
    Rgb([227, 119, 194]),
    Rgb([127, 127, 127]),
    Rgb([188, 189, 34]),
    Rgb([23, 190, 207]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    SentimentBar,
    SentimentPie,
    WordFrequency,
}

impl ChartKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ChartKind::SentimentBar => "sentiment_bar.png",
            ChartKind::SentimentPie => "sentiment_pie.png",
            ChartKind::WordFrequency => "word_frequency.png",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub png: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ChartSet {
    pub bar: ChartArtifact,
    pub pie: ChartArtifact,
    pub word_frequency: ChartArtifact,
}

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error(transparent)]
    Results(#[from] ResultsError),

    #[error("no reviews to chart: the results file has no rows")]
    NoRecords,

    #[error("failed to encode chart: {0}")]
    Encode(#[from] ImageError),

    #[error("chart font could not be loaded: {0}")]
    Font(#[from] InvalidFont),
}

/// Loads the results CSV at `csv_path` and renders all three charts.
pub fn render(csv_path: &Path) -> Result<ChartSet, ChartError> {
    let records = results::read_results(csv_path)?;
    render_records(&records)
}

pub fn render_records(records: &[ResultRecord]) -> Result<ChartSet, ChartError> {
    if records.is_empty() {
        return Err(ChartError::NoRecords);
    }

    let counts = stats::sentiment_counts(records);
    let words = stats::top_words(records, stats::TOP_WORDS);
    info!(
        "Rendering charts for {} records, {} sentiment categories",
        records.len(),
        counts.len()
    );

    let bar = bar_chart(
        "Overall Sentiment Distribution (Bar Graph)",
        "Sentiment",
        "Number of Reviews",
        &counts,
        &VIRIDIS,
    )?;
    let pie = pie_chart("Sentiment Distribution (Pie Chart)", &counts)?;
    let word_frequency = bar_chart("Most Common Words in Reviews", "Words", "Frequency", &words, &MAGMA)?;

    Ok(ChartSet {
        bar: ChartArtifact {
            kind: ChartKind::SentimentBar,
            png: bar,
        },
        pie: ChartArtifact {
            kind: ChartKind::SentimentPie,
            png: pie,
        },
        word_frequency: ChartArtifact {
            kind: ChartKind::WordFrequency,
            png: word_frequency,
        },
    })
}

/// Spreads `n` colours evenly over a palette.
fn pick_colors(palette: &[Rgb<u8>], n: usize) -> Vec<Rgb<u8>> {
    if n <= 1 {
        return palette.iter().take(n).copied().collect();
    }
    (0..n)
        .map(|i| palette[i * (palette.len() - 1) / (n - 1)])
        .collect()
}

/// Rounds the axis maximum up to a step of 1, 2 or 5 times a power of ten.
fn tick_step(max: usize) -> usize {
    let rough = (max as f64 / 5.0).max(1.0);
    let magnitude = 10f64.powf(rough.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= rough)
        .unwrap_or(rough);
    step.max(1.0) as usize
}

fn bar_chart(
    title: &str,
    x_label: &str,
    y_label: &str,
    bars: &[(String, usize)],
    palette: &[Rgb<u8>],
) -> Result<Vec<u8>, ChartError> {
    let (width, height) = BAR_SIZE;
    let mut canvas = Canvas::new(width, height)?;
    let (left, right, top, bottom) = (90i64, 30i64, 80i64, 90i64);
    let plot_w = (width as i64 - left - right) as u32;
    let plot_h = (height as i64 - top - bottom) as u32;
    let base_y = top + plot_h as i64;

    canvas.text_centered(width as i64 / 2, 20, title, TITLE_SIZE, BLACK);
    canvas.text(10, top - 34, y_label, LABEL_SIZE, BLACK);

    let max = bars.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
    let step = tick_step(max);
    let axis_max = max.div_ceil(step) * step;

    let mut tick = 0;
    while tick <= axis_max {
        let y = base_y - (tick as f64 / axis_max as f64 * plot_h as f64).round() as i64;
        if tick > 0 {
            canvas.hline(left, y, plot_w, GRID);
        }
        let label = tick.to_string();
        let label_w = canvas.text_width(&label, LABEL_SIZE) as i64;
        canvas.text(left - 10 - label_w, y - 10, &label, LABEL_SIZE, BLACK);
        tick += step;
    }

    if !bars.is_empty() {
        let slot = plot_w / bars.len() as u32;
        let bar_w = (slot as f64 * 0.8) as u32;
        let colors = pick_colors(palette, bars.len());
        for (index, ((label, count), color)) in bars.iter().zip(colors).enumerate() {
            let x = left + index as i64 * slot as i64 + ((slot - bar_w) / 2) as i64;
            let bar_h = (*count as f64 / axis_max as f64 * plot_h as f64).round() as u32;
            canvas.fill_rect(x, base_y - bar_h as i64, bar_w, bar_h, color);

            let center = x + bar_w as i64 / 2;
            let count_label = count.to_string();
            canvas.text_centered(center, base_y - bar_h as i64 - 24, &count_label, LABEL_SIZE, BLACK);
            let name = canvas.fit_text(label, LABEL_SIZE, slot.saturating_sub(4));
            canvas.text_centered(center, base_y + 10, &name, LABEL_SIZE, BLACK);
        }
    }

    canvas.hline(left, base_y, plot_w, BLACK);
    canvas.vline(left, top, plot_h + 1, BLACK);
    canvas.text_centered(left + plot_w as i64 / 2, height as i64 - 40, x_label, LABEL_SIZE, BLACK);

    Ok(canvas.into_png()?)
}

fn pie_chart(title: &str, counts: &[(String, usize)]) -> Result<Vec<u8>, ChartError> {
    let (width, height) = PIE_SIZE;
    let mut canvas = Canvas::new(width, height)?;
    canvas.text_centered(width as i64 / 2, 24, title, TITLE_SIZE, BLACK);

    let (cx, cy, radius) = (width as i64 / 2, height as i64 / 2 + 30, 260u32);
    let shares = stats::proportions(counts);
    let colors = PIE_COLORS.iter().cycle();
    let sectors: Vec<(f64, Rgb<u8>)> = shares
        .iter()
        .zip(colors)
        .map(|((_, percent), color)| (percent / 100.0, *color))
        .collect();
    canvas.fill_pie(cx, cy, radius, PIE_START_DEG, &sectors);

    let mut start = PIE_START_DEG;
    for (label, percent) in &shares {
        let sweep = percent / 100.0 * 360.0;
        let mid = (start + sweep / 2.0).to_radians();
        let (dx, dy) = (mid.cos(), -mid.sin());

        let inner = radius as f64 * 0.6;
        let pct = stats::percent_label(*percent);
        canvas.text_centered(
            cx + (dx * inner) as i64,
            cy + (dy * inner) as i64 - 10,
            &pct,
            LABEL_SIZE,
            BLACK,
        );

        let outer = radius as f64 * 1.15;
        canvas.text_centered(
            cx + (dx * outer) as i64,
            cy + (dy * outer) as i64 - 10,
            label,
            LABEL_SIZE,
            BLACK,
        );
        start += sweep;
    }

    Ok(canvas.into_png()?)
}
