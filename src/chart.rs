//! Chart rendering.
//!
//! The application only needs "time series in, image out", so the
//! renderer sits behind a trait. The shipped implementation draws an
//! SVG line chart and has no opinions about what the series mean.

use anyhow::Result;
use chrono::NaiveDate;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

pub trait ChartRenderer: Send + Sync {
    fn render(&self, title: &str, series: &[ChartSeries]) -> Result<RenderedChart>;
}

const PALETTE: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
];

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 170.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 55.0;

pub struct SvgRenderer {
    width: u32,
    height: u32,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::with_size(1000, 600)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl ChartRenderer for SvgRenderer {
    fn render(&self, title: &str, series: &[ChartSeries]) -> Result<RenderedChart> {
        let w = self.width as f64;
        let h = self.height as f64;
        let plot_w = w - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = h - MARGIN_TOP - MARGIN_BOTTOM;

        let mut svg = String::new();
        write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
            w = self.width,
            h = self.height,
        )?;
        write!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
        write!(
            svg,
            r#"<text x="{x:.1}" y="28" text-anchor="middle" font-size="18">{title}</text>"#,
            x = w / 2.0,
            title = xml_escape(title),
        )?;

        let points: Vec<&SeriesPoint> = series.iter().flat_map(|s| &s.points).collect();
        if points.is_empty() {
            write!(
                svg,
                r##"<text x="{x:.1}" y="{y:.1}" text-anchor="middle" font-size="14" fill="#666">no data for the selected range</text>"##,
                x = w / 2.0,
                y = h / 2.0,
            )?;
            svg.push_str("</svg>");
            return Ok(RenderedChart {
                bytes: svg.into_bytes(),
                mime: "image/svg+xml",
            });
        }

        let min_date = points.iter().map(|p| p.date).min().unwrap_or_default();
        let max_date = points.iter().map(|p| p.date).max().unwrap_or_default();
        let span_days = ((max_date - min_date).num_days()).max(1) as f64;

        let mut vmin = f64::INFINITY;
        let mut vmax = f64::NEG_INFINITY;
        for p in &points {
            vmin = vmin.min(p.value);
            vmax = vmax.max(p.value);
        }
        // Pad the value axis so lines do not hug the frame; a flat
        // series still needs a non-zero span.
        let pad = if vmax > vmin { (vmax - vmin) * 0.05 } else { 1.0 };
        let vmin = vmin - pad;
        let vmax = vmax + pad;

        let x = |date: NaiveDate| -> f64 {
            MARGIN_LEFT + (date - min_date).num_days() as f64 / span_days * plot_w
        };
        let y = |value: f64| -> f64 { MARGIN_TOP + (vmax - value) / (vmax - vmin) * plot_h };

        // Frame and horizontal grid with value labels.
        write!(
            svg,
            r##"<rect x="{x:.1}" y="{y:.1}" width="{pw:.1}" height="{ph:.1}" fill="none" stroke="#ccc"/>"##,
            x = MARGIN_LEFT,
            y = MARGIN_TOP,
            pw = plot_w,
            ph = plot_h,
        )?;
        for i in 0..=5 {
            let value = vmin + (vmax - vmin) * f64::from(i) / 5.0;
            let gy = y(value);
            write!(
                svg,
                r##"<line x1="{x1:.1}" y1="{gy:.1}" x2="{x2:.1}" y2="{gy:.1}" stroke="#eee"/>"##,
                x1 = MARGIN_LEFT,
                x2 = MARGIN_LEFT + plot_w,
            )?;
            write!(
                svg,
                r##"<text x="{x:.1}" y="{y:.1}" text-anchor="end" font-size="11" fill="#333">{value:.1}%</text>"##,
                x = MARGIN_LEFT - 8.0,
                y = gy + 4.0,
            )?;
        }

        // Date labels along the bottom edge.
        for i in 0..=5 {
            let date = min_date + chrono::Duration::days((span_days * f64::from(i) / 5.0) as i64);
            let gx = x(date);
            write!(
                svg,
                r##"<line x1="{gx:.1}" y1="{y1:.1}" x2="{gx:.1}" y2="{y2:.1}" stroke="#ccc"/>"##,
                y1 = MARGIN_TOP + plot_h,
                y2 = MARGIN_TOP + plot_h + 5.0,
            )?;
            write!(
                svg,
                r##"<text x="{gx:.1}" y="{y:.1}" text-anchor="middle" font-size="11" fill="#333">{label}</text>"##,
                y = MARGIN_TOP + plot_h + 20.0,
                label = date.format("%d.%m.%Y"),
            )?;
        }

        // One polyline and one legend entry per series.
        for (i, s) in series.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];

            if !s.points.is_empty() {
                let mut path = String::new();
                for p in &s.points {
                    write!(path, "{:.1},{:.1} ", x(p.date), y(p.value))?;
                }
                write!(
                    svg,
                    r#"<polyline points="{points}" fill="none" stroke="{color}" stroke-width="1.5"/>"#,
                    points = path.trim_end(),
                )?;
            }

            let ly = MARGIN_TOP + 14.0 + i as f64 * 18.0;
            write!(
                svg,
                r#"<rect x="{x:.1}" y="{y:.1}" width="10" height="10" fill="{color}"/>"#,
                x = w - MARGIN_RIGHT + 16.0,
                y = ly - 9.0,
            )?;
            write!(
                svg,
                r##"<text x="{x:.1}" y="{ly:.1}" font-size="12" fill="#333">{label}</text>"##,
                x = w - MARGIN_RIGHT + 32.0,
                label = xml_escape(&s.label),
            )?;
        }

        svg.push_str("</svg>");
        Ok(RenderedChart {
            bytes: svg.into_bytes(),
            mime: "image/svg+xml",
        })
    }
}
