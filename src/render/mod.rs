// src/render/mod.rs

pub mod style;

use crate::analyze::fit_line;
use crate::error::{Error, Result};
use crate::normalize::{NormalizedTable, NumericColumn};
use base64::{engine::general_purpose, Engine as _};
use image::{codecs::jpeg::JpegEncoder, RgbImage};
use once_cell::sync::Lazy;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use std::fmt::Display;
pub use style::{parse_color, LineStyle};
use tracing::{debug, info, warn};

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 600;
/// Samples along the regression line; dashed rendering draws every other gap.
const LINE_SAMPLES: usize = 100;

/// Family every chart label is drawn with. Registered under plotters' default name so
/// mesh labels that don't set a family resolve too.
const CHART_FONT: &str = "sans-serif";
static CHART_FONT_TTF: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

static FONT_REGISTERED: Lazy<std::result::Result<(), String>> = Lazy::new(|| {
    register_font(CHART_FONT, FontStyle::Normal, CHART_FONT_TTF)
        .map_err(|_| "embedded chart font is not a valid TrueType file".to_string())
});

/// JPEG qualities tried in order until one fits the byte budget.
pub const QUALITY_LEVELS: [u8; 5] = [95, 85, 75, 65, 55];

/// 1×1 transparent PNG returned when there is nothing to plot.
const PLACEHOLDER_PNG: &[u8] = &[
    137, 80, 78, 71, 13, 10, 26, 10, 0, 0, 0, 13, 73, 72, 68, 82, 0, 0, 0, 1, 0, 0, 0, 1, 8, 6,
    0, 0, 0, 31, 21, 196, 137, 0, 0, 0, 13, 73, 68, 65, 84, 120, 218, 99, 100, 96, 248, 95, 15,
    0, 2, 135, 1, 128, 235, 71, 186, 146, 0, 0, 0, 0, 73, 69, 78, 68, 174, 66, 96, 130,
];

/// An encoded image and its MIME type.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartArtifact {
    mime_type: &'static str,
    bytes: Vec<u8>,
}

impl ChartArtifact {
    pub fn placeholder() -> Self {
        Self {
            mime_type: "image/png",
            bytes: PLACEHOLDER_PNG.to_vec(),
        }
    }

    fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            mime_type: "image/jpeg",
            bytes,
        }
    }

    pub fn mime_type(&self) -> &str {
        self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_placeholder(&self) -> bool {
        self.bytes == PLACEHOLDER_PNG
    }

    /// `data:<mime>;base64,<payload>`, ready to drop into a JSON answer.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Scatter `y` against `x` with a least-squares line, encoded to at most `max_bytes`
/// where the quality ladder allows it.
///
/// Never fails: with fewer than two points, or if drawing breaks, the placeholder
/// image comes back instead.
pub fn render_scatter_with_regression(
    table: &NormalizedTable,
    x: NumericColumn,
    y: NumericColumn,
    line_color: &str,
    line_style: &str,
    max_bytes: usize,
) -> ChartArtifact {
    let points = table.pairs(x, y);
    if points.len() < 2 {
        warn!(%x, %y, points = points.len(), "insufficient data for plotting");
        return ChartArtifact::placeholder();
    }

    let color = parse_color(line_color);
    let style = LineStyle::from_name(line_style);
    let drawn = ensure_font().and_then(|_| draw_chart(&points, x, y, color, style, CHART_FONT));
    finish_render(x, y, drawn, max_bytes)
}

/// Encode a drawn chart, or swap in the placeholder if drawing or encoding failed.
fn finish_render(
    x: NumericColumn,
    y: NumericColumn,
    drawn: Result<RgbImage>,
    max_bytes: usize,
) -> ChartArtifact {
    match drawn.and_then(|img| encode_within_budget(&img, max_bytes)) {
        Ok(bytes) => {
            info!(%x, %y, bytes = bytes.len(), max_bytes, "rendered chart");
            ChartArtifact::jpeg(bytes)
        }
        Err(e) => {
            warn!(error = %e, "chart rendering failed; returning placeholder");
            ChartArtifact::placeholder()
        }
    }
}

fn ensure_font() -> Result<()> {
    FONT_REGISTERED.clone().map_err(Error::Render)
}

fn render_err<E: Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

/// Value range with a 5% margin; a zero-width range is widened by one unit.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let span = hi - lo;
    if span <= f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    (lo - span * 0.05, hi + span * 0.05)
}

fn draw_chart(
    points: &[(f64, f64)],
    x: NumericColumn,
    y: NumericColumn,
    color: RGBColor,
    style: LineStyle,
    font: &str,
) -> Result<RgbImage> {
    let (slope, intercept) = fit_line(points);
    let (x_min, x_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.0), hi.max(p.0))
        });
    let step = (x_max - x_min) / (LINE_SAMPLES - 1) as f64;
    let line: Vec<(f64, f64)> = (0..LINE_SAMPLES)
        .map(|i| {
            let lx = x_min + step * i as f64;
            (lx, slope * lx + intercept)
        })
        .collect();

    let x_range = padded_range(points.iter().map(|p| p.0));
    let y_range = padded_range(points.iter().chain(line.iter()).map(|p| p.1));

    let mut buf = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("{x} vs {y} with Regression Line"), (font, 24))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_desc(x.to_string())
            .y_desc(y.to_string())
            .label_style((font, 14))
            .axis_desc_style((font, 16))
            .light_line_style(BLACK.mix(0.05))
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(
                points
                    .iter()
                    .map(|&p| Circle::new(p, 5, BLUE.mix(0.7).filled())),
            )
            .map_err(render_err)?;

        match style {
            LineStyle::Solid => {
                chart
                    .draw_series(LineSeries::new(line, color.stroke_width(2)))
                    .map_err(render_err)?;
            }
            LineStyle::Dashed => {
                chart
                    .draw_series(
                        line.windows(2)
                            .step_by(2)
                            .map(|seg| PathElement::new(seg.to_vec(), color.stroke_width(2))),
                    )
                    .map_err(render_err)?;
            }
        }

        root.present().map_err(render_err)?;
    }

    RgbImage::from_raw(WIDTH, HEIGHT, buf)
        .ok_or_else(|| Error::Render("bitmap buffer size mismatch".into()))
}

fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(img)
        .map_err(render_err)?;
    Ok(out)
}

/// Walk [`QUALITY_LEVELS`] and stop at the first encoding within `max_bytes`. If none
/// fits, the smallest encoding seen is returned anyway.
fn encode_within_budget(img: &RgbImage, max_bytes: usize) -> Result<Vec<u8>> {
    let mut smallest: Option<Vec<u8>> = None;
    for quality in QUALITY_LEVELS {
        let bytes = encode_jpeg(img, quality)?;
        debug!(quality, size = bytes.len(), max_bytes, "encoded chart");
        if bytes.len() <= max_bytes {
            return Ok(bytes);
        }
        if smallest.as_ref().map_or(true, |s| bytes.len() < s.len()) {
            smallest = Some(bytes);
        }
    }

    let bytes = smallest.ok_or_else(|| Error::Render("no quality levels".into()))?;
    warn!(
        size = bytes.len(),
        max_bytes, "chart exceeds size budget at lowest quality"
    );
    Ok(bytes)
}
