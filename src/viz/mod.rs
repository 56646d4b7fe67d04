//! Visualization utilities: render chartable views to **SVG** or **PNG**.
//!
//! - Line charts for period series, bars for categorical series, grouped bars for two metrics
//! - Distinct series colors (Microsoft Office palette)
//! - Y axis scaled to thousands/millions for large amounts
//!
//! Table-only views (ratios, rankings) have no chart and are rejected.

pub mod util;

use crate::views::{ChartKind, View, ViewOutput};
use anyhow::{Context, Result, anyhow, bail};

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontFamily, FontStyle};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use util::{choose_axis_scale, compute_left_label_area_px, office_color, truncate_label, y_tick_label};

/// Fonts tried, in order, when no explicit font file is given.
pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Font file registered as "sans-serif" for the `ab_glyph` text path.
static REGISTERED_FONT: OnceLock<PathBuf> = OnceLock::new();

/// First existing file from [`SYSTEM_FONT_CANDIDATES`].
pub fn find_system_font() -> Option<PathBuf> {
    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

/// Register a "sans-serif" font once per process. `ab_glyph` doesn't discover OS fonts.
pub fn ensure_font(explicit: Option<&Path>) -> Result<()> {
    if REGISTERED_FONT.get().is_some() {
        return Ok(());
    }
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => find_system_font()
            .ok_or_else(|| anyhow!("no TrueType font found; pass one with --font <file.ttf>"))?,
    };
    let bytes = std::fs::read(&path).with_context(|| format!("read font {}", path.display()))?;
    // The plotting backend keeps registered fonts for the life of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    plotters::style::register_font("sans-serif", FontStyle::Normal, bytes)
        .map_err(|_| anyhow!("invalid font {}", path.display()))?;
    log::debug!("registered chart font {}", path.display());
    let _ = REGISTERED_FONT.set(path);
    Ok(())
}

/// Categories along X, one or more value series along Y.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub kind: ChartKind,
    pub x_title: String,
    pub y_title: String,
    pub labels: Vec<String>,
    pub series: Vec<(String, Vec<f64>)>,
}

impl ChartData {
    pub fn from_view(view: View, output: &ViewOutput) -> Result<Self> {
        let kind = view
            .chart_kind()
            .ok_or_else(|| anyhow!("view `{}` is a table and has no chart", view.slug()))?;
        let x_title = |dims: &[crate::models::Dimension]| {
            dims.iter().map(|d| d.column()).collect::<Vec<_>>().join(" / ")
        };
        let data = match output {
            ViewOutput::Series(s) => ChartData {
                title: view.title().to_string(),
                kind,
                x_title: x_title(&s.dimensions),
                y_title: s.measure.column().to_string(),
                labels: s.rows.iter().map(|r| r.key.to_string()).collect(),
                series: vec![(
                    s.measure.column().to_string(),
                    s.rows.iter().map(|r| r.value).collect(),
                )],
            },
            ViewOutput::Dual(d) => ChartData {
                title: view.title().to_string(),
                kind,
                x_title: x_title(&d.dimensions),
                y_title: "amount".to_string(),
                labels: d.rows.iter().map(|r| r.key.to_string()).collect(),
                series: (0..2)
                    .map(|i| {
                        (
                            d.metrics[i].column().to_string(),
                            d.rows.iter().map(|r| r.values[i]).collect(),
                        )
                    })
                    .collect(),
            },
            ViewOutput::Ratio(_) => bail!("ratio tables have no chart"),
        };
        Ok(data)
    }

    /// Y range including zero, padded so bars and lines don't touch the frame.
    pub fn value_range(&self) -> (f64, f64) {
        let values = self.series.iter().flat_map(|(_, v)| v.iter().copied());
        let (mut lo, mut hi) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if (hi - lo).abs() < f64::EPSILON {
            lo -= 1.0;
            hi += 1.0;
        } else {
            let pad = (hi - lo) * 0.05;
            hi += pad;
            if lo < 0.0 {
                lo -= pad;
            }
        }
        (lo, hi)
    }
}

/// Render `output` of `view` to `out_path` (`.svg` → SVG, anything else → PNG).
pub fn plot_view<P: AsRef<Path>>(
    view: View,
    output: &ViewOutput,
    out_path: P,
    width: u32,
    height: u32,
    locale_tag: &str,
    font: Option<&Path>,
) -> Result<()> {
    let data = ChartData::from_view(view, output)?;
    if data.labels.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    ensure_font(font)?;
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, &data, locale_tag)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_chart(root, &data, locale_tag)?;
    }
    Ok(())
}

fn draw_chart<DB>(root: DrawingArea<DB, Shift>, data: &ChartData, locale_tag: &str) -> Result<()>
where
    DB: DrawingBackend,
{
    const MARGIN: u32 = 16;
    const BAR_GROUP_WIDTH: f64 = 0.8;

    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let (min_val, max_val) = data.value_range();
    let (yscale, scale_word) = choose_axis_scale(min_val.abs().max(max_val.abs()));
    let y_axis_title = match scale_word {
        "" => data.y_title.clone(),
        sw => format!("{} ({sw})", data.y_title),
    };

    let n = data.labels.len();
    let labels = &data.labels;
    let x_label_fmt = |x: &f64| {
        let i = x.round();
        if (x - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < labels.len() {
            truncate_label(&labels[i as usize], 14)
        } else {
            String::new()
        }
    };
    let y_label_fmt = |v: &f64| y_tick_label(*v, locale_tag);
    let y_label_count = 10usize;

    let left_label_width_px =
        compute_left_label_area_px(min_val / yscale, max_val / yscale, y_label_count, 12, locale_tag);

    let mut chart = ChartBuilder::on(&root)
        .margin(MARGIN)
        .caption(data.title.as_str(), (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, left_label_width_px)
        .set_label_area_size(LabelAreaPosition::Bottom, 56)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), (min_val / yscale)..(max_val / yscale))
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(data.x_title.as_str())
        .y_desc(y_axis_title)
        .x_labels(n.min(24))
        .y_labels(y_label_count)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let n_series = data.series.len().max(1);
    for (idx, (name, values)) in data.series.iter().enumerate() {
        let color = office_color(idx);
        let scaled: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v / yscale))
            .collect();

        match data.kind {
            ChartKind::Line => {
                chart
                    .draw_series(LineSeries::new(scaled.clone(), color.stroke_width(2)))
                    .map_err(|e| anyhow!("{:?}", e))?
                    .label(name.clone())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
                chart
                    .draw_series(scaled.iter().map(|p| Circle::new(*p, 3, color.filled())))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
            ChartKind::Bar | ChartKind::GroupedBar => {
                let bar_w = BAR_GROUP_WIDTH / n_series as f64;
                let offset = -BAR_GROUP_WIDTH / 2.0 + idx as f64 * bar_w;
                chart
                    .draw_series(scaled.iter().map(|(x, y)| {
                        let x0 = x + offset;
                        Rectangle::new([(x0, 0.0f64.min(*y)), (x0 + bar_w, 0.0f64.max(*y))], color.filled())
                    }))
                    .map_err(|e| anyhow!("{:?}", e))?
                    .label(name.clone())
                    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
            }
        }
    }

    if data.series.len() > 1 {
        chart
            .configure_series_labels()
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .label_font((FontFamily::SansSerif, 14))
            .draw()
            .map_err(|e| anyhow!("{:?}", e))?;
    }

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
