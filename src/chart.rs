//! SVG line charts for timing and speedup tables.

use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use thiserror::Error;
use tracing::info;

use crate::config::ChartConfig;
use crate::table::{PolicySeries, SpeedupTable, TableError, TimingTable};
use crate::types::ThreadCount;

const LINE_WIDTH: u32 = 2;
const MARKER_RADIUS: u32 = 4;
const IDEAL_COLOR: RGBColor = RGBColor(128, 128, 128);

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to prepare chart output: {0}")]
    Io(#[from] std::io::Error),
    #[error("chart backend error: {0}")]
    Backend(String),
    #[error("nothing to plot")]
    Empty,
    #[error("speedup table rows do not match the timing table")]
    Mismatch,
    #[error(transparent)]
    Table(#[from] TableError),
}

impl<E> From<DrawingAreaErrorKind<E>> for ChartError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        ChartError::Backend(err.to_string())
    }
}

/// Paths of the files written by [`render_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCharts {
    pub time: PathBuf,
    pub speedup: PathBuf,
}

/// Axis and caption text for one chart.
struct Frame<'a> {
    title: &'a str,
    y_desc: &'a str,
    y_max: f64,
}

/// Dashed reference line drawn after the policy series.
struct Reference<'a> {
    label: &'a str,
    values: Vec<f64>,
}

pub fn render_time_chart(
    table: &TimingTable,
    config: &ChartConfig,
    path: &Path,
) -> Result<(), ChartError> {
    let root = SVGBackend::new(path, (config.width, config.height)).into_drawing_area();
    let frame = Frame {
        title: &config.labels.time_title,
        y_desc: &config.labels.time_axis,
        y_max: table.max_time(),
    };
    draw_chart(&root, config, &frame, table.threads(), table.series(), None)?;
    root.present()?;
    info!(path = %path.display(), "wrote execution time chart");
    Ok(())
}

pub fn render_speedup_chart(
    speedup: &SpeedupTable,
    config: &ChartConfig,
    path: &Path,
) -> Result<(), ChartError> {
    let root = SVGBackend::new(path, (config.width, config.height)).into_drawing_area();
    let ideal = speedup.ideal();
    let frame = Frame {
        title: &config.labels.speedup_title,
        y_desc: &config.labels.speedup_axis,
        y_max: ideal.iter().copied().fold(speedup.max_speedup(), f64::max),
    };
    let reference = Reference {
        label: &config.labels.ideal,
        values: ideal,
    };
    draw_chart(
        &root,
        config,
        &frame,
        speedup.threads(),
        speedup.series(),
        Some(reference),
    )?;
    root.present()?;
    info!(path = %path.display(), "wrote speedup chart");
    Ok(())
}

/// Writes both charts into the configured output directory.
///
/// `speedup` must be derived from `table`; it is passed in so callers that
/// also report it compute it once.
pub fn render_all(
    table: &TimingTable,
    speedup: &SpeedupTable,
    config: &ChartConfig,
) -> Result<RenderedCharts, ChartError> {
    if speedup.threads() != table.threads() {
        return Err(ChartError::Mismatch);
    }

    std::fs::create_dir_all(&config.output_dir)?;
    let charts = RenderedCharts {
        time: config.time_path(),
        speedup: config.speedup_path(),
    };
    render_time_chart(table, config, &charts.time)?;
    render_speedup_chart(speedup, config, &charts.speedup)?;
    Ok(charts)
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    config: &ChartConfig,
    frame: &Frame<'_>,
    threads: &[ThreadCount],
    lines: &[PolicySeries],
    reference: Option<Reference<'_>>,
) -> Result<(), ChartError> {
    let (Some(first), Some(last)) = (threads.first(), threads.last()) else {
        return Err(ChartError::Empty);
    };

    root.fill(&WHITE)?;

    let ticks: Vec<f64> = threads.iter().map(|t| *t as f64).collect();
    let x_range = *first as f64 - 0.5..*last as f64 + 0.5;
    let y_range = 0.0..frame.y_max * 1.05;
    // One candidate tick per integer keeps the key point step at 1, so every
    // measured thread count gets a tick; the formatter hides the rest.
    let x_ticks = last - first + 1;

    let mut chart = ChartBuilder::on(root)
        .caption(frame.title, ("sans-serif", 22))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(64)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(config.labels.threads_axis.as_str())
        .y_desc(frame.y_desc)
        .x_labels(x_ticks)
        .x_label_formatter(&|x| thread_tick_label(threads, *x))
        .y_label_formatter(&|y| format!("{y:.1}"))
        .draw()?;

    // Label-only entry so the legend opens with its title.
    chart
        .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?
        .label(config.labels.legend_title.as_str())
        .legend(|(x, y)| EmptyElement::at((x, y)));

    for (idx, column) in lines.iter().enumerate() {
        let style = Palette99::pick(idx).stroke_width(LINE_WIDTH);
        let points: Vec<(f64, f64)> = ticks
            .iter()
            .copied()
            .zip(column.times.iter().copied())
            .collect();

        chart
            .draw_series(LineSeries::new(points.iter().copied(), style))?
            .label(column.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        chart.draw_series(
            points
                .iter()
                .map(|point| Circle::new(*point, MARKER_RADIUS, style.filled())),
        )?;
    }

    if let Some(reference) = reference {
        let style = IDEAL_COLOR.stroke_width(LINE_WIDTH);
        let points: Vec<(f64, f64)> = ticks.iter().copied().zip(reference.values).collect();
        chart
            .draw_series(DashedLineSeries::new(points, 10, 6, style))?
            .label(reference.label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

/// Label for an x key point, empty unless it is a measured thread count.
fn thread_tick_label(threads: &[ThreadCount], x: f64) -> String {
    let rounded = x.round();
    if rounded < 0.0 || (x - rounded).abs() > 1e-6 {
        return String::new();
    }
    let count = rounded as ThreadCount;
    if threads.contains(&count) {
        count.to_string()
    } else {
        String::new()
    }
}
