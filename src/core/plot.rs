//! Static trajectory charts: height vs. time above distance vs. time.

use std::error::Error;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use crate::core::ballistics::{Trajectory, TrajectorySample};
use crate::core::error::{AnalyzerError, Result};
use crate::core::window::AxisWindow;

const CHART_SIZE: (u32, u32) = (1000, 600);
const HEIGHT_COLOR: RGBColor = RGBColor(31, 119, 180);
const DISTANCE_COLOR: RGBColor = RGBColor(214, 39, 40);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Png,
    Svg,
}

impl ChartKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => Ok(Self::Png),
            Some("svg") => Ok(Self::Svg),
            _ => Err(AnalyzerError::invalid(format!(
                "plot file must end in .png or .svg: {}",
                path.display()
            ))),
        }
    }
}

/// `trajectory_<label>_<YYYYmmdd-HHMMSS>.png`
pub fn default_plot_path<Tz>(label: usize, at: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    PathBuf::from(format!(
        "trajectory_{label}_{}.png",
        at.format("%Y%m%d-%H%M%S")
    ))
}

pub fn render_trajectory_chart(trajectory: &Trajectory, label: usize, path: &Path) -> Result<()> {
    let kind = ChartKind::from_path(path)?;
    let samples: Vec<TrajectorySample> = trajectory.iter().collect();
    let summary = trajectory.summary();
    let caption = format!(
        "Projectile {label}: {} m/s at {} deg",
        summary.speed_mps, summary.angle_deg
    );

    let drawn = match kind {
        ChartKind::Png => draw_trajectory_charts(
            BitMapBackend::new(path, CHART_SIZE).into_drawing_area(),
            &samples,
            &caption,
        ),
        ChartKind::Svg => draw_trajectory_charts(
            SVGBackend::new(path, CHART_SIZE).into_drawing_area(),
            &samples,
            &caption,
        ),
    };
    drawn.map_err(|e| AnalyzerError::Plot(e.to_string()))?;

    info!(path = %path.display(), samples = samples.len(), "rendered trajectory chart");
    Ok(())
}

fn draw_trajectory_charts<DB>(
    root: DrawingArea<DB, Shift>,
    samples: &[TrajectorySample],
    caption: &str,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let root = root.titled(caption, ("sans-serif", 26))?;
    let panels = root.split_evenly((2, 1));

    let max_time = samples.last().map(|s| s.time_s).unwrap_or(0.0);
    let min_height = samples.iter().map(|s| s.height_m).fold(0.0, f64::min);
    let max_height = samples.iter().map(|s| s.height_m).fold(0.0, f64::max);
    let max_distance = samples.iter().map(|s| s.distance_m).fold(0.0, f64::max);

    draw_time_series(
        &panels[0],
        samples,
        |s| s.height_m,
        AxisWindow::padded(max_time, min_height, max_height),
        ("Height", "Height (meters)"),
        HEIGHT_COLOR,
    )?;
    draw_time_series(
        &panels[1],
        samples,
        |s| s.distance_m,
        AxisWindow::padded(max_time, 0.0, max_distance),
        ("Distance", "Distance (meters)"),
        DISTANCE_COLOR,
    )?;

    root.present()?;
    Ok(())
}

fn draw_time_series<DB>(
    area: &DrawingArea<DB, Shift>,
    samples: &[TrajectorySample],
    value: fn(&TrajectorySample) -> f64,
    window: AxisWindow,
    (series_label, y_desc): (&str, &str),
    color: RGBColor,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(0.0..window.x_max, window.y_min..window.y_max)?;

    chart
        .configure_mesh()
        .x_desc("Time (seconds)")
        .y_desc(y_desc)
        .x_label_formatter(&|v| format!("{v:.1}"))
        .y_label_formatter(&|v| format!("{v:.1}"))
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            samples.iter().map(|s| (s.time_s, value(s))),
            color.stroke_width(2),
        ))?
        .label(series_label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], &color));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}
