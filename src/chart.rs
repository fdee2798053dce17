//! Ranked bar charts of the most contacted ports.
//!
//! [`render_top_ports`] decides what to draw and where; a [`ChartBackend`]
//! does the drawing. [`PngBackend`] is the one used by the binary.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::{error, info};

use crate::error::{ReportError, Result};
use crate::models::domain::{PortCount, Protocol, ProtocolSummary};

pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_OUTPUT_DIR: &str = "plots";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub top_n: usize,
    pub output_dir: PathBuf,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarChart {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub color: (u8, u8, u8),
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn top_ports(device_name: &str, protocol: Protocol, top_n: usize, ports: &[PortCount]) -> Self {
        BarChart {
            title: format!("{} - Top {} {} Ports", device_name, top_n, protocol.label()),
            x_desc: format!("{} Destination Port", protocol.label()),
            y_desc: "Connection Count".to_string(),
            color: protocol.color(),
            bars: ports
                .iter()
                .map(|p| Bar {
                    label: p.port.to_string(),
                    value: p.count,
                })
                .collect(),
        }
    }
}

pub trait ChartBackend {
    /// Write `chart` to `path`, replacing any existing file.
    fn draw(&self, chart: &BarChart, path: &Path) -> Result<()>;
}

/// PNG output through plotters' bitmap backend.
pub struct PngBackend {
    pub width: u32,
    pub height: u32,
}

impl Default for PngBackend {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
        }
    }
}

/// Top of the y axis: tallest bar plus a tenth of headroom, at least 1.
pub fn y_upper_bound(bars: &[Bar]) -> u64 {
    let max = bars.iter().map(|b| b.value).max().unwrap_or(0).max(1);
    max.saturating_add(max / 10).saturating_add(1)
}

fn render_err<E: Display>(path: &Path) -> impl Fn(E) -> ReportError + '_ {
    move |e| ReportError::Render {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

impl ChartBackend for PngBackend {
    fn draw(&self, chart: &BarChart, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err(path))?;

        let n = chart.bars.len();
        let labels: Vec<&str> = chart.bars.iter().map(|b| b.label.as_str()).collect();
        let (r, g, b) = chart.color;
        let fill = RGBColor(r, g, b);

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(70)
            .y_label_area_size(70)
            .build_cartesian_2d((0..n).into_segmented(), 0u64..y_upper_bound(&chart.bars))
            .map_err(render_err(path))?;

        // ports are categories, one slot per bar
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc(chart.x_desc.as_str())
            .y_desc(chart.y_desc.as_str())
            .x_labels(n)
            .x_label_formatter(&|v: &SegmentValue<usize>| match v {
                SegmentValue::CenterOf(i) => labels.get(*i).map(|s| s.to_string()).unwrap_or_default(),
                _ => String::new(),
            })
            .x_label_style(
                ("sans-serif", 14)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .draw()
            .map_err(render_err(path))?;

        ctx.draw_series(
            Histogram::vertical(&ctx)
                .style(fill.filled())
                .margin(8)
                .data(chart.bars.iter().enumerate().map(|(i, bar)| (i, bar.value))),
        )
        .map_err(render_err(path))?;

        root.present().map_err(render_err(path))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Saved(PathBuf),
    Empty,
    Malformed(String),
}

/// `{device}_{protocol}_top{N}.png`, spaces and path separators turned into
/// underscores.
pub fn chart_file_name(device_name: &str, protocol: Protocol, top_n: usize) -> String {
    let device: String = device_name
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    format!("{}_{}_top{}.png", device, protocol.as_str(), top_n)
}

/// Chart the first `top_n` ports of `summary` in the order given.
///
/// An empty summary logs and returns [`RenderOutcome::Empty`]. A summary
/// whose entries failed validation logs an error and returns
/// [`RenderOutcome::Malformed`]; neither writes a file.
pub fn render_top_ports(
    summary: &ProtocolSummary,
    protocol: Protocol,
    device_name: &str,
    options: &RenderOptions,
    backend: &dyn ChartBackend,
) -> Result<RenderOutcome> {
    let ports = match summary.top(options.top_n) {
        Ok(ports) => ports,
        Err(reason) => {
            error!(
                "Skipping {} ports for {}: {}",
                protocol.label(),
                device_name,
                reason
            );
            return Ok(RenderOutcome::Malformed(reason.to_string()));
        }
    };
    if ports.is_empty() {
        info!("No {} ports to plot for {}", protocol.label(), device_name);
        return Ok(RenderOutcome::Empty);
    }

    let chart = BarChart::top_ports(device_name, protocol, options.top_n, ports);

    fs::create_dir_all(&options.output_dir).map_err(|source| ReportError::OutputDir {
        path: options.output_dir.clone(),
        source,
    })?;
    let path = options
        .output_dir
        .join(chart_file_name(device_name, protocol, options.top_n));
    backend.draw(&chart, &path)?;

    info!(success = true, "Plot saved to {}", path.display());
    Ok(RenderOutcome::Saved(path))
}
