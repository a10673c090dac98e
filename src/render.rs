use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::color::ColorScale;
use crate::data::model::HeatmapMatrix;
use crate::figure::{LayerFigure, Panel, PanelContent};

type DrawResult<DB> =
    std::result::Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

const FONT: &str = "sans-serif";
const MAX_TICKS: usize = 12;
const BAR_STEPS: usize = 128;
const LABEL_SIZE: i32 = 18;
const DESC_SIZE: i32 = 20;
// Label area + bar + right margin.
const BAR_AREA_WIDTH: i32 = 140;

// ---------------------------------------------------------------------------
// Renderer seam
// ---------------------------------------------------------------------------

/// Turns a finished [`LayerFigure`] into pixels.
pub trait FigureRenderer {
    fn render(&self, figure: &LayerFigure) -> Result<RgbImage>;
}

/// Draws figures with plotters into an in-memory RGB buffer.
#[derive(Debug, Clone, Copy)]
pub struct PlottersRenderer {
    width: u32,
    height: u32,
}

impl PlottersRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        PlottersRenderer { width, height }
    }
}

impl FigureRenderer for PlottersRenderer {
    fn render(&self, figure: &LayerFigure) -> Result<RgbImage> {
        let mut buffer = vec![0u8; self.width as usize * self.height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (self.width, self.height))
                .into_drawing_area();
            draw_figure(&root, figure)
                .map_err(|e| anyhow!("drawing layer {}: {e}", figure.layer()))?;
            root.present()
                .map_err(|e| anyhow!("finishing layer {}: {e}", figure.layer()))?;
        }
        RgbImage::from_raw(self.width, self.height, buffer)
            .context("pixel buffer does not match canvas size")
    }
}

// ---------------------------------------------------------------------------
// Figure layout
// ---------------------------------------------------------------------------

fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &LayerFigure,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    // Title band above the grid.
    let body = root.titled(&figure.title(), (FONT, 40).into_font())?;
    let grid = figure.grid();
    let cells = body.split_evenly((grid.rows, grid.cols));

    for (i, panel) in figure.panels().iter().enumerate() {
        let (row, col) = grid.position(i);
        if let Some(area) = cells.get(row * grid.cols + col) {
            draw_panel(area, panel)?;
        }
    }
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
) -> DrawResult<DB> {
    match &panel.content {
        PanelContent::Heatmap(matrix) => draw_heatmap_panel(area, &panel.title(), matrix),
        PanelContent::Unavailable(_) => {
            area.titled(&panel.title(), (FONT, 24).into_font())?;
            Ok(())
        }
    }
}

fn draw_heatmap_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    matrix: &HeatmapMatrix,
) -> DrawResult<DB> {
    let scale = ColorScale::from_range(matrix.value_range());
    let (width, _) = area.dim_in_pixel();
    let (plot_area, bar_area) = area.split_horizontally((width as i32 - BAR_AREA_WIDTH).max(0));

    let rows = matrix.rows();
    let cols = matrix.cols();
    let row_labels = matrix.row_labels();
    let col_labels = matrix.col_labels();

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(title, (FONT, 30).into_font())
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(cell_axis(cols), cell_axis(rows))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(cols.min(MAX_TICKS))
        .y_labels(rows.min(MAX_TICKS))
        .x_label_formatter(&|x| tick_label(col_labels, *x, false))
        .y_label_formatter(&|y| tick_label(row_labels, *y, true))
        .label_style((FONT, LABEL_SIZE).into_font())
        .axis_desc_style((FONT, DESC_SIZE).into_font())
        .x_desc("Eigenvector Index")
        .y_desc("Component Index")
        .draw()?;

    chart.draw_series(cell_rects(matrix, &scale))?;

    draw_color_bar(&bar_area, &scale)
}

/// Chart range for `n` cells. Cell `k` spans `k - 0.5..k + 0.5`, so integral
/// ticks fall on cell centres.
fn cell_axis(n: usize) -> std::ops::Range<f64> {
    -0.5..n as f64 - 0.5
}

/// Tick text for the cell centred at `pos`. Rows are drawn top-down, so the
/// y axis counts from the bottom row.
fn tick_label(labels: &[i64], pos: f64, flipped: bool) -> String {
    if (pos - pos.round()).abs() > 1e-9 || pos < -1e-9 {
        return String::new();
    }
    let k = pos.round() as usize;
    if k >= labels.len() {
        return String::new();
    }
    let idx = if flipped { labels.len() - 1 - k } else { k };
    labels[idx].to_string()
}

fn draw_color_bar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    scale: &ColorScale,
) -> DrawResult<DB> {
    let (lo, hi) = (scale.min(), scale.max());
    let mut bar = ChartBuilder::on(area)
        .margin_top(60)
        .margin_bottom(70)
        .margin_right(10)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..1f64, lo..hi)?;

    bar.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_labels(6)
        .y_label_formatter(&|v| format!("{v:.3}"))
        .label_style((FONT, LABEL_SIZE).into_font())
        .axis_desc_style((FONT, DESC_SIZE).into_font())
        .y_desc("Value")
        .draw()?;

    let step = (hi - lo) / BAR_STEPS as f64;
    bar.draw_series((0..BAR_STEPS).map(|i| {
        let y0 = lo + step * i as f64;
        Rectangle::new(
            [(0.0, y0), (1.0, y0 + step)],
            scale.color_for(y0 + step / 2.0).filled(),
        )
    }))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// One filled unit square per present cell, centred on x = column and
/// y = rows - 1 - row (row 0 on top). Gaps yield nothing.
fn cell_rects<'a>(
    matrix: &'a HeatmapMatrix,
    scale: &'a ColorScale,
) -> impl Iterator<Item = Rectangle<(f64, f64)>> + 'a {
    let rows = matrix.rows();
    (0..rows).flat_map(move |r| {
        (0..matrix.cols()).filter_map(move |c| {
            let value = matrix.get(r, c)?;
            let x = c as f64;
            let y = (rows - 1 - r) as f64;
            Some(Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                scale.color_for(value).filled(),
            ))
        })
    })
}
