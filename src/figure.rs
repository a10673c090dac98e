use crate::data::model::{HeatmapMatrix, ModuleId};

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    MissingFile,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    Heatmap(HeatmapMatrix),
    /// Disabled panel: title only, no axes.
    Unavailable(UnavailableReason),
}

/// One grid cell of a layer figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub module: ModuleId,
    pub content: PanelContent,
}

impl Panel {
    pub fn new(module: ModuleId, content: PanelContent) -> Self {
        Panel { module, content }
    }

    pub fn title(&self) -> String {
        let label = self.module.label();
        match self.content {
            PanelContent::Heatmap(_) => format!("Module: {label}"),
            PanelContent::Unavailable(UnavailableReason::MissingFile) => {
                format!("Module: {label} - FILE NOT FOUND")
            }
            PanelContent::Unavailable(UnavailableReason::Error) => {
                format!("Module: {label} - ERROR")
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.content, PanelContent::Heatmap(_))
    }
}

// ---------------------------------------------------------------------------
// Grid placement
// ---------------------------------------------------------------------------

/// Rows × columns of the panel grid. Panels fill it row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    /// Smallest near-square grid holding `n` panels; four panels give 2×2.
    pub fn for_panels(n: usize) -> Self {
        let n = n.max(1);
        let mut cols = 1;
        while cols * cols < n {
            cols += 1;
        }
        GridShape {
            rows: n.div_ceil(cols),
            cols,
        }
    }

    /// (row, col) of the `index`-th panel.
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }
}

// ---------------------------------------------------------------------------
// LayerFigure
// ---------------------------------------------------------------------------

/// Everything needed to draw one layer's composite image. Built in one pass
/// and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerFigure {
    layer: usize,
    grid: GridShape,
    panels: Vec<Panel>,
}

impl LayerFigure {
    pub fn new(layer: usize, panels: Vec<Panel>) -> Self {
        LayerFigure {
            layer,
            grid: GridShape::for_panels(panels.len()),
            panels,
        }
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn title(&self) -> String {
        format!("Dominant Eigenvector Heatmaps for Layer {}", self.layer)
    }

    pub fn grid(&self) -> GridShape {
        self.grid
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// True when every panel holds a heatmap.
    pub fn is_complete(&self) -> bool {
        self.panels.iter().all(Panel::is_available)
    }

    pub fn unavailable_modules(&self) -> Vec<&ModuleId> {
        self.panels
            .iter()
            .filter(|p| !p.is_available())
            .map(|p| &p.module)
            .collect()
    }
}
