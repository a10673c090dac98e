use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ModuleId – one sub-component of a layer (q, k, v, o, ...)
// ---------------------------------------------------------------------------

/// Identifier of a module within a layer. Its position in the configured
/// module list decides which grid cell it is drawn in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        ModuleId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercased form used in panel titles.
    pub fn label(&self) -> String {
        self.0.to_uppercase()
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The module set used when nothing else is configured.
pub fn default_modules() -> Vec<ModuleId> {
    ["q", "k", "v", "o"].into_iter().map(ModuleId::new).collect()
}

// ---------------------------------------------------------------------------
// ComponentRecord – one CSV row
// ---------------------------------------------------------------------------

/// A single long-format row. An empty `value` cell is kept as `None` and
/// ends up as a gap in the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ComponentRecord {
    pub component_idx: i64,
    pub eigenvector_idx: i64,
    pub value: Option<f64>,
}

// ---------------------------------------------------------------------------
// HeatmapMatrix – pivoted wide form
// ---------------------------------------------------------------------------

/// Dense matrix indexed by component (rows, ascending) and eigenvector
/// (columns, ascending). Cells without a finite value are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapMatrix {
    row_labels: Vec<i64>,
    col_labels: Vec<i64>,
    /// Row-major, `row_labels.len() * col_labels.len()` entries.
    cells: Vec<Option<f64>>,
}

impl HeatmapMatrix {
    pub(crate) fn from_parts(
        row_labels: Vec<i64>,
        col_labels: Vec<i64>,
        cells: Vec<Option<f64>>,
    ) -> Self {
        debug_assert_eq!(cells.len(), row_labels.len() * col_labels.len());
        HeatmapMatrix {
            row_labels,
            col_labels,
            cells,
        }
    }

    pub fn rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn cols(&self) -> usize {
        self.col_labels.len()
    }

    /// Component indices, one per row.
    pub fn row_labels(&self) -> &[i64] {
        &self.row_labels
    }

    /// Eigenvector indices, one per column.
    pub fn col_labels(&self) -> &[i64] {
        &self.col_labels
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        self.cells[row * self.cols() + col]
    }

    /// Min and max over the present cells, `None` when every cell is a gap.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.cells.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}
