use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::figure::UnavailableReason;

// ---------------------------------------------------------------------------
// Per-module failures
// ---------------------------------------------------------------------------

/// Why one module's CSV could not be turned into a heatmap.
///
/// None of these abort a run: they disable a single panel and keep the
/// layer from being saved.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("file not found: {}", .path.display())]
    MissingFile { path: PathBuf },

    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data in {}: {reason}", .path.display())]
    MalformedData { path: PathBuf, reason: String },
}

impl ModuleError {
    pub fn malformed(path: &Path, reason: impl ToString) -> Self {
        ModuleError::MalformedData {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Placeholder shown in the panel for this failure.
    pub fn reason(&self) -> UnavailableReason {
        match self {
            ModuleError::MissingFile { .. } => UnavailableReason::MissingFile,
            ModuleError::Unreadable { .. } | ModuleError::MalformedData { .. } => {
                UnavailableReason::Error
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pivot failures
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PivotError {
    #[error("no data rows")]
    Empty,

    /// The same (component, eigenvector) cell appears more than once.
    /// Rejected outright, even when the values agree.
    #[error("duplicate entry for component_idx={component_idx}, eigenvector_idx={eigenvector_idx}")]
    Duplicate {
        component_idx: i64,
        eigenvector_idx: i64,
    },
}

// ---------------------------------------------------------------------------
// Configuration failures (fatal)
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least one module id is required")]
    NoModules,

    #[error("module id '{0}' is invalid (must be non-empty and contain no path separators)")]
    InvalidModuleId(String),

    #[error("module id '{0}' is listed more than once")]
    DuplicateModule(String),

    #[error("canvas {width}x{height} is too small (minimum {min}x{min})")]
    CanvasTooSmall { width: u32, height: u32, min: u32 },
}
