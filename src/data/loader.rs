use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ModuleError;

use super::model::{ComponentRecord, HeatmapMatrix, ModuleId};
use super::pivot::pivot;

/// Columns every module CSV must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 3] = ["component_idx", "eigenvector_idx", "value"];

// ---------------------------------------------------------------------------
// Naming convention
// ---------------------------------------------------------------------------

/// `<input_dir>/layer_<layer>_<module>.csv`
pub fn module_csv_path(input_dir: &Path, layer: usize, module: &ModuleId) -> PathBuf {
    input_dir.join(format!("layer_{layer}_{module}.csv"))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Read and pivot one module file.
pub fn load_matrix(path: &Path) -> Result<HeatmapMatrix, ModuleError> {
    let records = load_records(path)?;
    pivot(&records).map_err(|e| ModuleError::malformed(path, e))
}

/// CSV layout: header row naming at least [`REQUIRED_COLUMNS`], in any order.
/// `component_idx` and `eigenvector_idx` are integers, `value` is a float
/// and may be left empty.
pub fn load_records(path: &Path) -> Result<Vec<ComponentRecord>, ModuleError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ModuleError::MissingFile {
            path: path.to_path_buf(),
        },
        _ => ModuleError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| ModuleError::malformed(path, format!("reading CSV headers: {e}")))?;
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(ModuleError::malformed(
                path,
                format!("CSV missing '{column}' column"),
            ));
        }
    }

    reader
        .deserialize::<ComponentRecord>()
        .map(|row| row.map_err(|e| ModuleError::malformed(path, e)))
        .collect()
}
