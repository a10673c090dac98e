use std::collections::BTreeMap;

use crate::error::PivotError;

use super::model::{ComponentRecord, HeatmapMatrix};

/// Reshape long rows into a [`HeatmapMatrix`].
///
/// * rows are the distinct `component_idx` values, ascending
/// * columns are the distinct `eigenvector_idx` values, ascending
/// * combinations absent from the input, empty values and non-finite values
///   become gaps
/// * a repeated (component, eigenvector) pair is an error, whatever its value
pub fn pivot(records: &[ComponentRecord]) -> Result<HeatmapMatrix, PivotError> {
    if records.is_empty() {
        return Err(PivotError::Empty);
    }

    let mut cells: BTreeMap<(i64, i64), Option<f64>> = BTreeMap::new();
    let mut row_index: BTreeMap<i64, usize> = BTreeMap::new();
    let mut col_index: BTreeMap<i64, usize> = BTreeMap::new();

    for rec in records {
        let key = (rec.component_idx, rec.eigenvector_idx);
        if cells.insert(key, rec.value).is_some() {
            return Err(PivotError::Duplicate {
                component_idx: rec.component_idx,
                eigenvector_idx: rec.eigenvector_idx,
            });
        }
        row_index.insert(rec.component_idx, 0);
        col_index.insert(rec.eigenvector_idx, 0);
    }

    // Assign dense positions in sorted order.
    for (pos, slot) in row_index.values_mut().enumerate() {
        *slot = pos;
    }
    for (pos, slot) in col_index.values_mut().enumerate() {
        *slot = pos;
    }

    let n_cols = col_index.len();
    let mut dense = vec![None; row_index.len() * n_cols];
    for ((component, eigenvector), value) in &cells {
        let (Some(&r), Some(&c)) = (row_index.get(component), col_index.get(eigenvector)) else {
            continue;
        };
        dense[r * n_cols + c] = value.filter(|v| v.is_finite());
    }

    Ok(HeatmapMatrix::from_parts(
        row_index.into_keys().collect(),
        col_index.into_keys().collect(),
        dense,
    ))
}
