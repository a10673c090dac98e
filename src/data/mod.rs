/// Data layer: core types, loading, and pivoting.
///
/// Architecture:
/// ```text
///  layer_<L>_<m>.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  resolve path, parse rows → Vec<ComponentRecord>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  pivot    │  long rows → HeatmapMatrix (rows = components)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod pivot;
