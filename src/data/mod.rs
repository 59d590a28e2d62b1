/// Data layer: core types, loading, validation, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable (named columns, untyped cells)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  required columns + typing → ValidatedTable (Revenue_USD derived)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterCriteria predicates → FilteredTable (borrowed rows)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  summary, yearly trend, region × year, top-N, scatter
///   └───────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
