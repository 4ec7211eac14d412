/// Data layer: core types, loading, derived views, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse upload → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ Table + Schema│  named columns, numeric classification
///   └──────────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  derive   │   │  filter   │  counts, scatter, stats, correlation / row subset
///   └──────────┘   └──────────┘
/// ```

pub mod derive;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
