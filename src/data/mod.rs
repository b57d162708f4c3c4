/// Data layer: table types, loading, selection, and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → DataTable
///   └──────────┘
///        │
///        ▼            (prepare + classifier score every row)
///   ┌──────────┐
///   │  filter   │  hour == h && positive → projected ResultSet
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  ResultSet → UTF-8 CSV bytes
///   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
