/// Data layer: core types, loading, filtering and view assembly.
///
/// Architecture:
/// ```text
///  .xlsx / .xls / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read sheets → wide rows → melt → TidyTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ TidyTable │  Vec<TidyRecord>, read-only for the session
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterState + FilterMode → kept rows, option lists
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   view    │  event segment → sort → metrics / CSV
///   └──────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod view;
