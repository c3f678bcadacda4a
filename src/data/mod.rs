/// Data layer: reading the sizing spreadsheet into validated monthly records.
///
/// Architecture:
/// ```text
///  .xlsx / .xls / .ods / .csv / bytes
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  TabularReader → RawSheet (every cell, positions kept)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  skip preamble, drop obsolete columns, Year == 1, coerce
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ MonthlySeries │  Vec<MonthlyRecord>, sheet order
///   └──────────────┘
///        ▲
///   ┌──────────┐
///   │  cache    │  fingerprint → Arc<MonthlySeries>
///   └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod loader;
pub mod model;
pub mod source;
