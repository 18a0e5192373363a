/// Data layer: schema, loading, filtering, aggregation and export.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Dataset (FICE coerced to numbers)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │  filter  │ ◀─── │ cascade  │  option lists for dependent controls
///   └──────────┘      └──────────┘
///        │
///        ├──────────────▶ export   filtered rows → filtered_data.csv
///        ▼
///   ┌───────────┐
///   │ aggregate │  group-by + measure → SummaryTable
///   └───────────┘
///        │
///        ▼
///     chart         SummaryTable → plot series
/// ```

pub mod aggregate;
pub mod cascade;
pub mod chart;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;

pub use error::{DataError, DataResult};
