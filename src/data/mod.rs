/// Data layer: core types, loading/cleaning, derivation, filtering,
/// aggregation, and flat exports.
///
/// Architecture:
/// ```text
///  .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + clean rows → SalesDataset (drops counted)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SalesDataset  │  Vec<Transaction>, category universes
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply selection → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group by region/product/month → summary rows
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  flat CSV tables, PNG figures
///   └──────────┘
/// ```

pub mod aggregate;
pub mod clean;
pub mod derive;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
