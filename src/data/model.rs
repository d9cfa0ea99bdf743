use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::clean::CleaningReport;

// ---------------------------------------------------------------------------
// Transaction – one cleaned row of the source table
// ---------------------------------------------------------------------------

/// A single sales transaction after cleaning and feature derivation.
///
/// Invariants (enforced by the loader, relied on everywhere downstream):
/// `units_sold > 0`, `revenue > 0`, all financial fields finite, so every
/// ratio field is defined.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub region: String,
    /// Product name exactly as spelled in the source.
    pub product: String,
    /// Canonical product name; unmapped spellings pass through verbatim.
    pub product_clean: String,
    pub units_sold: u32,
    pub cost: f64,
    pub profit: f64,
    pub revenue: f64,

    // -- Derived time parts --
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    /// Calendar quarter, e.g. `2003Q2`.
    pub quarter: String,

    // -- Derived financial ratios --
    pub profit_margin: f64,
    pub revenue_per_unit: f64,
    pub cost_per_unit: f64,
    pub profit_per_unit: f64,
}

/// The base (un-derived) fields of a transaction, as produced by type
/// coercion in the loader. [`super::derive::enrich`] turns this into a full
/// [`Transaction`].
#[derive(Debug, Clone, PartialEq)]
pub struct BaseRow {
    pub date: NaiveDate,
    pub region: String,
    pub product: String,
    pub product_clean: String,
    pub units_sold: u32,
    pub cost: f64,
    pub profit: f64,
    pub revenue: f64,
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full cleaned dataset with pre-computed category universes.
///
/// Read-only for the lifetime of a session; filtering and aggregation always
/// start from `rows`, never from a previous result.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    /// All surviving transactions, in source order.
    pub rows: Vec<Transaction>,
    /// Sorted set of unique regions.
    pub regions: BTreeSet<String>,
    /// Sorted set of unique canonical product names.
    pub products: BTreeSet<String>,
    /// What the cleaning pass dropped, kept for reporting.
    pub report: CleaningReport,
}

impl SalesDataset {
    /// Build category indices from the cleaned rows.
    pub fn from_rows(rows: Vec<Transaction>, report: CleaningReport) -> Self {
        let mut regions = BTreeSet::new();
        let mut products = BTreeSet::new();
        for tx in &rows {
            regions.insert(tx.region.clone());
            products.insert(tx.product_clean.clone());
        }
        SalesDataset {
            rows,
            regions,
            products,
            report,
        }
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Observed `(earliest, latest)` transaction dates, `None` when empty.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(|tx| tx.date).min()?;
        let max = self.rows.iter().map(|tx| tx.date).max()?;
        Some((min, max))
    }
}
