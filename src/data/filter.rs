use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{SalesDataset, Transaction};

// ---------------------------------------------------------------------------
// Filter selection: which regions, products, and dates are in view
// ---------------------------------------------------------------------------

/// The user-chosen filter state.
///
/// The default state covers the full universe of the dataset; an empty
/// region or product set is a valid, degenerate selection that retains
/// nothing (it is not an error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub regions: BTreeSet<String>,
    pub products: BTreeSet<String>,
    /// Inclusive lower bound.
    pub date_from: NaiveDate,
    /// Inclusive upper bound.
    pub date_to: NaiveDate,
}

impl Selection {
    /// Selection covering every region, product, and date in the dataset.
    pub fn full_universe(dataset: &SalesDataset) -> Self {
        let (date_from, date_to) = dataset
            .date_span()
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        Selection {
            regions: dataset.regions.clone(),
            products: dataset.products.clone(),
            date_from,
            date_to,
        }
    }

    /// Whether a transaction passes every axis of this selection.
    pub fn contains(&self, tx: &Transaction) -> bool {
        self.regions.contains(&tx.region)
            && self.products.contains(&tx.product_clean)
            && tx.date >= self.date_from
            && tx.date <= self.date_to
    }
}

/// Return indices of transactions that pass the selection.
///
/// Total over all inputs: an empty selection or an inverted date interval
/// just produces an empty index vector.  Always evaluated against the full
/// cleaned row set, never a previous filter result.
pub fn filtered_indices(dataset: &SalesDataset, selection: &Selection) -> Vec<usize> {
    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, tx)| selection.contains(tx))
        .map(|(i, _)| i)
        .collect()
}
