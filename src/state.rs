use std::path::PathBuf;

use crate::data::filter::{Selection, filtered_indices};
use crate::data::model::{SalesDataset, Transaction};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full session state, independent of rendering.
///
/// `dataset == None` is the idle state (nothing computed yet); a loaded
/// dataset with an empty `visible_indices` is the distinct "no data for this
/// selection" state the dashboard renders explicitly.
pub struct AppState {
    /// Loaded dataset (None until the user loads a file).  Immutable for the
    /// rest of the session once set.
    pub dataset: Option<SalesDataset>,

    /// Current filter selection; None while idle.
    pub selection: Option<Selection>,

    /// Indices of transactions passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Where the next dashboard screenshot should be written, set by the
    /// export menu and consumed when the frame arrives.
    pub pending_figure: Option<PathBuf>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            selection: None,
            visible_indices: Vec::new(),
            status_message: None,
            pending_figure: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset and initialise the default selection
    /// (full universe on every axis).
    pub fn set_dataset(&mut self, dataset: SalesDataset) {
        self.selection = Some(Selection::full_universe(&dataset));
        self.visible_indices = (0..dataset.len()).collect();
        self.dataset = Some(dataset);
        self.status_message = None;
        self.loading = false;
    }

    /// Recompute `visible_indices` after a selection change.  Always starts
    /// from the full cleaned row set, so the result reflects the current
    /// selection exactly.
    pub fn refilter(&mut self) {
        if let (Some(ds), Some(sel)) = (&self.dataset, &self.selection) {
            self.visible_indices = filtered_indices(ds, sel);
        }
    }

    /// Restore the default full-universe selection.
    pub fn reset_selection(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selection = Some(Selection::full_universe(ds));
            self.visible_indices = (0..ds.len()).collect();
        }
    }

    /// Transactions passing the current selection, in source order.
    pub fn visible_rows(&self) -> impl Iterator<Item = &Transaction> {
        self.dataset
            .iter()
            .flat_map(|ds| self.visible_indices.iter().map(|&i| &ds.rows[i]))
    }
}
