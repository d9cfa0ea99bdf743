use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Product name normalization
// ---------------------------------------------------------------------------

/// Known spelling variants in the product column, raw → canonical.
///
/// The table only lists variants that have actually been observed; anything
/// not listed passes through verbatim, so an unnoticed variant survives as
/// its own category instead of being silently merged.
const PRODUCT_ALIASES: &[(&str, &str)] = &[
    ("Choclate Chunk", "Chocolate Chunk"),
    ("Caramel nut", "Caramel Nut"),
];

/// Map a raw product spelling to its canonical name.
pub fn canonical_product(raw: &str) -> &str {
    PRODUCT_ALIASES
        .iter()
        .find(|(variant, _)| *variant == raw)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(raw)
}

// ---------------------------------------------------------------------------
// Drop accounting
// ---------------------------------------------------------------------------

/// Why a source row was excluded during cleaning.
///
/// These are not errors past the loader boundary; each one increments a
/// counter in [`CleaningReport`] and processing continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DropReason {
    #[error("unparseable date")]
    BadDate,
    #[error("non-numeric financial field")]
    BadNumber,
    #[error("non-positive units or revenue")]
    NonPositive,
    #[error("malformed record")]
    Malformed,
}

/// Per-reason counts of rows excluded by the cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub bad_date: usize,
    pub bad_number: usize,
    pub non_positive: usize,
    pub malformed: usize,
}

impl CleaningReport {
    pub fn record_drop(&mut self, reason: &DropReason) {
        match reason {
            DropReason::BadDate => self.bad_date += 1,
            DropReason::BadNumber => self.bad_number += 1,
            DropReason::NonPositive => self.non_positive += 1,
            DropReason::Malformed => self.malformed += 1,
        }
    }

    pub fn rows_dropped(&self) -> usize {
        self.bad_date + self.bad_number + self.non_positive + self.malformed
    }
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kept {} of {} rows", self.rows_kept, self.rows_read)?;
        if self.rows_dropped() == 0 {
            return Ok(());
        }
        let mut parts = Vec::new();
        if self.bad_date > 0 {
            parts.push(format!("{} bad dates", self.bad_date));
        }
        if self.bad_number > 0 {
            parts.push(format!("{} non-numeric", self.bad_number));
        }
        if self.non_positive > 0 {
            parts.push(format!("{} non-positive", self.non_positive));
        }
        if self.malformed > 0 {
            parts.push(format!("{} malformed", self.malformed));
        }
        write!(f, " ({})", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_variants_are_canonicalized() {
        assert_eq!(canonical_product("Choclate Chunk"), "Chocolate Chunk");
        assert_eq!(canonical_product("Caramel nut"), "Caramel Nut");
    }

    #[test]
    fn unmapped_spellings_pass_through_verbatim() {
        assert_eq!(canonical_product("Bonbon Deluxe"), "Bonbon Deluxe");
        // Case-sensitive on purpose: only listed variants are rewritten.
        assert_eq!(canonical_product("choclate chunk"), "choclate chunk");
    }

    #[test]
    fn report_summarizes_drops() {
        let mut report = CleaningReport {
            rows_read: 10,
            rows_kept: 7,
            ..Default::default()
        };
        report.record_drop(&DropReason::BadDate);
        report.record_drop(&DropReason::BadDate);
        report.record_drop(&DropReason::NonPositive);
        assert_eq!(report.rows_dropped(), 3);
        assert_eq!(
            report.to_string(),
            "kept 7 of 10 rows (2 bad dates, 1 non-positive)"
        );
    }

    #[test]
    fn clean_report_prints_no_parenthetical() {
        let report = CleaningReport {
            rows_read: 5,
            rows_kept: 5,
            ..Default::default()
        };
        assert_eq!(report.to_string(), "kept 5 of 5 rows");
    }
}
