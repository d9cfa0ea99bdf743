use std::collections::BTreeMap;

use super::model::Transaction;

// ---------------------------------------------------------------------------
// Grouping keys
// ---------------------------------------------------------------------------

/// A categorical field transactions can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Region,
    Product,
    /// Calendar month, keyed as `YYYY-MM` so the natural string order is
    /// chronological.
    Month,
}

impl GroupField {
    /// Column label used in pivots and exports.
    pub fn label(self) -> &'static str {
        match self {
            GroupField::Region => "Region",
            GroupField::Product => "Product",
            GroupField::Month => "Month",
        }
    }

    fn key_of(self, tx: &Transaction) -> String {
        match self {
            GroupField::Region => tx.region.clone(),
            GroupField::Product => tx.product_clean.clone(),
            GroupField::Month => month_key(tx.year, tx.month),
        }
    }
}

/// `YYYY-MM` key for a calendar month.
pub fn month_key(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

/// Inverse of [`month_key`].
pub fn parse_month_key(key: &str) -> Option<(i32, u32)> {
    let (y, m) = key.split_once('-')?;
    let year = y.parse().ok()?;
    let month: u32 = m.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// One summarized record per grouping-key combination.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    /// Key values, one per requested [`GroupField`], in request order.
    pub key: Vec<String>,
    pub units_sold_total: u64,
    pub revenue_total: f64,
    pub profit_total: f64,
    /// Sum-ratio margin: `profit_total / revenue_total`.  Deliberately not
    /// the mean of per-row margins, which would misweight small
    /// transactions (that mean exists separately as
    /// [`Kpis::mean_profit_margin`]).
    pub profit_margin: f64,
}

/// Group transactions by the requested fields and sum their totals.
///
/// Rows come out ordered by key tuple.  Combinations absent from the input
/// are absent from the output; there is no implicit zero-fill.  Empty input
/// yields an empty vector.
///
/// Division by `revenue_total` is safe for every produced row: groups are
/// non-empty and each member row carries positive revenue.
pub fn aggregate<'a, I>(rows: I, fields: &[GroupField]) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut groups: BTreeMap<Vec<String>, (u64, f64, f64)> = BTreeMap::new();
    for tx in rows {
        let key: Vec<String> = fields.iter().map(|f| f.key_of(tx)).collect();
        let totals = groups.entry(key).or_insert((0, 0.0, 0.0));
        totals.0 += u64::from(tx.units_sold);
        totals.1 += tx.revenue;
        totals.2 += tx.profit;
    }
    groups
        .into_iter()
        .map(|(key, (units, revenue, profit))| AggregateRow {
            key,
            units_sold_total: units,
            revenue_total: revenue,
            profit_total: profit,
            profit_margin: profit / revenue,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Metric to rank aggregate rows by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    UnitsSold,
    Revenue,
    Profit,
    ProfitMargin,
}

impl Metric {
    fn of(self, row: &AggregateRow) -> f64 {
        match self {
            Metric::UnitsSold => row.units_sold_total as f64,
            Metric::Revenue => row.revenue_total,
            Metric::Profit => row.profit_total,
            Metric::ProfitMargin => row.profit_margin,
        }
    }
}

/// The `n` largest rows by `metric`, descending.  The sort is stable, so
/// ties keep the input key order.
pub fn top_n(rows: &[AggregateRow], metric: Metric, n: usize) -> Vec<AggregateRow> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(|a, b| metric.of(b).total_cmp(&metric.of(a)));
    ranked.truncate(n);
    ranked
}

// ---------------------------------------------------------------------------
// KPIs over the filtered row set
// ---------------------------------------------------------------------------

/// Headline figures for the current selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kpis {
    pub units_sold_total: u64,
    pub revenue_total: f64,
    pub profit_total: f64,
    /// Arithmetic mean of per-row profit margins.  This is a different
    /// statistic from [`AggregateRow::profit_margin`] and the two are kept
    /// distinct on purpose.
    pub mean_profit_margin: f64,
}

/// Compute the KPI card values, or `None` for an empty row set.
pub fn kpis<'a, I>(rows: I) -> Option<Kpis>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut units = 0u64;
    let mut revenue = 0.0;
    let mut profit = 0.0;
    let mut margin_sum = 0.0;
    let mut count = 0usize;
    for tx in rows {
        units += u64::from(tx.units_sold);
        revenue += tx.revenue;
        profit += tx.profit;
        margin_sum += tx.profit_margin;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(Kpis {
        units_sold_total: units,
        revenue_total: revenue,
        profit_total: profit,
        mean_profit_margin: margin_sum / count as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive;
    use crate::data::model::BaseRow;
    use chrono::NaiveDate;

    fn tx(
        year: i32,
        month: u32,
        region: &str,
        product: &str,
        units: u32,
        profit: f64,
        revenue: f64,
    ) -> Transaction {
        derive::enrich(BaseRow {
            date: NaiveDate::from_ymd_opt(year, month, 15).unwrap(),
            region: region.to_string(),
            product: product.to_string(),
            product_clean: product.to_string(),
            units_sold: units,
            cost: revenue - profit,
            profit,
            revenue,
        })
        .unwrap()
    }

    #[test]
    fn group_totals_sum_to_input_totals() {
        let rows = vec![
            tx(2001, 1, "England", "Fudge", 10, 5.0, 20.0),
            tx(2001, 2, "England", "Toffee", 20, 8.0, 30.0),
            tx(2001, 3, "Scotland", "Fudge", 5, 2.0, 10.0),
            tx(2001, 4, "Wales", "Toffee", 7, 3.0, 12.0),
        ];
        let groups = aggregate(&rows, &[GroupField::Region]);

        let units: u64 = groups.iter().map(|g| g.units_sold_total).sum();
        let revenue: f64 = groups.iter().map(|g| g.revenue_total).sum();
        let profit: f64 = groups.iter().map(|g| g.profit_total).sum();
        assert_eq!(units, 42);
        assert!((revenue - 72.0).abs() < 1e-9);
        assert!((profit - 18.0).abs() < 1e-9);
    }

    #[test]
    fn margin_is_ratio_of_sums_not_mean_of_ratios() {
        // Row margins 0.20 and 0.10: the sum-ratio is 110/1000 = 0.11,
        // while a mean of row margins would give 0.15.
        let rows = vec![
            tx(2001, 1, "England", "Fudge", 1, 20.0, 100.0),
            tx(2001, 2, "England", "Fudge", 1, 90.0, 900.0),
        ];
        let groups = aggregate(&rows, &[GroupField::Region]);
        assert_eq!(groups.len(), 1);
        assert!((groups[0].profit_margin - 0.11).abs() < 1e-12);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let rows: Vec<Transaction> = Vec::new();
        assert!(aggregate(&rows, &[GroupField::Region]).is_empty());
        assert!(kpis(&rows).is_none());
    }

    #[test]
    fn two_dimensional_pivot_is_sparse_and_duplicate_free() {
        let rows = vec![
            tx(2001, 1, "England", "Fudge", 10, 5.0, 20.0),
            tx(2001, 2, "England", "Fudge", 10, 5.0, 20.0),
            tx(2001, 3, "Scotland", "Toffee", 5, 2.0, 10.0),
        ];
        let pivot = aggregate(&rows, &[GroupField::Region, GroupField::Product]);

        // Present combinations appear exactly once, merged.
        assert_eq!(pivot.len(), 2);
        assert_eq!(pivot[0].key, vec!["England", "Fudge"]);
        assert_eq!(pivot[0].units_sold_total, 20);
        // Absent combinations are simply absent.
        assert!(!pivot.iter().any(|g| g.key == vec!["England", "Toffee"]));
        assert!(!pivot.iter().any(|g| g.key == vec!["Scotland", "Fudge"]));
    }

    #[test]
    fn key_order_follows_requested_field_order() {
        let rows = vec![tx(2001, 1, "England", "Fudge", 10, 5.0, 20.0)];
        let by_product_region = aggregate(&rows, &[GroupField::Product, GroupField::Region]);
        assert_eq!(by_product_region[0].key, vec!["Fudge", "England"]);
    }

    #[test]
    fn top_n_breaks_ties_chronologically() {
        // Monthly units 10, 50, 5, 50, 20: the two peaks are months 2 and 4,
        // in that order.
        let units = [10, 50, 5, 50, 20];
        let rows: Vec<Transaction> = units
            .iter()
            .enumerate()
            .map(|(i, &u)| tx(2003, i as u32 + 1, "Wales", "Fudge", u, 1.0, 10.0))
            .collect();
        let monthly = aggregate(&rows, &[GroupField::Month]);
        let peaks = top_n(&monthly, Metric::UnitsSold, 2);

        assert_eq!(peaks.len(), 2);
        assert_eq!(peaks[0].key, vec!["2003-02"]);
        assert_eq!(peaks[1].key, vec!["2003-04"]);
    }

    #[test]
    fn top_n_truncates_to_available_rows() {
        let rows = vec![tx(2003, 1, "Wales", "Fudge", 10, 1.0, 10.0)];
        let monthly = aggregate(&rows, &[GroupField::Month]);
        assert_eq!(top_n(&monthly, Metric::Profit, 5).len(), 1);
        assert!(top_n(&monthly, Metric::Profit, 0).is_empty());
    }

    #[test]
    fn kpi_margin_is_mean_of_row_margins() {
        let rows = vec![
            tx(2001, 1, "England", "Fudge", 1, 20.0, 100.0),
            tx(2001, 2, "England", "Fudge", 1, 90.0, 900.0),
        ];
        let k = kpis(&rows).unwrap();
        assert_eq!(k.units_sold_total, 2);
        assert!((k.revenue_total - 1000.0).abs() < 1e-9);
        assert!((k.profit_total - 110.0).abs() < 1e-9);
        // Mean of 0.20 and 0.10, not the 0.11 sum-ratio.
        assert!((k.mean_profit_margin - 0.15).abs() < 1e-12);
    }

    #[test]
    fn month_keys_round_trip() {
        assert_eq!(month_key(2003, 7), "2003-07");
        assert_eq!(parse_month_key("2003-07"), Some((2003, 7)));
        assert_eq!(parse_month_key("2003-13"), None);
        assert_eq!(parse_month_key("garbage"), None);
    }
}
