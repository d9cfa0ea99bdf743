use chrono::{Datelike, NaiveDate};

use super::model::{BaseRow, Transaction};

// ---------------------------------------------------------------------------
// Per-row feature derivation (pure, no I/O)
// ---------------------------------------------------------------------------

/// Abbreviated month names, indexed by `month - 1`.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Calendar parts derived from a transaction date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeParts {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub quarter: String,
}

/// Derive the calendar parts of a date.
pub fn time_parts(date: NaiveDate) -> TimeParts {
    let year = date.year();
    let month = date.month();
    TimeParts {
        year,
        month,
        month_name: MONTH_NAMES[(month - 1) as usize],
        quarter: format!("{}Q{}", year, (month - 1) / 3 + 1),
    }
}

/// Financial ratios of a single transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitRatios {
    pub profit_margin: f64,
    pub revenue_per_unit: f64,
    pub cost_per_unit: f64,
    pub profit_per_unit: f64,
}

/// Derive per-unit metrics and the row-level profit margin.
///
/// Returns `None` when `units_sold` or `revenue` is not positive, so a
/// standalone caller gets an explicit "undefined" instead of NaN or inf.
/// Rows reaching this through the loader always satisfy both conditions.
pub fn unit_ratios(units_sold: u32, cost: f64, profit: f64, revenue: f64) -> Option<UnitRatios> {
    if units_sold == 0 || revenue <= 0.0 {
        return None;
    }
    let units = f64::from(units_sold);
    Some(UnitRatios {
        profit_margin: profit / revenue,
        revenue_per_unit: revenue / units,
        cost_per_unit: cost / units,
        profit_per_unit: profit / units,
    })
}

/// Assemble a full [`Transaction`] from its base fields.
///
/// Pure and idempotent: the derived fields are a function of the base fields
/// alone, so re-deriving from the same base yields identical output.
pub fn enrich(base: BaseRow) -> Option<Transaction> {
    let time = time_parts(base.date);
    let ratios = unit_ratios(base.units_sold, base.cost, base.profit, base.revenue)?;
    Some(Transaction {
        date: base.date,
        region: base.region,
        product: base.product,
        product_clean: base.product_clean,
        units_sold: base.units_sold,
        cost: base.cost,
        profit: base.profit,
        revenue: base.revenue,
        year: time.year,
        month: time.month,
        month_name: time.month_name,
        quarter: time.quarter,
        profit_margin: ratios.profit_margin,
        revenue_per_unit: ratios.revenue_per_unit,
        cost_per_unit: ratios.cost_per_unit,
        profit_per_unit: ratios.profit_per_unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(units: u32, cost: f64, profit: f64, revenue: f64) -> BaseRow {
        BaseRow {
            date: NaiveDate::from_ymd_opt(2003, 4, 17).unwrap(),
            region: "Wales".to_string(),
            product: "Fudge".to_string(),
            product_clean: "Fudge".to_string(),
            units_sold: units,
            cost,
            profit,
            revenue,
        }
    }

    #[test]
    fn time_parts_cover_year_month_quarter() {
        let t = time_parts(NaiveDate::from_ymd_opt(2003, 4, 17).unwrap());
        assert_eq!(t.year, 2003);
        assert_eq!(t.month, 4);
        assert_eq!(t.month_name, "Apr");
        assert_eq!(t.quarter, "2003Q2");

        let t = time_parts(NaiveDate::from_ymd_opt(2000, 12, 31).unwrap());
        assert_eq!(t.month_name, "Dec");
        assert_eq!(t.quarter, "2000Q4");
    }

    #[test]
    fn ratios_are_per_unit_and_margin() {
        let r = unit_ratios(4, 60.0, 40.0, 100.0).unwrap();
        assert_eq!(r.profit_margin, 0.4);
        assert_eq!(r.revenue_per_unit, 25.0);
        assert_eq!(r.cost_per_unit, 15.0);
        assert_eq!(r.profit_per_unit, 10.0);
    }

    #[test]
    fn zero_denominators_yield_explicit_undefined() {
        assert_eq!(unit_ratios(0, 1.0, 1.0, 100.0), None);
        assert_eq!(unit_ratios(5, 1.0, 1.0, 0.0), None);
        assert_eq!(unit_ratios(5, 1.0, 1.0, -3.0), None);
    }

    #[test]
    fn enrich_is_idempotent() {
        let tx = enrich(base(10, 50.0, 25.0, 100.0)).unwrap();
        let again = enrich(BaseRow {
            date: tx.date,
            region: tx.region.clone(),
            product: tx.product.clone(),
            product_clean: tx.product_clean.clone(),
            units_sold: tx.units_sold,
            cost: tx.cost,
            profit: tx.profit,
            revenue: tx.revenue,
        })
        .unwrap();
        assert_eq!(tx, again);
    }

    #[test]
    fn enrich_rejects_undefined_ratios() {
        assert!(enrich(base(0, 1.0, 1.0, 100.0)).is_none());
        assert!(enrich(base(5, 1.0, 1.0, 0.0)).is_none());
    }
}
