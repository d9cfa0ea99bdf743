use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::clean::{CleaningReport, DropReason, canonical_product};
use super::derive;
use super::model::{BaseRow, SalesDataset, Transaction};

/// Header text of the source table, fixed by the upstream collaborator.
pub const EXPECTED_COLUMNS: [&str; 7] = [
    "Date",
    "Country(UK)",
    "Confectionary",
    "Units Sold",
    "Cost(£)",
    "Profit(£)",
    "Revenue(£)",
];

/// Dates arrive in day-first textual form.
const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d/%m/%y"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – delimited table with the collaborator's header row
/// * `.json` – records-oriented array with the same keys
///
/// Dirty rows are dropped and counted in the dataset's [`CleaningReport`],
/// never raised; only an unopenable or structurally unusable source is an
/// error.
pub fn load_file(path: &Path) -> Result<SalesDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV file")?;
            read_csv(file)?
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            read_json(&text)?
        }
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!("{}: {}", path.display(), dataset.report);
    if dataset.report.rows_dropped() > 0 {
        log::warn!(
            "{} rows excluded during cleaning",
            dataset.report.rows_dropped()
        );
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Raw record – every field kept textual so one bad cell drops one row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct RawRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Country(UK)")]
    region: String,
    #[serde(rename = "Confectionary")]
    product: String,
    #[serde(rename = "Units Sold")]
    units_sold: String,
    #[serde(rename = "Cost(£)")]
    cost: String,
    #[serde(rename = "Profit(£)")]
    profit: String,
    #[serde(rename = "Revenue(£)")]
    revenue: String,
}

/// Coerce one raw record into a cleaned, derived transaction.
fn clean_record(raw: RawRecord) -> Result<Transaction, DropReason> {
    let date = parse_day_first_date(&raw.date).ok_or(DropReason::BadDate)?;
    let units_sold = parse_units(&raw.units_sold).ok_or(DropReason::BadNumber)?;
    let cost = parse_amount(&raw.cost).ok_or(DropReason::BadNumber)?;
    let profit = parse_amount(&raw.profit).ok_or(DropReason::BadNumber)?;
    let revenue = parse_amount(&raw.revenue).ok_or(DropReason::BadNumber)?;

    if units_sold == 0 || revenue <= 0.0 {
        return Err(DropReason::NonPositive);
    }

    let product = raw.product.trim().to_string();
    let product_clean = canonical_product(&product).to_string();

    derive::enrich(BaseRow {
        date,
        region: raw.region.trim().to_string(),
        product,
        product_clean,
        units_sold,
        cost,
        profit,
        revenue,
    })
    .ok_or(DropReason::NonPositive)
}

/// Parse a day-before-month date, trying each accepted format in turn.
fn parse_day_first_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Units sold must be a plain non-negative integer.
fn parse_units(s: &str) -> Option<u32> {
    s.trim().parse::<u32>().ok()
}

/// Financial amounts must parse to a finite float.
fn parse_amount(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Read a sales dataset from CSV text.
///
/// The header row must contain every column in [`EXPECTED_COLUMNS`]; that is
/// the one structural requirement.  Everything row-level is resolved by
/// exclusion and counted.
pub fn read_csv<R: Read>(reader: R) -> Result<SalesDataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let missing: Vec<&str> = EXPECTED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .copied()
        .collect();
    if !missing.is_empty() {
        bail!("CSV missing required columns: {}", missing.join(", "));
    }

    let mut report = CleaningReport::default();
    let mut rows = Vec::new();

    for (row_no, result) in csv_reader.deserialize::<RawRecord>().enumerate() {
        report.rows_read += 1;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                log::debug!("row {row_no}: dropped (malformed record: {e})");
                report.record_drop(&DropReason::Malformed);
                continue;
            }
        };
        match clean_record(raw) {
            Ok(tx) => rows.push(tx),
            Err(reason) => {
                log::debug!("row {row_no}: dropped ({reason})");
                report.record_drop(&reason);
            }
        }
    }

    report.rows_kept = rows.len();
    Ok(SalesDataset::from_rows(rows, report))
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Date": "14/03/2002",
///     "Country(UK)": "Wales",
///     "Confectionary": "Fudge",
///     "Units Sold": 120,
///     "Cost(£)": 80.0,
///     "Profit(£)": 40.0,
///     "Revenue(£)": 120.0
///   },
///   ...
/// ]
/// ```
pub fn read_json(text: &str) -> Result<SalesDataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut report = CleaningReport::default();
    let mut rows = Vec::new();

    for (row_no, rec) in records.iter().enumerate() {
        report.rows_read += 1;
        let raw = match json_record(rec) {
            Some(raw) => raw,
            None => {
                log::debug!("row {row_no}: dropped (malformed record)");
                report.record_drop(&DropReason::Malformed);
                continue;
            }
        };
        match clean_record(raw) {
            Ok(tx) => rows.push(tx),
            Err(reason) => {
                log::debug!("row {row_no}: dropped ({reason})");
                report.record_drop(&reason);
            }
        }
    }

    report.rows_kept = rows.len();
    Ok(SalesDataset::from_rows(rows, report))
}

/// Pull the expected fields out of one JSON record, as text, so the same
/// coercion path as CSV applies.
fn json_record(rec: &JsonValue) -> Option<RawRecord> {
    let obj = rec.as_object()?;
    let field = |key: &str| -> Option<String> {
        match obj.get(key)? {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    };
    Some(RawRecord {
        date: field("Date")?,
        region: field("Country(UK)")?,
        product: field("Confectionary")?,
        units_sold: field("Units Sold")?,
        cost: field("Cost(£)")?,
        profit: field("Profit(£)")?,
        revenue: field("Revenue(£)")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
Date,Country(UK),Confectionary,Units Sold,Cost(£),Profit(£),Revenue(£)
03/04/2001,England,Choclate Chunk,100,60.0,40.0,100.0
15/11/2001,Scotland,Caramel nut,50,30.0,20.0,50.0
20/06/2002,Wales,Bonbon Deluxe,10,5.0,3.0,8.0
not a date,England,Fudge,10,5.0,3.0,8.0
01/02/2003,England,Fudge,10,n/a,3.0,8.0
05/02/2003,England,Fudge,0,5.0,3.0,8.0
09/02/2003,England,Fudge,10,5.0,3.0,0.0
";

    #[test]
    fn dirty_rows_are_dropped_and_counted() {
        let ds = read_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.report.rows_read, 7);
        assert_eq!(ds.report.rows_kept, 3);
        assert_eq!(ds.report.bad_date, 1);
        assert_eq!(ds.report.bad_number, 1);
        assert_eq!(ds.report.non_positive, 2);
        assert_eq!(ds.report.malformed, 0);
    }

    #[test]
    fn surviving_rows_satisfy_cleaning_invariants() {
        let ds = read_csv(SAMPLE_CSV.as_bytes()).unwrap();
        for tx in &ds.rows {
            assert!(tx.units_sold > 0);
            assert!(tx.revenue > 0.0);
            assert!(tx.profit_margin.is_finite());
        }
    }

    #[test]
    fn dates_parse_day_first() {
        let ds = read_csv(SAMPLE_CSV.as_bytes()).unwrap();
        // 03/04/2001 is the 3rd of April, not the 4th of March.
        assert_eq!(ds.rows[0].date, NaiveDate::from_ymd_opt(2001, 4, 3).unwrap());
        assert_eq!(ds.rows[0].month_name, "Apr");
    }

    #[test]
    fn product_spellings_are_normalized_or_passed_through() {
        let ds = read_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(ds.rows[0].product, "Choclate Chunk");
        assert_eq!(ds.rows[0].product_clean, "Chocolate Chunk");
        assert_eq!(ds.rows[1].product_clean, "Caramel Nut");
        // Unmapped spelling survives as its own category.
        assert_eq!(ds.rows[2].product_clean, "Bonbon Deluxe");
        assert!(ds.products.contains("Bonbon Deluxe"));
    }

    #[test]
    fn missing_columns_are_fatal() {
        let csv = "Date,Country(UK),Confectionary,Units Sold\n01/01/2001,England,Fudge,10\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("missing required columns"));
    }

    #[test]
    fn short_records_are_dropped_not_fatal() {
        let csv = "\
Date,Country(UK),Confectionary,Units Sold,Cost(£),Profit(£),Revenue(£)
03/04/2001,England,Fudge,100,60.0,40.0,100.0
05/04/2001,England,Fudge
";
        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.report.malformed, 1);
    }

    #[test]
    fn json_records_load_like_csv() {
        let json = r#"[
            {"Date": "03/04/2001", "Country(UK)": "England", "Confectionary": "Choclate Chunk",
             "Units Sold": 100, "Cost(£)": 60.0, "Profit(£)": 40.0, "Revenue(£)": 100.0},
            {"Date": "bad", "Country(UK)": "England", "Confectionary": "Fudge",
             "Units Sold": 10, "Cost(£)": 5.0, "Profit(£)": 3.0, "Revenue(£)": 8.0},
            {"not": "a record"}
        ]"#;
        let ds = read_json(json).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.rows[0].product_clean, "Chocolate Chunk");
        assert_eq!(ds.report.bad_date, 1);
        assert_eq!(ds.report.malformed, 1);
    }

    #[test]
    fn unreadable_source_is_fatal() {
        let err = load_file(Path::new("/no/such/file.csv")).unwrap_err();
        assert!(err.to_string().contains("opening CSV file"));
    }
}
