use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::aggregate::{AggregateRow, GroupField};

// ---------------------------------------------------------------------------
// Aggregate tables as flat delimited files
// ---------------------------------------------------------------------------

/// Metric columns, in the order the reporting layer expects them; group-key
/// columns always come first.
const METRIC_COLUMNS: [&str; 4] = [
    "units_sold_total",
    "revenue_total",
    "profit_total",
    "profit_margin",
];

/// Write an aggregate table as CSV: one row per group-key combination,
/// key columns first, then the four metric columns.
pub fn write_aggregate_csv<W: Write>(
    writer: W,
    fields: &[GroupField],
    rows: &[AggregateRow],
) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);

    let header: Vec<&str> = fields
        .iter()
        .map(|f| f.label())
        .chain(METRIC_COLUMNS)
        .collect();
    w.write_record(&header).context("writing CSV header")?;

    for row in rows {
        let mut record = row.key.clone();
        record.push(row.units_sold_total.to_string());
        record.push(row.revenue_total.to_string());
        record.push(row.profit_total.to_string());
        record.push(row.profit_margin.to_string());
        w.write_record(&record).context("writing CSV row")?;
    }
    w.flush().context("flushing CSV")?;
    Ok(())
}

/// Write an aggregate table to a file path.
pub fn write_aggregate_file(
    path: &Path,
    fields: &[GroupField],
    rows: &[AggregateRow],
) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_aggregate_csv(file, fields, rows)
}

/// Read an aggregate table written by [`write_aggregate_csv`].
///
/// The number of key columns is whatever precedes the four metric columns.
pub fn read_aggregate_csv<R: Read>(reader: R) -> Result<Vec<AggregateRow>> {
    let mut r = csv::Reader::from_reader(reader);
    let n_columns = r.headers().context("reading CSV header")?.len();
    if n_columns <= METRIC_COLUMNS.len() {
        bail!("aggregate table must have at least one group-key column");
    }
    let n_keys = n_columns - METRIC_COLUMNS.len();

    let mut rows = Vec::new();
    for (row_no, result) in r.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != n_columns {
            bail!("CSV row {row_no}: expected {n_columns} fields, got {}", record.len());
        }
        let key: Vec<String> = record.iter().take(n_keys).map(|s| s.to_string()).collect();
        let metric = |i: usize| record.get(n_keys + i).unwrap_or("");
        rows.push(AggregateRow {
            key,
            units_sold_total: metric(0)
                .parse()
                .with_context(|| format!("CSV row {row_no}: bad units total"))?,
            revenue_total: metric(1)
                .parse()
                .with_context(|| format!("CSV row {row_no}: bad revenue total"))?,
            profit_total: metric(2)
                .parse()
                .with_context(|| format!("CSV row {row_no}: bad profit total"))?,
            profit_margin: metric(3)
                .parse()
                .with_context(|| format!("CSV row {row_no}: bad profit margin"))?,
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Figure persistence (side-channel)
// ---------------------------------------------------------------------------

/// Persist a rendered figure as a PNG.  `rgba` is tightly packed RGBA8,
/// `width × height` pixels.
pub fn save_figure(path: &Path, width: usize, height: usize, rgba: &[u8]) -> Result<()> {
    image::save_buffer(
        path,
        rgba,
        width as u32,
        height as u32,
        image::ExtendedColorType::Rgba8,
    )
    .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
