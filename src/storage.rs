use crate::error::{Error, Result};
use crate::models::{Order, RawOrder, RawTable, Table, canonical_column};
use crate::views::ViewOutput;
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Columns every order spreadsheet must carry (after header canonicalization).
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "order_date",
    "sales",
    "profit",
    "quantity",
    "category",
    "sub_category",
    "segment",
    "product_name",
    "ship_mode",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Read the whole order spreadsheet (CSV export, header row, one sheet).
///
/// Header names are matched case-insensitively, with spaces and dashes treated as `_`,
/// so the common `Order Date` / `Sub-Category` spellings are accepted. Extra columns are ignored.
///
/// ### Errors
/// - [`Error::Load`] when the file is missing, unreadable, or lacks a required column
/// - [`Error::Parse`] when a numeric field is malformed or not finite
pub fn load<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| Error::load(path, e))?;

    let headers: StringRecord = rdr
        .headers()
        .map_err(|e| Error::load(path, e))?
        .iter()
        .map(|h| canonical_column(h.trim_start_matches('\u{feff}')))
        .collect();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(Error::load(path, format!("missing column `{col}`")));
        }
    }

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while rdr
        .read_record(&mut record)
        .map_err(|e| record_error(path, e))?
    {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: RawOrder = record
            .deserialize(Some(&headers))
            .map_err(|e| Error::Parse {
                line,
                message: e.to_string(),
            })?;
        if !row.sales.is_finite() || !row.profit.is_finite() {
            return Err(Error::Parse {
                line,
                message: "sales and profit must be finite numbers".into(),
            });
        }
        rows.push(row);
    }
    log::info!("loaded {} rows from {}", rows.len(), path.display());
    Ok(RawTable { rows })
}

fn record_error(path: &Path, e: csv::Error) -> Error {
    match e.kind() {
        csv::ErrorKind::UnequalLengths { .. } | csv::ErrorKind::Utf8 { .. } => Error::Parse {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        },
        _ => Error::load(path, e),
    }
}

/// Parse an order date in one of the accepted layouts.
pub fn parse_order_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

/// Parse every order date and derive the year-month period key.
///
/// A single unparseable date rejects the whole table; the reported line assumes
/// one spreadsheet line per record, counting the header.
pub fn normalize(raw: RawTable) -> Result<Table> {
    let orders = raw
        .rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| match parse_order_date(&row.order_date) {
            Some(date) => Ok(Order::from_raw(row, date)),
            None => Err(Error::Parse {
                line: i as u64 + 2,
                message: format!("unparseable order_date `{}`", row.order_date),
            }),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Table::new(orders))
}

/// [`load`] followed by [`normalize`].
pub fn load_normalized<P: AsRef<Path>>(path: P) -> Result<Table> {
    normalize(load(path)?)
}

/// Prefix text that a spreadsheet would evaluate as a formula.
fn sanitize_cell(s: &str) -> String {
    if s.starts_with(['=', '+', '-', '@']) {
        format!("'{s}")
    } else {
        s.to_string()
    }
}

/// Save a view result as CSV with header.
///
/// Key columns come first (one per grouped dimension), followed by the value column(s).
pub fn save_csv<P: AsRef<Path>>(output: &ViewOutput, path: P) -> anyhow::Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    let key_cells = |parts: &[String]| parts.iter().map(|p| sanitize_cell(p)).collect::<Vec<_>>();
    match output {
        ViewOutput::Series(s) => {
            let mut header: Vec<&str> = s.dimensions.iter().map(|d| d.column()).collect();
            header.push(s.measure.column());
            wtr.write_record(&header)?;
            for r in &s.rows {
                let mut rec = key_cells(r.key.parts());
                rec.push(r.value.to_string());
                wtr.write_record(&rec)?;
            }
        }
        ViewOutput::Dual(d) => {
            let mut header: Vec<&str> = d.dimensions.iter().map(|d| d.column()).collect();
            header.extend(d.metrics.iter().map(|m| m.column()));
            wtr.write_record(&header)?;
            for r in &d.rows {
                let mut rec = key_cells(r.key.parts());
                rec.extend(r.values.iter().map(|v| v.to_string()));
                wtr.write_record(&rec)?;
            }
        }
        ViewOutput::Ratio(t) => {
            let ratio_col = format!("{}_to_{}_ratio", t.numerator, t.denominator);
            let mut header: Vec<&str> = t.dimensions.iter().map(|d| d.column()).collect();
            header.extend([t.numerator.column(), t.denominator.column(), ratio_col.as_str()]);
            wtr.write_record(&header)?;
            for r in &t.rows {
                let mut rec = key_cells(r.key.parts());
                rec.extend([
                    r.numerator.to_string(),
                    r.denominator.to_string(),
                    r.ratio.to_string(),
                ]);
                wtr.write_record(&rec)?;
            }
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Save a view result as pretty JSON.
pub fn save_json<P: AsRef<Path>>(output: &ViewOutput, path: P) -> anyhow::Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(output)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
