use chrono::NaiveDate;
use std::path::PathBuf;

use super::traits::PositionStore;
use crate::errors::CoreError;
use crate::models::position::Position;

/// Column order of the persisted ledger table.
const HEADER: [&str; 8] = [
    "Ticker",
    "Buy Date",
    "Buy Price",
    "Shares",
    "Closed",
    "Close Date",
    "Close Price",
    "dual_key",
];

/// CSV-file-backed position store.
///
/// One row per position, spreadsheet-compatible layout:
/// `Ticker,Buy Date,Buy Price,Shares,Closed,Close Date,Close Price,dual_key`.
/// Close fields are blank for open positions. `update` rewrites the whole
/// file; a missing file reads as an empty ledger.
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn row_to_position(record: &csv::StringRecord, line: usize) -> Result<Position, CoreError> {
        let field = |idx: usize, name: &str| -> Result<&str, CoreError> {
            record
                .get(idx)
                .ok_or_else(|| CoreError::Store(format!("Row {line}: missing column '{name}'")))
        };

        let ticker = field(0, "Ticker")?.trim().to_string();
        let buy_date = parse_date(field(1, "Buy Date")?, line, "Buy Date")?
            .ok_or_else(|| CoreError::Store(format!("Row {line}: empty 'Buy Date'")))?;
        let buy_price: f64 = parse_number(field(2, "Buy Price")?, line, "Buy Price")?;
        let shares: u32 = field(3, "Shares")?.trim().parse().map_err(|_| {
            CoreError::Store(format!("Row {line}: invalid 'Shares' value"))
        })?;
        let closed = parse_bool(field(4, "Closed")?, line)?;
        let close_date = parse_date(field(5, "Close Date")?, line, "Close Date")?;
        let close_price = match field(6, "Close Price")?.trim() {
            "" => None,
            s => Some(parse_number(s, line, "Close Price")?),
        };
        let key = field(7, "dual_key")?.trim().to_string();

        if closed && (close_date.is_none() || close_price.is_none()) {
            return Err(CoreError::Store(format!(
                "Row {line}: closed position without close date/price"
            )));
        }

        Ok(Position {
            ticker,
            buy_date,
            buy_price,
            shares,
            closed,
            close_date,
            close_price,
            key,
        })
    }
}

impl PositionStore for CsvFileStore {
    fn read(&self) -> Result<Vec<Position>, CoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)?;

        let mut positions = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            // +2: one for the header row, one for 1-based line numbers
            positions.push(Self::row_to_position(&record, idx + 2)?);
        }
        Ok(positions)
    }

    fn update(&self, positions: &[Position]) -> Result<(), CoreError> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(HEADER)?;

        for p in positions {
            writer.write_record([
                p.ticker.as_str(),
                &p.buy_date.to_string(),
                &format_price(p.buy_price),
                &p.shares.to_string(),
                if p.closed { "TRUE" } else { "FALSE" },
                &p.close_date.map(|d| d.to_string()).unwrap_or_default(),
                &p.close_price.map(format_price).unwrap_or_default(),
                p.key.as_str(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn parse_date(s: &str, line: usize, name: &str) -> Result<Option<NaiveDate>, CoreError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| CoreError::Store(format!("Row {line}: invalid '{name}' date '{s}'")))
}

fn parse_number(s: &str, line: usize, name: &str) -> Result<f64, CoreError> {
    s.trim()
        .parse()
        .map_err(|_| CoreError::Store(format!("Row {line}: invalid '{name}' value '{s}'")))
}

fn parse_bool(s: &str, line: usize) -> Result<bool, CoreError> {
    match s.trim().to_uppercase().as_str() {
        "TRUE" | "1" => Ok(true),
        "FALSE" | "0" | "" => Ok(false),
        other => Err(CoreError::Store(format!(
            "Row {line}: invalid 'Closed' value '{other}'"
        ))),
    }
}

/// Prices round-trip through the sheet as plain decimals; trim the
/// trailing zeros `{:.4}` would leave behind.
fn format_price(value: f64) -> String {
    let s = format!("{value:.4}");
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}
