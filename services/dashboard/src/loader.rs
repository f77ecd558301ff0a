//! Dataset and region-table loading for the dashboard snapshot.

use calamine::{open_workbook_auto, Data, Reader};
use gradboard_leaderboard::{Leaderboard, LeaderboardError, RawRecord, RawTable, RawValue, RegionCodeTable, SourceSchema};
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("unsupported dataset format {0:?} (expected .xlsx, .xlsm, .xlsb, .xls, .ods or .csv)")]
    UnsupportedFormat(String),
    #[error("sheet {0:?} not found in workbook")]
    SheetNotFound(String),
    #[error("workbook has no sheets")]
    NoSheets,
    #[error("region table: {0}")]
    RegionTable(#[from] serde_yaml::Error),
    #[error(transparent)]
    Schema(#[from] LeaderboardError),
}

/// Reads the header row and data rows from a workbook or CSV file.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_raw_table(path: &Path, sheet: Option<&str>) -> Result<RawTable, LoadError> {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).unwrap_or_default();
    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).map_err(|source| LoadError::Io { path: path.display().to_string(), source })?;
            read_csv(file)
        }
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path, sheet),
        _ => Err(LoadError::UnsupportedFormat(ext)),
    }
}

pub fn read_csv<R: std::io::Read>(reader: R) -> Result<RawTable, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).flexible(true).from_reader(reader);
    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut raw = RawRecord::new();
        for (name, field) in columns.iter().zip(record.iter()) {
            if field.is_empty() { continue; }
            let value = match field.parse::<f64>() {
                Ok(n) => RawValue::Number(n),
                Err(_) => RawValue::Text(field.to_string()),
            };
            raw.insert(name.clone(), value);
        }
        rows.push(raw);
    }
    Ok(RawTable::new(columns, rows))
}

fn cell_value(cell: &Data) -> Option<RawValue> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::Float(f) => Some(RawValue::Number(*f)),
        Data::Int(i) => Some(RawValue::Number(*i as f64)),
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(RawValue::Text(s.clone())),
        other => Some(RawValue::Text(other.to_string())),
    }
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(LoadError::SheetNotFound(name.to_string()));
            }
            name.to_string()
        }
        None => workbook.sheet_names().into_iter().next().ok_or(LoadError::NoSheets)?,
    };
    let range = workbook.worksheet_range(&sheet_name)?;
    let mut lines = range.rows();
    let columns: Vec<String> = match lines.next() {
        Some(header) => header.iter().map(header_name).collect(),
        None => {
            warn!(sheet = %sheet_name, "sheet is empty");
            return Ok(RawTable::default());
        }
    };
    let mut rows = Vec::new();
    for line in lines {
        let mut raw = RawRecord::new();
        for (name, cell) in columns.iter().zip(line.iter()) {
            if let Some(value) = cell_value(cell) { raw.insert(name.clone(), value); }
        }
        rows.push(raw);
    }
    info!(sheet = %sheet_name, columns = columns.len(), rows = rows.len(), "workbook_read");
    Ok(RawTable::new(columns, rows))
}

/// Built-in US state table unless a YAML mapping file is given.
pub fn load_region_table(path: Option<&Path>) -> Result<RegionCodeTable, LoadError> {
    let Some(path) = path else { return Ok(RegionCodeTable::us_states()); };
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io { path: path.display().to_string(), source })?;
    let table: RegionCodeTable = serde_yaml::from_str(&text)?;
    info!(path = %path.display(), regions = table.len(), "region_table_loaded");
    Ok(table)
}

/// Loads, derives and freezes the leaderboard. Any error here is fatal to startup.
pub fn load_snapshot(dataset: &Path, sheet: Option<&str>, region_table: Option<&Path>) -> Result<Leaderboard, LoadError> {
    let regions = load_region_table(region_table)?;
    let raw = load_raw_table(dataset, sheet)?;
    let board = Leaderboard::from_raw(&raw, &SourceSchema::default(), &regions)?;
    info!(rows = board.len(), regions = board.region_options().len(), "dataset_loaded");
    Ok(board)
}
