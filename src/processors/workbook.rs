//! Spreadsheet ingestion: .xlsx / .xls / .ods via calamine, .csv via the csv crate

use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::{debug, info};

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{CellValue, Sheet, Workbook};

/// Extensions accepted by `read_workbook`
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods", "csv"];

/// Read every non-empty sheet of a spreadsheet file.
///
/// A CSV file yields a single sheet named after the file stem.
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TranslationError::FileError {
            path: path.display().to_string(),
            message: "file not found".to_string(),
        });
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let workbook = match extension.as_str() {
        "csv" => read_csv(path)?,
        ext if SUPPORTED_EXTENSIONS.contains(&ext) => read_spreadsheet(path)?,
        other => {
            return Err(TranslationError::InvalidFormat {
                format: other.to_string(),
            })
        }
    };

    info!(
        "Loaded {}: {} sheets, {} rows",
        path.display(),
        workbook.sheets.len(),
        workbook.total_rows()
    );
    Ok(workbook)
}

fn read_spreadsheet(path: &Path) -> Result<Workbook> {
    let mut spreadsheet = open_workbook_auto(path)?;
    let mut sheets = Vec::new();

    for name in spreadsheet.sheet_names().to_vec() {
        let range = spreadsheet.worksheet_range(&name)?;
        let grid: Vec<Vec<CellValue>> = range
            .rows()
            .map(|line| line.iter().map(cell_from_data).collect())
            .collect();

        match Sheet::from_grid(name.as_str(), grid) {
            Some(sheet) => sheets.push(sheet),
            None => debug!("Skipping empty sheet '{}'", name),
        }
    }

    Ok(Workbook::new(sheets))
}

fn read_csv(path: &Path) -> Result<Workbook> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1")
        .to_string();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(cell_from_csv).collect());
    }

    Ok(Workbook::new(Sheet::from_grid(name, grid).into_iter().collect()))
}

/// Map a calamine cell onto the pipeline's cell model.
///
/// Only string cells become text; dates keep their serial number.
pub fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        other => CellValue::Verbatim {
            verbatim: other.to_string(),
        },
    }
}

/// CSV cells carry no type: plain numeric values become numbers.
///
/// Zero-padded or space-padded fields (`007`, ` 42`) stay text.
fn cell_from_csv(field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }
    if field.trim() != field || is_zero_padded(field) || field.starts_with('+') {
        return CellValue::Text(field.to_string());
    }
    match field.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(field.to_string()),
    }
}

fn is_zero_padded(field: &str) -> bool {
    let digits = field.strip_prefix('-').unwrap_or(field);
    digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.")
}
