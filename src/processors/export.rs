//! Serialization of translated workbooks: CSV, XLSX and clipboard text

use rust_xlsxwriter::Workbook as XlsxWorkbook;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{CellValue, Sheet, TranslatedResult, TranslationResults};

/// Excel's limit on worksheet name length
const MAX_SHEET_NAME: usize = 31;

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(TranslationError::InvalidFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Serialize one sheet as CSV, header line first, cells in header order
pub fn sheet_to_csv(sheet: &Sheet) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        writer.write_record(sheet.ordered_values(row).map(|v| v.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TranslationError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| TranslationError::InvalidFormat {
        format: format!("non UTF-8 CSV output: {}", e),
    })
}

/// All sheets of a result as one block of text, each prefixed by `=== {sheet} ===`
pub fn clipboard_text(result: &TranslatedResult) -> Result<String> {
    let mut text = String::new();
    for sheet in &result.sheets {
        text.push_str(&format!("\n=== {} ===\n", sheet.name));
        text.push_str(sheet_to_csv(sheet)?.trim_end_matches('\n'));
        text.push('\n');
    }
    Ok(text)
}

/// Write one CSV file per sheet.
///
/// A single-sheet result goes to `assessment_{lang}.csv`; several sheets to
/// `assessment_{lang}_{sheet}.csv`.
pub fn write_csv(result: &TranslatedResult, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(result.sheets.len());
    for sheet in &result.sheets {
        let file_name = if result.sheets.len() == 1 {
            format!("assessment_{}.csv", result.target_lang)
        } else {
            format!(
                "assessment_{}_{}.csv",
                result.target_lang,
                file_safe(&sheet.name)
            )
        };
        let path = dir.join(file_name);
        std::fs::write(&path, sheet_to_csv(sheet)?)?;
        written.push(path);
    }
    Ok(written)
}

/// Write every sheet of a result into `{LanguageName}_translation.xlsx`
pub fn write_xlsx(result: &TranslatedResult, dir: &Path) -> Result<PathBuf> {
    let mut workbook = XlsxWorkbook::new();
    let mut taken = HashSet::new();

    for sheet in &result.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(unique_worksheet_name(&sheet.name, &mut taken))?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet.write_string(0, col as u16, header)?;
        }

        for (index, row) in sheet.rows.iter().enumerate() {
            let line = (index + 1) as u32;
            for (col, value) in sheet.ordered_values(row).enumerate() {
                match value {
                    CellValue::Text(s) if s.is_empty() => {}
                    CellValue::Text(s) => {
                        worksheet.write_string(line, col as u16, s)?;
                    }
                    CellValue::Number(n) => {
                        worksheet.write_number(line, col as u16, *n)?;
                    }
                    CellValue::Bool(b) => {
                        worksheet.write_boolean(line, col as u16, *b)?;
                    }
                    CellValue::Verbatim { verbatim } => {
                        worksheet.write_string(line, col as u16, verbatim)?;
                    }
                    CellValue::Empty => {}
                }
            }
        }
    }

    let path = dir.join(format!("{}_translation.xlsx", file_safe(&result.language_name())));
    workbook.save(&path)?;
    Ok(path)
}

/// Export every language of `results` into `dir`, creating it if needed
pub fn export_results(
    results: &TranslationResults,
    dir: &Path,
    format: ExportFormat,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for result in results.values() {
        match format {
            ExportFormat::Xlsx => written.push(write_xlsx(result, dir)?),
            ExportFormat::Csv => written.extend(write_csv(result, dir)?),
        }
    }

    info!("Exported {} files to {}", written.len(), dir.display());
    Ok(written)
}

/// Worksheet names: at most 31 chars, none of `[]:*?/\`
fn worksheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
        .take(MAX_SHEET_NAME)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}

/// Sanitized name not yet used in this workbook; clashes get a `~n` suffix.
///
/// Excel compares sheet names case-insensitively.
fn unique_worksheet_name(name: &str, taken: &mut HashSet<String>) -> String {
    let base = worksheet_name(name);
    let mut candidate = base.clone();
    let mut n = 2;
    while taken.contains(&candidate.to_lowercase()) {
        let suffix = format!("~{}", n);
        let keep = MAX_SHEET_NAME - suffix.chars().count();
        candidate = base.chars().take(keep).collect::<String>() + &suffix;
        n += 1;
    }
    taken.insert(candidate.to_lowercase());
    candidate
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::Row;
    use crate::processors::workbook::read_workbook;

    fn row(fields: &[(&str, CellValue)]) -> Row {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn quiz(name: &str) -> Sheet {
        Sheet::new(
            name,
            vec!["question".to_string(), "marks".to_string(), "notes".to_string()],
            vec![
                row(&[("question", "बिल्ली, कुत्ता".into()), ("marks", CellValue::Number(2.0))]),
                row(&[("question", "कुत्ता".into()), ("marks", CellValue::Number(1.5)), ("notes", "".into())]),
            ],
        )
    }

    fn result(sheets: Vec<Sheet>) -> TranslatedResult {
        TranslatedResult {
            target_lang: "hi".to_string(),
            sheets,
        }
    }

    #[test]
    fn test_sheet_to_csv_uses_header_order() {
        let csv = sheet_to_csv(&quiz("Sheet1")).unwrap();
        assert_eq!(
            csv,
            "question,marks,notes\n\"बिल्ली, कुत्ता\",2,\nकुत्ता,1.5,\n"
        );
    }

    #[test]
    fn test_clipboard_text() {
        let text = clipboard_text(&result(vec![quiz("A"), quiz("B")])).unwrap();
        assert!(text.starts_with("\n=== A ===\nquestion,marks,notes\n"));
        assert!(text.contains("\n=== B ===\n"));
        assert!(text.ends_with("कुत्ता,1.5,\n"));
    }

    #[test]
    fn test_csv_file_names() {
        let dir = tempfile::tempdir().unwrap();

        let single = write_csv(&result(vec![quiz("Sheet1")]), dir.path()).unwrap();
        assert_eq!(single, vec![dir.path().join("assessment_hi.csv")]);

        let multi = write_csv(&result(vec![quiz("Set A"), quiz("Set B")]), dir.path()).unwrap();
        assert_eq!(
            multi,
            vec![
                dir.path().join("assessment_hi_Set_A.csv"),
                dir.path().join("assessment_hi_Set_B.csv")
            ]
        );
    }

    #[test]
    fn test_xlsx_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_xlsx(&result(vec![quiz("Set A"), quiz("Set B")]), dir.path()).unwrap();
        assert_eq!(path, dir.path().join("Hindi_translation.xlsx"));

        let workbook = read_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Set A", "Set B"]);
        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.headers, vec!["question", "marks", "notes"]);
        assert_eq!(sheet.rows[0]["question"], CellValue::from("बिल्ली, कुत्ता"));
        assert_eq!(sheet.rows[1]["marks"], CellValue::Number(1.5));
        assert_eq!(sheet.rows[1]["notes"], CellValue::Empty);
    }

    #[test]
    fn test_export_results_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut results = TranslationResults::new();
        results.insert("hi".to_string(), result(vec![quiz("Sheet1")]));

        let written = export_results(&results, &out, ExportFormat::Csv).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].exists());
    }

    #[test]
    fn test_worksheet_name_sanitized() {
        assert_eq!(worksheet_name("Q1/Q2"), "Q1_Q2");
        assert_eq!(worksheet_name(&"x".repeat(40)).len(), 31);
        assert_eq!(worksheet_name(""), "Sheet");
    }

    #[test]
    fn test_clashing_sheet_names_get_suffix() {
        let mut taken = HashSet::new();
        assert_eq!(unique_worksheet_name("Q1/Q2", &mut taken), "Q1_Q2");
        assert_eq!(unique_worksheet_name("Q1_Q2", &mut taken), "Q1_Q2~2");
        assert_eq!(unique_worksheet_name("q1_q2", &mut taken), "q1_q2~3");

        let long = "x".repeat(40);
        assert_eq!(unique_worksheet_name(&long, &mut taken).len(), 31);
        let second = unique_worksheet_name(&long, &mut taken);
        assert_eq!(second.len(), 31);
        assert!(second.ends_with("~2"));
    }

    #[test]
    fn test_xlsx_with_clashing_sheet_names_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_xlsx(&result(vec![quiz("Q1/Q2"), quiz("Q1_Q2")]), dir.path()).unwrap();

        let workbook = read_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Q1_Q2", "Q1_Q2~2"]);
    }

    #[test]
    fn test_non_text_cells_written_unchanged() {
        let sheet = Sheet::new(
            "Sheet1",
            vec!["is_correct".to_string(), "score".to_string()],
            vec![row(&[
                ("is_correct", CellValue::Bool(true)),
                ("score", CellValue::Verbatim { verbatim: "#N/A".to_string() }),
            ])],
        );
        assert_eq!(sheet_to_csv(&sheet).unwrap(), "is_correct,score\nTRUE,#N/A\n");

        let dir = tempfile::tempdir().unwrap();
        let path = write_xlsx(&result(vec![sheet]), dir.path()).unwrap();
        let workbook = read_workbook(&path).unwrap();
        assert_eq!(workbook.sheets[0].rows[0]["is_correct"], CellValue::Bool(true));
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
