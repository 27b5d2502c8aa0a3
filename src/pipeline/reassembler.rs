//! Row reassembly from a completed translation lookup

use crate::core::models::{is_eligible, CellValue, Row, Sheet, TranslatableColumns, TranslationLookup};

/// Map `rows` through `lookup`.
///
/// Only eligible fields with a lookup entry change; everything else, including
/// numbers, blanks and columns outside the allow-list, is copied verbatim.
pub fn apply_lookup(
    rows: &[Row],
    lookup: &TranslationLookup,
    columns: Option<&TranslatableColumns>,
) -> Vec<Row> {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|(column, value)| {
                    let translated = match value {
                        CellValue::Text(text) if is_eligible(column, value, columns) => lookup
                            .get(text)
                            .map(|t| CellValue::Text(t.to_string()))
                            .unwrap_or_else(|| value.clone()),
                        _ => value.clone(),
                    };
                    (column.clone(), translated)
                })
                .collect()
        })
        .collect()
}

/// Translated copy of `sheet` with identical name and headers
pub fn translate_sheet(
    sheet: &Sheet,
    lookup: &TranslationLookup,
    columns: Option<&TranslatableColumns>,
) -> Sheet {
    Sheet::new(
        sheet.name.clone(),
        sheet.headers.clone(),
        apply_lookup(&sheet.rows, lookup, columns),
    )
}
