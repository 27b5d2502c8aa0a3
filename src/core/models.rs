//! Core data models for workbook translation

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Source language of all assessment content
pub const SOURCE_LANG: &str = "en";

/// Columns translated in a standard assessment sheet
pub const ASSESSMENT_COLUMNS: &[&str] = &[
    "question",
    "option_a_content",
    "option_b_content",
    "option_c_content",
    "option_d_content",
    "correct_feedback",
    "incorrect_feedback",
];

/// Translation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Translate v2 (single call per batch)
    #[default]
    Google,
    /// Bhashini ULCA pipeline (discovery call, then compute call)
    Bhashini,
}

impl ProviderKind {
    /// Maximum number of texts in one translation call
    pub fn batch_size(&self) -> usize {
        match self {
            ProviderKind::Google => 50,
            ProviderKind::Bhashini => 10,
        }
    }

    /// Languages offered for this provider
    pub fn languages(&self) -> &'static [Language] {
        match self {
            ProviderKind::Google => GOOGLE_LANGUAGES,
            ProviderKind::Bhashini => BHASHINI_LANGUAGES,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Google => write!(f, "google"),
            ProviderKind::Bhashini => write!(f, "bhashini"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(ProviderKind::Google),
            "bhashini" => Ok(ProviderKind::Bhashini),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Target language entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native: &'static str,
}

const fn lang(code: &'static str, name: &'static str, native: &'static str) -> Language {
    Language { code, name, native }
}

/// Languages served by the Bhashini pipeline
pub const BHASHINI_LANGUAGES: &[Language] = &[
    lang("hi", "Hindi", "हिंदी"),
    lang("bn", "Bengali", "বাংলা"),
    lang("ta", "Tamil", "தமிழ்"),
    lang("te", "Telugu", "తెలుగు"),
    lang("mr", "Marathi", "मराठी"),
    lang("gu", "Gujarati", "ગુજરાતી"),
    lang("kn", "Kannada", "ಕನ್ನಡ"),
    lang("ml", "Malayalam", "മലയാളം"),
    lang("pa", "Punjabi", "ਪੰਜਾਬੀ"),
    lang("or", "Odia", "ଓଡ଼ିଆ"),
    lang("as", "Assamese", "অসমীয়া"),
    lang("ur", "Urdu", "اردو"),
];

/// Indian languages offered through Google Translate
pub const GOOGLE_LANGUAGES: &[Language] = &[
    lang("hi", "Hindi", "हिंदी"),
    lang("bn", "Bengali", "বাংলা"),
    lang("ta", "Tamil", "தமிழ்"),
    lang("te", "Telugu", "తెలుగు"),
    lang("mr", "Marathi", "मराठी"),
    lang("gu", "Gujarati", "ગુજરાતી"),
    lang("kn", "Kannada", "ಕನ್ನಡ"),
    lang("ml", "Malayalam", "മലയാളം"),
    lang("pa", "Punjabi", "ਪੰਜਾਬੀ"),
    lang("or", "Odia", "ଓଡ଼ିଆ"),
    lang("as", "Assamese", "অসমীয়া"),
    lang("ur", "Urdu", "اردو"),
    lang("ne", "Nepali", "नेपाली"),
    lang("sa", "Sanskrit", "संस्कृत"),
];

/// Find a language by code in any provider table
pub fn find_language(code: &str) -> Option<&'static Language> {
    GOOGLE_LANGUAGES
        .iter()
        .chain(BHASHINI_LANGUAGES.iter())
        .find(|l| l.code.eq_ignore_ascii_case(code))
}

/// A single spreadsheet cell
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Non-text cell carried through untouched: formula errors, ISO dates and durations
    Verbatim { verbatim: String },
    #[default]
    Empty,
}

impl CellValue {
    /// Text worth sending to a provider: a string with visible content
    pub fn translatable_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) | CellValue::Bool(_) | CellValue::Verbatim { .. } => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            // Whole numbers print without a trailing ".0"
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(true) => write!(f, "TRUE"),
            CellValue::Bool(false) => write!(f, "FALSE"),
            CellValue::Verbatim { verbatim } => write!(f, "{}", verbatim),
            CellValue::Empty => Ok(()),
        }
    }
}

/// One data row, looked up by header name
pub type Row = BTreeMap<String, CellValue>;

/// A named table: positional headers plus rows keyed by header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Build a sheet from a raw cell grid whose first line is the header row.
    ///
    /// Returns `None` for a grid without any line.
    pub fn from_grid(name: impl Into<String>, grid: Vec<Vec<CellValue>>) -> Option<Self> {
        let mut lines = grid.into_iter();
        let raw_headers = lines.next()?;
        let headers = normalize_headers(&raw_headers);

        let rows = lines
            .map(|line| {
                let mut cells = line.into_iter();
                headers
                    .iter()
                    .map(|header| (header.clone(), cells.next().unwrap_or_default()))
                    .collect::<Row>()
            })
            .collect();

        Some(Self::new(name, headers, rows))
    }

    /// Cell values of a row in header order, blanks for missing fields
    pub fn ordered_values<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = &'a CellValue> + 'a {
        const BLANK: &CellValue = &CellValue::Empty;
        self.headers
            .iter()
            .map(move |header| row.get(header).unwrap_or(BLANK))
    }
}

/// Normalize a header line: trim names, replace blanks with `column_{index}`,
/// suffix duplicates with `_{n}`.
///
/// Generated names never take a name that appears literally in the line.
pub fn normalize_headers(raw: &[CellValue]) -> Vec<String> {
    let names: Vec<String> = raw.iter().map(|cell| cell.to_string().trim().to_string()).collect();
    let literal: HashSet<&str> = names
        .iter()
        .filter(|n| !n.is_empty())
        .map(|n| n.as_str())
        .collect();
    let mut emitted: HashSet<String> = HashSet::with_capacity(names.len());
    let mut headers = Vec::with_capacity(names.len());

    for (index, name) in names.iter().enumerate() {
        let header = if !name.is_empty() && !emitted.contains(name) {
            name.clone()
        } else {
            let base = if name.is_empty() {
                format!("column_{}", index)
            } else {
                name.clone()
            };
            let taken = |candidate: &str| emitted.contains(candidate) || literal.contains(candidate);
            if name.is_empty() && !taken(base.as_str()) {
                base
            } else {
                let mut n = 2;
                while taken(format!("{}_{}", base, n).as_str()) {
                    n += 1;
                }
                format!("{}_{}", base, n)
            }
        };
        emitted.insert(header.clone());
        headers.push(header);
    }

    headers
}

/// Ordered collection of sheets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Single-sheet workbook
    pub fn single(sheet: Sheet) -> Self {
        Self { sheets: vec![sheet] }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn total_rows(&self) -> usize {
        self.sheets.iter().map(|s| s.rows.len()).sum()
    }
}

/// Case-insensitive allow-list of translatable column names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatableColumns {
    names: HashSet<String>,
}

impl TranslatableColumns {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// The standard assessment columns
    pub fn assessment() -> Self {
        Self::new(ASSESSMENT_COLUMNS.iter())
    }

    pub fn allows(&self, column: &str) -> bool {
        self.names.contains(&column.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Whether a field is sent for translation.
///
/// A `None` allow-list admits every column.
pub fn is_eligible(column: &str, value: &CellValue, columns: Option<&TranslatableColumns>) -> bool {
    value.translatable_text().is_some() && columns.map_or(true, |c| c.allows(column))
}

/// Request handed to a provider for one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub texts: Vec<String>,
    pub source_lang: String,
    pub target_lang: String,
}

impl TranslationRequest {
    pub fn new(texts: Vec<String>, target_lang: impl Into<String>) -> Self {
        Self {
            texts,
            source_lang: SOURCE_LANG.to_string(),
            target_lang: target_lang.into(),
        }
    }
}

/// Original string -> translated string, for one (language, sheet) unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationLookup {
    entries: HashMap<String, String>,
}

impl TranslationLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, original: String, translated: String) {
        self.entries.insert(original, translated);
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(|s| s.as_str())
    }

    /// Translation of `original`, or `original` itself when absent
    pub fn translate<'a>(&'a self, original: &'a str) -> &'a str {
        self.get(original).unwrap_or(original)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One target language's translated workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedResult {
    pub target_lang: String,
    pub sheets: Vec<Sheet>,
}

impl TranslatedResult {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Display name used for exports, e.g. "Hindi"
    pub fn language_name(&self) -> String {
        find_language(&self.target_lang)
            .map(|l| l.name.to_string())
            .unwrap_or_else(|| self.target_lang.clone())
    }
}

/// Aggregated output keyed by target language
pub type TranslationResults = BTreeMap<String, TranslatedResult>;
