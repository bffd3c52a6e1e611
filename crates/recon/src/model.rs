use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sheet snapshot
// ---------------------------------------------------------------------------

/// A raw cell as decoded by the workbook loader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Int(i64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Display text before normalization.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            // Integers without decimals
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => format!("{n}"),
            Self::Int(n) => format!("{n}"),
            Self::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Self::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Self::Error(e) => e.clone(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

/// Read-only snapshot of one worksheet.
///
/// Row 0 is spreadsheet row 1 and column 0 is column A: loaders pad leading
/// empty rows/columns so positions are absolute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { name: name.into(), rows }
    }

    /// Build a sheet from string cells; empty strings become `CellValue::Empty`.
    pub fn from_strings(name: impl Into<String>, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|s| CellValue::from(*s)).collect())
            .collect();
        Self { name: name.into(), rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Cells of a row; rows past the end are empty.
    pub fn row(&self, index: usize) -> &[CellValue] {
        self.rows.get(index).map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.row(row).get(col).unwrap_or(&EMPTY)
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// One file's selection: sheet, header row and the columns to compare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    pub path: PathBuf,
    pub sheet: String,
    /// 0-based position of the header row within the sheet.
    pub header_row: usize,
    pub columns: Vec<String>,
}

impl FileConfig {
    /// File name for display, falling back to the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPair {
    pub reference: String,
    pub target: String,
}

impl ColumnPair {
    pub fn new(reference: impl Into<String>, target: impl Into<String>) -> Self {
        Self { reference: reference.into(), target: target.into() }
    }
}

/// Column pairs from the reference file (#1) to one target file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    /// Index of the target in the session's file list (>= 1).
    pub target: usize,
    pub pairs: Vec<ColumnPair>,
}

// ---------------------------------------------------------------------------
// Extraction + reconciliation
// ---------------------------------------------------------------------------

/// Physical (1-based) row number to normalized value, for one column.
/// Blank and "nan" cells are absent, never stored as empty strings.
pub type ColumnValueMap = BTreeMap<u32, String>;

/// Values of one column, tagged with the column name for row attribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnData {
    pub column: String,
    pub values: ColumnValueMap,
}

/// Row number to the {column: value} cells that were unique to that side.
pub type AttributedRows = BTreeMap<u32, BTreeMap<String, String>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub common: BTreeSet<String>,
    pub only_in_a: BTreeSet<String>,
    pub only_in_b: BTreeSet<String>,
    pub rows_only_in_a: AttributedRows,
    pub rows_only_in_b: AttributedRows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Reference,
    Target,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reference => write!(f, "reference"),
            Self::Target => write!(f, "target"),
        }
    }
}

/// A mapped column that produced no values. Usually a header-row or name
/// mismatch rather than a real divergence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnWarning {
    pub side: Side,
    pub column: String,
}

// ---------------------------------------------------------------------------
// Template mode
// ---------------------------------------------------------------------------

/// Schema captured from the first file processed in template mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub sheet: String,
    pub header_row: usize,
    pub columns: Vec<String>,
}

impl TemplateConfig {
    pub fn from_file_config(file: &FileConfig) -> Self {
        Self {
            sheet: file.sheet.clone(),
            header_row: file.header_row,
            columns: file.columns.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateValidation {
    /// 0-based header row the template expects.
    pub expected_row: usize,
    pub missing_columns: Vec<String>,
    pub extra_columns: Vec<String>,
    /// 0-based row where the template header was found instead, if any.
    pub recovered_row: Option<usize>,
    pub sheet_found: bool,
    pub expected_sheet: String,
    /// Sheet actually read; `None` when the workbook could not be read.
    pub actual_sheet: Option<String>,
}

impl TemplateValidation {
    pub fn is_clean(&self) -> bool {
        self.sheet_found && self.missing_columns.is_empty()
    }

    /// Header moved: columns missing at the expected row but found elsewhere.
    pub fn header_mismatch(&self) -> bool {
        !self.missing_columns.is_empty() && self.recovered_row.is_some()
    }
}
