// Workbook loading: Excel/ODS via calamine, CSV/TSV via csv, raw OOXML parts via zip + quick-xml

pub mod csv;
pub mod source;
pub mod structure;
pub mod xlsx;

pub use source::{list_sheets, FileSource, SheetInfo};
pub use structure::filter_header_rows;

use std::path::Path;

/// Input formats, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Tsv,
    /// xlsx, xlsm, xlsb, xls, ods: anything calamine opens.
    Spreadsheet,
}

impl Format {
    pub fn from_path(path: &Path) -> Format {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Format::Csv,
            "tsv" | "tab" => Format::Tsv,
            _ => Format::Spreadsheet,
        }
    }

    pub fn is_ooxml(path: &Path) -> bool {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        matches!(ext.as_str(), "xlsx" | "xlsm")
    }
}
