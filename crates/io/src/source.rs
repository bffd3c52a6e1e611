use std::path::Path;

use colcmp_recon::model::Sheet;
use colcmp_recon::source::WorkbookSource;
use colcmp_recon::ReconError;
use serde::Serialize;

use crate::{csv, xlsx, Format};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetInfo {
    pub name: String,
    /// Hidden or very hidden.
    pub hidden: bool,
}

/// Sheets of any supported file. Delimited files have one visible sheet
/// named after the file stem.
pub fn list_sheets(path: &Path) -> Result<Vec<SheetInfo>, ReconError> {
    match Format::from_path(path) {
        Format::Csv | Format::Tsv => {
            if !path.is_file() {
                return Err(ReconError::Io(format!("{}: no such file", path.display())));
            }
            Ok(vec![SheetInfo {
                name: csv::sheet_name(path),
                hidden: false,
            }])
        }
        Format::Spreadsheet => xlsx::list_sheets(path).map_err(|e| workbook_error(path, e)),
    }
}

fn workbook_error(path: &Path, message: String) -> ReconError {
    ReconError::Workbook {
        path: path.display().to_string(),
        message,
    }
}

/// Reads workbooks from disk, dispatching on file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSource;

impl WorkbookSource for FileSource {
    fn sheet_names(&self, path: &Path) -> Result<Vec<String>, ReconError> {
        Ok(list_sheets(path)?.into_iter().map(|s| s.name).collect())
    }

    fn load_sheet(&self, path: &Path, sheet: &str) -> Result<Sheet, ReconError> {
        let loaded = match Format::from_path(path) {
            Format::Csv | Format::Tsv if sheet != csv::sheet_name(path) => {
                return Err(ReconError::SheetNotFound {
                    path: path.display().to_string(),
                    sheet: sheet.to_string(),
                });
            }
            Format::Csv => csv::load(path),
            Format::Tsv => csv::load_tsv(path),
            Format::Spreadsheet => xlsx::load_sheet(path, sheet),
        };
        loaded.map_err(|e| workbook_error(path, e))
    }
}
