//! Workbook access seam.
//!
//! The engine never decodes files itself. Callers hand it a `WorkbookSource`
//! that lists sheets and materializes them as `Sheet` snapshots. An
//! implementation must not release a workbook while a call is reading it;
//! the engine only calls one method at a time.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ReconError;
use crate::model::Sheet;

pub trait WorkbookSource {
    /// Sheet names in declaration order.
    fn sheet_names(&self, path: &Path) -> Result<Vec<String>, ReconError>;

    /// Load one sheet as a snapshot.
    fn load_sheet(&self, path: &Path, sheet: &str) -> Result<Sheet, ReconError>;
}

/// The configured sheet if the workbook has it, else the first declared sheet.
pub fn resolve_sheet_name(
    source: &dyn WorkbookSource,
    path: &Path,
    preferred: &str,
) -> Result<String, ReconError> {
    let names = source.sheet_names(path)?;
    if names.iter().any(|n| n == preferred) {
        return Ok(preferred.to_string());
    }
    let first = names.into_iter().next().ok_or_else(|| ReconError::SheetNotFound {
        path: path.display().to_string(),
        sheet: preferred.to_string(),
    })?;
    log::warn!(
        "{}: sheet '{preferred}' not found, using '{first}'",
        path.display()
    );
    Ok(first)
}

/// In-memory workbooks keyed by path. Sheets keep insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemoryWorkbooks {
    books: HashMap<PathBuf, Vec<Sheet>>,
}

impl MemoryWorkbooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, sheets: Vec<Sheet>) {
        self.books.insert(path.into(), sheets);
    }

    pub fn with(mut self, path: impl Into<PathBuf>, sheets: Vec<Sheet>) -> Self {
        self.insert(path, sheets);
        self
    }

    fn book(&self, path: &Path) -> Result<&Vec<Sheet>, ReconError> {
        self.books.get(path).ok_or_else(|| ReconError::Workbook {
            path: path.display().to_string(),
            message: "no such workbook".into(),
        })
    }
}

impl WorkbookSource for MemoryWorkbooks {
    fn sheet_names(&self, path: &Path) -> Result<Vec<String>, ReconError> {
        Ok(self.book(path)?.iter().map(|s| s.name.clone()).collect())
    }

    fn load_sheet(&self, path: &Path, sheet: &str) -> Result<Sheet, ReconError> {
        self.book(path)?
            .iter()
            .find(|s| s.name == sheet)
            .cloned()
            .ok_or_else(|| ReconError::SheetNotFound {
                path: path.display().to_string(),
                sheet: sheet.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn books() -> MemoryWorkbooks {
        MemoryWorkbooks::new().with(
            "a.xlsx",
            vec![Sheet::from_strings("Summary", &[]), Sheet::from_strings("Data", &[&["x"]])],
        )
    }

    #[test]
    fn resolves_preferred_sheet() {
        let name = resolve_sheet_name(&books(), Path::new("a.xlsx"), "Data").unwrap();
        assert_eq!(name, "Data");
    }

    #[test]
    fn falls_back_to_first_sheet() {
        let name = resolve_sheet_name(&books(), Path::new("a.xlsx"), "data").unwrap();
        assert_eq!(name, "Summary");
    }

    #[test]
    fn empty_workbook_is_an_error() {
        let source = MemoryWorkbooks::new().with("empty.xlsx", vec![]);
        let err = resolve_sheet_name(&source, Path::new("empty.xlsx"), "Data").unwrap_err();
        assert!(matches!(err, ReconError::SheetNotFound { .. }));
    }

    #[test]
    fn unknown_path_is_workbook_error() {
        let err = books().sheet_names(Path::new("nope.xlsx")).unwrap_err();
        assert!(err.to_string().contains("nope.xlsx"));
    }
}
