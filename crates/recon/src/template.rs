//! Template-mode schema drift detection.
//!
//! Given the schema captured from the reference file, check whether a target
//! workbook still has the expected sheet and header columns. When columns are
//! missing at the expected row, scan nearby rows for the best-matching header.
//! Findings are informational: nothing here blocks a comparison.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::{Sheet, TemplateConfig, TemplateValidation};
use crate::normalize::{normalize, normalize_cell};
use crate::source::WorkbookSource;

/// Bounds and acceptance threshold for header-row recovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryOptions {
    /// Rows scanned from the top of the sheet.
    #[serde(default = "default_scan_rows")]
    pub scan_rows: usize,
    /// Columns read per row.
    #[serde(default = "default_scan_cols")]
    pub scan_cols: usize,
    /// Fraction of template columns a candidate row must contain.
    #[serde(default = "default_min_match_ratio")]
    pub min_match_ratio: f64,
}

fn default_scan_rows() -> usize {
    50
}

fn default_scan_cols() -> usize {
    40
}

fn default_min_match_ratio() -> f64 {
    0.5
}

impl Default for RecoveryOptions {
    fn default() -> Self {
        Self {
            scan_rows: default_scan_rows(),
            scan_cols: default_scan_cols(),
            min_match_ratio: default_min_match_ratio(),
        }
    }
}

impl RecoveryOptions {
    /// Minimum intersection size for `expected` distinct columns.
    pub fn required_matches(&self, expected: usize) -> usize {
        let needed = (self.min_match_ratio * expected as f64).ceil() as usize;
        needed.max(1)
    }
}

/// Normalized non-empty cell values of one row, limited to `max_cols`.
pub fn columns_at_row(sheet: &Sheet, row: usize, max_cols: usize) -> Vec<String> {
    sheet
        .row(row)
        .iter()
        .take(max_cols)
        .filter(|cell| !cell.is_empty())
        .map(normalize_cell)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Best header-row candidate for `expected` columns, compared case-insensitively.
///
/// The first row with the highest match count wins; it is accepted only if
/// the count reaches `options.required_matches`.
pub fn find_header_row(sheet: &Sheet, expected: &[String], options: &RecoveryOptions) -> Option<usize> {
    let expected_lower: HashSet<String> = expected
        .iter()
        .map(|c| normalize(c).to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();

    let mut best_row = None;
    let mut best_match = 0;
    for row in 0..options.scan_rows.min(sheet.height()) {
        let row_values: HashSet<String> = columns_at_row(sheet, row, options.scan_cols)
            .into_iter()
            .map(|c| c.to_lowercase())
            .collect();
        let match_count = expected_lower.intersection(&row_values).count();
        if match_count > best_match {
            best_match = match_count;
            best_row = Some(row);
        }
    }

    let required = options.required_matches(expected_lower.len());
    if best_match >= required {
        best_row
    } else {
        log::debug!(
            "sheet '{}': best header candidate matched {best_match}/{} columns, need {required}",
            sheet.name,
            expected_lower.len()
        );
        None
    }
}

/// Template column names as they compare against a header row.
fn expected_columns(template: &TemplateConfig) -> Vec<String> {
    template
        .columns
        .iter()
        .map(|c| normalize(c))
        .filter(|c| !c.is_empty())
        .collect()
}

/// Validate an already loaded sheet against the template.
pub fn validate_sheet(
    template: &TemplateConfig,
    sheet: &Sheet,
    sheet_found: bool,
    options: &RecoveryOptions,
) -> TemplateValidation {
    let actual = columns_at_row(sheet, template.header_row, options.scan_cols);
    let expected = expected_columns(template);

    let missing: Vec<String> = expected
        .iter()
        .filter(|c| !actual.contains(c))
        .cloned()
        .collect();
    let extra: Vec<String> = actual
        .iter()
        .filter(|c| !expected.contains(c))
        .cloned()
        .collect();

    let recovered_row = if missing.is_empty() {
        None
    } else {
        find_header_row(sheet, &expected, options)
    };

    TemplateValidation {
        expected_row: template.header_row,
        missing_columns: missing,
        extra_columns: extra,
        recovered_row,
        sheet_found,
        expected_sheet: template.sheet.clone(),
        actual_sheet: Some(sheet.name.clone()),
    }
}

/// Validate a target workbook against the template.
///
/// Never fails: an unreadable workbook or sheet is reported as "sheet not
/// found" with every template column missing.
pub fn validate(
    template: &TemplateConfig,
    path: &Path,
    source: &dyn WorkbookSource,
    options: &RecoveryOptions,
) -> TemplateValidation {
    let degraded = |actual_sheet: Option<String>| TemplateValidation {
        expected_row: template.header_row,
        missing_columns: expected_columns(template),
        extra_columns: Vec::new(),
        recovered_row: None,
        sheet_found: false,
        expected_sheet: template.sheet.clone(),
        actual_sheet,
    };

    let names = match source.sheet_names(path) {
        Ok(names) => names,
        Err(e) => {
            log::warn!("template check: {e}");
            return degraded(None);
        }
    };

    let sheet_found = names.iter().any(|n| *n == template.sheet);
    let actual_sheet = if sheet_found {
        template.sheet.clone()
    } else {
        match names.into_iter().next() {
            Some(first) => first,
            None => return degraded(None),
        }
    };

    match source.load_sheet(path, &actual_sheet) {
        Ok(sheet) => validate_sheet(template, &sheet, sheet_found, options),
        Err(e) => {
            log::warn!("template check: {e}");
            degraded(Some(actual_sheet))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;
    use crate::source::MemoryWorkbooks;

    fn template() -> TemplateConfig {
        TemplateConfig {
            sheet: "Data".into(),
            header_row: 2,
            columns: vec!["ID".into(), "Name".into(), "Date".into()],
        }
    }

    fn shifted_sheet() -> Sheet {
        Sheet::from_strings(
            "Data",
            &[
                &["Report"],
                &[],
                &[],
                &[],
                &["ID", "Name", "Date"],
                &["1", "a", "2024-01-01"],
            ],
        )
    }

    #[test]
    fn required_matches_rounds_up_with_floor_of_one() {
        let opts = RecoveryOptions::default();
        assert_eq!(opts.required_matches(3), 2);
        assert_eq!(opts.required_matches(4), 2);
        assert_eq!(opts.required_matches(1), 1);
        assert_eq!(opts.required_matches(0), 1);
    }

    #[test]
    fn clean_when_header_in_place() {
        let sheet = Sheet::from_strings("Data", &[&[], &[], &["ID", "Name", "Date", "Notes"]]);
        let v = validate_sheet(&template(), &sheet, true, &RecoveryOptions::default());
        assert!(v.missing_columns.is_empty());
        assert_eq!(v.extra_columns, vec!["Notes"]);
        assert_eq!(v.recovered_row, None);
        assert!(v.is_clean());
    }

    #[test]
    fn shifted_header_is_recovered() {
        let v = validate_sheet(&template(), &shifted_sheet(), true, &RecoveryOptions::default());
        assert_eq!(v.missing_columns, vec!["ID", "Name", "Date"]);
        assert_eq!(v.recovered_row, Some(4));
        assert!(v.header_mismatch());
    }

    #[test]
    fn recovery_is_case_insensitive() {
        let sheet = Sheet::from_strings("Data", &[&["id", "NAME", "x"]]);
        let found = find_header_row(&sheet, &template().columns, &RecoveryOptions::default());
        assert_eq!(found, Some(0));
    }

    #[test]
    fn missing_uses_exact_case() {
        let sheet = Sheet::from_strings("Data", &[&[], &[], &["id", "Name", "Date"]]);
        let v = validate_sheet(&template(), &sheet, true, &RecoveryOptions::default());
        assert_eq!(v.missing_columns, vec!["ID"]);
        assert_eq!(v.extra_columns, vec!["id"]);
        // row 2 itself has 3 case-insensitive matches
        assert_eq!(v.recovered_row, Some(2));
    }

    #[test]
    fn template_names_are_normalized() {
        let padded = TemplateConfig {
            sheet: "Data".into(),
            header_row: 2,
            columns: vec!["Vendor  Code".into(), " ID".into()],
        };
        let in_place = Sheet::from_strings("Data", &[&[], &[], &["Vendor Code", "ID"]]);
        let v = validate_sheet(&padded, &in_place, true, &RecoveryOptions::default());
        assert!(v.is_clean(), "{v:?}");
        assert!(v.extra_columns.is_empty());

        let moved = Sheet::from_strings("Data", &[&[], &[], &[], &[], &["vendor code", "Id"]]);
        let v = validate_sheet(&padded, &moved, true, &RecoveryOptions::default());
        assert_eq!(v.missing_columns, vec!["Vendor Code", "ID"]);
        assert_eq!(v.recovered_row, Some(4));
    }

    #[test]
    fn first_best_row_wins_ties() {
        let sheet = Sheet::from_strings("Data", &[&["ID", "Name"], &["ID", "Name"], &["ID"]]);
        let found = find_header_row(&sheet, &template().columns, &RecoveryOptions::default());
        assert_eq!(found, Some(0));
    }

    #[test]
    fn below_threshold_is_not_recovered() {
        let sheet = Sheet::from_strings("Data", &[&["ID", "other"]]);
        let found = find_header_row(&sheet, &template().columns, &RecoveryOptions::default());
        assert_eq!(found, None);
    }

    #[test]
    fn scan_window_is_bounded() {
        let mut rows = vec![vec![CellValue::Empty]; 60];
        rows.push(vec!["ID".into(), "Name".into(), "Date".into()]);
        let sheet = Sheet::new("Data", rows);
        let opts = RecoveryOptions::default();
        assert_eq!(find_header_row(&sheet, &template().columns, &opts), None);

        let wide = RecoveryOptions { scan_rows: 100, ..RecoveryOptions::default() };
        assert_eq!(find_header_row(&sheet, &template().columns, &wide), Some(60));
    }

    #[test]
    fn columns_beyond_scan_cols_are_ignored() {
        let mut row = vec![CellValue::Empty; 40];
        row.push(CellValue::from("ID"));
        let sheet = Sheet::new("Data", vec![row]);
        assert!(columns_at_row(&sheet, 0, 40).is_empty());
        assert_eq!(columns_at_row(&sheet, 0, 41), vec!["ID"]);
    }

    #[test]
    fn missing_sheet_falls_back_to_first() {
        let source = MemoryWorkbooks::new().with(
            "b.xlsx",
            vec![shifted_sheet_named("Sheet1"), Sheet::from_strings("Other", &[])],
        );
        let v = validate(&template(), Path::new("b.xlsx"), &source, &RecoveryOptions::default());
        assert!(!v.sheet_found);
        assert_eq!(v.actual_sheet.as_deref(), Some("Sheet1"));
        assert_eq!(v.recovered_row, Some(4));
    }

    #[test]
    fn unreadable_workbook_degrades() {
        let source = MemoryWorkbooks::new();
        let v = validate(&template(), Path::new("gone.xlsx"), &source, &RecoveryOptions::default());
        assert!(!v.sheet_found);
        assert_eq!(v.actual_sheet, None);
        assert_eq!(v.missing_columns, template().columns);
        assert_eq!(v.recovered_row, None);
    }

    fn shifted_sheet_named(name: &str) -> Sheet {
        let mut sheet = shifted_sheet();
        sheet.name = name.into();
        sheet
    }
}
