use serde::Serialize;

use crate::matcher::SearchPattern;
use crate::model::{AttributedRows, ColumnPair, ColumnWarning, ReconciliationResult, TemplateValidation};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileLabel {
    pub name: String,
    pub path: String,
    /// Sheet actually read (may differ from the configured one).
    pub sheet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairReport {
    /// Index of the target in the session's file list (>= 1).
    pub target_index: usize,
    pub reference: FileLabel,
    pub target: FileLabel,
    pub pairs: Vec<ColumnPair>,
    pub reference_columns: Vec<String>,
    pub target_columns: Vec<String>,
    pub result: ReconciliationResult,
    pub warnings: Vec<ColumnWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateValidation>,
}

impl PairReport {
    /// Rows whose mapped cells hold values missing from the target.
    pub fn reference_table(&self) -> ResultTable {
        ResultTable::from_rows(
            format!("Only in {} (vs {})", self.reference.name, self.target.name),
            &self.reference_columns,
            &self.result.rows_only_in_a,
        )
    }

    /// Rows whose mapped cells hold values missing from the reference.
    pub fn target_table(&self) -> ResultTable {
        ResultTable::from_rows(
            format!("Only in {} (vs {})", self.target.name, self.reference.name),
            &self.target_columns,
            &self.result.rows_only_in_b,
        )
    }

    pub fn has_differences(&self) -> bool {
        !self.result.only_in_a.is_empty() || !self.result.only_in_b.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairSummary {
    pub target_index: usize,
    pub reference_name: String,
    pub target_name: String,
    pub common: usize,
    pub rows_only_in_reference: usize,
    pub rows_only_in_target: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub template_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareReport {
    pub meta: ReportMeta,
    pub comparisons: Vec<PairReport>,
    pub summary: Vec<PairSummary>,
}

impl CompareReport {
    pub fn has_differences(&self) -> bool {
        self.comparisons.iter().any(PairReport::has_differences)
    }

    /// Targets whose template check was not clean.
    pub fn template_issues(&self) -> impl Iterator<Item = (&PairReport, &TemplateValidation)> {
        self.comparisons.iter().filter_map(|c| match &c.template {
            Some(v) if !v.is_clean() => Some((c, v)),
            _ => None,
        })
    }
}

pub fn compute_summary(comparisons: &[PairReport]) -> Vec<PairSummary> {
    comparisons
        .iter()
        .map(|c| PairSummary {
            target_index: c.target_index,
            reference_name: c.reference.name.clone(),
            target_name: c.target.name.clone(),
            common: c.result.common.len(),
            rows_only_in_reference: c.result.rows_only_in_a.len(),
            rows_only_in_target: c.result.rows_only_in_b.len(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Result tables
// ---------------------------------------------------------------------------

/// Display form of attributed rows: a "Row" column followed by the mapped
/// columns, one line per row in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultTable {
    pub fn from_rows(title: impl Into<String>, columns: &[String], rows: &AttributedRows) -> Self {
        let mut header = Vec::with_capacity(columns.len() + 1);
        header.push("Row".to_string());
        header.extend(columns.iter().cloned());

        let rows = rows
            .iter()
            .map(|(row, cells)| {
                let mut line = Vec::with_capacity(columns.len() + 1);
                line.push(row.to_string());
                line.extend(columns.iter().map(|c| cells.get(c).cloned().unwrap_or_default()));
                line
            })
            .collect();

        Self {
            title: title.into(),
            columns: header,
            rows,
        }
    }

    /// Rows with any displayed value (row number included) matching
    /// `pattern`. The pattern is trimmed first; a blank pattern keeps every row.
    pub fn filter(&self, pattern: &str) -> ResultTable {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return self.clone();
        }
        let pattern = SearchPattern::parse(pattern);
        ResultTable {
            title: self.title.clone(),
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| pattern.matches_row(row))
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn attributed(rows: &[(u32, &[(&str, &str)])]) -> AttributedRows {
        rows.iter()
            .map(|(row, cells)| {
                let cells: BTreeMap<String, String> =
                    cells.iter().map(|(c, v)| (c.to_string(), v.to_string())).collect();
                (*row, cells)
            })
            .collect()
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn table() -> ResultTable {
        let rows = attributed(&[
            (12, &[("Code", "A1100")]),
            (3, &[("Code", "XA1100"), ("Name", "Acme")]),
            (7, &[("Name", "Bolt")]),
        ]);
        ResultTable::from_rows("Only in a.xlsx", &cols(&["Code", "Name"]), &rows)
    }

    #[test]
    fn table_layout() {
        let t = table();
        assert_eq!(t.columns, vec!["Row", "Code", "Name"]);
        assert_eq!(t.rows[0], vec!["3", "XA1100", "Acme"]);
        assert_eq!(t.rows[1], vec!["7", "", "Bolt"]);
        assert_eq!(t.rows[2], vec!["12", "A1100", ""]);
    }

    #[test]
    fn empty_pattern_keeps_all() {
        assert_eq!(table().filter(""), table());
        assert_eq!(table().filter("   "), table());
    }

    #[test]
    fn pattern_is_trimmed() {
        let t = table().filter(" A11* ");
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0][1], "A1100");
    }

    #[test]
    fn filter_by_value() {
        let t = table().filter("A11*");
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0][0], "12");

        let t = table().filter("*a11*");
        assert_eq!(t.rows.len(), 2);
    }

    #[test]
    fn row_number_is_searchable() {
        let t = table().filter("7");
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0][2], "Bolt");
    }

    #[test]
    fn no_match_gives_empty_table_with_header() {
        let t = table().filter("zzz");
        assert!(t.is_empty());
        assert_eq!(t.columns.len(), 3);
    }
}
