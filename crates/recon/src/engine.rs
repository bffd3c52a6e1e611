use std::collections::{BTreeMap, BTreeSet};

use crate::config::{CompareConfig, Session};
use crate::error::ReconError;
use crate::extract::extract_columns;
use crate::mapping::side_columns;
use crate::model::{
    AttributedRows, ColumnData, ColumnPair, ColumnWarning, FileConfig, ReconciliationResult, Sheet, Side,
};
use crate::report::{compute_summary, CompareReport, FileLabel, PairReport, ReportMeta};
use crate::source::{resolve_sheet_name, WorkbookSource};
use crate::template;

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Pool each side's values, split them into common / only-in-A / only-in-B,
/// and attribute the unique values back to their rows and columns.
pub fn reconcile(side_a: &[ColumnData], side_b: &[ColumnData]) -> ReconciliationResult {
    let values_a = pooled(side_a);
    let values_b = pooled(side_b);

    let common: BTreeSet<String> = values_a.intersection(&values_b).cloned().collect();
    let only_in_a: BTreeSet<String> = values_a.difference(&values_b).cloned().collect();
    let only_in_b: BTreeSet<String> = values_b.difference(&values_a).cloned().collect();

    let rows_only_in_a = attribute(side_a, &only_in_a);
    let rows_only_in_b = attribute(side_b, &only_in_b);

    ReconciliationResult {
        common,
        only_in_a,
        only_in_b,
        rows_only_in_a,
        rows_only_in_b,
    }
}

fn pooled(side: &[ColumnData]) -> BTreeSet<String> {
    side.iter()
        .flat_map(|data| data.values.values().cloned())
        .collect()
}

fn attribute(side: &[ColumnData], unique: &BTreeSet<String>) -> AttributedRows {
    let mut rows = AttributedRows::new();
    for data in side {
        for (row, value) in &data.values {
            if unique.contains(value) {
                rows.entry(*row)
                    .or_insert_with(BTreeMap::new)
                    .insert(data.column.clone(), value.clone());
            }
        }
    }
    rows
}

// ---------------------------------------------------------------------------
// One (reference, target) pair
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PairComparison {
    /// Distinct reference columns, first-seen order.
    pub reference_columns: Vec<String>,
    /// Distinct target columns, first-seen order.
    pub target_columns: Vec<String>,
    pub result: ReconciliationResult,
    pub warnings: Vec<ColumnWarning>,
}

/// Extract both sides of a mapping and reconcile them.
///
/// A column named by several pairs is extracted once per side. Mapped columns
/// that produced no values are reported as warnings.
pub fn compare_pair(
    reference: &Sheet,
    reference_header: usize,
    target: &Sheet,
    target_header: usize,
    pairs: &[ColumnPair],
) -> PairComparison {
    let reference_columns = side_columns(pairs, |p| p.reference.as_str());
    let target_columns = side_columns(pairs, |p| p.target.as_str());

    let side_a = extract_columns(reference, reference_header, &reference_columns);
    let side_b = extract_columns(target, target_header, &target_columns);

    let mut warnings = empty_columns(&side_a, Side::Reference);
    warnings.extend(empty_columns(&side_b, Side::Target));
    for warning in &warnings {
        log::warn!("{} column '{}' has no values", warning.side, warning.column);
    }

    PairComparison {
        reference_columns,
        target_columns,
        result: reconcile(&side_a, &side_b),
        warnings,
    }
}

fn empty_columns(side: &[ColumnData], which: Side) -> Vec<ColumnWarning> {
    side.iter()
        .filter(|data| data.values.is_empty())
        .map(|data| ColumnWarning {
            side: which,
            column: data.column.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Session driver
// ---------------------------------------------------------------------------

/// Run every comparison the config describes. File #1 is compared against
/// each mapped target in ascending target order.
pub fn run(config: &CompareConfig, source: &dyn WorkbookSource) -> Result<CompareReport, ReconError> {
    let session = config.session()?;
    run_session(&config.name, &session, source)
}

pub fn run_session(
    name: &str,
    session: &Session,
    source: &dyn WorkbookSource,
) -> Result<CompareReport, ReconError> {
    let reference_cfg = &session.files[0];
    let (reference_sheet, reference) = load(source, reference_cfg)?;

    let mut comparisons = Vec::with_capacity(session.mappings.len());
    for mapping in &session.mappings {
        if mapping.pairs.is_empty() {
            log::debug!("target #{} has no mapped columns, skipped", mapping.target);
            continue;
        }
        let target_cfg = &session.files[mapping.target];
        let (target_sheet, target) = load(source, target_cfg)?;

        let validation = session
            .template
            .as_ref()
            .map(|t| template::validate(t, &target_cfg.path, source, &session.recovery));

        let pair = compare_pair(
            &reference_sheet,
            reference_cfg.header_row,
            &target_sheet,
            target_cfg.header_row,
            &mapping.pairs,
        );
        log::info!(
            "{} vs {}: {} common, {} only in reference, {} only in target",
            reference.name,
            target.name,
            pair.result.common.len(),
            pair.result.only_in_a.len(),
            pair.result.only_in_b.len()
        );

        comparisons.push(PairReport {
            target_index: mapping.target,
            reference: reference.clone(),
            target,
            pairs: mapping.pairs.clone(),
            reference_columns: pair.reference_columns,
            target_columns: pair.target_columns,
            result: pair.result,
            warnings: pair.warnings,
            template: validation,
        });
    }

    let summary = compute_summary(&comparisons);

    Ok(CompareReport {
        meta: ReportMeta {
            config_name: name.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            template_mode: session.template.is_some(),
        },
        comparisons,
        summary,
    })
}

fn load(source: &dyn WorkbookSource, file: &FileConfig) -> Result<(Sheet, FileLabel), ReconError> {
    let sheet_name = resolve_sheet_name(source, &file.path, &file.sheet)?;
    let sheet = source.load_sheet(&file.path, &sheet_name)?;
    log::debug!(
        "loaded {} [{}]: {} rows",
        file.path.display(),
        sheet_name,
        sheet.height()
    );
    let label = FileLabel {
        name: file.display_name(),
        path: file.path.display().to_string(),
        sheet: sheet_name,
    };
    Ok((sheet, label))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnValueMap;

    fn data(column: &str, values: &[(u32, &str)]) -> ColumnData {
        ColumnData {
            column: column.into(),
            values: values.iter().map(|(r, v)| (*r, v.to_string())).collect::<ColumnValueMap>(),
        }
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reconcile_basic_example() {
        let a = vec![data("Code", &[(3, "X1"), (4, "X2"), (5, "X3")])];
        let b = vec![data("Code", &[(3, "X2"), (4, "X3"), (5, "X4")])];
        let r = reconcile(&a, &b);

        assert_eq!(r.common, set(&["X2", "X3"]));
        assert_eq!(r.only_in_a, set(&["X1"]));
        assert_eq!(r.only_in_b, set(&["X4"]));
        assert_eq!(r.rows_only_in_a.keys().copied().collect::<Vec<_>>(), vec![3]);
        assert_eq!(r.rows_only_in_b.keys().copied().collect::<Vec<_>>(), vec![5]);
        assert_eq!(r.rows_only_in_a[&3]["Code"], "X1");
        assert_eq!(r.rows_only_in_b[&5]["Code"], "X4");
    }

    #[test]
    fn values_pool_across_columns() {
        let a = vec![data("Code", &[(2, "A")]), data("Alt", &[(2, "B")])];
        let b = vec![data("Key", &[(7, "B")])];
        let r = reconcile(&a, &b);

        assert_eq!(r.common, set(&["B"]));
        assert_eq!(r.only_in_a, set(&["A"]));
        // partial row: only the unique cell is attributed
        assert_eq!(r.rows_only_in_a[&2].len(), 1);
        assert_eq!(r.rows_only_in_a[&2]["Code"], "A");
    }

    #[test]
    fn duplicates_attribute_every_row() {
        let a = vec![data("Code", &[(2, "Z"), (5, "Z"), (6, "Y")])];
        let b = vec![data("Code", &[(2, "Y")])];
        let r = reconcile(&a, &b);
        assert_eq!(r.rows_only_in_a.keys().copied().collect::<Vec<_>>(), vec![2, 5]);
    }

    #[test]
    fn empty_side_makes_other_side_unique() {
        let a = vec![data("c", &[(2, "p"), (3, "q")])];
        let r = reconcile(&a, &[]);
        assert!(r.common.is_empty());
        assert_eq!(r.only_in_a, set(&["p", "q"]));
        assert!(r.only_in_b.is_empty());

        let r = reconcile(&[], &[]);
        assert_eq!(r, ReconciliationResult::default());
    }

    #[test]
    fn equality_is_case_sensitive() {
        let a = vec![data("c", &[(2, "abc")])];
        let b = vec![data("c", &[(2, "ABC")])];
        let r = reconcile(&a, &b);
        assert!(r.common.is_empty());
        assert_eq!(r.only_in_a.len(), 1);
        assert_eq!(r.only_in_b.len(), 1);
    }

    #[test]
    fn compare_pair_dedupes_and_warns() {
        let reference = Sheet::from_strings("R", &[&["Code", "Alt"], &["A", ""], &["B", ""]]);
        let target = Sheet::from_strings("T", &[&["Code"], &["B"], &["C"]]);
        let pairs = vec![
            ColumnPair::new("Code", "Code"),
            ColumnPair::new("Alt", "Code"),
        ];
        let out = compare_pair(&reference, 0, &target, 0, &pairs);

        assert_eq!(out.reference_columns, vec!["Code", "Alt"]);
        assert_eq!(out.target_columns, vec!["Code"]);
        assert_eq!(out.result.only_in_a, set(&["A"]));
        assert_eq!(out.result.only_in_b, set(&["C"]));
        assert_eq!(
            out.warnings,
            vec![ColumnWarning { side: Side::Reference, column: "Alt".into() }]
        );
    }

    #[test]
    fn compare_pair_uses_each_header_row() {
        let reference = Sheet::from_strings("R", &[&["title"], &["Code"], &["X1"]]);
        let target = Sheet::from_strings("T", &[&["Code"], &["X1"]]);
        let out = compare_pair(&reference, 1, &target, 0, &[ColumnPair::new("Code", "Code")]);
        assert_eq!(out.result.common, set(&["X1"]));
        assert!(out.warnings.is_empty());
    }
}
