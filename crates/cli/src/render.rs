//! Plain-text rendering of reports and sheet previews.

use std::collections::BTreeSet;
use std::fmt::Write;

use colcmp_recon::model::TemplateValidation;
use colcmp_recon::report::{CompareReport, PairReport, ResultTable};
use unicode_width::UnicodeWidthStr;

/// Cap for a single rendered cell, in display columns.
const MAX_CELL_WIDTH: usize = 40;

fn truncate(value: &str, max: usize) -> String {
    if value.width() <= max {
        return value.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in value.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w + 1 > max {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

fn pad(value: &str, width: usize) -> String {
    let fill = width.saturating_sub(value.width());
    format!("{value}{}", " ".repeat(fill))
}

/// Aligned grid with a header line and a rule under it.
pub fn grid(header: &[String], rows: &[Vec<String>]) -> String {
    let cols = header.len().max(rows.iter().map(|r| r.len()).max().unwrap_or(0));
    let cell = |row: &[String], c: usize| truncate(row.get(c).map(String::as_str).unwrap_or(""), MAX_CELL_WIDTH);

    let mut widths = vec![0usize; cols];
    for c in 0..cols {
        widths[c] = std::iter::once(cell(header, c))
            .chain(rows.iter().map(|r| cell(r, c)))
            .map(|v| v.width())
            .max()
            .unwrap_or(0);
    }

    let line = |row: &[String]| {
        let cells: Vec<String> = (0..cols).map(|c| pad(&cell(row, c), widths[c])).collect();
        cells.join("  ").trim_end().to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", line(header));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));
    for row in rows {
        let _ = writeln!(out, "{}", line(row));
    }
    out
}

pub fn result_table(table: &ResultTable) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} rows)", table.title, table.rows.len());
    if table.is_empty() {
        let _ = writeln!(out, "  (none)");
    } else {
        out.push_str(&grid(&table.columns, &table.rows));
    }
    out
}

fn template_notes(v: &TemplateValidation) -> Vec<String> {
    let mut notes = Vec::new();
    if !v.sheet_found {
        match &v.actual_sheet {
            Some(actual) => notes.push(format!(
                "sheet '{}' not found, read '{}' instead",
                v.expected_sheet, actual
            )),
            None => notes.push("workbook could not be read".to_string()),
        }
    }
    if !v.missing_columns.is_empty() {
        notes.push(format!(
            "missing on row {}: {}",
            v.expected_row + 1,
            v.missing_columns.join(", ")
        ));
    }
    if !v.extra_columns.is_empty() {
        notes.push(format!("extra columns: {}", v.extra_columns.join(", ")));
    }
    if let Some(row) = v.recovered_row {
        notes.push(format!(
            "header found on row {} (expected row {})",
            row + 1,
            v.expected_row + 1
        ));
    }
    notes
}

fn pair(out: &mut String, pair: &PairReport, search: &str) {
    let _ = writeln!(
        out,
        "== {} [{}]  vs  #{} {} [{}]",
        pair.reference.name, pair.reference.sheet, pair.target_index, pair.target.name, pair.target.sheet
    );
    let mapped: Vec<String> = pair
        .pairs
        .iter()
        .map(|p| format!("{} -> {}", p.reference, p.target))
        .collect();
    let _ = writeln!(out, "columns: {}", mapped.join(", "));

    if let Some(v) = &pair.template {
        for note in template_notes(v) {
            let _ = writeln!(out, "template: {note}");
        }
    }
    for w in &pair.warnings {
        let _ = writeln!(out, "warning: {} column '{}' has no values", w.side, w.column);
    }

    let _ = writeln!(out, "common values: {}", pair.result.common.len());
    out.push('\n');
    out.push_str(&result_table(&pair.reference_table().filter(search)));
    out.push('\n');
    out.push_str(&result_table(&pair.target_table().filter(search)));
}

/// Full human report. `search` filters result rows; empty keeps all.
pub fn report(report: &CompareReport, search: &str) -> String {
    let mut out = String::new();
    for (i, p) in report.comparisons.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        pair(&mut out, p, search);
    }
    out
}

/// One summary line per pair, for stderr.
pub fn summary_lines(report: &CompareReport) -> Vec<String> {
    report
        .summary
        .iter()
        .map(|s| {
            format!(
                "{} vs {}: {} common, {} rows only in {}, {} rows only in {}",
                s.reference_name,
                s.target_name,
                s.common,
                s.rows_only_in_reference,
                s.reference_name,
                s.rows_only_in_target,
                s.target_name
            )
        })
        .collect()
}

/// Preview grid with spreadsheet row numbers; filter header rows are starred.
pub fn preview(rows: &[Vec<String>], filter_rows: &BTreeSet<usize>) -> String {
    let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    // trailing all-empty columns are noise
    let used = (0..cols)
        .rev()
        .find(|&c| rows.iter().any(|r| r.get(c).is_some_and(|v| !v.is_empty())))
        .map(|c| c + 1)
        .unwrap_or(0);

    let mut header = vec!["Row".to_string()];
    header.extend((0..used).map(column_letter));
    let lines: Vec<Vec<String>> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let marker = if filter_rows.contains(&i) { "*" } else { "" };
            let mut line = vec![format!("{}{}", i + 1, marker)];
            line.extend(row.iter().take(used).cloned());
            line
        })
        .collect();
    grid(&header, &lines)
}

/// 0 -> A, 25 -> Z, 26 -> AA
pub fn column_letter(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.iter().rev().collect()
}
