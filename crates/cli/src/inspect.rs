//! `colcmp sheets` / `columns` / `preview` — look inside a workbook before
//! writing a config.

use std::path::{Path, PathBuf};

use colcmp_io::{filter_header_rows, list_sheets, FileSource};
use colcmp_recon::extract::{header_columns, preview, PREVIEW_COLS, PREVIEW_ROWS};
use colcmp_recon::model::Sheet;
use colcmp_recon::source::{resolve_sheet_name, WorkbookSource};

use crate::{render, CliError};

/// Requested sheet (falling back to the first one), or the first sheet.
fn open_sheet(file: &Path, sheet: Option<&str>) -> Result<Sheet, CliError> {
    let source = FileSource;
    let name = match sheet {
        Some(name) => resolve_sheet_name(&source, file, name),
        None => source
            .sheet_names(file)
            .and_then(|names| {
                names.into_iter().next().ok_or_else(|| colcmp_recon::ReconError::SheetNotFound {
                    path: file.display().to_string(),
                    sheet: String::new(),
                })
            }),
    }
    .map_err(|e| CliError::recon(&e))?;
    source.load_sheet(file, &name).map_err(|e| CliError::recon(&e))
}

pub fn cmd_sheets(file: PathBuf, json_output: bool) -> Result<(), CliError> {
    let sheets = list_sheets(&file).map_err(|e| CliError::recon(&e))?;

    if json_output {
        let value: Vec<serde_json::Value> = sheets
            .iter()
            .map(|s| {
                serde_json::json!({
                    "name": s.name,
                    "hidden": s.hidden,
                    "filter_rows": filter_header_rows(&file, &s.name),
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(value));
        return Ok(());
    }

    for s in &sheets {
        let mut line = s.name.clone();
        if s.hidden {
            line.push_str("  (hidden)");
        }
        let rows = filter_header_rows(&file, &s.name);
        if !rows.is_empty() {
            let listed: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
            line.push_str(&format!("  filter rows: {}", listed.join(", ")));
        }
        println!("{line}");
    }
    Ok(())
}

pub fn cmd_columns(file: PathBuf, sheet: Option<String>, header_row: usize, json_output: bool) -> Result<(), CliError> {
    let loaded = open_sheet(&file, sheet.as_deref())?;
    let columns = header_columns(&loaded, header_row);
    if columns.is_empty() {
        log::warn!("{} [{}]: row {} has no column names", file.display(), loaded.name, header_row);
    }

    if json_output {
        println!("{}", serde_json::json!({ "sheet": loaded.name, "header_row": header_row, "columns": columns }));
    } else {
        for column in &columns {
            println!("{column}");
        }
    }
    Ok(())
}

pub fn cmd_preview(file: PathBuf, sheet: Option<String>, rows: Option<usize>, cols: Option<usize>) -> Result<(), CliError> {
    if rows == Some(0) || cols == Some(0) {
        return Err(CliError::args("--rows and --cols must be at least 1"));
    }
    let loaded = open_sheet(&file, sheet.as_deref())?;
    let grid = preview(&loaded, rows.unwrap_or(PREVIEW_ROWS), cols.unwrap_or(PREVIEW_COLS));
    let filter_rows = filter_header_rows(&file, &loaded.name);

    println!("{} [{}]", file.display(), loaded.name);
    print!("{}", render::preview(&grid, &filter_rows));
    if !filter_rows.is_empty() {
        let listed: Vec<String> = filter_rows.iter().map(|r| r.to_string()).collect();
        eprintln!("* table/filter header; header_row = {}", listed.join(" or "));
    }
    Ok(())
}
