// Excel / ODS loading via calamine (xlsx, xlsm, xlsb, xls, ods)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, SheetVisible, Sheets};
use colcmp_recon::model::{CellValue, Sheet};

use crate::source::SheetInfo;

fn open(path: &Path) -> Result<Sheets<std::io::BufReader<std::fs::File>>, String> {
    open_workbook_auto(path).map_err(|e| format!("Failed to open workbook: {}", e))
}

/// Sheets in declaration order, with their visibility.
pub fn list_sheets(path: &Path) -> Result<Vec<SheetInfo>, String> {
    let workbook = open(path)?;
    Ok(workbook
        .sheets_metadata()
        .iter()
        .map(|meta| SheetInfo {
            name: meta.name.clone(),
            hidden: !matches!(meta.visible, SheetVisible::Visible),
        })
        .collect())
}

/// Load one sheet as a snapshot.
///
/// Calamine ranges start at the first used cell; leading empty rows and
/// columns are padded back so row 0 is spreadsheet row 1 and column 0 is A.
pub fn load_sheet(path: &Path, sheet_name: &str) -> Result<Sheet, String> {
    let mut workbook = open(path)?;
    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        return Ok(Sheet::new(sheet_name, Vec::new()));
    }

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let (start_row, start_col) = (start_row as usize, start_col as usize);

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row];
    rows.reserve(height);
    for row in range.rows() {
        let mut cells = Vec::with_capacity(start_col + row.len());
        cells.resize(start_col, CellValue::Empty);
        cells.extend(row.iter().map(to_cell));
        rows.push(cells);
    }

    log::debug!(
        "{} [{}]: {}x{} at offset ({}, {})",
        path.display(),
        sheet_name,
        height,
        width,
        start_row,
        start_col
    );
    Ok(Sheet::new(sheet_name, rows))
}

fn to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Int(*n),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::DateTime(naive),
            None => CellValue::Number(dt.as_f64()),
        },
        // ISO strings from ODS: keep as text
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from(s.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn padding_keeps_absolute_positions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offset.xlsx");

        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.set_name("Data").unwrap();
        ws.write_string(2, 1, "Code").unwrap();
        ws.write_number(3, 1, 42.0).unwrap();
        ws.write_number(4, 1, 1.5).unwrap();
        ws.write_boolean(5, 1, true).unwrap();
        wb.save(&path).unwrap();

        let sheet = load_sheet(&path, "Data").unwrap();
        assert_eq!(sheet.cell(2, 1), &CellValue::Text("Code".into()));
        assert_eq!(sheet.cell(3, 1).to_text(), "42");
        assert_eq!(sheet.cell(4, 1).to_text(), "1.5");
        assert_eq!(sheet.cell(5, 1).to_text(), "TRUE");
        assert_eq!(sheet.cell(0, 0), &CellValue::Empty);
        assert_eq!(sheet.height(), 6);
    }

    #[test]
    fn hidden_sheets_are_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hidden.xlsx");

        let mut wb = Workbook::new();
        wb.add_worksheet().set_name("Visible").unwrap();
        let ws = wb.add_worksheet();
        ws.set_name("Lookup").unwrap();
        ws.set_hidden(true);
        wb.save(&path).unwrap();

        let sheets = list_sheets(&path).unwrap();
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name, "Visible");
        assert!(!sheets[0].hidden);
        assert_eq!(sheets[1].name, "Lookup");
        assert!(sheets[1].hidden);
    }

    #[test]
    fn missing_sheet_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.xlsx");
        let mut wb = Workbook::new();
        wb.add_worksheet().set_name("Only").unwrap();
        wb.save(&path).unwrap();

        let err = load_sheet(&path, "Nope").unwrap_err();
        assert!(err.contains("Nope"));
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.xlsx");
        std::fs::write(&path, b"not a zip").unwrap();
        assert!(list_sheets(&path).is_err());
    }
}
