use crate::model::{ColumnData, ColumnValueMap, Sheet};
use crate::normalize::{normalize, normalize_cell};

/// Default header-picking preview window.
pub const PREVIEW_ROWS: usize = 200;
pub const PREVIEW_COLS: usize = 40;

/// Normalized, non-empty column names found on the header row.
pub fn header_columns(sheet: &Sheet, header_row: usize) -> Vec<String> {
    sheet
        .row(header_row)
        .iter()
        .map(normalize_cell)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Position of `column` on the header row. First match wins.
pub fn locate_column(sheet: &Sheet, header_row: usize, column: &str) -> Option<usize> {
    let wanted = normalize(column);
    if wanted.is_empty() {
        return None;
    }
    sheet
        .row(header_row)
        .iter()
        .position(|cell| normalize_cell(cell) == wanted)
}

/// Extract one column below `header_row` as physical row number -> value.
///
/// The data row at offset `i` (0 = first row after the header) is reported
/// as row `header_row + 2 + i`. Unknown columns yield an empty map.
pub fn extract(sheet: &Sheet, header_row: usize, column: &str) -> ColumnValueMap {
    let mut values = ColumnValueMap::new();
    let Some(col) = locate_column(sheet, header_row, column) else {
        log::debug!("sheet '{}': column '{column}' not on header row {header_row}", sheet.name);
        return values;
    };

    let data_start = header_row + 1;
    for (offset, row) in sheet.rows.iter().enumerate().skip(data_start) {
        let Some(cell) = row.get(col) else { continue };
        let value = normalize_cell(cell);
        if value.is_empty() || value.eq_ignore_ascii_case("nan") {
            continue;
        }
        let physical = (header_row + 2 + (offset - data_start)) as u32;
        values.insert(physical, value);
    }
    values
}

/// Extract several columns, keeping the requested order.
pub fn extract_columns(sheet: &Sheet, header_row: usize, columns: &[String]) -> Vec<ColumnData> {
    columns
        .iter()
        .map(|column| ColumnData {
            column: column.clone(),
            values: extract(sheet, header_row, column),
        })
        .collect()
}

/// Text grid of the top-left corner of a sheet, for picking a header row.
/// Every row has exactly `max_cols` cells.
pub fn preview(sheet: &Sheet, max_rows: usize, max_cols: usize) -> Vec<Vec<String>> {
    sheet
        .rows
        .iter()
        .take(max_rows)
        .map(|row| {
            (0..max_cols)
                .map(|c| row.get(c).map(normalize_cell).unwrap_or_default())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    fn vendors() -> Sheet {
        Sheet::from_strings(
            "Data",
            &[
                &["Vendor report", "", ""],
                &["", "", ""],
                &["Code", " Name ", "Amount"],
                &["X1", "Acme", "10"],
                &["", "Blank code", "11"],
                &["X2", "Bolt", "nan"],
                &["X1", "Acme again", "12"],
                &["NaN", "Null marker", "13"],
            ],
        )
    }

    #[test]
    fn header_columns_are_normalized() {
        assert_eq!(header_columns(&vendors(), 2), vec!["Code", "Name", "Amount"]);
        assert_eq!(header_columns(&vendors(), 1), Vec::<String>::new());
    }

    #[test]
    fn row_numbers_follow_header_plus_two() {
        let values = extract(&vendors(), 2, "Code");
        // header at index 2 -> first data row is spreadsheet row 4
        assert_eq!(values.get(&4).map(String::as_str), Some("X1"));
        assert_eq!(values.get(&6).map(String::as_str), Some("X2"));
        assert_eq!(values.get(&7).map(String::as_str), Some("X1"));
    }

    #[test]
    fn blanks_and_nan_are_excluded() {
        let values = extract(&vendors(), 2, "Code");
        assert!(!values.contains_key(&5));
        assert!(!values.contains_key(&8));
        assert!(values.values().all(|v| !v.is_empty() && v.to_lowercase() != "nan"));

        let amounts = extract(&vendors(), 2, "Amount");
        assert!(!amounts.contains_key(&6));
        assert_eq!(amounts.len(), 4);
    }

    #[test]
    fn duplicate_values_keep_every_row() {
        let values = extract(&vendors(), 2, "Code");
        let x1_rows: Vec<u32> = values
            .iter()
            .filter(|(_, v)| v.as_str() == "X1")
            .map(|(r, _)| *r)
            .collect();
        assert_eq!(x1_rows, vec![4, 7]);
    }

    #[test]
    fn unknown_column_is_empty_not_error() {
        assert!(extract(&vendors(), 2, "Missing").is_empty());
        assert!(extract(&vendors(), 40, "Code").is_empty());
    }

    #[test]
    fn requested_name_is_normalized_before_lookup() {
        let values = extract(&vendors(), 2, "Name");
        assert_eq!(values.get(&4).map(String::as_str), Some("Acme"));
        assert_eq!(extract(&vendors(), 2, "  Name").len(), 5);
    }

    #[test]
    fn single_column_offsets_are_dense() {
        let h = 3;
        let mut rows = vec![vec![CellValue::Empty]; h];
        rows.push(vec![CellValue::from("Code")]);
        for i in 0..5 {
            rows.push(vec![CellValue::Text(format!("v{i}"))]);
        }
        let sheet = Sheet::new("S", rows);
        let values = extract(&sheet, h, "Code");
        for (i, (row, value)) in values.iter().enumerate() {
            assert_eq!(*row as usize, h + 2 + i);
            assert_eq!(value, &format!("v{i}"));
        }
    }

    #[test]
    fn short_rows_are_skipped() {
        let sheet = Sheet::from_strings("S", &[&["A", "B"], &["1"], &["2", "x"]]);
        let values = extract(&sheet, 0, "B");
        assert_eq!(values.len(), 1);
        assert_eq!(values.get(&3).map(String::as_str), Some("x"));
    }

    #[test]
    fn extract_columns_keeps_order() {
        let cols = vec!["Amount".to_string(), "Code".to_string()];
        let data = extract_columns(&vendors(), 2, &cols);
        assert_eq!(data[0].column, "Amount");
        assert_eq!(data[1].column, "Code");
    }

    #[test]
    fn preview_pads_to_width() {
        let grid = preview(&vendors(), 3, 4);
        assert_eq!(grid.len(), 3);
        assert!(grid.iter().all(|r| r.len() == 4));
        assert_eq!(grid[2][1], "Name");
        assert_eq!(grid[2][3], "");
    }
}
