//! Header-row hints read straight from the OOXML package.
//!
//! Calamine exposes cell values only, so declared tables and the sheet
//! autofilter are read from the zip parts: `xl/workbook.xml` and its rels
//! locate the worksheet, the worksheet's `autoFilter` and `tablePart`
//! elements point at the ranges, and each range's first row is a likely
//! header row.

use std::collections::BTreeSet;
use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::Format;

/// 0-based rows where a declared table or the sheet's autofilter starts.
///
/// Not an OOXML file, unreadable package, or unknown sheet: empty set.
pub fn filter_header_rows(path: &Path, sheet_name: &str) -> BTreeSet<usize> {
    if !Format::is_ooxml(path) {
        return BTreeSet::new();
    }
    match read_filter_rows(path, sheet_name) {
        Ok(rows) => rows,
        Err(e) => {
            log::debug!("{} [{}]: no filter rows: {}", path.display(), sheet_name, e);
            BTreeSet::new()
        }
    }
}

fn read_filter_rows(path: &Path, sheet_name: &str) -> Result<BTreeSet<usize>, String> {
    let file = std::fs::File::open(path).map_err(|e| format!("Failed to open XLSX file: {}", e))?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| format!("Failed to read XLSX as ZIP: {}", e))?;

    let sheet_path = find_worksheet_xml_path(&mut archive, sheet_name)?;
    let sheet_xml = read_part(&mut archive, &sheet_path)?;
    let refs = scan_worksheet(&sheet_xml)?;

    let mut rows = BTreeSet::new();
    if let Some(row) = refs.auto_filter.as_deref().and_then(ref_start_row) {
        rows.insert(row);
    }
    if refs.table_rids.is_empty() {
        return Ok(rows);
    }

    let rels_xml = read_part(&mut archive, &sheet_rels_path(&sheet_path))?;
    for rid in &refs.table_rids {
        let table_row = find_relationship_target(&rels_xml, rid)
            .map(|target| resolve_part_path(&sheet_path, &target))
            .and_then(|table_path| read_part(&mut archive, &table_path))
            .and_then(|table_xml| table_ref(&table_xml));
        match table_row {
            Ok(Some(range)) => rows.extend(ref_start_row(&range)),
            Ok(None) => {}
            Err(e) => log::debug!("{}: table {}: {}", path.display(), rid, e),
        }
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Package navigation
// ---------------------------------------------------------------------------

/// Worksheet part for a sheet name, via workbook.xml and its relationships.
fn find_worksheet_xml_path<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    sheet_name: &str,
) -> Result<String, String> {
    let workbook_xml = read_part(archive, "xl/workbook.xml")?;
    let rid = find_sheet_rid(&workbook_xml, sheet_name)?;
    let rels_xml = read_part(archive, "xl/_rels/workbook.xml.rels")?;
    let target = find_relationship_target(&rels_xml, &rid)?;
    Ok(resolve_part_path("xl/workbook.xml", &target))
}

fn find_sheet_rid(workbook_xml: &str, sheet_name: &str) -> Result<String, String> {
    lookup_attr(workbook_xml, b"sheet", b"name", sheet_name, b"id")?
        .ok_or_else(|| format!("sheet '{}' not in workbook.xml", sheet_name))
}

fn find_relationship_target(rels_xml: &str, rid: &str) -> Result<String, String> {
    lookup_attr(rels_xml, b"Relationship", b"Id", rid, b"Target")?
        .ok_or_else(|| format!("relationship '{}' not found", rid))
}

/// `want` attribute of the first `element` whose `key` attribute is `key_value`.
fn lookup_attr(
    xml: &str,
    element: &[u8],
    key: &[u8],
    key_value: &str,
    want: &[u8],
) -> Result<Option<String>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.local_name().as_ref() == element => {
                if attr_value(e, key).as_deref() == Some(key_value) {
                    if let Some(found) = attr_value(e, want) {
                        return Ok(Some(found));
                    }
                }
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(format!("XML parse error: {}", e)),
            _ => {}
        }
        buf.clear();
    }
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, part: &str) -> Result<String, String> {
    let entry = archive
        .by_name(part)
        .map_err(|e| format!("part '{}' missing: {}", part, e))?;
    std::io::read_to_string(entry).map_err(|e| format!("part '{}': {}", part, e))
}

/// `xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`
fn sheet_rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that declares it.
/// Absolute targets start at the package root.
fn resolve_part_path(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = source_part.split('/').collect();
    segments.pop();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

// ---------------------------------------------------------------------------
// Worksheet / table parts
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq)]
struct WorksheetRefs {
    auto_filter: Option<String>,
    table_rids: Vec<String>,
}

fn scan_worksheet(xml: &str) -> Result<WorksheetRefs, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut refs = WorksheetRefs::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"autoFilter" if refs.auto_filter.is_none() => {
                    refs.auto_filter = attr_value(e, b"ref");
                }
                b"tablePart" => {
                    if let Some(rid) = attr_value(e, b"id") {
                        refs.table_rids.push(rid);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error: {}", e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(refs)
}

/// `ref` of the `<table>` root element.
fn table_ref(xml: &str) -> Result<Option<String>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"table" => {
                return Ok(attr_value(e, b"ref"));
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(format!("XML parse error: {}", e)),
            _ => {}
        }
        buf.clear();
    }
}

/// Attribute by local name, so `r:id` matches `id`.
fn attr_value(e: &quick_xml::events::BytesStart, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == local)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// 0-based first row of a range like `A3:F20` or `$B$2`.
fn ref_start_row(range: &str) -> Option<usize> {
    let start = range.split(':').next()?.replace('$', "");
    let digits = start.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let row: usize = digits.parse().ok()?;
    row.checked_sub(1)
}

// ============================================================================
// Tests
// ============================================================================
