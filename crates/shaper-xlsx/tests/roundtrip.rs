//! End-to-end tests for XLSX roundtrip (create -> save -> read -> verify)

use pretty_assertions::assert_eq;
use shaper_core::{
    CellRange, CellValue, Document, Style, VerticalAlignment,
};
use shaper_xlsx::{XlsxReader, XlsxWriter};
use std::io::Cursor;

fn roundtrip(doc: &Document) -> Document {
    let mut buf = Vec::new();
    XlsxWriter::write(doc, Cursor::new(&mut buf)).unwrap();
    XlsxReader::read(Cursor::new(&buf)).unwrap()
}

/// Test basic roundtrip with numeric values
#[test]
fn test_roundtrip_numbers() {
    let mut doc = Document::new();
    let grid = doc.grid_mut(0).unwrap();

    grid.set_value_at(0, 0, 42.0).unwrap();
    grid.set_value_at(0, 1, 3.14159).unwrap();
    grid.set_value_at(0, 2, -100.5).unwrap();
    grid.set_value_at(1, 0, 0.0).unwrap();
    grid.set_value_at(1, 1, 1e10).unwrap();

    let doc2 = roundtrip(&doc);
    let grid2 = doc2.grid(0).unwrap();

    assert_eq!(grid2.value_at(0, 0).as_number(), Some(42.0));
    assert!((grid2.value_at(0, 1).as_number().unwrap() - 3.14159).abs() < 1e-10);
    assert_eq!(grid2.value_at(0, 2).as_number(), Some(-100.5));
    assert_eq!(grid2.value_at(1, 0).as_number(), Some(0.0));
    assert_eq!(grid2.value_at(1, 1).as_number(), Some(1e10));
}

/// Test basic roundtrip with string values
#[test]
fn test_roundtrip_strings() {
    let mut doc = Document::new();
    let grid = doc.grid_mut(0).unwrap();

    grid.set_value_at(0, 0, "Hello, World!").unwrap();
    grid.set_value_at(0, 1, "Special: <>&\"'").unwrap(); // XML entities
    grid.set_value_at(1, 0, "Mã NPP / Kết quả").unwrap(); // diacritics
    grid.set_value_at(1, 1, "NPP Bán - khu vực 1").unwrap();

    let doc2 = roundtrip(&doc);
    let grid2 = doc2.grid(0).unwrap();

    assert_eq!(grid2.value_at(0, 0).as_str(), Some("Hello, World!"));
    assert_eq!(grid2.value_at(0, 1).as_str(), Some("Special: <>&\"'"));
    assert_eq!(grid2.value_at(1, 0).as_str(), Some("Mã NPP / Kết quả"));
    assert_eq!(grid2.value_at(1, 1).as_str(), Some("NPP Bán - khu vực 1"));
}

/// Test roundtrip with boolean values
#[test]
fn test_roundtrip_booleans() {
    let mut doc = Document::new();
    let grid = doc.grid_mut(0).unwrap();

    grid.set_value_at(0, 0, true).unwrap();
    grid.set_value_at(0, 1, false).unwrap();

    let doc2 = roundtrip(&doc);
    let grid2 = doc2.grid(0).unwrap();

    assert_eq!(grid2.value_at(0, 0), CellValue::Boolean(true));
    assert_eq!(grid2.value_at(0, 1), CellValue::Boolean(false));
}

/// Row and column visibility state survives the roundtrip
#[test]
fn test_roundtrip_hidden_rows_and_columns() {
    let mut doc = Document::new();
    let grid = doc.grid_mut(0).unwrap();

    for row in 0..10 {
        for col in 0..18u16 {
            grid.set_value_at(row, col, format!("r{}c{}", row, col)).unwrap();
        }
    }
    grid.set_row_hidden(0, true);
    grid.set_row_hidden(1, true);
    grid.set_row_hidden(7, true);
    grid.set_column_hidden(0, true);
    grid.set_column_hidden(12, true);
    grid.set_row_height(4, 31.5);
    grid.set_column_width(8, 22.0);

    let doc2 = roundtrip(&doc);
    let grid2 = doc2.grid(0).unwrap();

    assert!(grid2.is_row_hidden(0));
    assert!(grid2.is_row_hidden(1));
    assert!(grid2.is_row_hidden(7));
    assert!(!grid2.is_row_hidden(2));
    assert!(grid2.is_column_hidden(0));
    assert!(grid2.is_column_hidden(12));
    assert!(!grid2.is_column_hidden(8));
    assert!((grid2.row_height(4) - 31.5).abs() < 1e-9);
    assert!((grid2.column_width(8) - 22.0).abs() < 1e-9);

    // Hidden rows keep their values
    assert_eq!(grid2.value_at(7, 3).as_str(), Some("r7c3"));
}

/// A hidden row with no cells still comes back hidden
#[test]
fn test_roundtrip_dimension_only_row() {
    let mut doc = Document::new();
    let grid = doc.grid_mut(0).unwrap();

    grid.set_value_at(0, 0, "only cell").unwrap();
    grid.set_row_hidden(5, true);

    let doc2 = roundtrip(&doc);
    let grid2 = doc2.grid(0).unwrap();

    assert!(grid2.is_row_hidden(5));
}

/// The freeze boundary survives the roundtrip
#[test]
fn test_roundtrip_freeze_boundary() {
    let mut doc = Document::new();
    let grid = doc.grid_mut(0).unwrap();

    grid.set_value_at(0, 0, "x").unwrap();
    grid.set_freeze_boundary(5, 0);

    let doc2 = roundtrip(&doc);
    let grid2 = doc2.grid(0).unwrap();

    let freeze = grid2.freeze_boundary().unwrap();
    assert_eq!(freeze.row, 5);
    assert_eq!(freeze.col, 0);
}

/// Merged regions survive the roundtrip
#[test]
fn test_roundtrip_merged_regions() {
    let mut doc = Document::new();
    let grid = doc.grid_mut(0).unwrap();

    grid.set_value_at(3, 0, "tiêu đề").unwrap();
    grid.merge_cells(&CellRange::parse("A4:R4").unwrap()).unwrap();
    grid.merge_cells(&CellRange::parse("A1:B2").unwrap()).unwrap();

    let doc2 = roundtrip(&doc);
    let grid2 = doc2.grid(0).unwrap();

    assert_eq!(grid2.merged_regions().len(), 2);
    assert!(grid2
        .merged_regions()
        .contains(&CellRange::parse("A4:R4").unwrap()));
}

/// Wrap and vertical-center alignment survive the roundtrip
#[test]
fn test_roundtrip_alignment_styles() {
    let mut doc = Document::new();
    let grid = doc.grid_mut(0).unwrap();

    let wrapped = Style::new().wrap_text(true).font_size(12.0);
    let centered = Style::new()
        .vertical_alignment(VerticalAlignment::Center)
        .bold(true);

    grid.set_value_at(0, 0, "wrapped").unwrap();
    grid.set_style_at(0, 0, &wrapped).unwrap();
    grid.set_value_at(1, 0, "centered").unwrap();
    grid.set_style_at(1, 0, &centered).unwrap();

    let doc2 = roundtrip(&doc);
    let grid2 = doc2.grid(0).unwrap();

    let s0 = grid2.cell_style_at(0, 0).unwrap();
    assert!(s0.alignment.wrap_text);
    assert!((s0.font.size - 12.0).abs() < 1e-9);

    let s1 = grid2.cell_style_at(1, 0).unwrap();
    assert_eq!(s1.alignment.vertical, VerticalAlignment::Center);
    assert!(s1.font.bold);
}

/// Test roundtrip with multiple sheets, names with diacritics included
#[test]
fn test_roundtrip_multiple_sheets() {
    let mut doc = Document::empty();
    doc.add_grid("BC01").unwrap();
    doc.add_grid("Kết quả").unwrap();

    doc.grid_mut(0)
        .unwrap()
        .set_value_at(0, 0, "first")
        .unwrap();
    doc.grid_mut(1)
        .unwrap()
        .set_value_at(0, 0, "second")
        .unwrap();

    let doc2 = roundtrip(&doc);

    assert_eq!(doc2.sheet_count(), 2);
    assert_eq!(doc2.grid(0).unwrap().name(), "BC01");
    assert_eq!(doc2.grid(1).unwrap().name(), "Kết quả");
    assert_eq!(doc2.grid(1).unwrap().value_at(0, 0).as_str(), Some("second"));
}

/// Style-only cells (cleared value, kept formatting) survive the roundtrip
#[test]
fn test_roundtrip_style_only_cell() {
    let mut doc = Document::new();
    let grid = doc.grid_mut(0).unwrap();

    let style = Style::new().bold(true);
    grid.set_value_at(5, 10, "to clear").unwrap();
    grid.set_style_at(5, 10, &style).unwrap();
    grid.clear_value_at(5, 10);

    let doc2 = roundtrip(&doc);
    let grid2 = doc2.grid(0).unwrap();

    assert!(grid2.value_at(5, 10).is_empty());
    let s = grid2.cell_style_at(5, 10).unwrap();
    assert!(s.font.bold);
}

/// Reading a document written to disk through a file path
#[test]
fn test_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xlsx");

    let mut doc = Document::new();
    doc.grid_mut(0).unwrap().set_value_at(0, 0, "on disk").unwrap();
    XlsxWriter::write_file(&doc, &path).unwrap();

    let doc2 = XlsxReader::read_file(&path).unwrap();
    assert_eq!(doc2.grid(0).unwrap().value_at(0, 0).as_str(), Some("on disk"));
}
