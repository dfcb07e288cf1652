//! Consolidation tests: single-file rename, multi-file merge, name collisions.

use pretty_assertions::assert_eq;
use shaper::prelude::*;
use shaper::{consolidate, FIRST_DATA_ROW};
use shaper_xlsx::{XlsxReader, XlsxWriter};
use std::path::PathBuf;

fn write_report(dir: &std::path::Path, name: &str, marker: &str) -> PathBuf {
    let mut grid = Grid::new("Sheet1");
    for row in 0..5 {
        for col in 0..18u16 {
            grid.set_value_at(row, col, format!("h{}", col)).unwrap();
        }
    }
    for i in 0..4u32 {
        let row = FIRST_DATA_ROW + i;
        for col in 0..18u16 {
            grid.set_value_at(row, col, format!("{} r{}c{}", marker, row, col))
                .unwrap();
        }
    }

    let mut doc = Document::empty();
    doc.add_existing_grid(grid).unwrap();
    let path = dir.join(name);
    XlsxWriter::write_file(&doc, &path).unwrap();
    path
}

/// Consolidating a single file copies it and renames the one sheet
#[test]
fn test_single_file_consolidation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_report(dir.path(), "BC01.xlsx", "one");
    shape_file(&path).unwrap();

    let target = consolidate(&[path.clone()], dir.path()).unwrap();
    assert_eq!(
        target.file_name().unwrap().to_str().unwrap(),
        "Kết quả.xlsx"
    );

    let summary = XlsxReader::read_file(&target).unwrap();
    assert_eq!(summary.sheet_count(), 1);

    let sheet = summary.grid(0).unwrap();
    assert_eq!(sheet.name(), "BC01");

    // Values match the shaped source exactly
    let source = XlsxReader::read_file(&path).unwrap();
    let source_sheet = source.grid(0).unwrap();
    for (row, col, cell) in source_sheet.iter_cells() {
        assert_eq!(
            sheet.value_at(row, col),
            cell.value.clone(),
            "mismatch at ({}, {})",
            row,
            col
        );
    }
}

/// Multi-file consolidation builds one sheet per source with state copied
#[test]
fn test_multi_file_consolidation() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_report(dir.path(), "BC01.xlsx", "a");
    let b = write_report(dir.path(), "BC02.xlsx", "b");
    shape_file(&a).unwrap();
    shape_file(&b).unwrap();

    let target = consolidate(&[a.clone(), b.clone()], dir.path()).unwrap();
    let summary = XlsxReader::read_file(&target).unwrap();

    assert_eq!(summary.sheet_count(), 2);
    let sheet_a = summary.grid_by_name("BC01").unwrap();
    let sheet_b = summary.grid_by_name("BC02").unwrap();

    // Values came from the right source
    assert_eq!(sheet_a.value_at(5, 6).as_str(), Some("a r5c6"));
    assert_eq!(sheet_b.value_at(5, 6).as_str(), Some("b r5c6"));

    // Shaped state survived the copy
    assert!(sheet_a.is_row_hidden(0));
    assert!(sheet_a.is_column_hidden(0));
    assert!(!sheet_a.is_column_hidden(6));
    let freeze = sheet_a.freeze_boundary().unwrap();
    assert_eq!(freeze.row, FIRST_DATA_ROW);

    // The cosmetic pass forced vertical centering on body cells
    let style = sheet_a.cell_style_at(6, 6).unwrap();
    assert_eq!(style.alignment.vertical, VerticalAlignment::Center);
    assert!(!style.alignment.wrap_text);
}

/// Names that truncate identically collide; the last file wins
#[test]
fn test_truncation_collision_last_writer_wins() {
    let dir = tempfile::tempdir().unwrap();
    let base = "x".repeat(31);
    let a = write_report(dir.path(), &format!("{}AAA.xlsx", base), "first");
    let b = write_report(dir.path(), &format!("{}BBB.xlsx", base), "second");
    shape_file(&a).unwrap();
    shape_file(&b).unwrap();

    let target = consolidate(&[a, b], dir.path()).unwrap();
    let summary = XlsxReader::read_file(&target).unwrap();

    assert_eq!(summary.sheet_count(), 1);
    let sheet = summary.grid(0).unwrap();
    assert_eq!(sheet.name(), base);
    assert_eq!(sheet.value_at(5, 6).as_str(), Some("second r5c6"));
}

/// An unreadable source is skipped; the summary still builds from the rest
#[test]
fn test_unreadable_source_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let good_a = write_report(dir.path(), "BC01.xlsx", "a");
    let good_b = write_report(dir.path(), "BC02.xlsx", "b");
    shape_file(&good_a).unwrap();
    shape_file(&good_b).unwrap();

    let bad = dir.path().join("BC99.xlsx");
    std::fs::write(&bad, b"garbage").unwrap();

    let target = consolidate(&[good_a, bad, good_b], dir.path()).unwrap();
    let summary = XlsxReader::read_file(&target).unwrap();
    assert_eq!(summary.sheet_count(), 2);
}

/// Consolidating nothing is an error, not a crash
#[test]
fn test_empty_input_is_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(consolidate(&[], dir.path()).is_err());
}
