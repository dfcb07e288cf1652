//! Result consolidation
//!
//! Merges already-shaped report files into a single multi-sheet document,
//! one sheet per source file. The copy is followed by a re-normalization pass
//! that is deliberately stronger than the per-file pipeline: it re-hides the
//! fixed column set, disables wrap and forces vertical centering on every
//! body cell, centers merged regions, and refits visible column widths.

use std::path::{Path, PathBuf};

use shaper_core::{
    Alignment, CellRange, Document, Grid, HorizontalAlignment, VerticalAlignment,
    MAX_SHEET_NAME_LEN,
};
use shaper_xlsx::{XlsxReader, XlsxWriter};

use crate::error::{Result, ShapeError};
use crate::pipeline::{hide_fixed_columns, FIRST_DATA_ROW};

/// File name of the consolidated output. Downstream consumers match on the
/// exact literal, diacritics included.
pub const CONSOLIDATED_FILE_NAME: &str = "Kết quả.xlsx";

/// Sheet name for a source file: the file stem, truncated to the sheet-name
/// limit. Truncation counts characters, not bytes.
fn sheet_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Sheet".to_string());
    stem.chars().take(MAX_SHEET_NAME_LEN).collect()
}

/// Consolidate shaped report files into `Kết quả.xlsx` inside `out_dir`.
///
/// Returns the path of the consolidated file. A source that fails to copy is
/// logged and skipped; the run fails only if nothing could be copied.
pub fn consolidate(processed: &[PathBuf], out_dir: &Path) -> Result<PathBuf> {
    let target = out_dir.join(CONSOLIDATED_FILE_NAME);

    if processed.is_empty() {
        return Err(ShapeError::EmptyDocument(target.display().to_string()));
    }

    if let [single] = processed {
        // One file: copy it directly and rename its sheet
        std::fs::copy(single, &target)?;
        let mut document = XlsxReader::read_file(&target)?;
        let name = sheet_name_for(single);
        document.rename_grid(document.active_sheet(), &name)?;
        XlsxWriter::write_file(&document, &target)?;
        return Ok(target);
    }

    let mut summary = Document::empty();

    for path in processed {
        match append_source(&mut summary, path) {
            Ok(name) => log::debug!("added sheet '{name}' from {}", path.display()),
            Err(e) => log::warn!("cannot copy {} into the summary: {e}", path.display()),
        }
    }

    if summary.is_empty() {
        return Err(ShapeError::EmptyDocument(target.display().to_string()));
    }

    XlsxWriter::write_file(&summary, &target)?;
    Ok(target)
}

/// Copy one source file's active sheet into the summary document
fn append_source(summary: &mut Document, path: &Path) -> Result<String> {
    let source = XlsxReader::read_file(path)?;
    let grid = source
        .active_grid()
        .ok_or_else(|| ShapeError::EmptyDocument(path.display().to_string()))?;

    let name = sheet_name_for(path);
    // Truncated names can collide; the last file keeps the sheet
    if let Some(existing) = summary.sheet_index(&name) {
        summary.remove_grid(existing)?;
    }

    let idx = summary.add_grid(&name)?;
    copy_grid(grid, summary.grid_mut(idx).unwrap())?;
    Ok(name)
}

/// Copy a shaped grid verbatim, then re-normalize the copy
fn copy_grid(source: &Grid, target: &mut Grid) -> Result<()> {
    let row_count = source.row_count();
    let col_count = source.col_count();

    // Cell values and styles
    for (row, c, cell) in source.iter_cells() {
        if !cell.value.is_empty() {
            target.set_value_at(row, c, cell.value.clone())?;
        }
        if cell.style_index != 0 {
            if let Some(style) = source.style_by_index(cell.style_index) {
                target.set_style_at(row, c, style)?;
            }
        }
    }

    // Row heights before hidden flags
    for (&row, &height) in source.custom_row_heights() {
        target.set_row_height(row, height);
    }
    for &row in source.hidden_rows().keys() {
        target.set_row_hidden(row, true);
    }

    // Column state (re-derived below, but copied first so unshaped sources
    // keep whatever they had)
    for (&c, &width) in source.custom_column_widths() {
        target.set_column_width(c, width);
    }
    for &c in source.hidden_columns().keys() {
        target.set_column_hidden(c, true);
    }

    // Freeze boundary
    if let Some(freeze) = source.freeze_boundary() {
        target.set_freeze_boundary(freeze.row, freeze.col);
    }

    // Merged regions, copied before the cosmetic pass so centering sees them
    for range in source.merged_regions() {
        let _ = target.merge_cells(range);
    }

    renormalize(target, row_count, col_count)
}

/// The defensive cosmetic pass applied to every copied sheet
fn renormalize(target: &mut Grid, row_count: u32, col_count: u16) -> Result<()> {
    // Copying may not perfectly preserve derived state; re-hide the fixed
    // column set
    hide_fixed_columns(target, col_count);

    // Body cells: drop wrap, center vertically
    for row in FIRST_DATA_ROW..row_count {
        for c in 0..col_count {
            let mut style = target.cell_style_at(row, c).cloned().unwrap_or_default();
            style.alignment.vertical = VerticalAlignment::Center;
            style.alignment.wrap_text = false;
            target.set_style_at(row, c, &style)?;
        }
    }

    // Merged regions (headers included): center the anchor cell both ways
    let regions: Vec<CellRange> = target.merged_regions().to_vec();
    for region in regions {
        let mut style = target
            .cell_style_at(region.start_row, region.start_col)
            .cloned()
            .unwrap_or_default();
        style.alignment = Alignment::new()
            .with_horizontal(HorizontalAlignment::Center)
            .with_vertical(VerticalAlignment::Center);
        target.set_style_at(region.start_row, region.start_col, &style)?;
    }

    // Refit visible columns from visible rows
    for c in 0..col_count {
        if target.is_column_hidden(c) {
            continue;
        }

        let mut max_len = 0usize;
        for row in 0..row_count {
            if target.is_row_hidden(row) {
                continue;
            }
            let cell = match target.cell_at(row, c) {
                Some(cell) if !cell.value.is_empty() => cell,
                _ => continue,
            };
            let mut len = cell.value.to_string().chars().count();
            // Larger fonts need proportionally more width (11pt baseline)
            if let Some(style) = target.style_by_index(cell.style_index) {
                let size = style.font.size;
                if size > 0.0 {
                    len = (len as f64 * (size / 11.0)) as usize;
                }
            }
            max_len = max_len.max(len);
        }

        let width = if max_len == 0 {
            10.0
        } else {
            (max_len + 1).clamp(8, 40) as f64
        };
        target.set_column_width(c, width);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_name_truncation() {
        assert_eq!(sheet_name_for(Path::new("/tmp/BC01.xlsx")), "BC01");

        let long = "a".repeat(40);
        let name = sheet_name_for(Path::new(&format!("/tmp/{}.xlsx", long)));
        assert_eq!(name.chars().count(), MAX_SHEET_NAME_LEN);

        // Multi-byte stems truncate on character boundaries
        let viet = "báo cáo bán hàng chi tiết theo khu vực";
        let name = sheet_name_for(Path::new(&format!("/tmp/{}.xlsx", viet)));
        assert_eq!(name.chars().count(), MAX_SHEET_NAME_LEN);
    }

    #[test]
    fn test_copy_grid_preserves_content_and_state() {
        let mut source = Grid::new("src");
        source.set_value_at(5, 6, "giữ nguyên").unwrap();
        source.set_value_at(6, 16, 2.0).unwrap();
        source.set_row_hidden(1, true);
        source.set_row_height(4, 28.5);
        source.set_freeze_boundary(5, 0);
        source.merge_cells(&CellRange::parse("A4:C4").unwrap()).unwrap();

        let mut target = Grid::new("dst");
        copy_grid(&source, &mut target).unwrap();

        assert_eq!(target.value_at(5, 6).as_str(), Some("giữ nguyên"));
        assert_eq!(target.value_at(6, 16).as_number(), Some(2.0));
        assert!(target.is_row_hidden(1));
        assert!((target.row_height(4) - 28.5).abs() < 1e-9);
        assert_eq!(target.freeze_boundary(), source.freeze_boundary());
        assert_eq!(target.merged_regions(), source.merged_regions());
    }

    #[test]
    fn test_renormalize_centers_body_cells() {
        let mut source = Grid::new("src");
        for row in 0..8 {
            for c in 0..18u16 {
                source.set_value_at(row, c, "v").unwrap();
            }
        }

        let mut target = Grid::new("dst");
        copy_grid(&source, &mut target).unwrap();

        // Body cell got vertical centering and no wrap
        let style = target.cell_style_at(6, 6).unwrap();
        assert_eq!(style.alignment.vertical, VerticalAlignment::Center);
        assert!(!style.alignment.wrap_text);

        // Header cells (rows 1-5) are left alone
        assert!(target
            .cell_style_at(2, 6)
            .map_or(true, |s| s.alignment.vertical != VerticalAlignment::Center));

        // The fixed column set is hidden again
        assert!(target.is_column_hidden(0));
        assert!(!target.is_column_hidden(6));
    }

    #[test]
    fn test_renormalize_centers_merged_anchor() {
        let mut source = Grid::new("src");
        for c in 0..18u16 {
            source.set_value_at(3, c, "tiêu đề").unwrap();
        }
        source.set_value_at(6, 6, "x").unwrap();
        source.merge_cells(&CellRange::parse("A4:R4").unwrap()).unwrap();

        let mut target = Grid::new("dst");
        copy_grid(&source, &mut target).unwrap();

        let style = target.cell_style_at(3, 0).unwrap();
        assert_eq!(style.alignment.horizontal, HorizontalAlignment::Center);
        assert_eq!(style.alignment.vertical, VerticalAlignment::Center);
    }

    #[test]
    fn test_renormalize_refits_visible_columns_only() {
        let mut source = Grid::new("src");
        source.set_value_at(5, 6, "nội dung dài hơn mười ký tự").unwrap();
        source.set_value_at(6, 6, "ngắn").unwrap();
        source.set_value_at(7, 6, "dòng ẩn rất rất rất rất rất rất dài").unwrap();
        source.set_value_at(7, 16, "q").unwrap();
        source.set_row_hidden(7, true);

        let mut target = Grid::new("dst");
        copy_grid(&source, &mut target).unwrap();

        // Hidden row 7 must not influence the fit: 27 chars + 1
        assert!((target.column_width(6) - 28.0).abs() < 1e-9);
        // Hidden columns keep their width untouched by the refit
        assert!(target.is_column_hidden(0));
    }
}
