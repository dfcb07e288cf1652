//! The shaping rule pipeline
//!
//! A fixed, ordered sequence of visibility and content rules applied to one
//! report grid. The dashboard export always carries a five-row header block
//! (rows 1-5 in display terms); data rows start at display row 6. Rules after
//! the header step only evaluate rows that are still visible, except where a
//! rule explicitly scans every data row.
//!
//! Re-running the pipeline on an already-shaped grid is a no-op: hiding is
//! monotonic and clearing an empty cell changes nothing.

use shaper_core::{Grid, Result};

/// Column indices the rules refer to, by display letter.
#[allow(dead_code)]
mod col {
    pub const A: u16 = 0;
    pub const B: u16 = 1;
    pub const C: u16 = 2;
    pub const D: u16 = 3;
    pub const E: u16 = 4;
    pub const F: u16 = 5;
    pub const G: u16 = 6;
    pub const H: u16 = 7;
    pub const I: u16 = 8;
    pub const J: u16 = 9;
    pub const K: u16 = 10;
    pub const L: u16 = 11;
    pub const M: u16 = 12;
    pub const N: u16 = 13;
    pub const Q: u16 = 16;
    pub const S: u16 = 18;
}

/// First data row; everything above is the header block
pub const FIRST_DATA_ROW: u32 = 5;

/// Sales-channel keywords in column K whose rows are excluded from the report
const HIDDEN_CHANNEL_KEYWORDS: &[&str] = &[
    "NPP Bán",
    "NPP tự bán",
    "TMDT Lazada",
    "TMDT Sendo",
    "TMDT Tiki",
    "TT Bán",
];

/// The two free-text columns that get wrap disabled and width auto-fitted
const DETAIL_COLUMNS: [u16; 2] = [col::I, col::K];

/// Per-rule counters for one shaping run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShapeStats {
    /// Rows hidden for a blank key column (A)
    pub hidden_blank_key: u32,
    /// Rows hidden for blank B and C with non-blank F
    pub hidden_blank_codes: u32,
    /// Rows hidden for blank D with non-blank C
    pub hidden_blank_d: u32,
    /// Rows whose tail (column K onward) was cleared for a blank C
    pub cleared_tails: u32,
    /// Rows hidden for a channel keyword in column K
    pub hidden_channels: u32,
    /// Rows hidden for a positive column Q value
    pub hidden_positive_q: u32,
    /// Rows hidden for repeating a blank column Q
    pub hidden_blank_q_runs: u32,
    /// Columns hidden by the fixed column rule
    pub hidden_columns: u32,
}

impl ShapeStats {
    /// Total data rows hidden by the pipeline
    pub fn hidden_rows(&self) -> u32 {
        self.hidden_blank_key
            + self.hidden_blank_codes
            + self.hidden_blank_d
            + self.hidden_channels
            + self.hidden_positive_q
            + self.hidden_blank_q_runs
    }
}

/// Apply the full rule pipeline to a grid, in order.
///
/// The grid's extent is captured once up front; content clearing mid-pipeline
/// does not change which rows/columns later rules consider.
pub fn shape_grid(grid: &mut Grid) -> Result<ShapeStats> {
    let row_count = grid.row_count();
    let col_count = grid.col_count();

    let mut stats = ShapeStats::default();

    hide_header_rows(grid);
    stats.hidden_blank_key = hide_blank_key_rows(grid, row_count);
    stats.hidden_blank_codes = hide_blank_code_rows(grid, row_count);
    stats.hidden_blank_d = hide_blank_d_rows(grid, row_count);
    stats.cleared_tails = clear_blank_c_tails(grid, row_count, col_count);
    stats.hidden_channels = hide_channel_rows(grid, row_count, col_count);
    stats.hidden_positive_q = hide_positive_q_rows(grid, row_count, col_count);
    stats.hidden_blank_q_runs = collapse_blank_q_runs(grid, row_count, col_count);
    stats.hidden_columns = hide_fixed_columns(grid, col_count);

    // Pin the header block: rows 1-5 stay visible while the data scrolls
    grid.set_freeze_boundary(FIRST_DATA_ROW, 0);

    autofit_detail_columns(grid, row_count)?;

    Ok(stats)
}

/// Check a cell for blankness (missing, empty, or whitespace-only string)
fn blank(grid: &Grid, row: u32, c: u16) -> bool {
    grid.cell_at(row, c).map_or(true, |cell| cell.value.is_blank())
}

/// Rows 1-3 are dashboard chrome; always hidden. Rows 4-5 stay as the
/// visible header.
fn hide_header_rows(grid: &mut Grid) {
    for row in 0..3 {
        grid.set_row_hidden(row, true);
    }
}

/// Hide every data row with a blank key column (A), regardless of prior state
fn hide_blank_key_rows(grid: &mut Grid, row_count: u32) -> u32 {
    let mut hidden = 0;
    for row in FIRST_DATA_ROW..row_count {
        if blank(grid, row, col::A) {
            grid.set_row_hidden(row, true);
            hidden += 1;
        }
    }
    hidden
}

/// Hide rows with blank B and C but a non-blank F (visible rows only)
fn hide_blank_code_rows(grid: &mut Grid, row_count: u32) -> u32 {
    let mut hidden = 0;
    for row in FIRST_DATA_ROW..row_count {
        if grid.is_row_hidden(row) {
            continue;
        }
        if blank(grid, row, col::B) && blank(grid, row, col::C) && !blank(grid, row, col::F) {
            grid.set_row_hidden(row, true);
            hidden += 1;
        }
    }
    hidden
}

/// Hide rows with a blank D but a non-blank C (visible rows only)
fn hide_blank_d_rows(grid: &mut Grid, row_count: u32) -> u32 {
    let mut hidden = 0;
    for row in FIRST_DATA_ROW..row_count {
        if grid.is_row_hidden(row) {
            continue;
        }
        if blank(grid, row, col::D) && !blank(grid, row, col::C) {
            grid.set_row_hidden(row, true);
            hidden += 1;
        }
    }
    hidden
}

/// Clear columns K onward on every data row with a blank C.
///
/// This runs over hidden rows too: the cleared values must not survive into
/// the consolidated output even when the row is invisible.
fn clear_blank_c_tails(grid: &mut Grid, row_count: u32, col_count: u16) -> u32 {
    if col_count < col::K + 1 {
        return 0;
    }
    let mut cleared = 0;
    for row in FIRST_DATA_ROW..row_count {
        if blank(grid, row, col::C) {
            for c in col::K..col_count {
                grid.clear_value_at(row, c);
            }
            cleared += 1;
        }
    }
    cleared
}

/// Hide rows whose column K text mentions one of the excluded sales channels
fn hide_channel_rows(grid: &mut Grid, row_count: u32, col_count: u16) -> u32 {
    if col_count < col::K + 1 {
        return 0;
    }
    let mut hidden = 0;
    for row in FIRST_DATA_ROW..row_count {
        if grid.is_row_hidden(row) {
            continue;
        }
        let text = match grid.cell_at(row, col::K) {
            Some(cell) if !cell.value.is_empty() => cell.value.to_string(),
            _ => continue,
        };
        if HIDDEN_CHANNEL_KEYWORDS.iter().any(|kw| text.contains(kw)) {
            grid.set_row_hidden(row, true);
            hidden += 1;
        }
    }
    hidden
}

/// Hide rows where column Q parses as a number strictly greater than zero.
/// Blank and non-numeric values keep the row visible.
fn hide_positive_q_rows(grid: &mut Grid, row_count: u32, col_count: u16) -> u32 {
    if col_count < col::Q + 1 {
        return 0;
    }
    let mut hidden = 0;
    for row in FIRST_DATA_ROW..row_count {
        if grid.is_row_hidden(row) {
            continue;
        }
        if let Some(q) = grid.value_at(row, col::Q).as_number() {
            if q > 0.0 {
                grid.set_row_hidden(row, true);
                hidden += 1;
            }
        }
    }
    hidden
}

/// Keep only the first row of each run of consecutive blank-Q rows.
///
/// The scan skips rows hidden by earlier rules entirely; a row hidden by this
/// very rule still updates the tracker, since it was visible when scanned.
/// The outcome therefore depends on the raw scan order, not on the final set
/// of visible rows. Downstream sheets are built against this exact behavior,
/// so it must not be "corrected" to visible-row order.
fn collapse_blank_q_runs(grid: &mut Grid, row_count: u32, col_count: u16) -> u32 {
    if col_count < col::Q + 1 {
        return 0;
    }
    let mut hidden = 0;
    let mut prev_blank_q = false;
    for row in FIRST_DATA_ROW..row_count {
        if grid.is_row_hidden(row) {
            continue;
        }
        let blank_q = blank(grid, row, col::Q);
        if prev_blank_q && blank_q {
            grid.set_row_hidden(row, true);
            hidden += 1;
        }
        prev_blank_q = blank_q;
    }
    hidden
}

/// Hide the fixed column set: A-F, H, J, L, M, N, and S through the last
/// column. Columns beyond the grid's extent are skipped.
pub(crate) fn hide_fixed_columns(grid: &mut Grid, col_count: u16) -> u32 {
    let mut hidden = 0;

    for c in col::A..=col::F {
        if c < col_count {
            grid.set_column_hidden(c, true);
            hidden += 1;
        }
    }

    for c in [col::H, col::J, col::L, col::M, col::N] {
        if c < col_count {
            grid.set_column_hidden(c, true);
            hidden += 1;
        }
    }

    for c in col::S..col_count {
        grid.set_column_hidden(c, true);
        hidden += 1;
    }

    hidden
}

/// Normalize the two detail columns (I and K): drop the wrap flag on every
/// styled cell, then auto-fit the column width to the content.
///
/// Width is `max display length + 1`, clamped to 6..=30, where numeric
/// values count as at least 8 characters to approximate formatted display.
fn autofit_detail_columns(grid: &mut Grid, row_count: u32) -> Result<()> {
    for c in DETAIL_COLUMNS {
        for row in 0..row_count {
            let needs_unwrap = grid
                .cell_style_at(row, c)
                .map_or(false, |style| style.alignment.wrap_text);
            if needs_unwrap {
                let mut style = grid.cell_style_at(row, c).cloned().unwrap_or_default();
                style.alignment.wrap_text = false;
                grid.set_style_at(row, c, &style)?;
            }
        }

        let mut max_len = 0usize;
        for row in 0..row_count {
            let value = grid.value_at(row, c);
            if value.is_empty() {
                continue;
            }
            let mut len = value.to_string().chars().count();
            if value.as_number().is_some() {
                len = len.max(8);
            }
            max_len = max_len.max(len);
        }

        let width = (max_len + 1).clamp(6, 30);
        grid.set_column_width(c, width as f64);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaper_core::Style;

    /// A grid with the five-row header block and `data_rows` data rows of
    /// 18 columns (A..R), every cell filled with plausible content.
    fn sample_grid(data_rows: u32) -> Grid {
        let mut grid = Grid::new("BC01");
        for row in 0..5 {
            for c in 0..18u16 {
                grid.set_value_at(row, c, format!("h{}", c)).unwrap();
            }
        }
        for i in 0..data_rows {
            let row = FIRST_DATA_ROW + i;
            for c in 0..18u16 {
                grid.set_value_at(row, c, format!("r{}c{}", row, c)).unwrap();
            }
            // Column Q alternates between a quantity and blank
            if i % 2 == 0 {
                grid.set_value_at(row, col::Q, 0.0).unwrap();
            } else {
                grid.clear_value_at(row, col::Q);
            }
        }
        grid
    }

    #[test]
    fn test_header_rows_hidden() {
        let mut grid = sample_grid(4);
        shape_grid(&mut grid).unwrap();

        for row in 0..3 {
            assert!(grid.is_row_hidden(row), "row {} should be hidden", row);
        }
        assert!(!grid.is_row_hidden(3));
        assert!(!grid.is_row_hidden(4));
    }

    #[test]
    fn test_blank_key_hides_row() {
        let mut grid = sample_grid(4);
        grid.clear_cell_at(6, col::A);
        grid.set_value_at(7, col::A, "   ").unwrap();

        let stats = shape_grid(&mut grid).unwrap();
        assert_eq!(stats.hidden_blank_key, 2);
        assert!(grid.is_row_hidden(6));
        assert!(grid.is_row_hidden(7));
        assert!(!grid.is_row_hidden(5));
    }

    #[test]
    fn test_blank_c_clears_tail_even_when_hidden() {
        let mut grid = sample_grid(4);
        // Row 6: blank A (hidden by the key rule) and blank C
        grid.clear_cell_at(6, col::A);
        grid.clear_cell_at(6, col::C);

        shape_grid(&mut grid).unwrap();

        assert!(grid.is_row_hidden(6));
        for c in col::K..18 {
            assert!(
                grid.value_at(6, c).is_empty(),
                "column {} should be cleared",
                c
            );
        }
        // Columns before K keep their values
        assert!(!grid.value_at(6, col::G).is_empty());
    }

    #[test]
    fn test_channel_keyword_hides_row() {
        let mut grid = sample_grid(4);
        grid.set_value_at(6, col::K, "NPP Bán - khu vực 1").unwrap();
        grid.set_value_at(7, col::K, "TMDT Tiki").unwrap();
        grid.set_value_at(8, col::K, "npp bán").unwrap(); // case-sensitive: stays

        let stats = shape_grid(&mut grid).unwrap();
        assert_eq!(stats.hidden_channels, 2);
        assert!(grid.is_row_hidden(6));
        assert!(grid.is_row_hidden(7));
        assert!(!grid.is_row_hidden(8));
    }

    #[test]
    fn test_positive_q_hides_row() {
        let mut grid = sample_grid(6);
        grid.set_value_at(5, col::Q, 5.0).unwrap();
        grid.set_value_at(6, col::Q, "3").unwrap(); // numeric string counts
        grid.set_value_at(7, col::Q, 0.0).unwrap();
        grid.set_value_at(8, col::Q, -1.0).unwrap();
        grid.set_value_at(9, col::Q, "n/a").unwrap();

        let stats = shape_grid(&mut grid).unwrap();
        assert_eq!(stats.hidden_positive_q, 2);
        assert!(grid.is_row_hidden(5));
        assert!(grid.is_row_hidden(6));
        assert!(!grid.is_row_hidden(7));
        assert!(!grid.is_row_hidden(8));
        assert!(!grid.is_row_hidden(9));
    }

    #[test]
    fn test_blank_q_runs_keep_first_row() {
        let mut grid = sample_grid(6);
        for row in 5..11 {
            grid.clear_value_at(row, col::Q);
        }

        let stats = shape_grid(&mut grid).unwrap();
        assert_eq!(stats.hidden_blank_q_runs, 5);
        assert!(!grid.is_row_hidden(5));
        for row in 6..11 {
            assert!(grid.is_row_hidden(row), "row {} should be hidden", row);
        }
    }

    #[test]
    fn test_fixed_columns_hidden() {
        let mut grid = sample_grid(4);
        shape_grid(&mut grid).unwrap();

        let expected_hidden = [0, 1, 2, 3, 4, 5, 7, 9, 11, 12, 13];
        for c in 0..18u16 {
            let should_hide = expected_hidden.contains(&c);
            assert_eq!(
                grid.is_column_hidden(c),
                should_hide,
                "column {} hidden state",
                c
            );
        }
        // G, I, K, O, P, Q, R visible
        for c in [6u16, 8, 10, 14, 15, 16] {
            assert!(!grid.is_column_hidden(c));
        }
    }

    #[test]
    fn test_wide_grid_hides_tail_columns() {
        let mut grid = sample_grid(4);
        for row in 5..9 {
            grid.set_value_at(row, 22, "extra").unwrap();
        }

        shape_grid(&mut grid).unwrap();
        for c in col::S..23 {
            assert!(grid.is_column_hidden(c), "column {} should be hidden", c);
        }
    }

    #[test]
    fn test_freeze_boundary_set() {
        let mut grid = sample_grid(4);
        shape_grid(&mut grid).unwrap();

        let freeze = grid.freeze_boundary().unwrap();
        assert_eq!(freeze.row, FIRST_DATA_ROW);
        assert_eq!(freeze.col, 0);
    }

    #[test]
    fn test_detail_column_autofit() {
        let mut grid = sample_grid(4);
        grid.set_value_at(6, col::I, "một dòng mô tả khá dài cho cột I")
            .unwrap();
        let wrapped = Style::new().wrap_text(true);
        grid.set_style_at(6, col::I, &wrapped).unwrap();
        grid.set_value_at(6, col::K, 12.0).unwrap();

        shape_grid(&mut grid).unwrap();

        // Wrap flag dropped
        let style = grid.cell_style_at(6, col::I);
        assert!(style.is_none() || !style.unwrap().alignment.wrap_text);

        // 32 characters + 1 padding, clamped to the 30-character ceiling
        assert!((grid.column_width(col::I) - 30.0).abs() < 1e-9);
        // Numeric cells have a display floor of 8, so width is 8 + 1
        assert!((grid.column_width(col::K) - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_narrow_grid_does_not_crash() {
        // Only 4 columns: every rule referencing missing columns is skipped
        let mut grid = Grid::new("narrow");
        for row in 0..8 {
            for c in 0..4u16 {
                grid.set_value_at(row, c, "x").unwrap();
            }
        }

        let stats = shape_grid(&mut grid).unwrap();
        assert_eq!(stats.cleared_tails, 0);
        assert_eq!(stats.hidden_positive_q, 0);
        assert!(grid.is_row_hidden(0));
        // A-D exist and fall in the A-F range
        for c in 0..4u16 {
            assert!(grid.is_column_hidden(c));
        }
    }

    #[test]
    fn test_empty_grid() {
        let mut grid = Grid::new("empty");
        let stats = shape_grid(&mut grid).unwrap();
        assert_eq!(stats.hidden_rows(), 0);
        // Header rows are hidden even with no content
        assert!(grid.is_row_hidden(0));
    }

    #[test]
    fn test_idempotent() {
        let mut grid = sample_grid(10);
        grid.clear_cell_at(7, col::A);
        grid.clear_cell_at(9, col::C);
        grid.set_value_at(11, col::K, "TT Bán lẻ").unwrap();
        grid.set_value_at(13, col::Q, 4.0).unwrap();

        shape_grid(&mut grid).unwrap();

        let hidden_rows: Vec<u32> = (0..grid.row_count())
            .filter(|&r| grid.is_row_hidden(r))
            .collect();
        let hidden_cols: Vec<u16> = (0..grid.col_count())
            .filter(|&c| grid.is_column_hidden(c))
            .collect();
        let widths = (grid.column_width(col::I), grid.column_width(col::K));

        let stats = shape_grid(&mut grid).unwrap();

        let hidden_rows_again: Vec<u32> = (0..grid.row_count())
            .filter(|&r| grid.is_row_hidden(r))
            .collect();
        let hidden_cols_again: Vec<u16> = (0..grid.col_count())
            .filter(|&c| grid.is_column_hidden(c))
            .collect();

        assert_eq!(hidden_rows, hidden_rows_again);
        assert_eq!(hidden_cols, hidden_cols_again);
        assert_eq!(
            widths,
            (grid.column_width(col::I), grid.column_width(col::K))
        );
        // The visible-only rules find nothing new on a second pass
        assert_eq!(stats.hidden_blank_codes, 0);
        assert_eq!(stats.hidden_channels, 0);
        assert_eq!(stats.hidden_positive_q, 0);
        assert_eq!(stats.hidden_blank_q_runs, 0);
    }
}
