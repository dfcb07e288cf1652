//! Grid type - a single report sheet

use crate::cell::{CellData, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::range::CellRange;
use crate::style::Style;
use crate::{MAX_COLS, MAX_ROWS};

/// A grid (single sheet of a report document)
///
/// Holds sparse cell content plus per-row/per-column visibility state, merged
/// regions, and the freeze boundary. The shaping pipeline mutates a `Grid` in
/// place; nothing here touches the file format.
#[derive(Debug)]
pub struct Grid {
    /// Sheet name
    name: String,
    /// Cell storage (content + dimension state)
    cells: CellStorage,
    /// Freeze boundary
    freeze: Option<FreezeBoundary>,
}

impl Grid {
    /// Create a new empty grid with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            freeze: None,
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Cell Access ===

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(row, col)
    }

    /// Get a mutable cell by row and column indices
    pub fn cell_at_mut(&mut self, row: u32, col: u16) -> Option<&mut CellData> {
        self.cells.get_mut(row, col)
    }

    /// Get a cell value (empty if the cell does not exist)
    pub fn value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty)
    }

    /// Set a cell value by row and column indices
    pub fn set_value_at<V: Into<CellValue>>(&mut self, row: u32, col: u16, value: V) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    /// Clear a cell's value, keeping its style
    pub fn clear_value_at(&mut self, row: u32, col: u16) {
        self.cells.set_value(row, col, CellValue::Empty);
    }

    /// Remove a cell entirely (value and style)
    pub fn clear_cell_at(&mut self, row: u32, col: u16) {
        self.cells.remove(row, col);
    }

    // === Styles ===

    /// Get a cell's style index (0 if the cell does not exist)
    pub fn cell_style_index_at(&self, row: u32, col: u16) -> u32 {
        self.cells.get(row, col).map(|c| c.style_index).unwrap_or(0)
    }

    /// Get a style by its index in this grid's style pool
    pub fn style_by_index(&self, style_index: u32) -> Option<&Style> {
        self.cells.style_pool().get(style_index)
    }

    /// Get the non-default style applied to a cell, if any
    pub fn cell_style_at(&self, row: u32, col: u16) -> Option<&Style> {
        let idx = self.cell_style_index_at(row, col);
        if idx == 0 {
            None
        } else {
            self.style_by_index(idx)
        }
    }

    /// Set a cell style by row and column indices
    pub fn set_style_at(&mut self, row: u32, col: u16, style: &Style) -> Result<()> {
        self.validate_cell_position(row, col)?;
        let style_index = self.cells.style_pool_mut().get_or_insert(style.clone());
        self.cells.set_style(row, col, style_index);
        Ok(())
    }

    // === Extent ===

    /// The used range (bounds of all stored cells)
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells
            .used_bounds()
            .map(|(min_row, min_col, max_row, max_col)| {
                CellRange::new(min_row, min_col, max_row, max_col)
            })
    }

    /// Number of rows, derived from the last stored cell (0 for an empty grid)
    pub fn row_count(&self) -> u32 {
        self.cells
            .used_bounds()
            .map(|(_, _, max_row, _)| max_row + 1)
            .unwrap_or(0)
    }

    /// Number of columns, derived from the last stored cell (0 for an empty grid)
    pub fn col_count(&self) -> u16 {
        self.cells
            .used_bounds()
            .map(|(_, _, _, max_col)| max_col + 1)
            .unwrap_or(0)
    }

    /// Get the number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// Check if the grid is empty
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over all non-empty cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter()
    }

    // === Row/Column State ===

    /// Get row height
    pub fn row_height(&self, row: u32) -> f64 {
        self.cells.row_height(row)
    }

    /// Set row height
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.cells.set_row_height(row, height);
    }

    /// Check if row is hidden
    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.cells.is_row_hidden(row)
    }

    /// Set row hidden state
    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) {
        self.cells.set_row_hidden(row, hidden);
    }

    /// Get column width
    pub fn column_width(&self, col: u16) -> f64 {
        self.cells.column_width(col)
    }

    /// Set column width
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.cells.set_column_width(col, width);
    }

    /// Check if column is hidden
    pub fn is_column_hidden(&self, col: u16) -> bool {
        self.cells.is_column_hidden(col)
    }

    /// Set column hidden state
    pub fn set_column_hidden(&mut self, col: u16, hidden: bool) {
        self.cells.set_column_hidden(col, hidden);
    }

    /// All custom row heights (row index → height in points)
    pub fn custom_row_heights(&self) -> &std::collections::BTreeMap<u32, f64> {
        self.cells.custom_row_heights()
    }

    /// All hidden rows (row index → true)
    pub fn hidden_rows(&self) -> &std::collections::BTreeMap<u32, bool> {
        self.cells.hidden_rows()
    }

    /// All custom column widths (column index → width in characters)
    pub fn custom_column_widths(&self) -> &std::collections::BTreeMap<u16, f64> {
        self.cells.custom_column_widths()
    }

    /// All hidden columns (column index → true)
    pub fn hidden_columns(&self) -> &std::collections::BTreeMap<u16, bool> {
        self.cells.hidden_columns()
    }

    // === Merged Regions ===

    /// Get merged regions
    pub fn merged_regions(&self) -> &[CellRange] {
        self.cells.merged_regions()
    }

    /// Merge cells
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        // Check for overlap with existing merged regions
        for existing in self.cells.merged_regions() {
            if range.overlaps(existing) {
                return Err(Error::MergedRegionConflict(range.to_string()));
            }
        }
        self.cells.add_merged_region(*range);
        Ok(())
    }

    // === Freeze Boundary ===

    /// Get the freeze boundary
    pub fn freeze_boundary(&self) -> Option<FreezeBoundary> {
        self.freeze
    }

    /// Set the freeze boundary: everything above `row` and left of `col`
    /// stays pinned. (0, 0) clears the boundary.
    pub fn set_freeze_boundary(&mut self, row: u32, col: u16) {
        if row == 0 && col == 0 {
            self.freeze = None;
        } else {
            self.freeze = Some(FreezeBoundary { row, col });
        }
    }

    /// Remove the freeze boundary
    pub fn clear_freeze_boundary(&mut self) {
        self.freeze = None;
    }

    /// Validate cell position
    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }
}

/// Freeze boundary: top-left corner of the scrollable region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezeBoundary {
    /// First unfrozen row (0-based)
    pub row: u32,
    /// First unfrozen column (0-based)
    pub col: u16,
}
