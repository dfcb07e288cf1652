//! Document type - an ordered collection of grids

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::MAX_SHEET_NAME_LEN;

/// A document (spreadsheet file) holding one or more grids
#[derive(Debug)]
pub struct Document {
    /// Grids in the document
    grids: Vec<Grid>,
    /// Active grid index
    active: usize,
}

impl Document {
    /// Create a new document with one empty grid
    pub fn new() -> Self {
        let mut doc = Self {
            grids: Vec::new(),
            active: 0,
        };
        doc.add_grid("Sheet1").unwrap();
        doc
    }

    /// Create an empty document with no grids
    pub fn empty() -> Self {
        Self {
            grids: Vec::new(),
            active: 0,
        }
    }

    /// Get the number of grids
    pub fn sheet_count(&self) -> usize {
        self.grids.len()
    }

    /// Check if the document has no grids
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Get a grid by index
    pub fn grid(&self, index: usize) -> Option<&Grid> {
        self.grids.get(index)
    }

    /// Get a mutable grid by index
    pub fn grid_mut(&mut self, index: usize) -> Option<&mut Grid> {
        self.grids.get_mut(index)
    }

    /// Get a grid by name
    pub fn grid_by_name(&self, name: &str) -> Option<&Grid> {
        self.grids.iter().find(|g| g.name() == name)
    }

    /// Get the index of a grid by name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.grids.iter().position(|g| g.name() == name)
    }

    /// Iterate over all grids
    pub fn grids(&self) -> impl Iterator<Item = &Grid> {
        self.grids.iter()
    }

    /// Iterate over all grids mutably
    pub fn grids_mut(&mut self) -> impl Iterator<Item = &mut Grid> {
        self.grids.iter_mut()
    }

    /// Add a new empty grid with the specified name
    pub fn add_grid(&mut self, name: &str) -> Result<usize> {
        self.validate_sheet_name(name, None)?;

        let index = self.grids.len();
        self.grids.push(Grid::new(name));
        Ok(index)
    }

    /// Add an existing grid to the document
    pub fn add_existing_grid(&mut self, grid: Grid) -> Result<usize> {
        self.validate_sheet_name(grid.name(), None)?;
        let index = self.grids.len();
        self.grids.push(grid);
        Ok(index)
    }

    /// Remove a grid by index
    pub fn remove_grid(&mut self, index: usize) -> Result<Grid> {
        if index >= self.grids.len() {
            return Err(Error::SheetOutOfBounds(index, self.grids.len()));
        }

        let grid = self.grids.remove(index);

        // Adjust active index
        if !self.grids.is_empty() {
            if self.active >= self.grids.len() {
                self.active = self.grids.len() - 1;
            }
        } else {
            self.active = 0;
        }

        Ok(grid)
    }

    /// Rename a grid
    pub fn rename_grid(&mut self, index: usize, new_name: &str) -> Result<()> {
        if index >= self.grids.len() {
            return Err(Error::SheetOutOfBounds(index, self.grids.len()));
        }

        self.validate_sheet_name(new_name, Some(index))?;
        self.grids[index].set_name(new_name);
        Ok(())
    }

    /// Get the active grid index
    pub fn active_sheet(&self) -> usize {
        self.active
    }

    /// Get the active grid
    pub fn active_grid(&self) -> Option<&Grid> {
        self.grids.get(self.active)
    }

    /// Get the active grid mutably
    pub fn active_grid_mut(&mut self) -> Option<&mut Grid> {
        self.grids.get_mut(self.active)
    }

    /// Set the active grid index
    pub fn set_active_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.grids.len() {
            return Err(Error::SheetOutOfBounds(index, self.grids.len()));
        }
        self.active = index;
        Ok(())
    }

    /// Validate a sheet name, optionally excluding a grid from the duplicate check
    fn validate_sheet_name(&self, name: &str, exclude_index: Option<usize>) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name too long (max {} characters)",
                MAX_SHEET_NAME_LEN
            )));
        }

        const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
        for c in INVALID_CHARS {
            if name.contains(*c) {
                return Err(Error::InvalidSheetName(format!(
                    "Sheet name cannot contain '{}'",
                    c
                )));
            }
        }

        // Duplicate check is case-insensitive
        let name_lower = name.to_lowercase();
        for (i, g) in self.grids.iter().enumerate() {
            if Some(i) != exclude_index && g.name().to_lowercase() == name_lower {
                return Err(Error::DuplicateSheetName(name.into()));
            }
        }

        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
