//! # shaper-core
//!
//! Core data structures for the report shaper.
//!
//! This crate provides the file-format-independent grid model the shaping
//! pipeline operates on:
//! - [`CellValue`] - Cell values (numbers, strings, booleans, error literals)
//! - [`Style`] - Cell formatting (font, fill, border, alignment)
//! - [`Grid`] - A single sheet: sparse cells, row/column visibility state,
//!   merged regions, freeze boundary
//! - [`Document`] - An ordered collection of named grids
//!
//! ## Example
//!
//! ```rust
//! use shaper_core::Grid;
//!
//! let mut grid = Grid::new("BC01");
//! grid.set_value_at(5, 0, "Mã NPP").unwrap();
//! grid.set_value_at(5, 16, 3.0).unwrap();
//! grid.set_row_hidden(0, true);
//!
//! assert_eq!(grid.value_at(5, 16).as_number(), Some(3.0));
//! assert!(grid.value_at(6, 0).is_blank());
//! ```

pub mod cell;
pub mod document;
pub mod error;
pub mod grid;
pub mod range;
pub mod style;

// Re-exports for convenience
pub use cell::{cell_ref, column_to_letters, letters_to_column, CellData, CellValue};
pub use document::Document;
pub use error::{Error, Result};
pub use grid::{FreezeBoundary, Grid};
pub use range::CellRange;

// Re-export all style types for convenience
pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, NumberFormat, Style, StylePool, VerticalAlignment,
};

/// Maximum number of rows in a grid (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a grid (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
