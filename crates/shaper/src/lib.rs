//! # shaper
//!
//! Deterministic shaping for downloaded KPI report spreadsheets.
//!
//! A downloaded report is a grid with a fixed five-row header block. The
//! [`pipeline`] applies an ordered set of visibility and content rules to it;
//! [`batch`] runs the pipeline over a per-date directory of reports; and
//! [`consolidate`] merges shaped reports into one multi-sheet document.
//!
//! ## Example
//!
//! ```rust,no_run
//! use shaper::prelude::*;
//!
//! let mut grid = shaper::load_grid("output/05082026/BC01.xlsx")?;
//! let stats = shape_grid(&mut grid)?;
//! println!("{} rows hidden", stats.hidden_rows());
//! shaper::save_grid(grid, "output/05082026/BC01.xlsx")?;
//! # Ok::<(), shaper::ShapeError>(())
//! ```

pub mod batch;
pub mod consolidate;
pub mod error;
pub mod pipeline;
pub mod prelude;

pub use batch::{shape_directory, shape_file, BatchOutcome};
pub use consolidate::{consolidate, CONSOLIDATED_FILE_NAME};
pub use error::{Result, ShapeError};
pub use pipeline::{shape_grid, ShapeStats, FIRST_DATA_ROW};

// Re-export core types
pub use shaper_core::{
    Alignment,
    BorderEdge,
    BorderLineStyle,
    BorderStyle,
    CellData,
    CellRange,
    // Cell types
    CellValue,
    Color,
    // Main types
    Document,
    FillStyle,
    FontStyle,
    FreezeBoundary,
    Grid,
    HorizontalAlignment,
    NumberFormat,
    // Style types
    Style,
    StylePool,
    VerticalAlignment,
    MAX_COLS,
    // Constants
    MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export I/O types
pub use shaper_xlsx::{XlsxError, XlsxReader, XlsxWriter};

use std::path::Path;

/// Extension trait for Document file I/O
pub trait DocumentExt {
    /// Open a document from a file
    fn open<P: AsRef<Path>>(path: P) -> Result<Document>;

    /// Save the document to a file
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}

impl DocumentExt for Document {
    fn open<P: AsRef<Path>>(path: P) -> Result<Document> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => XlsxReader::read_file(path).map_err(Into::into),
            _ => Err(ShapeError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") => XlsxWriter::write_file(self, path).map_err(Into::into),
            _ => Err(ShapeError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Load the active grid of a report file.
///
/// Together with [`save_grid`] this is the only boundary the pipeline layer
/// crosses into the file format.
pub fn load_grid<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let path = path.as_ref();
    let mut document = Document::open(path)?;
    if document.is_empty() {
        return Err(ShapeError::EmptyDocument(path.display().to_string()));
    }
    let active = document.active_sheet();
    document.remove_grid(active).map_err(Into::into)
}

/// Save a grid as a single-sheet report file, replacing the target
pub fn save_grid<P: AsRef<Path>>(grid: Grid, path: P) -> Result<()> {
    let mut document = Document::empty();
    document.add_existing_grid(grid)?;
    document.save(path)
}
