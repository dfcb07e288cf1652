//! Prelude module - common imports for shaper users
//!
//! ```rust
//! use shaper::prelude::*;
//! ```

pub use crate::{
    // Style types
    Alignment,
    // Batch types
    BatchOutcome,
    CellRange,
    // Cell types
    CellValue,
    Color,
    // Main types
    Document,
    // Extension traits
    DocumentExt,
    FontStyle,
    FreezeBoundary,
    Grid,
    HorizontalAlignment,
    // Error types
    Result,
    ShapeError,
    ShapeStats,
    Style,
    VerticalAlignment,
    // I/O types
    XlsxReader,
    XlsxWriter,
};

pub use crate::{consolidate, load_grid, save_grid, shape_directory, shape_file, shape_grid};
