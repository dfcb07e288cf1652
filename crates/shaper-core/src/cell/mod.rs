//! Cell types: values, labels, and sparse storage

mod label;
mod storage;
mod value;

pub use label::{cell_ref, column_to_letters, letters_to_column, parse_cell_ref};
pub use storage::{CellData, CellStorage};
pub use value::CellValue;
