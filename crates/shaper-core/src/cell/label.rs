//! Column label and cell reference conversions
//!
//! Column letters (A, B, ..., Z, AA, ...) are a display convention; the rest
//! of the crate works with 0-based integer indices. These helpers are used at
//! the I/O boundary only.

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
pub fn column_to_letters(col: u16) -> String {
    let mut result = String::new();
    let mut n = col as u32 + 1; // 1-based for calculation

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
pub fn letters_to_column(letters: &str) -> Result<u16> {
    if letters.is_empty() {
        return Err(Error::InvalidReference("empty column letters".into()));
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidReference(format!(
                "invalid column letter '{}'",
                c
            )));
        }
        col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }

    let col = col - 1; // Convert to 0-based

    if col >= MAX_COLS as u32 {
        return Err(Error::ColumnOutOfBounds(col as u16, MAX_COLS - 1));
    }

    Ok(col as u16)
}

/// Format a (row, col) pair as an A1-style reference
pub fn cell_ref(row: u32, col: u16) -> String {
    format!("{}{}", column_to_letters(col), row + 1)
}

/// Parse an A1-style reference into a (row, col) pair.
///
/// `$` markers are accepted and ignored; absolute/relative distinctions do
/// not matter to the grid model.
pub fn parse_cell_ref(s: &str) -> Result<(u32, u16)> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::InvalidReference("empty reference".into()));
    }

    let bytes = s.as_bytes();
    let mut pos = 0;

    if bytes.get(pos) == Some(&b'$') {
        pos += 1;
    }

    let col_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
        pos += 1;
    }

    if pos == col_start {
        return Err(Error::InvalidReference(format!(
            "no column letters in '{}'",
            s
        )));
    }

    let col = letters_to_column(&s[col_start..pos])?;

    if bytes.get(pos) == Some(&b'$') {
        pos += 1;
    }

    let row_str = &s[pos..];
    if row_str.is_empty() {
        return Err(Error::InvalidReference(format!("no row number in '{}'", s)));
    }

    let row: u32 = row_str
        .parse()
        .map_err(|_| Error::InvalidReference(format!("invalid row number in '{}'", s)))?;

    // Display rows are 1-based, internal rows 0-based
    if row == 0 {
        return Err(Error::InvalidReference(format!(
            "row number must be >= 1 in '{}'",
            s
        )));
    }

    let row = row - 1;
    if row >= MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
    }

    Ok((row, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(column_to_letters(0), "A");
        assert_eq!(column_to_letters(16), "Q");
        assert_eq!(column_to_letters(18), "S");
        assert_eq!(column_to_letters(25), "Z");
        assert_eq!(column_to_letters(26), "AA");
        assert_eq!(column_to_letters(701), "ZZ");
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(letters_to_column("A").unwrap(), 0);
        assert_eq!(letters_to_column("q").unwrap(), 16);
        assert_eq!(letters_to_column("AA").unwrap(), 26);
        assert!(letters_to_column("").is_err());
        assert!(letters_to_column("A1").is_err());
    }

    #[test]
    fn test_cell_ref_roundtrip() {
        assert_eq!(cell_ref(0, 0), "A1");
        assert_eq!(cell_ref(5, 0), "A6");
        assert_eq!(parse_cell_ref("A6").unwrap(), (5, 0));
        assert_eq!(parse_cell_ref("$K$11").unwrap(), (10, 10));
        assert!(parse_cell_ref("K0").is_err());
        assert!(parse_cell_ref("11").is_err());
    }
}
