//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::read_styles_xml;
use shaper_core::cell::parse_cell_ref;
use shaper_core::{CellRange, CellValue, Document, Grid, Style};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' {
            // Check if this looks like _xHHHH_
            let mut hex_chars = String::new();
            let mut is_escape = false;

            if chars.peek() == Some(&'x') {
                chars.next(); // consume 'x'

                // Try to read 4 hex digits
                for _ in 0..4 {
                    if let Some(&ch) = chars.peek() {
                        if ch.is_ascii_hexdigit() {
                            hex_chars.push(ch);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                }

                // Check for closing underscore
                if hex_chars.len() == 4 && chars.peek() == Some(&'_') {
                    chars.next(); // consume closing '_'
                    if let Ok(code) = u32::from_str_radix(&hex_chars, 16) {
                        if let Some(decoded) = char::from_u32(code) {
                            result.push(decoded);
                            is_escape = true;
                        }
                    }
                }
            }

            if !is_escape {
                // Not a valid escape sequence, output what we consumed
                result.push('_');
                if !hex_chars.is_empty() {
                    result.push('x');
                    result.push_str(&hex_chars);
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a document from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Document> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a document from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Document> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        // Read shared strings (if present)
        let shared_strings = Self::read_shared_strings(&mut archive)?;

        // Read styles (if present)
        let cell_styles = Self::read_styles(&mut archive)?;

        // Read workbook.xml to get sheet info
        let sheet_info = Self::read_workbook_xml(&mut archive)?;

        // Read workbook.xml.rels to get sheet paths
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        // Create document
        let mut document = Document::empty();

        // Read each sheet
        for (name, r_id) in &sheet_info {
            if let Some(path) = sheet_paths.get(r_id) {
                let sheet_idx = document.add_grid(name)?;
                Self::read_grid(
                    &mut archive,
                    path,
                    document.grid_mut(sheet_idx).unwrap(),
                    &shared_strings,
                    &cell_styles,
                )?;
            }
        }

        // Ensure at least one sheet exists
        if document.is_empty() {
            document.add_grid("Sheet1")?;
        }

        Ok(document)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"t" if in_si => {
                        in_t = true;
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        // Decode Excel's _xHHHH_ escape sequences
                        let decoded = decode_excel_escapes(&current_string);
                        strings.push(decoded);
                        current_string.clear();
                        in_si = false;
                    }
                    b"t" => {
                        in_t = false;
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current_string.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<Style>> {
        let file = match archive.by_name("xl/styles.xml") {
            Ok(f) => f,
            Err(_) => return Ok(vec![Style::default()]),
        };
        read_styles_xml(file)
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let mut name = None;
                    let mut r_id = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"r:id" => {
                                r_id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => {
                                id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Target" => {
                                target = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Type" => {
                                rel_type = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    // Only include worksheet relationships
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ folder
                            let full_path = if let Some(stripped) = target.strip_prefix('/') {
                                stripped.to_string()
                            } else {
                                format!("xl/{}", target)
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read one sheet from the archive into a grid
    fn read_grid<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        grid: &mut Grid,
        shared_strings: &[String],
        cell_styles: &[Style],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();

        // Current cell state
        let mut current_cell_ref: Option<String> = None;
        let mut current_cell_type: Option<String> = None;
        let mut current_cell_style: Option<u32> = None;
        let mut current_value: Option<String> = None;
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => {
                        Self::apply_row_attrs(grid, &e);
                    }
                    b"c" => {
                        in_cell = true;
                        current_cell_ref = None;
                        current_cell_type = None;
                        current_cell_style = None;
                        current_value = None;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => {
                                    current_cell_ref =
                                        attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"t" => {
                                    current_cell_type =
                                        attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"s" => {
                                    current_cell_style = attr
                                        .unescape_value()
                                        .ok()
                                        .and_then(|s| s.parse::<u32>().ok());
                                }
                                _ => {}
                            }
                        }
                    }
                    b"v" if in_cell => {
                        in_value = true;
                    }
                    // Formula text (<f>) is not modeled; only the cached <v>
                    // result is captured as the cell value.
                    b"is" if in_cell => {
                        in_inline_str = true;
                    }
                    b"t" if in_inline_str => {
                        in_inline_text = true;
                    }
                    b"pane" => {
                        Self::apply_pane_attrs(grid, &e);
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        // Process the cell
                        if let Some(ref cell_ref) = current_cell_ref {
                            Self::process_cell(
                                grid,
                                cell_ref,
                                current_cell_type.as_deref(),
                                current_value.as_deref(),
                                current_cell_style,
                                shared_strings,
                                cell_styles,
                            )?;
                        }
                        in_cell = false;
                    }
                    b"v" => {
                        in_value = false;
                    }
                    b"is" => {
                        in_inline_str = false;
                    }
                    b"t" if in_inline_str => {
                        in_inline_text = false;
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if in_value {
                        if let Ok(text) = e.unescape() {
                            current_value = Some(text.to_string());
                        }
                    } else if in_inline_text {
                        if let Ok(text) = e.unescape() {
                            // Inline string - store directly as value
                            current_value = Some(text.to_string());
                            current_cell_type = Some("inlineStr".to_string());
                        }
                    }
                }
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"row" => {
                        // Self-closing <row .../> with no cells — may have dimensions
                        Self::apply_row_attrs(grid, &e);
                    }
                    b"col" => {
                        Self::apply_col_attrs(grid, &e);
                    }
                    b"c" => {
                        // Empty cell element (may still carry a style)
                        let mut cell_ref: Option<String> = None;
                        let mut cell_type: Option<String> = None;
                        let mut cell_style: Option<u32> = None;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => {
                                    cell_ref = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"t" => {
                                    cell_type = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"s" => {
                                    cell_style = attr
                                        .unescape_value()
                                        .ok()
                                        .and_then(|s| s.parse::<u32>().ok());
                                }
                                _ => {}
                            }
                        }

                        if let Some(cell_ref) = cell_ref {
                            Self::process_cell(
                                grid,
                                &cell_ref,
                                cell_type.as_deref(),
                                None,
                                cell_style,
                                shared_strings,
                                cell_styles,
                            )?;
                        }
                    }
                    b"mergeCell" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"ref" {
                                let ref_str = String::from_utf8_lossy(&attr.value);
                                match CellRange::parse(&ref_str) {
                                    Ok(range) => {
                                        let _ = grid.merge_cells(&range);
                                    }
                                    Err(e) => {
                                        log::warn!("ignoring invalid merge range '{ref_str}': {e}");
                                    }
                                }
                            }
                        }
                    }
                    b"pane" => {
                        Self::apply_pane_attrs(grid, &e);
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Parse row dimensions from a `<row>` element: ht, customHeight, hidden
    fn apply_row_attrs(grid: &mut Grid, e: &BytesStart) {
        let mut row_num: Option<u32> = None;
        let mut ht: Option<f64> = None;
        let mut custom_height = false;
        let mut hidden = false;
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    row_num = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok());
                }
                b"ht" => {
                    ht = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<f64>().ok());
                }
                b"customHeight" => {
                    custom_height = attr
                        .unescape_value()
                        .ok()
                        .is_some_and(|s| s.as_ref() == "1" || s.as_ref() == "true");
                }
                b"hidden" => {
                    hidden = attr
                        .unescape_value()
                        .ok()
                        .is_some_and(|s| s.as_ref() == "1" || s.as_ref() == "true");
                }
                _ => {}
            }
        }
        if let Some(r) = row_num {
            let row_idx = r.saturating_sub(1); // 1-based to 0-based
            if custom_height {
                if let Some(h) = ht {
                    grid.set_row_height(row_idx, h);
                }
            }
            if hidden {
                grid.set_row_hidden(row_idx, true);
            }
        }
    }

    /// Parse column dimensions from a `<col>` element: min, max, width, customWidth, hidden
    fn apply_col_attrs(grid: &mut Grid, e: &BytesStart) {
        let mut col_min: Option<u16> = None;
        let mut col_max: Option<u16> = None;
        let mut width: Option<f64> = None;
        let mut custom_width = false;
        let mut hidden = false;
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"min" => {
                    col_min = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u16>().ok());
                }
                b"max" => {
                    col_max = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u16>().ok());
                }
                b"width" => {
                    width = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<f64>().ok());
                }
                b"customWidth" => {
                    custom_width = attr
                        .unescape_value()
                        .ok()
                        .is_some_and(|s| s.as_ref() == "1" || s.as_ref() == "true");
                }
                b"hidden" => {
                    hidden = attr
                        .unescape_value()
                        .ok()
                        .is_some_and(|s| s.as_ref() == "1" || s.as_ref() == "true");
                }
                _ => {}
            }
        }
        if let (Some(min), Some(max)) = (col_min, col_max) {
            // min/max are 1-based in XLSX
            for col in min..=max {
                let col_idx = col.saturating_sub(1); // 0-based
                if custom_width {
                    if let Some(w) = width {
                        grid.set_column_width(col_idx, w);
                    }
                }
                if hidden {
                    grid.set_column_hidden(col_idx, true);
                }
            }
        }
    }

    /// Parse a `<pane>` element into the freeze boundary
    fn apply_pane_attrs(grid: &mut Grid, e: &BytesStart) {
        let mut x_split: u16 = 0;
        let mut y_split: u32 = 0;
        let mut frozen = false;
        for attr in e.attributes().flatten() {
            let val = match attr.unescape_value() {
                Ok(v) => v,
                Err(_) => continue,
            };
            match attr.key.as_ref() {
                b"xSplit" => {
                    x_split = val.parse::<f64>().map(|v| v as u16).unwrap_or(0);
                }
                b"ySplit" => {
                    y_split = val.parse::<f64>().map(|v| v as u32).unwrap_or(0);
                }
                b"state" => {
                    frozen = val.as_ref() == "frozen" || val.as_ref() == "frozenSplit";
                }
                _ => {}
            }
        }
        if frozen && (x_split > 0 || y_split > 0) {
            grid.set_freeze_boundary(y_split, x_split);
        }
    }

    /// Process a cell and add it to the grid
    fn process_cell(
        grid: &mut Grid,
        cell_ref: &str,
        cell_type: Option<&str>,
        value: Option<&str>,
        style_idx: Option<u32>,
        shared_strings: &[String],
        styles: &[Style],
    ) -> XlsxResult<()> {
        let (row, col) = parse_cell_ref(cell_ref).map_err(|e| {
            XlsxError::Parse(format!("Invalid cell reference '{}': {}", cell_ref, e))
        })?;

        let cell_value = value.and_then(|v| match cell_type {
            Some("b") => Some(CellValue::Boolean(
                v == "1" || v.eq_ignore_ascii_case("true"),
            )),
            Some("e") => Some(CellValue::Error(v.to_string())),
            Some("s") => {
                let idx: usize = v.parse().ok()?;
                shared_strings.get(idx).map(|s| CellValue::String(s.clone()))
            }
            Some("str") | Some("inlineStr") => Some(CellValue::string(v)),
            None | Some("n") => v.parse::<f64>().ok().map(CellValue::Number),
            Some(_) => Some(CellValue::string(v)),
        });

        if let Some(cell_value) = cell_value {
            grid.set_value_at(row, col, cell_value)?;
        }

        if let Some(idx) = style_idx {
            if idx > 0 {
                if let Some(style) = styles.get(idx as usize) {
                    if *style != Style::default() {
                        grid.set_style_at(row, col, style)?;
                    }
                }
            }
        }

        Ok(())
    }
}
