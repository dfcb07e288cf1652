//! XLSX writer

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::XlsxStyleTable;
use shaper_core::cell::cell_ref;
use shaper_core::{CellValue, Document, Grid};

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a document to a file path
    pub fn write_file<P: AsRef<Path>>(document: &Document, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(document, file)
    }

    /// Write a document to a writer
    pub fn write<W: Write + Seek>(document: &Document, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);

        // Build a document-wide style table.
        let style_table = XlsxStyleTable::build(document);

        // Write [Content_Types].xml
        Self::write_content_types(&mut zip, document)?;

        // Write _rels/.rels
        Self::write_root_rels(&mut zip)?;

        // Write xl/workbook.xml
        Self::write_workbook_xml(&mut zip, document)?;

        // Write xl/_rels/workbook.xml.rels
        Self::write_workbook_rels(&mut zip, document)?;

        // Write xl/styles.xml
        Self::write_styles_xml(&mut zip, &style_table)?;

        // Write sheets
        for i in 0..document.sheet_count() {
            Self::write_sheet(&mut zip, document, i, &style_table)?;
        }

        zip.finish()?;
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        document: &Document,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        // Add an override for each sheet
        for i in 0..document.sheet_count() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        content.push_str("\n</Types>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        document: &Document,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/workbook.xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>"#,
        );

        for (i, grid) in document.grids().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                Self::escape_xml(grid.name()),
                i + 1,
                i + 1
            ));
        }

        content.push_str(
            r#"
    </sheets>
</workbook>"#,
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_rels<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        document: &Document,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for i in 0..document.sheet_count() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }

        // Styles relationship
        let styles_rid = document.sheet_count() + 1;
        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            styles_rid
        ));

        content.push_str(
            r#"
 </Relationships>"#,
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_styles_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        style_table: &XlsxStyleTable,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/styles.xml", options)?;
        let xml = style_table.to_styles_xml();
        zip.write_all(xml.as_bytes())?;
        Ok(())
    }

    fn write_sheet<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        document: &Document,
        index: usize,
        style_table: &XlsxStyleTable,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options)?;

        let grid = document
            .grid(index)
            .ok_or_else(|| XlsxError::InvalidFormat("Sheet not found".into()))?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        Self::write_sheet_views(&mut content, grid);
        Self::write_cols(&mut content, grid);
        Self::write_sheet_data(&mut content, grid, index, style_table);

        // Write merged cells (if any)
        let merged_regions = grid.merged_regions();
        if !merged_regions.is_empty() {
            content.push_str(&format!(
                "\n    <mergeCells count=\"{}\">",
                merged_regions.len()
            ));
            for range in merged_regions {
                content.push_str(&format!("\n        <mergeCell ref=\"{}\"/>", range));
            }
            content.push_str("\n    </mergeCells>");
        }

        content.push_str("\n</worksheet>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write the sheetViews element carrying the freeze boundary (if any)
    fn write_sheet_views(content: &mut String, grid: &Grid) {
        let freeze = match grid.freeze_boundary() {
            Some(f) => f,
            None => return,
        };

        let mut pane = String::from("<pane");
        if freeze.col > 0 {
            pane.push_str(&format!(" xSplit=\"{}\"", freeze.col));
        }
        if freeze.row > 0 {
            pane.push_str(&format!(" ySplit=\"{}\"", freeze.row));
        }
        pane.push_str(&format!(
            " topLeftCell=\"{}\"",
            cell_ref(freeze.row, freeze.col)
        ));
        let active = match (freeze.col > 0, freeze.row > 0) {
            (true, true) => "bottomRight",
            (true, false) => "topRight",
            _ => "bottomLeft",
        };
        pane.push_str(&format!(" activePane=\"{}\" state=\"frozen\"/>", active));

        content.push_str(&format!(
            "\n    <sheetViews>\n        <sheetView workbookViewId=\"0\">{}</sheetView>\n    </sheetViews>",
            pane
        ));
    }

    /// Write the cols element for custom widths and hidden columns
    fn write_cols(content: &mut String, grid: &Grid) {
        let mut cols: BTreeSet<u16> = BTreeSet::new();
        cols.extend(grid.custom_column_widths().keys().copied());
        cols.extend(grid.hidden_columns().keys().copied());
        if cols.is_empty() {
            return;
        }

        content.push_str("\n    <cols>");
        for col in cols {
            // min/max are 1-based in XLSX
            let mut attrs = format!(" min=\"{}\" max=\"{}\"", col + 1, col + 1);
            if let Some(w) = grid.custom_column_widths().get(&col) {
                attrs.push_str(&format!(" width=\"{}\" customWidth=\"1\"", w));
            }
            if grid.is_column_hidden(col) {
                attrs.push_str(" hidden=\"1\"");
            }
            content.push_str(&format!("\n        <col{}/>", attrs));
        }
        content.push_str("\n    </cols>");
    }

    fn write_sheet_data(
        content: &mut String,
        grid: &Grid,
        sheet_index: usize,
        style_table: &XlsxStyleTable,
    ) {
        content.push_str("\n    <sheetData>");

        // Group cells by row, then union in rows that only carry dimension
        // state (a hidden row may have no cells at all).
        let mut row_cells: BTreeMap<u32, Vec<(u16, &shaper_core::CellData)>> = BTreeMap::new();
        for (row, col, cell) in grid.iter_cells() {
            row_cells.entry(row).or_default().push((col, cell));
        }

        let mut rows: BTreeSet<u32> = BTreeSet::new();
        rows.extend(row_cells.keys().copied());
        rows.extend(grid.custom_row_heights().keys().copied());
        rows.extend(grid.hidden_rows().keys().copied());

        for row in rows {
            let mut attrs = format!(" r=\"{}\"", row + 1);
            if let Some(h) = grid.custom_row_heights().get(&row) {
                attrs.push_str(&format!(" ht=\"{}\" customHeight=\"1\"", h));
            }
            if grid.is_row_hidden(row) {
                attrs.push_str(" hidden=\"1\"");
            }

            let cells = match row_cells.get(&row) {
                Some(cells) => cells,
                None => {
                    content.push_str(&format!("\n        <row{}/>", attrs));
                    continue;
                }
            };

            content.push_str(&format!("\n        <row{}>", attrs));
            for (col, cell) in cells {
                let reference = cell_ref(row, *col);

                let xf_id = style_table.xf_id_for(sheet_index, cell.style_index);
                let style_attr = if xf_id != 0 {
                    format!(" s=\"{}\"", xf_id)
                } else {
                    String::new()
                };

                match &cell.value {
                    CellValue::Number(n) => {
                        content.push_str(&format!(
                            "\n            <c r=\"{}\"{}><v>{}</v></c>",
                            reference, style_attr, n
                        ));
                    }
                    CellValue::String(s) => {
                        content.push_str(&format!(
                            "\n            <c r=\"{}\"{} t=\"inlineStr\"><is><t>{}</t></is></c>",
                            reference,
                            style_attr,
                            Self::escape_xml(s)
                        ));
                    }
                    CellValue::Boolean(b) => {
                        content.push_str(&format!(
                            "\n            <c r=\"{}\"{} t=\"b\"><v>{}</v></c>",
                            reference,
                            style_attr,
                            if *b { 1 } else { 0 }
                        ));
                    }
                    CellValue::Error(e) => {
                        content.push_str(&format!(
                            "\n            <c r=\"{}\"{} t=\"e\"><v>{}</v></c>",
                            reference,
                            style_attr,
                            Self::escape_xml(e)
                        ));
                    }
                    CellValue::Empty => {
                        // Preserve style-only cells
                        if xf_id != 0 {
                            content.push_str(&format!(
                                "\n            <c r=\"{}\"{} />",
                                reference, style_attr
                            ));
                        }
                    }
                }
            }
            content.push_str("\n        </row>");
        }

        content.push_str("\n    </sheetData>");
    }

    fn escape_xml(s: &str) -> String {
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;")
    }
}
