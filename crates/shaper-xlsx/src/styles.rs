//! XLSX styles (styles.xml) read/write helpers

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use shaper_core::style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, NumberFormat, Style, VerticalAlignment,
};
use shaper_core::Document;

// === Writing ===

#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    /// Global, deduplicated styles. Index corresponds to the cellXfs index (xfId).
    styles: Vec<Style>,
    /// Per-grid mapping: local style-pool index -> global xfId.
    sheet_maps: Vec<HashMap<u32, u32>>,
}

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    num_fmt_id: u32,
}

impl XlsxStyleTable {
    pub(crate) fn build(document: &Document) -> Self {
        let mut styles: Vec<Style> = Vec::new();
        let mut style_to_xf: HashMap<Style, u32> = HashMap::new();

        // Index 0 is always default style
        let default = Style::default();
        styles.push(default.clone());
        style_to_xf.insert(default, 0);

        let mut sheet_maps: Vec<HashMap<u32, u32>> = Vec::with_capacity(document.sheet_count());

        for grid in document.grids() {
            let mut map: HashMap<u32, u32> = HashMap::new();
            map.insert(0, 0);

            for (_row, _col, cell) in grid.iter_cells() {
                let local_idx = cell.style_index;
                if local_idx == 0 || map.contains_key(&local_idx) {
                    continue;
                }

                let style = grid
                    .style_by_index(local_idx)
                    .cloned()
                    .unwrap_or_else(Style::default);

                let xf_id = match style_to_xf.get(&style) {
                    Some(&id) => id,
                    None => {
                        let id = styles.len() as u32;
                        styles.push(style.clone());
                        style_to_xf.insert(style, id);
                        id
                    }
                };

                map.insert(local_idx, xf_id);
            }

            sheet_maps.push(map);
        }

        Self { styles, sheet_maps }
    }

    pub(crate) fn xf_id_for(&self, sheet_index: usize, local_style_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|m| m.get(&local_style_index).copied())
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        // Build component tables
        let mut font_ids: HashMap<FontStyle, u32> = HashMap::new();
        let mut fonts: Vec<FontStyle> = Vec::new();

        let default_font = FontStyle::default();
        fonts.push(default_font.clone());
        font_ids.insert(default_font, 0);

        let mut fill_ids: HashMap<FillStyle, u32> = HashMap::new();
        let mut fills: Vec<FillStyle> = Vec::new();
        // Excel requires the first two fills to be: none and gray125. Gray125
        // is not representable in the model, so slot 1 is written literally.
        fills.push(FillStyle::None); // id 0
        fill_ids.insert(FillStyle::None, 0);

        let mut border_ids: HashMap<BorderStyle, u32> = HashMap::new();
        let mut borders: Vec<BorderStyle> = Vec::new();
        let default_border = BorderStyle::default();
        borders.push(default_border.clone());
        border_ids.insert(default_border, 0);

        // Custom number formats
        let mut numfmt_ids: HashMap<String, u32> = HashMap::new();
        let mut numfmts: Vec<(u32, String)> = Vec::new();
        let mut next_numfmt_id: u32 = 164;

        // Resolve component IDs for each style
        let mut resolved: Vec<ResolvedXfIds> = Vec::with_capacity(self.styles.len());

        for style in &self.styles {
            // Font
            let font_id = match font_ids.get(&style.font) {
                Some(&id) => id,
                None => {
                    let id = fonts.len() as u32;
                    fonts.push(style.font.clone());
                    font_ids.insert(style.font.clone(), id);
                    id
                }
            };

            // Fill
            let fill_id = match style.fill {
                FillStyle::None => 0,
                other => {
                    if let Some(&id) = fill_ids.get(&other) {
                        id
                    } else {
                        // +1 accounts for the literal gray125 fill at slot 1
                        let id = fills.len() as u32 + 1;
                        fills.push(other);
                        fill_ids.insert(other, id);
                        id
                    }
                }
            };

            // Border
            let border_id = match border_ids.get(&style.border) {
                Some(&id) => id,
                None => {
                    let id = borders.len() as u32;
                    borders.push(style.border.clone());
                    border_ids.insert(style.border.clone(), id);
                    id
                }
            };

            // Number format
            let num_fmt_id = match &style.number_format {
                NumberFormat::General => 0,
                NumberFormat::BuiltIn(id) => *id as u32,
                NumberFormat::Custom(code) => {
                    if let Some(&id) = numfmt_ids.get(code) {
                        id
                    } else {
                        let id = next_numfmt_id;
                        next_numfmt_id += 1;
                        numfmt_ids.insert(code.clone(), id);
                        numfmts.push((id, code.clone()));
                        id
                    }
                }
            };

            resolved.push(ResolvedXfIds {
                font_id,
                fill_id,
                border_id,
                num_fmt_id,
            });
        }

        // Write XML
        let mut xml = String::new();
        xml.push_str(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !numfmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", numfmts.len()));
            for (id, code) in &numfmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml_attr(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        // Fonts
        xml.push_str(&format!("\n  <fonts count=\"{}\">", fonts.len()));
        for font in &fonts {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        // Fills (slot 1 is the mandatory gray125 pattern)
        xml.push_str(&format!("\n  <fills count=\"{}\">", fills.len() + 1));
        xml.push_str("\n    ");
        xml.push_str(&write_fill(&FillStyle::None));
        xml.push_str("\n    <fill><patternFill patternType=\"gray125\"/></fill>");
        for fill in fills.iter().skip(1) {
            xml.push_str("\n    ");
            xml.push_str(&write_fill(fill));
        }
        xml.push_str("\n  </fills>");

        // Borders
        xml.push_str(&format!("\n  <borders count=\"{}\">", borders.len()));
        for border in &borders {
            xml.push_str("\n    ");
            xml.push_str(&write_border(border));
        }
        xml.push_str("\n  </borders>");

        // cellStyleXfs (required)
        xml.push_str(
            r#"
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        // cellXfs
        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.styles.len()));
        for (i, ids) in resolved.iter().enumerate() {
            let style = &self.styles[i];
            xml.push_str("\n    ");
            xml.push_str(&write_xf(style, *ids));
        }
        xml.push_str("\n  </cellXfs>");

        // cellStyles (required)
        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>"#,
        );

        xml.push_str("\n</styleSheet>");
        xml
    }
}

fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn write_color(tag: &str, color: &Color) -> String {
    match color {
        Color::Auto => format!("<{tag} indexed=\"64\"/>"),
        Color::Rgb { r, g, b } => format!("<{tag} rgb=\"FF{:02X}{:02X}{:02X}\"/>", r, g, b),
        Color::Argb { a, r, g, b } => {
            format!("<{tag} rgb=\"{:02X}{:02X}{:02X}{:02X}\"/>", a, r, g, b)
        }
        Color::Indexed(i) => format!("<{tag} indexed=\"{}\"/>", i),
        Color::Theme { index, tint } => {
            let tint_f = (*tint as f64) / 100.0;
            if *tint == 0 {
                format!("<{tag} theme=\"{}\"/>", index)
            } else {
                format!("<{tag} theme=\"{}\" tint=\"{}\"/>", index, tint_f)
            }
        }
    }
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.underline {
        s.push_str("<u/>");
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));

    if !matches!(font.color, Color::Auto) {
        s.push_str(&write_color("color", &font.color));
    }

    s.push_str(&format!("<name val=\"{}\"/>", escape_xml_attr(&font.name)));
    s.push_str("</font>");
    s
}

fn write_fill(fill: &FillStyle) -> String {
    match fill {
        FillStyle::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillStyle::Solid { color } => {
            format!(
                "<fill><patternFill patternType=\"solid\">{}<bgColor indexed=\"64\"/></patternFill></fill>",
                write_color("fgColor", color)
            )
        }
    }
}

fn border_style_to_str(s: BorderLineStyle) -> &'static str {
    match s {
        BorderLineStyle::Thin => "thin",
        BorderLineStyle::Medium => "medium",
        BorderLineStyle::Thick => "thick",
        BorderLineStyle::Dashed => "dashed",
        BorderLineStyle::Dotted => "dotted",
        BorderLineStyle::Double => "double",
        BorderLineStyle::Hair => "hair",
    }
}

fn str_to_border_style(s: &str) -> Option<BorderLineStyle> {
    match s {
        "thin" => Some(BorderLineStyle::Thin),
        "medium" => Some(BorderLineStyle::Medium),
        "thick" => Some(BorderLineStyle::Thick),
        "dashed" => Some(BorderLineStyle::Dashed),
        "dotted" => Some(BorderLineStyle::Dotted),
        "double" => Some(BorderLineStyle::Double),
        "hair" => Some(BorderLineStyle::Hair),
        // Exotic dash variants collapse to plain dashed
        "mediumDashed" | "dashDot" | "mediumDashDot" | "dashDotDot" | "mediumDashDotDot"
        | "slantDashDot" => Some(BorderLineStyle::Dashed),
        _ => None,
    }
}

fn write_border_edge(tag: &str, edge: &Option<BorderEdge>) -> String {
    match edge {
        None => format!("<{tag}/>"),
        Some(e) => {
            let mut s = format!("<{tag} style=\"{}\">", border_style_to_str(e.style));
            s.push_str(&write_color("color", &e.color));
            s.push_str(&format!("</{tag}>"));
            s
        }
    }
}

fn write_border(border: &BorderStyle) -> String {
    let mut s = String::from("<border>");
    s.push_str(&write_border_edge("left", &border.left));
    s.push_str(&write_border_edge("right", &border.right));
    s.push_str(&write_border_edge("top", &border.top));
    s.push_str(&write_border_edge("bottom", &border.bottom));
    s.push_str("<diagonal/>");
    s.push_str("</border>");
    s
}

fn horiz_to_str(h: HorizontalAlignment) -> &'static str {
    match h {
        HorizontalAlignment::General => "general",
        HorizontalAlignment::Left => "left",
        HorizontalAlignment::Center => "center",
        HorizontalAlignment::Right => "right",
        HorizontalAlignment::Justify => "justify",
    }
}

fn str_to_horizontal(s: &str) -> Option<HorizontalAlignment> {
    match s {
        "general" => Some(HorizontalAlignment::General),
        "left" => Some(HorizontalAlignment::Left),
        "center" | "centerContinuous" => Some(HorizontalAlignment::Center),
        "right" => Some(HorizontalAlignment::Right),
        "justify" | "distributed" => Some(HorizontalAlignment::Justify),
        _ => None,
    }
}

fn vert_to_str(v: VerticalAlignment) -> &'static str {
    match v {
        VerticalAlignment::Top => "top",
        VerticalAlignment::Center => "center",
        VerticalAlignment::Bottom => "bottom",
        VerticalAlignment::Justify => "justify",
    }
}

fn str_to_vertical(s: &str) -> Option<VerticalAlignment> {
    match s {
        "top" => Some(VerticalAlignment::Top),
        "center" => Some(VerticalAlignment::Center),
        "bottom" => Some(VerticalAlignment::Bottom),
        "justify" | "distributed" => Some(VerticalAlignment::Justify),
        _ => None,
    }
}

fn write_alignment(al: &Alignment) -> String {
    // Only write if any non-default property is set
    let default = Alignment::default();
    if al == &default {
        return String::new();
    }

    let mut s = String::from("<alignment");
    if al.horizontal != default.horizontal {
        s.push_str(&format!(" horizontal=\"{}\"", horiz_to_str(al.horizontal)));
    }
    if al.vertical != default.vertical {
        s.push_str(&format!(" vertical=\"{}\"", vert_to_str(al.vertical)));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    if al.shrink_to_fit {
        s.push_str(" shrinkToFit=\"1\"");
    }
    if al.indent != 0 {
        s.push_str(&format!(" indent=\"{}\"", al.indent));
    }
    s.push_str("/>");
    s
}

fn write_xf(style: &Style, ids: ResolvedXfIds) -> String {
    // apply flags
    let mut attrs = String::new();
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if style.font != FontStyle::default() {
        attrs.push_str(" applyFont=\"1\"");
    }
    if style.fill != FillStyle::None {
        attrs.push_str(" applyFill=\"1\"");
    }
    if style.border != BorderStyle::default() {
        attrs.push_str(" applyBorder=\"1\"");
    }
    if style.alignment != Alignment::default() {
        attrs.push_str(" applyAlignment=\"1\"");
    }

    let mut s = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"{}",
        ids.num_fmt_id, ids.font_id, ids.fill_id, ids.border_id, attrs
    );

    let alignment_xml = write_alignment(&style.alignment);
    if alignment_xml.is_empty() {
        s.push_str("/>");
        return s;
    }

    s.push('>');
    s.push_str(&alignment_xml);
    s.push_str("</xf>");
    s
}

// === Reading ===

pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut numfmts: HashMap<u32, String> = HashMap::new();
    let mut fonts: Vec<FontStyle> = Vec::new();
    let mut fills: Vec<FillStyle> = Vec::new();
    let mut borders: Vec<BorderStyle> = Vec::new();
    let mut cell_xfs: Vec<Style> = Vec::new();

    // Current objects while parsing
    let mut current_font: Option<FontStyle> = None;
    let mut in_fill = false;
    let mut current_fill_solid = false;
    let mut current_fill_fg: Color = Color::Auto;

    let mut current_border: Option<BorderStyle> = None;
    let mut current_border_edge: Option<&'static str> = None;

    // Current xf: component ids + alignment
    let mut current_xf: Option<(u32, u32, u32, u32, Alignment)> = None;
    let mut in_cell_xfs = false;

    // DXF styles (conditional formatting) contain font/fill/border elements
    // that must not leak into the component tables.
    let mut in_dxfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(_)) | Ok(Event::Empty(_)) if in_dxfs => {}
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"cellXfs" => {
                    in_cell_xfs = true;
                }
                b"dxfs" => {
                    in_dxfs = true;
                }
                b"font" => {
                    current_font = Some(FontStyle::default());
                }
                b"fill" => {
                    in_fill = true;
                    current_fill_solid = false;
                    current_fill_fg = Color::Auto;
                }
                b"patternFill" if in_fill => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"patternType" {
                            if let Ok(v) = attr.unescape_value() {
                                current_fill_solid = v.as_ref() == "solid";
                            }
                        }
                    }
                }
                b"border" => {
                    current_border = Some(BorderStyle::default());
                }
                b"left" | b"right" | b"top" | b"bottom" => {
                    if let Some(border) = current_border.as_mut() {
                        let edge_name = match e.name().as_ref() {
                            b"left" => "left",
                            b"right" => "right",
                            b"top" => "top",
                            _ => "bottom",
                        };
                        current_border_edge = Some(edge_name);
                        apply_border_edge_attrs(border, edge_name, &e);
                    }
                }
                b"xf" if in_cell_xfs => {
                    current_xf = Some(parse_xf_attrs(&e));
                }
                b"alignment" => {
                    if let Some((_n, _f, _fi, _b, align)) = current_xf.as_mut() {
                        apply_alignment_attrs(align, &e);
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"numFmt" => {
                    let mut id: Option<u32> = None;
                    let mut code: Option<String> = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"numFmtId" => {
                                id = attr.unescape_value().ok().and_then(|s| s.parse().ok());
                            }
                            b"formatCode" => {
                                code = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(code)) = (id, code) {
                        numfmts.insert(id, code);
                    }
                }
                b"dxfs" => {}
                b"font" => {
                    fonts.push(FontStyle::default());
                }
                b"border" => {
                    borders.push(BorderStyle::default());
                }
                b"sz" => {
                    if let Some(font) = current_font.as_mut() {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"val" {
                                if let Ok(v) = attr.unescape_value() {
                                    font.size = v.parse::<f64>().unwrap_or(font.size);
                                }
                            }
                        }
                    }
                }
                b"name" => {
                    if let Some(font) = current_font.as_mut() {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"val" {
                                if let Ok(v) = attr.unescape_value() {
                                    font.name = v.to_string();
                                }
                            }
                        }
                    }
                }
                b"b" => {
                    if let Some(font) = current_font.as_mut() {
                        font.bold = true;
                    }
                }
                b"i" => {
                    if let Some(font) = current_font.as_mut() {
                        font.italic = true;
                    }
                }
                b"u" => {
                    if let Some(font) = current_font.as_mut() {
                        font.underline = true;
                    }
                }
                b"color" => {
                    let color = parse_color_attrs(&e);
                    if let (Some(border), Some(edge_name)) =
                        (current_border.as_mut(), current_border_edge)
                    {
                        set_border_edge_color(border, edge_name, color);
                    } else if let Some(font) = current_font.as_mut() {
                        font.color = color;
                    }
                }
                b"fgColor" if in_fill => {
                    current_fill_fg = parse_color_attrs(&e);
                }
                b"left" | b"right" | b"top" | b"bottom" => {
                    if let Some(border) = current_border.as_mut() {
                        let edge_name = match e.name().as_ref() {
                            b"left" => "left",
                            b"right" => "right",
                            b"top" => "top",
                            _ => "bottom",
                        };
                        apply_border_edge_attrs(border, edge_name, &e);
                    }
                }
                b"xf" if in_cell_xfs => {
                    let (num_fmt_id, font_id, fill_id, border_id, align) = parse_xf_attrs(&e);
                    cell_xfs.push(compose_style(
                        &numfmts, &fonts, &fills, &borders, num_fmt_id, font_id, fill_id,
                        border_id, align,
                    ));
                }
                b"alignment" => {
                    if let Some((_n, _f, _fi, _b, align)) = current_xf.as_mut() {
                        apply_alignment_attrs(align, &e);
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"cellXfs" => {
                    in_cell_xfs = false;
                }
                b"dxfs" => {
                    in_dxfs = false;
                }
                b"font" => {
                    if let Some(font) = current_font.take() {
                        fonts.push(font);
                    }
                }
                b"fill" => {
                    if in_fill {
                        if current_fill_solid {
                            fills.push(FillStyle::Solid {
                                color: current_fill_fg,
                            });
                        } else {
                            fills.push(FillStyle::None);
                        }
                        in_fill = false;
                    }
                }
                b"left" | b"right" | b"top" | b"bottom" => {
                    current_border_edge = None;
                }
                b"border" => {
                    if let Some(border) = current_border.take() {
                        borders.push(border);
                    }
                    current_border_edge = None;
                }
                b"xf" => {
                    if in_cell_xfs {
                        if let Some((num_fmt_id, font_id, fill_id, border_id, align)) =
                            current_xf.take()
                        {
                            cell_xfs.push(compose_style(
                                &numfmts, &fonts, &fills, &borders, num_fmt_id, font_id,
                                fill_id, border_id, align,
                            ));
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if cell_xfs.is_empty() {
        cell_xfs.push(Style::default());
    }

    Ok(cell_xfs)
}

fn parse_xf_attrs(e: &BytesStart) -> (u32, u32, u32, u32, Alignment) {
    let mut num_fmt_id = 0u32;
    let mut font_id = 0u32;
    let mut fill_id = 0u32;
    let mut border_id = 0u32;
    for attr in e.attributes().flatten() {
        let val = match attr.unescape_value() {
            Ok(v) => v,
            Err(_) => continue,
        };
        match attr.key.as_ref() {
            b"numFmtId" => num_fmt_id = val.parse().unwrap_or(0),
            b"fontId" => font_id = val.parse().unwrap_or(0),
            b"fillId" => fill_id = val.parse().unwrap_or(0),
            b"borderId" => border_id = val.parse().unwrap_or(0),
            _ => {}
        }
    }
    (num_fmt_id, font_id, fill_id, border_id, Alignment::default())
}

fn apply_alignment_attrs(align: &mut Alignment, e: &BytesStart) {
    for attr in e.attributes().flatten() {
        let val = match attr.unescape_value() {
            Ok(v) => v,
            Err(_) => continue,
        };
        match attr.key.as_ref() {
            b"horizontal" => {
                if let Some(h) = str_to_horizontal(&val) {
                    align.horizontal = h;
                }
            }
            b"vertical" => {
                if let Some(v) = str_to_vertical(&val) {
                    align.vertical = v;
                }
            }
            b"wrapText" => {
                align.wrap_text = val.as_ref() == "1" || val.as_ref() == "true";
            }
            b"shrinkToFit" => {
                align.shrink_to_fit = val.as_ref() == "1" || val.as_ref() == "true";
            }
            b"indent" => {
                align.indent = val.parse::<u8>().unwrap_or(0);
            }
            _ => {}
        }
    }
}

fn apply_border_edge_attrs(border: &mut BorderStyle, edge_name: &str, e: &BytesStart) {
    let mut style: Option<BorderLineStyle> = None;
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"style" {
            if let Ok(v) = attr.unescape_value() {
                style = str_to_border_style(&v);
            }
        }
    }
    // Color may be overwritten by a nested <color> element
    if let Some(st) = style {
        let edge = Some(BorderEdge {
            style: st,
            color: Color::Auto,
        });
        match edge_name {
            "left" => border.left = edge,
            "right" => border.right = edge,
            "top" => border.top = edge,
            _ => border.bottom = edge,
        }
    }
}

fn set_border_edge_color(border: &mut BorderStyle, edge_name: &str, color: Color) {
    let slot = match edge_name {
        "left" => &mut border.left,
        "right" => &mut border.right,
        "top" => &mut border.top,
        _ => &mut border.bottom,
    };
    if let Some(edge) = slot.as_mut() {
        edge.color = color;
    }
}

fn parse_color_attrs(e: &BytesStart) -> Color {
    let mut theme: Option<u8> = None;
    let mut tint: i16 = 0;

    for attr in e.attributes().flatten() {
        let val = match attr.unescape_value() {
            Ok(v) => v,
            Err(_) => continue,
        };
        match attr.key.as_ref() {
            b"rgb" => {
                if let Some(color) = Color::from_hex(&val) {
                    return color;
                }
            }
            b"indexed" => {
                if let Ok(i) = val.parse::<u8>() {
                    if i == 64 {
                        return Color::Auto;
                    }
                    return Color::Indexed(i);
                }
            }
            b"theme" => {
                theme = val.parse::<u8>().ok();
            }
            b"tint" => {
                tint = val
                    .parse::<f64>()
                    .map(|t| (t * 100.0).round() as i16)
                    .unwrap_or(0);
            }
            b"auto" => return Color::Auto,
            _ => {}
        }
    }

    match theme {
        Some(index) => Color::Theme { index, tint },
        None => Color::Auto,
    }
}

#[allow(clippy::too_many_arguments)]
fn compose_style(
    numfmts: &HashMap<u32, String>,
    fonts: &[FontStyle],
    fills: &[FillStyle],
    borders: &[BorderStyle],
    num_fmt_id: u32,
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    alignment: Alignment,
) -> Style {
    let mut style = Style::default();

    style.number_format = match num_fmt_id {
        0 => NumberFormat::General,
        id if id < 164 => NumberFormat::BuiltIn(id as u16),
        id => match numfmts.get(&id) {
            Some(code) => NumberFormat::Custom(code.clone()),
            None => NumberFormat::General,
        },
    };

    if let Some(font) = fonts.get(font_id as usize) {
        style.font = font.clone();
    }
    if let Some(fill) = fills.get(fill_id as usize) {
        style.fill = *fill;
    }
    if let Some(border) = borders.get(border_id as usize) {
        style.border = border.clone();
    }
    style.alignment = alignment;

    style
}
