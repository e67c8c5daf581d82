//! Writes a [`ChecklistDocument`] as an Office Open XML workbook.
//!
//! The workbook has a single sheet. Text is stored as inline strings, so no
//! shared-string table is needed. Thumbnails go into `xl/media/` and are
//! placed with one-cell anchors in the preview column. Image bytes are read
//! from the store one at a time while the archive is written.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::{ExtendedFileOptions, FileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::checklist::{ChecklistDocument, ChecklistEntry, PreviewCell, StoredImage, PREVIEW_MISSING};
use crate::error::Result;

/// Worksheet title.
pub const SHEET_NAME: &str = "STL Checklist";

/// Column header captions.
pub const COLUMN_HEADERS: [&str; 4] = ["Filename", "Preview", "Checked and Available", "Not Needed"];

/// Column widths in character units.
pub const COLUMN_WIDTHS: [f64; 4] = [30.0, 30.0, 20.0, 15.0];

/// Displayed thumbnail edge length in pixels.
pub const IMAGE_DISPLAY_PX: u32 = 200;

const EMU_PER_PIXEL: u64 = 9525;
const PREVIEW_COLUMN: u32 = 1;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_DRAWING: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing";

/// Cell format index into the stylesheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellStyle {
    /// Default font.
    Normal,
    /// Bold.
    Bold,
    /// Bold red.
    Warning,
}

impl CellStyle {
    fn xf_index(self) -> u32 {
        match self {
            CellStyle::Normal => 0,
            CellStyle::Bold => 1,
            CellStyle::Warning => 2,
        }
    }
}

/// Content of one cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellValue<'a> {
    /// Inline string.
    Text(Cow<'a, str>),
    /// Boolean, written for the review columns once a row has a verdict
    /// ([`crate::checklist::ChecklistRow::reviewed`], [`crate::checklist::ChecklistRow::not_needed`]).
    Bool(bool),
}

/// A worksheet row ready to be serialised.
#[derive(Clone, Debug)]
pub struct SheetRow<'a> {
    /// `(column index, value)` pairs, 0-based columns.
    pub cells: Vec<(u32, CellValue<'a>)>,
    /// Format applied to every cell in the row.
    pub style: CellStyle,
    /// Custom row height in points.
    pub height: Option<f64>,
    /// Thumbnail anchored in the preview column.
    pub image: Option<&'a StoredImage>,
}

impl<'a> SheetRow<'a> {
    fn empty() -> Self {
        Self {
            cells: Vec::new(),
            style: CellStyle::Normal,
            height: None,
            image: None,
        }
    }

    fn text(value: impl Into<Cow<'a, str>>, style: CellStyle) -> Self {
        Self {
            cells: vec![(0, CellValue::Text(value.into()))],
            style,
            ..Self::empty()
        }
    }

    /// Text of the cell in `column`, if it holds a string.
    pub fn text_at(&self, column: u32) -> Option<&str> {
        self.cells.iter().find_map(|(c, v)| match v {
            CellValue::Text(t) if *c == column => Some(t.as_ref()),
            _ => None,
        })
    }
}

/// Lays the document out as worksheet rows, top to bottom.
///
/// # Examples
/// ```
/// use printcheck::checklist::{ChecklistDocument, MissingPreviewRecord};
/// use printcheck::xlsx::layout;
///
/// let mut doc = ChecklistDocument::default();
/// doc.insert_banner(&[MissingPreviewRecord::new("A", "p2.stl")]);
///
/// let rows = layout(&doc);
/// assert_eq!(rows[1].text_at(0), Some("A/p2.stl"));
/// assert_eq!(rows[2].text_at(0), Some("Filename"));
/// ```
pub fn layout(doc: &ChecklistDocument) -> Vec<SheetRow<'_>> {
    let mut rows = Vec::new();

    if let Some(banner) = &doc.banner {
        rows.push(SheetRow::text(banner.message.as_str(), CellStyle::Warning));
        for record in &banner.records {
            rows.push(SheetRow::text(record.to_string(), CellStyle::Normal));
        }
    }

    rows.push(SheetRow {
        cells: COLUMN_HEADERS
            .iter()
            .zip(0..)
            .map(|(caption, col)| (col, CellValue::Text(Cow::Borrowed(*caption))))
            .collect(),
        style: CellStyle::Bold,
        ..SheetRow::empty()
    });

    for entry in &doc.entries {
        match entry {
            ChecklistEntry::Spacer => rows.push(SheetRow::empty()),
            ChecklistEntry::FolderHeader(folder) => {
                let shown = if folder.is_empty() { "." } else { folder.as_str() };
                rows.push(SheetRow::text(format!("Folder: {}", shown), CellStyle::Bold));
            }
            ChecklistEntry::Row(row) => {
                let mut sheet_row = SheetRow::text(row.filename.as_str(), CellStyle::Normal);
                sheet_row.height = Some(row.height_hint());
                match &row.preview {
                    PreviewCell::Image(image) => sheet_row.image = Some(image),
                    PreviewCell::Missing => sheet_row
                        .cells
                        .push((PREVIEW_COLUMN, CellValue::Text(Cow::Borrowed(PREVIEW_MISSING)))),
                }
                if let Some(reviewed) = row.reviewed {
                    sheet_row.cells.push((2, CellValue::Bool(reviewed)));
                }
                if let Some(not_needed) = row.not_needed {
                    sheet_row.cells.push((3, CellValue::Bool(not_needed)));
                }
                rows.push(sheet_row);
            }
        }
    }

    rows
}

/// Writes the workbook to `path`, replacing any existing file.
pub fn write_workbook(doc: &ChecklistDocument, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut out = write_workbook_to(doc, BufWriter::new(file))?;
    out.flush()?;
    log::info!("Checklist saved to {}", path.display());
    Ok(())
}

/// Writes the workbook into `writer` and hands it back.
pub fn write_workbook_to<W: Write + Seek>(doc: &ChecklistDocument, writer: W) -> Result<W> {
    let rows = layout(doc);
    let anchors: Vec<(u32, &StoredImage)> = rows
        .iter()
        .zip(0..)
        .filter_map(|(row, index)| row.image.map(|image| (index, image)))
        .collect();
    let has_drawing = !anchors.is_empty();

    let mut zip = ZipWriter::new(writer);
    let options: FileOptions<ExtendedFileOptions> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options.clone())?;
    zip.write_all(content_types_xml(has_drawing).as_bytes())?;

    zip.start_file("_rels/.rels", options.clone())?;
    zip.write_all(ROOT_RELS.as_bytes())?;

    zip.start_file("xl/workbook.xml", options.clone())?;
    zip.write_all(workbook_xml().as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options.clone())?;
    zip.write_all(WORKBOOK_RELS.as_bytes())?;

    zip.start_file("xl/styles.xml", options.clone())?;
    zip.write_all(STYLES.as_bytes())?;

    zip.start_file("xl/worksheets/sheet1.xml", options.clone())?;
    zip.write_all(&sheet_xml(&rows, has_drawing)?)?;

    if has_drawing {
        zip.start_file("xl/worksheets/_rels/sheet1.xml.rels", options.clone())?;
        zip.write_all(sheet_rels_xml().as_bytes())?;

        zip.start_file("xl/drawings/drawing1.xml", options.clone())?;
        zip.write_all(&drawing_xml(&anchors)?)?;

        zip.start_file("xl/drawings/_rels/drawing1.xml.rels", options.clone())?;
        zip.write_all(&drawing_rels_xml(anchors.len())?)?;

        for (n, (_, image)) in anchors.iter().enumerate() {
            let bytes = image.bytes()?;
            zip.start_file(format!("xl/media/image{}.png", n + 1), options.clone())?;
            zip.write_all(&bytes)?;
        }
    }

    Ok(zip.finish()?)
}

/// `A1`-style reference for a 0-based column and row.
fn cell_ref(column: u32, row: u32) -> String {
    let letter = char::from(b'A' + column as u8);
    format!("{}{}", letter, row + 1)
}

fn xml_writer() -> Result<Writer<Cursor<Vec<u8>>>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(writer)
}

/// Replaces characters XML 1.0 cannot carry, even escaped, with U+FFFD.
fn xml_safe(text: &str) -> Cow<'_, str> {
    let allowed = |c: char| {
        matches!(c, '\t' | '\n' | '\r')
            || ('\u{20}'..='\u{D7FF}').contains(&c)
            || ('\u{E000}'..='\u{FFFD}').contains(&c)
            || c >= '\u{10000}'
    };
    if text.chars().all(allowed) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| if allowed(c) { c } else { char::REPLACEMENT_CHARACTER })
            .collect(),
    )
}

fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(&xml_safe(text))))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn sheet_xml(rows: &[SheetRow<'_>], has_drawing: bool) -> Result<Vec<u8>> {
    let mut writer = xml_writer()?;

    let mut root = BytesStart::new("worksheet");
    root.push_attribute(("xmlns", NS_MAIN));
    root.push_attribute(("xmlns:r", NS_REL));
    writer.write_event(Event::Start(root))?;

    writer.write_event(Event::Start(BytesStart::new("cols")))?;
    for (index, width) in COLUMN_WIDTHS.iter().enumerate() {
        let column = (index + 1).to_string();
        let mut col = BytesStart::new("col");
        col.push_attribute(("min", column.as_str()));
        col.push_attribute(("max", column.as_str()));
        col.push_attribute(("width", width.to_string().as_str()));
        col.push_attribute(("customWidth", "1"));
        writer.write_event(Event::Empty(col))?;
    }
    writer.write_event(Event::End(BytesEnd::new("cols")))?;

    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;
    for (row, index) in rows.iter().zip(0u32..) {
        let mut element = BytesStart::new("row");
        element.push_attribute(("r", (index + 1).to_string().as_str()));
        if let Some(height) = row.height {
            element.push_attribute(("ht", height.to_string().as_str()));
            element.push_attribute(("customHeight", "1"));
        }
        if row.cells.is_empty() {
            writer.write_event(Event::Empty(element))?;
            continue;
        }

        writer.write_event(Event::Start(element))?;
        let style = row.style.xf_index().to_string();
        for (column, value) in &row.cells {
            let mut cell = BytesStart::new("c");
            cell.push_attribute(("r", cell_ref(*column, index).as_str()));
            if row.style != CellStyle::Normal {
                cell.push_attribute(("s", style.as_str()));
            }
            match value {
                CellValue::Text(text) => {
                    cell.push_attribute(("t", "inlineStr"));
                    writer.write_event(Event::Start(cell))?;
                    writer.write_event(Event::Start(BytesStart::new("is")))?;
                    text_element(&mut writer, "t", text)?;
                    writer.write_event(Event::End(BytesEnd::new("is")))?;
                }
                CellValue::Bool(flag) => {
                    cell.push_attribute(("t", "b"));
                    writer.write_event(Event::Start(cell))?;
                    text_element(&mut writer, "v", if *flag { "1" } else { "0" })?;
                }
            }
            writer.write_event(Event::End(BytesEnd::new("c")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("row")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;

    if has_drawing {
        let mut drawing = BytesStart::new("drawing");
        drawing.push_attribute(("r:id", "rId1"));
        writer.write_event(Event::Empty(drawing))?;
    }

    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(writer.into_inner().into_inner())
}

fn drawing_xml(anchors: &[(u32, &StoredImage)]) -> Result<Vec<u8>> {
    let mut writer = xml_writer()?;
    let extent = (u64::from(IMAGE_DISPLAY_PX) * EMU_PER_PIXEL).to_string();

    let mut root = BytesStart::new("xdr:wsDr");
    root.push_attribute(("xmlns:xdr", NS_DRAWING));
    root.push_attribute(("xmlns:a", NS_A));
    root.push_attribute(("xmlns:r", NS_REL));
    writer.write_event(Event::Start(root))?;

    for (n, (row, _)) in anchors.iter().enumerate() {
        let id = n + 1;
        writer.write_event(Event::Start(BytesStart::new("xdr:oneCellAnchor")))?;

        writer.write_event(Event::Start(BytesStart::new("xdr:from")))?;
        text_element(&mut writer, "xdr:col", &PREVIEW_COLUMN.to_string())?;
        text_element(&mut writer, "xdr:colOff", "0")?;
        text_element(&mut writer, "xdr:row", &row.to_string())?;
        text_element(&mut writer, "xdr:rowOff", "0")?;
        writer.write_event(Event::End(BytesEnd::new("xdr:from")))?;

        let mut ext = BytesStart::new("xdr:ext");
        ext.push_attribute(("cx", extent.as_str()));
        ext.push_attribute(("cy", extent.as_str()));
        writer.write_event(Event::Empty(ext))?;

        writer.write_event(Event::Start(BytesStart::new("xdr:pic")))?;

        writer.write_event(Event::Start(BytesStart::new("xdr:nvPicPr")))?;
        let mut c_nv_pr = BytesStart::new("xdr:cNvPr");
        c_nv_pr.push_attribute(("id", (id + 1).to_string().as_str()));
        c_nv_pr.push_attribute(("name", format!("Picture {}", id).as_str()));
        writer.write_event(Event::Empty(c_nv_pr))?;
        writer.write_event(Event::Start(BytesStart::new("xdr:cNvPicPr")))?;
        let mut locks = BytesStart::new("a:picLocks");
        locks.push_attribute(("noChangeAspect", "1"));
        writer.write_event(Event::Empty(locks))?;
        writer.write_event(Event::End(BytesEnd::new("xdr:cNvPicPr")))?;
        writer.write_event(Event::End(BytesEnd::new("xdr:nvPicPr")))?;

        writer.write_event(Event::Start(BytesStart::new("xdr:blipFill")))?;
        let mut blip = BytesStart::new("a:blip");
        blip.push_attribute(("r:embed", format!("rId{}", id).as_str()));
        writer.write_event(Event::Empty(blip))?;
        writer.write_event(Event::Start(BytesStart::new("a:stretch")))?;
        writer.write_event(Event::Empty(BytesStart::new("a:fillRect")))?;
        writer.write_event(Event::End(BytesEnd::new("a:stretch")))?;
        writer.write_event(Event::End(BytesEnd::new("xdr:blipFill")))?;

        writer.write_event(Event::Start(BytesStart::new("xdr:spPr")))?;
        let mut geometry = BytesStart::new("a:prstGeom");
        geometry.push_attribute(("prst", "rect"));
        writer.write_event(Event::Start(geometry))?;
        writer.write_event(Event::Empty(BytesStart::new("a:avLst")))?;
        writer.write_event(Event::End(BytesEnd::new("a:prstGeom")))?;
        writer.write_event(Event::End(BytesEnd::new("xdr:spPr")))?;

        writer.write_event(Event::End(BytesEnd::new("xdr:pic")))?;
        writer.write_event(Event::Empty(BytesStart::new("xdr:clientData")))?;
        writer.write_event(Event::End(BytesEnd::new("xdr:oneCellAnchor")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("xdr:wsDr")))?;
    Ok(writer.into_inner().into_inner())
}

fn drawing_rels_xml(count: usize) -> Result<Vec<u8>> {
    let mut writer = xml_writer()?;
    let mut root = BytesStart::new("Relationships");
    root.push_attribute(("xmlns", NS_PKG_REL));
    writer.write_event(Event::Start(root))?;
    for n in 1..=count {
        let mut rel = BytesStart::new("Relationship");
        rel.push_attribute(("Id", format!("rId{}", n).as_str()));
        rel.push_attribute(("Type", REL_IMAGE));
        rel.push_attribute(("Target", format!("../media/image{}.png", n).as_str()));
        writer.write_event(Event::Empty(rel))?;
    }
    writer.write_event(Event::End(BytesEnd::new("Relationships")))?;
    Ok(writer.into_inner().into_inner())
}

fn sheet_rels_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">
  <Relationship Id="rId1" Type="{}" Target="../drawings/drawing1.xml"/>
</Relationships>"#,
        NS_PKG_REL, REL_DRAWING
    )
}

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{}" xmlns:r="{}">
  <sheets>
    <sheet name="{}" sheetId="1" r:id="rId1"/>
  </sheets>
</workbook>"#,
        NS_MAIN, NS_REL, SHEET_NAME
    )
}

fn content_types_xml(has_drawing: bool) -> String {
    let drawing = if has_drawing {
        r#"
  <Default Extension="png" ContentType="image/png"/>
  <Override PartName="/xl/drawings/drawing1.xml" ContentType="application/vnd.openxmlformats-officedocument.drawing+xml"/>"#
    } else {
        ""
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
  <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>{}
</Types>"#,
        drawing
    )
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

// Font 1 is bold, font 2 bold red; cellXfs follow CellStyle order
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="3">
    <font><sz val="11"/><name val="Calibri"/></font>
    <font><b/><sz val="11"/><name val="Calibri"/></font>
    <font><b/><sz val="11"/><color rgb="FFFF0000"/><name val="Calibri"/></font>
  </fonts>
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>
    <xf numFmtId="0" fontId="2" fillId="0" borderId="0" xfId="0" applyFont="1"/>
  </cellXfs>
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
</styleSheet>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::{ChecklistRow, ImageLocation, MissingPreviewRecord};

    fn image_row(name: &str) -> ChecklistEntry {
        ChecklistEntry::Row(ChecklistRow {
            filename: name.to_string(),
            preview: PreviewCell::Image(StoredImage {
                location: ImageLocation::Inline(vec![1, 2, 3]),
                width: 200,
                height: 200,
            }),
            reviewed: None,
            not_needed: None,
        })
    }

    #[test]
    fn test_cell_ref() {
        assert_eq!(cell_ref(0, 0), "A1");
        assert_eq!(cell_ref(3, 41), "D42");
    }

    #[test]
    fn test_layout_root_folder_header() {
        let doc = ChecklistDocument {
            banner: None,
            entries: vec![
                ChecklistEntry::Spacer,
                ChecklistEntry::FolderHeader(String::new()),
                image_row("base.stl"),
            ],
        };
        let rows = layout(&doc);
        assert_eq!(rows.len(), 4);
        assert!(rows[1].cells.is_empty());
        assert_eq!(rows[2].text_at(0), Some("Folder: ."));
        assert_eq!(rows[2].style, CellStyle::Bold);
        assert_eq!(rows[3].height, Some(150.0));
        assert!(rows[3].image.is_some());
    }

    #[test]
    fn test_layout_banner_rows() {
        let mut doc = ChecklistDocument::default();
        doc.insert_banner(&[
            MissingPreviewRecord::new("A", "p2.stl"),
            MissingPreviewRecord::new("", "top.stl"),
        ]);
        let rows = layout(&doc);
        assert_eq!(rows[0].style, CellStyle::Warning);
        assert_eq!(rows[1].text_at(0), Some("A/p2.stl"));
        assert_eq!(rows[2].text_at(0), Some("top.stl"));
        assert_eq!(rows[3].text_at(3), Some("Not Needed"));
    }

    #[test]
    fn test_sheet_xml_escapes_text() {
        let rows = vec![SheetRow::text("a<b & c", CellStyle::Bold)];
        let xml = String::from_utf8(sheet_xml(&rows, false).unwrap()).unwrap();
        assert!(xml.contains("a&lt;b &amp; c"));
        assert!(xml.contains(r#"s="1""#));
        assert!(!xml.contains("<drawing"));
    }

    #[test]
    fn test_control_characters_are_replaced() {
        let rows = vec![SheetRow::text("part\u{1}\u{1b}.stl\ttab", CellStyle::Normal)];
        let xml = String::from_utf8(sheet_xml(&rows, false).unwrap()).unwrap();
        assert!(xml.contains("<t>part\u{FFFD}\u{FFFD}.stl\ttab</t>"));
        assert!(!xml.contains('\u{1}'));
        assert!(matches!(xml_safe("plain.stl"), Cow::Borrowed("plain.stl")));
    }

    #[test]
    fn test_review_verdicts_are_boolean_cells() {
        let mut row = ChecklistRow {
            filename: "p1.stl".to_string(),
            preview: PreviewCell::Missing,
            reviewed: Some(true),
            not_needed: Some(false),
        };
        let doc = ChecklistDocument {
            banner: None,
            entries: vec![ChecklistEntry::Row(row.clone())],
        };
        let rows = layout(&doc);
        assert!(rows[0].cells.contains(&(2, CellValue::Bool(true))));
        assert!(rows[0].cells.contains(&(3, CellValue::Bool(false))));

        let xml = String::from_utf8(sheet_xml(&rows, false).unwrap()).unwrap();
        assert!(xml.contains(r#"<c r="C1" t="b"><v>1</v></c>"#), "{}", xml);
        assert!(xml.contains(r#"<c r="D1" t="b"><v>0</v></c>"#));

        row.reviewed = None;
        row.not_needed = None;
        let doc = ChecklistDocument {
            banner: None,
            entries: vec![ChecklistEntry::Row(row)],
        };
        assert!(!String::from_utf8(sheet_xml(&layout(&doc), false).unwrap())
            .unwrap()
            .contains(r#"t="b""#));
    }

    #[test]
    fn test_drawing_anchors_preview_column() {
        let image = StoredImage {
            location: ImageLocation::Inline(vec![]),
            width: 64,
            height: 64,
        };
        let xml = String::from_utf8(drawing_xml(&[(7, &image)]).unwrap()).unwrap();
        assert!(xml.contains("<xdr:col>1</xdr:col>"));
        assert!(xml.contains("<xdr:row>7</xdr:row>"));
        assert!(xml.contains(r#"cx="1905000""#));
        assert!(xml.contains(r#"r:embed="rId1""#));
    }
}
