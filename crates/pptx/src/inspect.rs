//! Read-back of rendered `.pptx` packages.
//!
//! Summarizes what a package actually contains (slide layouts, text,
//! pictures, tables and charts) so rendered output can be compared at the
//! content level instead of byte for byte.

use deck_core::{Error, LayoutKind, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;

/// Content of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSummary {
    pub columns: usize,
    pub rows: Vec<Vec<String>>,
}

/// Content of one slide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideSummary {
    /// 1-based position in the presentation.
    pub number: usize,
    pub layout: Option<LayoutKind>,
    /// Non-empty text of each text shape, in document order.
    pub texts: Vec<String>,
    pub pictures: usize,
    pub tables: Vec<TableSummary>,
    pub charts: usize,
}

/// Content of a whole presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckSummary {
    pub slides: Vec<SlideSummary>,
}

/// Summarize a package held in memory.
pub fn inspect(bytes: &[u8]) -> Result<DeckSummary> {
    PptxInspector::new().inspect(Cursor::new(bytes))
}

/// Reads `.pptx` packages back into [`DeckSummary`] values.
pub struct PptxInspector;

impl PptxInspector {
    pub fn new() -> Self {
        Self
    }

    /// Summarize a package from a reader.
    pub fn inspect<R: Read + Seek>(&self, reader: R) -> Result<DeckSummary> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::InvalidPackage(format!("Failed to open ZIP: {}", e)))?;

        let slide_order = self.get_slide_order(&mut archive)?;
        let mut deck = DeckSummary::default();

        for (idx, slide_path) in slide_order.iter().enumerate() {
            let slide = self.inspect_slide(&mut archive, slide_path, idx + 1)?;
            deck.slides.push(slide);
        }

        Ok(deck)
    }

    /// Slide part paths in presentation order.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels = read_relationships(archive, "ppt/_rels/presentation.xml.rels")?;
        let mut slides: Vec<(String, Option<usize>)> = rels
            .into_iter()
            .filter(|rel| rel.rel_type.ends_with("/slide"))
            .map(|rel| {
                let order = extract_number(&rel.id).or_else(|| extract_number(&rel.target));
                (resolve_target("ppt", &rel.target), order)
            })
            .collect();

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    fn inspect_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        number: usize,
    ) -> Result<SlideSummary> {
        let content = read_file_from_archive(archive, slide_path)?;
        let mut slide = summarize_slide_xml(&content)?;
        slide.number = number;

        let rels_path = match slide_path.rsplit_once('/') {
            Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
            None => format!("_rels/{}.rels", slide_path),
        };
        slide.layout = read_relationships(archive, &rels_path)?
            .iter()
            .find(|rel| rel.rel_type.ends_with("/slideLayout"))
            .and_then(|rel| extract_number(&rel.target))
            .and_then(LayoutKind::from_template_number);

        Ok(slide)
    }
}

impl Default for PptxInspector {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk a slide's shape tree.
fn summarize_slide_xml(xml: &str) -> Result<SlideSummary> {
    let mut slide = SlideSummary::default();
    let mut reader = Reader::from_str(xml);

    let mut shape_text: Option<String> = None;
    let mut table: Option<TableSummary> = None;
    let mut cell: Option<String> = None;
    let mut in_text = false;
    let mut paragraphs = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    shape_text = Some(String::new());
                    paragraphs = 0;
                }
                b"pic" => slide.pictures += 1,
                b"tbl" => table = Some(TableSummary::default()),
                b"tr" => {
                    if let Some(table) = table.as_mut() {
                        table.rows.push(Vec::new());
                    }
                }
                b"tc" => {
                    cell = Some(String::new());
                    paragraphs = 0;
                }
                b"p" => {
                    if let Some(target) = cell.as_mut().or(shape_text.as_mut()) {
                        if paragraphs > 0 {
                            target.push('\n');
                        }
                        paragraphs += 1;
                    }
                }
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match local_name(e.name().as_ref()) {
                b"gridCol" => {
                    if let Some(table) = table.as_mut() {
                        table.columns += 1;
                    }
                }
                b"chart" if is_chart_reference(e) => slide.charts += 1,
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| Error::InvalidPackage(format!("Bad slide text: {}", err)))?;
                if let Some(target) = cell.as_mut().or(shape_text.as_mut()) {
                    target.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"tc" => {
                    if let (Some(text), Some(table)) = (cell.take(), table.as_mut()) {
                        if let Some(row) = table.rows.last_mut() {
                            row.push(text);
                        }
                    }
                }
                b"tbl" => {
                    if let Some(table) = table.take() {
                        slide.tables.push(table);
                    }
                }
                b"sp" => {
                    if let Some(text) = shape_text.take() {
                        if !text.is_empty() {
                            slide.texts.push(text);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::InvalidPackage(format!(
                    "Error parsing slide XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(slide)
}

fn is_chart_reference(e: &BytesStart) -> bool {
    e.attributes()
        .flatten()
        .any(|attr| local_name(attr.key.as_ref()) == b"id")
}

struct RelationshipEntry {
    id: String,
    rel_type: String,
    target: String,
}

fn read_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Vec<RelationshipEntry>> {
    let content = read_file_from_archive(archive, path)?;
    let mut reader = Reader::from_str(&content);
    reader.trim_text(true);
    let mut rels = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut rel = RelationshipEntry {
                    id: String::new(),
                    rel_type: String::new(),
                    target: String::new(),
                };
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"Id" => rel.id = value,
                        b"Type" => rel.rel_type = value,
                        b"Target" => rel.target = value,
                        _ => {}
                    }
                }
                rels.push(rel);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::InvalidPackage(format!(
                    "Error parsing relationships in '{}': {}",
                    path, e
                )));
            }
            _ => {}
        }
    }

    Ok(rels)
}

fn read_file_from_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<String> {
    let mut file = archive.by_name(path).map_err(|e| {
        Error::InvalidPackage(format!("File not found in archive '{}': {}", path, e))
    })?;

    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

/// Turn a relationship target into an archive path relative to `base`.
fn resolve_target(base: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut parts: Vec<&str> = base.split('/').filter(|p| !p.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            ".." => {
                parts.pop();
            }
            "." | "" => {}
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Extract the trailing number from a string like "rId2" or
/// "../slideLayouts/slideLayout3.xml".
fn extract_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");
    let start = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    s[start..].parse().ok()
}
