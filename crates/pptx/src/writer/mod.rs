//! OOXML package writer.
//!
//! Parts are rendered to XML strings first and then compressed into a ZIP
//! container, with `[Content_Types].xml` as the first entry.

mod chart;
mod slide;
mod template;

use crate::document::{Bounds, Document, PlaceholderRole, ShapeContent};
use deck_core::{Error, LayoutKind, Result};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{self, Write as FmtWrite};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use template::{REL_CHART, REL_IMAGE, REL_SLIDE_LAYOUT};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// One entry of the package.
struct Part {
    name: String,
    /// Override content type; parts without one fall back to the
    /// extension default.
    content_type: Option<&'static str>,
    data: Vec<u8>,
}

impl Part {
    fn xml(name: impl Into<String>, content_type: &'static str, xml: String) -> Self {
        Self {
            name: name.into(),
            content_type: Some(content_type),
            data: xml.into_bytes(),
        }
    }

    fn rels(name: impl Into<String>, xml: String) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            data: xml.into_bytes(),
        }
    }
}

/// A relationship from one part to another.
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: &'static str,
    pub target: String,
}

/// Serializes a [`Document`] into `.pptx` bytes.
pub struct PackageWriter<'a> {
    document: &'a Document,
}

impl<'a> PackageWriter<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Render every part and write the ZIP container.
    pub fn write(&self) -> Result<Vec<u8>> {
        let parts = self
            .parts()
            .map_err(|e| Error::Serialization(format!("Failed to generate XML: {}", e)))?;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for part in &parts {
            zip.start_file(part.name.as_str(), options)
                .map_err(|e| Error::Serialization(format!("Failed to add '{}': {}", part.name, e)))?;
            zip.write_all(&part.data)
                .map_err(|e| Error::Serialization(format!("Failed to write '{}': {}", part.name, e)))?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| Error::Serialization(format!("Failed to finish ZIP: {}", e)))?;

        log::debug!(
            "Wrote {} parts for {} slides",
            parts.len(),
            self.document.slide_count()
        );
        Ok(cursor.into_inner())
    }

    fn parts(&self) -> std::result::Result<Vec<Part>, fmt::Error> {
        let mut parts = Vec::new();
        let mut image_defaults: BTreeMap<&'static str, &'static str> = BTreeMap::new();
        let mut image_count = 0;
        let mut chart_count = 0;

        parts.push(Part::rels("_rels/.rels", template::package_rels_xml()?));
        parts.push(Part::xml(
            "docProps/core.xml",
            template::CT_CORE_PROPERTIES,
            template::core_properties_xml(self.document_title().as_deref())?,
        ));
        parts.push(Part::xml(
            "docProps/app.xml",
            template::CT_EXTENDED_PROPERTIES,
            template::app_properties_xml(self.document.slide_count())?,
        ));
        parts.push(Part::xml(
            "ppt/presentation.xml",
            template::CT_PRESENTATION,
            template::presentation_xml(self.document)?,
        ));
        parts.push(Part::rels(
            "ppt/_rels/presentation.xml.rels",
            template::presentation_rels_xml(self.document.slide_count())?,
        ));
        parts.push(Part::xml(
            "ppt/presProps.xml",
            template::CT_PRES_PROPS,
            template::pres_props_xml()?,
        ));
        parts.push(Part::xml(
            "ppt/slideMasters/slideMaster1.xml",
            template::CT_SLIDE_MASTER,
            template::master_xml()?,
        ));
        parts.push(Part::rels(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            template::master_rels_xml()?,
        ));
        for layout in LayoutKind::ALL {
            let number = layout.template_number();
            parts.push(Part::xml(
                format!("ppt/slideLayouts/slideLayout{}.xml", number),
                template::CT_SLIDE_LAYOUT,
                template::layout_xml(layout)?,
            ));
            parts.push(Part::rels(
                format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", number),
                template::layout_rels_xml()?,
            ));
        }
        parts.push(Part::xml(
            "ppt/theme/theme1.xml",
            template::CT_THEME,
            template::THEME_XML.to_string(),
        ));

        for (index, slide) in self.document.slides().iter().enumerate() {
            let number = index + 1;
            let mut rels = vec![Relationship {
                id: "rId1".to_string(),
                rel_type: REL_SLIDE_LAYOUT,
                target: format!(
                    "../slideLayouts/slideLayout{}.xml",
                    slide.layout().template_number()
                ),
            }];
            let mut shape_rels = Vec::with_capacity(slide.shapes().len());

            for shape in slide.shapes() {
                let (rel_type, target) = match &shape.content {
                    ShapeContent::Picture(picture) => {
                        image_count += 1;
                        let ext = picture.format.extension();
                        let name = format!("image{}.{}", image_count, ext);
                        image_defaults.insert(ext, picture.format.content_type());
                        parts.push(Part {
                            name: format!("ppt/media/{}", name),
                            content_type: None,
                            data: picture.data.clone(),
                        });
                        (REL_IMAGE, format!("../media/{}", name))
                    }
                    ShapeContent::Chart(chart) => {
                        chart_count += 1;
                        parts.push(Part::xml(
                            format!("ppt/charts/chart{}.xml", chart_count),
                            template::CT_CHART,
                            chart::chart_xml(chart)?,
                        ));
                        (REL_CHART, format!("../charts/chart{}.xml", chart_count))
                    }
                    ShapeContent::Table(_) => {
                        shape_rels.push(None);
                        continue;
                    }
                };

                let id = format!("rId{}", rels.len() + 1);
                shape_rels.push(Some(id.clone()));
                rels.push(Relationship {
                    id,
                    rel_type,
                    target,
                });
            }

            parts.push(Part::xml(
                format!("ppt/slides/slide{}.xml", number),
                template::CT_SLIDE,
                slide::slide_xml(slide, &shape_rels)?,
            ));
            parts.push(Part::rels(
                format!("ppt/slides/_rels/slide{}.xml.rels", number),
                relationships_xml(&rels)?,
            ));
        }

        let content_types = template::content_types_xml(
            image_defaults.iter().map(|(ext, ct)| (*ext, *ct)),
            parts
                .iter()
                .filter_map(|p| p.content_type.map(|ct| (p.name.as_str(), ct))),
        )?;
        parts.insert(
            0,
            Part {
                name: "[Content_Types].xml".to_string(),
                content_type: None,
                data: content_types.into_bytes(),
            },
        );

        Ok(parts)
    }

    /// Text of the first slide's title, used as the document title.
    fn document_title(&self) -> Option<String> {
        let slide = self.document.slides().first()?;
        slide
            .placeholders()
            .iter()
            .find(|p| p.role.is_title())
            .map(|p| p.text_frame.text())
            .filter(|text| !text.is_empty())
    }
}

/// Escape text for element content or attribute values, dropping characters
/// XML 1.0 cannot represent.
pub(crate) fn escape_text(s: &str) -> Cow<'_, str> {
    let valid = |c: char| {
        matches!(c, '\t' | '\n' | '\r')
            || (c >= ' ' && !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
    };

    if s.chars().all(valid) {
        quick_xml::escape::escape(s)
    } else {
        let filtered: String = s.chars().filter(|c| valid(*c)).collect();
        Cow::Owned(quick_xml::escape::escape(&filtered).into_owned())
    }
}

/// Font size in hundredths of a point, clamped to the range OOXML accepts.
pub(crate) fn centipoints(points: f64) -> i64 {
    ((points * 100.0).round() as i64).clamp(100, 400_000)
}

pub(crate) fn relationships_xml(rels: &[Relationship]) -> std::result::Result<String, fmt::Error> {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for rel in rels {
        write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            rel.id,
            rel.rel_type,
            escape_text(&rel.target)
        )?;
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}

/// The `p:spTree` group properties every shape tree starts with.
pub(crate) fn write_group_properties(xml: &mut String) {
    xml.push_str(
        r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
    );
}

/// `p:ph` element for a placeholder role.
pub(crate) fn write_placeholder_ref(
    xml: &mut String,
    role: PlaceholderRole,
    idx: u32,
) -> fmt::Result {
    xml.push_str("<p:ph");
    if let Some(ph_type) = role.ph_type() {
        write!(xml, r#" type="{}""#, ph_type)?;
    }
    if idx > 0 {
        write!(xml, r#" idx="{}""#, idx)?;
    }
    xml.push_str("/>");
    Ok(())
}

/// `a:xfrm` (or `p:xfrm` for graphic frames) with offset and extent.
pub(crate) fn write_transform(xml: &mut String, prefix: &str, bounds: Bounds) -> fmt::Result {
    write!(
        xml,
        r#"<{p}:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></{p}:xfrm>"#,
        bounds.x,
        bounds.y,
        bounds.cx,
        bounds.cy,
        p = prefix
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_text("plain"), "plain");
        assert_eq!(escape_text("bell\u{7}tab\t"), "belltab\t");
    }

    #[test]
    fn test_centipoints() {
        assert_eq!(centipoints(54.0), 5400);
        assert_eq!(centipoints(10.5), 1050);
        assert_eq!(centipoints(0.0), 100);
        assert_eq!(centipoints(1.0e9), 400_000);
    }

    #[test]
    fn test_placeholder_ref() {
        let mut xml = String::new();
        write_placeholder_ref(&mut xml, PlaceholderRole::Subtitle, 1).unwrap();
        assert_eq!(xml, r#"<p:ph type="subTitle" idx="1"/>"#);

        xml.clear();
        write_placeholder_ref(&mut xml, PlaceholderRole::Body, 1).unwrap();
        assert_eq!(xml, r#"<p:ph idx="1"/>"#);

        xml.clear();
        write_placeholder_ref(&mut xml, PlaceholderRole::Title, 0).unwrap();
        assert_eq!(xml, r#"<p:ph type="title"/>"#);
    }

    #[test]
    fn test_relationships_xml() {
        let xml = relationships_xml(&[Relationship {
            id: "rId1".into(),
            rel_type: REL_SLIDE_LAYOUT,
            target: "../slideLayouts/slideLayout2.xml".into(),
        }])
        .unwrap();

        assert!(xml.contains(r#"Id="rId1""#));
        assert!(xml.contains(r#"Target="../slideLayouts/slideLayout2.xml""#));
    }
}
