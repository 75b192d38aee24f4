//! Slide part XML.

use super::template::{NS_A, NS_C, NS_P, NS_R};
use super::{
    centipoints, escape_text, write_group_properties, write_placeholder_ref, write_transform,
    XML_DECLARATION,
};
use crate::document::{
    Paragraph, Picture, Placeholder, Shape, ShapeContent, Slide, Table, TextFrame,
};
use std::fmt::{self, Write as FmtWrite};

const TABLE_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";

/// Render a slide. `shape_rels` holds the relationship ID of each shape's
/// external part, in shape order.
pub(crate) fn slide_xml(slide: &Slide, shape_rels: &[Option<String>]) -> Result<String, fmt::Error> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree>"#,
        NS_A, NS_R, NS_P
    )?;
    write_group_properties(&mut xml);

    for placeholder in slide.placeholders() {
        write_placeholder(&mut xml, placeholder)?;
    }

    for (shape, rel_id) in slide.shapes().iter().zip(shape_rels) {
        match (&shape.content, rel_id) {
            (ShapeContent::Picture(picture), Some(rel_id)) => {
                write_picture(&mut xml, shape, picture, rel_id)?
            }
            (ShapeContent::Chart(_), Some(rel_id)) => write_chart_frame(&mut xml, shape, rel_id)?,
            (ShapeContent::Table(table), _) => write_table(&mut xml, shape, table)?,
            _ => log::warn!("Shape '{}' has no relationship; not written", shape.name),
        }
    }

    xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    Ok(xml)
}

fn write_placeholder(xml: &mut String, placeholder: &Placeholder) -> fmt::Result {
    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>"#,
        placeholder.id,
        escape_text(&placeholder.name)
    )?;
    write_placeholder_ref(xml, placeholder.role, placeholder.idx)?;
    xml.push_str("</p:nvPr></p:nvSpPr><p:spPr/>");
    write_text_body(xml, "p", &placeholder.text_frame)?;
    xml.push_str("</p:sp>");
    Ok(())
}

/// `txBody` of a placeholder (`p:`) or a table cell (`a:`).
fn write_text_body(xml: &mut String, prefix: &str, frame: &TextFrame) -> fmt::Result {
    write!(xml, "<{}:txBody>", prefix)?;
    xml.push_str("<a:bodyPr");
    if frame.anchor_top {
        xml.push_str(r#" anchor="t""#);
    }
    if frame.shrink_on_overflow {
        xml.push_str("><a:normAutofit/></a:bodyPr>");
    } else {
        xml.push_str("/>");
    }
    xml.push_str("<a:lstStyle/>");
    for paragraph in frame.paragraphs() {
        write_paragraph(xml, paragraph)?;
    }
    write!(xml, "</{}:txBody>", prefix)
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) -> fmt::Result {
    let size = paragraph
        .font_size
        .map(|points| format!(r#" sz="{}""#, centipoints(points)))
        .unwrap_or_default();

    xml.push_str("<a:p>");
    if !paragraph.text.is_empty() {
        write!(
            xml,
            r#"<a:r><a:rPr lang="en-US"{} dirty="0"/><a:t>{}</a:t></a:r>"#,
            size,
            escape_text(&paragraph.text)
        )?;
    }
    write!(xml, r#"<a:endParaRPr lang="en-US"{} dirty="0"/></a:p>"#, size)
}

fn write_picture(xml: &mut String, shape: &Shape, picture: &Picture, rel_id: &str) -> fmt::Result {
    write!(
        xml,
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="{}" descr="image.{}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#,
        shape.id,
        escape_text(&shape.name),
        picture.format.extension()
    )?;
    write!(
        xml,
        r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr>"#,
        rel_id
    )?;
    write_transform(xml, "a", shape.bounds)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
    Ok(())
}

fn write_frame_start(xml: &mut String, shape: &Shape) -> fmt::Result {
    write!(
        xml,
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{}" name="{}"/><p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr>"#,
        shape.id,
        escape_text(&shape.name)
    )?;
    write_transform(xml, "p", shape.bounds)
}

fn write_chart_frame(xml: &mut String, shape: &Shape, rel_id: &str) -> fmt::Result {
    write_frame_start(xml, shape)?;
    write!(
        xml,
        r#"<a:graphic><a:graphicData uri="{c}"><c:chart xmlns:c="{c}" r:id="{}"/></a:graphicData></a:graphic></p:graphicFrame>"#,
        rel_id,
        c = NS_C
    )
}

fn write_table(xml: &mut String, shape: &Shape, table: &Table) -> fmt::Result {
    write_frame_start(xml, shape)?;
    write!(
        xml,
        r#"<a:graphic><a:graphicData uri="{}"><a:tbl><a:tblPr firstRow="1" bandRow="1"/><a:tblGrid>"#,
        TABLE_URI
    )?;

    let widths = split_evenly(shape.bounds.cx, table.columns());
    for width in &widths {
        write!(xml, r#"<a:gridCol w="{}"/>"#, width)?;
    }
    xml.push_str("</a:tblGrid>");

    let heights = split_evenly(shape.bounds.cy, table.rows());
    for (row, height) in table.cells().iter().zip(&heights) {
        write!(xml, r#"<a:tr h="{}">"#, height)?;
        for text in row {
            let mut frame = TextFrame::default();
            frame.set_text(text);
            xml.push_str("<a:tc>");
            write_text_body(xml, "a", &frame)?;
            xml.push_str("<a:tcPr/></a:tc>");
        }
        xml.push_str("</a:tr>");
    }

    xml.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
    Ok(())
}

/// Divide `total` into `parts` whole sizes; the last part takes the remainder.
fn split_evenly(total: i64, parts: usize) -> Vec<i64> {
    if parts == 0 {
        return Vec::new();
    }
    let each = total / parts as i64;
    let mut sizes = vec![each; parts];
    if let Some(last) = sizes.last_mut() {
        *last = total - each * (parts as i64 - 1);
    }
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Chart, ChartData, ChartKind};
    use crate::document::Bounds;
    use deck_core::LayoutKind;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_placeholder_text_and_formatting() {
        let mut slide = Slide::new(LayoutKind::TitleAndBody);
        let title = slide.title_mut().unwrap();
        title.text_frame.set_text("A & B");
        title.text_frame.set_first_font_size(36.0);

        let body = slide.placeholder_mut(1).unwrap();
        body.text_frame.set_text("one\ntwo");
        body.text_frame.set_font_size(24.0);
        body.text_frame.shrink_on_overflow = true;
        body.text_frame.anchor_top = true;

        let xml = slide_xml(&slide, &[]).unwrap();
        assert!(xml.contains(r#"<a:rPr lang="en-US" sz="3600" dirty="0"/><a:t>A &amp; B</a:t>"#));
        assert!(xml.contains(r#"<a:bodyPr anchor="t"><a:normAutofit/></a:bodyPr>"#));
        assert!(xml.contains("<a:t>one</a:t>"));
        assert!(xml.contains(r#"<a:rPr lang="en-US" sz="2400" dirty="0"/><a:t>two</a:t>"#));
        assert!(xml.contains(r#"<p:ph idx="1"/>"#));
    }

    #[test]
    fn test_empty_paragraph_has_no_run() {
        let slide = Slide::new(LayoutKind::Content);
        let xml = slide_xml(&slide, &[]).unwrap();

        assert!(!xml.contains("<a:r>"));
        assert!(xml.contains(r#"<a:endParaRPr lang="en-US" dirty="0"/>"#));
    }

    #[test]
    fn test_picture_and_chart_use_relationships() {
        let mut slide = Slide::new(LayoutKind::Content);
        slide
            .add_picture(PNG.to_vec(), Bounds::new(914_400, 914_400, 2_743_200, 1_828_800))
            .unwrap();
        slide.add_chart(
            Chart::new(ChartKind::Pie, ChartData::default()),
            Bounds::default(),
        );

        let rels = vec![Some("rId2".to_string()), Some("rId3".to_string())];
        let xml = slide_xml(&slide, &rels).unwrap();

        assert!(xml.contains(r#"<a:blip r:embed="rId2"/>"#));
        assert!(xml.contains(r#"<a:off x="914400" y="914400"/><a:ext cx="2743200" cy="1828800"/>"#));
        assert!(xml.contains(r#"r:id="rId3"/>"#));
    }

    #[test]
    fn test_table_grid() {
        let mut slide = Slide::new(LayoutKind::Content);
        let mut table = Table::new(2, 3);
        table.set_cell(0, 0, "a<b").unwrap();
        slide.add_table(table, Bounds::new(0, 0, 1000, 301));

        let xml = slide_xml(&slide, &[None]).unwrap();
        assert_eq!(xml.matches("<a:gridCol").count(), 3);
        assert!(xml.contains(r#"<a:gridCol w="333"/><a:gridCol w="333"/><a:gridCol w="334"/>"#));
        assert!(xml.contains(r#"<a:tr h="150">"#));
        assert!(xml.contains(r#"<a:tr h="151">"#));
        assert_eq!(xml.matches("<a:tc>").count(), 6);
        assert!(xml.contains("<a:t>a&lt;b</a:t>"));
    }

    #[test]
    fn test_empty_table_is_written() {
        let mut slide = Slide::new(LayoutKind::Content);
        slide.add_table(Table::new(0, 0), Bounds::default());

        let xml = slide_xml(&slide, &[None]).unwrap();
        assert!(xml.contains("<a:tblGrid></a:tblGrid></a:tbl>"));
    }

    #[test]
    fn test_split_evenly() {
        assert_eq!(split_evenly(10, 0), Vec::<i64>::new());
        assert_eq!(split_evenly(10, 3), vec![3, 3, 4]);
        assert_eq!(split_evenly(9, 1), vec![9]);
    }
}
