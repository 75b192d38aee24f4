//! Package scaffolding: content types, relationships, document properties,
//! the slide master, its layouts and the theme.

use super::{
    escape_text, relationships_xml, write_group_properties, write_placeholder_ref,
    write_transform, Relationship, XML_DECLARATION,
};
use crate::document::{layout_regions, Bounds, Document, PlaceholderRole};
use deck_core::LayoutKind;
use std::fmt::{self, Write as FmtWrite};

pub(crate) const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const NS_R: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub(crate) const NS_C: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

pub(crate) const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub(crate) const REL_EXTENDED_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub(crate) const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub(crate) const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const REL_THEME: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
pub(crate) const REL_PRES_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub(crate) const REL_CHART: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";

pub(crate) const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
pub(crate) const CT_PRES_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
pub(crate) const CT_SLIDE_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
pub(crate) const CT_SLIDE_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
pub(crate) const CT_SLIDE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
pub(crate) const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
pub(crate) const CT_CHART: &str =
    "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";
pub(crate) const CT_CORE_PROPERTIES: &str =
    "application/vnd.openxmlformats-package.core-properties+xml";
pub(crate) const CT_EXTENDED_PROPERTIES: &str =
    "application/vnd.openxmlformats-officedocument.extended-properties+xml";

const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";

/// ID of the single slide master; layout IDs follow it.
const MASTER_ID: u32 = 2_147_483_648;

/// First ID handed to slides in `p:sldIdLst`.
const FIRST_SLIDE_ID: usize = 256;

/// Relationship IDs in presentation.xml.rels before the first slide.
const PRESENTATION_FIXED_RELS: usize = 3;

const APPLICATION: &str = "deck-render";

pub(crate) fn content_types_xml<'a, 'b>(
    image_defaults: impl Iterator<Item = (&'a str, &'a str)>,
    overrides: impl Iterator<Item = (&'b str, &'b str)>,
) -> Result<String, fmt::Error> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    write!(
        xml,
        r#"<Default Extension="rels" ContentType="{}"/><Default Extension="xml" ContentType="application/xml"/>"#,
        CT_RELATIONSHIPS
    )?;
    for (ext, content_type) in image_defaults {
        write!(
            xml,
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            ext, content_type
        )?;
    }
    for (name, content_type) in overrides {
        write!(
            xml,
            r#"<Override PartName="/{}" ContentType="{}"/>"#,
            name, content_type
        )?;
    }
    xml.push_str("</Types>");
    Ok(xml)
}

pub(crate) fn package_rels_xml() -> Result<String, fmt::Error> {
    relationships_xml(&[
        rel(1, REL_OFFICE_DOCUMENT, "ppt/presentation.xml"),
        rel(2, REL_CORE_PROPERTIES, "docProps/core.xml"),
        rel(3, REL_EXTENDED_PROPERTIES, "docProps/app.xml"),
    ])
}

pub(crate) fn core_properties_xml(title: Option<&str>) -> Result<String, fmt::Error> {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECLARATION);
    xml.push_str(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    );
    if let Some(title) = title {
        write!(xml, "<dc:title>{}</dc:title>", escape_text(title))?;
    }
    write!(xml, "<dc:creator>{}</dc:creator>", APPLICATION)?;
    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

pub(crate) fn app_properties_xml(slide_count: usize) -> Result<String, fmt::Error> {
    let mut xml = String::with_capacity(256);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>{}</Application><Slides>{}</Slides></Properties>"#,
        APPLICATION, slide_count
    )?;
    Ok(xml)
}

pub(crate) fn presentation_xml(document: &Document) -> Result<String, fmt::Error> {
    let mut xml = String::with_capacity(1024 + document.slide_count() * 48);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        NS_A, NS_R, NS_P
    )?;
    write!(
        xml,
        r#"<p:sldMasterIdLst><p:sldMasterId id="{}" r:id="rId1"/></p:sldMasterIdLst>"#,
        MASTER_ID
    )?;

    if document.slide_count() > 0 {
        xml.push_str("<p:sldIdLst>");
        for index in 0..document.slide_count() {
            write!(
                xml,
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                FIRST_SLIDE_ID + index,
                PRESENTATION_FIXED_RELS + index + 1
            )?;
        }
        xml.push_str("</p:sldIdLst>");
    }

    write!(
        xml,
        r#"<p:sldSz cx="{}" cy="{}" type="screen4x3"/><p:notesSz cx="{}" cy="{}"/>"#,
        document.slide_width(),
        document.slide_height(),
        document.slide_height(),
        document.slide_width()
    )?;
    xml.push_str("</p:presentation>");
    Ok(xml)
}

pub(crate) fn presentation_rels_xml(slide_count: usize) -> Result<String, fmt::Error> {
    let mut rels = vec![
        rel(1, REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml"),
        rel(2, REL_THEME, "theme/theme1.xml"),
        rel(3, REL_PRES_PROPS, "presProps.xml"),
    ];
    for index in 0..slide_count {
        rels.push(rel(
            PRESENTATION_FIXED_RELS + index + 1,
            REL_SLIDE,
            &format!("slides/slide{}.xml", index + 1),
        ));
    }
    relationships_xml(&rels)
}

pub(crate) fn pres_props_xml() -> Result<String, fmt::Error> {
    let mut xml = String::with_capacity(256);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:presentationPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"/>"#,
        NS_A, NS_R, NS_P
    )?;
    Ok(xml)
}

pub(crate) fn master_xml() -> Result<String, fmt::Error> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        NS_A, NS_R, NS_P
    )?;
    xml.push_str(
        r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>"#,
    );
    write_group_properties(&mut xml);
    write_layout_placeholder(
        &mut xml,
        2,
        PlaceholderRole::Title,
        0,
        Some(MASTER_TITLE_BOUNDS),
        Some("ctr"),
    )?;
    write_layout_placeholder(
        &mut xml,
        3,
        PlaceholderRole::Body,
        1,
        Some(MASTER_BODY_BOUNDS),
        None,
    )?;
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str(
        r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
    );

    xml.push_str("<p:sldLayoutIdLst>");
    for layout in LayoutKind::ALL {
        let number = layout.template_number();
        write!(
            xml,
            r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
            MASTER_ID as usize + number,
            number
        )?;
    }
    xml.push_str("</p:sldLayoutIdLst>");

    xml.push_str(
        r#"<p:txStyles><p:titleStyle><a:lvl1pPr algn="ctr" defTabSz="914400" rtl="0" eaLnBrk="1" latinLnBrk="0" hangingPunct="1"><a:spcBef><a:spcPct val="0"/></a:spcBef><a:buNone/><a:defRPr sz="4400" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/><a:ea typeface="+mj-ea"/><a:cs typeface="+mj-cs"/></a:defRPr></a:lvl1pPr></p:titleStyle>"#,
    );
    xml.push_str(
        r#"<p:bodyStyle><a:lvl1pPr marL="342900" indent="-342900" algn="l" defTabSz="914400" rtl="0" eaLnBrk="1" latinLnBrk="0" hangingPunct="1"><a:spcBef><a:spcPct val="20000"/></a:spcBef><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/><a:defRPr sz="3200" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/><a:ea typeface="+mn-ea"/><a:cs typeface="+mn-cs"/></a:defRPr></a:lvl1pPr></p:bodyStyle>"#,
    );
    xml.push_str(
        r#"<p:otherStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr></p:otherStyle></p:txStyles>"#,
    );
    xml.push_str("</p:sldMaster>");
    Ok(xml)
}

pub(crate) fn master_rels_xml() -> Result<String, fmt::Error> {
    let mut rels: Vec<Relationship> = LayoutKind::ALL
        .iter()
        .map(|layout| {
            let number = layout.template_number();
            rel(
                number,
                REL_SLIDE_LAYOUT,
                &format!("../slideLayouts/slideLayout{}.xml", number),
            )
        })
        .collect();
    rels.push(rel(LayoutKind::ALL.len() + 1, REL_THEME, "../theme/theme1.xml"));
    relationships_xml(&rels)
}

pub(crate) fn layout_xml(layout: LayoutKind) -> Result<String, fmt::Error> {
    let layout_type = match layout {
        LayoutKind::Title => "title",
        LayoutKind::TitleAndBody => "obj",
        LayoutKind::Content => "titleOnly",
    };

    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="{}" preserve="1">"#,
        NS_A, NS_R, NS_P, layout_type
    )?;
    write!(xml, r#"<p:cSld name="{}"><p:spTree>"#, layout.name())?;
    write_group_properties(&mut xml);

    for (offset, region) in layout_regions(layout).iter().enumerate() {
        let anchor = match region.role {
            PlaceholderRole::CenterTitle => Some("ctr"),
            _ => None,
        };
        write_layout_placeholder(
            &mut xml,
            offset as u32 + 2,
            region.role,
            region.idx,
            region.bounds,
            anchor,
        )?;
    }

    xml.push_str(
        "</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>",
    );
    Ok(xml)
}

pub(crate) fn layout_rels_xml() -> Result<String, fmt::Error> {
    relationships_xml(&[rel(1, REL_SLIDE_MASTER, "../slideMasters/slideMaster1.xml")])
}

const MASTER_TITLE_BOUNDS: Bounds =
    Bounds::new(457_200, 274_638, 8_229_600, 1_143_000);

const MASTER_BODY_BOUNDS: Bounds =
    Bounds::new(457_200, 1_600_200, 8_229_600, 4_525_963);

/// A prompt-text placeholder as it appears on the master or a layout.
fn write_layout_placeholder(
    xml: &mut String,
    id: u32,
    role: PlaceholderRole,
    idx: u32,
    bounds: Option<Bounds>,
    anchor: Option<&str>,
) -> fmt::Result {
    let (name, prompt) = match role {
        PlaceholderRole::CenterTitle | PlaceholderRole::Title => {
            ("Title Placeholder", "Click to edit Master title style")
        }
        PlaceholderRole::Subtitle => ("Subtitle Placeholder", "Click to edit Master subtitle style"),
        PlaceholderRole::Body => ("Text Placeholder", "Click to edit Master text styles"),
    };

    write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{} {}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>"#,
        id,
        name,
        id - 1
    )?;
    write_placeholder_ref(xml, role, idx)?;
    xml.push_str("</p:nvPr></p:nvSpPr>");

    match bounds {
        Some(bounds) => {
            xml.push_str("<p:spPr>");
            write_transform(xml, "a", bounds)?;
            xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#);
        }
        None => xml.push_str("<p:spPr/>"),
    }

    xml.push_str("<p:txBody>");
    match anchor {
        Some(anchor) => write!(xml, r#"<a:bodyPr anchor="{}"><a:normAutofit/></a:bodyPr>"#, anchor)?,
        None => xml.push_str("<a:bodyPr><a:normAutofit/></a:bodyPr>"),
    }
    if role == PlaceholderRole::Subtitle {
        xml.push_str(r#"<a:lstStyle><a:lvl1pPr marL="0" indent="0" algn="ctr"><a:buNone/></a:lvl1pPr></a:lstStyle>"#);
    } else {
        xml.push_str("<a:lstStyle/>");
    }
    write!(
        xml,
        r#"<a:p><a:r><a:rPr lang="en-US"/><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        prompt
    )
}

fn rel(number: usize, rel_type: &'static str, target: &str) -> Relationship {
    Relationship {
        id: format!("rId{}", number),
        rel_type,
        target: target.to_string(),
    }
}

/// Office color, font and format scheme.
pub(crate) const THEME_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2><a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2><a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4><a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6><a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#;
