//! Chart part XML.
//!
//! Series data is written as inline string and number caches. Cell
//! references point at a notional `Sheet1` (categories in column A, one
//! column per series from B on) but no workbook is embedded.

use super::template::{NS_A, NS_C, NS_R};
use super::{centipoints, escape_text, XML_DECLARATION};
use crate::chart::{Chart, ChartFamily, ChartKind, ChartSeries, ChartTitle, Grouping};
use std::fmt::{self, Write as FmtWrite};

const CATEGORY_AXIS_ID: u32 = 1;
const VALUE_AXIS_ID: u32 = 2;

pub(crate) fn chart_xml(chart: &Chart) -> Result<String, fmt::Error> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<c:chartSpace xmlns:c="{}" xmlns:a="{}" xmlns:r="{}"><c:date1904 val="0"/><c:roundedCorners val="0"/><c:chart>"#,
        NS_C, NS_A, NS_R
    )?;

    match &chart.title {
        Some(title) => write_title(&mut xml, title)?,
        None => xml.push_str(r#"<c:autoTitleDeleted val="1"/>"#),
    }

    xml.push_str("<c:plotArea><c:layout/>");
    write_plot(&mut xml, chart)?;
    if chart.kind.family().has_axes() {
        write_axes(&mut xml, chart.kind)?;
    }
    xml.push_str("</c:plotArea>");

    if chart.has_legend {
        xml.push_str(r#"<c:legend><c:legendPos val="r"/><c:overlay val="0"/></c:legend>"#);
    }
    xml.push_str(r#"<c:plotVisOnly val="1"/><c:dispBlanksAs val="gap"/></c:chart></c:chartSpace>"#);
    Ok(xml)
}

fn write_title(xml: &mut String, title: &ChartTitle) -> fmt::Result {
    let size = centipoints(title.font_size);
    write!(
        xml,
        r#"<c:title><c:tx><c:rich><a:bodyPr/><a:lstStyle/><a:p><a:pPr><a:defRPr sz="{}"/></a:pPr><a:r><a:rPr lang="en-US" sz="{}"/><a:t>{}</a:t></a:r></a:p></c:rich></c:tx><c:overlay val="0"/></c:title><c:autoTitleDeleted val="0"/>"#,
        size,
        size,
        escape_text(&title.text)
    )
}

fn write_plot(xml: &mut String, chart: &Chart) -> fmt::Result {
    let kind = chart.kind;
    let family = kind.family();
    write!(xml, "<c:{}>", family.xml_element_name())?;

    match family {
        ChartFamily::Bar => {
            write!(
                xml,
                r#"<c:barDir val="{}"/><c:grouping val="{}"/><c:varyColors val="0"/>"#,
                kind.bar_direction().unwrap_or("col"),
                kind.grouping().as_str()
            )?;
        }
        ChartFamily::Line | ChartFamily::Area => {
            write!(
                xml,
                r#"<c:grouping val="{}"/><c:varyColors val="0"/>"#,
                kind.grouping().as_str()
            )?;
        }
        ChartFamily::Radar => {
            write!(
                xml,
                r#"<c:radarStyle val="{}"/><c:varyColors val="0"/>"#,
                kind.radar_style().unwrap_or("marker")
            )?;
        }
        ChartFamily::Pie | ChartFamily::Doughnut => {
            xml.push_str(r#"<c:varyColors val="1"/>"#);
        }
    }

    for (index, series) in chart.data.series.iter().enumerate() {
        write_series(xml, kind, index, series, &chart.data.categories)?;
    }

    match family {
        ChartFamily::Bar => {
            xml.push_str(r#"<c:gapWidth val="150"/>"#);
            if kind.grouping() != Grouping::Clustered {
                xml.push_str(r#"<c:overlap val="100"/>"#);
            }
        }
        ChartFamily::Line => xml.push_str(r#"<c:marker val="1"/>"#),
        ChartFamily::Pie => xml.push_str(r#"<c:firstSliceAng val="0"/>"#),
        ChartFamily::Doughnut => {
            xml.push_str(r#"<c:firstSliceAng val="0"/><c:holeSize val="50"/>"#)
        }
        ChartFamily::Area | ChartFamily::Radar => {}
    }

    if family.has_axes() {
        write!(
            xml,
            r#"<c:axId val="{}"/><c:axId val="{}"/>"#,
            CATEGORY_AXIS_ID, VALUE_AXIS_ID
        )?;
    }
    write!(xml, "</c:{}>", family.xml_element_name())
}

fn write_series(
    xml: &mut String,
    kind: ChartKind,
    index: usize,
    series: &ChartSeries,
    categories: &[String],
) -> fmt::Result {
    let family = kind.family();
    let column = column_letter(index + 1);

    write!(
        xml,
        r#"<c:ser><c:idx val="{i}"/><c:order val="{i}"/><c:tx><c:strRef><c:f>Sheet1!${col}$1</c:f><c:strCache><c:ptCount val="1"/><c:pt idx="0"><c:v>{}</c:v></c:pt></c:strCache></c:strRef></c:tx>"#,
        escape_text(&series.name),
        i = index,
        col = column
    )?;

    match family {
        ChartFamily::Bar => xml.push_str(r#"<c:invertIfNegative val="0"/>"#),
        ChartFamily::Line | ChartFamily::Radar if !kind.has_markers() => {
            xml.push_str(r#"<c:marker><c:symbol val="none"/></c:marker>"#)
        }
        ChartFamily::Pie | ChartFamily::Doughnut if kind.is_exploded() => {
            xml.push_str(r#"<c:explosion val="25"/>"#)
        }
        _ => {}
    }

    let last_row = categories.len().max(1) + 1;
    write!(
        xml,
        r#"<c:cat><c:strRef><c:f>Sheet1!$A$2:$A${}</c:f><c:strCache><c:ptCount val="{}"/>"#,
        last_row,
        categories.len()
    )?;
    for (idx, category) in categories.iter().enumerate() {
        write!(
            xml,
            r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#,
            idx,
            escape_text(category)
        )?;
    }
    xml.push_str("</c:strCache></c:strRef></c:cat>");

    let last_row = series.values.len().max(1) + 1;
    write!(
        xml,
        r#"<c:val><c:numRef><c:f>Sheet1!${col}$2:${col}${}</c:f><c:numCache><c:formatCode>General</c:formatCode><c:ptCount val="{}"/>"#,
        last_row,
        series.values.len(),
        col = column
    )?;
    for (idx, value) in series.values.iter().enumerate() {
        if let Some(value) = value {
            write!(xml, r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#, idx, value)?;
        }
    }
    xml.push_str("</c:numCache></c:numRef></c:val>");

    if family == ChartFamily::Line {
        xml.push_str(r#"<c:smooth val="0"/>"#);
    }
    xml.push_str("</c:ser>");
    Ok(())
}

fn write_axes(xml: &mut String, kind: ChartKind) -> fmt::Result {
    let horizontal_bars = kind.bar_direction() == Some("bar");
    let (category_pos, value_pos) = if horizontal_bars { ("l", "b") } else { ("b", "l") };
    let cross_between = if kind.family() == ChartFamily::Area {
        "midCat"
    } else {
        "between"
    };

    write!(
        xml,
        r#"<c:catAx><c:axId val="{cat}"/><c:scaling><c:orientation val="minMax"/></c:scaling><c:delete val="0"/><c:axPos val="{}"/><c:majorTickMark val="out"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:crossAx val="{val}"/><c:crosses val="autoZero"/><c:auto val="1"/><c:lblAlgn val="ctr"/><c:lblOffset val="100"/><c:noMultiLvlLbl val="0"/></c:catAx>"#,
        category_pos,
        cat = CATEGORY_AXIS_ID,
        val = VALUE_AXIS_ID
    )?;
    write!(
        xml,
        r#"<c:valAx><c:axId val="{val}"/><c:scaling><c:orientation val="minMax"/></c:scaling><c:delete val="0"/><c:axPos val="{}"/><c:majorGridlines/><c:numFmt formatCode="General" sourceLinked="1"/><c:majorTickMark val="out"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:crossAx val="{cat}"/><c:crosses val="autoZero"/><c:crossBetween val="{}"/></c:valAx>"#,
        value_pos,
        cross_between,
        cat = CATEGORY_AXIS_ID,
        val = VALUE_AXIS_ID
    )
}

/// Spreadsheet column name for a 0-based index: 0 is `A`, 26 is `AA`.
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'A' + (index % 26) as u8));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartData;

    fn sample(kind: ChartKind) -> Chart {
        let mut data = ChartData::new(vec!["Q1".into(), "Q2".into(), "Q3".into()]);
        data.add_series("Sales", vec![Some(10.0), None, Some(2.5)]);
        data.add_series("Costs", vec![Some(4.0), Some(5.0), Some(6.0)]);
        Chart::new(kind, data)
    }

    #[test]
    fn test_column_chart() {
        let xml = chart_xml(&sample(ChartKind::ColumnClustered)).unwrap();

        assert!(xml.contains(r#"<c:barChart><c:barDir val="col"/><c:grouping val="clustered"/>"#));
        assert!(xml.contains("<c:v>Sales</c:v>"));
        assert!(xml.contains("<c:f>Sheet1!$C$2:$C$4</c:f>"));
        assert!(xml.contains(r#"<c:ptCount val="3"/><c:pt idx="0"><c:v>Q1</c:v></c:pt>"#));
        assert!(xml.contains("<c:catAx>"));
        assert!(xml.contains(r#"<c:legendPos val="r"/>"#));
        assert!(xml.contains(r#"<c:autoTitleDeleted val="1"/>"#));
        assert!(!xml.contains("<c:overlap"));
    }

    #[test]
    fn test_missing_values_are_gaps() {
        let xml = chart_xml(&sample(ChartKind::Line)).unwrap();

        assert!(xml.contains(r#"<c:pt idx="0"><c:v>10</c:v></c:pt><c:pt idx="2"><c:v>2.5</c:v></c:pt>"#));
        assert!(xml.contains(r#"<c:symbol val="none"/>"#));
    }

    #[test]
    fn test_pie_has_no_axes() {
        let xml = chart_xml(&sample(ChartKind::PieExploded)).unwrap();

        assert!(xml.contains(r#"<c:pieChart><c:varyColors val="1"/>"#));
        assert!(xml.contains(r#"<c:explosion val="25"/>"#));
        assert!(!xml.contains("<c:catAx>"));
        assert!(!xml.contains("<c:axId"));
    }

    #[test]
    fn test_stacked_bar() {
        let xml = chart_xml(&sample(ChartKind::BarStacked100)).unwrap();

        assert!(xml.contains(r#"<c:barDir val="bar"/><c:grouping val="percentStacked"/>"#));
        assert!(xml.contains(r#"<c:overlap val="100"/>"#));
        assert!(xml.contains(r#"<c:catAx><c:axId val="1"/><c:scaling><c:orientation val="minMax"/></c:scaling><c:delete val="0"/><c:axPos val="l"/>"#));
    }

    #[test]
    fn test_title_and_hidden_legend() {
        let mut chart = sample(ChartKind::Doughnut);
        chart.has_legend = false;
        chart.title = Some(ChartTitle {
            text: "Mix & Match".into(),
            font_size: 18.0,
        });

        let xml = chart_xml(&chart).unwrap();
        assert!(xml.contains(r#"<a:rPr lang="en-US" sz="1800"/><a:t>Mix &amp; Match</a:t>"#));
        assert!(!xml.contains("<c:legend>"));
        assert!(xml.contains(r#"<c:holeSize val="50"/>"#));
    }

    #[test]
    fn test_radar_filled() {
        let xml = chart_xml(&sample(ChartKind::RadarFilled)).unwrap();
        assert!(xml.contains(r#"<c:radarChart><c:radarStyle val="filled"/>"#));
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(1), "B");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }
}
