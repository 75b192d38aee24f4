//! Picture, table and chart insertion.
//!
//! Each insertion returns its own `Result`. [`ShapeComposer::compose`] runs
//! them in a fixed order (images, then the table, then the chart), logs every
//! failure and turns it into a [`Diagnostic`] so that one broken shape never
//! costs the rest of the slide.

use crate::chart::{Chart, ChartData, ChartKind, ChartTitle};
use crate::document::{Bounds, Slide, Table};
use deck_core::types::{cell_text, table_rows};
use deck_core::{
    BoxSpec, ChartSpec, Error, Frame, ImageFetcher, ImageSpec, Result, SlideSpec, TextNormalizer,
};
use log::warn;
use serde_json::Value;
use std::fmt;

/// Default picture box, in inches.
pub const DEFAULT_IMAGE_FRAME: Frame = Frame::new(1.0, 1.0, 3.0, 2.0);

/// Default table box, in inches.
pub const DEFAULT_TABLE_FRAME: Frame = Frame::new(1.0, 3.0, 8.0, 2.0);

/// Default chart box, in inches.
pub const DEFAULT_CHART_FRAME: Frame = Frame::new(1.0, 3.0, 6.0, 4.0);

/// Chart kind used when a chart names none.
pub const DEFAULT_CHART_KIND: ChartKind = ChartKind::ColumnClustered;

/// Chart title font size in points.
pub const DEFAULT_CHART_TITLE_FONT_SIZE: f64 = 18.0;

/// The kind of shape a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Picture,
    Table,
    Chart,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Picture => "picture",
            Self::Table => "table",
            Self::Chart => "chart",
        })
    }
}

/// A shape that was skipped, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 1-based position of the slide in the finished document.
    pub slide: usize,
    pub shape: ShapeKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slide {}: {} skipped: {}", self.slide, self.shape, self.message)
    }
}

/// Adds free-floating shapes to a slide.
pub struct ShapeComposer<'a> {
    fetcher: &'a dyn ImageFetcher,
    normalizer: TextNormalizer,
}

impl<'a> ShapeComposer<'a> {
    pub fn new(fetcher: &'a dyn ImageFetcher, normalizer: TextNormalizer) -> Self {
        Self {
            fetcher,
            normalizer,
        }
    }

    /// Add every picture, table and chart `spec` describes.
    pub fn compose(&self, slide: &mut Slide, spec: &SlideSpec, slide_number: usize) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut record = |shape: ShapeKind, err: Error| {
            warn!("Slide {}: skipping {}: {}", slide_number, shape, err);
            diagnostics.push(Diagnostic {
                slide: slide_number,
                shape,
                message: err.to_string(),
            });
        };

        match &spec.images {
            Some(Value::Array(images)) => {
                for image in images {
                    if let Err(e) = self.insert_picture(slide, image) {
                        record(ShapeKind::Picture, e);
                    }
                }
            }
            Some(other) => record(
                ShapeKind::Picture,
                Error::ShapeConstruction(format!("images must be a list, found {}", other)),
            ),
            None => {}
        }

        if let Some(rows) = &spec.table_data {
            if let Err(e) = self.insert_table(slide, rows, spec.table_position.as_ref()) {
                record(ShapeKind::Table, e);
            }
        }

        if let Some(chart) = &spec.chart_data {
            if let Err(e) = self.insert_chart(slide, chart) {
                record(ShapeKind::Chart, e);
            }
        }

        diagnostics
    }

    /// Fetch one image and place it.
    pub fn insert_picture(&self, slide: &mut Slide, image: &Value) -> Result<()> {
        let image = ImageSpec::from_value(image)?;
        if image.url.trim().is_empty() {
            return Err(Error::ImageFetch {
                url: image.url,
                reason: "image has no url".to_string(),
            });
        }

        let data = self.fetcher.fetch(&image.url)?;
        let bounds = Bounds::from_frame(image.position.resolve(DEFAULT_IMAGE_FRAME));
        slide.add_picture(data, bounds)?;
        Ok(())
    }

    /// Build a table from `tableData` and place it.
    pub fn insert_table(
        &self,
        slide: &mut Slide,
        rows: &Value,
        position: Option<&Value>,
    ) -> Result<()> {
        let table = build_table(&table_rows(rows)?)?;
        let position = match position {
            Some(value) => BoxSpec::from_value(value)?,
            None => BoxSpec::default(),
        };
        let frame = position.resolve(DEFAULT_TABLE_FRAME);
        slide.add_table(table, Bounds::from_frame(frame));
        Ok(())
    }

    /// Build a chart from `chartData` and place it.
    pub fn insert_chart(&self, slide: &mut Slide, chart: &Value) -> Result<()> {
        let spec = ChartSpec::from_value(chart)?;
        let chart = self.build_chart(&spec)?;
        let frame = spec
            .chart_position
            .unwrap_or_default()
            .resolve(DEFAULT_CHART_FRAME);
        slide.add_chart(chart, Bounds::from_frame(frame));
        Ok(())
    }

    fn build_chart(&self, spec: &ChartSpec) -> Result<Chart> {
        let kind = match spec.kind.as_deref() {
            Some(identifier) => ChartKind::parse(identifier)?,
            None => DEFAULT_CHART_KIND,
        };

        let mut data = ChartData::new(spec.category_labels());
        for series in &spec.series {
            data.add_series(series.name.clone(), series.values.clone());
        }

        let mut chart = Chart::new(kind, data);
        chart.has_legend = spec.has_legend.unwrap_or(true);

        let title = self.normalizer.normalize_opt(spec.title.as_deref());
        if !title.is_empty() {
            chart.title = Some(ChartTitle {
                text: title,
                font_size: spec.title_font_size.unwrap_or(DEFAULT_CHART_TITLE_FONT_SIZE),
            });
        }

        Ok(chart)
    }
}

/// Convert rows of JSON values into a table.
///
/// The first row fixes the column count. Shorter rows are padded with empty
/// cells; a longer row is an error.
pub fn build_table(rows: &[Vec<Value>]) -> Result<Table> {
    let columns = rows.first().map_or(0, Vec::len);
    let mut table = Table::new(rows.len(), columns);

    for (r, row) in rows.iter().enumerate() {
        if row.len() > columns {
            return Err(Error::ShapeConstruction(format!(
                "table row {} has {} cells but the table has {} columns",
                r + 1,
                row.len(),
                columns
            )));
        }
        for (c, value) in row.iter().enumerate() {
            table.set_cell(r, c, cell_text(value))?;
        }
    }

    Ok(table)
}
