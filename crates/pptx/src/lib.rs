//! PPTX (Office Open XML) rendering backend.
//!
//! Builds an in-memory [`Document`] from a [`PresentationRequest`], binds
//! text to layout placeholders, composes pictures, tables and charts, and
//! writes the result as a `.pptx` package. Packages can be read back with
//! [`inspect`] for content-level comparison.
//!
//! [`PresentationRequest`]: deck_core::PresentationRequest

pub mod binder;
pub mod builder;
pub mod chart;
pub mod composer;
pub mod document;
pub mod inspect;
pub mod writer;

pub use binder::bind_body_region;
pub use builder::{Built, PresentationBuilder, Published, RenderOptions, RenderOutput};
pub use chart::{Chart, ChartData, ChartKind, ChartSeries, ChartTitle};
pub use composer::{Diagnostic, ShapeComposer, ShapeKind};
pub use document::{
    Bounds, Document, ImageFormat, Paragraph, Picture, Placeholder, PlaceholderRole, Shape,
    ShapeContent, Slide, Table, TextFrame,
};
pub use inspect::{inspect, DeckSummary, PptxInspector, SlideSummary, TableSummary};
pub use writer::PackageWriter;

use deck_core::{PresentationRequest, Result};

/// Render a request with a default HTTP-backed builder.
pub fn render(request: &PresentationRequest) -> Result<Vec<u8>> {
    let builder = PresentationBuilder::with_options(&RenderOptions::default())?;
    Ok(builder.render(request)?.bytes)
}
