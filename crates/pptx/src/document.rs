//! In-memory presentation model.
//!
//! A [`Document`] owns its slides; each [`Slide`] is created under one
//! [`LayoutKind`] that fixes its placeholder regions, and then receives text
//! and free-floating picture, table and chart shapes.

use crate::chart::Chart;
use crate::writer::PackageWriter;
use deck_core::{Error, Frame, LayoutKind, Result};

/// English Metric Units per inch.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// Slide width: 10 inches.
pub const SLIDE_WIDTH: i64 = 9_144_000;

/// Slide height: 7.5 inches.
pub const SLIDE_HEIGHT: i64 = 6_858_000;

/// Position and size of a shape in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Bounds {
    pub const fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// Convert an inch-based frame, truncating to whole EMUs.
    pub fn from_frame(frame: Frame) -> Self {
        Self {
            x: inches_to_emu(frame.left),
            y: inches_to_emu(frame.top),
            cx: inches_to_emu(frame.width),
            cy: inches_to_emu(frame.height),
        }
    }
}

fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH) as i64
}

/// The semantic role of a placeholder region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderRole {
    /// Centered title of a title slide.
    CenterTitle,
    /// Subtitle of a title slide.
    Subtitle,
    /// Regular slide title.
    Title,
    /// General content region that takes body text.
    Body,
}

impl PlaceholderRole {
    /// Value of the `type` attribute on `p:ph`, if any.
    pub fn ph_type(&self) -> Option<&'static str> {
        match self {
            Self::CenterTitle => Some("ctrTitle"),
            Self::Subtitle => Some("subTitle"),
            Self::Title => Some("title"),
            Self::Body => None,
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self, Self::CenterTitle | Self::Title)
    }

    fn shape_name(&self) -> &'static str {
        match self {
            Self::CenterTitle | Self::Title => "Title",
            Self::Subtitle => "Subtitle",
            Self::Body => "Content Placeholder",
        }
    }
}

/// A placeholder region as declared by a layout.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub role: PlaceholderRole,
    pub idx: u32,
    /// Geometry declared on the layout; `None` inherits the master's.
    pub bounds: Option<Bounds>,
}

const TITLE_SLIDE_REGIONS: &[Region] = &[
    Region {
        role: PlaceholderRole::CenterTitle,
        idx: 0,
        bounds: Some(Bounds::new(685_800, 2_130_425, 7_772_400, 1_470_025)),
    },
    Region {
        role: PlaceholderRole::Subtitle,
        idx: 1,
        bounds: Some(Bounds::new(1_371_600, 3_886_200, 6_400_800, 1_752_600)),
    },
];

const TITLE_AND_BODY_REGIONS: &[Region] = &[
    Region {
        role: PlaceholderRole::Title,
        idx: 0,
        bounds: None,
    },
    Region {
        role: PlaceholderRole::Body,
        idx: 1,
        bounds: None,
    },
];

const TITLE_ONLY_REGIONS: &[Region] = &[Region {
    role: PlaceholderRole::Title,
    idx: 0,
    bounds: None,
}];

/// Placeholder regions owned by a layout, in layout order.
pub fn layout_regions(layout: LayoutKind) -> &'static [Region] {
    match layout {
        LayoutKind::Title => TITLE_SLIDE_REGIONS,
        LayoutKind::TitleAndBody => TITLE_AND_BODY_REGIONS,
        LayoutKind::Content => TITLE_ONLY_REGIONS,
    }
}

/// One paragraph of a text frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub text: String,
    /// Font size in points; `None` inherits from the layout.
    pub font_size: Option<f64>,
}

/// Text content of a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFrame {
    paragraphs: Vec<Paragraph>,
    /// Shrink text when it overflows the frame.
    pub shrink_on_overflow: bool,
    /// Anchor text at the top of the frame.
    pub anchor_top: bool,
}

impl Default for TextFrame {
    fn default() -> Self {
        Self {
            paragraphs: vec![Paragraph::default()],
            shrink_on_overflow: false,
            anchor_top: false,
        }
    }
}

impl TextFrame {
    /// Replace the frame's text. Each line becomes a paragraph.
    pub fn set_text(&mut self, text: &str) {
        self.paragraphs = text
            .split('\n')
            .map(|line| Paragraph {
                text: line.to_string(),
                font_size: None,
            })
            .collect();
    }

    /// All text, paragraphs joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether the frame holds no text at all.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.iter().all(|p| p.text.is_empty())
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Set the font size of the first paragraph only.
    pub fn set_first_font_size(&mut self, points: f64) {
        if let Some(first) = self.paragraphs.first_mut() {
            first.font_size = Some(points);
        }
    }

    /// Set the font size of every paragraph.
    pub fn set_font_size(&mut self, points: f64) {
        for paragraph in &mut self.paragraphs {
            paragraph.font_size = Some(points);
        }
    }
}

/// A placeholder instantiated on a slide.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub id: u32,
    pub name: String,
    pub role: PlaceholderRole,
    pub idx: u32,
    pub text_frame: TextFrame,
}

impl Placeholder {
    /// Whether this region can take text. Every region the built-in layouts
    /// declare has a text frame.
    pub fn has_text_frame(&self) -> bool {
        true
    }
}

/// Raster formats accepted for pictures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Detect the format from the leading bytes of the image.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.starts_with(b"BM") {
            Some(Self::Bmp)
        } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            Some(Self::Tiff)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }
}

/// An embedded picture.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub format: ImageFormat,
    pub data: Vec<u8>,
}

/// A grid of text cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: usize,
    cells: Vec<Vec<String>>,
}

impl Table {
    /// Create a table of empty cells. Either dimension may be zero.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            columns,
            cells: vec![vec![String::new(); columns]; rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.cells.get(row)?.get(column).map(String::as_str)
    }

    /// Set the text of one cell.
    pub fn set_cell(&mut self, row: usize, column: usize, text: impl Into<String>) -> Result<()> {
        let (rows, columns) = (self.rows(), self.columns);
        let cell = self
            .cells
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
            .ok_or_else(|| {
                Error::ShapeConstruction(format!(
                    "cell ({}, {}) is outside a {}x{} table",
                    row, column, rows, columns
                ))
            })?;
        *cell = text.into();
        Ok(())
    }

    /// Rows of cell text.
    pub fn cells(&self) -> &[Vec<String>] {
        &self.cells
    }
}

/// What a shape contains.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeContent {
    Picture(Picture),
    Table(Table),
    Chart(Chart),
}

/// A free-floating shape on a slide.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: u32,
    pub name: String,
    pub bounds: Bounds,
    pub content: ShapeContent,
}

/// One slide of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    layout: LayoutKind,
    placeholders: Vec<Placeholder>,
    shapes: Vec<Shape>,
    next_shape_id: u32,
}

impl Slide {
    /// Instantiate a slide with the placeholders its layout declares.
    pub(crate) fn new(layout: LayoutKind) -> Self {
        // ID 1 belongs to the slide's shape tree.
        let mut next_shape_id = 2;
        let placeholders = layout_regions(layout)
            .iter()
            .map(|region| {
                let id = next_shape_id;
                next_shape_id += 1;
                Placeholder {
                    id,
                    name: format!("{} {}", region.role.shape_name(), id - 1),
                    role: region.role,
                    idx: region.idx,
                    text_frame: TextFrame::default(),
                }
            })
            .collect();

        Self {
            layout,
            placeholders,
            shapes: Vec::new(),
            next_shape_id,
        }
    }

    pub fn layout(&self) -> LayoutKind {
        self.layout
    }

    /// Placeholders in layout order.
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    pub fn placeholders_mut(&mut self) -> &mut [Placeholder] {
        &mut self.placeholders
    }

    /// The title placeholder, if the layout has one.
    pub fn title_mut(&mut self) -> Option<&mut Placeholder> {
        self.placeholders.iter_mut().find(|p| p.role.is_title())
    }

    /// The placeholder with the given layout index.
    pub fn placeholder_mut(&mut self, idx: u32) -> Option<&mut Placeholder> {
        self.placeholders.iter_mut().find(|p| p.idx == idx)
    }

    /// Free-floating shapes in insertion order.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Add a picture from raw image bytes.
    pub fn add_picture(&mut self, data: Vec<u8>, bounds: Bounds) -> Result<&Shape> {
        let format = ImageFormat::from_magic(&data).ok_or_else(|| {
            Error::ShapeConstruction("image data is not a recognized image format".to_string())
        })?;
        Ok(self.push_shape("Picture", bounds, ShapeContent::Picture(Picture { format, data })))
    }

    /// Add a table.
    pub fn add_table(&mut self, table: Table, bounds: Bounds) -> &Shape {
        self.push_shape("Table", bounds, ShapeContent::Table(table))
    }

    /// Add a chart.
    pub fn add_chart(&mut self, chart: Chart, bounds: Bounds) -> &Shape {
        self.push_shape("Chart", bounds, ShapeContent::Chart(chart))
    }

    fn push_shape(&mut self, kind: &str, bounds: Bounds, content: ShapeContent) -> &Shape {
        let id = self.next_shape_id;
        self.next_shape_id += 1;
        self.shapes.push(Shape {
            id,
            name: format!("{} {}", kind, id - 1),
            bounds,
            content,
        });
        &self.shapes[self.shapes.len() - 1]
    }
}

/// A complete presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    slides: Vec<Slide>,
    slide_width: i64,
    slide_height: i64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty 10" x 7.5" presentation.
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            slide_width: SLIDE_WIDTH,
            slide_height: SLIDE_HEIGHT,
        }
    }

    /// Append a slide under the given layout.
    pub fn add_slide(&mut self, layout: LayoutKind) -> &mut Slide {
        self.slides.push(Slide::new(layout));
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slide_width(&self) -> i64 {
        self.slide_width
    }

    pub fn slide_height(&self) -> i64 {
        self.slide_height
    }

    /// Serialize the document as a `.pptx` package.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::new(self).write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_inches() {
        let bounds = Bounds::from_frame(Frame::new(1.0, 3.0, 8.0, 2.0));
        assert_eq!(bounds, Bounds::new(914_400, 2_743_200, 7_315_200, 1_828_800));
    }

    #[test]
    fn test_layout_regions() {
        let title = layout_regions(LayoutKind::Title);
        assert_eq!(title.len(), 2);
        assert_eq!(title[1].role, PlaceholderRole::Subtitle);

        assert_eq!(layout_regions(LayoutKind::TitleAndBody).len(), 2);
        assert_eq!(layout_regions(LayoutKind::Content).len(), 1);
    }

    #[test]
    fn test_new_slide_placeholders() {
        let slide = Slide::new(LayoutKind::TitleAndBody);
        let ids: Vec<u32> = slide.placeholders().iter().map(|p| p.id).collect();

        assert_eq!(ids, vec![2, 3]);
        assert!(slide.placeholders().iter().all(|p| p.text_frame.is_empty()));
        assert!(slide.shapes().is_empty());
    }

    #[test]
    fn test_title_and_placeholder_lookup() {
        let mut slide = Slide::new(LayoutKind::Title);

        assert_eq!(slide.title_mut().unwrap().role, PlaceholderRole::CenterTitle);
        assert_eq!(slide.placeholder_mut(1).unwrap().role, PlaceholderRole::Subtitle);
        assert!(slide.placeholder_mut(2).is_none());
    }

    #[test]
    fn test_text_frame_paragraphs() {
        let mut frame = TextFrame::default();
        frame.set_text("one\ntwo");
        frame.set_first_font_size(36.0);

        assert_eq!(frame.paragraphs().len(), 2);
        assert_eq!(frame.paragraphs()[0].font_size, Some(36.0));
        assert_eq!(frame.paragraphs()[1].font_size, None);
        assert_eq!(frame.text(), "one\ntwo");

        frame.set_font_size(24.0);
        assert!(frame.paragraphs().iter().all(|p| p.font_size == Some(24.0)));
    }

    #[test]
    fn test_empty_text_keeps_frame_empty() {
        let mut frame = TextFrame::default();
        frame.set_text("");
        assert!(frame.is_empty());
        assert_eq!(frame.paragraphs().len(), 1);
    }

    #[test]
    fn test_image_format_from_magic() {
        assert_eq!(
            ImageFormat::from_magic(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0]),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_magic(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic(b"GIF89a..."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_magic(b"<html>"), None);
        assert_eq!(ImageFormat::from_magic(&[]), None);
    }

    #[test]
    fn test_add_picture_rejects_unknown_bytes() {
        let mut slide = Slide::new(LayoutKind::TitleAndBody);
        let err = slide.add_picture(b"not an image".to_vec(), Bounds::default()).unwrap_err();

        assert!(matches!(err, Error::ShapeConstruction(_)));
        assert!(slide.shapes().is_empty());
    }

    #[test]
    fn test_shape_ids_follow_placeholders() {
        let mut slide = Slide::new(LayoutKind::Content);
        let shape = slide.add_table(Table::new(1, 1), Bounds::default());

        assert_eq!(shape.id, 3);
        assert_eq!(shape.name, "Table 2");
    }

    #[test]
    fn test_table_cells() {
        let mut table = Table::new(2, 2);
        table.set_cell(1, 0, "c").unwrap();

        assert_eq!(table.cell(1, 0), Some("c"));
        assert_eq!(table.cell(0, 0), Some(""));
        assert!(table.set_cell(0, 2, "x").is_err());
        assert!(table.set_cell(2, 0, "x").is_err());
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new(0, 0);
        assert_eq!(table.rows(), 0);
        assert_eq!(table.columns(), 0);
    }

    #[test]
    fn test_document_slides_in_order() {
        let mut document = Document::new();
        document.add_slide(LayoutKind::Title);
        document.add_slide(LayoutKind::Content);

        let layouts: Vec<LayoutKind> = document.slides().iter().map(Slide::layout).collect();
        assert_eq!(layouts, vec![LayoutKind::Title, LayoutKind::Content]);
        assert_eq!(document.slide_width(), 9_144_000);
    }
}
