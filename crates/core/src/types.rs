//! Request types describing the presentation to render.
//!
//! Keys are accepted in camelCase (`titleFontSize`) as well as the older
//! snake_case spelling (`title_font_size`).

use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// A box on the slide, measured in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    /// Create a frame from its four sides, in inches.
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// A caller-supplied position. Sides that are left out fall back to the
/// matching side of a default frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct BoxSpec {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl BoxSpec {
    /// Read a position from raw request JSON. `null` means no position.
    pub fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value.clone())
            .map_err(|e| Error::ShapeConstruction(format!("invalid position: {}", e)))
    }

    /// Fill in missing sides from `default`.
    pub fn resolve(&self, default: Frame) -> Frame {
        Frame {
            left: self.left.unwrap_or(default.left),
            top: self.top.unwrap_or(default.top),
            width: self.width.unwrap_or(default.width),
            height: self.height.unwrap_or(default.height),
        }
    }
}

/// A picture to place on a slide.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageSpec {
    /// Location of the image bytes. An entry without a URL fails on its own
    /// instead of rejecting the whole request.
    pub url: String,
    pub position: BoxSpec,
}

impl ImageSpec {
    /// Read one `images` entry.
    ///
    /// A `url` that is not a string is an [`Error::ImageFetch`]; a malformed
    /// entry or position is an [`Error::ShapeConstruction`].
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::ShapeConstruction(format!(
                "image entry must be an object, found {}",
                json_kind(value)
            )));
        };

        let url = match map.get("url") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(url)) => url.clone(),
            Some(other) => {
                return Err(Error::ImageFetch {
                    url: other.to_string(),
                    reason: format!("url must be a string, found {}", json_kind(other)),
                })
            }
        };

        Ok(Self {
            url,
            position: BoxSpec::from_value(value)?,
        })
    }
}

/// One named series of chart values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SeriesSpec {
    #[serde(default)]
    pub name: String,

    /// Values in category order; `null` leaves a gap.
    #[serde(default)]
    pub values: Vec<Option<f64>>,
}

/// A category chart.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    /// Chart kind identifier such as `COLUMN_CLUSTERED`.
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Category labels. Numbers and other scalars are accepted and
    /// converted with [`cell_text`].
    #[serde(default)]
    pub categories: Vec<Value>,

    #[serde(default)]
    pub series: Vec<SeriesSpec>,

    pub title: Option<String>,

    #[serde(alias = "title_font_size")]
    pub title_font_size: Option<f64>,

    #[serde(alias = "has_legend")]
    pub has_legend: Option<bool>,

    #[serde(alias = "chart_position")]
    pub chart_position: Option<BoxSpec>,
}

impl ChartSpec {
    /// Read a `chartData` object.
    ///
    /// A `type` that is not a string is an [`Error::UnsupportedChartKind`];
    /// any other malformed field is an [`Error::ShapeConstruction`].
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::ShapeConstruction(format!(
                "chart data must be an object, found {}",
                json_kind(value)
            )));
        };

        let mut map = map.clone();
        let kind = match map.remove("type") {
            None | Some(Value::Null) => None,
            Some(Value::String(kind)) => Some(kind),
            Some(other) => return Err(Error::UnsupportedChartKind(other.to_string())),
        };

        let mut spec: Self = serde_json::from_value(Value::Object(map))
            .map_err(|e| Error::ShapeConstruction(format!("invalid chart data: {}", e)))?;
        spec.kind = kind;
        Ok(spec)
    }

    /// Category labels as text.
    pub fn category_labels(&self) -> Vec<String> {
        self.categories.iter().map(cell_text).collect()
    }
}

/// The content of one slide.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideSpec {
    pub title: Option<String>,

    #[serde(alias = "title_font_size")]
    pub title_font_size: Option<f64>,

    pub body: Option<String>,

    #[serde(alias = "body_font_size")]
    pub body_font_size: Option<f64>,

    /// Image entries, read one at a time with [`ImageSpec::from_value`] so
    /// that a bad entry only costs its own picture.
    pub images: Option<Value>,

    /// Table rows; each cell may be any JSON scalar. Read with
    /// [`table_rows`].
    #[serde(alias = "table_data")]
    pub table_data: Option<Value>,

    /// Read with [`BoxSpec::from_value`].
    #[serde(alias = "table_position")]
    pub table_position: Option<Value>,

    /// Read with [`ChartSpec::from_value`].
    #[serde(alias = "chart_data")]
    pub chart_data: Option<Value>,
}

/// The optional opening slide.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleSlideSpec {
    pub title: Option<String>,

    #[serde(alias = "title_font_size")]
    pub title_font_size: Option<f64>,

    pub subtitle: Option<String>,

    #[serde(alias = "subtitle_font_size")]
    pub subtitle_font_size: Option<f64>,
}

/// The slides of a request, after the accepted input shapes have been
/// reconciled.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct SlideDeck {
    pub title_slide: Option<TitleSlideSpec>,
    pub content_slides: Vec<SlideSpec>,
}

impl TryFrom<Value> for SlideDeck {
    type Error = String;

    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        Self::from_value(value).map_err(|err| match err {
            Error::MalformedRequest(reason) => reason,
            other => other.to_string(),
        })
    }
}

impl SlideDeck {
    /// Accepts `{contentSlides, titleSlide?}`, a bare list of slides, or a
    /// single slide object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(_) => Ok(Self {
                title_slide: None,
                content_slides: serde_json::from_value(value)?,
            }),
            Value::Object(mut map) => {
                let title_slide = take_key(&mut map, "titleSlide", "title_slide")
                    .filter(|v| !v.is_null())
                    .map(serde_json::from_value)
                    .transpose()?;

                match take_key(&mut map, "contentSlides", "content_slides") {
                    Some(content) => Ok(Self {
                        title_slide,
                        content_slides: serde_json::from_value(content)?,
                    }),
                    None if title_slide.is_some() => Err(Error::MalformedRequest(
                        "`slides` has a title slide but no `contentSlides`".to_string(),
                    )),
                    None => Ok(Self {
                        title_slide: None,
                        content_slides: vec![serde_json::from_value(Value::Object(map))?],
                    }),
                }
            }
            other => Err(Error::MalformedRequest(format!(
                "`slides` must be an object or a list, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Number of slides the rendered document will contain.
    pub fn slide_count(&self) -> usize {
        self.content_slides.len() + usize::from(self.title_slide.is_some())
    }
}

/// Top-level render request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PresentationRequest {
    pub slides: SlideDeck,
}

impl PresentationRequest {
    /// Parse a request from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parse a request from raw JSON bytes.
    pub fn from_slice(input: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(input)?)
    }
}

/// Text form of a JSON value placed in a table cell or category label.
///
/// Strings are used as-is, numbers and booleans use their JSON spelling,
/// `null` becomes the empty string and containers are written as compact
/// JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Read `tableData` as rows of cells.
pub fn table_rows(value: &Value) -> Result<Vec<Vec<Value>>> {
    serde_json::from_value(value.clone())
        .map_err(|e| Error::ShapeConstruction(format!("table data must be a list of rows: {}", e)))
}

fn take_key(map: &mut Map<String, Value>, key: &str, legacy: &str) -> Option<Value> {
    map.remove(key).or_else(|| map.remove(legacy))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_box_spec_resolve_partial() {
        let spec = BoxSpec {
            left: Some(2.0),
            height: Some(5.0),
            ..Default::default()
        };
        let frame = spec.resolve(Frame::new(1.0, 3.0, 8.0, 2.0));
        assert_eq!(frame, Frame::new(2.0, 3.0, 8.0, 5.0));
    }

    #[test]
    fn test_deck_shape() {
        let request = PresentationRequest::from_json(
            r#"{"slides": {"titleSlide": {"title": "Hello"}, "contentSlides": [{"title": "A"}, {"title": "B"}]}}"#,
        )
        .unwrap();

        let deck = request.slides;
        assert_eq!(deck.title_slide.unwrap().title.as_deref(), Some("Hello"));
        assert_eq!(deck.content_slides.len(), 2);
        assert_eq!(deck.content_slides[1].title.as_deref(), Some("B"));
    }

    #[test]
    fn test_single_slide_shape() {
        let request =
            PresentationRequest::from_json(r#"{"slides": {"title": "Only", "body": "text"}}"#)
                .unwrap();

        assert!(request.slides.title_slide.is_none());
        assert_eq!(request.slides.content_slides.len(), 1);
        assert_eq!(request.slides.content_slides[0].title.as_deref(), Some("Only"));
    }

    #[test]
    fn test_list_shape() {
        let request =
            PresentationRequest::from_json(r#"{"slides": [{"title": "One"}, {"title": "Two"}]}"#)
                .unwrap();

        assert!(request.slides.title_slide.is_none());
        assert_eq!(request.slides.content_slides.len(), 2);
    }

    #[test]
    fn test_empty_content_slides_is_valid() {
        let request = PresentationRequest::from_json(r#"{"slides": {"contentSlides": []}}"#).unwrap();
        assert_eq!(request.slides.slide_count(), 0);
    }

    #[test]
    fn test_snake_case_keys() {
        let request = PresentationRequest::from_json(
            r#"{"slides": {"title_slide": {"title": "T", "subtitle_font_size": 20},
                "content_slides": [{"title": "A", "title_font_size": 40, "body_font_size": 18,
                "table_data": [["a"]], "table_position": {"left": 2},
                "chart_data": {"type": "PIE", "has_legend": false, "chart_position": {"top": 1}}}]}}"#,
        )
        .unwrap();

        let deck = request.slides;
        assert_eq!(deck.title_slide.unwrap().subtitle_font_size, Some(20.0));

        let slide = &deck.content_slides[0];
        assert_eq!(slide.title_font_size, Some(40.0));
        assert_eq!(slide.body_font_size, Some(18.0));
        let position = BoxSpec::from_value(slide.table_position.as_ref().unwrap()).unwrap();
        assert_eq!(position.left, Some(2.0));
        assert_eq!(table_rows(slide.table_data.as_ref().unwrap()).unwrap(), vec![vec![json!("a")]]);

        let chart = ChartSpec::from_value(slide.chart_data.as_ref().unwrap()).unwrap();
        assert_eq!(chart.kind.as_deref(), Some("PIE"));
        assert_eq!(chart.has_legend, Some(false));
        assert_eq!(chart.chart_position.unwrap().top, Some(1.0));
    }

    #[test]
    fn test_missing_slides_is_malformed() {
        let err = PresentationRequest::from_json(r#"{"deck": []}"#).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_title_slide_without_content_is_malformed() {
        let err = PresentationRequest::from_json(r#"{"slides": {"titleSlide": {"title": "T"}}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedRequest(_)));
    }

    #[test]
    fn test_content_slides_must_be_list() {
        let err = PresentationRequest::from_json(r#"{"slides": {"contentSlides": "nope"}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedRequest(_)));
    }

    #[test]
    fn test_scalar_slides_is_malformed() {
        let err = PresentationRequest::from_json(r#"{"slides": 3}"#).unwrap_err();
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = PresentationRequest::from_json("{slides:").unwrap_err();
        assert!(matches!(err, Error::MalformedRequest(_)));
    }

    #[test]
    fn test_image_without_url_still_parses() {
        let request = PresentationRequest::from_json(
            r#"{"slides": [{"images": [{"left": 4}, {"url": "http://x/y.png", "width": 2.5}]}]}"#,
        )
        .unwrap();

        let images = request.slides.content_slides[0].images.as_ref().unwrap();
        let first = ImageSpec::from_value(&images[0]).unwrap();
        let second = ImageSpec::from_value(&images[1]).unwrap();
        assert_eq!(first.url, "");
        assert_eq!(first.position.left, Some(4.0));
        assert_eq!(second.url, "http://x/y.png");
        assert_eq!(second.position.width, Some(2.5));
    }

    #[test]
    fn test_badly_typed_shapes_still_parse() {
        let request = PresentationRequest::from_json(
            r#"{"slides": [{"title": "Mixed",
                "images": [{"url": 123}],
                "tableData": "not rows",
                "chartData": {"type": 5, "categories": ["A"], "series": [{"name": "s", "values": ["1"]}]}}]}"#,
        )
        .unwrap();

        let slide = &request.slides.content_slides[0];
        assert_eq!(slide.title.as_deref(), Some("Mixed"));
        assert!(slide.images.is_some());
        assert!(slide.table_data.is_some());
        assert!(slide.chart_data.is_some());
    }

    #[test]
    fn test_image_url_must_be_string() {
        let err = ImageSpec::from_value(&json!({"url": 123})).unwrap_err();
        assert!(matches!(err, Error::ImageFetch { ref url, .. } if url == "123"));

        let err = ImageSpec::from_value(&json!("http://x/y.png")).unwrap_err();
        assert!(matches!(err, Error::ShapeConstruction(_)));

        let err = ImageSpec::from_value(&json!({"url": "http://x/y.png", "left": "2"})).unwrap_err();
        assert!(matches!(err, Error::ShapeConstruction(_)));
    }

    #[test]
    fn test_chart_type_must_be_string() {
        let err = ChartSpec::from_value(&json!({"type": 5, "categories": []})).unwrap_err();
        assert!(matches!(err, Error::UnsupportedChartKind(ref kind) if kind == "5"));

        let chart = ChartSpec::from_value(&json!({"type": null, "categories": []})).unwrap();
        assert!(chart.kind.is_none());
    }

    #[test]
    fn test_bad_chart_fields_are_shape_errors() {
        let err = ChartSpec::from_value(&json!({"series": [{"name": "s", "values": ["1"]}]}))
            .unwrap_err();
        assert!(matches!(err, Error::ShapeConstruction(_)));

        let err = ChartSpec::from_value(&json!({"hasLegend": "yes"})).unwrap_err();
        assert!(matches!(err, Error::ShapeConstruction(_)));

        let err = ChartSpec::from_value(&json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("a list"));
    }

    #[test]
    fn test_table_rows() {
        assert_eq!(table_rows(&json!([])).unwrap(), Vec::<Vec<Value>>::new());
        assert!(matches!(
            table_rows(&json!("not rows")),
            Err(Error::ShapeConstruction(_))
        ));
        assert!(table_rows(&json!([["a"], "b"])).is_err());
    }

    #[test]
    fn test_null_position_is_default() {
        assert_eq!(BoxSpec::from_value(&Value::Null).unwrap(), BoxSpec::default());
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!("a")), "a");
        assert_eq!(cell_text(&json!(3)), "3");
        assert_eq!(cell_text(&json!(2.5)), "2.5");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&Value::Null), "");
        assert_eq!(cell_text(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_numeric_categories() {
        let chart: ChartSpec =
            serde_json::from_value(json!({"categories": [2023, "2024"], "series": []})).unwrap();
        assert_eq!(chart.category_labels(), vec!["2023", "2024"]);
    }

    #[test]
    fn test_series_with_gaps() {
        let series: SeriesSpec =
            serde_json::from_value(json!({"name": "S", "values": [1, null, 3.5]})).unwrap();
        assert_eq!(series.values, vec![Some(1.0), None, Some(3.5)]);
    }
}
