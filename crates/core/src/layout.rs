//! Layout selection for slides.

use crate::types::SlideSpec;

/// The structural template a slide is instantiated from.
///
/// The layout decides which placeholder regions a slide owns and is fixed
/// when the slide is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Centered title with a subtitle below; used for the opening slide.
    Title,
    /// Title with a body text region.
    TitleAndBody,
    /// Title only; charts and tables float freely below it.
    Content,
}

impl LayoutKind {
    /// Every layout, in template order.
    pub const ALL: [LayoutKind; 3] = [Self::Title, Self::TitleAndBody, Self::Content];

    /// Human-readable layout name, as it appears in the template.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Title => "Title Slide",
            Self::TitleAndBody => "Title and Content",
            Self::Content => "Title Only",
        }
    }

    /// 1-based position of the layout in the template.
    pub fn template_number(&self) -> usize {
        match self {
            Self::Title => 1,
            Self::TitleAndBody => 2,
            Self::Content => 3,
        }
    }

    /// Look a layout up by its 1-based template position.
    pub fn from_template_number(number: usize) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|layout| layout.template_number() == number)
    }
}

/// Choose the layout for a content slide.
///
/// Charts take precedence over tables; both resolve to [`LayoutKind::Content`].
/// Everything else gets [`LayoutKind::TitleAndBody`].
#[allow(clippy::if_same_then_else)]
pub fn select_layout(spec: &SlideSpec) -> LayoutKind {
    if spec.chart_data.is_some() {
        LayoutKind::Content
    } else if spec.table_data.is_some() {
        LayoutKind::Content
    } else {
        LayoutKind::TitleAndBody
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_slide_gets_title_and_body() {
        let spec = SlideSpec {
            body: Some("text".into()),
            ..Default::default()
        };
        assert_eq!(select_layout(&spec), LayoutKind::TitleAndBody);
        assert_eq!(select_layout(&SlideSpec::default()), LayoutKind::TitleAndBody);
    }

    #[test]
    fn test_chart_slide_gets_content() {
        let spec = SlideSpec {
            chart_data: Some(json!({})),
            ..Default::default()
        };
        assert_eq!(select_layout(&spec), LayoutKind::Content);
    }

    #[test]
    fn test_table_slide_gets_content() {
        let spec = SlideSpec {
            table_data: Some(json!([])),
            ..Default::default()
        };
        assert_eq!(select_layout(&spec), LayoutKind::Content);
    }

    #[test]
    fn test_images_do_not_change_layout() {
        let spec = SlideSpec {
            images: Some(json!([])),
            ..Default::default()
        };
        assert_eq!(select_layout(&spec), LayoutKind::TitleAndBody);
    }

    #[test]
    fn test_template_numbers_round_trip() {
        for layout in LayoutKind::ALL {
            assert_eq!(
                LayoutKind::from_template_number(layout.template_number()),
                Some(layout)
            );
        }
        assert_eq!(LayoutKind::from_template_number(7), None);
    }
}
