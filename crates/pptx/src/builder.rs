//! Presentation builder: turns a request into a finished document.

use crate::binder::bind_body_region;
use crate::composer::{Diagnostic, ShapeComposer};
use crate::document::{Document, Slide};
use deck_core::fetch::{DEFAULT_FETCH_TIMEOUT, DEFAULT_USER_AGENT};
use deck_core::{
    select_layout, FileId, FileRegistry, HttpImageFetcher, ImageFetcher, LayoutKind,
    PresentationRequest, Result, SlideSpec, StoredFile, TextNormalizer, TitleSlideSpec,
};
use log::{debug, info};
use std::time::Duration;

/// Title of the opening slide when none is given.
pub const DEFAULT_DECK_TITLE: &str = "Presentation Title";

/// Font size of the opening slide's title, in points.
pub const DEFAULT_DECK_TITLE_FONT_SIZE: f64 = 54.0;

/// Font size of the opening slide's subtitle, in points.
pub const DEFAULT_SUBTITLE_FONT_SIZE: f64 = 32.0;

/// Title of a content slide when none is given.
pub const DEFAULT_SLIDE_TITLE: &str = "Untitled Slide";

/// Font size of a content slide's title, in points.
pub const DEFAULT_SLIDE_TITLE_FONT_SIZE: f64 = 36.0;

/// Font size of body text, in points.
pub const DEFAULT_BODY_FONT_SIZE: f64 = 24.0;

/// Settings for the collaborators a renderer creates for itself.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Bound on each image request.
    pub fetch_timeout: Duration,
    /// User-Agent sent with image requests.
    pub user_agent: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// A built document plus the shapes that were skipped along the way.
#[derive(Debug, Clone)]
pub struct Built {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
}

/// Serialized presentation bytes plus skipped-shape diagnostics.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub slide_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of rendering straight into a file registry.
#[derive(Debug, Clone)]
pub struct Published {
    pub id: FileId,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds presentations from requests.
///
/// A builder holds no per-request state, so one instance can serve any
/// number of requests; every call constructs a fresh [`Document`].
pub struct PresentationBuilder<F: ImageFetcher> {
    fetcher: F,
    normalizer: TextNormalizer,
}

impl PresentationBuilder<HttpImageFetcher> {
    /// Create a builder that fetches images over HTTP.
    pub fn with_options(options: &RenderOptions) -> Result<Self> {
        let fetcher = HttpImageFetcher::with_options(options.fetch_timeout, &options.user_agent)?;
        Ok(Self::new(fetcher))
    }
}

impl<F: ImageFetcher> PresentationBuilder<F> {
    /// Create a builder around an image fetcher.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            normalizer: TextNormalizer::new(),
        }
    }

    /// Build the document model without serializing it.
    pub fn build(&self, request: &PresentationRequest) -> Built {
        let deck = &request.slides;
        let mut document = Document::new();
        let mut diagnostics = Vec::new();

        debug!("Building presentation with {} slides", deck.slide_count());

        if let Some(title_slide) = &deck.title_slide {
            self.add_title_slide(&mut document, title_slide);
        }

        let composer = ShapeComposer::new(&self.fetcher, self.normalizer);
        for spec in &deck.content_slides {
            let slide_number = document.slide_count() + 1;
            let slide = document.add_slide(select_layout(spec));
            self.fill_content_slide(slide, spec);
            diagnostics.extend(composer.compose(slide, spec, slide_number));
        }

        Built {
            document,
            diagnostics,
        }
    }

    /// Build and serialize a presentation.
    pub fn render(&self, request: &PresentationRequest) -> Result<RenderOutput> {
        let Built {
            document,
            diagnostics,
        } = self.build(request);
        let bytes = document.to_bytes()?;

        info!(
            "Rendered {} slides ({} bytes, {} shapes skipped)",
            document.slide_count(),
            bytes.len(),
            diagnostics.len()
        );

        Ok(RenderOutput {
            bytes,
            slide_count: document.slide_count(),
            diagnostics,
        })
    }

    /// Parse a JSON request and render it.
    pub fn render_json(&self, input: &str) -> Result<RenderOutput> {
        let request = PresentationRequest::from_json(input)?;
        self.render(&request)
    }

    /// Render a presentation and hand the bytes to a registry.
    pub fn publish(
        &self,
        request: &PresentationRequest,
        registry: &dyn FileRegistry,
    ) -> Result<Published> {
        let output = self.render(request)?;
        let id = registry.store(StoredFile::presentation(output.bytes));
        debug!("Stored presentation as {}", id);

        Ok(Published {
            id,
            diagnostics: output.diagnostics,
        })
    }

    fn add_title_slide(&self, document: &mut Document, spec: &TitleSlideSpec) {
        let slide = document.add_slide(LayoutKind::Title);

        if let Some(title) = slide.title_mut() {
            let text = match spec.title.as_deref() {
                Some(raw) => self.normalizer.normalize(raw),
                None => DEFAULT_DECK_TITLE.to_string(),
            };
            title.text_frame.set_text(&text);
            title
                .text_frame
                .set_first_font_size(spec.title_font_size.unwrap_or(DEFAULT_DECK_TITLE_FONT_SIZE));
        }

        if let Some(raw) = spec.subtitle.as_deref() {
            match slide.placeholder_mut(1) {
                Some(subtitle) => {
                    let frame = &mut subtitle.text_frame;
                    frame.set_text(&self.normalizer.normalize(raw));
                    frame.set_first_font_size(
                        spec.subtitle_font_size.unwrap_or(DEFAULT_SUBTITLE_FONT_SIZE),
                    );
                    frame.shrink_on_overflow = true;
                    frame.anchor_top = true;
                }
                None => debug!("Title layout has no subtitle region; subtitle dropped"),
            }
        }
    }

    fn fill_content_slide(&self, slide: &mut Slide, spec: &SlideSpec) {
        if let Some(title) = slide.title_mut() {
            let text = match spec.title.as_deref() {
                Some(raw) => self.normalizer.normalize(raw),
                None => DEFAULT_SLIDE_TITLE.to_string(),
            };
            title.text_frame.set_text(&text);
            title
                .text_frame
                .set_first_font_size(spec.title_font_size.unwrap_or(DEFAULT_SLIDE_TITLE_FONT_SIZE));
        }

        if let Some(raw) = spec.body.as_deref() {
            match bind_body_region(slide) {
                Some(region) => {
                    let frame = &mut region.text_frame;
                    frame.set_text(&self.normalizer.normalize(raw));
                    frame.set_font_size(spec.body_font_size.unwrap_or(DEFAULT_BODY_FONT_SIZE));
                    frame.shrink_on_overflow = true;
                    frame.anchor_top = true;
                }
                None => debug!("No empty text region for body text; body dropped"),
            }
        }
    }
}
