//! Core request model, text normalization, layout selection and the
//! collaborator seams (image fetching, file hand-off) for slide deck
//! rendering.

pub mod error;
pub mod fetch;
pub mod layout;
pub mod normalize;
pub mod registry;
pub mod types;

pub use error::{Error, Result};
pub use fetch::{HttpImageFetcher, ImageFetcher};
pub use layout::{select_layout, LayoutKind};
pub use normalize::{normalize, TextNormalizer};
pub use registry::{FileId, FileRegistry, InMemoryRegistry, StoredFile};
pub use types::{
    BoxSpec, ChartSpec, Frame, ImageSpec, PresentationRequest, SeriesSpec, SlideDeck, SlideSpec,
    TitleSlideSpec,
};
