//! Placeholder binding for body text.

use crate::document::{Placeholder, Slide};

/// Find the region that receives a slide's body text.
///
/// Regions are scanned in layout order and the first one that takes text
/// and is still empty wins, whatever its role. `None` means the body text
/// has nowhere to go.
pub fn bind_body_region(slide: &mut Slide) -> Option<&mut Placeholder> {
    slide
        .placeholders_mut()
        .iter_mut()
        .find(|p| p.has_text_frame() && p.text_frame.is_empty())
}
