//! Device-frame overlay.

use std::sync::Arc;

use clipshape_media_model::Rect;
use image::DynamicImage;

use crate::composition::{OverlayImage, PostProcessing, VideoComposition};
use crate::extraction::Extraction;

/// Build the transform description for compositing `image` over the video.
///
/// The video keeps its preferred transform unscaled on a canvas of the
/// source's natural size; the image is placed at the canvas origin at its
/// native pixel size.
pub fn build_overlay_composition(extraction: &Extraction, image: &DynamicImage) -> VideoComposition {
    let canvas = extraction.natural_size();
    let rgba = image.to_rgba8();
    let frame = Rect::new(0.0, 0.0, rgba.width() as f64, rgba.height() as f64);

    tracing::debug!(
        canvas_width = canvas.width,
        canvas_height = canvas.height,
        overlay_width = frame.size.width,
        overlay_height = frame.size.height,
        "Overlay composition built"
    );

    VideoComposition::new(
        canvas,
        extraction.instruction_with_transform(extraction.preferred_transform()),
    )
    .with_post_processing(PostProcessing::ImageOverlay {
        canvas,
        overlay: OverlayImage {
            image: Arc::new(rgba),
            frame,
        },
    })
}
