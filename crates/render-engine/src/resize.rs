//! Resize, aspect-fit, and rounded-corner mask.

use clipshape_common::error::{EditorError, EditorResult};
use clipshape_media_model::{aspect_fit, OrientationInfo, Rect, Size};

use crate::composition::{PostProcessing, VideoComposition};
use crate::extraction::Extraction;

/// How the source is placed in the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOptions {
    /// Fit the source inside the target box preserving its aspect ratio.
    /// Otherwise the source is stretched to the full box.
    pub keep_aspect_ratio: bool,
    /// Drop the letterbox offset. Combined with `keep_aspect_ratio`, the
    /// output is rendered at the fitted size instead of the target size.
    pub cut_black_edge: bool,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            keep_aspect_ratio: true,
            cut_black_edge: false,
        }
    }
}

/// Natural size as displayed, i.e. with axes swapped for quarter turns.
pub fn display_natural_size(natural: Size, orientation: &OrientationInfo) -> Size {
    if orientation.swaps_axes() {
        natural.transposed()
    } else {
        natural
    }
}

/// Reject targets larger than the source in both dimensions.
///
/// Upscaling along one axis is allowed as long as the other axis does not
/// also exceed the source.
pub fn check_target_size(display_size: Size, target: Size) -> EditorResult<()> {
    let too_large = display_size.width < target.width && display_size.height < target.height;
    if too_large || target.is_empty() {
        return Err(EditorError::TargetSizeNotCorrect {
            target_width: target.width,
            target_height: target.height,
            source_width: display_size.width,
            source_height: display_size.height,
        });
    }
    Ok(())
}

/// Build the transform description for a resize.
pub fn build_resize_composition(
    extraction: &Extraction,
    target: Size,
    options: ResizeOptions,
    corner_radius: Option<f64>,
) -> EditorResult<VideoComposition> {
    let orientation = extraction.orientation();
    let display_size = display_natural_size(extraction.natural_size(), &orientation);
    check_target_size(display_size, target)?;

    let target_box = Rect::from_size(target);
    let fit = if options.keep_aspect_ratio {
        aspect_fit(display_size, target_box)
    } else {
        target_box
    };

    let scaled = extraction.preferred_transform().then_scale(
        fit.size.width / display_size.width,
        fit.size.height / display_size.height,
    );
    let transform = if options.cut_black_edge {
        scaled
    } else {
        scaled.then_translate(fit.origin.x, fit.origin.y)
    };

    let render_size = if options.cut_black_edge && options.keep_aspect_ratio {
        fit.size
    } else {
        target
    };

    tracing::debug!(
        ?orientation,
        display_width = display_size.width,
        display_height = display_size.height,
        fit_x = fit.origin.x,
        fit_y = fit.origin.y,
        fit_width = fit.size.width,
        fit_height = fit.size.height,
        render_width = render_size.width,
        render_height = render_size.height,
        "Resize composition built"
    );

    let composition =
        VideoComposition::new(render_size, extraction.instruction_with_transform(transform));

    Ok(match corner_radius.filter(|r| *r > 0.0) {
        Some(radius) => composition.with_post_processing(PostProcessing::RoundedMask {
            canvas: target,
            corner_radius: radius,
        }),
        None => composition,
    })
}
