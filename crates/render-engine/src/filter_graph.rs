//! Compiling a [`VideoComposition`] into an ffmpeg `-filter_complex` graph.
//!
//! The layer transform is realised as an orientation filter
//! (`transpose`/`hflip`/`vflip`), a `scale` to the transformed bounds, and an
//! `overlay` onto a black canvas of the render size. Only axis-aligned linear
//! parts (quarter turns, flips, and positive scales) can be expressed this
//! way.
//!
//! ```text
//! [video] ── orient ── scale ──┐
//!                              ├── overlay ── [post-processing] ── fps ── [vout]
//! color (render size) ─────────┘
//! ```

use clipshape_common::error::{EditorError, EditorResult};
use clipshape_media_model::{AffineTransform, Rect, Size};

use crate::composition::{PostProcessing, VideoComposition};

/// Label of the graph's final video output.
pub const OUTPUT_LABEL: &str = "vout";

const CLEAR_DISPLAY_MATRIX: &str = "sidedata=mode=delete:type=DISPLAYMATRIX";

const EPSILON: f64 = 1e-9;

/// Where the graph reads its inputs from.
#[derive(Debug, Clone)]
pub struct FilterInputs {
    /// Stream specifier of the source video, e.g. `0:0`.
    pub video: String,
    /// Input index of the overlay image, when the composition has one.
    pub overlay: Option<usize>,
}

/// A compiled filter graph.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    pub description: String,
    pub width: u32,
    pub height: u32,
}

/// How the video layer lands on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPlacement {
    /// Filter turning stored frames into display orientation.
    pub orient: Option<&'static str>,
    pub width: u32,
    pub height: u32,
    pub x: i64,
    pub y: i64,
}

/// Round to an even pixel count of at least 2, as 4:2:0 encoders require.
pub fn even_dimension(value: f64) -> u32 {
    let n = value.round().max(2.0) as u32;
    n - n % 2
}

fn is_zero(v: f64) -> bool {
    v.abs() < EPSILON
}

/// Resolve where a frame of `natural` size ends up under `transform`.
pub fn layer_placement(transform: &AffineTransform, natural: Size) -> EditorResult<LayerPlacement> {
    let AffineTransform { a, b, c, d, .. } = *transform;

    let orient = if is_zero(b) && is_zero(c) && !is_zero(a) && !is_zero(d) {
        match (a > 0.0, d > 0.0) {
            (true, true) => None,
            (false, true) => Some("hflip"),
            (true, false) => Some("vflip"),
            (false, false) => Some("hflip,vflip"),
        }
    } else if is_zero(a) && is_zero(d) && !is_zero(b) && !is_zero(c) {
        match (b > 0.0, c > 0.0) {
            (true, false) => Some("transpose=clock"),
            (false, true) => Some("transpose=cclock"),
            (true, true) => Some("transpose=cclock_flip"),
            (false, false) => Some("transpose=clock_flip"),
        }
    } else {
        return Err(EditorError::unsupported_transform(format!(
            "linear part ({a}, {b}, {c}, {d}) is not axis-aligned"
        )));
    };

    let bounds = transform.apply_to_rect(Rect::from_size(natural));
    Ok(LayerPlacement {
        orient,
        width: bounds.size.width.round().max(1.0) as u32,
        height: bounds.size.height.round().max(1.0) as u32,
        x: bounds.min_x().round() as i64,
        y: bounds.min_y().round() as i64,
    })
}

/// Compile `composition` for a source video of `natural` size.
pub fn compile(
    composition: &VideoComposition,
    natural: Size,
    inputs: &FilterInputs,
) -> EditorResult<FilterGraph> {
    let layer = composition
        .instructions
        .first()
        .and_then(|i| i.layers.first())
        .ok_or_else(|| {
            EditorError::Other(anyhow::anyhow!(
                "video composition has no layer instruction"
            ))
        })?;

    let placement = layer_placement(&layer.transform, natural)?;
    let width = even_dimension(composition.render_size.width);
    let height = even_dimension(composition.render_size.height);
    let fd = composition.frame_duration;
    let rate = format!("{}/{}", fd.timescale, fd.value.max(1));

    let mut graph = format!(
        "color=c=black:s={width}x{height}:r={rate}[canvas];[{video}]{orient}scale={lw}:{lh}:flags=lanczos,setsar=1[layer];[canvas][layer]overlay=x={x}:y={y}:shortest=1[base]",
        video = inputs.video,
        orient = placement.orient.map(|o| format!("{o},")).unwrap_or_default(),
        lw = placement.width,
        lh = placement.height,
        x = placement.x,
        y = placement.y,
    );

    let mut last = "base";
    match &composition.post_processing {
        None => {}
        Some(PostProcessing::RoundedMask {
            canvas,
            corner_radius,
        }) => {
            let cw = even_dimension(canvas.width).max(width);
            let ch = even_dimension(canvas.height).max(height);
            let radius = corner_radius.min(cw.min(ch) as f64 / 2.0).max(0.0);
            graph.push_str(&format!(
                ";[base]pad={cw}:{ch}:0:0:black,format=yuva420p,geq=lum='p(X,Y)':cb='p(X,Y)':cr='p(X,Y)':a='{mask}'[masked];color=c=black:s={cw}x{ch}:r={rate}[maskbg];[maskbg][masked]overlay=shortest=1,crop={width}:{height}:0:0[post]",
                mask = rounded_rect_alpha(radius),
            ));
            last = "post";
        }
        Some(PostProcessing::ImageOverlay { canvas, overlay }) => {
            let input = inputs.overlay.ok_or_else(|| {
                EditorError::Other(anyhow::anyhow!("overlay image input is missing"))
            })?;
            let frame = overlay.frame;
            // Frame origin is bottom-left; ffmpeg's is top-left.
            let x = frame.min_x().round() as i64;
            let y = (canvas.height - frame.max_y()).round() as i64;
            graph.push_str(&format!(
                ";[{input}:v]format=rgba[frame];[base][frame]overlay=x={x}:y={y}:shortest=1[post]"
            ));
            last = "post";
        }
    }

    // Orientation is already in the pixels; no display matrix may survive.
    graph.push_str(&format!(
        ";[{last}]fps={rate},format=yuv420p,{CLEAR_DISPLAY_MATRIX}[{OUTPUT_LABEL}]"
    ));

    Ok(FilterGraph {
        description: graph,
        width,
        height,
    })
}

/// `geq` alpha expression: opaque inside a rounded rectangle spanning the
/// whole plane, transparent in the corners outside the radius.
fn rounded_rect_alpha(radius: f64) -> String {
    let r = format!("{radius:.3}");
    let r2 = format!("{:.3}", radius * radius);
    format!(
        "if(gt(pow(max(0,max({r}-X,X-(W-1-{r}))),2)+pow(max(0,max({r}-Y,Y-(H-1-{r}))),2),{r2}),0,255)"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{
        CompositionInstruction, LayerInstruction, OverlayImage, TrackId,
    };
    use clipshape_media_model::{MediaTime, TimeRange};
    use image::RgbaImage;
    use std::sync::Arc;

    fn composition(render: Size, transform: AffineTransform) -> VideoComposition {
        VideoComposition::new(
            render,
            CompositionInstruction {
                time_range: TimeRange::from_zero(MediaTime::new(5, 1)),
                layers: vec![LayerInstruction {
                    track_id: TrackId(1),
                    transform,
                }],
            },
        )
    }

    fn inputs() -> FilterInputs {
        FilterInputs {
            video: "0:0".to_string(),
            overlay: None,
        }
    }

    #[test]
    fn test_even_dimension() {
        assert_eq!(even_dimension(1000.0), 1000);
        assert_eq!(even_dimension(562.5), 562);
        assert_eq!(even_dimension(561.4), 560);
        assert_eq!(even_dimension(0.3), 2);
    }

    #[test]
    fn test_placement_for_letterboxed_landscape() {
        let t = AffineTransform::scale(1000.0 / 1920.0, 562.5 / 1080.0).then_translate(0.0, 218.75);
        let p = layer_placement(&t, Size::new(1920.0, 1080.0)).unwrap();
        assert_eq!(
            p,
            LayerPlacement {
                orient: None,
                width: 1000,
                height: 563,
                x: 0,
                y: 219,
            }
        );
    }

    #[test]
    fn test_quarter_turns_map_to_transpose() {
        let natural = Size::new(1920.0, 1080.0);
        let cases = [
            (90.0, "transpose=clock"),
            (270.0, "transpose=cclock"),
            (180.0, "hflip,vflip"),
        ];
        for (deg, expected) in cases {
            let t = AffineTransform::display_rotation(deg, natural);
            let p = layer_placement(&t, natural).unwrap();
            assert_eq!(p.orient, Some(expected), "deg {deg}");
            assert_eq!((p.x, p.y), (0, 0));
        }

        let mirrored = AffineTransform::new(0.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        assert_eq!(
            layer_placement(&mirrored, natural).unwrap().orient,
            Some("transpose=cclock_flip")
        );
    }

    #[test]
    fn test_arbitrary_rotation_is_unsupported() {
        let t = AffineTransform::display_rotation(45.0, Size::new(100.0, 100.0));
        let err = layer_placement(&t, Size::new(100.0, 100.0)).unwrap_err();
        assert!(matches!(err, EditorError::UnsupportedTransform { .. }));
    }

    #[test]
    fn test_plain_graph_ends_in_output_label() {
        let vc = composition(Size::new(1000.0, 1000.0), AffineTransform::scale(0.5, 0.5));
        let graph = compile(&vc, Size::new(2000.0, 2000.0), &inputs()).unwrap();

        assert_eq!((graph.width, graph.height), (1000, 1000));
        assert!(graph
            .description
            .starts_with("color=c=black:s=1000x1000:r=30/1[canvas];[0:0]scale=1000:1000"));
        assert!(graph
            .description
            .ends_with("[base]fps=30/1,format=yuv420p,sidedata=mode=delete:type=DISPLAYMATRIX[vout]"));
    }

    #[test]
    fn test_rounded_mask_stage() {
        let vc = composition(Size::new(1000.0, 562.5), AffineTransform::IDENTITY)
            .with_post_processing(PostProcessing::RoundedMask {
                canvas: Size::new(1000.0, 1000.0),
                corner_radius: 40.0,
            });
        let graph = compile(&vc, Size::new(1000.0, 562.0), &inputs()).unwrap();

        assert!(graph.description.contains("pad=1000:1000:0:0:black"));
        assert!(graph.description.contains("crop=1000:562:0:0[post]"));
        assert!(graph.description.contains("pow(max(0,max(40.000-X"));
        assert!(graph
            .description
            .ends_with("[post]fps=30/1,format=yuv420p,sidedata=mode=delete:type=DISPLAYMATRIX[vout]"));
    }

    #[test]
    fn test_oversized_radius_is_clamped() {
        let alpha = rounded_rect_alpha(50.0);
        let vc = composition(Size::new(100.0, 100.0), AffineTransform::IDENTITY)
            .with_post_processing(PostProcessing::RoundedMask {
                canvas: Size::new(100.0, 100.0),
                corner_radius: 500.0,
            });
        let graph = compile(&vc, Size::new(100.0, 100.0), &inputs()).unwrap();
        assert!(graph.description.contains(&alpha));
    }

    #[test]
    fn test_overlay_is_anchored_bottom_left() {
        let vc = composition(Size::new(1920.0, 1080.0), AffineTransform::IDENTITY)
            .with_post_processing(PostProcessing::ImageOverlay {
                canvas: Size::new(1920.0, 1080.0),
                overlay: OverlayImage {
                    image: Arc::new(RgbaImage::new(400, 300)),
                    frame: Rect::new(0.0, 0.0, 400.0, 300.0),
                },
            });
        let graph = compile(
            &vc,
            Size::new(1920.0, 1080.0),
            &FilterInputs {
                video: "0:0".to_string(),
                overlay: Some(1),
            },
        )
        .unwrap();

        assert!(graph
            .description
            .contains("[1:v]format=rgba[frame];[base][frame]overlay=x=0:y=780:shortest=1[post]"));
    }

    #[test]
    fn test_overlay_without_input_fails() {
        let vc = composition(Size::new(10.0, 10.0), AffineTransform::IDENTITY)
            .with_post_processing(PostProcessing::ImageOverlay {
                canvas: Size::new(10.0, 10.0),
                overlay: OverlayImage {
                    image: Arc::new(RgbaImage::new(1, 1)),
                    frame: Rect::new(0.0, 0.0, 1.0, 1.0),
                },
            });
        assert!(compile(&vc, Size::new(10.0, 10.0), &inputs()).is_err());
    }
}
