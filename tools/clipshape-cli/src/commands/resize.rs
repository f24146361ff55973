//! Resize a video into a target box.

use std::path::PathBuf;

use clipshape_common::config::AppConfig;
use clipshape_render_engine::{Operation, ResizeOptions, VideoEditor};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    config: &AppConfig,
    input: PathBuf,
    output: PathBuf,
    width: f64,
    height: f64,
    corner_radius: Option<f64>,
    keep_aspect_ratio: bool,
    cut_black_edge: bool,
) -> anyhow::Result<()> {
    println!("Resizing: {}", input.display());
    println!("  Output: {}", output.display());
    println!("  Target: {width}x{height}");
    if let Some(radius) = corner_radius {
        println!("  Corner radius: {radius}");
    }

    let editor = VideoEditor::from_config(config);
    let operation = Operation::Resize {
        width,
        height,
        corner_radius,
        options: ResizeOptions {
            keep_aspect_ratio,
            cut_black_edge,
        },
    };

    match editor
        .export_with_progress(&input, &output, operation, Some(super::progress_printer()))
        .await
    {
        None => {
            println!("\nExport complete: {}", output.display());
            Ok(())
        }
        Some(message) => {
            println!();
            tracing::debug!(input = %input.display(), "Resize export failed");
            Err(anyhow::anyhow!(message))
        }
    }
}
