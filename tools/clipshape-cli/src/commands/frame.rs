//! Add a device frame over a video.

use std::path::PathBuf;

use clipshape_common::config::AppConfig;
use clipshape_render_engine::{Operation, VideoEditor};

pub async fn run(
    config: &AppConfig,
    input: PathBuf,
    output: PathBuf,
    frame_path: PathBuf,
) -> anyhow::Result<()> {
    let overlay = image::open(&frame_path)
        .map_err(|e| anyhow::anyhow!("Failed to load frame image {}: {e}", frame_path.display()))?;

    tracing::debug!(
        path = %frame_path.display(),
        width = overlay.width(),
        height = overlay.height(),
        "Frame image loaded"
    );

    println!("Framing: {}", input.display());
    println!("  Output: {}", output.display());
    println!(
        "  Frame: {} ({}x{})",
        frame_path.display(),
        overlay.width(),
        overlay.height()
    );

    let editor = VideoEditor::from_config(config);
    match editor
        .export_with_progress(
            &input,
            &output,
            Operation::add_device_frame(overlay),
            Some(super::progress_printer()),
        )
        .await
    {
        None => {
            println!("\nExport complete: {}", output.display());
            Ok(())
        }
        Some(message) => {
            println!();
            tracing::debug!(input = %input.display(), "Frame export failed");
            Err(anyhow::anyhow!(message))
        }
    }
}
