//! Show video information.

use std::path::PathBuf;

use clipshape_common::config::AppConfig;
use clipshape_render_engine::resize::display_natural_size;
use clipshape_render_engine::{Asset, MediaKind, Toolchain};

pub async fn run(config: &AppConfig, input: PathBuf) -> anyhow::Result<()> {
    let toolchain = Toolchain::discover(&config.tools);
    let asset = Asset::load(&input, &toolchain)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load video: {e}"))?;
    tracing::debug!(tracks = asset.tracks().len(), "Video probed");

    println!("Video: {}", asset.path().display());
    println!("  Format: {}", asset.format_name().unwrap_or("unknown"));
    println!("  Duration: {:.3}s", asset.duration().seconds());
    println!();

    println!("Tracks:");
    for track in asset.tracks() {
        let codec = track.codec_name.as_deref().unwrap_or("unknown");
        match track.kind {
            MediaKind::Video => {
                let info = track.orientation();
                println!(
                    "  #{} video: {}x{} ({codec}, {:?}{})",
                    track.track_id,
                    track.natural_size.width,
                    track.natural_size.height,
                    info.orientation,
                    if info.is_portrait { ", portrait" } else { "" }
                );
                let shown = display_natural_size(track.natural_size, &info);
                println!("     Display size: {}x{}", shown.width, shown.height);
                if let Some(fps) = track.nominal_frame_rate {
                    println!("     Frame rate: {fps:.2}");
                }
            }
            MediaKind::Audio => println!("  #{} audio: {codec}", track.track_id),
            MediaKind::Other => println!("  #{} other: {codec}", track.track_id),
        }
    }

    Ok(())
}

