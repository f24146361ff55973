//! End-to-end exports against a real ffmpeg install.
//!
//! Each test returns early when ffmpeg, ffprobe, or libx264 is unavailable.
//! The rotation tests also return early when rotation metadata cannot be
//! written.

use std::path::Path;
use std::process::Command;

use clipshape_common::config::{ExportSettings, ToolPaths};
use clipshape_common::messages::MessageCatalog;
use clipshape_render_engine::{Asset, MediaKind, Operation, Toolchain, VideoEditor};
use image::{DynamicImage, Rgba, RgbaImage};

fn toolchain() -> Option<Toolchain> {
    let toolchain = Toolchain::discover(&ToolPaths::default());
    if !toolchain.is_complete() {
        eprintln!("skipping: ffmpeg/ffprobe not installed");
        return None;
    }
    let encoders = Command::new(toolchain.ffmpeg()?)
        .args(["-hide_banner", "-encoders"])
        .output()
        .ok()?;
    if !String::from_utf8_lossy(&encoders.stdout).contains("libx264") {
        eprintln!("skipping: ffmpeg built without libx264");
        return None;
    }
    Some(toolchain)
}

fn editor(toolchain: Toolchain) -> VideoEditor {
    VideoEditor::new(toolchain, ExportSettings::default(), MessageCatalog::english())
}

/// Render a one-second 1280x720 test clip.
fn make_source(toolchain: &Toolchain, path: &Path, with_audio: bool) {
    let ffmpeg = toolchain.ffmpeg().unwrap();
    let mut args = vec![
        "-y",
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        "lavfi",
        "-i",
        "testsrc=size=1280x720:rate=30",
    ];
    if with_audio {
        args.extend(["-f", "lavfi", "-i", "sine=frequency=440:sample_rate=48000"]);
    }
    args.extend(["-t", "1", "-c:v", "libx264", "-pix_fmt", "yuv420p"]);
    if with_audio {
        args.extend(["-c:a", "aac"]);
    }
    let status = Command::new(ffmpeg)
        .args(&args)
        .arg(path)
        .status()
        .expect("ffmpeg should run");
    assert!(status.success(), "failed to generate test source");
}

/// Remux `source` with a quarter-turn rotation. Returns `false` when this
/// ffmpeg cannot write rotation metadata.
async fn make_rotated_source(toolchain: &Toolchain, source: &Path, rotated: &Path) -> bool {
    let ffmpeg = toolchain.ffmpeg().unwrap();
    // Display-matrix input option first, then the legacy stream tag.
    let attempts: [(&[&str], &[&str]); 2] = [
        (&["-display_rotation", "90"], &[]),
        (&[], &["-metadata:s:v:0", "rotate=90"]),
    ];
    for (input_args, output_args) in attempts {
        let ok = Command::new(ffmpeg)
            .args(["-y", "-hide_banner", "-loglevel", "error"])
            .args(input_args)
            .arg("-i")
            .arg(source)
            .args(["-c", "copy"])
            .args(output_args)
            .arg(rotated)
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        if !ok {
            continue;
        }
        let asset = Asset::load(rotated, toolchain).await.unwrap();
        let track = asset.first_track(MediaKind::Video).unwrap();
        if track.orientation().swaps_axes() {
            return true;
        }
    }
    eprintln!("skipping: ffmpeg cannot write rotation metadata");
    false
}

fn assert_upright(asset: &Asset) {
    let track = asset.first_track(MediaKind::Video).unwrap();
    assert!(
        track.preferred_transform.is_identity(),
        "output still carries a rotation: {:?}",
        track.preferred_transform
    );
}

async fn video_size(toolchain: &Toolchain, path: &Path) -> (f64, f64) {
    let asset = Asset::load(path, toolchain).await.expect("output should probe");
    let track = asset
        .first_track(MediaKind::Video)
        .expect("output should have video");
    (track.natural_size.width, track.natural_size.height)
}

#[tokio::test]
async fn resize_letterboxes_into_square() {
    let Some(tools) = toolchain() else { return };
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.mp4");
    let output = dir.path().join("out").join("square.mp4");
    make_source(&tools, &source, true);

    let msg = editor(tools.clone())
        .export(&source, &output, Operation::resize(1000.0, 1000.0, None))
        .await;
    assert_eq!(msg, None);
    assert_eq!(video_size(&tools, &output).await, (1000.0, 1000.0));

    let asset = Asset::load(&output, &tools).await.unwrap();
    assert!(asset.first_track(MediaKind::Audio).is_some());
}

#[tokio::test]
async fn resize_with_rounded_corners() {
    let Some(tools) = toolchain() else { return };
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.mp4");
    let output = dir.path().join("rounded.mp4");
    make_source(&tools, &source, true);

    let msg = editor(tools.clone())
        .export(&source, &output, Operation::resize(640.0, 360.0, Some(24.0)))
        .await;
    assert_eq!(msg, None);
    assert_eq!(video_size(&tools, &output).await, (640.0, 360.0));
}

#[tokio::test]
async fn oversized_target_is_rejected_without_output() {
    let Some(tools) = toolchain() else { return };
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.mp4");
    let output = dir.path().join("big.mp4");
    make_source(&tools, &source, true);

    let msg = editor(tools)
        .export(&source, &output, Operation::resize(5000.0, 5000.0, None))
        .await;
    assert_eq!(
        msg.as_deref(),
        Some("The requested size is larger than the video.")
    );
    assert!(!output.exists());
}

#[tokio::test]
async fn exporting_twice_replaces_output() {
    let Some(tools) = toolchain() else { return };
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.mp4");
    let output = dir.path().join("twice.mp4");
    make_source(&tools, &source, true);

    let editor = editor(tools.clone());
    assert_eq!(
        editor
            .export(&source, &output, Operation::resize(800.0, 800.0, None))
            .await,
        None
    );
    assert_eq!(
        editor
            .export(&source, &output, Operation::resize(400.0, 400.0, None))
            .await,
        None
    );
    assert_eq!(video_size(&tools, &output).await, (400.0, 400.0));
}

#[tokio::test]
async fn device_frame_keeps_natural_size() {
    let Some(tools) = toolchain() else { return };
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.mp4");
    let output = dir.path().join("framed.mp4");
    make_source(&tools, &source, true);

    // Opaque border with a transparent window.
    let mut frame = RgbaImage::from_pixel(1280, 720, Rgba([20, 20, 20, 255]));
    for y in 40..680 {
        for x in 40..1240 {
            frame.put_pixel(x, y, Rgba([0, 0, 0, 0]));
        }
    }

    let msg = editor(tools.clone())
        .export(
            &source,
            &output,
            Operation::add_device_frame(DynamicImage::ImageRgba8(frame)),
        )
        .await;
    assert_eq!(msg, None);
    assert_eq!(video_size(&tools, &output).await, (1280.0, 720.0));
}

#[tokio::test]
async fn video_without_audio_is_rejected() {
    let Some(tools) = toolchain() else { return };
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("silent.mp4");
    let output = dir.path().join("out.mp4");
    make_source(&tools, &source, false);

    let msg = editor(tools)
        .export(&source, &output, Operation::resize(640.0, 360.0, None))
        .await;
    assert_eq!(msg.as_deref(), Some("The video has no audio track."));
    assert!(!output.exists());
}

#[tokio::test]
async fn missing_source_is_reported() {
    let Some(tools) = toolchain() else { return };
    let dir = tempfile::tempdir().unwrap();

    let msg = editor(tools)
        .export(
            &dir.path().join("nope.mp4"),
            &dir.path().join("out.mp4"),
            Operation::resize(640.0, 360.0, None),
        )
        .await;
    assert_eq!(msg.as_deref(), Some("The video file could not be found."));
}

#[tokio::test]
async fn rotated_source_resizes_upright() {
    let Some(tools) = toolchain() else { return };
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.mp4");
    let rotated = dir.path().join("rotated.mp4");
    let output = dir.path().join("square.mp4");
    make_source(&tools, &source, true);
    if !make_rotated_source(&tools, &source, &rotated).await {
        return;
    }

    let msg = editor(tools.clone())
        .export(&rotated, &output, Operation::resize(1000.0, 1000.0, None))
        .await;
    assert_eq!(msg, None);

    let asset = Asset::load(&output, &tools).await.unwrap();
    assert_upright(&asset);
    assert_eq!(video_size(&tools, &output).await, (1000.0, 1000.0));
}

#[tokio::test]
async fn rotated_source_frames_upright() {
    let Some(tools) = toolchain() else { return };
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.mp4");
    let rotated = dir.path().join("rotated.mp4");
    let output = dir.path().join("framed.mp4");
    make_source(&tools, &source, true);
    if !make_rotated_source(&tools, &source, &rotated).await {
        return;
    }

    let frame = RgbaImage::from_pixel(1280, 720, Rgba([0, 0, 0, 0]));
    let msg = editor(tools.clone())
        .export(
            &rotated,
            &output,
            Operation::add_device_frame(DynamicImage::ImageRgba8(frame)),
        )
        .await;
    assert_eq!(msg, None);

    // The canvas is the stored size, not the displayed one.
    let asset = Asset::load(&output, &tools).await.unwrap();
    assert_upright(&asset);
    assert_eq!(video_size(&tools, &output).await, (1280.0, 720.0));
}
