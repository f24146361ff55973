//! Read-only source media, inspected with `ffprobe`.
//!
//! Runs `ffprobe -print_format json -show_format -show_streams` and maps the
//! result into an [`Asset`]: its duration and its tracks, each with a
//! natural (stored) size and the preferred transform applied at playback.

use std::path::{Path, PathBuf};

use clipshape_common::error::{EditorError, EditorResult};
use clipshape_media_model::{
    resolve_orientation, AffineTransform, MediaTime, OrientationInfo, Size, TimeRange,
};
use serde::Deserialize;

use crate::composition::TrackId;
use crate::tool::{run_tool, Toolchain};

/// Kind of media carried by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
    Other,
}

/// A single track of an [`Asset`].
#[derive(Debug, Clone)]
pub struct AssetTrack {
    /// Stream index within the container.
    pub track_id: TrackId,
    pub kind: MediaKind,
    pub codec_name: Option<String>,
    /// Stored frame size before the preferred transform. Zero for audio.
    pub natural_size: Size,
    /// Transform applied to stored frames for display.
    pub preferred_transform: AffineTransform,
    pub nominal_frame_rate: Option<f64>,
    pub time_range: TimeRange,
}

impl AssetTrack {
    pub fn orientation(&self) -> OrientationInfo {
        resolve_orientation(&self.preferred_transform)
    }
}

/// Probed source media.
#[derive(Debug, Clone)]
pub struct Asset {
    path: PathBuf,
    duration: MediaTime,
    format_name: Option<String>,
    tracks: Vec<AssetTrack>,
}

impl Asset {
    /// Probe a media file.
    ///
    /// A missing file, or one `ffprobe` cannot open, is reported as
    /// [`EditorError::VideoFileNotFound`].
    pub async fn load(path: &Path, toolchain: &Toolchain) -> EditorResult<Self> {
        if !path.is_file() {
            return Err(EditorError::VideoFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let ffprobe = toolchain
            .ffprobe()
            .ok_or_else(|| EditorError::tool("ffprobe", "not found in PATH"))?;

        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
            "-show_streams".to_string(),
            path.display().to_string(),
        ];
        let output = run_tool(ffprobe, &args).await?;
        if !output.status.success() {
            tracing::debug!(
                path = %path.display(),
                status = %output.status,
                stderr = output.stderr.trim(),
                "ffprobe could not open source"
            );
            return Err(EditorError::VideoFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let asset = Self::from_probe_json(path, &output.stdout)?;
        tracing::debug!(
            path = %path.display(),
            duration = %asset.duration,
            tracks = asset.tracks.len(),
            "Asset loaded"
        );
        Ok(asset)
    }

    /// Build an asset from `ffprobe` JSON output.
    pub fn from_probe_json(path: &Path, json: &str) -> EditorResult<Self> {
        let probe: ProbeOutput = serde_json::from_str(json)?;
        Ok(parse_probe_output(path, probe))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn duration(&self) -> MediaTime {
        self.duration
    }

    pub fn format_name(&self) -> Option<&str> {
        self.format_name.as_deref()
    }

    pub fn tracks(&self) -> &[AssetTrack] {
        &self.tracks
    }

    pub fn tracks_of(&self, kind: MediaKind) -> impl Iterator<Item = &AssetTrack> {
        self.tracks.iter().filter(move |t| t.kind == kind)
    }

    pub fn first_track(&self, kind: MediaKind) -> Option<&AssetTrack> {
        self.tracks_of(kind).next()
    }

    pub fn track(&self, id: TrackId) -> Option<&AssetTrack> {
        self.tracks.iter().find(|t| t.track_id == id)
    }
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: ProbeFormat,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    index: u32,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    disposition: ProbeDisposition,
    #[serde(default)]
    tags: ProbeTags,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeDisposition {
    #[serde(default)]
    attached_pic: u8,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeSideData {
    side_data_type: Option<String>,
    rotation: Option<f64>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn parse_probe_output(path: &Path, probe: ProbeOutput) -> Asset {
    let stream_durations: Vec<Option<MediaTime>> = probe
        .streams
        .iter()
        .map(|s| s.duration.as_deref().and_then(MediaTime::from_decimal_str))
        .collect();

    let duration = probe
        .format
        .duration
        .as_deref()
        .and_then(MediaTime::from_decimal_str)
        .or_else(|| stream_durations.iter().flatten().max().copied())
        .unwrap_or(MediaTime::ZERO);

    let tracks = probe
        .streams
        .into_iter()
        .zip(stream_durations)
        .map(|(stream, stream_duration)| {
            let kind = match stream.codec_type.as_deref() {
                Some("video") if stream.disposition.attached_pic == 0 => MediaKind::Video,
                Some("audio") => MediaKind::Audio,
                _ => MediaKind::Other,
            };

            let natural_size = match kind {
                MediaKind::Video => Size::new(
                    stream.width.unwrap_or(0) as f64,
                    stream.height.unwrap_or(0) as f64,
                ),
                _ => Size::ZERO,
            };

            let preferred_transform = match kind {
                MediaKind::Video => match display_rotation_degrees(&stream) {
                    Some(degrees) => AffineTransform::display_rotation(degrees, natural_size),
                    None => AffineTransform::IDENTITY,
                },
                _ => AffineTransform::IDENTITY,
            };

            let nominal_frame_rate = stream
                .avg_frame_rate
                .as_deref()
                .and_then(parse_frame_rate)
                .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_frame_rate));

            AssetTrack {
                track_id: TrackId(stream.index),
                kind,
                codec_name: stream.codec_name,
                natural_size,
                preferred_transform,
                nominal_frame_rate,
                time_range: TimeRange::from_zero(stream_duration.unwrap_or(duration)),
            }
        })
        .collect();

    Asset {
        path: path.to_path_buf(),
        duration,
        format_name: probe.format.format_name,
        tracks,
    }
}

/// Clockwise rotation to apply for display, if any.
///
/// The display matrix side data reports the counter-clockwise rotation of the
/// stored frame; the legacy `rotate` tag reports the clockwise correction.
fn display_rotation_degrees(stream: &ProbeStream) -> Option<f64> {
    let from_side_data = stream
        .side_data_list
        .iter()
        .filter(|sd| sd.side_data_type.as_deref() == Some("Display Matrix"))
        .find_map(|sd| sd.rotation)
        .map(|ccw| -ccw);

    let degrees = from_side_data.or_else(|| {
        stream
            .tags
            .rotate
            .as_deref()
            .and_then(|r| r.trim().parse::<f64>().ok())
    })?;

    let normalized = degrees.rem_euclid(360.0);
    (normalized != 0.0).then_some(normalized)
}

fn parse_frame_rate(s: &str) -> Option<f64> {
    let (num, den) = s.split_once('/')?;
    let num: f64 = num.parse().ok()?;
    let den: f64 = den.parse().ok()?;
    if den == 0.0 || num == 0.0 {
        return None;
    }
    Some(num / den)
}
