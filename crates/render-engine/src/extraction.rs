//! Copying a source asset into a fresh composition.

use clipshape_common::error::{EditorError, EditorResult};
use clipshape_media_model::{AffineTransform, MediaTime, OrientationInfo, Size, TimeRange};

use crate::asset::{Asset, AssetTrack, MediaKind};
use crate::composition::{CompositionInstruction, LayerInstruction, MutableComposition, TrackId};

/// A source asset copied into a composition, ready for a builder.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub asset: Asset,
    pub composition: MutableComposition,
    /// The source video track that was copied.
    pub source_video: AssetTrack,
    /// The composition track holding the copied video.
    pub video_track_id: TrackId,
    pub audio_track_id: TrackId,
    /// One instruction over the whole duration with a single layer for the
    /// copied video. The layer transform is the identity until a builder
    /// sets it.
    pub instruction: CompositionInstruction,
}

impl Extraction {
    pub fn natural_size(&self) -> Size {
        self.source_video.natural_size
    }

    pub fn preferred_transform(&self) -> AffineTransform {
        self.source_video.preferred_transform
    }

    pub fn orientation(&self) -> OrientationInfo {
        self.source_video.orientation()
    }

    /// The pre-built instruction with its video layer set to `transform`.
    pub fn instruction_with_transform(&self, transform: AffineTransform) -> CompositionInstruction {
        let mut instruction = self.instruction.clone();
        for layer in &mut instruction.layers {
            if layer.track_id == self.video_track_id {
                layer.transform = transform;
            }
        }
        instruction
    }
}

/// Copy the full duration of the asset's video and audio into a new
/// composition.
///
/// The first video and the first audio track are used. A missing video track
/// is reported before a missing audio track.
pub fn extract(asset: Asset) -> EditorResult<Extraction> {
    let source_video = asset
        .first_track(MediaKind::Video)
        .cloned()
        .ok_or(EditorError::VideoTrackNotFound)?;
    let source_audio = asset
        .first_track(MediaKind::Audio)
        .cloned()
        .ok_or(EditorError::AudioTrackNotFound)?;

    let full_range = TimeRange::from_zero(asset.duration());

    let mut composition = MutableComposition::new();
    let video_track_id = composition.add_mutable_track(MediaKind::Video, None)?;
    let audio_track_id = composition.add_mutable_track(MediaKind::Audio, None)?;

    composition.insert_time_range(
        video_track_id,
        full_range,
        &asset,
        &source_video,
        MediaTime::ZERO,
    )?;
    composition.insert_time_range(
        audio_track_id,
        full_range,
        &asset,
        &source_audio,
        MediaTime::ZERO,
    )?;

    let instruction = CompositionInstruction {
        time_range: full_range,
        layers: vec![LayerInstruction {
            track_id: video_track_id,
            transform: AffineTransform::IDENTITY,
        }],
    };

    tracing::debug!(
        source = %asset.path().display(),
        duration = %asset.duration(),
        natural_width = source_video.natural_size.width,
        natural_height = source_video.natural_size.height,
        "Source extracted into composition"
    );

    Ok(Extraction {
        asset,
        composition,
        source_video,
        video_track_id,
        audio_track_id,
        instruction,
    })
}
