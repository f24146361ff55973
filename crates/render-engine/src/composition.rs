//! In-memory compositions and their transform descriptions.
//!
//! A [`MutableComposition`] is a timeline of tracks whose segments reference
//! time ranges of source assets. A [`VideoComposition`] describes how the
//! video of a composition is rendered: per-range layer transforms, the
//! render size, the frame rate, and an optional post-processing stage.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use clipshape_common::error::{EditorError, EditorResult};
use clipshape_media_model::{AffineTransform, MediaTime, Rect, Size, TimeRange};
use image::RgbaImage;

use crate::asset::{Asset, AssetTrack, MediaKind};

/// Frame rate of every rebuilt composition.
pub const COMPOSITION_FRAME_RATE: i32 = 30;

/// Identifier of a track within an asset or a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A span of source media placed on a composition track.
#[derive(Debug, Clone)]
pub struct TrackSegment {
    pub source_path: PathBuf,
    pub source_track: TrackId,
    pub source_range: TimeRange,
    /// Where the segment starts on the composition timeline.
    pub target_start: MediaTime,
}

impl TrackSegment {
    pub fn target_range(&self) -> TimeRange {
        TimeRange::new(self.target_start, self.source_range.duration)
    }
}

/// A track of a [`MutableComposition`].
#[derive(Debug, Clone)]
pub struct CompositionTrack {
    pub id: TrackId,
    pub kind: MediaKind,
    pub segments: Vec<TrackSegment>,
    /// Natural size of the inserted video. Zero until media is inserted.
    pub natural_size: Size,
    pub preferred_transform: AffineTransform,
}

/// A mutable timeline assembled from source tracks.
#[derive(Debug, Clone, Default)]
pub struct MutableComposition {
    tracks: Vec<CompositionTrack>,
}

impl MutableComposition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an empty track.
    ///
    /// With `preferred_id` set, that id is used and must not already exist;
    /// otherwise the next free id is assigned.
    pub fn add_mutable_track(
        &mut self,
        kind: MediaKind,
        preferred_id: Option<TrackId>,
    ) -> EditorResult<TrackId> {
        if kind == MediaKind::Other {
            return Err(EditorError::composition_track(
                "only video and audio tracks can be added",
            ));
        }

        let id = match preferred_id {
            Some(id) if self.track(id).is_some() => {
                return Err(EditorError::composition_track(format!(
                    "track id {id} is already in use"
                )));
            }
            Some(id) => id,
            None => TrackId(self.tracks.iter().map(|t| t.id.0 + 1).max().unwrap_or(1)),
        };

        self.tracks.push(CompositionTrack {
            id,
            kind,
            segments: Vec::new(),
            natural_size: Size::ZERO,
            preferred_transform: AffineTransform::IDENTITY,
        });
        Ok(id)
    }

    /// Copy `source_range` of `source_track` onto track `track_id` at `at`.
    pub fn insert_time_range(
        &mut self,
        track_id: TrackId,
        source_range: TimeRange,
        asset: &Asset,
        source_track: &AssetTrack,
        at: MediaTime,
    ) -> EditorResult<()> {
        if source_range.is_empty() || source_range.start < MediaTime::ZERO {
            return Err(EditorError::TimeSetNotCorrect);
        }

        let track = self
            .tracks
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or_else(|| EditorError::composition_track(format!("no track with id {track_id}")))?;

        if track.kind != source_track.kind {
            return Err(EditorError::composition_track(format!(
                "cannot insert {:?} media into a {:?} track",
                source_track.kind, track.kind
            )));
        }

        if track.segments.is_empty() {
            track.natural_size = source_track.natural_size;
            track.preferred_transform = source_track.preferred_transform;
        }
        track.segments.push(TrackSegment {
            source_path: asset.path().to_path_buf(),
            source_track: source_track.track_id,
            source_range,
            target_start: at,
        });
        Ok(())
    }

    pub fn tracks(&self) -> &[CompositionTrack] {
        &self.tracks
    }

    pub fn track(&self, id: TrackId) -> Option<&CompositionTrack> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn first_track(&self, kind: MediaKind) -> Option<&CompositionTrack> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    /// End of the latest segment on any track.
    pub fn duration(&self) -> MediaTime {
        self.tracks
            .iter()
            .flat_map(|t| t.segments.iter())
            .map(|s| s.target_range().end())
            .max()
            .unwrap_or(MediaTime::ZERO)
    }
}

/// Transform of one composition track during an instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInstruction {
    pub track_id: TrackId,
    pub transform: AffineTransform,
}

/// Rendering instructions for a time range of the composition.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionInstruction {
    pub time_range: TimeRange,
    /// Layers from top to bottom.
    pub layers: Vec<LayerInstruction>,
}

/// Image composited above the video.
#[derive(Clone)]
pub struct OverlayImage {
    pub image: Arc<RgbaImage>,
    /// Placement in canvas coordinates with a bottom-left origin.
    pub frame: Rect,
}

impl fmt::Debug for OverlayImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayImage")
            .field("image", &self.image.dimensions())
            .field("frame", &self.frame)
            .finish()
    }
}

/// Post-processing applied to rendered frames on a canvas.
#[derive(Debug, Clone)]
pub enum PostProcessing {
    /// Clip the canvas to a rounded rectangle; clipped pixels become black.
    RoundedMask { canvas: Size, corner_radius: f64 },
    /// Composite an image above the video.
    ImageOverlay { canvas: Size, overlay: OverlayImage },
}

/// Description of how a composition's video is rendered.
#[derive(Debug, Clone)]
pub struct VideoComposition {
    pub render_size: Size,
    pub frame_duration: MediaTime,
    pub instructions: Vec<CompositionInstruction>,
    pub post_processing: Option<PostProcessing>,
}

impl VideoComposition {
    /// A composition rendering at [`COMPOSITION_FRAME_RATE`].
    pub fn new(render_size: Size, instruction: CompositionInstruction) -> Self {
        Self {
            render_size,
            frame_duration: MediaTime::new(1, COMPOSITION_FRAME_RATE),
            instructions: vec![instruction],
            post_processing: None,
        }
    }

    pub fn with_post_processing(mut self, stage: PostProcessing) -> Self {
        self.post_processing = Some(stage);
        self
    }

    pub fn frame_rate(&self) -> f64 {
        1.0 / self.frame_duration.seconds()
    }
}
