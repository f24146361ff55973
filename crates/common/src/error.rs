//! Error types shared across clipshape crates.
//!
//! [`EditorError`] is a closed taxonomy: every variant that can be shown to a
//! user maps to exactly one key of the localized message catalogue (see
//! [`crate::messages`]). The remaining variants are infrastructure failures
//! that have no catalogue entry and are surfaced with their own text.

use std::path::PathBuf;

/// Top-level error type for video editing operations.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Video file not found: {path}")]
    VideoFileNotFound { path: PathBuf },

    #[error("Source has no video track")]
    VideoTrackNotFound,

    #[error("Source has no audio track")]
    AudioTrackNotFound,

    #[error("Could not create composition track: {message}")]
    CompositionTrackInitFailed { message: String },

    #[error("Target size {target_width}x{target_height} exceeds source size {source_width}x{source_height}")]
    TargetSizeNotCorrect {
        target_width: f64,
        target_height: f64,
        source_width: f64,
        source_height: f64,
    },

    #[error("Time range is not valid")]
    TimeSetNotCorrect,

    #[error("Output directory is not usable: {path}")]
    NoDir { path: PathBuf },

    #[error("Could not create export session: {reason}")]
    NoExportSession { reason: String },

    #[error("Exporter error: {0}")]
    ExporterError(String),

    #[error("Unsupported layer transform: {message}")]
    UnsupportedTransform { message: String },

    #[error("{tool} error: {message}")]
    Tool { tool: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using EditorError.
pub type EditorResult<T> = Result<T, EditorError>;

impl EditorError {
    pub fn composition_track(msg: impl Into<String>) -> Self {
        Self::CompositionTrackInitFailed {
            message: msg.into(),
        }
    }

    pub fn no_export_session(reason: impl Into<String>) -> Self {
        Self::NoExportSession {
            reason: reason.into(),
        }
    }

    pub fn unsupported_transform(msg: impl Into<String>) -> Self {
        Self::UnsupportedTransform {
            message: msg.into(),
        }
    }

    pub fn tool(tool: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: msg.into(),
        }
    }

    /// Catalogue key for this error, or `None` for infrastructure failures
    /// outside the user-facing taxonomy.
    pub fn message_key(&self) -> Option<&'static str> {
        let key = match self {
            Self::VideoFileNotFound { .. } => "video_error_video_file_not_found",
            Self::VideoTrackNotFound => "video_error_no_video_track",
            Self::AudioTrackNotFound => "video_error_no_audio_track",
            Self::CompositionTrackInitFailed { .. } => {
                "video_error_could_not_create_composition_track"
            }
            Self::TargetSizeNotCorrect { .. } => "video_error_wrong_size",
            Self::TimeSetNotCorrect => "video_error_wrong_time",
            Self::NoDir { .. } => "video_error_no_dir",
            Self::NoExportSession { .. } => "video_error_no_export_session",
            Self::ExporterError(_) => "video_error_exporter_error",
            Self::UnsupportedTransform { .. }
            | Self::Tool { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Image(_)
            | Self::Other(_) => return None,
        };
        Some(key)
    }

    /// Whether this error belongs to the closed user-facing taxonomy.
    pub fn is_expected(&self) -> bool {
        self.message_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_keys_are_unique() {
        let errors = [
            EditorError::VideoFileNotFound {
                path: PathBuf::from("a.mp4"),
            },
            EditorError::VideoTrackNotFound,
            EditorError::AudioTrackNotFound,
            EditorError::composition_track("id in use"),
            EditorError::TargetSizeNotCorrect {
                target_width: 10.0,
                target_height: 10.0,
                source_width: 1.0,
                source_height: 1.0,
            },
            EditorError::TimeSetNotCorrect,
            EditorError::NoDir {
                path: PathBuf::from("/tmp"),
            },
            EditorError::no_export_session("ffmpeg missing"),
            EditorError::ExporterError("boom".into()),
        ];

        let mut keys: Vec<_> = errors.iter().filter_map(|e| e.message_key()).collect();
        assert_eq!(keys.len(), errors.len());
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), errors.len());
    }

    #[test]
    fn test_infrastructure_errors_have_no_key() {
        let err = EditorError::tool("ffprobe", "not found");
        assert!(!err.is_expected());
        assert_eq!(err.to_string(), "ffprobe error: not found");

        let io: EditorError = std::io::Error::other("disk").into();
        assert!(io.message_key().is_none());
    }
}
