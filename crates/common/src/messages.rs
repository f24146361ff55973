//! Localized message catalogue for user-facing errors.
//!
//! Keys are part of the public contract; the text behind them is not. The
//! built-in table is English. A JSON object of `key -> text` may override any
//! subset of entries. `{detail}` in a template is replaced by the error's
//! diagnostic detail where the error carries one.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{EditorError, EditorResult};

/// Placeholder substituted with error detail.
pub const DETAIL_PLACEHOLDER: &str = "{detail}";

const ENGLISH: &[(&str, &str)] = &[
    (
        "video_error_video_file_not_found",
        "The video file could not be found.",
    ),
    ("video_error_no_video_track", "The video has no video track."),
    ("video_error_no_audio_track", "The video has no audio track."),
    (
        "video_error_could_not_create_composition_track",
        "Could not create a track for the edited video.",
    ),
    (
        "video_error_wrong_size",
        "The requested size is larger than the video.",
    ),
    ("video_error_wrong_time", "The requested time range is not valid."),
    (
        "video_error_no_dir",
        "The output folder does not exist and could not be created.",
    ),
    (
        "video_error_no_export_session",
        "The video cannot be exported.",
    ),
    ("video_error_exporter_error", "Export failed: {detail}"),
];

/// A table of localized message templates.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    entries: HashMap<String, String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::english()
    }
}

impl MessageCatalog {
    /// The built-in English table.
    pub fn english() -> Self {
        Self {
            entries: ENGLISH
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// English table with entries overridden from a JSON file.
    pub fn with_overrides_from(path: &Path) -> EditorResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let overrides: HashMap<String, String> = serde_json::from_str(&content)?;
        let mut catalog = Self::english();
        catalog.entries.extend(overrides);
        Ok(catalog)
    }

    /// Raw template for a key.
    pub fn template(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Render the message for an error.
    ///
    /// Errors outside the taxonomy are returned as their own description.
    pub fn message_for(&self, error: &EditorError) -> String {
        let Some(key) = error.message_key() else {
            return error.to_string();
        };
        let Some(template) = self.template(key) else {
            tracing::warn!(key, "Missing localized message");
            return key.to_string();
        };

        match error {
            EditorError::ExporterError(detail) => template.replace(DETAIL_PLACEHOLDER, detail),
            _ => template.to_string(),
        }
    }
}
