//! The video editor: one `export` call from source file to output file.

use std::fmt;
use std::path::Path;

use clipshape_common::config::{AppConfig, ExportSettings};
use clipshape_common::error::{EditorError, EditorResult};
use clipshape_common::messages::MessageCatalog;
use clipshape_media_model::Size;
use image::DynamicImage;

use crate::asset::Asset;
use crate::export::{ExportPreset, ExportSession, ExportStatus, ProgressCallback};
use crate::extraction::extract;
use crate::overlay::build_overlay_composition;
use crate::resize::{build_resize_composition, ResizeOptions};
use crate::tool::Toolchain;

/// Detail used when a failed export left no diagnostic.
pub const UNKNOWN_EXPORT_ERROR: &str = "Unknown error";

/// What to do to the source video.
#[derive(Clone)]
pub enum Operation {
    /// Scale into a `width`×`height` box, optionally rounding the corners.
    Resize {
        width: f64,
        height: f64,
        corner_radius: Option<f64>,
        options: ResizeOptions,
    },
    /// Composite a device-frame image over the video.
    AddDeviceFrame { overlay_image: DynamicImage },
}

impl Operation {
    /// Resize with an aspect-preserving, letterboxed fit.
    pub fn resize(width: f64, height: f64, corner_radius: Option<f64>) -> Self {
        Self::Resize {
            width,
            height,
            corner_radius,
            options: ResizeOptions::default(),
        }
    }

    pub fn add_device_frame(overlay_image: DynamicImage) -> Self {
        Self::AddDeviceFrame { overlay_image }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resize {
                width,
                height,
                corner_radius,
                options,
            } => f
                .debug_struct("Resize")
                .field("width", width)
                .field("height", height)
                .field("corner_radius", corner_radius)
                .field("options", options)
                .finish(),
            // Summarize the image; its pixels are not worth printing.
            Self::AddDeviceFrame { overlay_image } => f
                .debug_struct("AddDeviceFrame")
                .field("overlay_width", &overlay_image.width())
                .field("overlay_height", &overlay_image.height())
                .field("overlay_color", &overlay_image.color())
                .finish(),
        }
    }
}

/// Stateless front end over asset loading, composition building, and export.
#[derive(Debug, Clone)]
pub struct VideoEditor {
    toolchain: Toolchain,
    settings: ExportSettings,
    catalog: MessageCatalog,
}

impl VideoEditor {
    pub fn new(toolchain: Toolchain, settings: ExportSettings, catalog: MessageCatalog) -> Self {
        Self {
            toolchain,
            settings,
            catalog,
        }
    }

    /// Build an editor from application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let catalog = match &config.messages_file {
            Some(path) => MessageCatalog::with_overrides_from(path).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load messages; using English");
                MessageCatalog::english()
            }),
            None => MessageCatalog::english(),
        };
        Self::new(
            Toolchain::discover(&config.tools),
            config.export.clone(),
            catalog,
        )
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    /// Export `source` to `output`, returning a localized message on failure
    /// and `None` on success.
    pub async fn export(&self, source: &Path, output: &Path, operation: Operation) -> Option<String> {
        self.export_with_progress(source, output, operation, None)
            .await
    }

    /// [`export`](Self::export) with progress reporting.
    pub async fn export_with_progress(
        &self,
        source: &Path,
        output: &Path,
        operation: Operation,
        progress: Option<ProgressCallback>,
    ) -> Option<String> {
        match self.try_export(source, output, operation, progress).await {
            Ok(()) => None,
            Err(err) => {
                if err.is_expected() {
                    tracing::info!(error = %err, "Export failed");
                } else {
                    tracing::error!(error = %err, "Export failed unexpectedly");
                }
                Some(self.catalog.message_for(&err))
            }
        }
    }

    /// Export with a typed error.
    pub async fn try_export(
        &self,
        source: &Path,
        output: &Path,
        operation: Operation,
        progress: Option<ProgressCallback>,
    ) -> EditorResult<()> {
        tracing::info!(
            source = %source.display(),
            output = %output.display(),
            ?operation,
            "Starting export"
        );
        let started = std::time::Instant::now();

        let asset = Asset::load(source, &self.toolchain).await?;
        let extraction = extract(asset)?;

        let video_composition = match &operation {
            Operation::Resize {
                width,
                height,
                corner_radius,
                options,
            } => build_resize_composition(
                &extraction,
                Size::new(*width, *height),
                *options,
                *corner_radius,
            )?,
            Operation::AddDeviceFrame { overlay_image } => {
                build_overlay_composition(&extraction, overlay_image)
            }
        };

        prepare_output_path(output)?;

        let mut session = ExportSession::new(
            extraction.composition,
            ExportPreset::HighestQuality,
            &self.toolchain,
            self.settings.clone(),
        )?;
        session.output_path = output.to_path_buf();
        session.output_container = self.settings.container;
        session.should_optimize_for_network_use = false;
        session.video_composition = Some(video_composition);

        session.export(progress).await?;

        match session.status() {
            ExportStatus::Completed => {
                tracing::info!(
                    output = %output.display(),
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    "Export finished"
                );
                Ok(())
            }
            _ => Err(EditorError::ExporterError(
                session.error().unwrap_or(UNKNOWN_EXPORT_ERROR).to_string(),
            )),
        }
    }
}

/// Remove any existing output file and make sure its directory exists.
///
/// Removal and creation are best-effort; only a parent that is not a
/// directory afterwards is an error.
fn prepare_output_path(output: &Path) -> EditorResult<()> {
    if output.exists() {
        if let Err(err) = std::fs::remove_file(output) {
            tracing::warn!(path = %output.display(), error = %err, "Failed to remove existing output");
        }
    }

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if let Err(err) = std::fs::create_dir_all(dir) {
        tracing::warn!(path = %dir.display(), error = %err, "Failed to create output directory");
    }
    if !dir.is_dir() {
        return Err(EditorError::NoDir {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}
