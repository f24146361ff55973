//! Export sessions: transcoding a composition with ffmpeg.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use clipshape_common::config::{ExportSettings, OutputContainer};
use clipshape_common::error::{EditorError, EditorResult};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::asset::MediaKind;
use crate::composition::{
    CompositionTrack, MutableComposition, PostProcessing, VideoComposition, COMPOSITION_FRAME_RATE,
};
use crate::filter_graph::{self, FilterInputs, OUTPUT_LABEL};
use crate::tool::Toolchain;

/// Lines of encoder stderr kept as the failure diagnostic.
const DIAGNOSTIC_LINES: usize = 8;

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ExportStage,
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Encoding,
    Finalizing,
    Complete,
}

/// Encoding presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportPreset {
    #[default]
    HighestQuality,
}

/// Lifecycle of an [`ExportSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStatus {
    Waiting,
    Exporting,
    Completed,
    Failed,
}

/// A configured transcode of one composition to one output file.
#[derive(Debug)]
pub struct ExportSession {
    ffmpeg: PathBuf,
    composition: MutableComposition,
    preset: ExportPreset,
    settings: ExportSettings,

    /// Destination file.
    pub output_path: PathBuf,

    /// Output container.
    pub output_container: OutputContainer,

    /// Move the index to the front of the file for progressive playback.
    pub should_optimize_for_network_use: bool,

    /// How the video is rendered. Without one, tracks are transcoded with
    /// their preferred transform applied by the decoder.
    pub video_composition: Option<VideoComposition>,

    status: ExportStatus,
    error: Option<String>,
    progress: f64,
}

impl ExportSession {
    /// Create a session for `composition`.
    ///
    /// Fails with [`EditorError::NoExportSession`] when ffmpeg is not
    /// available or the composition has no exportable video.
    pub fn new(
        composition: MutableComposition,
        preset: ExportPreset,
        toolchain: &Toolchain,
        settings: ExportSettings,
    ) -> EditorResult<Self> {
        let ffmpeg = toolchain
            .ffmpeg()
            .ok_or_else(|| EditorError::no_export_session("ffmpeg not found in PATH"))?
            .to_path_buf();

        for track in composition.tracks() {
            if track.segments.len() > 1 {
                return Err(EditorError::no_export_session(format!(
                    "track {} has more than one segment",
                    track.id
                )));
            }
        }

        let video = composition
            .first_track(MediaKind::Video)
            .filter(|t| !t.segments.is_empty())
            .ok_or_else(|| EditorError::no_export_session("composition has no video to export"))?;
        if video.natural_size.is_empty() {
            return Err(EditorError::no_export_session(
                "video track has no frame size",
            ));
        }

        Ok(Self {
            ffmpeg,
            composition,
            preset,
            output_container: settings.container,
            settings,
            output_path: PathBuf::new(),
            should_optimize_for_network_use: false,
            video_composition: None,
            status: ExportStatus::Waiting,
            error: None,
            progress: 0.0,
        })
    }

    pub fn status(&self) -> ExportStatus {
        self.status
    }

    /// Encoder diagnostic of a failed export, if it produced one.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn preset(&self) -> ExportPreset {
        self.preset
    }

    /// Run the transcode to completion.
    ///
    /// The outcome is reported through [`status`](Self::status) and
    /// [`error`](Self::error). An `Err` is returned only when the inputs for
    /// ffmpeg could not be prepared. Dropping the returned future kills the
    /// encoder.
    pub async fn export(&mut self, progress: Option<ProgressCallback>) -> EditorResult<()> {
        // Held until ffmpeg exits.
        let overlay_file = self.write_overlay_image()?;
        let args = self.build_args(overlay_file.as_ref().map(|f| f.path()))?;

        self.status = ExportStatus::Exporting;
        if let Some(cb) = &progress {
            cb(ExportProgress {
                progress: 0.0,
                eta_secs: 0.0,
                stage: ExportStage::Preparing,
            });
        }

        match self.run_ffmpeg(&args, progress).await {
            Ok(()) => {
                self.status = ExportStatus::Completed;
                self.progress = 1.0;
            }
            Err(diagnostic) => {
                self.status = ExportStatus::Failed;
                self.error = diagnostic;
            }
        }
        Ok(())
    }

    fn write_overlay_image(&self) -> EditorResult<Option<tempfile::NamedTempFile>> {
        let Some(PostProcessing::ImageOverlay { overlay, .. }) = self
            .video_composition
            .as_ref()
            .and_then(|vc| vc.post_processing.as_ref())
        else {
            return Ok(None);
        };

        let file = tempfile::Builder::new()
            .prefix("clipshape-overlay-")
            .suffix(".png")
            .tempfile()?;
        overlay
            .image
            .save_with_format(file.path(), image::ImageFormat::Png)?;
        Ok(Some(file))
    }

    /// Assemble the ffmpeg command line.
    pub fn build_args(&self, overlay_image: Option<&Path>) -> EditorResult<Vec<String>> {
        let video = self
            .composition
            .first_track(MediaKind::Video)
            .ok_or_else(|| EditorError::no_export_session("composition has no video to export"))?;
        let audio = self.composition.first_track(MediaKind::Audio);
        let duration = self.composition.duration();

        let mut args = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-nostats".to_string(),
            "-progress".to_string(),
            "pipe:1".to_string(),
        ];

        // One ffmpeg input per distinct source file.
        let mut sources: Vec<PathBuf> = Vec::new();
        let mut input_of = |track: &CompositionTrack, args: &mut Vec<String>| -> usize {
            let segment = &track.segments[0];
            if let Some(i) = sources.iter().position(|p| *p == segment.source_path) {
                return i;
            }
            if self.video_composition.is_some() {
                args.push("-noautorotate".to_string());
            }
            args.push("-ss".to_string());
            args.push(format!("{:.6}", segment.source_range.start.seconds()));
            args.push("-t".to_string());
            args.push(format!("{:.6}", segment.source_range.duration.seconds()));
            args.push("-i".to_string());
            args.push(segment.source_path.display().to_string());
            sources.push(segment.source_path.clone());
            sources.len() - 1
        };

        let video_input = input_of(video, &mut args);
        let audio_input = audio
            .filter(|t| !t.segments.is_empty())
            .map(|t| (input_of(t, &mut args), t.segments[0].source_track));
        let video_stream = format!("{video_input}:{}", video.segments[0].source_track);
        let mut input_count = sources.len();

        let overlay_input = match overlay_image {
            Some(path) => {
                args.push("-loop".to_string());
                args.push("1".to_string());
                args.push("-i".to_string());
                args.push(path.display().to_string());
                input_count += 1;
                Some(input_count - 1)
            }
            None => None,
        };

        match &self.video_composition {
            Some(vc) => {
                let graph = filter_graph::compile(
                    vc,
                    video.natural_size,
                    &FilterInputs {
                        video: video_stream,
                        overlay: overlay_input,
                    },
                )?;
                tracing::debug!(
                    width = graph.width,
                    height = graph.height,
                    filter_len = graph.description.len(),
                    "Filter graph compiled"
                );
                args.push("-filter_complex".to_string());
                args.push(graph.description);
                args.push("-map".to_string());
                args.push(format!("[{OUTPUT_LABEL}]"));
                args.push("-metadata:s:v:0".to_string());
                args.push("rotate=0".to_string());
            }
            None => {
                args.push("-map".to_string());
                args.push(video_stream);
                args.push("-r".to_string());
                args.push(COMPOSITION_FRAME_RATE.to_string());
                args.push("-pix_fmt".to_string());
                args.push("yuv420p".to_string());
            }
        }

        if let Some((input, stream)) = audio_input {
            args.push("-map".to_string());
            args.push(format!("{input}:{stream}"));
        }

        args.append(&mut self.codec_args());

        args.push("-t".to_string());
        args.push(format!("{:.6}", duration.seconds()));
        args.push("-f".to_string());
        args.push(self.output_container.muxer().to_string());
        args.push(self.output_path.display().to_string());

        Ok(args)
    }

    fn codec_args(&self) -> Vec<String> {
        let (x264_preset, crf) = match self.preset {
            ExportPreset::HighestQuality => (self.settings.x264_preset.clone(), self.settings.crf),
        };
        let mut args = vec![
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            x264_preset,
            "-crf".to_string(),
            crf.to_string(),
            "-profile:v".to_string(),
            "high".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            format!("{}k", self.settings.audio_bitrate_kbps.max(64)),
        ];
        if self.should_optimize_for_network_use {
            args.push("-movflags".to_string());
            args.push("+faststart".to_string());
        }
        args
    }

    /// Run ffmpeg, returning the diagnostic text on failure.
    async fn run_ffmpeg(
        &mut self,
        args: &[String],
        progress: Option<ProgressCallback>,
    ) -> Result<(), Option<String>> {
        tracing::debug!(?args, "Running ffmpeg");
        let start = std::time::Instant::now();
        let expected_secs = self.composition.duration().seconds();

        let mut child = Command::new(&self.ffmpeg)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Some(format!("Failed to start ffmpeg: {e}")))?;

        tracing::info!(
            pid = child.id(),
            args_len = args.len(),
            expected_secs,
            "ffmpeg process started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Some("Failed to capture ffmpeg stdout".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| Some("Failed to capture ffmpeg stderr".to_string()))?;

        // Drain stderr concurrently to avoid ffmpeg blocking on a full stderr pipe.
        let stderr_task = tokio::spawn(async move {
            let mut output = String::new();
            match stderr.read_to_string(&mut output).await {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut lines = BufReader::new(stdout).lines();
        let mut latest = ProgressState::default();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    tracing::warn!(error = %err, "Failed reading ffmpeg progress");
                    break;
                }
            };

            if let Some((key, value)) = line.trim().split_once('=') {
                latest.update(key, value);
                if key == "progress" {
                    let report =
                        progress_report(&latest, expected_secs, start.elapsed().as_secs_f64());
                    self.progress = report.progress;
                    if let Some(cb) = &progress {
                        cb(report);
                    }
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| Some(format!("Failed to wait on ffmpeg: {e}")))?;

        let stderr_output = stderr_task
            .await
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            tracing::warn!(%status, stderr = stderr_output.trim(), "ffmpeg export failed");
            return Err(diagnostic_from_stderr(&stderr_output));
        }

        if let Some(cb) = &progress {
            cb(ExportProgress {
                progress: 1.0,
                eta_secs: 0.0,
                stage: ExportStage::Complete,
            });
        }

        tracing::info!(
            elapsed_secs = start.elapsed().as_secs_f64(),
            "ffmpeg process finished"
        );
        Ok(())
    }
}

/// The last non-empty stderr lines, or `None` when ffmpeg printed nothing.
fn diagnostic_from_stderr(stderr: &str) -> Option<String> {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return None;
    }
    let skip = lines.len().saturating_sub(DIAGNOSTIC_LINES);
    Some(lines[skip..].join("\n"))
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            "out_time_us" | "out_time_ms" => {
                // Both keys carry microseconds.
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

fn progress_report(
    state: &ProgressState,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> ExportProgress {
    let progress = if expected_duration_secs <= 0.0 {
        0.0
    } else {
        (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
    };

    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    ExportProgress {
        progress: if state.complete { 1.0 } else { progress },
        eta_secs,
        stage: if state.complete {
            ExportStage::Finalizing
        } else {
            ExportStage::Encoding
        },
    }
}
