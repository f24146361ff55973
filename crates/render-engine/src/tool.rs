//! Locating and invoking the FFmpeg command-line tools.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use clipshape_common::config::ToolPaths;
use clipshape_common::error::{EditorError, EditorResult};
use tokio::process::Command;

/// Resolved locations of `ffmpeg` and `ffprobe`.
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
    ffmpeg: Option<PathBuf>,
    ffprobe: Option<PathBuf>,
}

impl Toolchain {
    /// Use explicitly configured paths, falling back to a `PATH` lookup.
    pub fn discover(paths: &ToolPaths) -> Self {
        Self {
            ffmpeg: resolve(paths.ffmpeg.as_deref(), "ffmpeg"),
            ffprobe: resolve(paths.ffprobe.as_deref(), "ffprobe"),
        }
    }

    /// Build from known paths without any lookup.
    pub fn with_paths(ffmpeg: Option<PathBuf>, ffprobe: Option<PathBuf>) -> Self {
        Self { ffmpeg, ffprobe }
    }

    pub fn ffmpeg(&self) -> Option<&Path> {
        self.ffmpeg.as_deref()
    }

    pub fn ffprobe(&self) -> Option<&Path> {
        self.ffprobe.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.ffmpeg.is_some() && self.ffprobe.is_some()
    }
}

fn resolve(configured: Option<&Path>, binary: &str) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        tracing::warn!(path = %path.display(), binary, "Configured tool path does not exist");
    }
    which::which(binary).ok()
}

/// Output captured from a finished tool process.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Run a tool to completion and capture its output.
///
/// A non-zero exit is not an error here; callers inspect `status`.
pub async fn run_tool(program: &Path, args: &[String]) -> EditorResult<ToolOutput> {
    let name = tool_name(program);
    tracing::debug!(tool = %name, ?args, "Running tool");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| EditorError::tool(&name, format!("failed to spawn: {e}")))?;

    Ok(ToolOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

pub(crate) fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string_lossy().to_string())
}
