//! clipshape Render Engine
//!
//! Turns a source video into a resized, masked, or framed copy by building
//! a composition and handing it to ffmpeg for transcoding.
//!
//! # Pipeline Architecture
//!
//! ```text
//! source.mp4 ── ffprobe ── Asset
//!                            │
//!                            ├── Extraction (video + audio copied into a composition)
//!                            │
//!              Operation ────┼── Resize builder ──┐
//!                            └── Overlay builder ─┤
//!                                                 ▼
//!                                         VideoComposition
//!                                                 │
//!                                     filter graph + ffmpeg
//!                                                 │
//!                                                 ▼
//!                                            output.mp4
//! ```

pub mod asset;
pub mod composition;
pub mod editor;
pub mod export;
pub mod extraction;
pub mod filter_graph;
pub mod overlay;
pub mod resize;
pub mod tool;

#[cfg(test)]
mod test_fixtures;

pub use asset::{Asset, AssetTrack, MediaKind};
pub use editor::{Operation, VideoEditor};
pub use export::{ExportProgress, ExportSession, ExportStage, ExportStatus, ProgressCallback};
pub use resize::ResizeOptions;
pub use tool::Toolchain;
