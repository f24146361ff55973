pub mod check;
pub mod frame;
pub mod info;
pub mod resize;

use clipshape_render_engine::export::{ExportProgress, ProgressCallback};

/// Progress printer shared by the export commands.
pub(crate) fn progress_printer() -> ProgressCallback {
    Box::new(|p: ExportProgress| {
        print!(
            "\r  Progress: {:.1}% ({:?}, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.stage,
            p.eta_secs,
        );
    })
}
