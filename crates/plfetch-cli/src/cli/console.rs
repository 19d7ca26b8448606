//! Console rendering of engine events.

use std::io::Write;

use plfetch_core::engine::{EngineEvent, Reporter, SkipReason, TrackOutcome};
use plfetch_core::progress::TransferStatus;

/// Prints engine events to stdout. Progress lines rewrite themselves with `\r`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, event: EngineEvent) {
        let text = render(&event);
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

fn render_progress(status: &TransferStatus) -> String {
    match (status.percent, status.rate_kbps) {
        (Some(pct), Some(rate)) => format!("\r  {}% complete ({:.1} KB/s)    ", pct, rate),
        (Some(pct), None) => format!("\r  {}% complete", pct),
        (None, Some(rate)) => format!("\r  {} bytes ({:.1} KB/s)    ", status.bytes_done, rate),
        (None, None) => format!("\r  {} bytes", status.bytes_done),
    }
}

/// Text for one event, including its own line endings.
pub(super) fn render(event: &EngineEvent) -> String {
    match event {
        EngineEvent::PlaylistLoaded { title, count, .. } => {
            format!("{} urls in {}\n", count, title)
        }
        EngineEvent::TrackStarted { url, dest } => format!("{} -> {}\n", url, dest.display()),
        EngineEvent::SizeUnknown { .. } => "  Download size not known.\n".to_string(),
        EngineEvent::Progress(status) => render_progress(status),
        EngineEvent::WriteFailed { message, .. } => format!("\n  {}\n", message),
        EngineEvent::TrackSkipped { dest, reason, .. } => match reason {
            SkipReason::FilterMismatch { filter } => format!(
                "File {} doesn't match your file name substring {}.\n",
                dest.display(),
                filter
            ),
            SkipReason::AlreadyExists => format!("File {} already exists.\n", dest.display()),
            SkipReason::Unreachable(cause) => format!("  {}\n\n", cause),
        },
        EngineEvent::TrackFinished { outcome, .. } => match outcome {
            TrackOutcome::Completed { .. } => "\r  100% complete                \n\n".to_string(),
            TrackOutcome::Incomplete { .. } => {
                "\nIncomplete download -- removing file.\n\n".to_string()
            }
        },
        EngineEvent::Finished(summary) => format!(
            "\n{} downloaded, {} incomplete, {} skipped\nDownload complete.\n",
            summary.completed,
            summary.incomplete,
            summary.skipped()
        ),
    }
}
