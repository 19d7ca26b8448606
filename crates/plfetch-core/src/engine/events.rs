//! What the engine tells its caller while it runs.

use std::path::PathBuf;

use crate::progress::TransferStatus;

/// Why a track was not fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Destination path does not contain the configured substring.
    FilterMismatch { filter: String },
    /// A file already exists at the destination; it is left untouched.
    AlreadyExists,
    /// The URL could not be opened; carries the cause.
    Unreachable(String),
}

/// How a fetched track ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    Completed { bytes: u64 },
    /// Fewer bytes than declared, or a disk write failed. The partial file was removed.
    Incomplete { bytes: u64, declared: Option<u64> },
}

/// Totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub title: String,
    pub urls_found: usize,
    pub completed: usize,
    pub incomplete: usize,
    pub skipped_filter: usize,
    pub skipped_existing: usize,
    pub skipped_unreachable: usize,
    pub bytes_written: u64,
}

impl RunSummary {
    pub(crate) fn record_skip(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::FilterMismatch { .. } => self.skipped_filter += 1,
            SkipReason::AlreadyExists => self.skipped_existing += 1,
            SkipReason::Unreachable(_) => self.skipped_unreachable += 1,
        }
    }

    pub(crate) fn record_outcome(&mut self, outcome: &TrackOutcome) {
        match outcome {
            TrackOutcome::Completed { bytes } => {
                self.completed += 1;
                self.bytes_written += bytes;
            }
            TrackOutcome::Incomplete { .. } => self.incomplete += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_filter + self.skipped_existing + self.skipped_unreachable
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PlaylistLoaded {
        title: String,
        count: usize,
        dir: PathBuf,
    },
    TrackStarted {
        url: String,
        dest: PathBuf,
    },
    /// The response carried no usable length; only byte counts will be reported.
    SizeUnknown {
        dest: PathBuf,
    },
    Progress(TransferStatus),
    WriteFailed {
        dest: PathBuf,
        message: String,
    },
    TrackSkipped {
        url: String,
        dest: PathBuf,
        reason: SkipReason,
    },
    TrackFinished {
        dest: PathBuf,
        outcome: TrackOutcome,
    },
    Finished(RunSummary),
}

/// Receives engine events on the engine's thread.
pub trait Reporter: Send {
    fn report(&self, event: EngineEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn report(&self, _event: EngineEvent) {}
}
