//! Sequential playlist download.
//!
//! Loads the playlist, resolves the output directory from its title, then
//! fetches each track in order. Only playlist, directory, output-create and
//! interrupt failures end the run; per-track problems are reported and the
//! loop moves on.

mod events;
mod track;

pub use events::{EngineEvent, NoopReporter, Reporter, RunSummary, SkipReason, TrackOutcome};

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::FetchConfig;
use crate::control::{CancelToken, CurrentFile};
use crate::error::FetchError;
use crate::playlist::PlaylistSource;
use crate::transport::Transport;
use crate::url_model;

/// Bytes requested per read from a track stream.
pub const CHUNK_SIZE: usize = 4096;

/// Creates the destination for a track. Must fail if the path already exists.
type OpenOutput = fn(&Path) -> io::Result<Box<dyn Write>>;

fn create_output(dest: &Path) -> io::Result<Box<dyn Write>> {
    let file = File::options().write(true).create_new(true).open(dest)?;
    Ok(Box::new(file))
}

pub struct DownloadEngine {
    transport: Box<dyn Transport>,
    reporter: Box<dyn Reporter>,
    cancel: CancelToken,
    current: CurrentFile,
    base_dir: PathBuf,
    name_filter: Option<String>,
    progress_every: u64,
    open_output: OpenOutput,
}

impl DownloadEngine {
    /// Engine writing under the working directory with default cadence and no reporter.
    pub fn new(transport: Box<dyn Transport>, cancel: CancelToken) -> Self {
        Self {
            transport,
            reporter: Box::new(NoopReporter),
            cancel,
            current: CurrentFile::new(),
            base_dir: PathBuf::from("."),
            name_filter: None,
            progress_every: FetchConfig::default().progress_every(),
            open_output: create_output,
        }
    }

    pub fn with_reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Directory in which the playlist directory is created.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Only fetch tracks whose destination path contains `filter`.
    pub fn with_name_filter(mut self, filter: Option<String>) -> Self {
        self.name_filter = filter.filter(|f| !f.is_empty());
        self
    }

    pub fn with_config(mut self, cfg: &FetchConfig) -> Self {
        self.progress_every = cfg.progress_every();
        self
    }

    #[cfg(test)]
    fn with_output(mut self, open_output: OpenOutput) -> Self {
        self.open_output = open_output;
        self
    }

    /// Handle to the in-flight destination slot.
    pub fn current_file(&self) -> CurrentFile {
        self.current.clone()
    }

    /// Run the whole playlist. Returns the summary when every track was handled.
    pub fn run(&self, source: &PlaylistSource) -> Result<RunSummary, FetchError> {
        if self.cancel.is_cancelled() {
            return Err(FetchError::Interrupted { removed: None });
        }

        let loaded = source.load(self.transport.as_ref());
        // An aborted remote fetch surfaces as a parse error (XSPF) or an empty list (M3U).
        if self.cancel.is_cancelled() {
            return Err(self.interrupted());
        }
        let playlist = loaded.map_err(|e| {
            tracing::warn!("playlist {} failed to parse: {}", source.location, e);
            e
        })?;

        let dir_name = url_model::playlist_dir_name(playlist.title.as_deref(), &source.location);
        let dir = self.base_dir.join(&dir_name);
        ensure_dir(&dir)?;

        let title = playlist.title.clone().unwrap_or_else(|| dir_name.clone());
        tracing::info!(
            "{} url(s) in '{}' -> {}",
            playlist.len(),
            title,
            dir.display()
        );
        self.reporter.report(EngineEvent::PlaylistLoaded {
            title: title.clone(),
            count: playlist.len(),
            dir: dir.clone(),
        });

        let mut summary = RunSummary {
            title,
            urls_found: playlist.len(),
            ..RunSummary::default()
        };

        for url in &playlist.urls {
            if self.cancel.is_cancelled() {
                return Err(FetchError::Interrupted { removed: None });
            }
            self.process_track(url, &dir, &mut summary)?;
        }

        tracing::info!(
            "run finished: {} completed, {} incomplete, {} skipped",
            summary.completed,
            summary.incomplete,
            summary.skipped()
        );
        self.reporter.report(EngineEvent::Finished(summary.clone()));
        Ok(summary)
    }

    fn process_track(
        &self,
        url: &str,
        dir: &Path,
        summary: &mut RunSummary,
    ) -> Result<(), FetchError> {
        let dest = url_model::track_path(dir, url);

        if let Some(reason) = self.skip_reason(&dest) {
            tracing::debug!("skip {}: {:?}", dest.display(), reason);
            summary.record_skip(&reason);
            self.reporter.report(EngineEvent::TrackSkipped {
                url: url.to_string(),
                dest,
                reason,
            });
            return Ok(());
        }

        match self.fetch_track(url, &dest)? {
            Ok(outcome) => {
                summary.record_outcome(&outcome);
                self.reporter
                    .report(EngineEvent::TrackFinished { dest, outcome });
            }
            Err(reason) => {
                summary.record_skip(&reason);
                self.reporter.report(EngineEvent::TrackSkipped {
                    url: url.to_string(),
                    dest,
                    reason,
                });
            }
        }
        Ok(())
    }

    fn skip_reason(&self, dest: &Path) -> Option<SkipReason> {
        if let Some(filter) = &self.name_filter {
            if !dest.to_string_lossy().contains(filter.as_str()) {
                return Some(SkipReason::FilterMismatch {
                    filter: filter.clone(),
                });
            }
        }
        if dest.exists() {
            return Some(SkipReason::AlreadyExists);
        }
        None
    }

    /// Interrupted error, deleting the in-flight file if there is one.
    fn interrupted(&self) -> FetchError {
        let removed = self.current.remove_in_flight();
        match &removed {
            Some(p) => tracing::info!("interrupted; removed {}", p.display()),
            None => tracing::info!("interrupted"),
        }
        FetchError::Interrupted { removed }
    }
}

fn ensure_dir(dir: &Path) -> Result<(), FetchError> {
    if dir.exists() {
        return Ok(());
    }
    std::fs::create_dir(dir).map_err(|source| {
        tracing::warn!("cannot create directory {}: {}", dir.display(), source);
        FetchError::Directory {
            path: dir.to_path_buf(),
            source,
        }
    })?;
    tracing::debug!("created {}", dir.display());
    Ok(())
}
