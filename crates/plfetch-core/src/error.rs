//! Run-level error kinds.
//!
//! `Parse`, `Directory`, `OutputCreate` and `Interrupted` halt the run.
//! `Address` and `Write` are per-track: the engine reports them as track
//! outcomes and moves on, but they are still values of this type so callers
//! can render one cause format for both.

use std::path::PathBuf;

use crate::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Playlist source unreadable or structurally invalid.
    #[error("parsing the playlist failed: {0}")]
    Parse(String),

    #[error("cannot create directory '{}': {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("don't know how to handle {url}: {source}")]
    Address {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("cannot create output file '{}': {source}", .path.display())]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write to disk (disk full?): {0}")]
    Write(#[source] std::io::Error),

    /// Cancelled by the user. `removed` names the partial file that was deleted.
    #[error("interrupted{}", removed_suffix(.removed))]
    Interrupted { removed: Option<PathBuf> },
}

fn removed_suffix(removed: &Option<PathBuf>) -> String {
    match removed {
        Some(p) => format!("; removed {}", p.display()),
        None => String::new(),
    }
}

impl FetchError {
    /// True for errors that end the whole run rather than a single track.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FetchError::Address { .. } | FetchError::Write(_))
    }
}
