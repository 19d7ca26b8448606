//! plfetch: download every track of an XSPF or M3U playlist into a
//! directory named after the playlist.

pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod logging;
pub mod playlist;
pub mod progress;
pub mod transport;
pub mod url_model;

pub use control::{CancelToken, CurrentFile};
pub use engine::{DownloadEngine, EngineEvent, Reporter, RunSummary, SkipReason, TrackOutcome};
pub use error::FetchError;
pub use playlist::{Playlist, PlaylistKind, PlaylistSource};
