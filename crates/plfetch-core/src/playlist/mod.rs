//! Playlist documents and the parsers that normalize them.
//!
//! Two formats are supported: a plain line list (M3U) and XSPF markup.
//! Both produce a [`Playlist`]: ordered track URLs plus an optional title.

mod line_list;
mod xspf;

pub use line_list::LineListParser;
pub use xspf::XspfParser;

use std::fmt;
use std::io::{self, BufRead, BufReader};

use crate::error::FetchError;
use crate::transport::{self, Transport};

/// Ordered track URLs and optional title. Duplicates are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    pub title: Option<String>,
    pub urls: Vec<String>,
}

impl Playlist {
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Which parser handles a playlist source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistKind {
    /// XSPF markup (`<playlist><trackList><track><location>`).
    Xspf,
    /// One URL per line.
    M3u,
}

impl fmt::Display for PlaylistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaylistKind::Xspf => write!(f, "XSPF"),
            PlaylistKind::M3u => write!(f, "M3U"),
        }
    }
}

/// A playlist to load: format plus a filesystem path or URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSource {
    pub kind: PlaylistKind,
    pub location: String,
}

impl PlaylistSource {
    pub fn new(kind: PlaylistKind, location: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.into(),
        }
    }

    /// Open the document from disk, or through `transport` for URLs.
    pub fn open(&self, transport: &dyn Transport) -> io::Result<Box<dyn BufRead>> {
        if transport::is_url(&self.location) {
            let stream = transport.open(&self.location).map_err(io::Error::other)?;
            Ok(Box::new(BufReader::new(stream)))
        } else {
            let file = std::fs::File::open(&self.location)?;
            Ok(Box::new(BufReader::new(file)))
        }
    }

    /// Load and parse with the parser matching `kind`.
    pub fn load(&self, transport: &dyn Transport) -> Result<Playlist, FetchError> {
        let parser: Box<dyn PlaylistParser> = match self.kind {
            PlaylistKind::Xspf => Box::new(XspfParser),
            PlaylistKind::M3u => Box::new(LineListParser),
        };
        tracing::debug!("loading {} playlist from {}", self.kind, self.location);
        parser.parse(self.open(transport))
    }
}

/// Turns a playlist document into a [`Playlist`].
///
/// The open result is handed over as-is, so each format decides what an
/// unreadable source means.
pub trait PlaylistParser {
    fn parse(&self, source: io::Result<Box<dyn BufRead>>) -> Result<Playlist, FetchError>;
}
