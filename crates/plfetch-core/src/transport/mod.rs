//! Byte-stream access to playlist and track URLs.
//!
//! The engine only needs "given a URL, a readable stream plus an optional
//! declared length". [`CurlTransport`] provides that over libcurl; tests
//! substitute in-memory implementations.

mod curl_stream;

pub use curl_stream::CurlTransport;

use std::io::Read;

/// Failure to open or continue a URL stream.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Scheme or address libcurl cannot handle.
    #[error("unsupported URL: {0}")]
    UnsupportedUrl(String),
    /// Server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Stopped from the progress callback (user cancel).
    #[error("transfer aborted")]
    Aborted,
    #[error(transparent)]
    Curl(#[from] curl::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An open response body.
pub trait TrackStream: Read + Send {
    /// Length announced by the server (`Content-Length`). `None` or `Some(0)` means unknown.
    fn declared_length(&self) -> Option<u64>;
}

/// Opens URL streams. Implementations must be usable from the engine's blocking thread.
pub trait Transport: Send + Sync {
    fn open(&self, url: &str) -> Result<Box<dyn TrackStream>, TransportError>;
}

/// True if `location` is an absolute URL rather than a filesystem path.
///
/// Single-letter schemes are treated as Windows drive letters (`C:\lists\a.m3u`).
pub fn is_url(location: &str) -> bool {
    match url::Url::parse(location) {
        Ok(u) => u.scheme().len() > 1,
        Err(_) => false,
    }
}
