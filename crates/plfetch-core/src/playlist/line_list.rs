//! Plain line-list (M3U) playlists.

use std::io::{self, BufRead};

use super::{Playlist, PlaylistParser};
use crate::error::FetchError;

/// Each trimmed, non-empty line is one URL. Never produces a title.
///
/// Any readable text "parses". An unreadable source yields an empty
/// playlist rather than an error, and a read failure part-way keeps the
/// lines read so far, so callers must treat zero URLs as a possible outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineListParser;

impl LineListParser {
    /// URLs from `text` in line order.
    pub fn parse_text(text: &str) -> Playlist {
        let mut playlist = Playlist::default();
        for line in text.lines() {
            push_line(&mut playlist, line);
        }
        playlist
    }
}

fn push_line(playlist: &mut Playlist, line: &str) {
    let line = line.trim();
    if !line.is_empty() {
        playlist.urls.push(line.to_string());
    }
}

impl PlaylistParser for LineListParser {
    fn parse(&self, source: io::Result<Box<dyn BufRead>>) -> Result<Playlist, FetchError> {
        let mut playlist = Playlist::default();
        // TODO: decide whether an unreadable line list should fail the run like XSPF does.
        let mut reader = match source {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("line-list playlist unreadable, treating as empty: {}", e);
                return Ok(playlist);
            }
        };
        let mut raw = Vec::new();
        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw) {
                Ok(0) => break,
                Ok(_) => push_line(&mut playlist, &String::from_utf8_lossy(&raw)),
                Err(e) => {
                    tracing::warn!(
                        "line-list read failed after {} url(s): {}",
                        playlist.len(),
                        e
                    );
                    break;
                }
            }
        }
        Ok(playlist)
    }
}
