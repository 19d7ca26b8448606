//! Directory and file names for a playlist download.
//!
//! Both the playlist directory and each track file go through [`sanitize`],
//! so the layout on disk only ever contains the restricted character set.

mod path;
mod sanitize;

pub use path::{file_name_from_url, title_from_path};
pub use sanitize::sanitize;

use std::path::{Path, PathBuf};

/// Directory name used when the playlist title sanitizes to nothing.
const DEFAULT_DIR_NAME: &str = "playlist";

/// File name used when a track URL sanitizes to nothing.
const DEFAULT_FILENAME: &str = "download.bin";

/// Sanitized directory name for a playlist: the explicit `title` if present,
/// otherwise the title derived from the playlist `location`.
pub fn playlist_dir_name(title: Option<&str>, location: &str) -> String {
    let raw = match title {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => title_from_path(location),
    };
    let safe = sanitize(&raw);
    if safe.is_empty() {
        DEFAULT_DIR_NAME.to_string()
    } else {
        safe
    }
}

/// Destination path for `url` inside `dir`.
///
/// # Examples
///
/// - `track_path("Mix", "http://h/a/My%20Song.mp3")` → `Mix/My Song.mp3`
/// - `track_path("Mix", "http://h/a/")` → `Mix/download.bin`
pub fn track_path(dir: &Path, url: &str) -> PathBuf {
    let safe = sanitize(&file_name_from_url(url));
    if safe.is_empty() || safe == "." || safe == ".." {
        dir.join(DEFAULT_FILENAME)
    } else {
        dir.join(safe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_name_prefers_title() {
        assert_eq!(
            playlist_dir_name(Some("Test Mix"), "/tmp/other.xspf"),
            "Test Mix"
        );
        assert_eq!(
            playlist_dir_name(Some("Rock/Pop: 2024"), "x.xspf"),
            "RockPop 2024"
        );
    }

    #[test]
    fn dir_name_from_location() {
        assert_eq!(playlist_dir_name(None, "/tmp/Road Trip.m3u"), "Road Trip");
        assert_eq!(playlist_dir_name(Some(""), "/tmp/road.m3u"), "road");
    }

    #[test]
    fn dir_name_fallback() {
        assert_eq!(playlist_dir_name(Some("???"), "x.xspf"), "playlist");
        assert_eq!(playlist_dir_name(None, "/tmp/.m3u"), "playlist");
    }

    #[test]
    fn track_path_joins_sanitized_name() {
        assert_eq!(
            track_path(Path::new("Mix"), "http://h/a/My%20Song%3F.mp3"),
            Path::new("Mix").join("My Song.mp3")
        );
    }

    #[test]
    fn track_path_reserved_names_fallback() {
        assert_eq!(
            track_path(Path::new("Mix"), "http://h/a/"),
            Path::new("Mix").join("download.bin")
        );
        assert_eq!(
            track_path(Path::new("Mix"), "http://h/a/.."),
            Path::new("Mix").join("download.bin")
        );
    }
}
