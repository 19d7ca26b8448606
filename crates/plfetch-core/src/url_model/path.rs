//! Names derived from playlist locations and track URLs.

/// Text after the last `/` or `\`, or the whole string if there is none.
fn base_name(location: &str) -> &str {
    match location.rfind(|c: char| c == '/' || c == '\\') {
        Some(i) => &location[i + 1..],
        None => location,
    }
}

/// Derives a human title from a playlist path or URL: the base name with its
/// final `.extension` removed.
///
/// `title_from_path("/music/Road Trip.m3u")` → `"Road Trip"`.
pub fn title_from_path(location: &str) -> String {
    let base = base_name(location);
    match base.rfind('.') {
        Some(i) => base[..i].to_string(),
        None => base.to_string(),
    }
}

/// Percent-decodes `url` and returns the text after the last `/`.
///
/// Decoding is byte-wise; sequences that are not valid UTF-8 are replaced.
pub fn file_name_from_url(url: &str) -> String {
    let bytes = urlencoding::decode_binary(url.as_bytes());
    let decoded = String::from_utf8_lossy(&bytes);
    match decoded.rfind('/') {
        Some(i) => decoded[i + 1..].to_string(),
        None => decoded.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_strips_dirs_and_extension() {
        assert_eq!(title_from_path("/music/Road Trip.m3u"), "Road Trip");
        assert_eq!(title_from_path("mix.tar.xspf"), "mix.tar");
        assert_eq!(title_from_path("C:\\lists\\chill.m3u"), "chill");
        assert_eq!(title_from_path("https://example.com/lists/party.xspf"), "party");
    }

    #[test]
    fn title_without_extension() {
        assert_eq!(title_from_path("/music/favourites"), "favourites");
        assert_eq!(title_from_path(".hidden"), "");
    }

    #[test]
    fn file_name_decodes_escapes() {
        assert_eq!(
            file_name_from_url("http://h/dir/My%20Song.mp3"),
            "My Song.mp3"
        );
        assert_eq!(file_name_from_url("http://h/a/b/c.ogg"), "c.ogg");
    }

    #[test]
    fn file_name_decoded_slash_splits() {
        assert_eq!(file_name_from_url("http://h/dir/a%2Fb.mp3"), "b.mp3");
    }

    #[test]
    fn file_name_trailing_slash_is_empty() {
        assert_eq!(file_name_from_url("http://h/dir/"), "");
        assert_eq!(file_name_from_url("noslash.mp3"), "noslash.mp3");
    }

    #[test]
    fn file_name_invalid_utf8_is_lossy() {
        assert_eq!(file_name_from_url("http://h/%FFx.mp3"), "\u{FFFD}x.mp3");
    }
}
